//! Blocking libcurl transfers.
//!
//! One `perform` call per request, body collected in memory. Runs in the
//! current thread; the client calls it from `spawn_blocking`.

use std::time::Duration;

/// Upper bound on connection setup, regardless of the request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Method {
    Get,
    Head,
    Post,
}

impl Method {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// JSON body, sent only with `Post`.
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub(crate) struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub(crate) fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs the request. Any HTTP status is `Ok`; only transfer-level
/// failures (refused, DNS, timeout, reset) are `Err`.
pub(crate) fn perform(req: &HttpRequest) -> Result<HttpResponse, curl::Error> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(&req.url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(req.timeout.min(CONNECT_TIMEOUT))?;
    easy.timeout(req.timeout)?;

    let mut list = curl::easy::List::new();
    // Large JSON bodies would otherwise wait for a 100-continue the server never sends.
    list.append("Expect:")?;
    match req.method {
        Method::Get => easy.get(true)?,
        Method::Head => easy.nobody(true)?,
        Method::Post => {
            easy.post(true)?;
            list.append("Content-Type: application/json")?;
            easy.post_fields_copy(req.body.as_deref().unwrap_or_default())?;
        }
    }
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(HttpResponse { status, body })
}
