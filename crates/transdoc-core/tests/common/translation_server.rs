//! Minimal HTTP/1.1 translation server for integration tests.
//!
//! Answers the translate/progress/result/translatedFile/health routes from a
//! fixed script and records every request it sees. One connection per request.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Script {
    /// Reply to `POST /{endpoint}`.
    pub submit: Reply,
    /// Replies to `GET /progress/{id}`, in order; the last one repeats.
    pub progress: Vec<Reply>,
    pub result: Reply,
    pub files: HashMap<String, Vec<u8>>,
    pub health: Reply,
    /// Reply to `GET /`.
    pub root: Reply,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            submit: Reply::ok(r#"{"status":"success","fileList":[]}"#),
            progress: vec![Reply::status(
                404,
                r#"{"status":"error","message":"unknown task"}"#,
            )],
            result: Reply::status(404, r#"{"status":"error","message":"unknown task"}"#),
            files: HashMap::new(),
            health: Reply::ok(
                r#"{"status":"ok","version":"2.0.1","mode":"pdf2zh_next","engine_ready":true}"#,
            ),
            root: Reply::status(404, "Not Found"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

pub struct TestServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl TestServer {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Body of the first POST, parsed as JSON.
    pub fn submitted_json(&self) -> serde_json::Value {
        let req = self
            .requests()
            .into_iter()
            .find(|r| r.method == "POST")
            .expect("no POST recorded");
        serde_json::from_slice(&req.body).expect("POST body is JSON")
    }
}

/// Starts the server in a background thread. Runs until the process exits.
pub fn start(script: Script) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let progress_served = Arc::new(Mutex::new(0usize));
    let script = Arc::new(script);
    {
        let requests = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let script = Arc::clone(&script);
                let requests = Arc::clone(&requests);
                let progress_served = Arc::clone(&progress_served);
                thread::spawn(move || handle(stream, &script, &requests, &progress_served));
            }
        });
    }
    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

/// A base URL that accepts connections and never answers.
pub fn silent_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });
    format!("http://127.0.0.1:{}", port)
}

/// A base URL nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn handle(
    mut stream: TcpStream,
    script: &Script,
    requests: &Mutex<Vec<Recorded>>,
    progress_served: &Mutex<usize>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    requests.lock().unwrap().push(request.clone());

    let path = request.path.trim_start_matches('/');
    let (status, body): (u16, Vec<u8>) = match (request.method.as_str(), path) {
        ("POST", _) => reply(&script.submit),
        ("GET", "") => reply(&script.root),
        ("GET", "health") => reply(&script.health),
        ("GET", p) if p.starts_with("progress/") => {
            let mut served = progress_served.lock().unwrap();
            let idx = (*served).min(script.progress.len().saturating_sub(1));
            *served += 1;
            match script.progress.get(idx) {
                Some(r) => reply(r),
                None => (404, Vec::new()),
            }
        }
        ("GET", p) if p.starts_with("result/") => reply(&script.result),
        ("GET" | "HEAD", p) if p.starts_with("translatedFile/") => {
            let name = percent_decode(&p["translatedFile/".len()..]);
            match script.files.get(&name) {
                Some(bytes) => (200, bytes.clone()),
                None => (404, b"missing".to_vec()),
            }
        }
        _ => (405, Vec::new()),
    };

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    if request.method != "HEAD" {
        let _ = stream.write_all(&body);
    }
    let _ = stream.flush();
}

fn reply(r: &Reply) -> (u16, Vec<u8>) {
    (r.status, r.body.clone().into_bytes())
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        202 => "Accepted",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

/// Reads the request line, headers and a `Content-Length` body.
fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = std::str::from_utf8(&data[..header_end]).ok()?.to_string();
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();
    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = data[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }
    Some(Recorded { method, path, body })
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or("");
            if let Ok(v) = u8::from_str_radix(hex, 16) {
                out.push(v);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
