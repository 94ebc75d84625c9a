//! Classify job errors and curl errors into retry policy error kinds.

use crate::error::TranslateError;
use crate::retry::policy::ErrorKind;

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a job error into an ErrorKind.
pub fn classify(e: &TranslateError) -> ErrorKind {
    match e {
        TranslateError::Transport(_) => ErrorKind::Connection,
        TranslateError::Timeout(_) | TranslateError::JobTimedOut(_) => ErrorKind::Timeout,
        TranslateError::Server(_)
        | TranslateError::ResultUnavailable(_)
        | TranslateError::JobFailed(_) => ErrorKind::Server,
        TranslateError::Validation(_) | TranslateError::Import(_) | TranslateError::Launch(_) => {
            ErrorKind::Other
        }
    }
}
