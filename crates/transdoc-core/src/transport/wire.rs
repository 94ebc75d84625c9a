//! JSON wire format of the translation server.
//!
//! Replies are parsed once and immediately closed over the statuses the
//! protocol defines (`SubmitResult`, `RemoteStatus`), so nothing downstream
//! branches on raw status strings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize, Serializer};

use super::SubmitResult;
use crate::error::TranslateError;
use crate::model::{Credential, JobOutcome, RemoteTaskHandle, ServerConfig};

/// Prefix the server strips before decoding `fileContent`.
const PDF_DATA_URL_PREFIX: &str = "data:application/pdf;base64,";

/// Encodes a PDF as the data URL carried in `fileContent`.
pub fn encode_pdf(bytes: &[u8]) -> String {
    format!("{}{}", PDF_DATA_URL_PREFIX, STANDARD.encode(bytes))
}

fn flag<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(if *value { "true" } else { "false" })
}

/// Body of `POST {base}/{endpoint}`: the file plus every `ServerConfig` field.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest<'a> {
    pub file_name: &'a str,
    pub file_content: String,
    pub server_url: &'a str,
    /// Milliseconds.
    pub timeout: u64,
    /// Milliseconds.
    pub progress_poll_interval: u64,
    pub engine: &'static str,
    pub service: &'a str,
    pub next_service: &'a str,
    pub source_lang: &'a str,
    pub target_lang: &'a str,
    pub skip_last_pages: String,
    pub thread_num: String,
    pub qps: String,
    pub pool_size: String,
    #[serde(serialize_with = "flag")]
    pub mono: bool,
    #[serde(serialize_with = "flag")]
    pub dual: bool,
    #[serde(rename = "mono_cut", serialize_with = "flag")]
    pub mono_cut: bool,
    #[serde(rename = "dual_cut", serialize_with = "flag")]
    pub dual_cut: bool,
    #[serde(rename = "crop_compare", serialize_with = "flag")]
    pub crop_compare: bool,
    #[serde(serialize_with = "flag")]
    pub compare: bool,
    #[serde(serialize_with = "flag")]
    pub babeldoc: bool,
    #[serde(serialize_with = "flag")]
    pub skip_subset_fonts: bool,
    pub font_file: &'a str,
    pub font_family: &'a str,
    pub dual_mode: &'a str,
    #[serde(serialize_with = "flag")]
    pub trans_first: bool,
    #[serde(serialize_with = "flag")]
    pub ocr: bool,
    #[serde(serialize_with = "flag")]
    pub auto_ocr: bool,
    #[serde(serialize_with = "flag")]
    pub no_watermark: bool,
    #[serde(serialize_with = "flag")]
    pub save_glossary: bool,
    #[serde(serialize_with = "flag")]
    pub disable_glossary: bool,
    #[serde(serialize_with = "flag")]
    pub no_dual: bool,
    #[serde(serialize_with = "flag")]
    pub no_mono: bool,
    #[serde(serialize_with = "flag")]
    pub skip_clean: bool,
    #[serde(serialize_with = "flag")]
    pub disable_rich_text_translate: bool,
    #[serde(serialize_with = "flag")]
    pub enhance_compatibility: bool,
    #[serde(serialize_with = "flag")]
    pub translate_table_text: bool,
    #[serde(serialize_with = "flag")]
    pub only_include_translated_page: bool,
    #[serde(rename = "llm_api", skip_serializing_if = "Option::is_none")]
    pub llm_api: Option<&'a Credential>,
}

impl<'a> SubmitRequest<'a> {
    pub fn new(
        file_name: &'a str,
        file_content: String,
        config: &'a ServerConfig,
        credential: Option<&'a Credential>,
    ) -> Self {
        let o = &config.options;
        SubmitRequest {
            file_name,
            file_content,
            server_url: &config.base_url,
            timeout: config.timeout.as_millis() as u64,
            progress_poll_interval: config.poll_interval.as_millis() as u64,
            engine: config.engine.as_str(),
            service: &config.service,
            next_service: &config.next_service,
            source_lang: &o.source_lang,
            target_lang: &o.target_lang,
            skip_last_pages: o.skip_last_pages.to_string(),
            thread_num: o.thread_num.to_string(),
            qps: o.qps.to_string(),
            pool_size: o.pool_size.to_string(),
            mono: o.mono,
            dual: o.dual,
            mono_cut: o.mono_cut,
            dual_cut: o.dual_cut,
            crop_compare: o.crop_compare,
            compare: o.compare,
            babeldoc: o.babeldoc,
            skip_subset_fonts: o.skip_subset_fonts,
            font_file: &o.font_file,
            font_family: &o.font_family,
            dual_mode: &o.dual_mode,
            trans_first: o.trans_first,
            ocr: o.ocr,
            auto_ocr: o.auto_ocr,
            no_watermark: o.no_watermark,
            save_glossary: o.save_glossary,
            disable_glossary: o.disable_glossary,
            no_dual: o.no_dual,
            no_mono: o.no_mono,
            skip_clean: o.skip_clean,
            disable_rich_text_translate: o.disable_rich_text_translate,
            enhance_compatibility: o.enhance_compatibility,
            translate_table_text: o.translate_table_text,
            only_include_translated_page: o.only_include_translated_page,
            llm_api: credential,
        }
    }
}

/// Reply to submit and to `GET /result/{taskId}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerReply {
    #[serde(default)]
    status: String,
    message: Option<String>,
    task_id: Option<String>,
    file_list: Option<Vec<String>>,
    error_type: Option<String>,
}

impl ServerReply {
    fn error_message(&self) -> String {
        let message = self
            .message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "server returned an error".to_string());
        match self.error_type.as_deref() {
            Some(kind) if !kind.is_empty() && !message.starts_with(kind) => {
                format!("{}: {}", kind, message)
            }
            _ => message,
        }
    }
}

/// Turns a submit (or result) reply into a `SubmitResult`.
///
/// `processing` + `taskId` is accepted regardless of HTTP status; otherwise a
/// non-2xx status or `status: "error"` is a `Server` error.
pub fn interpret_reply(http_status: u32, body: &[u8]) -> Result<SubmitResult, TranslateError> {
    let ok = (200..300).contains(&http_status);
    let reply: ServerReply = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(_) if !ok => return Err(TranslateError::Server(format!("HTTP {}", http_status))),
        Err(e) => {
            return Err(TranslateError::Server(format!(
                "malformed server response: {}",
                e
            )))
        }
    };

    if reply.status == "processing" {
        if let Some(task_id) = reply.task_id.as_deref().filter(|id| !id.is_empty()) {
            return Ok(SubmitResult::Accepted(RemoteTaskHandle::new(task_id)));
        }
    }
    if !ok || reply.status == "error" {
        return Err(TranslateError::Server(reply.error_message()));
    }
    match reply.status.as_str() {
        "success" => Ok(SubmitResult::Immediate(JobOutcome::from_file_list(
            reply.file_list.unwrap_or_default(),
        ))),
        other => Err(TranslateError::Server(format!(
            "unexpected response status {:?}",
            other
        ))),
    }
}

/// Server-side task status as reported by `GET /progress/{taskId}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    Processing,
    Completed,
    Error,
    /// Unrecognized status, or the query itself failed.
    Unknown,
}

impl RemoteStatus {
    fn from_wire(s: &str) -> Self {
        match s {
            "processing" => RemoteStatus::Processing,
            "completed" => RemoteStatus::Completed,
            "error" => RemoteStatus::Error,
            _ => RemoteStatus::Unknown,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProgressReply {
    #[serde(default)]
    status: String,
    progress: Option<f64>,
    message: Option<String>,
    eta_minutes: Option<f64>,
    elapsed_seconds: Option<f64>,
    total_pages: Option<u32>,
}

/// One progress reading. `progress` is 0..=100, or -1 when unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub status: RemoteStatus,
    pub progress: i32,
    pub message: Option<String>,
    pub eta_minutes: Option<f64>,
    pub elapsed_seconds: Option<f64>,
    pub total_pages: Option<u32>,
}

impl ProgressSnapshot {
    /// Stand-in for a failed query: keeps the poll loop alive without progress.
    pub fn unknown() -> Self {
        ProgressSnapshot {
            status: RemoteStatus::Unknown,
            progress: -1,
            message: None,
            eta_minutes: None,
            elapsed_seconds: None,
            total_pages: None,
        }
    }

    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: ProgressReply = serde_json::from_slice(body)?;
        let progress = match raw.progress {
            Some(p) if p.is_finite() && p >= 0.0 => p.round().min(100.0) as i32,
            _ => -1,
        };
        Ok(ProgressSnapshot {
            status: RemoteStatus::from_wire(&raw.status),
            progress,
            message: raw.message.filter(|m| !m.is_empty()),
            eta_minutes: raw.eta_minutes,
            elapsed_seconds: raw.elapsed_seconds,
            total_pages: raw.total_pages,
        })
    }
}

/// Reply of `GET {base}/health`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServerInfo {
    pub status: Option<String>,
    pub version: Option<String>,
    pub message: Option<String>,
    pub mode: Option<String>,
    pub engine_ready: Option<bool>,
}
