//! Per-batch server addressing and translation options.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Translation backend running behind the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Engine {
    /// First-generation engine; uses `service`.
    #[default]
    #[serde(rename = "pdf2zh")]
    Pdf2zh,
    /// Second-generation engine; uses `next_service`.
    #[serde(rename = "pdf2zh_next")]
    Pdf2zhNext,
}

impl Engine {
    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Pdf2zh => "pdf2zh",
            Engine::Pdf2zhNext => "pdf2zh_next",
        }
    }
}

/// Backend-specific options forwarded verbatim to the server.
///
/// The first block applies to both engines, the `babeldoc`..`font_file` block
/// to `pdf2zh` only, and the rest to `pdf2zh_next` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationOptions {
    pub source_lang: String,
    pub target_lang: String,
    /// Number of trailing pages the server should leave untranslated.
    pub skip_last_pages: u32,
    pub thread_num: u32,
    pub qps: u32,
    pub pool_size: u32,

    // Output variants to generate.
    pub mono: bool,
    pub dual: bool,
    pub mono_cut: bool,
    pub dual_cut: bool,
    pub crop_compare: bool,
    pub compare: bool,

    pub babeldoc: bool,
    pub skip_subset_fonts: bool,
    pub font_file: String,

    pub font_family: String,
    pub dual_mode: String,
    pub trans_first: bool,
    pub ocr: bool,
    pub auto_ocr: bool,
    pub no_watermark: bool,
    pub save_glossary: bool,
    pub disable_glossary: bool,
    pub no_dual: bool,
    pub no_mono: bool,
    pub skip_clean: bool,
    pub disable_rich_text_translate: bool,
    pub enhance_compatibility: bool,
    pub translate_table_text: bool,
    pub only_include_translated_page: bool,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            source_lang: "en".to_string(),
            target_lang: "zh".to_string(),
            skip_last_pages: 0,
            thread_num: 4,
            qps: 10,
            pool_size: 0,
            mono: true,
            dual: true,
            mono_cut: false,
            dual_cut: false,
            crop_compare: false,
            compare: false,
            babeldoc: false,
            skip_subset_fonts: false,
            font_file: String::new(),
            font_family: "auto".to_string(),
            dual_mode: "LR".to_string(),
            trans_first: false,
            ocr: false,
            auto_ocr: true,
            no_watermark: true,
            save_glossary: false,
            disable_glossary: false,
            no_dual: false,
            no_mono: false,
            skip_clean: false,
            disable_rich_text_translate: false,
            enhance_compatibility: false,
            translate_table_text: false,
            only_include_translated_page: false,
        }
    }
}

/// Immutable description of how to reach the server and what to ask of it.
///
/// Built once per batch (see `AppConfig::server_config`) and cloned into each
/// job; nothing mutates it while jobs run.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Server base URL without a trailing slash, e.g. `http://localhost:8890`.
    pub base_url: String,
    /// Overall budget for one job: bounds the submit call and the poll phase.
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub engine: Engine,
    pub service: String,
    pub next_service: String,
    pub options: TranslationOptions,
}

impl ServerConfig {
    /// Checks `timeout > poll_interval > 0` and that the base URL parses.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            anyhow::bail!("poll interval must be greater than zero");
        }
        if self.timeout <= self.poll_interval {
            anyhow::bail!(
                "timeout ({:?}) must be greater than poll interval ({:?})",
                self.timeout,
                self.poll_interval
            );
        }
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| anyhow::anyhow!("invalid server URL {:?}: {}", self.base_url, e))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("server URL {:?} cannot be used as a base", self.base_url);
        }
        Ok(())
    }

    /// The service name the configured engine will use.
    pub fn active_service(&self) -> &str {
        match self.engine {
            Engine::Pdf2zh => &self.service,
            Engine::Pdf2zhNext => &self.next_service,
        }
    }
}

/// LLM API credential attached to a submit request when one is active for the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub service: String,
    pub model: String,
    pub api_key: String,
    pub api_url: String,
    #[serde(default)]
    pub extra_data: std::collections::BTreeMap<String, String>,
}
