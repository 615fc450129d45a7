use std::{path::PathBuf, time::Duration};

pub const DEFAULT_INFERENCE_URL: &str = "http://localhost:1234/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "local-model";
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TOP_WORDS: usize = 50;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_DICTIONARY: &str = "dictionary.txt";

/// Environment variable overriding the inference endpoint location.
pub const INFERENCE_URL_ENV: &str = "BOGGLE_INFERENCE_URL";
/// Environment variable overriding the listening port.
pub const PORT_ENV: &str = "PORT";

/// Where and how to reach the vision model.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    /// Bounds the whole inference round-trip, connection included.
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_INFERENCE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub top_words: usize,
    pub max_upload_bytes: usize,
    pub dictionary: PathBuf,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            top_words: DEFAULT_TOP_WORDS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            dictionary: PathBuf::from(DEFAULT_DICTIONARY),
        }
    }
}

/// Inference endpoint from `BOGGLE_INFERENCE_URL`, falling back to the local default.
///
/// Meant to be read once at startup.
pub fn inference_url_from_env() -> String {
    std::env::var(INFERENCE_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_INFERENCE_URL.to_string())
}

/// Listening port from `PORT`, falling back to the default when unset or unparsable.
pub fn port_from_env() -> u16 {
    parse_port(std::env::var(PORT_ENV).ok().as_deref())
}

fn parse_port(value: Option<&str>) -> u16 {
    match value.map(str::trim) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {PORT_ENV} value {raw:?}");
            DEFAULT_PORT
        }),
        None => DEFAULT_PORT,
    }
}
