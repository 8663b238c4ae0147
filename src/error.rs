use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config line {line}: {content}")]
    InvalidLine { line: usize, content: String },
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{method} failed: {status} {body}")]
    Status {
        method: &'static str,
        status: u16,
        body: String,
    },
    #[error("{0} returned ok: false")]
    NotOk(&'static str),
}
