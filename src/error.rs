//! Error type shared by the library

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("{file}: missing columns {missing:?} (present: {present:?}, delimiter {delimiter:?})")]
    MissingColumns {
        file: String,
        missing: Vec<String>,
        present: Vec<String>,
        delimiter: char,
    },

    #[error("invalid scenario {id}: {reason}")]
    InvalidScenario { id: String, reason: String },

    #[error("{provider} does not quote a {term_months}-month term")]
    UnsupportedTerm { provider: String, term_months: u32 },

    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("no {prefix}*.jsonl log in {}", .dir.display())]
    NoQuoteLog { dir: PathBuf, prefix: String },
}

pub type Result<T> = std::result::Result<T, MonitorError>;
