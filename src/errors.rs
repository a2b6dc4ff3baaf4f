// src/errors.rs

use thiserror::Error;

pub type BeautiragResult<T> = Result<T, BeautiragError>;

#[derive(Debug, Error)]
pub enum BeautiragError {
    /// The backend answered with a non-2xx status.
    #[error("backend returned {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Http {
        status: u16,
        detail: Option<String>,
    },

    /// The request never completed, or the body could not be understood.
    #[error("{0}")]
    Transport(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unsupported file type: {name}")]
    UnsupportedFile { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BeautiragError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn transport_error(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn http_error(status: u16, detail: Option<String>) -> Self {
        Self::Http { status, detail }
    }
}

impl From<reqwest::Error> for BeautiragError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
