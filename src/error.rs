use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid task {id}: {message}")]
    InvalidTask { id: String, message: String },

    #[error("Invalid week label: {0}")]
    WeekParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
