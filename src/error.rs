use thiserror::Error;

#[derive(Error, Debug)]
pub enum KassaflytError {
    #[error("Fetch failed for {url}: {cause}")]
    Fetch { url: String, cause: String },

    #[error("Could not resolve transaction {id}: {cause}")]
    Resolution { id: i64, cause: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, KassaflytError>;
