use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifierError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("A verification run is already in progress")]
    AlreadyRunning,

    #[error("Row index {index} out of range (rows: {len})")]
    RowOutOfRange { index: usize, len: usize },

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to persist {path}: {source}")]
    PersistFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker task failed: {0}")]
    WorkerFailed(String),
}

impl VerifierError {
    /// Errors meaning the channel to the service (or to the output file) is broken.
    /// Continuing after one of these would fail every remaining row.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            VerifierError::HttpError(_)
                | VerifierError::ApiError { .. }
                | VerifierError::MalformedResponse(_)
                | VerifierError::PersistFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, VerifierError>;
