use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sheet endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("could not decode sheet payload: {0}")]
    Decode(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
