#[derive(Debug, thiserror::Error)]
pub enum CardfolioError {
    #[error("store error: {0}")]
    Store(#[from] duckdb::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("pricing service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("rate limited by pricing service")]
    RateLimited,
}

pub type Result<T> = std::result::Result<T, CardfolioError>;
