use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decoder service error: {0}")]
    Service(#[from] webcast_decoder::ServiceError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Broken pipe: consumer closed the connection")]
    BrokenPipe,
}

impl AppError {
    /// Map write errors on stdout so a closed pipe can exit quietly.
    pub fn from_write(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::BrokenPipe {
            AppError::BrokenPipe
        } else {
            AppError::Io(err)
        }
    }
}
