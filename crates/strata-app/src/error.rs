//! Application errors.

use strata_core::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to encode PNG: {0}")]
    Png(#[from] png::EncodingError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type AppResult<T> = Result<T, AppError>;
