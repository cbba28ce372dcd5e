//! Engine errors.

use thiserror::Error;

/// Errors the engine reports to its collaborators.
///
/// Invalid commands are not errors: they are ignored. Only conditions the
/// caller must react to end up here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to allocate a {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },
    #[error("Bitmap data is {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    InvalidBitmap {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
