//! Error types for mip generation and flooding.

use thiserror::Error;

/// Errors reported before any mip level is allocated.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported element kind tag: {tag}")]
    UnsupportedFormat { tag: u8 },

    #[error("Invalid channel configuration: {reason}")]
    InvalidChannelConfiguration { reason: String },

    #[error("Resolution {width}x{height} out of range, both dimensions must be below 65535")]
    ResolutionOutOfRange { width: u32, height: u32 },

    #[error("Buffer size mismatch: expected {expected} elements, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error(
        "Coverage mask mismatch: expected single-channel {expected:?}, got {actual:?} with {channels} channels"
    )]
    MaskDimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
        channels: u8,
    },

    #[error("Coverage threshold must be within [0, 1], got {value}")]
    InvalidThreshold { value: f32 },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn channels(reason: impl Into<String>) -> Self {
        Error::InvalidChannelConfiguration {
            reason: reason.into(),
        }
    }
}
