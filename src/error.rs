//! Error taxonomy for engine operations.
//!
//! Cancellation is deliberately absent here: a cancelled filter reports
//! [`Outcome::Cancelled`](crate::ops::progress::Outcome) with the image
//! restored, which is a normal terminal state rather than a failure.

/// Errors a filter or buffer access can fail with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// An enum-like argument (direction, frame style, filter name, ...) was not recognised.
    #[error("invalid {name}: '{value}'")]
    InvalidParameter { name: &'static str, value: String },

    /// A requested width or height was zero or negative.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    /// A coordinate fell outside the buffer.
    #[error("pixel ({x}, {y}) channel {channel} is outside a {width}x{height} image")]
    OutOfRange {
        x: i64,
        y: i64,
        channel: usize,
        width: u32,
        height: u32,
    },
}

impl FilterError {
    pub(crate) fn invalid(name: &'static str, value: impl Into<String>) -> Self {
        FilterError::InvalidParameter {
            name,
            value: value.into(),
        }
    }

    pub(crate) fn dimensions(width: i64, height: i64) -> Self {
        FilterError::InvalidDimensions { width, height }
    }
}
