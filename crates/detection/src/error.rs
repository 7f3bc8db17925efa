//! See [`Error`].

use miette::Diagnostic;
use thiserror::Error;

/// Error types for this crate.
///
/// Every variant describes a caller bug or a configuration mistake; decoding is deterministic
/// and never fails transiently.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("`{name}` is {value}, but it must be {expected}")]
    #[diagnostic(code(detection::invalid_config))]
    InvalidConfig {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },

    #[error("{what} has shape mismatch: expected {expected}, got {actual}")]
    #[diagnostic(
        code(detection::shape_mismatch),
        help("rois must be [N, 4], scores [N, C] and bbox deltas [N, 4 * C]")
    )]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid image info: height {height}, width {width}, scale {scale}")]
    #[diagnostic(
        code(detection::invalid_image_info),
        help("height, width and scale must all be finite and strictly positive")
    )]
    InvalidImageInfo { height: f32, width: f32, scale: f32 },
}

/// Type alias for [`Result<T, Error>`].
pub type Result<T> = std::result::Result<T, Error>;
