use miette::Diagnostic;
use thiserror::Error;

use crate::dataset::Dataset;

/// Type alias for [`std::result::Result`] containing a rcnn-demo [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Enum describing the possible errors that can occur in rcnn-demo.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("failed to read `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse network outputs")]
    #[diagnostic(
        code(outputs::json),
        help("expected an object with `rois`, `scores`, `bbox_deltas` and optionally `im_info`")
    )]
    Json(#[from] serde_json::Error),

    #[error("row {row} of `{what}` has {actual} values, expected {expected}")]
    #[diagnostic(code(outputs::ragged))]
    InvalidOutputs {
        what: &'static str,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("scores have {actual} classes, but the {dataset} dataset has {expected}")]
    #[diagnostic(
        code(outputs::class_count),
        help("pass the `--dataset` the network was trained on")
    )]
    ClassCount {
        dataset: Dataset,
        expected: usize,
        actual: usize,
    },

    #[error("image error for `{path}`")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("`{path}` is not a usable font")]
    #[diagnostic(code(visualize::font), help("pass a TrueType or OpenType font with `--font`"))]
    Font {
        path: String,
        #[source]
        source: ab_glyph::InvalidFont,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] odal::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Detection(#[from] detection::Error),
}
