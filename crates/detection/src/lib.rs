//! Post-processing for Faster R-CNN detection heads.
//!
//! The network itself is treated as a black box producing, for one image:
//! region proposals (ROIs), per-class scores and per-class bounding box regression deltas.
//! This crate turns those arrays into the final list of labeled, non-overlapping detections:
//!
//! 1. [`box_coder`] decodes the regression deltas against their ROI.
//! 2. [`filter`] clips the decoded boxes and keeps the per-class candidates above the
//!    confidence threshold.
//! 3. [`nms`] suppresses overlapping candidates of the same class.
//!
//! [`im_detect`] runs all three steps.

pub mod anchor;
pub mod bbox;
pub mod box_coder;
mod config;
mod detect;
mod error;
pub mod filter;
mod image_info;
pub mod meshgrid;
pub mod nms;

pub use config::{DEFAULT_BBOX_STDS, DEFAULT_CONF_THRESH, DEFAULT_NMS_THRESH, DetectConfig};
pub use detect::{Detection, im_detect};
pub use error::{Error, Result};
pub use image_info::ImageInfo;

/// Index of the background class in the score matrix; it never produces a detection.
pub const BACKGROUND_CLASS: usize = 0;
