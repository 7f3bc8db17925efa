use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Metadata of the image the network was run on.
///
/// `height` and `width` describe the resized network input, `scale` maps the original image
/// onto it: `resized = original * scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub height: f32,
    pub width: f32,
    pub scale: f32,
}

impl ImageInfo {
    /// Create a new [`ImageInfo`], rejecting degenerate metadata.
    pub fn new(height: f32, width: f32, scale: f32) -> Result<Self> {
        let info = Self {
            height,
            width,
            scale,
        };
        info.validate()?;

        Ok(info)
    }

    /// Build the [`ImageInfo`] from an `im_info` row, `[height, width, scale]`.
    pub fn from_slice(row: &[f32]) -> Result<Self> {
        match *row {
            [height, width, scale] => Self::new(height, width, scale),
            _ => Err(Error::ShapeMismatch {
                what: "im_info",
                expected: 3,
                actual: row.len(),
            }),
        }
    }

    /// Compute the metadata of an image resized so that its short side becomes `short_side`,
    /// unless that would push its long side past `long_side`, in which case the long side is
    /// pinned to `long_side` instead.
    pub fn for_resize(
        orig_height: u32,
        orig_width: u32,
        short_side: u32,
        long_side: u32,
    ) -> Result<Self> {
        let size_min = orig_height.min(orig_width) as f32;
        let size_max = orig_height.max(orig_width) as f32;

        let mut scale = short_side as f32 / size_min;
        if (scale * size_max).round_ties_even() > long_side as f32 {
            scale = long_side as f32 / size_max;
        }

        Self::new(
            (orig_height as f32 * scale).round_ties_even(),
            (orig_width as f32 * scale).round_ties_even(),
            scale,
        )
    }

    /// Check that the metadata describes a non-empty image with a usable scale.
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f32| v.is_finite() && v > 0.0;

        if positive(self.height) && positive(self.width) && positive(self.scale) {
            Ok(())
        } else {
            Err(Error::InvalidImageInfo {
                height: self.height,
                width: self.width,
                scale: self.scale,
            })
        }
    }
}
