use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default de-normalization constants for the `(dx, dy, dw, dh)` regression deltas.
pub const DEFAULT_BBOX_STDS: (f32, f32, f32, f32) = (0.1, 0.1, 0.2, 0.2);

/// Default IoU threshold above which a lower scoring box of the same class is suppressed.
pub const DEFAULT_NMS_THRESH: f32 = 0.3;

/// Default score a class must exceed for a region of interest to become a candidate.
pub const DEFAULT_CONF_THRESH: f32 = 1e-3;

/// Immutable settings for a single [`im_detect`](crate::im_detect) call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectConfig {
    /// Per-coordinate standard deviations the raw deltas are multiplied with before decoding.
    pub bbox_stds: (f32, f32, f32, f32),
    /// IoU threshold for non-maximum suppression, in `(0, 1]`.
    pub nms_thresh: f32,
    /// Confidence threshold for candidates, in `[0, 1)`.
    pub conf_thresh: f32,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            bbox_stds: DEFAULT_BBOX_STDS,
            nms_thresh: DEFAULT_NMS_THRESH,
            conf_thresh: DEFAULT_CONF_THRESH,
        }
    }
}

impl DetectConfig {
    /// Create a new [`DetectConfig`], rejecting out-of-range values.
    pub fn new(bbox_stds: (f32, f32, f32, f32), nms_thresh: f32, conf_thresh: f32) -> Result<Self> {
        let config = Self {
            bbox_stds,
            nms_thresh,
            conf_thresh,
        };
        config.validate()?;

        Ok(config)
    }

    /// Check that every setting lies in its allowed range.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.conf_thresh) {
            return Err(Error::InvalidConfig {
                name: "conf_thresh",
                value: self.conf_thresh,
                expected: "in [0, 1)",
            });
        }

        if !(self.nms_thresh > 0.0 && self.nms_thresh <= 1.0) {
            return Err(Error::InvalidConfig {
                name: "nms_thresh",
                value: self.nms_thresh,
                expected: "in (0, 1]",
            });
        }

        let (sx, sy, sw, sh) = self.bbox_stds;
        for std in [sx, sy, sw, sh] {
            if !(std.is_finite() && std > 0.0) {
                return Err(Error::InvalidConfig {
                    name: "bbox_stds",
                    value: std,
                    expected: "finite and strictly positive",
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(DetectConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_conf_thresh() {
        for conf_thresh in [-0.1, 1.0, 1.5, f32::NAN] {
            let result = DetectConfig::new(DEFAULT_BBOX_STDS, 0.3, conf_thresh);
            assert!(matches!(
                result,
                Err(Error::InvalidConfig {
                    name: "conf_thresh",
                    ..
                })
            ));
        }
    }

    #[test]
    fn rejects_out_of_range_nms_thresh() {
        for nms_thresh in [0.0, -0.5, 1.01, f32::NAN] {
            let result = DetectConfig::new(DEFAULT_BBOX_STDS, nms_thresh, 1e-3);
            assert!(matches!(
                result,
                Err(Error::InvalidConfig {
                    name: "nms_thresh",
                    ..
                })
            ));
        }
    }

    #[test]
    fn accepts_threshold_boundaries() {
        assert!(DetectConfig::new(DEFAULT_BBOX_STDS, 1.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_non_finite_stds() {
        let result = DetectConfig::new((0.1, f32::INFINITY, 0.2, 0.2), 0.3, 1e-3);
        assert!(matches!(
            result,
            Err(Error::InvalidConfig {
                name: "bbox_stds",
                ..
            })
        ));
    }
}
