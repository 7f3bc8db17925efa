use ndarray::ArrayView2;
use tracing::{debug, debug_span};

use crate::{
    DetectConfig, ImageInfo, Result,
    bbox::{Bbox, Xyxy},
    filter::filter_candidates,
    nms::non_max_suppression,
};

/// A single final detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Index of the detected class, never the background class.
    pub class_id: usize,
    /// Score of the class for the region this box was decoded from.
    pub confidence: f32,
    /// The bounding box in original image coordinates.
    pub bbox: Bbox<Xyxy>,
}

impl Detection {
    /// The detection as a `[class_id, confidence, x1, y1, x2, y2]` row.
    #[must_use]
    pub fn to_row(&self) -> [f32; 6] {
        let (x1, y1, x2, y2) = self.bbox.inner;
        [self.class_id as f32, self.confidence, x1, y1, x2, y2]
    }
}

/// Turn the raw outputs of a Faster R-CNN head into final detections.
///
/// - `rois`: `[N, 4]` region proposals in network input coordinates.
/// - `scores`: `[N, C]` per-class probabilities, class `0` being the background.
/// - `bbox_deltas`: `[N, 4 * C]` class-specific regression deltas.
///
/// Each ROI is decoded once per foreground class, clipped to the network input, mapped back to
/// the original image, filtered by `config.conf_thresh` and finally suppressed per class with
/// `config.nms_thresh`. The configuration and image metadata are validated before any
/// decoding happens.
///
/// Detections are ordered by class and, within a class, by descending confidence.
/// Zero ROIs, or no score above the threshold, yield an empty list.
pub fn im_detect(
    rois: ArrayView2<f32>,
    scores: ArrayView2<f32>,
    bbox_deltas: ArrayView2<f32>,
    image_info: &ImageInfo,
    config: &DetectConfig,
) -> Result<Vec<Detection>> {
    config.validate()?;
    image_info.validate()?;

    let _span = debug_span!("im_detect", rois = rois.nrows(), classes = scores.ncols()).entered();

    let classes = filter_candidates(rois, scores, bbox_deltas, image_info, config)?;

    let mut detections = Vec::new();
    for candidates in classes {
        let keep = non_max_suppression(&candidates.boxes, config.nms_thresh);

        debug!(
            class_id = candidates.class_id,
            candidates = candidates.boxes.len(),
            kept = keep.len(),
            "applied nms"
        );

        detections.extend(keep.into_iter().map(|i| {
            let (bbox, confidence) = candidates.boxes[i];
            Detection {
                class_id: candidates.class_id,
                confidence,
                bbox,
            }
        }));
    }

    Ok(detections)
}
