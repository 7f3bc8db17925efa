//! Selection of per-class candidate boxes from the raw network outputs.

use ndarray::ArrayView2;
use tracing::{debug, trace};

use crate::{
    BACKGROUND_CLASS, DetectConfig, Error, ImageInfo, Result,
    bbox::{Bbox, Xyxy},
    box_coder::BoxCoder,
};

/// All boxes of a single class that passed the confidence threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassCandidates {
    /// Index of the class in the score matrix, never [`BACKGROUND_CLASS`].
    pub class_id: usize,
    /// Clipped boxes in original image coordinates, with their confidence, in ROI order.
    pub boxes: Vec<(Bbox<Xyxy>, f32)>,
}

/// Check that rois are `[N, 4]`, scores are `[N, C]` and bbox deltas are `[N, 4 * C]`.
pub fn check_shapes(
    rois: ArrayView2<f32>,
    scores: ArrayView2<f32>,
    bbox_deltas: ArrayView2<f32>,
) -> Result<()> {
    if rois.ncols() != 4 {
        return Err(Error::ShapeMismatch {
            what: "roi columns",
            expected: 4,
            actual: rois.ncols(),
        });
    }

    let num_rois = rois.nrows();
    if scores.nrows() != num_rois {
        return Err(Error::ShapeMismatch {
            what: "score rows",
            expected: num_rois,
            actual: scores.nrows(),
        });
    }

    if bbox_deltas.nrows() != num_rois {
        return Err(Error::ShapeMismatch {
            what: "bbox delta rows",
            expected: num_rois,
            actual: bbox_deltas.nrows(),
        });
    }

    if bbox_deltas.ncols() != 4 * scores.ncols() {
        return Err(Error::ShapeMismatch {
            what: "bbox delta columns",
            expected: 4 * scores.ncols(),
            actual: bbox_deltas.ncols(),
        });
    }

    Ok(())
}

/// Decode every ROI for every foreground class and keep the ones scoring above
/// `config.conf_thresh`.
///
/// Decoded boxes are clipped to the network input and then divided by the image scale, so the
/// candidates are in original image coordinates. Boxes that decode to non-finite coordinates
/// are dropped as if their score were zero.
///
/// One [`ClassCandidates`] is returned per foreground class, in class order, including classes
/// without any candidates.
pub fn filter_candidates(
    rois: ArrayView2<f32>,
    scores: ArrayView2<f32>,
    bbox_deltas: ArrayView2<f32>,
    image_info: &ImageInfo,
    config: &DetectConfig,
) -> Result<Vec<ClassCandidates>> {
    check_shapes(rois, scores, bbox_deltas)?;

    let box_coder = BoxCoder::new(config.bbox_stds);
    let pred_boxes = box_coder.decode(bbox_deltas, rois);

    let num_classes = scores.ncols();
    let mut dropped = 0_usize;
    let mut classes = Vec::with_capacity(num_classes.saturating_sub(1));

    for class_id in (BACKGROUND_CLASS + 1)..num_classes {
        let column = class_id * 4;
        let mut boxes = Vec::new();

        for (i, &score) in scores.column(class_id).iter().enumerate() {
            // also rejects NaN scores
            if !(score > config.conf_thresh) {
                continue;
            }

            let bbox = Bbox::xyxy(
                pred_boxes[[i, column]],
                pred_boxes[[i, column + 1]],
                pred_boxes[[i, column + 2]],
                pred_boxes[[i, column + 3]],
            );

            if !bbox.is_finite() {
                trace!(roi = i, class_id, ?bbox, "dropping non-finite box");
                dropped += 1;
                continue;
            }

            let bbox = bbox
                .clip(image_info.height, image_info.width)
                .scaled_down(image_info.scale);

            boxes.push((bbox, score));
        }

        trace!(class_id, candidates = boxes.len(), "filtered class");
        classes.push(ClassCandidates { class_id, boxes });
    }

    if dropped > 0 {
        debug!(dropped, "dropped boxes with non-finite coordinates");
    }

    Ok(classes)
}
