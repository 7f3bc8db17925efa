//! Greedy non-maximum suppression.

use itertools::Itertools;

use crate::bbox::{ConvertBbox, Xyxy};

/// Applies Non-Maximum Suppression (NMS) to the given bounding boxes and scores.
///
/// Boxes are visited from the highest to the lowest score; every visited box that has not been
/// suppressed yet is kept, and suppresses all remaining boxes whose IoU with it is strictly
/// greater than `threshold`.
///
/// Returns the indices of the kept boxes in the order they were selected, i.e. by descending
/// score. Boxes with equal scores keep their relative input order.
///
/// Scores must not be `NaN`.
pub fn non_max_suppression<B>(detections: &[(B, f32)], threshold: f32) -> Vec<usize>
where
    B: ConvertBbox<Xyxy>,
{
    let order = (0..detections.len())
        .sorted_by(|&a, &b| detections[b].1.total_cmp(&detections[a].1))
        .collect_vec();

    let mut suppressed = vec![false; detections.len()];
    let mut keep = Vec::new();

    for (rank, &i) in order.iter().enumerate() {
        if suppressed[i] {
            continue;
        }

        keep.push(i);
        let kept = detections[i].0.convert();

        for &j in &order[rank + 1..] {
            if !suppressed[j] && kept.iou(&detections[j].0) > threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}
