use ndarray::{Array2, ArrayView2, Axis, s};

/// Largest `dw`/`dh` that is exponentiated, `ln(1000 / 16)`.
///
/// A box can grow at most 62.5 times its base size in either direction.
pub fn default_bbox_xform_clip() -> f32 {
    (1000.0_f32 / 16.0).ln()
}

/// Utility that decodes bounding boxes from the regression format output by the model.
///
/// Deltas are `(dx, dy, dw, dh)` relative to a base box: a center shift in units of the base
/// box size, and a log-scale size change. Base boxes use the pixel-inclusive convention, so a
/// zero delta reproduces the base box exactly.
#[derive(Debug, Clone, Copy)]
pub struct BoxCoder {
    /// The standard deviations the raw deltas are multiplied with before decoding.
    pub stds: (f32, f32, f32, f32),
    /// The maximum value for the `dw` and `dh` deltas, before clamping.
    /// This is used to avoid overflow when applying the exponent.
    pub bbox_xform_clip: f32,
}

impl BoxCoder {
    /// Create a new [`BoxCoder`] with the given standard deviations.
    ///
    /// This will default to a `bbox_xform_clip` of `ln(1000/16)`.
    #[must_use]
    pub fn new(stds: (f32, f32, f32, f32)) -> Self {
        Self::new_with_clip(stds, default_bbox_xform_clip())
    }

    /// Create a new [`BoxCoder`] with the given standard deviations and clipping value.
    #[must_use]
    pub fn new_with_clip(stds: (f32, f32, f32, f32), bbox_xform_clip: f32) -> Self {
        BoxCoder {
            stds,
            bbox_xform_clip,
        }
    }

    /// Decode class-specific deltas against their base boxes.
    ///
    /// `rel_codes` has shape `[N, 4 * K]`, with the `(dx, dy, dw, dh)` of class `k` in columns
    /// `4k..4k + 4`, and `boxes` has shape `[N, 4]` in xyxy format. The result has the same
    /// shape as `rel_codes`, holding one xyxy box per ROI and class.
    ///
    /// The output is not clipped to the image; see [`Bbox::clip`](crate::bbox::Bbox::clip).
    #[must_use]
    pub fn decode(&self, rel_codes: ArrayView2<f32>, boxes: ArrayView2<f32>) -> Array2<f32> {
        debug_assert_eq!(rel_codes.nrows(), boxes.nrows());

        let widths = &boxes.column(2) - &boxes.column(0) + 1.0;
        let heights = &boxes.column(3) - &boxes.column(1) + 1.0;

        let center_x = &boxes.column(0) + 0.5 * (&widths - 1.0);
        let center_y = &boxes.column(1) + 0.5 * (&heights - 1.0);

        // [N, 1] so they broadcast over the class columns
        let widths = widths.insert_axis(Axis(1));
        let heights = heights.insert_axis(Axis(1));
        let center_x = center_x.insert_axis(Axis(1));
        let center_y = center_y.insert_axis(Axis(1));

        let (sx, sy, sw, sh) = self.stds;

        let dx = &rel_codes.slice(s![.., 0..;4]) * sx;
        let dy = &rel_codes.slice(s![.., 1..;4]) * sy;
        let dw = &rel_codes.slice(s![.., 2..;4]) * sw;
        let dh = &rel_codes.slice(s![.., 3..;4]) * sh;

        // clamp to avoid overflow in exp, NaN must stay NaN so the box is rejected later
        let clip = |x: f32| if x.is_nan() { x } else { x.min(self.bbox_xform_clip) };
        let dw = dw.mapv(clip);
        let dh = dh.mapv(clip);

        let pred_center_x = &dx * &widths + &center_x;
        let pred_center_y = &dy * &heights + &center_y;

        let pred_w = dw.mapv(f32::exp) * &widths;
        let pred_h = dh.mapv(f32::exp) * &heights;

        let center_to_corner_w = 0.5 * (pred_w - 1.0);
        let center_to_corner_h = 0.5 * (pred_h - 1.0);

        let mut pred_boxes = Array2::zeros(rel_codes.raw_dim());
        pred_boxes
            .slice_mut(s![.., 0..;4])
            .assign(&(&pred_center_x - &center_to_corner_w));
        pred_boxes
            .slice_mut(s![.., 1..;4])
            .assign(&(&pred_center_y - &center_to_corner_h));
        pred_boxes
            .slice_mut(s![.., 2..;4])
            .assign(&(&pred_center_x + &center_to_corner_w));
        pred_boxes
            .slice_mut(s![.., 3..;4])
            .assign(&(&pred_center_y + &center_to_corner_h));

        pred_boxes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-4, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn zero_delta_is_identity() {
        let coder = BoxCoder::new((0.1, 0.1, 0.2, 0.2));
        let rois = array![[0.0, 0.0, 9.0, 9.0], [13.0, 7.0, 40.0, 22.0]];
        let deltas = Array2::zeros((2, 8));

        let decoded = coder.decode(deltas.view(), rois.view());

        for row in 0..2 {
            for class in 0..2 {
                let bbox = decoded.slice(s![row, class * 4..(class + 1) * 4]);
                assert_eq!(bbox, rois.row(row));
            }
        }
    }

    #[test]
    fn deltas_are_scaled_by_stds() {
        let coder = BoxCoder::new((0.1, 0.1, 0.2, 0.2));
        let rois = array![[0.0, 0.0, 9.0, 9.0]];
        // dx = 1 -> 0.1 * width = 1 pixel shift
        let deltas = array![[1.0, 0.0, 0.0, 0.0]];

        let decoded = coder.decode(deltas.view(), rois.view());

        assert_close(decoded.row(0).as_slice().unwrap(), &[1.0, 0.0, 10.0, 9.0]);
    }

    #[test]
    fn log_scale_deltas_grow_around_center() {
        let coder = BoxCoder::new((1.0, 1.0, 1.0, 1.0));
        let rois = array![[10.0, 10.0, 19.0, 19.0]];
        let deltas = array![[0.0, 0.0, 2.0_f32.ln(), 0.0]];

        let decoded = coder.decode(deltas.view(), rois.view());

        // width 10 -> 20 around center 14.5
        assert_close(decoded.row(0).as_slice().unwrap(), &[5.0, 10.0, 24.0, 19.0]);
    }

    #[test]
    fn class_columns_decode_independently() {
        let coder = BoxCoder::new((1.0, 1.0, 1.0, 1.0));
        let rois = array![[0.0, 0.0, 9.0, 9.0]];
        let deltas = array![[0.0, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0]];

        let decoded = coder.decode(deltas.view(), rois.view());

        assert_close(
            decoded.row(0).as_slice().unwrap(),
            &[0.0, 0.0, 9.0, 9.0, 5.0, 0.0, 14.0, 9.0],
        );
    }

    #[test]
    fn extreme_size_deltas_stay_finite() {
        let coder = BoxCoder::new((0.1, 0.1, 0.2, 0.2));
        let rois = array![[0.0, 0.0, 15.0, 15.0]];
        let deltas = array![[0.0, 0.0, 100.0, 1e30]];

        let decoded = coder.decode(deltas.view(), rois.view());

        assert!(decoded.iter().all(|v| v.is_finite()));
        // 16 * exp(ln(62.5)) = 1000
        let width = decoded[[0, 2]] - decoded[[0, 0]] + 1.0;
        assert!((width - 1000.0).abs() < 1e-2);
    }

    #[test]
    fn nan_size_delta_is_not_clamped_away() {
        let coder = BoxCoder::new((0.1, 0.1, 0.2, 0.2));
        let rois = array![[40.0, 30.0, 59.0, 49.0]];
        let deltas = array![[0.0, 0.0, f32::NAN, 0.0]];

        let decoded = coder.decode(deltas.view(), rois.view());

        assert!(decoded[[0, 0]].is_nan());
        assert!(decoded[[0, 2]].is_nan());
        assert_eq!(decoded[[0, 1]], 30.0);
    }

    #[test]
    fn empty_input_decodes_to_empty_output() {
        let coder = BoxCoder::new((0.1, 0.1, 0.2, 0.2));
        let decoded = coder.decode(Array2::zeros((0, 84)).view(), Array2::zeros((0, 4)).view());

        assert_eq!(decoded.dim(), (0, 84));
    }
}
