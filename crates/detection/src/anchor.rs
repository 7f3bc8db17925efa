use itertools::iproduct;
use ndarray::{Array1, Array2, ArrayView1, s};

use crate::{
    bbox::{Bbox, ConvertBbox, Cxcywh, Xyxy},
    meshgrid::{Indexing, meshgrid},
};

/// Generates the region proposal anchors of a single image.
#[derive(Debug, Clone)]
pub struct AnchorGenerator {
    pub base_size: f32,
    pub ratios: Vec<f32>,
    pub scales: Vec<f32>,
    base_anchors: Array2<f32>,
}

impl AnchorGenerator {
    /// Create a new [`AnchorGenerator`].
    ///
    /// `base_size` is usually the feature stride of the region proposal network.
    #[must_use]
    pub fn new(base_size: f32, ratios: &[f32], scales: &[f32]) -> AnchorGenerator {
        let base_anchors = Self::create_base_anchors(base_size, ratios, scales);

        AnchorGenerator {
            base_size,
            ratios: ratios.to_vec(),
            scales: scales.to_vec(),
            base_anchors,
        }
    }

    /// The anchors centered on the first feature map cell, shape `[ratios * scales, 4]`.
    #[must_use]
    pub fn base_anchors(&self) -> &Array2<f32> {
        &self.base_anchors
    }

    /// Number of anchors per feature map cell.
    #[must_use]
    pub fn num_base_anchors(&self) -> usize {
        self.base_anchors.nrows()
    }

    /// Create the anchors for every cell of the reference box `(0, 0, base_size - 1, base_size - 1)`.
    ///
    /// For each ratio the reference area is kept and reshaped to that aspect ratio (rounded to
    /// whole pixels), then every scale multiplies the reshaped width and height. Anchors are
    /// ordered ratio-major.
    fn create_base_anchors(base_size: f32, ratios: &[f32], scales: &[f32]) -> Array2<f32> {
        let reference: Bbox<Cxcywh> = Bbox::xyxy(0.0, 0.0, base_size - 1.0, base_size - 1.0).convert();
        let (center_x, center_y, width, height) = reference.inner;
        let area = width * height;

        let mut anchors = Array2::zeros((ratios.len() * scales.len(), 4));
        for (mut row, (&ratio, &scale)) in anchors.rows_mut().into_iter().zip(iproduct!(ratios, scales)) {
            // numpy rounding, so the anchors match the ones the network was trained with
            let ratio_w = (area / ratio).sqrt().round_ties_even();
            let ratio_h = (ratio_w * ratio).round_ties_even();

            let anchor: Bbox<Xyxy> =
                Bbox::cxcywh(center_x, center_y, ratio_w * scale, ratio_h * scale).convert();
            let (x1, y1, x2, y2) = anchor.inner;

            row.assign(&ArrayView1::from(&[x1, y1, x2, y2]));
        }

        anchors
    }

    /// Create all anchors of a `feat_height` x `feat_width` feature map with the given stride.
    ///
    /// The result has shape `[feat_height * feat_width * A, 4]`, where `A` is
    /// [`Self::num_base_anchors`]; row `(y * feat_width + x) * A + a` holds base anchor `a`
    /// shifted to cell `(x, y)`.
    #[must_use]
    pub fn create_anchors(&self, feat_height: usize, feat_width: usize, stride: usize) -> Array2<f32> {
        let stride = stride as f32;
        let shift_x = Array1::range(0.0, feat_width as f32, 1.0) * stride;
        let shift_y = Array1::range(0.0, feat_height as f32, 1.0) * stride;

        let (shift_x, shift_y) = meshgrid(shift_x.view(), shift_y.view(), Indexing::Xy);

        let num_base = self.num_base_anchors();
        let mut anchors = Array2::zeros((shift_x.len() * num_base, 4));

        for (k, (&x, &y)) in shift_x.iter().zip(shift_y.iter()).enumerate() {
            let shift = [x, y, x, y];
            anchors
                .slice_mut(s![k * num_base..(k + 1) * num_base, ..])
                .assign(&(&self.base_anchors + &ArrayView1::from(&shift)));
        }

        anchors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn default_generator() -> AnchorGenerator {
        AnchorGenerator::new(16.0, &[0.5, 1.0, 2.0], &[8.0, 16.0, 32.0])
    }

    #[test]
    fn base_anchors_match_reference_table() {
        let generator = default_generator();

        let expected: Array2<f32> = array![
            [-84.0, -40.0, 99.0, 55.0],
            [-176.0, -88.0, 191.0, 103.0],
            [-360.0, -184.0, 375.0, 199.0],
            [-56.0, -56.0, 71.0, 71.0],
            [-120.0, -120.0, 135.0, 135.0],
            [-248.0, -248.0, 263.0, 263.0],
            [-36.0, -80.0, 51.0, 95.0],
            [-80.0, -168.0, 95.0, 183.0],
            [-168.0, -344.0, 183.0, 359.0],
        ];

        assert_eq!(generator.base_anchors(), &expected);
    }

    #[test]
    fn anchors_cover_the_feature_map() {
        let generator = default_generator();
        let anchors = generator.create_anchors(2, 3, 16);

        assert_eq!(anchors.dim(), (2 * 3 * 9, 4));

        let base = generator.base_anchors();
        // second cell of the first row is shifted by one stride in x
        assert_eq!(
            anchors.row(9),
            &base.row(0) + &ArrayView1::from(&[16.0_f32, 0.0, 16.0, 0.0])
        );
        // first cell of the second row is shifted by one stride in y
        assert_eq!(
            anchors.row(3 * 9 + 4),
            &base.row(4) + &ArrayView1::from(&[0.0_f32, 16.0, 0.0, 16.0])
        );
    }

    #[test]
    fn empty_feature_map_has_no_anchors() {
        let anchors = default_generator().create_anchors(0, 10, 16);
        assert_eq!(anchors.nrows(), 0);
    }
}
