use std::path::Path;

use detection::{DetectConfig, ImageInfo, anchor::AnchorGenerator};
use odal::{Config, ConfigKind, ErrorKind};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::network::Network;

/// Configuration of the demo, stored in `rcnn.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RcnnConfig {
    pub image: ImageConfig,
    pub rpn: RpnConfig,
    pub rcnn: RcnnHeadConfig,
    pub vis: VisConfig,
}

impl Config for RcnnConfig {
    const PATH: &'static str = "rcnn.toml";
}

/// Resizing and normalization of the network input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageConfig {
    /// Target length of the short image side.
    pub short_side: u32,
    /// Upper bound for the long image side after resizing.
    pub long_side: u32,
    pub pixel_means: (f32, f32, f32),
    pub pixel_stds: (f32, f32, f32),
}

/// Region proposal network settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RpnConfig {
    pub feat_stride: usize,
    pub anchor_scales: Vec<f32>,
    pub anchor_ratios: Vec<f32>,
    pub pre_nms_topk: usize,
    pub post_nms_topk: usize,
    pub nms_thresh: f32,
    pub min_size: u32,
}

/// Detection head settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RcnnHeadConfig {
    pub feat_stride: usize,
    pub pooled_size: (usize, usize),
    pub batch_size: usize,
    pub bbox_stds: (f32, f32, f32, f32),
    pub nms_thresh: f32,
    pub conf_thresh: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisConfig {
    /// Detections above this confidence are printed.
    pub print_thresh: f32,
    /// Detections above this confidence are drawn onto the saved image.
    pub save_thresh: f32,
}

impl RcnnConfig {
    /// Load the config from `config_dir`, with the overlay of `network` on top.
    ///
    /// A network without an overlay uses the main config as is.
    pub fn load_for(config_dir: &Path, network: Network) -> odal::Result<Self> {
        let overlay_dir = network.overlay_dir(config_dir);

        match Self::load_with_overlay(config_dir, &overlay_dir) {
            Err(odal::Error {
                name,
                kind:
                    ErrorKind::Load {
                        path,
                        config_kind: ConfigKind::Overlay,
                        ..
                    },
            }) => {
                tracing::debug!("`{name}`: Failed to read overlay from `{path}`");
                Self::load(config_dir)
            }
            result => result,
        }
    }

    /// Replace the thresholds that were given on the command line.
    #[must_use]
    pub fn with_overrides(
        mut self,
        nms_thresh: Option<f32>,
        conf_thresh: Option<f32>,
        print_thresh: Option<f32>,
    ) -> Self {
        if let Some(nms_thresh) = nms_thresh {
            self.rcnn.nms_thresh = nms_thresh;
        }
        if let Some(conf_thresh) = conf_thresh {
            self.rcnn.conf_thresh = conf_thresh;
        }
        if let Some(print_thresh) = print_thresh {
            self.vis.print_thresh = print_thresh;
        }

        self
    }

    /// Log every resolved setting, after the overlay and the command line overrides.
    pub fn log_resolved(&self) {
        let ImageConfig {
            short_side,
            long_side,
            pixel_means,
            pixel_stds,
        } = &self.image;
        info!(short_side, long_side, ?pixel_means, ?pixel_stds, "image config");

        let RpnConfig {
            feat_stride,
            anchor_scales,
            anchor_ratios,
            pre_nms_topk,
            post_nms_topk,
            nms_thresh,
            min_size,
        } = &self.rpn;
        info!(
            feat_stride,
            ?anchor_scales,
            ?anchor_ratios,
            pre_nms_topk,
            post_nms_topk,
            nms_thresh,
            min_size,
            "rpn config"
        );

        let RcnnHeadConfig {
            feat_stride,
            pooled_size,
            batch_size,
            bbox_stds,
            nms_thresh,
            conf_thresh,
        } = &self.rcnn;
        info!(
            feat_stride,
            ?pooled_size,
            batch_size,
            ?bbox_stds,
            nms_thresh,
            conf_thresh,
            "rcnn config"
        );

        let VisConfig {
            print_thresh,
            save_thresh,
        } = &self.vis;
        info!(print_thresh, save_thresh, "vis config");
    }

    /// The validated settings for [`detection::im_detect`].
    pub fn detect_config(&self) -> detection::Result<DetectConfig> {
        DetectConfig::new(
            self.rcnn.bbox_stds,
            self.rcnn.nms_thresh,
            self.rcnn.conf_thresh,
        )
    }
}

impl RpnConfig {
    /// Size of the feature map the proposal network sees for an image of the given size.
    #[must_use]
    pub fn feature_map_size(&self, image_info: &ImageInfo) -> (usize, usize) {
        let stride = self.feat_stride as f32;
        (
            (image_info.height / stride).ceil() as usize,
            (image_info.width / stride).ceil() as usize,
        )
    }

    /// Number of anchors the proposal network places on an image of the given size.
    #[must_use]
    pub fn num_anchors(&self, image_info: &ImageInfo) -> usize {
        let (feat_height, feat_width) = self.feature_map_size(image_info);
        let per_cell = AnchorGenerator::new(
            self.feat_stride as f32,
            &self.anchor_ratios,
            &self.anchor_scales,
        )
        .num_base_anchors();

        feat_height * feat_width * per_cell
    }
}
