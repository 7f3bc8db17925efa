use std::path::PathBuf;

use clap::Parser;

use crate::{dataset::Dataset, network::Network};

/// `rcnn-demo` - Decode the outputs of a Faster R-CNN network for a single image
///
/// The network is run elsewhere; its raw outputs for one image are read from a JSON file:
/// ```json
/// {
///   "rois": [[0, x1, y1, x2, y2], ...],
///   "scores": [[...], ...],
///   "bbox_deltas": [[...], ...],
///   "im_info": [height, width, scale]
/// }
/// ```
/// `im_info` may be left out, it is then recomputed from the image size and the resize
/// settings in the config.
///
/// Detections above the print threshold are written to stdout, and unless `--no-save` is given
/// the detections above the save threshold are drawn onto the image and saved as
/// `<image>_det.png`.
#[derive(Debug, Parser)]
#[clap(name = "rcnn-demo", version)]
pub struct Cli {
    /// Backbone the outputs were produced with, selects the config overlay
    #[clap(long, value_enum, default_value_t = Network::Resnet50)]
    pub network: Network,

    /// Dataset the network was trained on, selects the class names
    #[clap(long, value_enum, default_value_t = Dataset::Voc)]
    pub dataset: Dataset,

    /// Path to the input image
    #[clap(long)]
    pub image: PathBuf,

    /// Path to the JSON file with the network outputs for the image
    #[clap(long)]
    pub outputs: PathBuf,

    /// Directory holding `rcnn.toml` and the `overlay/<network>/` directories
    #[clap(long, default_value = "config")]
    pub config_dir: PathBuf,

    /// IoU threshold for non-maximum suppression [default: Set in `rcnn.toml`]
    #[clap(long)]
    pub nms_thresh: Option<f32>,

    /// Minimum class score of a candidate [default: Set in `rcnn.toml`]
    #[clap(long)]
    pub conf_thresh: Option<f32>,

    /// Minimum confidence of a printed detection [default: Set in `rcnn.toml`]
    #[clap(long)]
    pub vis_thresh: Option<f32>,

    /// TrueType or OpenType font for the class labels [default: embedded DejaVu Sans]
    #[clap(long)]
    pub font: Option<PathBuf>,

    /// Don't write the annotated image
    #[clap(long)]
    pub no_save: bool,
}
