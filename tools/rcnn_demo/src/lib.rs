//! Demo driver for the Faster R-CNN post-processing in [`detection`].

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod network;
pub mod outputs;
pub mod visualize;

use detection::{BACKGROUND_CLASS, Detection, ImageInfo, im_detect};
use tracing::info;

use cli::Cli;
use config::RcnnConfig;
use error::{Error, Result};
use outputs::NetworkOutputs;
use visualize::LabelPainter;

/// Run the demo for the image and outputs given on the command line.
pub fn run(args: Cli) -> Result<Vec<Detection>> {
    let class_names = args.dataset.class_names();
    let config = RcnnConfig::load_for(&args.config_dir, args.network)?.with_overrides(
        args.nms_thresh,
        args.conf_thresh,
        args.vis_thresh,
    );
    info!(network = %args.network, dataset = %args.dataset, "loaded config");
    config.log_resolved();

    let detect_config = config.detect_config()?;
    let outputs = NetworkOutputs::load(&args.outputs, args.dataset)?;

    let image_info = match outputs.im_info {
        Some(image_info) => image_info,
        None => resized_image_info(&args, &config)?,
    };

    let (feat_height, feat_width) = config.rpn.feature_map_size(&image_info);
    info!(
        height = image_info.height,
        width = image_info.width,
        scale = image_info.scale,
        feat_height,
        feat_width,
        anchors = config.rpn.num_anchors(&image_info),
        "anchor grid"
    );

    let detections = im_detect(
        outputs.rois.view(),
        outputs.scores.view(),
        outputs.bbox_deltas.view(),
        &image_info,
        &detect_config,
    )?;
    info!(rois = outputs.rois.nrows(), detections = detections.len(), "decoded");

    for detection in detections
        .iter()
        .filter(|d| d.class_id > BACKGROUND_CLASS && d.confidence > config.vis.print_thresh)
    {
        let (x1, y1, x2, y2) = detection.bbox.inner;
        println!(
            "{} {} [{x1}, {y1}, {x2}, {y2}]",
            class_names[detection.class_id], detection.confidence
        );
    }

    if !args.no_save {
        let labels = LabelPainter::new(args.font.as_deref())?;
        let saved = visualize::save_detections(
            &args.image,
            &detections,
            class_names,
            config.vis.save_thresh,
            &labels,
        )?;
        info!(path = %saved.display(), "saved detections");
    }

    Ok(detections)
}

/// Recompute the network input size from the image when the outputs carry no `im_info`.
fn resized_image_info(args: &Cli, config: &RcnnConfig) -> Result<ImageInfo> {
    let (width, height) = image::image_dimensions(&args.image).map_err(|source| Error::Image {
        path: args.image.display().to_string(),
        source,
    })?;

    Ok(ImageInfo::for_resize(
        height,
        width,
        config.image.short_side,
        config.image.long_side,
    )?)
}
