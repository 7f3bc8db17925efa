use detection::{DetectConfig, ImageInfo, im_detect};
use ndarray::{Array2, array};

fn main() -> miette::Result<()> {
    // three overlapping proposals for class 1 and one for class 2
    let rois = array![
        [10.0, 10.0, 109.0, 109.0],
        [14.0, 12.0, 112.0, 108.0],
        [300.0, 40.0, 379.0, 199.0],
        [12.0, 8.0, 105.0, 111.0],
    ];
    let scores = array![
        [0.05, 0.90, 0.05],
        [0.10, 0.85, 0.05],
        [0.20, 0.01, 0.79],
        [0.30, 0.60, 0.10],
    ];
    let bbox_deltas = Array2::zeros((4, 12));

    let image_info = ImageInfo::for_resize(480, 640, 600, 1000)?;
    let detections = im_detect(
        rois.view(),
        scores.view(),
        bbox_deltas.view(),
        &image_info,
        &DetectConfig::default(),
    )?;

    for detection in detections {
        println!("{:?}", detection.to_row());
    }

    Ok(())
}
