use detection::{
    DEFAULT_BBOX_STDS, DetectConfig, Detection, Error, ImageInfo, Result,
    bbox::Bbox,
    im_detect,
};
use ndarray::{Array2, array};

fn run(
    rois: &Array2<f32>,
    scores: &Array2<f32>,
    bbox_deltas: &Array2<f32>,
    image_info: ImageInfo,
) -> Result<Vec<Detection>> {
    im_detect(
        rois.view(),
        scores.view(),
        bbox_deltas.view(),
        &image_info,
        &DetectConfig::default(),
    )
}

fn unscaled(height: f32, width: f32) -> ImageInfo {
    ImageInfo::new(height, width, 1.0).unwrap()
}

#[test]
fn zero_delta_returns_the_roi() -> Result<()> {
    let rois = array![[0.0, 0.0, 9.0, 9.0]];
    let scores = array![[0.1, 0.9]];
    let deltas = Array2::zeros((1, 8));

    let detections = run(&rois, &scores, &deltas, unscaled(100.0, 100.0))?;

    assert_eq!(
        detections,
        vec![Detection {
            class_id: 1,
            confidence: 0.9,
            bbox: Bbox::xyxy(0.0, 0.0, 9.0, 9.0),
        }]
    );
    assert_eq!(detections[0].bbox.area(), 100.0);
    Ok(())
}

#[test]
fn overlapping_boxes_of_one_class_are_suppressed() -> Result<()> {
    // IoU = 0.5
    let rois = array![[0.0, 0.0, 9.0, 9.0], [0.0, 0.0, 19.0, 9.0]];
    let scores = array![[0.0, 0.9], [0.0, 0.8]];
    let deltas = Array2::zeros((2, 8));

    let detections = run(&rois, &scores, &deltas, unscaled(100.0, 100.0))?;

    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].confidence, 0.9);
    Ok(())
}

#[test]
fn lightly_overlapping_boxes_both_survive() -> Result<()> {
    // IoU = 0.2
    let rois = array![[0.0, 0.0, 9.0, 9.0], [0.0, 0.0, 49.0, 9.0]];
    let scores = array![[0.0, 0.9], [0.0, 0.8]];
    let deltas = Array2::zeros((2, 8));

    let detections = run(&rois, &scores, &deltas, unscaled(100.0, 100.0))?;

    let confidences = detections.iter().map(|d| d.confidence).collect::<Vec<_>>();
    assert_eq!(confidences, vec![0.9, 0.8]);
    Ok(())
}

#[test]
fn roi_below_confidence_threshold_yields_nothing() -> Result<()> {
    let rois = array![[0.0, 0.0, 9.0, 9.0]];
    let scores = array![[0.999, 0.0005, 0.0009]];
    let deltas = Array2::zeros((1, 12));

    assert!(run(&rois, &scores, &deltas, unscaled(100.0, 100.0))?.is_empty());
    Ok(())
}

#[test]
fn extreme_size_delta_stays_inside_the_image() -> Result<()> {
    let rois = array![[40.0, 30.0, 59.0, 49.0]];
    let scores = array![[0.0, 0.7]];
    let deltas = array![[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 100.0, 100.0]];
    let (height, width) = (120.0, 160.0);

    let detections = run(&rois, &scores, &deltas, unscaled(height, width))?;

    assert_eq!(detections.len(), 1);
    let bbox = detections[0].bbox;
    assert!(bbox.is_finite());
    assert_eq!(bbox.inner, (0.0, 0.0, width - 1.0, height - 1.0));
    Ok(())
}

#[test]
fn nan_size_delta_yields_no_detection() -> Result<()> {
    let rois = array![[40.0, 30.0, 59.0, 49.0]];
    let scores = array![[0.0, 0.9]];
    let deltas = array![[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, f32::NAN, 0.0]];

    assert!(run(&rois, &scores, &deltas, unscaled(600.0, 800.0))?.is_empty());
    Ok(())
}

#[test]
fn identical_boxes_of_different_classes_both_survive() -> Result<()> {
    let rois = array![[5.0, 5.0, 50.0, 50.0], [5.0, 5.0, 50.0, 50.0]];
    let scores = array![[0.0, 0.9, 0.0], [0.0, 0.0, 0.8]];
    let deltas = Array2::zeros((2, 12));

    let detections = run(&rois, &scores, &deltas, unscaled(100.0, 100.0))?;

    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0].bbox.iou(&detections[1].bbox), 1.0);
    assert_eq!(detections[0].class_id, 1);
    assert_eq!(detections[1].class_id, 2);
    Ok(())
}

#[test]
fn detections_are_grouped_by_class_then_confidence() -> Result<()> {
    let rois = array![
        [0.0, 0.0, 9.0, 9.0],
        [50.0, 50.0, 59.0, 59.0],
        [20.0, 20.0, 29.0, 29.0],
    ];
    let scores = array![
        [0.0, 0.2, 0.6],
        [0.0, 0.7, 0.1],
        [0.0, 0.5, 0.3],
    ];
    let deltas = Array2::zeros((3, 12));

    let detections = run(&rois, &scores, &deltas, unscaled(100.0, 100.0))?;

    let rows = detections
        .iter()
        .map(|d| (d.class_id, d.confidence))
        .collect::<Vec<_>>();
    assert_eq!(
        rows,
        vec![
            (1, 0.7),
            (1, 0.5),
            (1, 0.2),
            (2, 0.6),
            (2, 0.3),
            (2, 0.1)
        ]
    );
    Ok(())
}

#[test]
fn boxes_are_reported_in_original_image_coordinates() -> Result<()> {
    let rois = array![[0.0, 0.0, 19.0, 39.0]];
    let scores = array![[0.0, 0.9]];
    let deltas = Array2::zeros((1, 8));

    let detections = run(&rois, &scores, &deltas, ImageInfo::new(600.0, 800.0, 2.0)?)?;

    assert_eq!(detections[0].bbox.inner, (0.0, 0.0, 9.5, 19.5));
    assert_eq!(detections[0].to_row(), [1.0, 0.9, 0.0, 0.0, 9.5, 19.5]);
    Ok(())
}

#[test]
fn zero_rois_yield_no_detections() -> Result<()> {
    let rois = Array2::zeros((0, 4));
    let scores = Array2::zeros((0, 21));
    let deltas = Array2::zeros((0, 84));

    assert!(run(&rois, &scores, &deltas, unscaled(600.0, 800.0))?.is_empty());
    Ok(())
}

#[test]
fn mismatched_shapes_are_rejected() {
    let rois = Array2::zeros((2, 4));
    let scores = Array2::zeros((2, 21));
    let deltas = Array2::zeros((2, 21));

    let result = run(&rois, &scores, &deltas, unscaled(600.0, 800.0));
    assert!(matches!(
        result,
        Err(Error::ShapeMismatch {
            what: "bbox delta columns",
            ..
        })
    ));
}

#[test]
fn configuration_is_checked_before_shapes() {
    let rois = Array2::zeros((2, 4));
    let scores = Array2::zeros((3, 21));
    let deltas = Array2::zeros((1, 5));
    let config = DetectConfig {
        bbox_stds: DEFAULT_BBOX_STDS,
        nms_thresh: 0.0,
        conf_thresh: 1e-3,
    };

    let result = im_detect(
        rois.view(),
        scores.view(),
        deltas.view(),
        &unscaled(600.0, 800.0),
        &config,
    );

    assert!(matches!(
        result,
        Err(Error::InvalidConfig {
            name: "nms_thresh",
            ..
        })
    ));
}

#[test]
fn kept_boxes_do_not_overlap_beyond_threshold() -> Result<()> {
    let rois = Array2::from_shape_fn((40, 4), |(i, c)| {
        let offset = (i % 8) as f32 * 6.0 + (i / 8) as f32 * 2.0;
        if c < 2 { offset } else { offset + 24.0 }
    });
    let scores = Array2::from_shape_fn((40, 2), |(i, c)| {
        if c == 0 { 0.0 } else { 0.99 - i as f32 * 0.02 }
    });
    let deltas = Array2::zeros((40, 8));

    let detections = run(&rois, &scores, &deltas, unscaled(200.0, 200.0))?;

    assert_eq!(detections[0].confidence, 0.99);
    for (i, a) in detections.iter().enumerate() {
        for b in &detections[i + 1..] {
            assert!(a.bbox.iou(&b.bbox) <= 0.3);
        }
    }
    Ok(())
}
