use std::{
    fs,
    path::{Path, PathBuf},
};

use ab_glyph::{FontVec, PxScale};
use detection::{BACKGROUND_CLASS, Detection};
use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size},
    rect::Rect,
};

use crate::error::{Error, Result};

/// DejaVu Sans, used for the class labels unless another font is given.
pub const DEFAULT_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

const BOX_THICKNESS: i32 = 2;
const LABEL_FONT_SIZE: f32 = 14.0;
const LABEL_PADDING: i32 = 2;
const LABEL_TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const PALETTE: [[u8; 3]; 12] = [
    [230, 25, 75],
    [60, 180, 75],
    [255, 225, 25],
    [0, 130, 200],
    [245, 130, 48],
    [145, 30, 180],
    [70, 240, 240],
    [240, 50, 230],
    [210, 245, 60],
    [250, 190, 190],
    [0, 128, 128],
    [170, 110, 40],
];

/// Colour of a class, derived from the last two characters of its name.
#[must_use]
pub fn class_color(name: &str) -> Rgb<u8> {
    let bytes = name.as_bytes();
    let key = match bytes {
        [.., a, b] => (usize::from(*a) + usize::from(*b)) / 2,
        [a] => usize::from(*a),
        [] => 0,
    };

    Rgb(PALETTE[key % PALETTE.len()])
}

/// Path the annotated version of `image` is saved to, `<stem>_det.png` in the same directory.
#[must_use]
pub fn output_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map_or_else(|| "image".into(), |stem| stem.to_string_lossy());

    image.with_file_name(format!("{stem}_det.png"))
}

fn is_drawn(detection: &Detection, thresh: f32) -> bool {
    detection.class_id > BACKGROUND_CLASS && detection.confidence > thresh
}

fn color_of(class_names: &[&str], class_id: usize) -> Rgb<u8> {
    class_names
        .get(class_id)
        .map_or(Rgb(PALETTE[0]), |name| class_color(name))
}

/// Draw every foreground detection above `thresh` as a hollow rectangle.
///
/// Returns the number of drawn detections.
pub fn draw_detections(
    image: &mut RgbImage,
    detections: &[Detection],
    class_names: &[&str],
    thresh: f32,
) -> usize {
    let mut drawn = 0;

    for detection in detections.iter().filter(|d| is_drawn(d, thresh)) {
        let color = color_of(class_names, detection.class_id);
        let (x1, y1, x2, y2) = detection.bbox.inner;

        for inset in 0..BOX_THICKNESS {
            let left = x1.round() as i32 + inset;
            let top = y1.round() as i32 + inset;
            let width = (x2.round() as i32 - inset) - left + 1;
            let height = (y2.round() as i32 - inset) - top + 1;
            if width <= 0 || height <= 0 {
                break;
            }

            draw_hollow_rect_mut(
                image,
                Rect::at(left, top).of_size(width as u32, height as u32),
                color,
            );
        }

        drawn += 1;
    }

    drawn
}

/// Writes the class name of a detection next to its box.
pub struct LabelPainter {
    font: FontVec,
    scale: PxScale,
}

impl LabelPainter {
    /// Load the label font from `path`, or use [`DEFAULT_FONT`].
    pub fn new(path: Option<&Path>) -> Result<Self> {
        let (data, name) = match path {
            Some(path) => {
                let data = fs::read(path).map_err(|source| Error::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                (data, path.display().to_string())
            }
            None => (DEFAULT_FONT.to_vec(), "DejaVuSans.ttf".to_string()),
        };

        let font = FontVec::try_from_vec(data).map_err(|source| Error::Font { path: name, source })?;

        Ok(Self {
            font,
            scale: PxScale::from(LABEL_FONT_SIZE),
        })
    }

    /// Draw the class name of every foreground detection above `thresh` on a filled
    /// background in the class colour, on top of the box when there is room for it.
    pub fn draw_labels(
        &self,
        image: &mut RgbImage,
        detections: &[Detection],
        class_names: &[&str],
        thresh: f32,
    ) {
        for detection in detections.iter().filter(|d| is_drawn(d, thresh)) {
            let Some(name) = class_names.get(detection.class_id) else {
                continue;
            };
            let (x1, y1, _, _) = detection.bbox.inner;
            self.draw_label(image, name, x1.round() as i32, y1.round() as i32, class_color(name));
        }
    }

    fn draw_label(&self, image: &mut RgbImage, text: &str, left: i32, top: i32, color: Rgb<u8>) {
        if image.width() == 0 || image.height() == 0 {
            return;
        }

        let (text_width, text_height) = text_size(self.scale, &self.font, text);
        let label_height = text_height as i32 + 2 * LABEL_PADDING;
        let label_x = left.clamp(0, image.width() as i32 - 1);
        let label_y = (top - label_height).max(0);

        let label_width = (text_width as i32 + 2 * LABEL_PADDING).min(image.width() as i32 - label_x);
        if label_width <= 0 || label_height <= 0 {
            return;
        }

        draw_filled_rect_mut(
            image,
            Rect::at(label_x, label_y).of_size(label_width as u32, label_height as u32),
            color,
        );
        draw_text_mut(
            image,
            LABEL_TEXT_COLOR,
            label_x + LABEL_PADDING,
            label_y + LABEL_PADDING,
            self.scale,
            &self.font,
            text,
        );
    }
}

/// Draw the detections onto the image at `image_path` and save it next to it.
///
/// Returns the path of the saved image.
pub fn save_detections(
    image_path: &Path,
    detections: &[Detection],
    class_names: &[&str],
    thresh: f32,
    labels: &LabelPainter,
) -> Result<PathBuf> {
    let image_error = |path: &Path| {
        let path = path.display().to_string();
        move |source| Error::Image { path, source }
    };

    let mut image = image::open(image_path)
        .map_err(image_error(image_path))?
        .to_rgb8();

    let drawn = draw_detections(&mut image, detections, class_names, thresh);
    labels.draw_labels(&mut image, detections, class_names, thresh);
    tracing::debug!(drawn, "drew detections");

    let output = output_path(image_path);
    image.save(&output).map_err(image_error(&output))?;

    Ok(output)
}
