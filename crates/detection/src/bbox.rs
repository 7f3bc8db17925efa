//! Type-safe bounding boxes in pixel-inclusive image coordinates.

/// Four `f32` coordinates, tagged with the layout they are stored in.
///
/// The marker `T` keeps corner, corner-size and center-size boxes from being mixed up.
/// All layouts follow the pixel-inclusive convention used by Faster R-CNN: a box spanning
/// `x1..=x2` is `x2 - x1 + 1` pixels wide, so a box with `x1 == x2` still covers one column.
///
/// Switching layouts goes through [`ConvertBbox`]:
///
/// ```
/// use detection::bbox::*;
///
/// let xyxy = Bbox::xyxy(4.0, 4.0, 9.0, 9.0);
/// let xywh: Bbox<Xywh> = xyxy.convert();
///
/// assert_eq!(xywh.inner, (4.0, 4.0, 6.0, 6.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox<T> {
    pub inner: (f32, f32, f32, f32),
    _marker: std::marker::PhantomData<T>,
}

impl<T> Bbox<T> {
    fn new(bbox: (f32, f32, f32, f32)) -> Self {
        Bbox {
            inner: bbox,
            _marker: std::marker::PhantomData,
        }
    }

    /// Returns `true` if none of the coordinates are `NaN` or infinite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        let (a, b, c, d) = self.inner;
        a.is_finite() && b.is_finite() && c.is_finite() && d.is_finite()
    }
}

impl<T> Bbox<T>
where
    Bbox<T>: ConvertBbox<Xyxy>,
{
    /// Number of pixels covered by the box.
    ///
    /// A degenerate box (zero width or height in corner coordinates) has an area of `1.0`.
    pub fn area(&self) -> f32 {
        let (x1, y1, x2, y2) = ConvertBbox::<Xyxy>::convert(self).inner;
        (x2 - x1 + 1.0) * (y2 - y1 + 1.0)
    }

    /// Number of pixels covered by both boxes, `0.0` when they are disjoint.
    pub fn intersection<S>(&self, other: &S) -> f32
    where
        S: ConvertBbox<Xyxy>,
    {
        let (x1, y1, x2, y2) = ConvertBbox::<Xyxy>::convert(self).inner;
        let (x3, y3, x4, y4) = ConvertBbox::<Xyxy>::convert(other).inner;

        let w = (x2.min(x4) - x1.max(x3) + 1.0).max(0.0);
        let h = (y2.min(y4) - y1.max(y3) + 1.0).max(0.0);

        w * h
    }

    pub fn union<S>(&self, other: &S) -> f32
    where
        S: ConvertBbox<Xyxy>,
    {
        let other_area = ConvertBbox::<Xyxy>::convert(other).area();
        self.area() + other_area - self.intersection(other)
    }

    /// Intersection over union, the overlap measure used for suppression.
    pub fn iou<S>(&self, other: &S) -> f32
    where
        S: ConvertBbox<Xyxy>,
    {
        self.intersection(other) / self.union(other)
    }
}

impl<T> From<Bbox<T>> for (f32, f32, f32, f32) {
    fn from(bbox: Bbox<T>) -> Self {
        bbox.inner
    }
}

/// Conversion of a [`Bbox`] into the layout `T`.
pub trait ConvertBbox<T> {
    fn convert(&self) -> Bbox<T>;
}

/// Corner layout, `(x1, y1, x2, y2)` with both corners inside the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xyxy;

impl Bbox<Xyxy> {
    #[must_use]
    pub fn xyxy(x1: f32, y1: f32, x2: f32, y2: f32) -> Bbox<Xyxy> {
        Bbox::new((x1, y1, x2, y2))
    }

    /// Clip the bounding box to an image of the given height and width.
    ///
    /// The x coordinates are clamped to `[0, width - 1]` and the y coordinates to
    /// `[0, height - 1]`. A crossed box (`x1 > x2` or `y1 > y2`) collapses onto its first
    /// corner, which yields a degenerate box instead of an invalid one.
    #[must_use]
    pub fn clip(&self, height: f32, width: f32) -> Bbox<Xyxy> {
        let (x1, y1, x2, y2) = self.inner;
        let x_max = (width - 1.0).max(0.0);
        let y_max = (height - 1.0).max(0.0);

        let x1 = x1.clamp(0.0, x_max);
        let y1 = y1.clamp(0.0, y_max);
        let x2 = x2.clamp(0.0, x_max);
        let y2 = y2.clamp(0.0, y_max);

        Bbox::new((x1, y1, x2.max(x1), y2.max(y1)))
    }

    /// Divide every coordinate by `scale`, mapping network input coordinates back to the
    /// original image.
    #[must_use]
    pub fn scaled_down(&self, scale: f32) -> Bbox<Xyxy> {
        let (x1, y1, x2, y2) = self.inner;
        Bbox::new((x1 / scale, y1 / scale, x2 / scale, y2 / scale))
    }
}

impl ConvertBbox<Xyxy> for Bbox<Xyxy> {
    fn convert(&self) -> Bbox<Xyxy> {
        *self
    }
}

impl ConvertBbox<Xywh> for Bbox<Xyxy> {
    fn convert(&self) -> Bbox<Xywh> {
        let (x1, y1, x2, y2) = self.inner;
        Bbox::new((x1, y1, x2 - x1 + 1.0, y2 - y1 + 1.0))
    }
}

impl ConvertBbox<Cxcywh> for Bbox<Xyxy> {
    fn convert(&self) -> Bbox<Cxcywh> {
        let (x1, y1, x2, y2) = self.inner;
        let w = x2 - x1 + 1.0;
        let h = y2 - y1 + 1.0;
        Bbox::new((x1 + 0.5 * (w - 1.0), y1 + 0.5 * (h - 1.0), w, h))
    }
}

/// Corner and size layout, `(x1, y1, w, h)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xywh;

impl Bbox<Xywh> {
    #[must_use]
    pub fn xywh(x: f32, y: f32, w: f32, h: f32) -> Bbox<Xywh> {
        Bbox::new((x, y, w, h))
    }
}

impl ConvertBbox<Xyxy> for Bbox<Xywh> {
    fn convert(&self) -> Bbox<Xyxy> {
        let (x, y, w, h) = self.inner;
        Bbox::new((x, y, x + w - 1.0, y + h - 1.0))
    }
}

impl ConvertBbox<Xywh> for Bbox<Xywh> {
    fn convert(&self) -> Bbox<Xywh> {
        *self
    }
}

/// Center and size layout, `(cx, cy, w, h)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cxcywh;

impl Bbox<Cxcywh> {
    #[must_use]
    pub fn cxcywh(cx: f32, cy: f32, w: f32, h: f32) -> Bbox<Cxcywh> {
        Bbox::new((cx, cy, w, h))
    }
}

impl ConvertBbox<Xyxy> for Bbox<Cxcywh> {
    fn convert(&self) -> Bbox<Xyxy> {
        let (cx, cy, w, h) = self.inner;
        Bbox::new((
            cx - 0.5 * (w - 1.0),
            cy - 0.5 * (h - 1.0),
            cx + 0.5 * (w - 1.0),
            cy + 0.5 * (h - 1.0),
        ))
    }
}

impl ConvertBbox<Cxcywh> for Bbox<Cxcywh> {
    fn convert(&self) -> Bbox<Cxcywh> {
        *self
    }
}
