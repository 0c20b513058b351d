use serde::{Deserialize, Serialize};

use crate::schema::Schema;

/// A position in document units. Which corner is the origin depends on the
/// space the point lives in; see [`layout`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounds of a (possibly rotated) shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Smallest box holding every point, or `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(rest.iter().fold(Self::new(*first, *first), |b, p| Self {
            min: Point::new(b.min.x.min(p.x), b.min.y.min(p.y)),
            max: Point::new(b.max.x.max(p.x), b.max.y.max(p.y)),
        }))
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }
}

/// Rotate `point` around `pivot` by `angle_degrees`.
///
/// Applies the standard rotation matrix in the coordinate system the points
/// live in: in a y-down space (editor) a positive angle turns clockwise, in a
/// y-up space (document) it turns counter-clockwise, which is why the document
/// layout negates the stored angle before calling this.
pub fn rotate_point(point: Point, pivot: Point, angle_degrees: f64) -> Point {
    if angle_degrees == 0.0 {
        return point;
    }
    let rad = angle_degrees.to_radians();
    let (sin_r, cos_r) = rad.sin_cos();
    let dx = point.x - pivot.x;
    let dy = point.y - pivot.y;
    Point::new(
        cos_r * dx - sin_r * dy + pivot.x,
        sin_r * dx + cos_r * dy + pivot.y,
    )
}

/// An angle in degrees in a renderer's own convention.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub degrees: f64,
}

impl Rotation {
    pub fn degrees(degrees: f64) -> Self {
        Self { degrees }
    }

    pub fn radians(&self) -> f64 {
        self.degrees.to_radians()
    }

    /// Angle folded into `[0, 360)`.
    pub fn normalized(&self) -> f64 {
        self.degrees.rem_euclid(360.0)
    }

    pub fn is_zero(&self) -> bool {
        self.normalized() == 0.0
    }
}

/// Geometry of one schema expressed in document space (bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Counter-clockwise-positive angle, i.e. the negated stored angle.
    pub rotate: Rotation,
    pub opacity: f64,
}

impl DocumentLayout {
    /// Center of the shape in document space, before any rotation translate.
    pub fn pivot(&self) -> Point {
        Point::new(
            self.position.x + self.width / 2.0,
            self.position.y + self.height / 2.0,
        )
    }
}

/// Convert a schema's stored geometry into document space.
///
/// The stored model has its origin at the page's top-left corner; documents
/// put it at the bottom-left, so the vertical axis is flipped with
/// `y = page_height - y - height`. With `apply_rotate_translate`, the returned
/// position is the bottom-left corner rotated around the shape's center, ready
/// for renderers that rotate around their drawing origin. Shapes that compute
/// their own pivot-relative points (lines) pass `false` to avoid rotating twice.
pub fn layout(schema: &Schema, page_height: f64, apply_rotate_translate: bool) -> DocumentLayout {
    let width = schema.width;
    let height = schema.height;
    let rotate = Rotation::degrees(-schema.rotate);

    let mut position = Point::new(
        schema.position.x,
        page_height - schema.position.y - height,
    );

    if apply_rotate_translate && !rotate.is_zero() {
        let pivot = Point::new(
            position.x + width / 2.0,
            page_height - schema.position.y - height / 2.0,
        );
        position = rotate_point(position, pivot, rotate.degrees);
    }

    DocumentLayout {
        position,
        width,
        height,
        rotate,
        opacity: schema.opacity,
    }
}
