use std::collections::BTreeMap;

use pagecraft_core::{Point, Rotation, Schema};
use serde::{Deserialize, Serialize};

/// CSS pixels per document point at scale 1.
pub const ZOOM: f64 = 96.0 / 72.0;

const MIN_SCALE: f64 = 0.1;
const MAX_SCALE: f64 = 10.0;

/// Editor-space view of one page: top-left origin, pixels, zoomed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditorViewport {
    /// Display zoom on top of [`ZOOM`].
    pub scale: f64,
    /// Screen position of the page's top-left corner.
    pub origin_x: f64,
    pub origin_y: f64,
}

impl Default for EditorViewport {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl EditorViewport {
    pub fn new(scale: f64) -> Self {
        Self {
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }

    pub fn px_per_unit(&self) -> f64 {
        ZOOM * self.scale
    }

    /// Document length to pixels.
    pub fn to_screen(&self, length: f64) -> f64 {
        length * self.px_per_unit()
    }

    /// Pixel length to document units.
    pub fn to_document(&self, px: f64) -> f64 {
        px / self.px_per_unit()
    }

    /// Stored (top-left origin) point to screen pixels.
    pub fn layout_to_screen(&self, p: Point) -> Point {
        Point::new(
            self.origin_x + self.to_screen(p.x),
            self.origin_y + self.to_screen(p.y),
        )
    }

    /// Screen pixels back to a stored (top-left origin) point.
    pub fn screen_to_layout(&self, p: Point) -> Point {
        Point::new(
            self.to_document(p.x - self.origin_x),
            self.to_document(p.y - self.origin_y),
        )
    }

    /// Zoom by `factor`, keeping the page point under `anchor` fixed on screen.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        let before = self.screen_to_layout(anchor);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let after = self.layout_to_screen(before);
        self.origin_x += anchor.x - after.x;
        self.origin_y += anchor.y - after.y;
    }

    /// Scale so a page of `page_width` x `page_height` fits the canvas.
    pub fn fit_page(&mut self, page_width: f64, page_height: f64, canvas_width: f64, canvas_height: f64) {
        if page_width <= 0.0 || page_height <= 0.0 {
            return;
        }
        let fit_x = canvas_width / (page_width * ZOOM);
        let fit_y = canvas_height / (page_height * ZOOM);
        self.scale = fit_x.min(fit_y).clamp(MIN_SCALE, MAX_SCALE);
        self.origin_x = (canvas_width - self.to_screen(page_width)) / 2.0;
        self.origin_y = (canvas_height - self.to_screen(page_height)) / 2.0;
    }

    /// The absolutely positioned wrapper a shape's mount point lives in.
    pub fn wrapper_box(&self, schema: &Schema) -> EditorBox {
        EditorBox {
            left: self.to_screen(schema.position.x),
            top: self.to_screen(schema.position.y),
            width: self.to_screen(schema.width),
            height: self.to_screen(schema.height),
            rotate: Rotation::degrees(schema.rotate).normalized(),
            opacity: schema.opacity,
            title: schema.name.clone(),
            cursor: if schema.read_only { "initial" } else { "pointer" }.to_string(),
        }
    }
}

/// Wrapper geometry in page-relative pixels. Rotation is clockwise around
/// the box center, matching CSS `rotate()` with the default transform origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub rotate: f64,
    pub opacity: f64,
    pub title: String,
    pub cursor: String,
}

impl EditorBox {
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn to_style(&self, outline: Option<&str>) -> BTreeMap<String, String> {
        let mut style = BTreeMap::new();
        style.insert("position".into(), "absolute".into());
        style.insert("left".into(), format!("{}px", self.left));
        style.insert("top".into(), format!("{}px", self.top));
        style.insert("width".into(), format!("{}px", self.width));
        style.insert("height".into(), format!("{}px", self.height));
        style.insert("transform".into(), format!("rotate({}deg)", self.rotate));
        style.insert("opacity".into(), self.opacity.to_string());
        style.insert("cursor".into(), self.cursor.clone());
        if let Some(outline) = outline {
            style.insert("outline".into(), outline.to_string());
        }
        style
    }
}
