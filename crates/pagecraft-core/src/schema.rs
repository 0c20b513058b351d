use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::geometry::{rotate_point, BBox, Point};

/// Unique schema identifier.
pub type SchemaId = Uuid;

fn default_opacity() -> f64 {
    1.0
}

/// Persisted description of one shape instance on a page.
///
/// Geometry is stored in document units with the origin at the page's
/// top-left corner. Fields a plugin adds for its own shape (a line's `color`,
/// say) are kept verbatim in `extra` and round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub id: SchemaId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Degrees, clockwise.
    #[serde(default)]
    pub rotate: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_value: Option<String>,
    /// The live value edited through the form/designer.
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Schema {
    pub fn new(schema_type: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            schema_type: schema_type.to_string(),
            position: Point::default(),
            width: 0.0,
            height: 0.0,
            rotate: 0.0,
            opacity: 1.0,
            read_only: false,
            read_only_value: None,
            content: String::new(),
            extra: Map::new(),
        }
    }

    /// Instantiate a plugin's default schema as a new shape with its own id.
    pub fn from_default(default_schema: &Schema) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..default_schema.clone()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_rotate(mut self, degrees: f64) -> Self {
        self.rotate = degrees;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    pub fn with_read_only(mut self, value: Option<&str>) -> Self {
        self.read_only = true;
        self.read_only_value = value.map(str::to_string);
        self
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Look up a plugin-owned string field such as `color`.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    pub fn f64_field(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(Value::as_f64)
    }

    /// The value a renderer should display: the fixed read-only value for
    /// read-only shapes, the live content otherwise.
    pub fn display_value(&self) -> &str {
        if self.read_only {
            self.read_only_value.as_deref().unwrap_or("")
        } else {
            &self.content
        }
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.width / 2.0,
            self.position.y + self.height / 2.0,
        )
    }

    /// Corners of the shape after rotating it around its center, in stored
    /// (top-left origin, y-down) space.
    pub fn corners(&self) -> [Point; 4] {
        let Point { x, y } = self.position;
        let pivot = self.center();
        [
            Point::new(x, y),
            Point::new(x + self.width, y),
            Point::new(x + self.width, y + self.height),
            Point::new(x, y + self.height),
        ]
        .map(|p| rotate_point(p, pivot, self.rotate))
    }

    /// Axis-aligned bounds of the rotated shape.
    pub fn bbox(&self) -> BBox {
        let corners = self.corners();
        BBox::from_points(&corners).unwrap_or(BBox::new(self.position, self.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_json_keys() {
        let schema = Schema::new("line")
            .with_position(1.0, 2.0)
            .with_size(50.0, 1.0)
            .with_read_only(Some("fixed"))
            .with_field("color", "#000000");
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["type"], "line");
        assert_eq!(json["readOnly"], true);
        assert_eq!(json["readOnlyValue"], "fixed");
        assert_eq!(json["color"], "#000000");
        assert_eq!(json["position"]["y"], 2.0);

        let back: Schema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_schema_defaults_when_missing() {
        let json = r#"{"id":"6f1c1b4e-8f7a-4d4b-9a51-0b5e3b0c1d2e","type":"line","width":10}"#;
        let schema: Schema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.opacity, 1.0);
        assert_eq!(schema.rotate, 0.0);
        assert!(!schema.read_only);
        assert!(schema.extra.is_empty());
    }

    #[test]
    fn test_display_value() {
        let live = Schema::new("text").with_content("hello");
        assert_eq!(live.display_value(), "hello");

        let fixed = live.clone().with_read_only(Some("fixed"));
        assert_eq!(fixed.display_value(), "fixed");

        let empty = live.with_read_only(None);
        assert_eq!(empty.display_value(), "");
    }

    #[test]
    fn test_from_default_assigns_new_id() {
        let default = Schema::new("line").with_size(50.0, 1.0);
        let created = Schema::from_default(&default);
        assert_ne!(created.id, default.id);
        assert_eq!(created.width, 50.0);
    }

    #[test]
    fn test_rotated_bbox() {
        let schema = Schema::new("rectangle")
            .with_position(0.0, 0.0)
            .with_size(20.0, 10.0)
            .with_rotate(90.0);
        let bb = schema.bbox();
        assert!((bb.max.x - bb.min.x - 10.0).abs() < 1e-9);
        assert!((bb.max.y - bb.min.y - 20.0).abs() < 1e-9);
        assert!((bb.center().x - 10.0).abs() < 1e-9);
        assert!((bb.center().y - 5.0).abs() < 1e-9);
    }
}
