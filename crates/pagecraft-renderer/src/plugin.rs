use std::collections::HashMap;

use pagecraft_core::color::{hex_to_target_color, hex_to_target_color_or_default};
use pagecraft_core::{layout, ColorMode, DocumentLayout, Schema, TargetColor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::Page;
use crate::error::PluginError;
use crate::mount::{DeferredMount, EditorNode, MountPoint};
use crate::viewport::ZOOM;

/// Translation lookup supplied by the host (i18n is external).
pub type Translate<'a> = dyn Fn(&str) -> String + 'a;
/// Called with the new value when the user edits a shape.
pub type OnChange<'a> = dyn Fn(String) + 'a;
/// Called when the user leaves a shape's inline editor.
pub type StopEditing<'a> = dyn Fn() + 'a;

/// Editor surface mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Viewer,
    Form,
    Designer,
}

impl Mode {
    pub fn is_editable(self) -> bool {
        matches!(self, Mode::Form | Mode::Designer)
    }
}

/// What the document dispatcher does when one shape fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Skip the failing shape, report it, and keep rendering the page.
    #[default]
    Lenient,
    /// Abort the page and surface the failure to the caller.
    Strict,
}

/// Render options shared by every shape in a render pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    pub color_type: ColorMode,
    pub strictness: Strictness,
    /// Options the core does not interpret, passed through to plugins.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RenderOptions {
    pub fn with_color_type(mut self, color_type: ColorMode) -> Self {
        self.color_type = color_type;
        self
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Design tokens of the host UI (colors, radii) keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub tokens: HashMap<String, String>,
}

impl Theme {
    pub fn token(&self, key: &str) -> Option<&str> {
        self.tokens.get(key).map(String::as_str)
    }

    pub fn with_token(mut self, key: &str, value: &str) -> Self {
        self.tokens.insert(key.to_string(), value.to_string());
        self
    }
}

// ── Property panel descriptor ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub pattern: String,
    pub message: String,
}

/// One editable property shown in the side panel for a shape type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropField {
    pub key: String,
    pub title: String,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<FieldRule>,
}

/// Editing metadata for a shape type. `default_value` and `default_schema`
/// are only consulted when a shape is created, never while rendering.
#[derive(Debug, Clone)]
pub struct PropPanel {
    pub schema: fn(&Translate<'_>) -> Vec<PropField>,
    pub default_value: String,
    pub default_schema: Schema,
}

impl PropPanel {
    pub fn fields(&self, i18n: &Translate<'_>) -> Vec<PropField> {
        (self.schema)(i18n)
    }
}

// ── Render contexts ──────────────────────────────────────────────────

/// Converts user color tokens for the document renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorAdapter {
    pub mode: ColorMode,
    pub strictness: Strictness,
}

impl ColorAdapter {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            mode: options.color_type,
            strictness: options.strictness,
        }
    }

    /// Invalid colors fall back to the default color unless strict.
    pub fn convert(&self, hex: &str) -> Result<TargetColor, PluginError> {
        match self.strictness {
            Strictness::Strict => Ok(hex_to_target_color(hex, self.mode)?),
            Strictness::Lenient => Ok(hex_to_target_color_or_default(hex, self.mode)),
        }
    }
}

/// Everything a document renderer gets for one shape.
pub struct DocumentContext<'a> {
    pub page: &'a mut dyn Page,
    pub schema: &'a Schema,
    pub options: &'a RenderOptions,
    pub colors: ColorAdapter,
}

impl DocumentContext<'_> {
    /// The schema's geometry in this page's document space.
    pub fn layout(&self, apply_rotate_translate: bool) -> DocumentLayout {
        layout(self.schema, self.page.height(), apply_rotate_translate)
    }

    pub fn color(&self, hex: &str) -> Result<TargetColor, PluginError> {
        self.colors.convert(hex)
    }
}

/// Everything an editor renderer gets for one shape.
///
/// `on_change` and `stop_editing` are `None` in viewer mode; plugins treat
/// that as non-interactive.
pub struct EditorContext<'a> {
    pub schema: &'a Schema,
    pub value: &'a str,
    pub mount: &'a MountPoint,
    pub mode: Mode,
    /// Display zoom; see [`EditorContext::px`].
    pub scale: f64,
    pub on_change: Option<&'a OnChange<'a>>,
    pub stop_editing: Option<&'a StopEditing<'a>>,
    pub tab_index: Option<i32>,
    pub placeholder: Option<&'a str>,
    pub options: &'a RenderOptions,
    pub theme: &'a Theme,
    pub i18n: &'a Translate<'a>,
    pub cache: &'a mut RenderCache,
}

impl EditorContext<'_> {
    pub fn append(&self, node: EditorNode) -> Result<(), PluginError> {
        Ok(self.mount.append(node)?)
    }

    /// Push a new value back to the host. Fails in read-only modes.
    pub fn change(&self, value: String) -> Result<(), PluginError> {
        let on_change = self.on_change.ok_or(PluginError::ReadOnly)?;
        on_change(value);
        Ok(())
    }

    pub fn stop(&self) -> Result<(), PluginError> {
        let stop_editing = self.stop_editing.ok_or(PluginError::ReadOnly)?;
        stop_editing();
        Ok(())
    }

    /// Document length to editor pixels at the current scale.
    pub fn px(&self, length: f64) -> f64 {
        length * ZOOM * self.scale
    }

    pub fn is_interactive(&self) -> bool {
        self.on_change.is_some()
    }

    /// Ticket for content produced after this call returns.
    pub fn defer(&self) -> DeferredMount {
        self.mount.defer()
    }
}

/// Per-shape key-value cache for expensive idempotent plugin work.
/// Lives as long as the shape's mount point.
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: HashMap<String, Value>,
}

impl RenderCache {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: &str, value: Value) -> Option<Value> {
        self.entries.insert(key.to_string(), value)
    }

    pub fn get_or_insert_with(&mut self, key: &str, f: impl FnOnce() -> Value) -> &Value {
        self.entries.entry(key.to_string()).or_insert_with(f)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A shape type: both renderers plus its editing metadata.
pub trait Plugin: Send + Sync {
    /// Draw the shape onto a document page.
    fn render_document(&self, ctx: &mut DocumentContext<'_>) -> Result<(), PluginError>;

    /// Populate the shape's mount point in the editor.
    fn render_editor(&self, ctx: &mut EditorContext<'_>) -> Result<(), PluginError>;

    fn prop_panel(&self) -> &PropPanel;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_editable() {
        assert!(!Mode::Viewer.is_editable());
        assert!(Mode::Form.is_editable());
        assert!(Mode::Designer.is_editable());
    }

    #[test]
    fn test_theme_tokens() {
        let theme = Theme::default()
            .with_token("colorPrimary", "#18a0fb")
            .with_token("borderRadius", "4px");
        assert_eq!(theme.token("colorPrimary"), Some("#18a0fb"));
        assert_eq!(theme.token("borderRadius"), Some("4px"));
        assert_eq!(theme.token("colorError"), None);
    }

    #[test]
    fn test_options_from_json() {
        let opts = RenderOptions::from_json(r#"{"colorType":"cmyk","font":"Roboto"}"#).unwrap();
        assert_eq!(opts.color_type, ColorMode::Cmyk);
        assert_eq!(opts.strictness, Strictness::Lenient);
        assert_eq!(opts.extra["font"], "Roboto");

        let opts = RenderOptions::from_json("{}").unwrap();
        assert_eq!(opts, RenderOptions::default());
    }

    #[test]
    fn test_color_adapter_strictness() {
        let lenient = ColorAdapter::new(&RenderOptions::default());
        assert_eq!(
            lenient.convert("red").unwrap(),
            TargetColor::Rgb {
                r: 0.0,
                g: 0.0,
                b: 0.0
            }
        );

        let strict = ColorAdapter::new(&RenderOptions::default().with_strictness(Strictness::Strict));
        assert!(matches!(strict.convert("red"), Err(PluginError::Color(_))));
    }

    #[test]
    fn test_render_cache() {
        let mut cache = RenderCache::default();
        let mut calls = 0;
        cache.get_or_insert_with("decoded", || {
            calls += 1;
            Value::from(42)
        });
        cache.get_or_insert_with("decoded", || {
            calls += 1;
            Value::from(7)
        });
        assert_eq!(calls, 1);
        assert_eq!(cache.get("decoded"), Some(&Value::from(42)));
        cache.clear();
        assert!(cache.is_empty());
    }
}
