//! # Pagecraft Schemas
//!
//! Built-in shape plugins. Each one implements [`Plugin`] for both render
//! targets and describes its editable properties through a [`PropPanel`].
//!
//! [`PropPanel`]: pagecraft_renderer::PropPanel

pub mod line;
pub mod rectangle;

use std::sync::Arc;

use pagecraft_core::color::HEX_COLOR_PATTERN;
use pagecraft_renderer::plugin::{FieldKind, FieldRule, PropField, Translate};
use pagecraft_renderer::{Plugin, PluginRegistry};

pub use line::LinePlugin;
pub use rectangle::RectanglePlugin;

/// A registry holding every built-in shape type.
pub fn builtin_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    for plugin in builtin_plugins() {
        registry.register_plugin(plugin);
    }
    log::info!("Loaded {} built-in shape types", registry.len());
    registry
}

pub fn builtin_plugins() -> Vec<Arc<dyn Plugin>> {
    let line: Arc<dyn Plugin> = Arc::new(LinePlugin::new());
    let rectangle: Arc<dyn Plugin> = Arc::new(RectanglePlugin::new());
    vec![line, rectangle]
}

/// A hex color property validated against [`HEX_COLOR_PATTERN`].
pub(crate) fn color_field(key: &str, title: String, required: bool, i18n: &Translate<'_>) -> PropField {
    PropField {
        key: key.to_string(),
        title,
        kind: FieldKind::String,
        widget: Some("color".into()),
        required,
        rules: vec![FieldRule {
            pattern: HEX_COLOR_PATTERN.to_string(),
            message: i18n("hexColorPrompt"),
        }],
    }
}
