use std::fmt;
use std::sync::Arc;

use pagecraft_core::Schema;

use crate::plugin::{Plugin, PropField, Translate};

struct RegistryEntry {
    schema_type: String,
    plugin: Arc<dyn Plugin>,
}

/// Maps a schema `type` to the plugin that renders it.
///
/// Built once while the designer or generator is configured, then shared
/// read-only as `Arc<PluginRegistry>`; registering needs `&mut self`, so it
/// cannot happen while a render pass holds the shared handle.
#[derive(Default)]
pub struct PluginRegistry {
    entries: Vec<RegistryEntry>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register `plugin` for `schema_type`. A later registration for the same
    /// type replaces the earlier one but keeps its place in [`Self::list_types`].
    /// Returns the replaced plugin, if any.
    pub fn register(&mut self, schema_type: &str, plugin: Arc<dyn Plugin>) -> Option<Arc<dyn Plugin>> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.schema_type == schema_type) {
            log::debug!("Replacing plugin for type '{}'", schema_type);
            return Some(std::mem::replace(&mut entry.plugin, plugin));
        }
        log::debug!("Registering plugin for type '{}'", schema_type);
        self.entries.push(RegistryEntry {
            schema_type: schema_type.to_string(),
            plugin,
        });
        None
    }

    /// Register under the type named by the plugin's own default schema.
    pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) -> Option<Arc<dyn Plugin>> {
        let schema_type = plugin.prop_panel().default_schema.schema_type.clone();
        self.register(&schema_type, plugin)
    }

    pub fn resolve(&self, schema_type: &str) -> Option<Arc<dyn Plugin>> {
        self.entries
            .iter()
            .find(|e| e.schema_type == schema_type)
            .map(|e| Arc::clone(&e.plugin))
    }

    pub fn contains(&self, schema_type: &str) -> bool {
        self.entries.iter().any(|e| e.schema_type == schema_type)
    }

    /// Registered types in registration order.
    pub fn list_types(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.schema_type.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A new shape of `schema_type` built from the plugin's default schema.
    pub fn create_schema(&self, schema_type: &str) -> Option<Schema> {
        let plugin = self.resolve(schema_type)?;
        let panel = plugin.prop_panel();
        let mut schema = Schema::from_default(&panel.default_schema);
        schema.schema_type = schema_type.to_string();
        if schema.content.is_empty() {
            schema.content = panel.default_value.clone();
        }
        Some(schema)
    }

    /// Property-panel fields for `schema_type`, translated with `i18n`.
    pub fn prop_fields(&self, schema_type: &str, i18n: &Translate<'_>) -> Option<Vec<PropField>> {
        self.resolve(schema_type).map(|p| p.prop_panel().fields(i18n))
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("types", &self.list_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use crate::plugin::{DocumentContext, EditorContext, FieldKind, PropPanel};

    fn color_field(i18n: &Translate<'_>) -> Vec<PropField> {
        vec![PropField {
            key: "color".into(),
            title: i18n("schemas.color"),
            kind: FieldKind::String,
            widget: Some("color".into()),
            required: true,
            rules: Vec::new(),
        }]
    }

    struct Named {
        label: &'static str,
        panel: PropPanel,
    }

    impl Named {
        fn new(schema_type: &str, label: &'static str) -> Arc<Self> {
            Arc::new(Self {
                label,
                panel: PropPanel {
                    schema: color_field,
                    default_value: "hello".into(),
                    default_schema: Schema::new(schema_type).with_size(50.0, 1.0),
                },
            })
        }
    }

    impl Plugin for Named {
        fn render_document(&self, _ctx: &mut DocumentContext<'_>) -> Result<(), PluginError> {
            Ok(())
        }

        fn render_editor(&self, ctx: &mut EditorContext<'_>) -> Result<(), PluginError> {
            ctx.append(crate::mount::EditorNode::new(self.label))
        }

        fn prop_panel(&self) -> &PropPanel {
            &self.panel
        }
    }

    fn label_of(registry: &PluginRegistry, schema_type: &str) -> String {
        let plugin = registry.resolve(schema_type).unwrap();
        let mount = crate::mount::MountPoint::new();
        let mut cache = crate::plugin::RenderCache::default();
        let schema = Schema::new(schema_type);
        let options = crate::plugin::RenderOptions::default();
        let theme = crate::plugin::Theme::default();
        let i18n = |k: &str| k.to_string();
        let mut ctx = EditorContext {
            schema: &schema,
            value: "",
            mount: &mount,
            mode: crate::plugin::Mode::Viewer,
            scale: 1.0,
            on_change: None,
            stop_editing: None,
            tab_index: None,
            placeholder: None,
            options: &options,
            theme: &theme,
            i18n: &i18n,
            cache: &mut cache,
        };
        plugin.render_editor(&mut ctx).unwrap();
        mount.nodes()[0].tag.clone()
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = PluginRegistry::new();
        assert!(registry.register("line", Named::new("line", "a")).is_none());
        assert!(registry.register("line", Named::new("line", "b")).is_some());
        assert_eq!(registry.len(), 1);
        assert_eq!(label_of(&registry, "line"), "b");
    }

    #[test]
    fn test_list_types_keeps_first_registration_order() {
        let mut registry = PluginRegistry::new();
        registry.register("text", Named::new("text", "a"));
        registry.register("line", Named::new("line", "a"));
        registry.register("image", Named::new("image", "a"));
        registry.register("text", Named::new("text", "b"));
        assert_eq!(registry.list_types(), vec!["text", "line", "image"]);
    }

    #[test]
    fn test_resolve_missing() {
        let registry = PluginRegistry::new();
        assert!(registry.resolve("line").is_none());
        assert!(!registry.contains("line"));
    }

    #[test]
    fn test_register_plugin_uses_default_type() {
        let mut registry = PluginRegistry::new();
        registry.register_plugin(Named::new("rectangle", "a"));
        assert!(registry.contains("rectangle"));
    }

    #[test]
    fn test_create_schema_from_defaults() {
        let mut registry = PluginRegistry::new();
        registry.register("line", Named::new("line", "a"));
        let a = registry.create_schema("line").unwrap();
        let b = registry.create_schema("line").unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.width, 50.0);
        assert_eq!(a.content, "hello");
        assert!(registry.create_schema("missing").is_none());
    }

    #[test]
    fn test_prop_fields_translated() {
        let mut registry = PluginRegistry::new();
        registry.register("line", Named::new("line", "a"));
        let fields = registry
            .prop_fields("line", &|k: &str| format!("[{k}]"))
            .unwrap();
        assert_eq!(fields[0].title, "[schemas.color]");
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PluginRegistry>();
    }
}
