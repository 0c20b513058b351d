use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use pagecraft_core::{HitIndex, Point, Schema, SchemaId};
use sha2::{Digest, Sha256};

use crate::error::{PageReport, RenderError, ShapeFailure};
use crate::mount::MountPoint;
use crate::plugin::{EditorContext, Mode, OnChange, RenderCache, RenderOptions, StopEditing, Theme, Translate};
use crate::registry::PluginRegistry;
use crate::viewport::{EditorBox, EditorViewport};

/// Content hash of everything an editor render depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn compute(schema: &Schema, options: &RenderOptions, mode: Mode, scale: f64) -> Result<Self, RenderError> {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(schema)?);
        hasher.update(serde_json::to_vec(options)?);
        hasher.update(serde_json::to_vec(&mode)?);
        hasher.update(scale.to_bits().to_be_bytes());
        Ok(Self(hasher.finalize().into()))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Per-pass inputs shared by every shape rendered in the editor.
#[derive(Clone, Copy)]
pub struct EditorRequest<'a> {
    pub mode: Mode,
    pub options: &'a RenderOptions,
    pub scale: f64,
    pub theme: &'a Theme,
    pub i18n: &'a Translate<'a>,
    pub on_change: Option<&'a OnChange<'a>>,
    pub stop_editing: Option<&'a StopEditing<'a>>,
    pub tab_index: Option<i32>,
    pub placeholder: Option<&'a str>,
}

impl<'a> EditorRequest<'a> {
    pub fn new(mode: Mode, options: &'a RenderOptions, theme: &'a Theme, i18n: &'a Translate<'a>) -> Self {
        Self {
            mode,
            options,
            scale: 1.0,
            theme,
            i18n,
            on_change: None,
            stop_editing: None,
            tab_index: None,
            placeholder: None,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_on_change(mut self, on_change: &'a OnChange<'a>) -> Self {
        self.on_change = Some(on_change);
        self
    }

    pub fn with_stop_editing(mut self, stop_editing: &'a StopEditing<'a>) -> Self {
        self.stop_editing = Some(stop_editing);
        self
    }

    pub fn with_tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = Some(tab_index);
        self
    }

    pub fn with_placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// The plugin ran and the mount point holds its fresh output.
    Rendered,
    /// Nothing the render depends on changed and the last render succeeded;
    /// the plugin was not invoked.
    Unchanged,
    /// The shape could not be rendered; its mount point is empty.
    Failed(ShapeFailure),
}

/// Renders one shape into its own mount point.
///
/// The mount point is cleared before every render and when the dispatcher is
/// unmounted or dropped, so content is never layered over old content.
/// A failed render is remembered with its fingerprint and reported again
/// while the inputs stay the same.
pub struct EditorDispatcher {
    registry: Arc<PluginRegistry>,
    mount: MountPoint,
    cache: RenderCache,
    last: Option<Fingerprint>,
    failure: Option<ShapeFailure>,
}

impl EditorDispatcher {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            registry,
            mount: MountPoint::new(),
            cache: RenderCache::default(),
            last: None,
            failure: None,
        }
    }

    pub fn mount(&self) -> &MountPoint {
        &self.mount
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Force the next [`Self::render`] to run even if nothing changed.
    pub fn invalidate(&mut self) {
        self.last = None;
        self.failure = None;
    }

    pub fn render(&mut self, schema: &Schema, req: &EditorRequest<'_>) -> Result<RenderOutcome, RenderError> {
        let fingerprint = Fingerprint::compute(schema, req.options, req.mode, req.scale)?;
        if self.last == Some(fingerprint) {
            return Ok(match &self.failure {
                Some(failure) => RenderOutcome::Failed(failure.clone()),
                None => RenderOutcome::Unchanged,
            });
        }
        self.last = Some(fingerprint);
        self.failure = None;
        self.mount.clear();

        let Some(plugin) = self.registry.resolve(&schema.schema_type) else {
            let err = RenderError::unknown_type(schema);
            log::error!("{}", err);
            return Ok(self.fail(ShapeFailure::new(schema, &err)));
        };

        let editable = req.mode.is_editable();
        let mut ctx = EditorContext {
            schema,
            value: schema.display_value(),
            mount: &self.mount,
            mode: req.mode,
            scale: req.scale,
            on_change: if editable { req.on_change } else { None },
            stop_editing: if editable { req.stop_editing } else { None },
            tab_index: req.tab_index,
            placeholder: req.placeholder,
            options: req.options,
            theme: req.theme,
            i18n: req.i18n,
            cache: &mut self.cache,
        };

        match plugin.render_editor(&mut ctx) {
            Ok(()) => Ok(RenderOutcome::Rendered),
            Err(source) => {
                self.mount.clear();
                let err = RenderError::plugin(schema, source);
                log::error!("{}", err);
                Ok(self.fail(ShapeFailure::new(schema, &err)))
            }
        }
    }

    fn fail(&mut self, failure: ShapeFailure) -> RenderOutcome {
        self.failure = Some(failure.clone());
        RenderOutcome::Failed(failure)
    }

    /// Tear down: clear and destroy the mount point and drop cached values.
    pub fn unmount(&mut self) {
        self.mount.destroy();
        self.cache.clear();
        self.last = None;
        self.failure = None;
    }
}

impl Drop for EditorDispatcher {
    fn drop(&mut self) {
        self.mount.destroy();
    }
}

/// One editor page: a dispatcher per schema plus hit-testing.
pub struct EditorPage {
    registry: Arc<PluginRegistry>,
    dispatchers: HashMap<SchemaId, EditorDispatcher>,
    order: Vec<SchemaId>,
    boxes: HashMap<SchemaId, EditorBox>,
    failures: HashMap<SchemaId, ShapeFailure>,
    hit_index: HitIndex,
}

impl EditorPage {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            registry,
            dispatchers: HashMap::new(),
            order: Vec::new(),
            boxes: HashMap::new(),
            failures: HashMap::new(),
            hit_index: HitIndex::new(),
        }
    }

    /// Render `schemas` in order. Shapes no longer present are unmounted.
    /// `on_change` receives the id of the shape being edited.
    pub fn render(
        &mut self,
        schemas: &[Schema],
        viewport: &EditorViewport,
        req: &EditorRequest<'_>,
        on_change: Option<&dyn Fn(SchemaId, String)>,
    ) -> Result<PageReport, RenderError> {
        self.dispatchers
            .retain(|id, _| schemas.iter().any(|s| s.id == *id));
        self.failures.retain(|id, _| schemas.iter().any(|s| s.id == *id));
        self.boxes.clear();

        let mut report = PageReport::default();
        for schema in schemas {
            let id = schema.id;
            let bound = |value: String| {
                if let Some(f) = on_change {
                    f(id, value);
                }
            };
            let mut shape_req = *req;
            shape_req.scale = viewport.scale;
            if on_change.is_some() {
                shape_req.on_change = Some(&bound);
            }

            let registry = &self.registry;
            let dispatcher = self
                .dispatchers
                .entry(id)
                .or_insert_with(|| EditorDispatcher::new(Arc::clone(registry)));

            match dispatcher.render(schema, &shape_req)? {
                RenderOutcome::Rendered | RenderOutcome::Unchanged => {
                    self.failures.remove(&id);
                    report.rendered.push(id);
                }
                RenderOutcome::Failed(failure) => {
                    self.failures.insert(id, failure.clone());
                    report.failures.push(failure);
                }
            }
            self.boxes.insert(id, viewport.wrapper_box(schema));
        }

        self.order = schemas.iter().map(|s| s.id).collect();
        self.hit_index = HitIndex::build(schemas);
        Ok(report)
    }

    pub fn mount(&self, id: &SchemaId) -> Option<&MountPoint> {
        self.dispatchers.get(id).map(EditorDispatcher::mount)
    }

    pub fn wrapper_box(&self, id: &SchemaId) -> Option<&EditorBox> {
        self.boxes.get(id)
    }

    /// Inline style for a shape's wrapper; `outline` is set while the shape
    /// is hovered or selected.
    pub fn wrapper_style(&self, id: &SchemaId, outline: Option<&str>) -> Option<BTreeMap<String, String>> {
        self.boxes.get(id).map(|b| b.to_style(outline))
    }

    /// Whether the shape failed its last render and should be shown as
    /// unrenderable.
    pub fn is_unrenderable(&self, id: &SchemaId) -> bool {
        self.failures.contains_key(id)
    }

    /// Shape ids in draw order.
    pub fn order(&self) -> &[SchemaId] {
        &self.order
    }

    /// The topmost shape under a screen position.
    pub fn hovered(&self, viewport: &EditorViewport, screen: Point) -> Option<SchemaId> {
        self.hit_index.hit(&viewport.screen_to_layout(screen))
    }

    pub fn len(&self) -> usize {
        self.dispatchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dispatchers.is_empty()
    }
}
