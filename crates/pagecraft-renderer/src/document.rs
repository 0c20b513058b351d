use std::sync::Arc;

use pagecraft_core::{Point, Rotation, Schema, TargetColor};
use serde::{Deserialize, Serialize};

use crate::error::{PageReport, RenderError, ShapeFailure};
use crate::plugin::{ColorAdapter, DocumentContext, RenderOptions, Strictness};
use crate::registry::PluginRegistry;

/// A straight stroke in document space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineOptions {
    pub start: Point,
    pub end: Point,
    pub thickness: f64,
    pub color: TargetColor,
    pub opacity: f64,
}

/// A rectangle drawn from its bottom-left corner `(x, y)` and rotated by
/// `rotate` (counter-clockwise-positive) around that corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleOptions {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotate: Rotation,
    pub border_width: f64,
    pub border_color: Option<TargetColor>,
    pub color: Option<TargetColor>,
    pub opacity: f64,
}

/// One page of the generated document, as seen by document renderers.
/// Coordinates are in points with the origin at the bottom-left corner.
pub trait Page {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn draw_line(&mut self, line: &LineOptions);
    fn draw_rectangle(&mut self, rect: &RectangleOptions);
}

/// Renders schemas onto document pages through their plugins.
pub struct DocumentDispatcher {
    registry: Arc<PluginRegistry>,
    options: RenderOptions,
}

impl DocumentDispatcher {
    pub fn new(registry: Arc<PluginRegistry>, options: RenderOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a single schema. Errors are attributed to the schema.
    pub fn render_schema(&self, page: &mut dyn Page, schema: &Schema) -> Result<(), RenderError> {
        let plugin = self
            .registry
            .resolve(&schema.schema_type)
            .ok_or_else(|| RenderError::unknown_type(schema))?;

        let mut ctx = DocumentContext {
            page,
            schema,
            options: &self.options,
            colors: ColorAdapter::new(&self.options),
        };
        plugin
            .render_document(&mut ctx)
            .map_err(|source| RenderError::plugin(schema, source))
    }

    /// Render a page's schemas in declared order, which is also z-order.
    ///
    /// Unknown types are always skipped and reported. Plugin failures are
    /// skipped in lenient mode and abort the page in strict mode.
    pub fn render_page(&self, page: &mut dyn Page, schemas: &[Schema]) -> Result<PageReport, RenderError> {
        let mut report = PageReport::default();
        for schema in schemas {
            match self.render_schema(page, schema) {
                Ok(()) => report.rendered.push(schema.id),
                Err(err @ RenderError::UnknownShapeType { .. }) => {
                    log::error!("{}", err);
                    report.failures.push(ShapeFailure::new(schema, &err));
                }
                Err(err) if self.options.strictness == Strictness::Strict => {
                    log::error!("{}", err);
                    return Err(err);
                }
                Err(err) => {
                    log::warn!("Skipping shape: {}", err);
                    report.failures.push(ShapeFailure::new(schema, &err));
                }
            }
        }
        log::debug!(
            "Rendered {} of {} shapes",
            report.rendered.len(),
            schemas.len()
        );
        Ok(report)
    }
}
