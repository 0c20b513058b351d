use pagecraft_core::color::DEFAULT_COLOR;
use pagecraft_core::{rotate_point, Point, Schema};
use pagecraft_renderer::plugin::{DocumentContext, EditorContext, PropField, PropPanel, Translate};
use pagecraft_renderer::{EditorNode, LineOptions, Plugin, PluginError};

use crate::color_field;

fn line_fields(i18n: &Translate<'_>) -> Vec<PropField> {
    vec![color_field("color", i18n("schemas.color"), true, i18n)]
}

/// A straight stroke across the middle of the shape's box. The box height
/// is the stroke thickness.
pub struct LinePlugin {
    panel: PropPanel,
}

impl LinePlugin {
    pub fn new() -> Self {
        Self {
            panel: PropPanel {
                schema: line_fields,
                default_value: String::new(),
                default_schema: Schema::new("line")
                    .with_size(50.0, 1.0)
                    .with_read_only(None)
                    .with_field("color", DEFAULT_COLOR),
            },
        }
    }

    fn color_of(schema: &Schema) -> &str {
        schema.str_field("color").unwrap_or(DEFAULT_COLOR)
    }
}

impl Default for LinePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for LinePlugin {
    fn render_document(&self, ctx: &mut DocumentContext<'_>) -> Result<(), PluginError> {
        // Endpoints are rotated here, so the layout must not rotate the origin.
        let l = ctx.layout(false);
        let pivot = l.pivot();
        let mid_y = l.position.y + l.height / 2.0;
        let start = rotate_point(Point::new(l.position.x, mid_y), pivot, l.rotate.degrees);
        let end = rotate_point(Point::new(l.position.x + l.width, mid_y), pivot, l.rotate.degrees);
        let color = ctx.color(Self::color_of(ctx.schema))?;

        ctx.page.draw_line(&LineOptions {
            start,
            end,
            thickness: l.height,
            color,
            opacity: l.opacity,
        });
        Ok(())
    }

    fn render_editor(&self, ctx: &mut EditorContext<'_>) -> Result<(), PluginError> {
        ctx.append(
            EditorNode::new("div")
                .with_style("background-color", Self::color_of(ctx.schema))
                .with_style("width", "100%")
                .with_style("height", "100%"),
        )
    }

    fn prop_panel(&self) -> &PropPanel {
        &self.panel
    }
}
