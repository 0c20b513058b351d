use pagecraft_core::color::DEFAULT_COLOR;
use pagecraft_core::{rotate_point, Point, Schema, TargetColor};
use pagecraft_renderer::plugin::{DocumentContext, EditorContext, FieldKind, PropField, PropPanel, Translate};
use pagecraft_renderer::{EditorNode, Plugin, PluginError, RectangleOptions};

use crate::color_field;

const DEFAULT_BORDER_WIDTH: f64 = 1.0;

fn rectangle_fields(i18n: &Translate<'_>) -> Vec<PropField> {
    vec![
        PropField {
            key: "borderWidth".into(),
            title: i18n("schemas.borderWidth"),
            kind: FieldKind::Number,
            widget: Some("inputNumber".into()),
            required: false,
            rules: Vec::new(),
        },
        color_field("borderColor", i18n("schemas.borderColor"), true, i18n),
        color_field("color", i18n("schemas.color"), false, i18n),
    ]
}

/// An optionally filled box with a border drawn inside its edges.
///
/// Plugin-owned fields: `borderWidth` (points), `borderColor`, and `color`
/// for the fill. An empty `color` leaves the box unfilled.
pub struct RectanglePlugin {
    panel: PropPanel,
}

impl RectanglePlugin {
    pub fn new() -> Self {
        Self {
            panel: PropPanel {
                schema: rectangle_fields,
                default_value: String::new(),
                default_schema: Schema::new("rectangle")
                    .with_size(62.5, 37.5)
                    .with_read_only(None)
                    .with_field("borderWidth", DEFAULT_BORDER_WIDTH)
                    .with_field("borderColor", DEFAULT_COLOR)
                    .with_field("color", ""),
            },
        }
    }

    fn border_width(schema: &Schema) -> f64 {
        schema.f64_field("borderWidth").unwrap_or(DEFAULT_BORDER_WIDTH).max(0.0)
    }

    fn fill(schema: &Schema) -> Option<&str> {
        schema.str_field("color").filter(|c| !c.is_empty())
    }

    fn border_color(schema: &Schema) -> &str {
        schema
            .str_field("borderColor")
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COLOR)
    }
}

impl Default for RectanglePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for RectanglePlugin {
    fn render_document(&self, ctx: &mut DocumentContext<'_>) -> Result<(), PluginError> {
        let l = ctx.layout(true);
        let schema = ctx.schema;
        let border_width = Self::border_width(schema);

        // The stroke is centered on the path, so inset it by half its width to
        // keep the border inside the box. The inset is taken in the box's own
        // frame, which turns around the rotated origin.
        let half = border_width / 2.0;
        let origin = rotate_point(
            Point::new(l.position.x + half, l.position.y + half),
            l.position,
            l.rotate.degrees,
        );

        let border_color = if border_width > 0.0 {
            Some(ctx.color(Self::border_color(schema))?)
        } else {
            None
        };
        let color: Option<TargetColor> = Self::fill(schema).map(|hex| ctx.color(hex)).transpose()?;

        if border_color.is_none() && color.is_none() {
            log::debug!("Rectangle {} has neither border nor fill", schema.id);
            return Ok(());
        }

        ctx.page.draw_rectangle(&RectangleOptions {
            x: origin.x,
            y: origin.y,
            width: (l.width - border_width).max(0.0),
            height: (l.height - border_width).max(0.0),
            rotate: l.rotate,
            border_width,
            border_color,
            color,
            opacity: l.opacity,
        });
        Ok(())
    }

    fn render_editor(&self, ctx: &mut EditorContext<'_>) -> Result<(), PluginError> {
        let schema = ctx.schema;
        let border = format!(
            "{}px solid {}",
            ctx.px(Self::border_width(schema)),
            Self::border_color(schema)
        );
        ctx.append(
            EditorNode::new("div")
                .with_style("width", "100%")
                .with_style("height", "100%")
                .with_style("box-sizing", "border-box")
                .with_style("border", border)
                .with_style("background-color", Self::fill(schema).unwrap_or("transparent")),
        )
    }

    fn prop_panel(&self) -> &PropPanel {
        &self.panel
    }
}
