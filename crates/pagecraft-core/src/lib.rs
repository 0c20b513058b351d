//! # Pagecraft Core
//!
//! Schema data model, template persistence, and the pure geometry and color
//! math shared by both render targets. Nothing in this crate depends on a
//! rendering library, so the transforms can be tested on their own.

pub mod geometry;
pub mod schema;
pub mod template;
pub mod color;
pub mod spatial;

pub use geometry::{layout, rotate_point, BBox, DocumentLayout, Point, Rotation};
pub use schema::{Schema, SchemaId};
pub use template::{PageSize, Template, TemplateError};
pub use color::{hex_to_target_color, ColorError, ColorMode, TargetColor};
pub use spatial::HitIndex;
