//! # Pagecraft Renderer
//!
//! Dual-target rendering for template schemas. A [`PluginRegistry`] maps each
//! schema `type` to a [`Plugin`] holding two renderers: one that fills an
//! editor [`MountPoint`] and one that draws onto a document [`Page`].
//!
//! The [`EditorDispatcher`] owns one shape's mount point and cache and
//! re-renders only when the schema, options, mode, or scale change. The
//! [`DocumentDispatcher`] draws a page's shapes in order and isolates
//! per-shape failures according to [`Strictness`].

pub mod error;
pub mod plugin;
pub mod registry;
pub mod mount;
pub mod viewport;
pub mod editor;
pub mod document;
pub mod render_data;

pub use error::{FailureKind, PageReport, PluginError, RenderError, ShapeFailure, StaleRender};
pub use plugin::{
    ColorAdapter, DocumentContext, EditorContext, Mode, Plugin, PropField, PropPanel, RenderCache,
    RenderOptions, Strictness, Theme,
};
pub use registry::PluginRegistry;
pub use mount::{DeferredMount, EditorNode, MountPoint};
pub use viewport::{EditorBox, EditorViewport, ZOOM};
pub use editor::{EditorDispatcher, EditorPage, EditorRequest, RenderOutcome};
pub use document::{DocumentDispatcher, LineOptions, Page, RectangleOptions};
pub use render_data::{DrawCommand, RecordedPage};
