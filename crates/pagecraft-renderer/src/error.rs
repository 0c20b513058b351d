use pagecraft_core::{ColorError, Schema, SchemaId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An asynchronous editor result arrived after its mount point was cleared
/// or destroyed. The result is discarded, never applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Stale render from epoch {issued} discarded (mount point is at {current:?})")]
pub struct StaleRender {
    pub issued: u64,
    /// `None` once the mount point has been destroyed.
    pub current: Option<u64>,
}

/// Errors raised by a plugin's own render code.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("{0}")]
    Message(String),

    #[error("Shape is not editable in the current mode")]
    ReadOnly,

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error(transparent)]
    Stale(#[from] StaleRender),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PluginError {
    pub fn msg(message: impl Into<String>) -> Self {
        PluginError::Message(message.into())
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Unknown shape type '{schema_type}' for schema {id}")]
    UnknownShapeType { id: SchemaId, schema_type: String },

    #[error("Plugin '{schema_type}' failed to render schema {id}: {source}")]
    PluginRender {
        id: SchemaId,
        schema_type: String,
        #[source]
        source: PluginError,
    },

    #[error(transparent)]
    Stale(#[from] StaleRender),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    pub fn unknown_type(schema: &Schema) -> Self {
        RenderError::UnknownShapeType {
            id: schema.id,
            schema_type: schema.schema_type.clone(),
        }
    }

    pub fn plugin(schema: &Schema, source: PluginError) -> Self {
        RenderError::PluginRender {
            id: schema.id,
            schema_type: schema.schema_type.clone(),
            source,
        }
    }
}

/// Why a shape could not be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    UnknownShapeType,
    PluginRenderFailure,
}

/// A shape-scoped failure, attributed to the offending schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeFailure {
    pub id: SchemaId,
    pub schema_type: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl ShapeFailure {
    pub fn new(schema: &Schema, err: &RenderError) -> Self {
        let kind = match err {
            RenderError::UnknownShapeType { .. } => FailureKind::UnknownShapeType,
            _ => FailureKind::PluginRenderFailure,
        };
        Self {
            id: schema.id,
            schema_type: schema.schema_type.clone(),
            kind,
            reason: err.to_string(),
        }
    }
}

/// Outcome of rendering one page of schemas, in draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    pub rendered: Vec<SchemaId>,
    pub failures: Vec<ShapeFailure>,
}

impl PageReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure_for(&self, id: &SchemaId) -> Option<&ShapeFailure> {
        self.failures.iter().find(|f| f.id == *id)
    }
}
