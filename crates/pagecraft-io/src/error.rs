use pagecraft_core::TemplateError;
use pagecraft_renderer::RenderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Template '{0}' has no pages")]
    EmptyTemplate(String),
}
