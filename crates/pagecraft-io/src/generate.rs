use std::sync::Arc;

use pagecraft_core::Template;
use pagecraft_renderer::{DocumentDispatcher, PageReport, PluginRegistry, RenderOptions};

use crate::error::IoError;
use crate::pdf::{PdfPage, PdfWriter};

/// PDF bytes plus what happened to each page's shapes.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    /// One report per template page, in page order.
    pub reports: Vec<PageReport>,
}

impl GeneratedDocument {
    pub fn is_complete(&self) -> bool {
        self.reports.iter().all(PageReport::is_complete)
    }
}

/// Render every page of `template` into a PDF.
///
/// With [`Strictness::Strict`](pagecraft_renderer::Strictness) the first
/// failing shape aborts generation and the error names its id and type.
pub fn generate(
    template: &Template,
    registry: Arc<PluginRegistry>,
    options: &RenderOptions,
) -> Result<Vec<u8>, IoError> {
    Ok(generate_with_reports(template, registry, options)?.bytes)
}

pub fn generate_with_reports(
    template: &Template,
    registry: Arc<PluginRegistry>,
    options: &RenderOptions,
) -> Result<GeneratedDocument, IoError> {
    if template.pages.is_empty() {
        return Err(IoError::EmptyTemplate(template.name.clone()));
    }

    let dispatcher = DocumentDispatcher::new(registry, options.clone());
    let size = template.page_size;
    let mut writer = PdfWriter::new();
    let mut reports = Vec::with_capacity(template.pages.len());

    for (index, schemas) in template.pages.iter().enumerate() {
        let mut page = PdfPage::new(size.width, size.height);
        let report = dispatcher.render_page(&mut page, schemas)?;
        if !report.is_complete() {
            log::warn!(
                "Page {}: skipped {} of {} shapes",
                index + 1,
                report.failures.len(),
                schemas.len()
            );
        }
        writer.add_page(page)?;
        reports.push(report);
    }

    let bytes = writer.finish()?;
    log::info!(
        "Generated '{}': {} pages, {} bytes",
        template.name,
        reports.len(),
        bytes.len()
    );
    Ok(GeneratedDocument { bytes, reports })
}
