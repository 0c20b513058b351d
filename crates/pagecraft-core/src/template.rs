use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::schema::{Schema, SchemaId};

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Page {page} out of range (template has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },
}

/// Page dimensions in document units (points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };

    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// A document template: one ordered schema list per page.
///
/// Schema order is draw order, so later schemas paint over earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default)]
    pub pages: Vec<Vec<Schema>>,
}

impl Template {
    pub fn new(name: &str, page_size: PageSize) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            page_size,
            pages: Vec::new(),
        }
    }

    // ── Pages ────────────────────────────────────────────────────────

    pub fn add_page(&mut self) -> usize {
        self.pages.push(Vec::new());
        self.pages.len() - 1
    }

    pub fn page(&self, page: usize) -> Option<&[Schema]> {
        self.pages.get(page).map(Vec::as_slice)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn remove_page(&mut self, page: usize) -> Result<Vec<Schema>, TemplateError> {
        if page >= self.pages.len() {
            return Err(self.out_of_range(page));
        }
        Ok(self.pages.remove(page))
    }

    // ── Schemas ──────────────────────────────────────────────────────

    pub fn add_schema(&mut self, page: usize, schema: Schema) -> Result<SchemaId, TemplateError> {
        let err = self.out_of_range(page);
        let schemas = self.pages.get_mut(page).ok_or(err)?;
        let id = schema.id;
        schemas.push(schema);
        Ok(id)
    }

    pub fn remove_schema(&mut self, id: &SchemaId) -> Option<Schema> {
        for schemas in &mut self.pages {
            if let Some(idx) = schemas.iter().position(|s| s.id == *id) {
                return Some(schemas.remove(idx));
            }
        }
        None
    }

    pub fn find_schema(&self, id: &SchemaId) -> Option<&Schema> {
        self.pages.iter().flatten().find(|s| s.id == *id)
    }

    pub fn find_schema_mut(&mut self, id: &SchemaId) -> Option<&mut Schema> {
        self.pages.iter_mut().flatten().find(|s| s.id == *id)
    }

    pub fn schema_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    fn out_of_range(&self, page: usize) -> TemplateError {
        TemplateError::PageOutOfRange {
            page,
            count: self.pages.len(),
        }
    }

    // ── Serialization ────────────────────────────────────────────────

    pub fn to_json(&self) -> Result<String, TemplateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        Ok(serde_json::from_str(json)?)
    }
}
