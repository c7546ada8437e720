use serde::{Deserialize, Serialize};

use crate::domain::document::{Document, DocumentCategory, DocumentStatus};
use crate::dto::{lenient, normalize_search};
use crate::pagination::Paginated;

/// Raw query string of `/documents`.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct DocumentsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct DocumentFilters {
    pub search: Option<String>,
    pub category: Option<DocumentCategory>,
    pub status: Option<DocumentStatus>,
    pub page: usize,
}

impl From<&DocumentsQuery> for DocumentFilters {
    fn from(query: &DocumentsQuery) -> Self {
        Self {
            search: normalize_search(query.search.as_deref()),
            category: lenient(query.category.as_deref()),
            status: lenient(query.status.as_deref()),
            page: query.page.unwrap_or(1).max(1),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentRow {
    #[serde(flatten)]
    pub document: Document,
    pub client_name: Option<String>,
    pub display_size: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentsPageData {
    pub documents: Paginated<DocumentRow>,
    pub filters: DocumentFilters,
}

/// Synthetic preview of a document; no file contents exist.
#[derive(Debug, Serialize)]
pub struct DocumentPreview {
    pub document: DocumentRow,
    pub is_image: bool,
    pub lines: Vec<String>,
}
