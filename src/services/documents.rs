//! Document library: listing, synthetic previews and deletion.

use std::collections::HashMap;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::document::Document;
use crate::domain::types::{DocumentId, FirmId};
use crate::dto::documents::{
    DocumentFilters, DocumentPreview, DocumentRow, DocumentsPageData, DocumentsQuery,
};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::policy::{Feature, authorize};
use crate::repository::{
    ClientListQuery, ClientReader, DocumentListQuery, DocumentReader, DocumentWriter,
};
use crate::services::{ServiceError, ServiceResult};

fn document_rows<R>(
    repo: &R,
    firm_id: FirmId,
    documents: Vec<Document>,
) -> ServiceResult<Vec<DocumentRow>>
where
    R: ClientReader + ?Sized,
{
    let (_, clients) = repo.list_clients(ClientListQuery::new(firm_id))?;
    let names: HashMap<_, _> = clients
        .into_iter()
        .map(|c| (c.id, c.name.into_inner()))
        .collect();

    Ok(documents
        .into_iter()
        .map(|document| DocumentRow {
            client_name: document.client_id.and_then(|id| names.get(&id).cloned()),
            display_size: document.display_size(),
            document,
        })
        .collect())
}

fn document_id(raw: i32) -> ServiceResult<DocumentId> {
    DocumentId::new(raw).map_err(|_| ServiceError::NotFound)
}

pub fn list_documents<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &DocumentsQuery,
) -> ServiceResult<DocumentsPageData>
where
    R: ClientReader + DocumentReader + ?Sized,
{
    authorize(user, Feature::ViewDocuments)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let filters = DocumentFilters::from(query);

    let mut list_query =
        DocumentListQuery::new(firm_id).paginate(filters.page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = &filters.search {
        list_query = list_query.search(term.clone());
    }
    if let Some(category) = filters.category {
        list_query = list_query.category(category);
    }
    if let Some(status) = filters.status {
        list_query = list_query.status(status);
    }

    let (total, documents) = repo.list_documents(list_query).map_err(|err| {
        log::error!("Failed to list documents: {err}");
        err
    })?;
    let rows = document_rows(repo, firm_id, documents)?;

    Ok(DocumentsPageData {
        documents: Paginated::new(rows, filters.page, total, DEFAULT_ITEMS_PER_PAGE),
        filters,
    })
}

/// Builds the templated preview shown instead of file contents.
pub fn load_preview<R>(
    repo: &R,
    user: &AuthenticatedUser,
    document_id_raw: i32,
) -> ServiceResult<DocumentPreview>
where
    R: ClientReader + DocumentReader + ?Sized,
{
    authorize(user, Feature::ViewDocuments)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let id = document_id(document_id_raw)?;
    let document = repo
        .get_document_by_id(id, firm_id)?
        .ok_or(ServiceError::NotFound)?;

    let row = document_rows(repo, firm_id, vec![document])?
        .pop()
        .ok_or_else(|| ServiceError::Internal("document row missing".to_string()))?;

    let doc = &row.document;
    let mut lines = vec![
        format!("{}: {}", user.firm_name, doc.category.label()),
        format!("File: {} ({}, {})", doc.file_name, doc.file_type, row.display_size),
        format!("Received: {}", doc.uploaded_at.format("%B %-d, %Y")),
    ];
    if let Some(client) = &row.client_name {
        lines.push(format!("Client: {client}"));
    }
    if !doc.tags.is_empty() {
        lines.push(format!("Tags: {}", doc.tags.join(", ")));
    }
    lines.push(format!("Review status: {}", doc.status.label()));

    Ok(DocumentPreview {
        is_image: doc.file_type.starts_with("image/"),
        document: row,
        lines,
    })
}

pub fn delete_document<R>(
    repo: &R,
    user: &AuthenticatedUser,
    document_id_raw: i32,
) -> ServiceResult<()>
where
    R: DocumentWriter + ?Sized,
{
    authorize(user, Feature::UploadDocuments)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let id = document_id(document_id_raw)?;

    repo.delete_document(id, firm_id).map_err(|err| {
        log::error!("Failed to delete document {id}: {err}");
        err
    })?;

    log::info!("Document {id} deleted by {}", user.email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::repository::errors::RepositoryError;
    use crate::services::test_support::{repo, user};

    #[test]
    fn search_matches_tags() {
        let repo = repo();
        let query = DocumentsQuery {
            search: Some("HIPAA".into()),
            ..Default::default()
        };

        let data = list_documents(&repo, &user(Role::Viewer), &query).unwrap();

        assert_eq!(data.documents.total, 1);
        let row = &data.documents.items[0];
        assert_eq!(row.client_name.as_deref(), Some("Robert Johnson"));
    }

    #[test]
    fn category_filter_applies() {
        let repo = repo();
        let query = DocumentsQuery {
            category: Some("imaging".into()),
            ..Default::default()
        };

        let data = list_documents(&repo, &user(Role::Viewer), &query).unwrap();

        assert_eq!(data.documents.total, 2);
    }

    #[test]
    fn preview_is_synthetic() {
        let repo = repo();
        let preview = load_preview(&repo, &user(Role::Viewer), 2).unwrap();

        assert!(preview.is_image);
        assert!(preview.lines.iter().any(|l| l.contains("smith_mri_lumbar.tiff")));
        assert!(preview.lines.iter().any(|l| l == "Client: John Smith"));
    }

    #[test]
    fn delete_twice_reports_not_found() {
        let repo = repo();
        let admin = user(Role::Admin);

        delete_document(&repo, &admin, 7).unwrap();

        assert!(matches!(
            delete_document(&repo, &admin, 7),
            Err(ServiceError::Repository(RepositoryError::NotFound))
        ));
        assert!(matches!(
            load_preview(&repo, &admin, 7),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn viewer_cannot_delete() {
        let repo = repo();
        assert!(matches!(
            delete_document(&repo, &user(Role::Viewer), 1),
            Err(ServiceError::Unauthorized)
        ));
    }
}
