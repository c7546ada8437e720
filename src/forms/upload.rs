//! Multipart upload form feeding the intake pipeline.

use actix_multipart::form::{MultipartForm, tempfile::TempFile};

use crate::domain::upload::FileDescriptor;

/// Files chosen on the upload page. Only their metadata is kept.
///
/// No per-field limit: every part shares the field name, so the request as a
/// whole is bounded by `MultipartFormConfig::total_limit` instead.
#[derive(MultipartForm)]
pub struct UploadDocumentsForm {
    pub files: Vec<TempFile>,
}

impl UploadDocumentsForm {
    /// Name, declared MIME type and byte size for each selected file.
    pub fn descriptors(&self) -> Vec<FileDescriptor> {
        self.files
            .iter()
            .filter(|file| file.file_name.as_deref().is_some_and(|name| !name.is_empty()))
            .map(|file| {
                FileDescriptor::new(
                    file.file_name.clone().unwrap_or_default(),
                    file.content_type
                        .as_ref()
                        .map(|mime| mime.essence_str().to_string())
                        .unwrap_or_default(),
                    file.size as u64,
                )
            })
            .collect()
    }
}
