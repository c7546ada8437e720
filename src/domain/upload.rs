//! File intake rules and the upload item lifecycle types.
//!
//! Validation is a pure function over [`FileDescriptor`]; the progress
//! lifecycle itself lives in [`crate::upload_queue`].

use std::fmt::{Display, Formatter};

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::document::human_size;

/// Maximum number of files accepted in one selection.
pub const MAX_BATCH_FILES: usize = 10;

/// Maximum size of a single file (50 MiB).
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Declared MIME types accepted for intake.
pub const ACCEPTED_MIME_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png", "image/tiff"];

/// File name extensions accepted for intake, lower case.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[".pdf", ".jpg", ".jpeg", ".png", ".tiff", ".tif"];

/// What the browser reported about a selected file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }

    /// Lower-cased extension including the dot, if the name has one.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rfind('.')
            .map(|idx| self.name[idx..].to_lowercase())
    }
}

/// Reason a single file was refused.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("{name}: unsupported file type \"{mime_type}\". Allowed types are PDF, JPEG, PNG and TIFF.")]
    UnsupportedType { name: String, mime_type: String },

    #[error("{name}: file is too large ({size}). The maximum size is 50 MB.")]
    TooLarge { name: String, size: String },

    #[error("{name}: invalid file extension. Allowed extensions are .pdf, .jpg, .jpeg, .png, .tiff and .tif.")]
    InvalidExtension { name: String },

    #[error("{name}: file is empty.")]
    Empty { name: String },
}

/// Reason a whole selection was refused.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("You selected {count} files. Please upload at most {max} files at a time.", max = MAX_BATCH_FILES)]
    TooManyFiles { count: usize },
}

/// Rejects selections larger than [`MAX_BATCH_FILES`].
pub fn validate_batch(files: &[FileDescriptor]) -> Result<(), BatchError> {
    if files.len() > MAX_BATCH_FILES {
        return Err(BatchError::TooManyFiles { count: files.len() });
    }
    Ok(())
}

/// Applies the per-file rules in order: type, size, extension, emptiness.
/// The first failing rule wins.
pub fn validate_file(file: &FileDescriptor) -> Result<(), IntakeError> {
    if !ACCEPTED_MIME_TYPES.contains(&file.mime_type.as_str()) {
        return Err(IntakeError::UnsupportedType {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
        });
    }

    if file.size > MAX_FILE_SIZE {
        return Err(IntakeError::TooLarge {
            name: file.name.clone(),
            size: human_size(file.size),
        });
    }

    let extension_ok = file
        .extension()
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()));
    if !extension_ok {
        return Err(IntakeError::InvalidExtension {
            name: file.name.clone(),
        });
    }

    if file.size == 0 {
        return Err(IntakeError::Empty {
            name: file.name.clone(),
        });
    }

    Ok(())
}

/// Opaque upload identifier: millisecond timestamp plus a random suffix.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UploadId(String);

impl UploadId {
    pub fn generate<R: Rng>(timestamp_millis: i64, rng: &mut R) -> Self {
        let suffix: String = (0..9)
            .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_lowercase())
            .collect();
        Self(format!("{timestamp_millis}-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UploadId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UploadId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Lifecycle of an upload item.
///
/// `Rejected` and `Done` are terminal. Removal is possible from any state and
/// simply drops the item from the queue.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadState {
    Rejected { reason: String },
    Queued,
    Uploading,
    Done,
}

impl UploadState {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, UploadState::Rejected { .. } | UploadState::Done)
    }
}

/// Read-only snapshot of an upload item handed to templates and the API.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct UploadItemView {
    pub id: UploadId,
    pub file: FileDescriptor,
    pub display_size: String,
    #[serde(flatten)]
    pub state: UploadState,
    pub progress: u8,
}

/// Severity of a transient user notification.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient message raised by the intake pipeline.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn pdf(size: u64) -> FileDescriptor {
        FileDescriptor::new("records.pdf", "application/pdf", size)
    }

    #[test]
    fn unsupported_type_wins_over_everything() {
        let file = FileDescriptor::new("notes.pdf", "text/plain", 0);
        assert!(matches!(
            validate_file(&file),
            Err(IntakeError::UnsupportedType { .. })
        ));

        let huge = FileDescriptor::new("movie.exe", "video/mp4", MAX_FILE_SIZE * 4);
        assert!(matches!(
            validate_file(&huge),
            Err(IntakeError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn size_boundary_is_inclusive() {
        assert_eq!(validate_file(&pdf(MAX_FILE_SIZE)), Ok(()));
        assert!(matches!(
            validate_file(&pdf(MAX_FILE_SIZE + 1)),
            Err(IntakeError::TooLarge { .. })
        ));
    }

    #[test]
    fn size_is_checked_before_extension() {
        let file = FileDescriptor::new("scan.bmp", "image/png", MAX_FILE_SIZE + 1);
        assert!(matches!(
            validate_file(&file),
            Err(IntakeError::TooLarge { .. })
        ));
    }

    #[test]
    fn extension_must_match_the_allow_list() {
        let file = FileDescriptor::new("scan.gif", "image/png", 10);
        assert_eq!(
            validate_file(&file),
            Err(IntakeError::InvalidExtension {
                name: "scan.gif".to_string()
            })
        );

        let no_ext = FileDescriptor::new("scan", "image/png", 10);
        assert!(validate_file(&no_ext).is_err());

        let upper = FileDescriptor::new("SCAN.TIF", "image/tiff", 10);
        assert_eq!(validate_file(&upper), Ok(()));
    }

    #[test]
    fn empty_file_is_rejected_even_when_otherwise_valid() {
        assert_eq!(
            validate_file(&pdf(0)),
            Err(IntakeError::Empty {
                name: "records.pdf".to_string()
            })
        );
    }

    #[test]
    fn batch_limit_is_ten() {
        let ten = vec![pdf(1); 10];
        assert_eq!(validate_batch(&ten), Ok(()));

        let eleven = vec![pdf(1); 11];
        let err = validate_batch(&eleven).unwrap_err();
        assert_eq!(err, BatchError::TooManyFiles { count: 11 });
        assert!(err.to_string().contains("11 files"));
    }

    #[test]
    fn upload_ids_are_unique_and_time_prefixed() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = UploadId::generate(1_700_000_000_000, &mut rng);
        let b = UploadId::generate(1_700_000_000_000, &mut rng);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("1700000000000-"));
    }
}
