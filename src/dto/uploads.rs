//! Upload queue DTOs shared by the upload page and `/api/v1/uploads`.

use serde::{Deserialize, Serialize};

use crate::domain::upload::{FileDescriptor, Notification, UploadId, UploadItemView};

/// JSON body of `POST /api/v1/uploads`.
#[derive(Debug, Deserialize)]
pub struct UploadBatchRequest {
    pub files: Vec<FileDescriptor>,
}

/// Result of one accepted batch.
#[derive(Debug, Default, Serialize)]
pub struct IntakeOutcome {
    pub accepted: Vec<UploadId>,
    /// Per-file rejection messages.
    pub rejected: Vec<String>,
}

/// Current queue of the signed-in user plus notifications raised since the
/// last poll.
#[derive(Debug, Serialize)]
pub struct UploadsView {
    pub items: Vec<UploadItemView>,
    pub notifications: Vec<Notification>,
    pub active: bool,
}
