use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, DocumentId, FirmId, closed_enum};

closed_enum!(
    DocumentCategory {
        MedicalRecord => ("medical_record", "Medical Record"),
        Billing => ("billing", "Billing"),
        Imaging => ("imaging", "Imaging"),
        Correspondence => ("correspondence", "Correspondence"),
        Legal => ("legal", "Legal"),
        Other => ("other", "Other"),
    }
);

closed_enum!(
    DocumentStatus {
        PendingReview => ("pending_review", "Pending Review"),
        Reviewed => ("reviewed", "Reviewed"),
        Archived => ("archived", "Archived"),
    }
);

/// Document metadata. File contents are never stored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub firm_id: FirmId,
    pub client_id: Option<ClientId>,
    pub file_name: String,
    /// Declared MIME type.
    pub file_type: String,
    /// Size in bytes.
    pub size: u64,
    pub category: DocumentCategory,
    pub status: DocumentStatus,
    pub tags: Vec<String>,
    pub uploaded_at: NaiveDateTime,
}

impl Document {
    /// Case-insensitive match against the file name and tags.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.file_name.to_lowercase().contains(&needle)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
    }

    /// Human readable size, e.g. `2.4 MB`.
    pub fn display_size(&self) -> String {
        human_size(self.size)
    }
}

/// Formats a byte count with binary units.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_size_uses_binary_units() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(50 * 1024 * 1024), "50.0 MB");
    }
}
