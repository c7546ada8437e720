//! DTO modules that bridge services with templates and APIs.

use std::fmt::Display;
use std::str::FromStr;

use serde::Serialize;

pub mod api;
pub mod clients;
pub mod dashboard;
pub mod documents;
pub mod providers;
pub mod reports;
pub mod requests;
pub mod settings;
pub mod uploads;

/// Parses an optional filter value, ignoring anything unrecognised.
pub fn lenient<T: FromStr>(value: Option<&str>) -> Option<T> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

/// Trims the search box input and drops it when blank.
pub fn normalize_search(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `(key, label)` pair used to render `<select>` options.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl ToString, label: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            label: label.into(),
        }
    }
}

/// Select options for every variant of a closed enum.
pub fn choices<T: Copy + Display>(all: &[T], label: fn(T) -> &'static str) -> Vec<SelectOption> {
    all.iter()
        .map(|&variant| SelectOption::new(variant, label(variant)))
        .collect()
}

/// A downloadable file produced by an export service.
#[derive(Debug)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::ClientStatus;

    #[test]
    fn lenient_ignores_unknown_and_blank_values() {
        assert_eq!(lenient::<ClientStatus>(Some("active")), Some(ClientStatus::Active));
        assert_eq!(lenient::<ClientStatus>(Some("archived")), None);
        assert_eq!(lenient::<ClientStatus>(Some("  ")), None);
        assert_eq!(lenient::<ClientStatus>(None), None);
    }

    #[test]
    fn choices_use_keys_and_labels() {
        let options = choices(ClientStatus::ALL, ClientStatus::label);
        assert_eq!(options.len(), 3);
        assert_eq!(options[0], SelectOption::new("active", "Active"));
    }

    #[test]
    fn search_is_trimmed() {
        assert_eq!(normalize_search(Some("  smith ")), Some("smith".to_string()));
        assert_eq!(normalize_search(Some("   ")), None);
    }
}
