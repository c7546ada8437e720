//! Domain aggregates exposed by the dashboard service layer.

pub mod auth;
pub mod client;
pub mod dashboard;
pub mod document;
pub mod firm;
pub mod provider;
pub mod request;
pub mod types;
pub mod upload;
