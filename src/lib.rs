//! Records management dashboard for personal-injury law firms.
//!
//! The `data` feature exposes the domain, validation, storage and service
//! layers; `server` adds the Actix-web application on top.

pub mod auth;
pub mod domain;
pub mod dto;
pub mod error_conversions;
pub mod export;
pub mod forms;
pub mod pagination;
pub mod policy;
pub mod repository;
pub mod services;
pub mod upload_queue;

#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod models;
#[cfg(feature = "server")]
pub mod routes;

#[cfg(feature = "server")]
mod app;

#[cfg(feature = "server")]
pub use app::{AppState, flash_messages, run, session_middleware, spawn_upload_clock};
