//! Authentication: the identity collaborator and, for the HTTP server, the
//! signed session carried in the identity cookie.

pub mod backend;
#[cfg(feature = "server")]
pub mod session;
