//! pmo_server: REST surface of the project reporting backend.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod seed;
