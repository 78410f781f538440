//! leserve - HTTP Server
//!
//! *Le Serve* (The Server) - Axum-based JSON API for projects, milestones, risks, KPIs, exports and summaries

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// API error types
pub mod error;

/// HTTP handlers for REST endpoints
pub mod handlers;

/// Server configuration from TOML or environment
pub mod config;

/// Request bodies and query strings
pub mod requests;

/// API response types
pub mod responses;

/// Server instance management
pub mod server;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use handlers::{create_router, AppState};
pub use server::{build_app, LeServeServer};
