//! # API Shared
//!
//! Shared utilities and definitions for the clinic API.
//!
//! Contains:
//! - Wire types for requests and responses (`dto` module)
//! - Shared services like `HealthService`
//! - Bearer token header parsing
//!
//! Used by `clinic-core` for response mapping and by `api-rest` for the HTTP surface.

pub mod auth;
pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
