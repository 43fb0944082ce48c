//! # Drive
//!
//! Google Drive permissions client for the reconciliation engine.
//!
//! [`DriveClient`] authenticates as a service account and implements
//! [`reconcile::AccessControlClient`], so a plan built by `reconcile` can be
//! executed against real files.
//!
//! ## Features
//!
//! - Service-account JWT authentication with a shared, cached access token
//! - Paginated permission listing
//! - Ownership transfer on owner updates
//! - Categorized errors with user-facing advice

pub mod auth;
pub mod client;
pub mod error;

pub use auth::{DEFAULT_TOKEN_URI, DRIVE_SCOPE, ServiceAccountKey, TokenProvider};
pub use client::{DEFAULT_API_BASE, DriveClient};
pub use error::{Error, ErrorCategory, Result};
