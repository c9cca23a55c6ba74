//! REST API client module for the Calebe platform.
//!
//! This module provides the `ApiClient` used for every call to the
//! platform API: sign-in, team and member management, challenges,
//! devotionals, submission review and uploads.
//!
//! The API uses bearer token authentication. The token is read from the
//! shared `SessionStore` on each request.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginResponse, UploadedFile, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::{ApiError, FieldError};
