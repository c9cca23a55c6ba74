//! Calebe core - shared client library for the Calebe admin panel.
//!
//! Staff of the Calebe youth-ministry platform (pastors, leaders and admins)
//! manage teams, members, challenges, devotionals and challenge responses
//! through a REST API. This crate holds everything a front end needs:
//!
//! - `api`: the HTTP client, attaching the current bearer token to every call
//! - `auth`: credential persistence, the observable session and route guard
//! - `forms`: client-side validation and request payloads
//! - `models`: API entities with their wire names
//! - `config`: the on-disk configuration and environment overrides

pub mod api;
pub mod auth;
pub mod config;
pub mod forms;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, FieldError};
pub use auth::{LoginPolicy, Route, RouteGuard, Session, SessionError, SessionManager, SessionStore};
pub use config::{Config, CredentialBackend};
pub use forms::ValidationErrors;
