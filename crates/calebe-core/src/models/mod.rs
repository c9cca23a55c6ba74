//! Data models for Calebe platform entities.
//!
//! These are transient copies of server state. Field names follow the
//! API's Portuguese wire names through serde renames:
//!
//! - `User`, `Role`: identity of panel users and team members
//! - `Team`, `Church`, `District`: team registration structure
//! - `Challenge`, `Devotional`, `ContentKind`: managed content
//! - `Response`, `TeamResponse`: challenge submissions under review

pub mod content;
pub mod response;
pub mod team;
pub mod user;

pub use content::{Challenge, ContentKind, Devotional};
pub use response::{Attachment, Response, TeamResponse};
pub use team::{Church, District, Team};
pub use user::{Role, User};
