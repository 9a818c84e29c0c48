//! Domain services sitting between the tool dispatcher and the HTTP clients
//!
//! - [`RepositoryService`]: search and detail aggregation over GitHub
//! - [`GuideService`]: usage guide generation with a template fallback
//! - [`DocumentStore`]: markdown persistence with backups

pub mod document;
pub mod guide;
pub mod repository;

pub use document::{DocumentError, DocumentStore};
pub use guide::{Guide, GuideService, GuideSource};
pub use repository::RepositoryService;
