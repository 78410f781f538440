//! lestockage - Persistent Storage Layer
//!
//! *Le Stockage* (The Storage) - SQLite schema and CRUD stores for projects, milestones and risks

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Portfolio KPIs and breakdowns over stored rows.
pub mod analytics;
/// Storage error type.
pub mod error;
/// Storage and retrieval of milestones.
pub mod milestones;
/// Whole-project bundle loading.
pub mod portfolio;
/// Storage and retrieval of projects.
pub mod projects;
/// Storage and retrieval of risks.
pub mod risks;
/// Database schema and connection management.
pub mod schema;

pub use analytics::{Analytics, OwnerCompletion, SeverityCount, StatusCount};
pub use error::{Result, StorageError};
pub use milestones::{MilestonePatch, MilestoneStore, NewMilestone};
pub use portfolio::Portfolio;
pub use projects::{NewProject, ProjectPatch, ProjectStore};
pub use risks::{NewRisk, RiskPatch, RiskStore};
pub use schema::{Storage, StorageConfig};
