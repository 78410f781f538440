//! lemodele - Domain Model
//!
//! *Le Modèle* (The Model) - Statuses, records, date helpers and KPI math shared by every LeSuivi crate

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// ISO-8601 parsing and calendar-day arithmetic.
pub mod dates;
/// Portfolio KPIs and completion math.
pub mod kpi;
/// Project, milestone and risk records.
pub mod records;
/// Closed status and severity enumerations.
pub mod status;

pub use kpi::{completion_from_milestones, KpiSnapshot, PortfolioStats};
pub use records::{Milestone, Project, ProjectBundle, Risk, DEFAULT_RISK_STATUS};
pub use status::{MilestoneStatus, ProjectStatus, RiskSeverity, RiskState, UnknownEnumValue};
