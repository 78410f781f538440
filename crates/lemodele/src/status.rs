// Status and severity enumerations

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A string that does not name any member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownEnumValue {
    /// Enumeration that rejected the value
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

impl UnknownEnumValue {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Upper-case a user supplied value and fold spaces and dashes into underscores,
/// so "In Progress", "in-progress" and "IN_PROGRESS" compare equal.
fn normalize(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
pub enum ProjectStatus {
    /// Work has not begun
    #[serde(rename = "Not Started")]
    NotStarted,
    /// Work is underway
    #[serde(rename = "In Progress")]
    InProgress,
    /// Work is paused
    #[serde(rename = "On Hold")]
    OnHold,
    /// Work is finished
    #[serde(rename = "Completed")]
    Completed,
    /// Work was abandoned
    #[serde(rename = "Cancelled")]
    Cancelled,
}

impl ProjectStatus {
    /// All variants in declaration order.
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::NotStarted,
        ProjectStatus::InProgress,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
    ];

    /// Storage key written to the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "not_started",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    /// Human-readable label ("In Progress").
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "Not Started",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Cancelled => "Cancelled",
        }
    }

    /// Upper-case enumeration name ("IN_PROGRESS").
    pub fn name(&self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "NOT_STARTED",
            ProjectStatus::InProgress => "IN_PROGRESS",
            ProjectStatus::OnHold => "ON_HOLD",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parse a label, enumeration name or storage key.
    pub fn parse(value: &str) -> Result<Self, UnknownEnumValue> {
        match normalize(value).as_str() {
            "NOT_STARTED" => Ok(ProjectStatus::NotStarted),
            "IN_PROGRESS" => Ok(ProjectStatus::InProgress),
            "ON_HOLD" => Ok(ProjectStatus::OnHold),
            "COMPLETED" => Ok(ProjectStatus::Completed),
            "CANCELLED" => Ok(ProjectStatus::Cancelled),
            _ => Err(UnknownEnumValue::new("project status", value)),
        }
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::NotStarted
    }
}

impl TryFrom<String> for ProjectStatus {
    type Error = UnknownEnumValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status of a single milestone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
pub enum MilestoneStatus {
    /// Not yet started
    #[serde(rename = "Pending")]
    Pending,
    /// Underway
    #[serde(rename = "In Progress")]
    InProgress,
    /// Done
    #[serde(rename = "Completed")]
    Completed,
    /// Behind its target date
    #[serde(rename = "Delayed")]
    Delayed,
}

impl MilestoneStatus {
    /// Storage key written to the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "pending",
            MilestoneStatus::InProgress => "in_progress",
            MilestoneStatus::Completed => "completed",
            MilestoneStatus::Delayed => "delayed",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "Pending",
            MilestoneStatus::InProgress => "In Progress",
            MilestoneStatus::Completed => "Completed",
            MilestoneStatus::Delayed => "Delayed",
        }
    }

    /// Parse a label, enumeration name or storage key.
    pub fn parse(value: &str) -> Result<Self, UnknownEnumValue> {
        match normalize(value).as_str() {
            "PENDING" => Ok(MilestoneStatus::Pending),
            "IN_PROGRESS" => Ok(MilestoneStatus::InProgress),
            "COMPLETED" => Ok(MilestoneStatus::Completed),
            "DELAYED" => Ok(MilestoneStatus::Delayed),
            _ => Err(UnknownEnumValue::new("milestone status", value)),
        }
    }
}

impl Default for MilestoneStatus {
    fn default() -> Self {
        MilestoneStatus::Pending
    }
}

impl TryFrom<String> for MilestoneStatus {
    type Error = UnknownEnumValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity of a logged risk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String")]
pub enum RiskSeverity {
    /// Minor impact
    #[serde(rename = "Low")]
    Low,
    /// Noticeable impact
    #[serde(rename = "Medium")]
    Medium,
    /// Threatens delivery
    #[serde(rename = "High")]
    High,
}

impl RiskSeverity {
    /// Storage key written to the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskSeverity::Low => "low",
            RiskSeverity::Medium => "medium",
            RiskSeverity::High => "high",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            RiskSeverity::Low => "Low",
            RiskSeverity::Medium => "Medium",
            RiskSeverity::High => "High",
        }
    }

    /// Numeric level used by BI tooling (1 = Low .. 3 = High).
    pub fn level(&self) -> u8 {
        match self {
            RiskSeverity::Low => 1,
            RiskSeverity::Medium => 2,
            RiskSeverity::High => 3,
        }
    }

    /// Parse a label, enumeration name or storage key.
    pub fn parse(value: &str) -> Result<Self, UnknownEnumValue> {
        match normalize(value).as_str() {
            "LOW" => Ok(RiskSeverity::Low),
            "MEDIUM" => Ok(RiskSeverity::Medium),
            "HIGH" => Ok(RiskSeverity::High),
            _ => Err(UnknownEnumValue::new("risk severity", value)),
        }
    }
}

impl TryFrom<String> for RiskSeverity {
    type Error = UnknownEnumValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for RiskSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized view of the free-form risk status column.
///
/// Risks carry their status as free text. Only "Open", "Mitigated" and
/// "Closed" carry meaning, compared case-insensitively; a missing status
/// counts as Open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskState {
    /// Still threatening the project
    Open,
    /// Mitigation in place, still tracked
    Mitigated,
    /// No longer relevant
    Closed,
    /// Any other text, treated as open
    Other(String),
}

impl RiskState {
    /// Classify a stored or submitted risk status.
    pub fn from_status(status: Option<&str>) -> Self {
        let Some(raw) = status else {
            return RiskState::Open;
        };
        match raw.to_ascii_uppercase().as_str() {
            "OPEN" => RiskState::Open,
            "MITIGATED" => RiskState::Mitigated,
            "CLOSED" => RiskState::Closed,
            _ => RiskState::Other(raw.to_string()),
        }
    }

    /// Everything except Closed is open.
    pub fn is_open(&self) -> bool {
        !matches!(self, RiskState::Closed)
    }
}
