// Read-only snapshots handed to the narrative generator
//
// Every field is optional so that partially filled input still produces a
// summary. Dates stay as ISO-8601 text and are parsed where they are used.

use lemodele::dates::to_iso;
use lemodele::{
    Milestone, MilestoneStatus, Project, ProjectBundle, ProjectStatus, Risk, RiskSeverity,
    RiskState,
};
use serde::{Deserialize, Serialize};

/// Project attributes used for a summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectView {
    /// Display name
    pub name: Option<String>,
    /// Accountable person
    pub owner: Option<String>,
    /// Lifecycle status
    pub status: Option<ProjectStatus>,
    /// 0-100
    pub completion_percentage: f64,
    /// ISO-8601 start
    pub start_date: Option<String>,
    /// ISO-8601 deadline
    pub deadline: Option<String>,
    /// Free-form description
    pub description: Option<String>,
}

/// Milestone attributes used for a summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilestoneView {
    /// Display name
    pub name: Option<String>,
    /// Current status
    pub status: Option<MilestoneStatus>,
    /// ISO-8601 target date
    pub target_date: Option<String>,
}

/// Risk attributes used for a summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskView {
    /// Display name
    pub name: Option<String>,
    /// Impact
    pub severity: Option<RiskSeverity>,
    /// Free text status; missing means Open
    pub status: Option<String>,
    /// Free-form description
    pub description: Option<String>,
}

impl RiskView {
    /// Normalized status.
    pub fn state(&self) -> RiskState {
        RiskState::from_status(self.status.as_deref())
    }

    /// Anything but Closed.
    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// High severity and not Closed. A missing severity is never high.
    pub fn is_high_and_open(&self) -> bool {
        self.severity == Some(RiskSeverity::High) && self.is_open()
    }
}

impl From<&Project> for ProjectView {
    fn from(project: &Project) -> Self {
        Self {
            name: Some(project.name.clone()),
            owner: Some(project.owner.clone()),
            status: Some(project.status),
            completion_percentage: project.completion_percentage,
            start_date: Some(to_iso(project.start_date)),
            deadline: Some(to_iso(project.deadline)),
            description: project.description.clone(),
        }
    }
}

impl From<&Milestone> for MilestoneView {
    fn from(milestone: &Milestone) -> Self {
        Self {
            name: Some(milestone.name.clone()),
            status: Some(milestone.status),
            target_date: Some(to_iso(milestone.target_date)),
        }
    }
}

impl From<&Risk> for RiskView {
    fn from(risk: &Risk) -> Self {
        Self {
            name: Some(risk.name.clone()),
            severity: Some(risk.severity),
            status: Some(risk.status.clone()),
            description: risk.description.clone(),
        }
    }
}

/// Snapshot a stored bundle, keeping child order.
pub fn views_from_bundle(bundle: &ProjectBundle) -> (ProjectView, Vec<MilestoneView>, Vec<RiskView>) {
    (
        ProjectView::from(&bundle.project),
        bundle.milestones.iter().map(MilestoneView::from).collect(),
        bundle.risks.iter().map(RiskView::from).collect(),
    )
}

/// Present and not blank.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
