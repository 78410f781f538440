// Stored records for projects, milestones and risks

use crate::dates::days_between;
use crate::status::{MilestoneStatus, ProjectStatus, RiskSeverity, RiskState};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Status given to a risk when none is supplied.
pub const DEFAULT_RISK_STATUS: &str = "Open";

/// A tracked project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Row id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Person accountable for delivery
    pub owner: String,
    /// Free-form description
    pub description: Option<String>,
    /// Lifecycle status
    pub status: ProjectStatus,
    /// Planned start
    pub start_date: NaiveDateTime,
    /// Planned finish
    pub deadline: NaiveDateTime,
    /// 0-100
    pub completion_percentage: f64,
    /// Creation time (UTC)
    pub created_at: NaiveDateTime,
    /// Last modification time (UTC)
    pub updated_at: NaiveDateTime,
}

impl Project {
    /// Deadline has passed and the project is not completed.
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.deadline < now && self.status != ProjectStatus::Completed
    }

    /// Deadline still ahead, or already completed.
    pub fn is_on_track(&self, now: NaiveDateTime) -> bool {
        self.deadline >= now || self.status == ProjectStatus::Completed
    }

    /// Whole days until the deadline; negative once it has passed.
    pub fn days_remaining(&self, now: NaiveDateTime) -> i64 {
        days_between(now, self.deadline)
    }

    /// Whole days between start and deadline.
    pub fn planned_days(&self) -> i64 {
        days_between(self.start_date, self.deadline)
    }
}

/// A dated checkpoint inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    /// Row id
    pub id: i64,
    /// Owning project
    pub project_id: i64,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Planned date
    pub target_date: NaiveDateTime,
    /// Actual completion date
    pub completion_date: Option<NaiveDateTime>,
    /// Current status
    pub status: MilestoneStatus,
    /// Creation time (UTC)
    pub created_at: NaiveDateTime,
    /// Last modification time (UTC)
    pub updated_at: NaiveDateTime,
}

impl Milestone {
    /// Status is Completed.
    pub fn is_completed(&self) -> bool {
        self.status == MilestoneStatus::Completed
    }

    /// Target date has passed without completion.
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.target_date < now && !self.is_completed()
    }

    /// Whole days until the target, 0 once it has passed.
    pub fn days_until_target(&self, now: NaiveDateTime) -> i64 {
        if self.target_date > now {
            days_between(now, self.target_date)
        } else {
            0
        }
    }

    /// Whole days since the target, 0 while it is ahead.
    pub fn days_past_target(&self, now: NaiveDateTime) -> i64 {
        if self.target_date < now {
            days_between(self.target_date, now)
        } else {
            0
        }
    }
}

/// A logged project risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    /// Row id
    pub id: i64,
    /// Owning project
    pub project_id: i64,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Impact if the risk materializes
    pub severity: RiskSeverity,
    /// Planned response
    pub mitigation_plan: Option<String>,
    /// Free text; "Open", "Mitigated" and "Closed" are recognized
    pub status: String,
    /// Creation time (UTC)
    pub created_at: NaiveDateTime,
    /// Last modification time (UTC)
    pub updated_at: NaiveDateTime,
}

impl Risk {
    /// Normalized status.
    pub fn state(&self) -> RiskState {
        RiskState::from_status(Some(&self.status))
    }

    /// Not closed.
    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// High severity and not closed.
    pub fn is_high_and_open(&self) -> bool {
        self.severity == RiskSeverity::High && self.is_open()
    }
}

/// One project with its milestones and risks, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectBundle {
    /// The project row
    pub project: Project,
    /// Its milestones
    pub milestones: Vec<Milestone>,
    /// Its risks
    pub risks: Vec<Risk>,
}
