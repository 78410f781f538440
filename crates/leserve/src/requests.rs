//! Request bodies and query strings
//!
//! Bodies carry enumerations and dates as strings so that an unknown status
//! or an unparseable date becomes a 400 rather than a generic JSON rejection.

use crate::error::{ApiError, ApiResult};
use chrono::NaiveDateTime;
use lemodele::dates::parse_iso;
use lemodele::{MilestoneStatus, ProjectStatus, RiskSeverity};
use lestockage::{MilestonePatch, NewMilestone, NewProject, NewRisk, ProjectPatch, RiskPatch};
use serde::{Deserialize, Deserializer};

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn date(field: &str, value: &str) -> ApiResult<NaiveDateTime> {
    parse_iso(value).ok_or_else(|| ApiError::bad_request(format!("Invalid {}: {:?}", field, value)))
}

fn opt_date(field: &str, value: Option<&str>) -> ApiResult<Option<NaiveDateTime>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => date(field, v).map(Some),
        None => Ok(None),
    }
}

/// `?project_id=` filter for list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Only rows belonging to this project
    pub project_id: Option<i64>,
}

/// `GET /api/export/jira` options
#[derive(Debug, Default, Deserialize)]
pub struct JiraQuery {
    /// Jira project key, `PT` when absent
    pub project_key: Option<String>,
    /// Assignee for every issue
    pub assignee: Option<String>,
}

/// `POST /api/projects`
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    /// Display name
    pub name: String,
    /// Accountable person
    pub owner: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Status label or name, "Not Started" when absent
    #[serde(default)]
    pub status: Option<String>,
    /// ISO-8601 start
    pub start_date: String,
    /// ISO-8601 deadline
    pub deadline: String,
    /// 0-100, 0 when absent
    #[serde(default)]
    pub completion_percentage: Option<f64>,
}

impl CreateProjectRequest {
    /// Parse into a store insert.
    pub fn into_new(self) -> ApiResult<NewProject> {
        let start_date = date("start_date", &self.start_date)?;
        let deadline = date("deadline", &self.deadline)?;
        let mut new = NewProject::new(self.name, self.owner, start_date, deadline);
        new.description = self.description;
        if let Some(status) = self.status.as_deref() {
            new.status = ProjectStatus::parse(status)?;
        }
        if let Some(completion) = self.completion_percentage {
            new.completion_percentage = completion;
        }
        Ok(new)
    }
}

/// `PUT /api/projects/:id`; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    /// New name
    pub name: Option<String>,
    /// New owner
    pub owner: Option<String>,
    /// New description; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// New status
    pub status: Option<String>,
    /// New start date
    pub start_date: Option<String>,
    /// New deadline
    pub deadline: Option<String>,
    /// New completion percentage
    pub completion_percentage: Option<f64>,
}

impl UpdateProjectRequest {
    /// Parse into a store patch.
    pub fn into_patch(self) -> ApiResult<ProjectPatch> {
        Ok(ProjectPatch {
            name: self.name,
            owner: self.owner,
            description: self.description,
            status: self.status.as_deref().map(ProjectStatus::parse).transpose()?,
            start_date: self.start_date.as_deref().map(|v| date("start_date", v)).transpose()?,
            deadline: self.deadline.as_deref().map(|v| date("deadline", v)).transpose()?,
            completion_percentage: self.completion_percentage,
        })
    }
}

/// `POST /api/milestones`
#[derive(Debug, Deserialize)]
pub struct CreateMilestoneRequest {
    /// Owning project
    pub project_id: i64,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// ISO-8601 target
    pub target_date: String,
    /// ISO-8601 completion; empty means none
    #[serde(default)]
    pub completion_date: Option<String>,
    /// Status label or name, "Pending" when absent
    #[serde(default)]
    pub status: Option<String>,
}

impl CreateMilestoneRequest {
    /// Parse into a store insert.
    pub fn into_new(self) -> ApiResult<NewMilestone> {
        let target_date = date("target_date", &self.target_date)?;
        let mut new = NewMilestone::new(self.project_id, self.name, target_date);
        new.description = self.description;
        new.completion_date = opt_date("completion_date", self.completion_date.as_deref())?;
        if let Some(status) = self.status.as_deref() {
            new.status = MilestoneStatus::parse(status)?;
        }
        Ok(new)
    }
}

/// `PUT /api/milestones/:id`
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMilestoneRequest {
    /// New name
    pub name: Option<String>,
    /// New description; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// New target date
    pub target_date: Option<String>,
    /// New completion date; `null` or `""` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub completion_date: Option<Option<String>>,
    /// New status
    pub status: Option<String>,
}

impl UpdateMilestoneRequest {
    /// Parse into a store patch.
    pub fn into_patch(self) -> ApiResult<MilestonePatch> {
        let completion_date = match self.completion_date {
            Some(value) => Some(opt_date("completion_date", value.as_deref())?),
            None => None,
        };
        Ok(MilestonePatch {
            name: self.name,
            description: self.description,
            target_date: self.target_date.as_deref().map(|v| date("target_date", v)).transpose()?,
            completion_date,
            status: self.status.as_deref().map(MilestoneStatus::parse).transpose()?,
        })
    }
}

/// `POST /api/risks`
#[derive(Debug, Deserialize)]
pub struct CreateRiskRequest {
    /// Owning project
    pub project_id: i64,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// "Low", "Medium" or "High"
    pub severity: String,
    /// Planned response
    #[serde(default)]
    pub mitigation_plan: Option<String>,
    /// Free text, "Open" when absent
    #[serde(default)]
    pub status: Option<String>,
}

impl CreateRiskRequest {
    /// Parse into a store insert.
    pub fn into_new(self) -> ApiResult<NewRisk> {
        let severity = RiskSeverity::parse(&self.severity)?;
        let mut new = NewRisk::new(self.project_id, self.name, severity);
        new.description = self.description;
        new.mitigation_plan = self.mitigation_plan;
        new.status = self.status;
        Ok(new)
    }
}

/// `PUT /api/risks/:id`
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRiskRequest {
    /// New name
    pub name: Option<String>,
    /// New description; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// New severity
    pub severity: Option<String>,
    /// New mitigation plan; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub mitigation_plan: Option<Option<String>>,
    /// New status text
    pub status: Option<String>,
}

impl UpdateRiskRequest {
    /// Parse into a store patch.
    pub fn into_patch(self) -> ApiResult<RiskPatch> {
        Ok(RiskPatch {
            name: self.name,
            description: self.description,
            severity: self.severity.as_deref().map(RiskSeverity::parse).transpose()?,
            mitigation_plan: self.mitigation_plan,
            status: self.status,
        })
    }
}
