// Jira issue import file
//
// Projects become epics, milestones become stories and risks become tasks.
// Work item ids share one counter across the file: every epic first, then
// every story, then every risk.

use crate::{finish, format_number, Result};
use chrono::NaiveDateTime;
use csv::Writer;
use lemodele::dates::{days_between, format_day};
use lemodele::{Milestone, MilestoneStatus, Project, ProjectBundle, ProjectStatus, Risk, RiskSeverity};
use serde::{Deserialize, Serialize};

/// Jira project key used when none is configured.
pub const DEFAULT_PROJECT_KEY: &str = "PT";

const NO_DESCRIPTION: &str = "No description provided";
const BASE_LABEL: &str = "project-tracker";

const HEADERS: [&str; 16] = [
    "Work Item ID",
    "Summary",
    "Work Type",
    "Issue Type",
    "Project Key",
    "Description",
    "Epic Name",
    "Epic Link",
    "Parent ID",
    "Parent",
    "Priority",
    "Status",
    "Labels",
    "Due Date",
    "Assignee",
    "Story Points",
];

/// Issue counts written by one export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraExportStats {
    /// One per project
    pub epics: usize,
    /// One per milestone
    pub stories: usize,
    /// One per risk
    pub risks: usize,
}

impl JiraExportStats {
    /// Issues of every type.
    pub fn total(&self) -> usize {
        self.epics + self.stories + self.risks
    }
}

/// Jira CSV exporter
#[derive(Debug, Clone)]
pub struct JiraExporter {
    project_key: String,
    assignee: Option<String>,
}

impl Default for JiraExporter {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_KEY)
    }
}

impl JiraExporter {
    /// Exporter for the given Jira project key, unassigned.
    pub fn new(project_key: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            assignee: None,
        }
    }

    /// Assign every issue to `assignee`.
    pub fn with_assignee(mut self, assignee: Option<String>) -> Self {
        self.assignee = assignee.filter(|a| !a.trim().is_empty());
        self
    }

    /// Configured project key.
    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    /// Render the import file at `now`.
    pub fn export(&self, bundles: &[ProjectBundle], now: NaiveDateTime) -> Result<(String, JiraExportStats)> {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_record(HEADERS)?;

        let mut stats = JiraExportStats::default();
        let mut counter = 1usize;
        let mut epic_ids = Vec::with_capacity(bundles.len());

        for bundle in bundles {
            let work_id = format!("EPIC-{counter}");
            counter += 1;
            wtr.write_record(&self.epic_row(&work_id, &bundle.project, now))?;
            epic_ids.push(work_id);
            stats.epics += 1;
        }

        for (bundle, epic_id) in bundles.iter().zip(&epic_ids) {
            for milestone in &bundle.milestones {
                let work_id = format!("STORY-{counter}");
                counter += 1;
                wtr.write_record(&self.story_row(&work_id, epic_id, &bundle.project, milestone, now))?;
                stats.stories += 1;
            }
        }

        for (bundle, epic_id) in bundles.iter().zip(&epic_ids) {
            for risk in &bundle.risks {
                let work_id = format!("RISK-{counter}");
                counter += 1;
                wtr.write_record(&self.risk_row(&work_id, epic_id, &bundle.project, risk))?;
                stats.risks += 1;
            }
        }

        let out = finish(wtr)?;
        tracing::info!(
            project_key = %self.project_key,
            epics = stats.epics,
            stories = stats.stories,
            risks = stats.risks,
            "Rendered Jira export"
        );
        Ok((out, stats))
    }

    fn assignee(&self) -> String {
        self.assignee.clone().unwrap_or_default()
    }

    fn epic_row(&self, work_id: &str, project: &Project, now: NaiveDateTime) -> [String; 16] {
        let description = format!(
            "Owner: {}\nStatus: {}\nCompletion: {}%\nStart Date: {}\nDeadline: {}\n\n{}",
            project.owner,
            project.status.label(),
            format_number(project.completion_percentage),
            format_day(project.start_date),
            format_day(project.deadline),
            text_or_default(project.description.as_deref()),
        );

        let days_remaining = days_between(now, project.deadline);
        let priority = if days_remaining < 0 {
            "Highest"
        } else if days_remaining < 15 {
            "High"
        } else {
            "Medium"
        };

        let mut labels = vec![BASE_LABEL.to_string(), slug(project.status.label())];
        if project.completion_percentage >= 80.0 {
            labels.push("high-completion".to_string());
        }

        [
            work_id.to_string(),
            project.name.clone(),
            "Epic".to_string(),
            "Epic".to_string(),
            self.project_key.clone(),
            description,
            project.name.clone(),
            String::new(),
            String::new(),
            String::new(),
            priority.to_string(),
            project_status(project.status).to_string(),
            labels.join(","),
            format_day(project.deadline),
            self.assignee(),
            String::new(),
        ]
    }

    fn story_row(
        &self,
        work_id: &str,
        epic_id: &str,
        project: &Project,
        milestone: &Milestone,
        now: NaiveDateTime,
    ) -> [String; 16] {
        let mut description = format!(
            "Target Date: {}\nStatus: {}\n\n{}",
            format_day(milestone.target_date),
            milestone.status.label(),
            text_or_default(milestone.description.as_deref()),
        );
        if let Some(done) = milestone.completion_date {
            description.push_str(&format!("\nCompleted: {}", format_day(done)));
        }

        let priority = if milestone.is_overdue(now) {
            "Highest"
        } else if days_between(now, milestone.target_date) < 7 {
            "High"
        } else {
            "Medium"
        };

        let labels = [
            BASE_LABEL.to_string(),
            "milestone".to_string(),
            slug(milestone.status.label()),
        ];

        [
            work_id.to_string(),
            milestone.name.clone(),
            "Story".to_string(),
            "Story".to_string(),
            self.project_key.clone(),
            description,
            String::new(),
            project.name.clone(),
            epic_id.to_string(),
            String::new(),
            priority.to_string(),
            milestone_status(milestone.status).to_string(),
            labels.join(","),
            format_day(milestone.target_date),
            self.assignee(),
            story_points(&milestone.name).to_string(),
        ]
    }

    fn risk_row(&self, work_id: &str, epic_id: &str, project: &Project, risk: &Risk) -> [String; 16] {
        let mut description = format!(
            "Severity: {}\nStatus: {}\n\n{}",
            risk.severity.label(),
            risk.status,
            text_or_default(risk.description.as_deref()),
        );
        if let Some(plan) = risk.mitigation_plan.as_deref().filter(|p| !p.is_empty()) {
            description.push_str(&format!("\n\nMitigation Plan:\n{plan}"));
        }

        let labels = [
            BASE_LABEL.to_string(),
            "risk".to_string(),
            risk.severity.label().to_lowercase(),
            risk.status.to_lowercase(),
        ];

        // Only the exact stored spellings map to workflow states.
        let status = match risk.status.as_str() {
            "Closed" => "Done",
            "Mitigated" => "In Progress",
            _ => "To Do",
        };

        [
            work_id.to_string(),
            risk.name.clone(),
            "Task".to_string(),
            "Task".to_string(),
            self.project_key.clone(),
            description,
            String::new(),
            project.name.clone(),
            epic_id.to_string(),
            String::new(),
            risk_priority(risk.severity).to_string(),
            status.to_string(),
            labels.join(","),
            String::new(),
            self.assignee(),
            String::new(),
        ]
    }
}

fn text_or_default(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(NO_DESCRIPTION)
}

fn slug(label: &str) -> String {
    label.to_lowercase().replace(' ', "-")
}

fn project_status(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::NotStarted => "To Do",
        ProjectStatus::InProgress => "In Progress",
        ProjectStatus::OnHold => "On Hold",
        ProjectStatus::Completed => "Done",
        ProjectStatus::Cancelled => "Cancelled",
    }
}

fn milestone_status(status: MilestoneStatus) -> &'static str {
    match status {
        MilestoneStatus::Pending => "To Do",
        MilestoneStatus::InProgress | MilestoneStatus::Delayed => "In Progress",
        MilestoneStatus::Completed => "Done",
    }
}

fn risk_priority(severity: RiskSeverity) -> &'static str {
    match severity {
        RiskSeverity::High => "Highest",
        RiskSeverity::Medium => "High",
        RiskSeverity::Low => "Medium",
    }
}

/// Estimate from keywords in the milestone name; first match wins.
fn story_points(name: &str) -> u8 {
    let has = |words: &[&str]| words.iter().any(|w| name.contains(w));
    if has(&["Planning", "Design"]) {
        3
    } else if has(&["Development", "Implementation"]) {
        8
    } else if has(&["Testing", "QA"]) {
        5
    } else if has(&["Deployment", "Release"]) {
        3
    } else if has(&["Documentation"]) {
        2
    } else {
        5
    }
}
