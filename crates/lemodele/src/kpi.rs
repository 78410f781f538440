// Portfolio KPIs
//
// Percentages are 0-100 and rounded to two decimals. An empty portfolio
// yields all zeros rather than NaN.

use crate::dates::whole_days;
use crate::records::{Milestone, Project, Risk};
use crate::status::{MilestoneStatus, ProjectStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Share of milestones marked Completed, as a percentage.
///
/// With no milestones the `current` percentage is kept.
pub fn completion_from_milestones(statuses: &[MilestoneStatus], current: f64) -> f64 {
    if statuses.is_empty() {
        return current;
    }
    let completed = statuses
        .iter()
        .filter(|s| **s == MilestoneStatus::Completed)
        .count();
    completed as f64 / statuses.len() as f64 * 100.0
}

/// Dashboard KPIs over the whole portfolio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot {
    /// Percentage of projects before their deadline or completed
    pub projects_on_track: f64,
    /// Mean overrun of late projects relative to their planned span
    pub avg_delay_percentage: f64,
    /// High severity risks that are not closed
    pub high_risk_count: usize,
    /// Number of projects
    pub total_projects: usize,
    /// Mean completion percentage
    pub avg_completion: f64,
    /// Percentage of milestones completed
    pub milestone_completion: f64,
}

impl KpiSnapshot {
    /// Compute the snapshot at `now`.
    pub fn compute(
        projects: &[Project],
        milestones: &[Milestone],
        risks: &[Risk],
        now: NaiveDateTime,
    ) -> Self {
        let total_projects = projects.len();
        if total_projects == 0 {
            return Self::default();
        }

        let on_track = projects.iter().filter(|p| p.is_on_track(now)).count();

        let delays: Vec<f64> = projects
            .iter()
            .filter(|p| p.deadline < now && p.status != ProjectStatus::Completed)
            .filter_map(|p| {
                let days_past = whole_days(now - p.deadline);
                let planned = p.planned_days();
                (planned > 0).then(|| days_past as f64 / planned as f64 * 100.0)
            })
            .collect();

        let completions: Vec<f64> = projects.iter().map(|p| p.completion_percentage).collect();

        let statuses: Vec<MilestoneStatus> = milestones.iter().map(|m| m.status).collect();
        let milestone_completion = completion_from_milestones(&statuses, 0.0);

        Self {
            projects_on_track: round2(on_track as f64 / total_projects as f64 * 100.0),
            avg_delay_percentage: round2(mean(&delays)),
            high_risk_count: risks.iter().filter(|r| r.is_high_and_open()).count(),
            total_projects,
            avg_completion: round2(mean(&completions)),
            milestone_completion: round2(milestone_completion),
        }
    }
}

/// Headline portfolio numbers printed by the KPI report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    /// Number of projects
    pub total_projects: usize,
    /// Projects with status Completed
    pub completed_projects: usize,
    /// Mean completion percentage
    pub avg_completion: f64,
    /// Number of logged risks
    pub total_risks: usize,
    /// High severity risks that are not closed
    pub open_high_risks: usize,
}

impl PortfolioStats {
    /// Aggregate the headline numbers.
    pub fn compute(projects: &[Project], risks: &[Risk]) -> Self {
        let completions: Vec<f64> = projects.iter().map(|p| p.completion_percentage).collect();
        Self {
            total_projects: projects.len(),
            completed_projects: projects
                .iter()
                .filter(|p| p.status == ProjectStatus::Completed)
                .count(),
            avg_completion: mean(&completions),
            total_risks: risks.len(),
            open_high_risks: risks.iter().filter(|r| r.is_high_and_open()).count(),
        }
    }
}

impl fmt::Display for PortfolioStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Projects: {}", self.total_projects)?;
        writeln!(f, "Completed Projects: {}", self.completed_projects)?;
        writeln!(f, "Average Completion: {:.1}%", self.avg_completion)?;
        writeln!(f, "Total Risks Logged: {}", self.total_risks)?;
        write!(f, "Open High-Severity Risks: {}", self.open_high_risks)
    }
}
