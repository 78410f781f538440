// Power BI relational tables
//
// Three CSV tables keyed by Project ID so they can be related after import.
// Derived columns are computed at export time.

use crate::{finish, format_number, yes_no, Result};
use chrono::NaiveDateTime;
use csv::Writer;
use lemodele::dates::{format_day, format_timestamp};
use lemodele::{ProjectBundle, RiskSeverity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const PROJECT_HEADERS: [&str; 13] = [
    "Project ID",
    "Project Name",
    "Owner",
    "Description",
    "Status",
    "Start Date",
    "Deadline",
    "Completion Percentage",
    "Days Remaining",
    "Is Overdue",
    "Is On Track",
    "Created At",
    "Updated At",
];

const MILESTONE_HEADERS: [&str; 14] = [
    "Milestone ID",
    "Project ID",
    "Project Name",
    "Milestone Name",
    "Description",
    "Target Date",
    "Completion Date",
    "Status",
    "Is Overdue",
    "Is Completed",
    "Days Until Target",
    "Days Past Target",
    "Created At",
    "Updated At",
];

const RISK_HEADERS: [&str; 13] = [
    "Risk ID",
    "Project ID",
    "Project Name",
    "Risk Name",
    "Description",
    "Severity",
    "Severity Level",
    "Mitigation Plan",
    "Status",
    "Is High Risk",
    "Is Open",
    "Created At",
    "Updated At",
];

/// One of the exported tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerBiTable {
    /// One row per project
    Projects,
    /// One row per milestone
    Milestones,
    /// One row per risk
    Risks,
}

impl PowerBiTable {
    /// Every table in export order.
    pub const ALL: [PowerBiTable; 3] = [PowerBiTable::Projects, PowerBiTable::Milestones, PowerBiTable::Risks];

    /// Lowercase name used in file names and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerBiTable::Projects => "projects",
            PowerBiTable::Milestones => "milestones",
            PowerBiTable::Risks => "risks",
        }
    }

    /// `powerbi_{table}_{stamp}.csv`
    pub fn file_name(&self, stamp: &str) -> String {
        format!("powerbi_{}_{}.csv", self.as_str(), stamp)
    }
}

impl fmt::Display for PowerBiTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerBiTable {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "projects" => Ok(PowerBiTable::Projects),
            "milestones" => Ok(PowerBiTable::Milestones),
            "risks" => Ok(PowerBiTable::Risks),
            other => Err(format!("unknown Power BI table: {other}")),
        }
    }
}

/// Rendered tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowerBiTables {
    /// Projects table
    pub projects: String,
    /// Milestones table
    pub milestones: String,
    /// Risks table
    pub risks: String,
    /// Data rows per table, in [`PowerBiTable::ALL`] order
    pub row_counts: [usize; 3],
}

impl PowerBiTables {
    /// CSV text of one table.
    pub fn get(&self, table: PowerBiTable) -> &str {
        match table {
            PowerBiTable::Projects => &self.projects,
            PowerBiTable::Milestones => &self.milestones,
            PowerBiTable::Risks => &self.risks,
        }
    }

    /// Data rows in one table.
    pub fn rows(&self, table: PowerBiTable) -> usize {
        match table {
            PowerBiTable::Projects => self.row_counts[0],
            PowerBiTable::Milestones => self.row_counts[1],
            PowerBiTable::Risks => self.row_counts[2],
        }
    }

    /// Write each table to `dir` as `powerbi_{table}_{stamp}.csv`.
    pub fn write_to_dir(&self, dir: &Path, stamp: &str) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut paths = Vec::with_capacity(PowerBiTable::ALL.len());
        for table in PowerBiTable::ALL {
            let path = dir.join(table.file_name(stamp));
            std::fs::write(&path, self.get(table))?;
            tracing::info!(table = %table, rows = self.rows(table), path = %path.display(), "Wrote Power BI table");
            paths.push(path);
        }
        Ok(paths)
    }
}

/// Power BI CSV exporter
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerBiExporter;

impl PowerBiExporter {
    /// Create a new exporter
    pub fn new() -> Self {
        Self
    }

    /// Render all three tables at `now`.
    pub fn export(&self, bundles: &[ProjectBundle], now: NaiveDateTime) -> Result<PowerBiTables> {
        let (projects, project_rows) = self.projects(bundles, now)?;
        let (milestones, milestone_rows) = self.milestones(bundles, now)?;
        let (risks, risk_rows) = self.risks(bundles)?;
        Ok(PowerBiTables {
            projects,
            milestones,
            risks,
            row_counts: [project_rows, milestone_rows, risk_rows],
        })
    }

    fn projects(&self, bundles: &[ProjectBundle], now: NaiveDateTime) -> Result<(String, usize)> {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_record(PROJECT_HEADERS)?;

        for bundle in bundles {
            let p = &bundle.project;
            wtr.write_record([
                p.id.to_string(),
                p.name.clone(),
                p.owner.clone(),
                p.description.clone().unwrap_or_default(),
                p.status.label().to_string(),
                format_day(p.start_date),
                format_day(p.deadline),
                format_number(p.completion_percentage),
                p.days_remaining(now).to_string(),
                yes_no(p.is_overdue(now)).to_string(),
                yes_no(p.is_on_track(now)).to_string(),
                format_timestamp(p.created_at),
                format_timestamp(p.updated_at),
            ])?;
        }

        Ok((finish(wtr)?, bundles.len()))
    }

    fn milestones(&self, bundles: &[ProjectBundle], now: NaiveDateTime) -> Result<(String, usize)> {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_record(MILESTONE_HEADERS)?;

        let mut rows = 0;
        for bundle in bundles {
            for m in &bundle.milestones {
                wtr.write_record([
                    m.id.to_string(),
                    m.project_id.to_string(),
                    bundle.project.name.clone(),
                    m.name.clone(),
                    m.description.clone().unwrap_or_default(),
                    format_day(m.target_date),
                    m.completion_date.map(format_day).unwrap_or_default(),
                    m.status.label().to_string(),
                    yes_no(m.is_overdue(now)).to_string(),
                    yes_no(m.is_completed()).to_string(),
                    m.days_until_target(now).to_string(),
                    m.days_past_target(now).to_string(),
                    format_timestamp(m.created_at),
                    format_timestamp(m.updated_at),
                ])?;
                rows += 1;
            }
        }

        Ok((finish(wtr)?, rows))
    }

    fn risks(&self, bundles: &[ProjectBundle]) -> Result<(String, usize)> {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_record(RISK_HEADERS)?;

        let mut rows = 0;
        for bundle in bundles {
            for r in &bundle.risks {
                wtr.write_record([
                    r.id.to_string(),
                    r.project_id.to_string(),
                    bundle.project.name.clone(),
                    r.name.clone(),
                    r.description.clone().unwrap_or_default(),
                    r.severity.label().to_string(),
                    r.severity.level().to_string(),
                    r.mitigation_plan.clone().unwrap_or_default(),
                    r.status.clone(),
                    yes_no(r.severity == RiskSeverity::High).to_string(),
                    // Exact match; "open" or "Mitigated" are not counted.
                    yes_no(r.status == "Open").to_string(),
                    format_timestamp(r.created_at),
                    format_timestamp(r.updated_at),
                ])?;
                rows += 1;
            }
        }

        Ok((finish(wtr)?, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert_eq!(PowerBiTable::Milestones.file_name("20250101_120000"), "powerbi_milestones_20250101_120000.csv");
        assert_eq!("RISKS".parse::<PowerBiTable>(), Ok(PowerBiTable::Risks));
        assert!("charts".parse::<PowerBiTable>().is_err());
    }

    #[test]
    fn test_empty_export_has_headers_only() {
        let now = chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let tables = PowerBiExporter::new().export(&[], now).unwrap();
        for table in PowerBiTable::ALL {
            assert_eq!(tables.get(table).lines().count(), 1);
            assert_eq!(tables.rows(table), 0);
        }
        assert!(tables.risks.starts_with("Risk ID,Project ID,Project Name"));
    }
}
