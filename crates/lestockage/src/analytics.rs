// Portfolio analytics over the stored rows

use crate::error::Result;
use crate::milestones::fetch_milestones;
use crate::projects::fetch_projects;
use crate::risks::fetch_risks;
use crate::schema::Storage;
use chrono::NaiveDateTime;
use lemodele::{KpiSnapshot, PortfolioStats, ProjectStatus, RiskSeverity};
use rusqlite::Result as SqliteResult;
use serde::{Deserialize, Serialize};

/// Analytics for portfolio metrics
pub struct Analytics<'a> {
    storage: &'a Storage,
}

impl<'a> Analytics<'a> {
    /// Create a new analytics instance
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Dashboard KPIs at `now`
    pub fn kpis(&self, now: NaiveDateTime) -> Result<KpiSnapshot> {
        let conn = self.storage.conn();
        let projects = fetch_projects(conn)?;
        let milestones = fetch_milestones(conn, None)?;
        let risks = fetch_risks(conn, None)?;
        Ok(KpiSnapshot::compute(&projects, &milestones, &risks, now))
    }

    /// Headline numbers for the text report
    pub fn portfolio_stats(&self) -> Result<PortfolioStats> {
        let conn = self.storage.conn();
        let projects = fetch_projects(conn)?;
        let risks = fetch_risks(conn, None)?;
        Ok(PortfolioStats::compute(&projects, &risks))
    }

    /// Project count per status
    pub fn count_projects_by_status(&self) -> Result<Vec<StatusCount>> {
        let mut stmt = self.storage.conn().prepare(
            "SELECT status, COUNT(*) as count FROM projects GROUP BY status ORDER BY count DESC, status",
        )?;

        let counts = stmt
            .query_map([], |row| {
                let key: String = row.get(0)?;
                Ok(StatusCount {
                    status: ProjectStatus::parse(&key)
                        .map(|s| s.label().to_string())
                        .unwrap_or(key),
                    count: row.get(1)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(counts)
    }

    /// Risk count per severity, highest severity first
    pub fn count_risks_by_severity(&self) -> Result<Vec<SeverityCount>> {
        let mut stmt = self
            .storage
            .conn()
            .prepare("SELECT severity, COUNT(*) as count FROM risks GROUP BY severity")?;

        let mut counts = stmt
            .query_map([], |row| {
                let key: String = row.get(0)?;
                Ok(SeverityCount {
                    severity: RiskSeverity::parse(&key).ok(),
                    label: key,
                    count: row.get(1)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        counts.sort_by(|a, b| b.severity.cmp(&a.severity));
        for count in &mut counts {
            if let Some(severity) = count.severity {
                count.label = severity.label().to_string();
            }
        }
        Ok(counts)
    }

    /// Average completion per owner, lowest first
    pub fn completion_by_owner(&self) -> Result<Vec<OwnerCompletion>> {
        let mut stmt = self.storage.conn().prepare(
            "SELECT owner, AVG(completion_percentage) as avg_completion, COUNT(*) as projects
             FROM projects
             GROUP BY owner
             ORDER BY avg_completion, owner",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(OwnerCompletion {
                    owner: row.get(0)?,
                    avg_completion: row.get(1)?,
                    projects: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }
}

/// Project status count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    /// Status label
    pub status: String,
    /// Number of projects with this status
    pub count: i64,
}

/// Risk severity count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityCount {
    /// Parsed severity, `None` for unrecognized keys
    pub severity: Option<RiskSeverity>,
    /// Severity label
    pub label: String,
    /// Number of risks with this severity
    pub count: i64,
}

/// Average completion for one owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerCompletion {
    /// Project owner
    pub owner: String,
    /// Mean completion percentage of their projects
    pub avg_completion: f64,
    /// Number of projects they own
    pub projects: i64,
}
