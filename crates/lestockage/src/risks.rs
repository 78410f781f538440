// Risk persistence operations

use crate::error::{Result, StorageError};
use crate::projects::{project_exists, validate_text};
use crate::schema::{decode_ts, encode_ts, Storage};
use lemodele::dates::utc_now;
use lemodele::{Risk, RiskSeverity, DEFAULT_RISK_STATUS};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

const SELECT_RISK: &str = "SELECT id, project_id, name, description, severity, mitigation_plan, status, created_at, updated_at FROM risks";

/// Fields required to create a risk
#[derive(Debug, Clone, PartialEq)]
pub struct NewRisk {
    /// Owning project
    pub project_id: i64,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Impact
    pub severity: RiskSeverity,
    /// Planned response
    pub mitigation_plan: Option<String>,
    /// Free text status; "Open" when absent
    pub status: Option<String>,
}

impl NewRisk {
    /// Open risk without description or plan.
    pub fn new(project_id: i64, name: impl Into<String>, severity: RiskSeverity) -> Self {
        Self {
            project_id,
            name: name.into(),
            description: None,
            severity,
            mitigation_plan: None,
            status: None,
        }
    }
}

/// Partial update of a risk; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskPatch {
    /// New name
    pub name: Option<String>,
    /// New description; `Some(None)` clears it
    pub description: Option<Option<String>>,
    /// New severity
    pub severity: Option<RiskSeverity>,
    /// New mitigation plan; `Some(None)` clears it
    pub mitigation_plan: Option<Option<String>>,
    /// New status text
    pub status: Option<String>,
}

impl RiskPatch {
    fn apply(&self, risk: &mut Risk) -> Result<()> {
        if let Some(name) = &self.name {
            validate_text("name", name)?;
            risk.name = name.clone();
        }
        if let Some(description) = &self.description {
            risk.description = description.clone();
        }
        if let Some(severity) = self.severity {
            risk.severity = severity;
        }
        if let Some(plan) = &self.mitigation_plan {
            risk.mitigation_plan = plan.clone();
        }
        if let Some(status) = &self.status {
            risk.status = status.clone();
        }
        Ok(())
    }
}

struct RiskRow {
    id: i64,
    project_id: i64,
    name: String,
    description: Option<String>,
    severity: String,
    mitigation_plan: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

impl RiskRow {
    fn read(row: &Row<'_>) -> SqliteResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            severity: row.get(4)?,
            mitigation_plan: row.get(5)?,
            status: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn decode(self) -> Result<Risk> {
        let id = self.id;
        let severity = RiskSeverity::parse(&self.severity)
            .map_err(|e| StorageError::corrupt("risks", id, e.to_string()))?;
        Ok(Risk {
            id,
            project_id: self.project_id,
            name: self.name,
            description: self.description,
            severity,
            mitigation_plan: self.mitigation_plan,
            status: self.status,
            created_at: decode_ts("risks", id, "created_at", &self.created_at)?,
            updated_at: decode_ts("risks", id, "updated_at", &self.updated_at)?,
        })
    }
}

fn fetch_risk(conn: &Connection, id: i64) -> Result<Option<Risk>> {
    let sql = format!("{SELECT_RISK} WHERE id = ?1");
    let row = conn.query_row(&sql, params![id], RiskRow::read).optional()?;
    row.map(RiskRow::decode).transpose()
}

pub(crate) fn fetch_risks(conn: &Connection, project_id: Option<i64>) -> Result<Vec<Risk>> {
    let rows = match project_id {
        Some(project_id) => {
            let sql = format!("{SELECT_RISK} WHERE project_id = ?1 ORDER BY id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![project_id], RiskRow::read)?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows
        }
        None => {
            let sql = format!("{SELECT_RISK} ORDER BY id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], RiskRow::read)?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows
        }
    };
    rows.into_iter().map(RiskRow::decode).collect()
}

/// Risk store for CRUD operations
pub struct RiskStore<'a> {
    storage: &'a mut Storage,
}

impl<'a> RiskStore<'a> {
    /// Create a new risk store
    pub fn new(storage: &'a mut Storage) -> Self {
        Self { storage }
    }

    /// Insert a risk and return the stored row
    pub fn insert(&mut self, new: &NewRisk) -> Result<Risk> {
        validate_text("name", &new.name)?;
        let conn = self.storage.conn();
        if !project_exists(conn, new.project_id)? {
            return Err(StorageError::not_found("Project", new.project_id));
        }

        let now = encode_ts(utc_now());
        let status = new.status.as_deref().unwrap_or(DEFAULT_RISK_STATUS);
        conn.execute(
            "INSERT INTO risks (project_id, name, description, severity, mitigation_plan, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.project_id,
                new.name,
                new.description,
                new.severity.as_str(),
                new.mitigation_plan,
                status,
                now,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::info!(risk_id = id, project_id = new.project_id, severity = %new.severity, "Logged risk");
        self.require(id)
    }

    /// Get risk by ID
    pub fn get(&self, id: i64) -> Result<Option<Risk>> {
        fetch_risk(self.storage.conn(), id)
    }

    /// Get risk by ID, failing with `NotFound`
    pub fn require(&self, id: i64) -> Result<Risk> {
        self.get(id)?.ok_or_else(|| StorageError::not_found("Risk", id))
    }

    /// Risks in id order, optionally for one project
    pub fn list(&self, project_id: Option<i64>) -> Result<Vec<Risk>> {
        fetch_risks(self.storage.conn(), project_id)
    }

    /// Apply a patch and return the updated row
    pub fn update(&mut self, id: i64, patch: &RiskPatch) -> Result<Risk> {
        let mut risk = self.require(id)?;
        patch.apply(&mut risk)?;
        risk.updated_at = utc_now();

        self.storage.conn().execute(
            "UPDATE risks SET name = ?1, description = ?2, severity = ?3, mitigation_plan = ?4, status = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                risk.name,
                risk.description,
                risk.severity.as_str(),
                risk.mitigation_plan,
                risk.status,
                encode_ts(risk.updated_at),
                id,
            ],
        )?;

        tracing::debug!(risk_id = id, "Updated risk");
        self.require(id)
    }

    /// Delete a risk
    pub fn delete(&mut self, id: i64) -> Result<()> {
        let deleted = self
            .storage
            .conn()
            .execute("DELETE FROM risks WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StorageError::not_found("Risk", id));
        }
        tracing::info!(risk_id = id, "Deleted risk");
        Ok(())
    }
}
