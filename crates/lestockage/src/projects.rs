// Project persistence operations

use crate::error::{Result, StorageError};
use crate::schema::{decode_ts, encode_ts, Storage};
use chrono::NaiveDateTime;
use lemodele::dates::utc_now;
use lemodele::{completion_from_milestones, MilestoneStatus, Project, ProjectStatus};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

const SELECT_PROJECT: &str = "SELECT id, name, owner, description, status, start_date, deadline, completion_percentage, created_at, updated_at FROM projects";

/// Fields required to create a project
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    /// Display name
    pub name: String,
    /// Accountable person
    pub owner: String,
    /// Free-form description
    pub description: Option<String>,
    /// Initial status
    pub status: ProjectStatus,
    /// Planned start
    pub start_date: NaiveDateTime,
    /// Planned finish
    pub deadline: NaiveDateTime,
    /// Initial completion (0-100)
    pub completion_percentage: f64,
}

impl NewProject {
    /// Not started, 0% complete.
    pub fn new(
        name: impl Into<String>,
        owner: impl Into<String>,
        start_date: NaiveDateTime,
        deadline: NaiveDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            description: None,
            status: ProjectStatus::default(),
            start_date,
            deadline,
            completion_percentage: 0.0,
        }
    }

    /// Reject empty names or owners and out of range completion.
    pub fn validate(&self) -> Result<()> {
        validate_text("name", &self.name)?;
        validate_text("owner", &self.owner)?;
        validate_completion(self.completion_percentage)
    }
}

/// Partial update of a project; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    /// New name
    pub name: Option<String>,
    /// New owner
    pub owner: Option<String>,
    /// New description; `Some(None)` clears it
    pub description: Option<Option<String>>,
    /// New status
    pub status: Option<ProjectStatus>,
    /// New start date
    pub start_date: Option<NaiveDateTime>,
    /// New deadline
    pub deadline: Option<NaiveDateTime>,
    /// New completion percentage
    pub completion_percentage: Option<f64>,
}

impl ProjectPatch {
    fn apply(&self, project: &mut Project) -> Result<()> {
        if let Some(name) = &self.name {
            validate_text("name", name)?;
            project.name = name.clone();
        }
        if let Some(owner) = &self.owner {
            validate_text("owner", owner)?;
            project.owner = owner.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(start_date) = self.start_date {
            project.start_date = start_date;
        }
        if let Some(deadline) = self.deadline {
            project.deadline = deadline;
        }
        if let Some(completion) = self.completion_percentage {
            validate_completion(completion)?;
            project.completion_percentage = completion;
        }
        Ok(())
    }
}

pub(crate) fn validate_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StorageError::InvalidValue(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_completion(value: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&value) {
        return Err(StorageError::InvalidValue(format!(
            "completion_percentage must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Raw column values, decoded after the row callback returns.
struct ProjectRow {
    id: i64,
    name: String,
    owner: String,
    description: Option<String>,
    status: String,
    start_date: String,
    deadline: String,
    completion_percentage: f64,
    created_at: String,
    updated_at: String,
}

impl ProjectRow {
    fn read(row: &Row<'_>) -> SqliteResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            owner: row.get(2)?,
            description: row.get(3)?,
            status: row.get(4)?,
            start_date: row.get(5)?,
            deadline: row.get(6)?,
            completion_percentage: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn decode(self) -> Result<Project> {
        let id = self.id;
        let status = ProjectStatus::parse(&self.status)
            .map_err(|e| StorageError::corrupt("projects", id, e.to_string()))?;
        Ok(Project {
            id,
            name: self.name,
            owner: self.owner,
            description: self.description,
            status,
            start_date: decode_ts("projects", id, "start_date", &self.start_date)?,
            deadline: decode_ts("projects", id, "deadline", &self.deadline)?,
            completion_percentage: self.completion_percentage,
            created_at: decode_ts("projects", id, "created_at", &self.created_at)?,
            updated_at: decode_ts("projects", id, "updated_at", &self.updated_at)?,
        })
    }
}

pub(crate) fn fetch_project(conn: &Connection, id: i64) -> Result<Option<Project>> {
    let sql = format!("{SELECT_PROJECT} WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id], ProjectRow::read)
        .optional()?;
    row.map(ProjectRow::decode).transpose()
}

pub(crate) fn fetch_projects(conn: &Connection) -> Result<Vec<Project>> {
    let sql = format!("{SELECT_PROJECT} ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], ProjectRow::read)?
        .collect::<SqliteResult<Vec<_>>>()?;
    rows.into_iter().map(ProjectRow::decode).collect()
}

pub(crate) fn project_exists(conn: &Connection, id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM projects WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

/// Recompute a project's completion from its milestones.
///
/// Projects without milestones keep their stored percentage.
pub(crate) fn recalculate(conn: &Connection, project_id: i64) -> Result<f64> {
    let current: f64 = conn
        .query_row(
            "SELECT completion_percentage FROM projects WHERE id = ?1",
            params![project_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| StorageError::not_found("Project", project_id))?;

    let mut stmt = conn.prepare("SELECT id, status FROM milestones WHERE project_id = ?1")?;
    let raw = stmt
        .query_map(params![project_id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<SqliteResult<Vec<_>>>()?;

    if raw.is_empty() {
        return Ok(current);
    }

    let statuses = raw
        .into_iter()
        .map(|(id, status)| {
            MilestoneStatus::parse(&status).map_err(|e| StorageError::corrupt("milestones", id, e.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    let completion = completion_from_milestones(&statuses, current);
    conn.execute(
        "UPDATE projects SET completion_percentage = ?1, updated_at = ?2 WHERE id = ?3",
        params![completion, encode_ts(utc_now()), project_id],
    )?;
    tracing::debug!(project_id, completion, "Recalculated project completion");
    Ok(completion)
}

/// Project store for CRUD operations
pub struct ProjectStore<'a> {
    storage: &'a mut Storage,
}

impl<'a> ProjectStore<'a> {
    /// Create a new project store
    pub fn new(storage: &'a mut Storage) -> Self {
        Self { storage }
    }

    /// Insert a project and return the stored row
    pub fn insert(&mut self, new: &NewProject) -> Result<Project> {
        new.validate()?;
        let now = encode_ts(utc_now());
        self.storage.conn().execute(
            "INSERT INTO projects (name, owner, description, status, start_date, deadline, completion_percentage, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                new.name,
                new.owner,
                new.description,
                new.status.as_str(),
                encode_ts(new.start_date),
                encode_ts(new.deadline),
                new.completion_percentage,
                now,
                now,
            ],
        )?;

        let id = self.storage.conn().last_insert_rowid();
        tracing::info!(project_id = id, name = %new.name, "Created project");
        self.require(id)
    }

    /// Get project by ID
    pub fn get(&self, id: i64) -> Result<Option<Project>> {
        fetch_project(self.storage.conn(), id)
    }

    /// Get project by ID, failing with `NotFound`
    pub fn require(&self, id: i64) -> Result<Project> {
        self.get(id)?.ok_or_else(|| StorageError::not_found("Project", id))
    }

    /// All projects in id order
    pub fn list(&self) -> Result<Vec<Project>> {
        fetch_projects(self.storage.conn())
    }

    /// Apply a patch and return the updated row
    pub fn update(&mut self, id: i64, patch: &ProjectPatch) -> Result<Project> {
        let mut project = self.require(id)?;
        patch.apply(&mut project)?;
        project.updated_at = utc_now();

        self.storage.conn().execute(
            "UPDATE projects SET name = ?1, owner = ?2, description = ?3, status = ?4, start_date = ?5, deadline = ?6, completion_percentage = ?7, updated_at = ?8
             WHERE id = ?9",
            params![
                project.name,
                project.owner,
                project.description,
                project.status.as_str(),
                encode_ts(project.start_date),
                encode_ts(project.deadline),
                project.completion_percentage,
                encode_ts(project.updated_at),
                id,
            ],
        )?;

        tracing::debug!(project_id = id, "Updated project");
        self.require(id)
    }

    /// Delete a project together with its milestones and risks
    pub fn delete(&mut self, id: i64) -> Result<()> {
        let deleted = self
            .storage
            .conn()
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StorageError::not_found("Project", id));
        }
        tracing::info!(project_id = id, "Deleted project");
        Ok(())
    }

    /// Recompute completion from milestones and return the stored value
    pub fn recalculate_completion(&mut self, id: i64) -> Result<f64> {
        recalculate(self.storage.conn(), id)
    }
}
