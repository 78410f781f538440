// Milestone persistence operations
//
// Every write recalculates the owning project's completion inside the same
// transaction.

use crate::error::{Result, StorageError};
use crate::projects::{project_exists, recalculate, validate_text};
use crate::schema::{decode_opt_ts, decode_ts, encode_ts, Storage};
use chrono::NaiveDateTime;
use lemodele::dates::utc_now;
use lemodele::{Milestone, MilestoneStatus};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

const SELECT_MILESTONE: &str = "SELECT id, project_id, name, description, target_date, completion_date, status, created_at, updated_at FROM milestones";

/// Fields required to create a milestone
#[derive(Debug, Clone, PartialEq)]
pub struct NewMilestone {
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
    /// Initial status
    pub status: MilestoneStatus,
}

impl NewMilestone {
    /// Pending milestone without a description.
    pub fn new(project_id: i64, name: impl Into<String>, target_date: NaiveDateTime) -> Self {
        Self {
            project_id,
            name: name.into(),
            description: None,
            target_date,
            completion_date: None,
            status: MilestoneStatus::default(),
        }
    }
}

/// Partial update of a milestone; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilestonePatch {
    /// New name
    pub name: Option<String>,
    /// New description; `Some(None)` clears it
    pub description: Option<Option<String>>,
    /// New target date
    pub target_date: Option<NaiveDateTime>,
    /// New completion date; `Some(None)` clears it
    pub completion_date: Option<Option<NaiveDateTime>>,
    /// New status
    pub status: Option<MilestoneStatus>,
}

impl MilestonePatch {
    fn apply(&self, milestone: &mut Milestone) -> Result<()> {
        if let Some(name) = &self.name {
            validate_text("name", name)?;
            milestone.name = name.clone();
        }
        if let Some(description) = &self.description {
            milestone.description = description.clone();
        }
        if let Some(target_date) = self.target_date {
            milestone.target_date = target_date;
        }
        if let Some(completion_date) = self.completion_date {
            milestone.completion_date = completion_date;
        }
        if let Some(status) = self.status {
            milestone.status = status;
        }
        Ok(())
    }
}

struct MilestoneRow {
    id: i64,
    project_id: i64,
    name: String,
    description: Option<String>,
    target_date: String,
    completion_date: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

impl MilestoneRow {
    fn read(row: &Row<'_>) -> SqliteResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            target_date: row.get(4)?,
            completion_date: row.get(5)?,
            status: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn decode(self) -> Result<Milestone> {
        let id = self.id;
        let status = MilestoneStatus::parse(&self.status)
            .map_err(|e| StorageError::corrupt("milestones", id, e.to_string()))?;
        Ok(Milestone {
            id,
            project_id: self.project_id,
            name: self.name,
            description: self.description,
            target_date: decode_ts("milestones", id, "target_date", &self.target_date)?,
            completion_date: decode_opt_ts("milestones", id, "completion_date", self.completion_date)?,
            status,
            created_at: decode_ts("milestones", id, "created_at", &self.created_at)?,
            updated_at: decode_ts("milestones", id, "updated_at", &self.updated_at)?,
        })
    }
}

fn fetch_milestone(conn: &Connection, id: i64) -> Result<Option<Milestone>> {
    let sql = format!("{SELECT_MILESTONE} WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id], MilestoneRow::read)
        .optional()?;
    row.map(MilestoneRow::decode).transpose()
}

pub(crate) fn fetch_milestones(conn: &Connection, project_id: Option<i64>) -> Result<Vec<Milestone>> {
    let rows = match project_id {
        Some(project_id) => {
            let sql = format!("{SELECT_MILESTONE} WHERE project_id = ?1 ORDER BY id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![project_id], MilestoneRow::read)?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows
        }
        None => {
            let sql = format!("{SELECT_MILESTONE} ORDER BY id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], MilestoneRow::read)?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows
        }
    };
    rows.into_iter().map(MilestoneRow::decode).collect()
}

/// Milestone store for CRUD operations
pub struct MilestoneStore<'a> {
    storage: &'a mut Storage,
}

impl<'a> MilestoneStore<'a> {
    /// Create a new milestone store
    pub fn new(storage: &'a mut Storage) -> Self {
        Self { storage }
    }

    /// Insert a milestone and return the stored row
    pub fn insert(&mut self, new: &NewMilestone) -> Result<Milestone> {
        validate_text("name", &new.name)?;
        let tx = self.storage.conn_mut().transaction()?;
        if !project_exists(&tx, new.project_id)? {
            return Err(StorageError::not_found("Project", new.project_id));
        }

        let now = encode_ts(utc_now());
        tx.execute(
            "INSERT INTO milestones (project_id, name, description, target_date, completion_date, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.project_id,
                new.name,
                new.description,
                encode_ts(new.target_date),
                new.completion_date.map(encode_ts),
                new.status.as_str(),
                now,
                now,
            ],
        )?;
        let id = tx.last_insert_rowid();
        recalculate(&tx, new.project_id)?;
        tx.commit()?;

        tracing::info!(milestone_id = id, project_id = new.project_id, "Created milestone");
        self.require(id)
    }

    /// Get milestone by ID
    pub fn get(&self, id: i64) -> Result<Option<Milestone>> {
        fetch_milestone(self.storage.conn(), id)
    }

    /// Get milestone by ID, failing with `NotFound`
    pub fn require(&self, id: i64) -> Result<Milestone> {
        self.get(id)?.ok_or_else(|| StorageError::not_found("Milestone", id))
    }

    /// Milestones in id order, optionally for one project
    pub fn list(&self, project_id: Option<i64>) -> Result<Vec<Milestone>> {
        fetch_milestones(self.storage.conn(), project_id)
    }

    /// Apply a patch and return the updated row
    pub fn update(&mut self, id: i64, patch: &MilestonePatch) -> Result<Milestone> {
        let mut milestone = self.require(id)?;
        patch.apply(&mut milestone)?;
        milestone.updated_at = utc_now();

        let tx = self.storage.conn_mut().transaction()?;
        tx.execute(
            "UPDATE milestones SET name = ?1, description = ?2, target_date = ?3, completion_date = ?4, status = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                milestone.name,
                milestone.description,
                encode_ts(milestone.target_date),
                milestone.completion_date.map(encode_ts),
                milestone.status.as_str(),
                encode_ts(milestone.updated_at),
                id,
            ],
        )?;
        recalculate(&tx, milestone.project_id)?;
        tx.commit()?;

        tracing::debug!(milestone_id = id, "Updated milestone");
        self.require(id)
    }

    /// Delete a milestone
    pub fn delete(&mut self, id: i64) -> Result<()> {
        let milestone = self.require(id)?;
        let tx = self.storage.conn_mut().transaction()?;
        tx.execute("DELETE FROM milestones WHERE id = ?1", params![id])?;
        recalculate(&tx, milestone.project_id)?;
        tx.commit()?;

        tracing::info!(milestone_id = id, project_id = milestone.project_id, "Deleted milestone");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projects::{NewProject, ProjectStore};
    use chrono::{Duration, NaiveDate};

    fn day(offset: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(offset)
    }

    fn storage_with_project() -> (Storage, i64) {
        let mut storage = Storage::open_in_memory().unwrap();
        let mut new = NewProject::new("Data Lake", "Tomasz Nowak", day(0), day(60));
        new.completion_percentage = 10.0;
        let id = ProjectStore::new(&mut storage).insert(&new).unwrap().id;
        (storage, id)
    }

    fn completion(storage: &mut Storage, project_id: i64) -> f64 {
        ProjectStore::new(storage).require(project_id).unwrap().completion_percentage
    }

    #[test]
    fn test_insert_recalculates_completion() {
        let (mut storage, project_id) = storage_with_project();
        let mut store = MilestoneStore::new(&mut storage);

        let mut done = NewMilestone::new(project_id, "Ingest", day(10));
        done.status = MilestoneStatus::Completed;
        done.completion_date = Some(day(9));
        store.insert(&done).unwrap();
        store.insert(&NewMilestone::new(project_id, "Catalog", day(30))).unwrap();

        assert_eq!(completion(&mut storage, project_id), 50.0);
    }

    #[test]
    fn test_update_and_delete_recalculate() {
        let (mut storage, project_id) = storage_with_project();
        let mut store = MilestoneStore::new(&mut storage);
        let first = store.insert(&NewMilestone::new(project_id, "Ingest", day(10))).unwrap();
        let second = store.insert(&NewMilestone::new(project_id, "Catalog", day(30))).unwrap();

        let patch = MilestonePatch {
            status: Some(MilestoneStatus::Completed),
            completion_date: Some(Some(day(12))),
            ..Default::default()
        };
        let updated = store.update(first.id, &patch).unwrap();
        assert_eq!(updated.status, MilestoneStatus::Completed);
        assert_eq!(updated.completion_date, Some(day(12)));

        store.delete(second.id).unwrap();
        assert!(store.get(second.id).unwrap().is_none());
        assert_eq!(completion(&mut storage, project_id), 100.0);
    }

    #[test]
    fn test_clearing_completion_date() {
        let (mut storage, project_id) = storage_with_project();
        let mut store = MilestoneStore::new(&mut storage);
        let mut new = NewMilestone::new(project_id, "Ingest", day(10));
        new.completion_date = Some(day(8));
        let created = store.insert(&new).unwrap();

        let patch = MilestonePatch {
            completion_date: Some(None),
            ..Default::default()
        };
        assert_eq!(store.update(created.id, &patch).unwrap().completion_date, None);

        let untouched = store.update(created.id, &MilestonePatch::default()).unwrap();
        assert_eq!(untouched.name, "Ingest");
    }

    #[test]
    fn test_missing_project_is_not_found() {
        let mut storage = Storage::open_in_memory().unwrap();
        let mut store = MilestoneStore::new(&mut storage);
        let err = store.insert(&NewMilestone::new(9, "Orphan", day(1))).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "Project", id: 9 }));
    }

    #[test]
    fn test_list_filters_by_project() {
        let (mut storage, first) = storage_with_project();
        let second = ProjectStore::new(&mut storage)
            .insert(&NewProject::new("Other", "Someone", day(0), day(5)))
            .unwrap()
            .id;

        let mut store = MilestoneStore::new(&mut storage);
        store.insert(&NewMilestone::new(first, "A", day(1))).unwrap();
        store.insert(&NewMilestone::new(second, "B", day(2))).unwrap();
        store.insert(&NewMilestone::new(first, "C", day(3))).unwrap();

        assert_eq!(store.list(None).unwrap().len(), 3);
        let names: Vec<String> = store.list(Some(first)).unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_project_delete_cascades() {
        let (mut storage, project_id) = storage_with_project();
        MilestoneStore::new(&mut storage)
            .insert(&NewMilestone::new(project_id, "A", day(1)))
            .unwrap();
        ProjectStore::new(&mut storage).delete(project_id).unwrap();
        assert!(MilestoneStore::new(&mut storage).list(None).unwrap().is_empty());
    }
}
