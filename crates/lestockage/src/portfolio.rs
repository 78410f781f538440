// Loading projects together with their milestones and risks

use crate::error::{Result, StorageError};
use crate::milestones::fetch_milestones;
use crate::projects::{fetch_project, fetch_projects};
use crate::risks::fetch_risks;
use crate::schema::Storage;
use lemodele::{Milestone, ProjectBundle, Risk};
use std::collections::HashMap;

/// Read-only access to whole project bundles.
pub struct Portfolio;

impl Portfolio {
    /// Every project with its children, in project id order
    pub fn load(storage: &Storage) -> Result<Vec<ProjectBundle>> {
        let conn = storage.conn();
        let projects = fetch_projects(conn)?;

        let mut milestones: HashMap<i64, Vec<Milestone>> = HashMap::new();
        for milestone in fetch_milestones(conn, None)? {
            milestones.entry(milestone.project_id).or_default().push(milestone);
        }
        let mut risks: HashMap<i64, Vec<Risk>> = HashMap::new();
        for risk in fetch_risks(conn, None)? {
            risks.entry(risk.project_id).or_default().push(risk);
        }

        Ok(projects
            .into_iter()
            .map(|project| ProjectBundle {
                milestones: milestones.remove(&project.id).unwrap_or_default(),
                risks: risks.remove(&project.id).unwrap_or_default(),
                project,
            })
            .collect())
    }

    /// One project with its children
    pub fn load_project(storage: &Storage, id: i64) -> Result<ProjectBundle> {
        let conn = storage.conn();
        let project = fetch_project(conn, id)?.ok_or_else(|| StorageError::not_found("Project", id))?;
        Ok(ProjectBundle {
            milestones: fetch_milestones(conn, Some(id))?,
            risks: fetch_risks(conn, Some(id))?,
            project,
        })
    }
}
