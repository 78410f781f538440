// One-sheet project report
//
// Each project spans max(milestones, risks, 1) rows. Project columns are
// filled on the first row only; milestone and risk columns pair up by index.

use crate::{finish, format_number, Result};
use csv::Writer;
use lemodele::dates::format_day;
use lemodele::ProjectBundle;

const HEADERS: [&str; 11] = [
    "Project Name",
    "Owner",
    "Status",
    "Start Date",
    "Deadline",
    "Completion %",
    "Milestone Name",
    "Milestone Status",
    "Risk Name",
    "Risk Severity",
    "Risk Status",
];

/// Flat CSV of projects with their milestones and risks side by side.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatCsvExporter;

impl FlatCsvExporter {
    /// Create a new exporter
    pub fn new() -> Self {
        Self
    }

    /// Render every bundle in order.
    pub fn export(&self, bundles: &[ProjectBundle]) -> Result<String> {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_record(HEADERS)?;

        for bundle in bundles {
            let project = &bundle.project;
            let rows = bundle.milestones.len().max(bundle.risks.len()).max(1);

            for i in 0..rows {
                let mut row: Vec<String> = if i == 0 {
                    vec![
                        project.name.clone(),
                        project.owner.clone(),
                        project.status.label().to_string(),
                        format_day(project.start_date),
                        format_day(project.deadline),
                        format_number(project.completion_percentage),
                    ]
                } else {
                    vec![String::new(); 6]
                };

                match bundle.milestones.get(i) {
                    Some(m) => row.extend([m.name.clone(), m.status.label().to_string()]),
                    None => row.extend([String::new(), String::new()]),
                }
                match bundle.risks.get(i) {
                    Some(r) => row.extend([r.name.clone(), r.severity.label().to_string(), r.status.clone()]),
                    None => row.extend([String::new(), String::new(), String::new()]),
                }

                wtr.write_record(&row)?;
            }
        }

        let out = finish(wtr)?;
        tracing::debug!(projects = bundles.len(), bytes = out.len(), "Rendered flat CSV export");
        Ok(out)
    }
}
