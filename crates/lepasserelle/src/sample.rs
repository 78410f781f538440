// Sample portfolio generator
//
// Five projects spread around `now`, each with one milestone template laid
// out evenly between start and deadline and one to three template risks.

use chrono::{Duration, NaiveDateTime};
use lemodele::dates::whole_days;
use lemodele::{MilestoneStatus, ProjectStatus, RiskSeverity};
use lestockage::{
    MilestoneStore, NewMilestone, NewProject, NewRisk, ProjectPatch, ProjectStore, RiskStore,
    Storage,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::fmt;

struct ProjectTemplate {
    name: &'static str,
    owner: &'static str,
    description: &'static str,
    status: ProjectStatus,
    start_offset_days: i64,
    deadline_offset_days: i64,
    completion: f64,
}

const PROJECTS: [ProjectTemplate; 5] = [
    ProjectTemplate {
        name: "Cloud Migration Initiative",
        owner: "Sarah Johnson",
        description: "Migrate legacy systems to cloud infrastructure",
        status: ProjectStatus::InProgress,
        start_offset_days: -60,
        deadline_offset_days: 30,
        completion: 65.0,
    },
    ProjectTemplate {
        name: "Mobile App Development",
        owner: "Michael Chen",
        description: "Build iOS and Android mobile applications",
        status: ProjectStatus::InProgress,
        start_offset_days: -45,
        deadline_offset_days: 15,
        completion: 80.0,
    },
    ProjectTemplate {
        name: "Data Analytics Platform",
        owner: "Emily Rodriguez",
        description: "Develop analytics dashboard for business intelligence",
        status: ProjectStatus::InProgress,
        start_offset_days: -30,
        deadline_offset_days: 60,
        completion: 40.0,
    },
    ProjectTemplate {
        name: "Security Audit & Compliance",
        owner: "David Kim",
        description: "Conduct security audit and ensure compliance",
        status: ProjectStatus::OnHold,
        start_offset_days: -90,
        deadline_offset_days: -10,
        completion: 30.0,
    },
    ProjectTemplate {
        name: "API Gateway Implementation",
        owner: "Lisa Wang",
        description: "Implement centralized API gateway for microservices",
        status: ProjectStatus::Completed,
        start_offset_days: -120,
        deadline_offset_days: -20,
        completion: 100.0,
    },
];

const MILESTONE_TEMPLATES: [&[&str]; 3] = [
    &[
        "Planning & Design",
        "Development Phase",
        "Testing & QA",
        "Deployment",
        "Documentation",
    ],
    &[
        "Requirements Gathering",
        "Architecture Design",
        "Implementation",
        "Integration",
        "Go-Live",
    ],
    &["Discovery", "Prototype", "Beta Release", "Production Release"],
];

struct RiskTemplate {
    name: &'static str,
    description: &'static str,
    severity: RiskSeverity,
}

const RISKS: [RiskTemplate; 5] = [
    RiskTemplate {
        name: "Resource Availability",
        description: "Key team members may not be available",
        severity: RiskSeverity::Medium,
    },
    RiskTemplate {
        name: "Technology Dependencies",
        description: "Third-party services may have delays",
        severity: RiskSeverity::High,
    },
    RiskTemplate {
        name: "Scope Creep",
        description: "Project requirements may expand",
        severity: RiskSeverity::Medium,
    },
    RiskTemplate {
        name: "Budget Constraints",
        description: "Project may exceed allocated budget",
        severity: RiskSeverity::Low,
    },
    RiskTemplate {
        name: "Integration Challenges",
        description: "Complex integration with existing systems",
        severity: RiskSeverity::High,
    },
];

/// Rows created by [`seed_sample_data`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Projects inserted
    pub projects: usize,
    /// Milestones inserted
    pub milestones: usize,
    /// Risks inserted
    pub risks: usize,
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} projects, {} milestones, {} risks",
            self.projects, self.milestones, self.risks
        )
    }
}

/// Status of milestone `index` out of `count` for a project.
fn milestone_status(
    target: NaiveDateTime,
    now: NaiveDateTime,
    project_status: ProjectStatus,
    completion: f64,
    index: usize,
    count: usize,
) -> (MilestoneStatus, Option<NaiveDateTime>) {
    let within_completed_share = (index as f64) < count as f64 * completion / 100.0;
    if target < now {
        if project_status == ProjectStatus::Completed || within_completed_share {
            (MilestoneStatus::Completed, Some(target))
        } else {
            (MilestoneStatus::Delayed, None)
        }
    } else if within_completed_share {
        (MilestoneStatus::InProgress, None)
    } else {
        (MilestoneStatus::Pending, None)
    }
}

/// Insert the sample portfolio relative to `now`.
///
/// Milestone inserts recompute project completion, so each project's
/// template percentage is written back once its milestones exist.
pub fn seed_sample_data<R: Rng>(
    storage: &mut Storage,
    rng: &mut R,
    now: NaiveDateTime,
) -> lestockage::Result<SeedReport> {
    let mut report = SeedReport::default();

    for template in &PROJECTS {
        let start = now + Duration::days(template.start_offset_days);
        let deadline = now + Duration::days(template.deadline_offset_days);

        let mut new = NewProject::new(template.name, template.owner, start, deadline);
        new.description = Some(template.description.to_string());
        new.status = template.status;
        new.completion_percentage = template.completion;
        let project = ProjectStore::new(storage).insert(&new)?;
        report.projects += 1;

        let names = MILESTONE_TEMPLATES
            .choose(rng)
            .copied()
            .unwrap_or(MILESTONE_TEMPLATES[0]);
        let count = names.len();
        let duration_days = whole_days(deadline - start) as f64;

        for (index, name) in names.iter().enumerate() {
            let offset = duration_days * (index + 1) as f64 / (count + 1) as f64;
            let target = start + Duration::seconds((offset * 86_400.0) as i64);
            let (status, completion_date) =
                milestone_status(target, now, template.status, template.completion, index, count);

            let mut milestone = NewMilestone::new(project.id, *name, target);
            milestone.description = Some(format!("Complete {} phase", name.to_lowercase()));
            milestone.status = status;
            milestone.completion_date = completion_date;
            MilestoneStore::new(storage).insert(&milestone)?;
            report.milestones += 1;
        }

        ProjectStore::new(storage).update(
            project.id,
            &ProjectPatch {
                completion_percentage: Some(template.completion),
                ..Default::default()
            },
        )?;

        let risk_count = rng.gen_range(1..=3);
        for template in RISKS.choose_multiple(rng, risk_count) {
            let mut risk = NewRisk::new(project.id, template.name, template.severity);
            risk.description = Some(template.description.to_string());
            risk.mitigation_plan = Some(format!(
                "Develop mitigation strategy for {}",
                template.name.to_lowercase()
            ));
            risk.status = Some(if rng.gen::<f64>() > 0.3 { "Open" } else { "Mitigated" }.to_string());
            RiskStore::new(storage).insert(&risk)?;
            report.risks += 1;
        }

        tracing::debug!(project_id = project.id, name = template.name, "Seeded sample project");
    }

    tracing::info!(%report, "Sample data created");
    Ok(report)
}
