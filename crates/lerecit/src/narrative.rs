// Deterministic status paragraphs
//
// Three paragraphs (overview, milestones, risks) separated by a blank line.
// Unparseable dates are treated as absent.

use crate::views::{non_empty, MilestoneView, ProjectView, RiskView};
use chrono::NaiveDateTime;
use lemodele::dates::{format_day, parse_opt, whole_days};
use lemodele::{MilestoneStatus, ProjectStatus};

/// Milestone paragraph when there are no milestones.
pub const NO_MILESTONES: &str = "No milestones have been defined yet.";

/// Risk paragraph when there are no risks.
pub const NO_RISKS: &str = "No risks have been reported for this project.";

/// Names quoted in the delayed-milestone and active-risk clauses.
pub const NAMED_ITEM_LIMIT: usize = 3;

pub(crate) const UNNAMED_MILESTONE: &str = "Unnamed milestone";
const UNNAMED_RISK: &str = "Unnamed risk";

/// Comma-joined names of the first three delayed milestones.
pub(crate) fn delayed_names(milestones: &[MilestoneView]) -> Option<String> {
    let names: Vec<&str> = milestones
        .iter()
        .filter(|m| m.status == Some(MilestoneStatus::Delayed))
        .take(NAMED_ITEM_LIMIT)
        .map(|m| m.name.as_deref().unwrap_or(UNNAMED_MILESTONE))
        .collect();
    (!names.is_empty()).then(|| names.join(", "))
}

/// The full deterministic body at `now`.
pub fn basic_body(
    project: &ProjectView,
    milestones: &[MilestoneView],
    risks: &[RiskView],
    now: NaiveDateTime,
) -> String {
    [
        overview_paragraph(project, now),
        milestone_paragraph(milestones),
        risk_paragraph(risks),
    ]
    .join("\n\n")
}

fn overview_paragraph(project: &ProjectView, now: NaiveDateTime) -> String {
    let name = project.name.as_deref().unwrap_or("Unknown Project");
    let owner = project.owner.as_deref().unwrap_or("Unknown");
    let status = project
        .status
        .map(|s| s.label().to_lowercase())
        .unwrap_or_else(|| "unknown".to_string());

    let mut sentence = format!(
        "{name} led by {owner} is currently {status} at {:.0}% completion.",
        project.completion_percentage
    );

    let start = parse_opt(project.start_date.as_deref());
    let deadline = parse_opt(project.deadline.as_deref());

    let mut timeline = Vec::new();
    if let Some(start) = start {
        timeline.push(format!("started on {}", format_day(start)));
    }
    if let Some(deadline) = deadline {
        timeline.push(format!("targeting a deadline of {}", format_day(deadline)));
    }
    if !timeline.is_empty() {
        sentence.push_str(&format!(" It {}.", timeline.join(" and ")));
    }

    if let Some(deadline) = deadline {
        if project.status != Some(ProjectStatus::Completed) {
            if deadline < now {
                let overdue = whole_days(now - deadline);
                sentence.push_str(&format!(" The project is overdue by {overdue} day(s)."));
            } else {
                let remaining = whole_days(deadline - now);
                sentence.push_str(&format!(
                    " There are {remaining} day(s) remaining until the deadline."
                ));
            }
        }
    }

    if let Some(description) = non_empty(project.description.as_deref()) {
        sentence.push_str(&format!(" The team is focused on {description}."));
    }

    sentence
}

fn milestone_paragraph(milestones: &[MilestoneView]) -> String {
    if milestones.is_empty() {
        return NO_MILESTONES.to_string();
    }

    let count = |status: MilestoneStatus| milestones.iter().filter(|m| m.status == Some(status)).count();

    let mut sentence = format!(
        "{} of {} milestones are complete, {} in progress, and {} pending.",
        count(MilestoneStatus::Completed),
        milestones.len(),
        count(MilestoneStatus::InProgress),
        count(MilestoneStatus::Pending),
    );
    if let Some(names) = delayed_names(milestones) {
        sentence.push_str(&format!(" Attention is needed on delayed milestone(s): {names}."));
    }
    sentence
}

fn risk_paragraph(risks: &[RiskView]) -> String {
    if risks.is_empty() {
        return NO_RISKS.to_string();
    }

    let high = risks.iter().filter(|r| r.is_high_and_open()).count();
    let mut sentence = if high > 0 {
        format!(
            "There are {} logged risks with {high} high severity item(s).",
            risks.len()
        )
    } else {
        format!("There are {} logged risks.", risks.len())
    };

    let open: Vec<&str> = risks
        .iter()
        .filter(|r| r.is_open())
        .take(NAMED_ITEM_LIMIT)
        .map(|r| r.name.as_deref().unwrap_or(UNNAMED_RISK))
        .collect();
    if !open.is_empty() {
        sentence.push_str(&format!(" Active risks include: {}.", open.join(", ")));
    }
    sentence
}
