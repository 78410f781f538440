// Prompt context for the summarization model

use crate::views::{non_empty, MilestoneView, ProjectView, RiskView};
use lemodele::{RiskSeverity, DEFAULT_RISK_STATUS};

/// Risks quoted verbatim in the context.
pub const CONTEXT_RISK_LIMIT: usize = 3;

const UNKNOWN: &str = "Unknown";

/// Whole numbers keep one decimal ("65.0"), others print in full.
pub(crate) fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Line-oriented description of a project, its milestones and risks.
///
/// Milestones and risks keep input order; only the first three risks are
/// listed.
pub fn build_context(project: &ProjectView, milestones: &[MilestoneView], risks: &[RiskView]) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Project Name: {}", project.name.as_deref().unwrap_or(UNKNOWN)));
    lines.push(format!("Owner: {}", project.owner.as_deref().unwrap_or(UNKNOWN)));
    lines.push(format!(
        "Status: {}",
        project.status.map(|s| s.label()).unwrap_or(UNKNOWN)
    ));
    lines.push(format!(
        "Completion Percentage: {}%",
        format_number(project.completion_percentage)
    ));

    if let Some(start) = non_empty(project.start_date.as_deref()) {
        lines.push(format!("Start Date: {start}"));
    }
    if let Some(deadline) = non_empty(project.deadline.as_deref()) {
        lines.push(format!("Deadline: {deadline}"));
    }
    if let Some(description) = non_empty(project.description.as_deref()) {
        lines.push(format!("Project Description: {description}"));
    }

    lines.push(format!("Milestones ({} total):", milestones.len()));
    for milestone in milestones {
        let mut line = format!(
            "- {} ({}",
            milestone.name.as_deref().unwrap_or(UNKNOWN),
            milestone.status.map(|s| s.label()).unwrap_or(UNKNOWN)
        );
        if let Some(target) = non_empty(milestone.target_date.as_deref()) {
            line.push_str(&format!(", target {target}"));
        }
        line.push(')');
        lines.push(line);
    }

    if !risks.is_empty() {
        let high = risks
            .iter()
            .filter(|r| r.severity == Some(RiskSeverity::High))
            .count();
        lines.push(format!("Risks ({} total, {} high severity):", risks.len(), high));
        for risk in risks.iter().take(CONTEXT_RISK_LIMIT) {
            let mut line = format!(
                "- {} (severity {}, status {})",
                risk.name.as_deref().unwrap_or(UNKNOWN),
                risk.severity.map(|s| s.label()).unwrap_or(UNKNOWN),
                risk.status.as_deref().unwrap_or(DEFAULT_RISK_STATUS)
            );
            if let Some(description) = non_empty(risk.description.as_deref()) {
                line.push(' ');
                line.push_str(description);
            }
            lines.push(line);
        }
    }

    lines.join("\n")
}
