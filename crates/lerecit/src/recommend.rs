// Recommendation rules
//
// Rules run in a fixed order and are not mutually exclusive. The order of
// the returned list is the presentation order.

use crate::narrative::delayed_names;
use crate::views::{MilestoneView, ProjectView, RiskView};
use chrono::NaiveDateTime;
use lemodele::dates::{parse_opt, whole_days};
use lemodele::ProjectStatus;
use std::fmt;

/// Deadlines this many days away or closer trigger a schedule review.
pub const SCHEDULE_REVIEW_WINDOW_DAYS: i64 = 14;

/// Completion below this percentage of an active project asks for acceleration.
pub const ACCELERATE_BELOW_PERCENT: f64 = 50.0;

/// One recommended action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recommendation {
    /// Deadline has passed
    EscalateOverdue,
    /// Deadline is within the review window
    ScheduleReview,
    /// Active project is less than half done
    AccelerateExecution,
    /// Some milestones are delayed; holds up to three names
    ResolveBlockers(String),
    /// A high severity risk is still open
    AddressHighRisks,
    /// Nothing else applies and no risk is open
    MaintainPace,
}

impl Recommendation {
    /// Sentence shown to the reader.
    pub fn text(&self) -> String {
        match self {
            Recommendation::EscalateOverdue => {
                "Escalate the overdue timeline and realign deliverables with stakeholders.".to_string()
            }
            Recommendation::ScheduleReview => {
                "Hold a schedule review to ensure remaining scope fits the upcoming deadline.".to_string()
            }
            Recommendation::AccelerateExecution => {
                "Accelerate execution: completion is below 50%, so consider rebalancing resources.".to_string()
            }
            Recommendation::ResolveBlockers(names) => {
                format!("Resolve blockers for delayed milestone(s): {names}.")
            }
            Recommendation::AddressHighRisks => {
                "Address high-severity risks immediately and update mitigation plans.".to_string()
            }
            Recommendation::MaintainPace => {
                "Maintain current pace and continue regular status reviews.".to_string()
            }
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Apply every rule at `now`.
pub fn derive(
    project: &ProjectView,
    milestones: &[MilestoneView],
    risks: &[RiskView],
    now: NaiveDateTime,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    let completed = project.status == Some(ProjectStatus::Completed);

    if let Some(deadline) = parse_opt(project.deadline.as_deref()) {
        if !completed {
            let days_to_deadline = whole_days(deadline - now);
            if days_to_deadline < 0 {
                recommendations.push(Recommendation::EscalateOverdue);
            } else if days_to_deadline <= SCHEDULE_REVIEW_WINDOW_DAYS {
                recommendations.push(Recommendation::ScheduleReview);
            }
        }
    }

    let not_started = project.status == Some(ProjectStatus::NotStarted);
    if project.completion_percentage < ACCELERATE_BELOW_PERCENT && !not_started && !completed {
        recommendations.push(Recommendation::AccelerateExecution);
    }

    if let Some(names) = delayed_names(milestones) {
        recommendations.push(Recommendation::ResolveBlockers(names));
    }

    if risks.iter().any(RiskView::is_high_and_open) {
        recommendations.push(Recommendation::AddressHighRisks);
    }

    // An open risk of any severity suppresses the fallback.
    if recommendations.is_empty() && !risks.iter().any(RiskView::is_open) {
        recommendations.push(Recommendation::MaintainPace);
    }

    recommendations
}
