// End-to-end behavior of the summarizer
//
// Stub models stand in for the HTTP backend so the model, fallback and
// deterministic paths can be compared directly.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use lemodele::dates::to_iso;
use lemodele::{MilestoneStatus, ProjectStatus, RiskSeverity};
use lerecit::{
    basic_body, build_context, derive, format_output, GenerationBounds, MilestoneView, ModelConfig,
    ModelError, ModelState, ProjectSummarizer, ProjectView, Recommendation, RiskView, SummaryModel,
    SummarySource, NO_MILESTONES, NO_RISKS,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 12, 1)
        .unwrap()
        .and_hms_opt(15, 30, 0)
        .unwrap()
}

fn project(status: ProjectStatus, completion: f64, deadline_days: i64) -> ProjectView {
    ProjectView {
        name: Some("Security Audit & Compliance".to_string()),
        owner: Some("David Kim".to_string()),
        status: Some(status),
        completion_percentage: completion,
        start_date: Some(to_iso(now() - Duration::days(90))),
        deadline: Some(to_iso(now() + Duration::days(deadline_days))),
        description: Some("Conduct security audit and ensure compliance".to_string()),
    }
}

fn busy_inputs() -> (ProjectView, Vec<MilestoneView>, Vec<RiskView>) {
    let milestones = vec![
        MilestoneView {
            name: Some("Scoping".to_string()),
            status: Some(MilestoneStatus::Completed),
            target_date: Some(to_iso(now() - Duration::days(60))),
        },
        MilestoneView {
            name: Some("QA".to_string()),
            status: Some(MilestoneStatus::Delayed),
            target_date: Some(to_iso(now() - Duration::days(3))),
        },
    ];
    let risks = vec![RiskView {
        name: Some("Integration Challenges".to_string()),
        severity: Some(RiskSeverity::High),
        status: Some("Open".to_string()),
        description: Some("Complex integration with existing systems".to_string()),
    }];
    (project(ProjectStatus::InProgress, 30.0, -5), milestones, risks)
}

struct Failing {
    calls: Arc<AtomicUsize>,
}

impl SummaryModel for Failing {
    fn summarize(&self, _text: &str, _bounds: GenerationBounds) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ModelError::Timeout(30))
    }
}

struct Recording {
    prompts: Arc<Mutex<Vec<(String, GenerationBounds)>>>,
}

impl SummaryModel for Recording {
    fn summarize(&self, text: &str, bounds: GenerationBounds) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push((text.to_string(), bounds));
        Ok("The audit is behind schedule.".to_string())
    }
}

struct Blank;

impl SummaryModel for Blank {
    fn summarize(&self, _text: &str, _bounds: GenerationBounds) -> Result<String, ModelError> {
        Ok("   ".to_string())
    }
}

#[test]
fn overdue_project_recommendations_in_rule_order() {
    let (project, milestones, risks) = busy_inputs();
    let recs = derive(&project, &milestones, &risks, now());
    assert_eq!(
        recs,
        vec![
            Recommendation::EscalateOverdue,
            Recommendation::AccelerateExecution,
            Recommendation::ResolveBlockers("QA".to_string()),
            Recommendation::AddressHighRisks,
        ]
    );
}

#[test]
fn completed_project_with_nothing_logged() {
    let project = project(ProjectStatus::Completed, 100.0, -20);
    let summary = ProjectSummarizer::deterministic().summarize_at(&project, &[], &[], now());

    assert_eq!(
        summary.recommendations,
        vec!["Maintain current pace and continue regular status reviews.".to_string()]
    );
    assert!(summary.text.contains(NO_MILESTONES));
    assert!(summary.text.contains(NO_RISKS));
    assert_eq!(summary.source, SummarySource::Deterministic);
}

#[test]
fn deadline_ten_days_out_gets_schedule_review() {
    let project = project(ProjectStatus::InProgress, 70.0, 10);
    let recs = derive(&project, &[], &[], now());
    assert!(recs.contains(&Recommendation::ScheduleReview));
    assert!(!recs.contains(&Recommendation::EscalateOverdue));
}

#[test]
fn deterministic_path_is_idempotent() {
    let (project, milestones, risks) = busy_inputs();
    let summarizer = ProjectSummarizer::deterministic();
    let first = summarizer.summarize_at(&project, &milestones, &risks, now());
    let second = summarizer.summarize_at(&project, &milestones, &risks, now());
    assert_eq!(first, second);
}

#[test]
fn model_failure_falls_back_to_deterministic_output() {
    let (project, milestones, risks) = busy_inputs();
    let calls = Arc::new(AtomicUsize::new(0));
    let summarizer = ProjectSummarizer::with_model(Failing {
        calls: Arc::clone(&calls),
    });

    let summary = summarizer.summarize_at(&project, &milestones, &risks, now());

    let expected = format_output(
        &basic_body(&project, &milestones, &risks, now()),
        &derive(&project, &milestones, &risks, now()),
    );
    assert_eq!(summary.text, expected);
    assert_eq!(summary.source, SummarySource::Fallback);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let deterministic = ProjectSummarizer::deterministic().summarize_at(&project, &milestones, &risks, now());
    assert_eq!(summary.text, deterministic.text);
}

#[test]
fn model_that_fails_to_start_stays_deterministic() {
    let (project, milestones, risks) = busy_inputs();
    let expected = ProjectSummarizer::deterministic().summarize_at(&project, &milestones, &risks, now());

    let configs = [
        ModelConfig {
            enabled: true,
            api_key_env: Some("LESUIVI_TEST_MODEL_KEY_NEVER_SET".to_string()),
            probe_on_startup: false,
            ..Default::default()
        },
        ModelConfig {
            enabled: true,
            endpoint: "ftp://127.0.0.1/v1".to_string(),
            ..Default::default()
        },
    ];

    for config in &configs {
        let summarizer = ProjectSummarizer::from_config(config);
        match summarizer.state() {
            ModelState::Unavailable { reason } => assert!(!reason.is_empty()),
            other => panic!("expected Unavailable, got {other:?}"),
        }

        let summary = summarizer.summarize_at(&project, &milestones, &risks, now());
        assert_eq!(summary.source, SummarySource::Deterministic);
        assert_eq!(summary, expected);
    }
}

#[test]
fn blank_model_output_falls_back() {
    let (project, milestones, risks) = busy_inputs();
    let summary = ProjectSummarizer::with_model(Blank).summarize_at(&project, &milestones, &risks, now());
    assert_eq!(summary.source, SummarySource::Fallback);
    assert!(summary.text.starts_with("Security Audit & Compliance led by David Kim"));
}

#[test]
fn model_receives_instruction_context_and_bounds() {
    let (project, milestones, risks) = busy_inputs();
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let summarizer = ProjectSummarizer::with_model(Recording {
        prompts: Arc::clone(&prompts),
    });

    let summary = summarizer.summarize_at(&project, &milestones, &risks, now());
    assert_eq!(summary.source, SummarySource::Model);
    assert!(summary
        .text
        .starts_with("The audit is behind schedule.\n\nRecommendations:\n- Escalate"));

    let recorded = prompts.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    let (prompt, bounds) = &recorded[0];
    assert!(prompt.starts_with("Summarize the following software project update"));
    assert!(prompt.ends_with(&build_context(&project, &milestones, &risks)));
    assert_eq!(*bounds, GenerationBounds::default());
}

#[test]
fn sparse_input_still_produces_text() {
    let summary = ProjectSummarizer::deterministic().generate_summary(
        &ProjectView::default(),
        &[MilestoneView::default()],
        &[RiskView::default()],
    );
    assert!(summary.starts_with("Unknown Project led by Unknown is currently unknown at 0% completion."));
    assert!(summary.contains("0 of 1 milestones are complete"));
    assert!(summary.contains("Active risks include: Unnamed risk."));
}
