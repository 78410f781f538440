// Summary orchestration
//
// Model lifecycle is decided once, at construction. Each call makes at most
// one model attempt and never fails: any model error falls back to the
// deterministic body. Recommendations are computed once per call regardless
// of which body is used.

use crate::context::build_context;
use crate::model::{ChatCompletionModel, GenerationBounds, ModelConfig, ModelError, SummaryModel};
use crate::narrative::basic_body;
use crate::recommend::{derive, Recommendation};
use crate::views::{views_from_bundle, MilestoneView, ProjectView, RiskView};
use chrono::NaiveDateTime;
use lemodele::dates::utc_now;
use lemodele::ProjectBundle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed instruction placed before the context.
pub const INSTRUCTION: &str = "Summarize the following software project update in 3-4 sentences. \
Highlight overall progress, milestone status, and risk posture in a professional tone.";

/// Instruction, blank line, context.
pub fn build_prompt(context: &str) -> String {
    format!("{INSTRUCTION}\n\n{context}")
}

/// Trimmed body followed by a "Recommendations:" block when there is one.
pub fn format_output(body: &str, recommendations: &[Recommendation]) -> String {
    let body = body.trim();
    if recommendations.is_empty() {
        return body.to_string();
    }
    let lines: Vec<String> = recommendations.iter().map(|r| format!("- {r}")).collect();
    format!("{body}\n\nRecommendations:\n{}", lines.join("\n"))
}

/// Model lifecycle, fixed for the life of a [`ProjectSummarizer`].
pub enum ModelState {
    /// No model configured
    Disabled,
    /// Configured but failed to initialize
    Unavailable {
        /// Initialization failure
        reason: String,
    },
    /// Ready for calls
    Ready(Box<dyn SummaryModel>),
}

impl ModelState {
    /// A model is available for calls.
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelState::Ready(_))
    }
}

impl fmt::Debug for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelState::Disabled => f.write_str("Disabled"),
            ModelState::Unavailable { reason } => {
                f.debug_struct("Unavailable").field("reason", reason).finish()
            }
            ModelState::Ready(model) => f.debug_tuple("Ready").field(&model.name()).finish(),
        }
    }
}

/// Which body ended up in the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    /// No model; rules-based body
    Deterministic,
    /// Model output
    Model,
    /// Model call failed; rules-based body
    Fallback,
}

/// A finished summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Body plus recommendation block
    pub text: String,
    /// Recommendation sentences in presentation order
    pub recommendations: Vec<String>,
    /// Origin of the body
    pub source: SummarySource,
}

/// Produces narrative summaries, optionally through a model.
#[derive(Debug)]
pub struct ProjectSummarizer {
    state: ModelState,
    bounds: GenerationBounds,
}

impl Default for ProjectSummarizer {
    fn default() -> Self {
        Self::deterministic()
    }
}

impl ProjectSummarizer {
    /// Rules-based summaries only.
    pub fn deterministic() -> Self {
        Self {
            state: ModelState::Disabled,
            bounds: GenerationBounds::default(),
        }
    }

    /// Use an already constructed model.
    pub fn with_model(model: impl SummaryModel + 'static) -> Self {
        Self {
            state: ModelState::Ready(Box::new(model)),
            bounds: GenerationBounds::default(),
        }
    }

    /// Initialize from configuration.
    ///
    /// Blocks while probing the backend. Failure is logged once and leaves
    /// the summarizer in deterministic mode for its whole life.
    pub fn from_config(config: &ModelConfig) -> Self {
        if !config.enabled {
            tracing::debug!("Summarization model disabled");
            return Self::deterministic();
        }

        let state = match Self::connect(config) {
            Ok(model) => {
                tracing::info!(endpoint = %config.endpoint, model = %config.model, "Summarization model ready");
                ModelState::Ready(Box::new(model))
            }
            Err(e) => {
                tracing::warn!(endpoint = %config.endpoint, error = %e, "Could not initialize summarization model; using deterministic summaries");
                ModelState::Unavailable {
                    reason: e.to_string(),
                }
            }
        };

        Self {
            state,
            bounds: GenerationBounds::default(),
        }
    }

    fn connect(config: &ModelConfig) -> Result<ChatCompletionModel, ModelError> {
        let model = ChatCompletionModel::new(config)?;
        if config.probe_on_startup {
            model.probe()?;
        }
        Ok(model)
    }

    /// Override the generation bounds.
    pub fn with_bounds(mut self, bounds: GenerationBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Current model lifecycle state.
    pub fn state(&self) -> &ModelState {
        &self.state
    }

    /// Summarize at the current time.
    pub fn summarize(
        &self,
        project: &ProjectView,
        milestones: &[MilestoneView],
        risks: &[RiskView],
    ) -> ProjectSummary {
        self.summarize_at(project, milestones, risks, utc_now())
    }

    /// Summarize with a pinned clock.
    pub fn summarize_at(
        &self,
        project: &ProjectView,
        milestones: &[MilestoneView],
        risks: &[RiskView],
        now: NaiveDateTime,
    ) -> ProjectSummary {
        let recommendations = derive(project, milestones, risks, now);

        let (body, source) = match &self.state {
            ModelState::Ready(model) => {
                let prompt = build_prompt(&build_context(project, milestones, risks));
                match model.summarize(&prompt, self.bounds) {
                    Ok(text) if !text.trim().is_empty() => (text, SummarySource::Model),
                    Ok(_) => {
                        tracing::warn!(model = model.name(), error = %ModelError::EmptyResponse, "Model summary failed");
                        (basic_body(project, milestones, risks, now), SummarySource::Fallback)
                    }
                    Err(e) => {
                        tracing::warn!(model = model.name(), error = %e, "Model summary failed");
                        (basic_body(project, milestones, risks, now), SummarySource::Fallback)
                    }
                }
            }
            ModelState::Disabled | ModelState::Unavailable { .. } => {
                tracing::debug!("Using deterministic summary");
                (basic_body(project, milestones, risks, now), SummarySource::Deterministic)
            }
        };

        ProjectSummary {
            text: format_output(&body, &recommendations),
            recommendations: recommendations.iter().map(Recommendation::text).collect(),
            source,
        }
    }

    /// Summary text for a project; never fails.
    pub fn generate_summary(
        &self,
        project: &ProjectView,
        milestones: &[MilestoneView],
        risks: &[RiskView],
    ) -> String {
        self.summarize(project, milestones, risks).text
    }

    /// Summarize a stored bundle at `now`.
    pub fn summarize_bundle(&self, bundle: &ProjectBundle, now: NaiveDateTime) -> ProjectSummary {
        let (project, milestones, risks) = views_from_bundle(bundle);
        self.summarize_at(&project, &milestones, &risks, now)
    }
}
