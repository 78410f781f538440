//! lerecit - Narrative Generator
//!
//! *Le Récit* (The Narrative) - Status summaries and recommendations for a single project,
//! produced by an optional summarization model with a deterministic fallback

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Prompt context sent to the summarization model.
pub mod context;
/// Summarization model seam and the HTTP chat-completion backend.
pub mod model;
/// Rules-based status paragraphs.
pub mod narrative;
/// Ordered recommendation rules.
pub mod recommend;
/// Summary orchestration and output formatting.
pub mod summarizer;
/// Read-only project, milestone and risk snapshots.
pub mod views;

pub use context::build_context;
pub use model::{ChatCompletionModel, GenerationBounds, ModelConfig, ModelError, SummaryModel};
pub use narrative::{basic_body, NO_MILESTONES, NO_RISKS};
pub use recommend::{derive, Recommendation};
pub use summarizer::{
    build_prompt, format_output, ModelState, ProjectSummarizer, ProjectSummary, SummarySource,
    INSTRUCTION,
};
pub use views::{views_from_bundle, MilestoneView, ProjectView, RiskView};
