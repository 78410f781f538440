//! API response types

use lerecit::{ProjectSummary, SummarySource};
use serde::{Deserialize, Serialize};

/// `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok"
    pub status: String,
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
    /// A summarization model is loaded
    pub model_ready: bool,
}

/// Confirmation for DELETE endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// e.g. "Project deleted successfully"
    pub message: String,
}

impl MessageResponse {
    /// "{entity} deleted successfully"
    pub fn deleted(entity: &str) -> Self {
        Self {
            message: format!("{} deleted successfully", entity),
        }
    }
}

/// `POST /api/ai/summarize/:id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Narrative body plus recommendation block
    pub summary: String,
    /// Recommendation sentences in presentation order
    pub recommendations: Vec<String>,
    /// "model", "fallback" or "deterministic"
    pub source: SummarySource,
}

impl From<ProjectSummary> for SummaryResponse {
    fn from(summary: ProjectSummary) -> Self {
        Self {
            summary: summary.text,
            recommendations: summary.recommendations,
            source: summary.source,
        }
    }
}
