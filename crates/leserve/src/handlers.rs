//! HTTP handlers for REST API endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use lemodele::dates::utc_now;
use lemodele::{KpiSnapshot, Milestone, Project, ProjectBundle, Risk};
use lerecit::ProjectSummarizer;
use lestockage::{Analytics, MilestoneStore, Portfolio, ProjectStore, RiskStore, Storage};
use lexport::{FlatCsvExporter, JiraExporter, PowerBiExporter, PowerBiTable, DEFAULT_PROJECT_KEY};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::{ApiError, ApiResult};
use crate::requests::{
    CreateMilestoneRequest, CreateProjectRequest, CreateRiskRequest, JiraQuery, ListQuery,
    UpdateMilestoneRequest, UpdateProjectRequest, UpdateRiskRequest,
};
use crate::responses::{HealthResponse, MessageResponse, SummaryResponse};

/// State shared across all handlers
///
/// Uses `Arc<Mutex<Storage>>` because `rusqlite::Connection` is not `Sync`.
/// Handlers must lock the mutex before accessing storage and release it
/// before awaiting.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe storage access requiring mutex lock
    pub storage: Arc<Mutex<Storage>>,

    /// Immutable server configuration
    pub config: Arc<ServerConfig>,

    /// Summarizer, initialized once at startup
    pub summarizer: Arc<ProjectSummarizer>,
}

impl AppState {
    /// Create a new AppState instance
    pub fn new(storage: Storage, config: ServerConfig, summarizer: ProjectSummarizer) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            config: Arc::new(config),
            summarizer: Arc::new(summarizer),
        }
    }

    /// Create AppState from already shared parts
    pub fn new_from_arc(
        storage: Arc<Mutex<Storage>>,
        config: ServerConfig,
        summarizer: Arc<ProjectSummarizer>,
    ) -> Self {
        Self {
            storage,
            config: Arc::new(config),
            summarizer,
        }
    }

    fn lock(&self) -> ApiResult<MutexGuard<'_, Storage>> {
        self.storage
            .lock()
            .map_err(|_| ApiError::internal("Storage lock poisoned"))
    }

    fn load_bundle(&self, id: i64) -> ApiResult<ProjectBundle> {
        let storage = self.lock()?;
        Ok(Portfolio::load_project(&storage, id)?)
    }

    fn load_portfolio(&self) -> ApiResult<Vec<ProjectBundle>> {
        let storage = self.lock()?;
        Ok(Portfolio::load(&storage)?)
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

fn csv_response(csv: String, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    )
        .into_response()
}

/// GET /api/health - Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "leserve".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_ready: state.summarizer.state().is_ready(),
    })
}

/// GET /api/projects
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    let mut storage = state.lock()?;
    Ok(Json(ProjectStore::new(&mut storage).list()?))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let new = body(payload)?.into_new()?;
    let mut storage = state.lock()?;
    let project = ProjectStore::new(&mut storage).insert(&new)?;
    info!(id = project.id, name = %project.name, "Created project");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Project>> {
    let mut storage = state.lock()?;
    Ok(Json(ProjectStore::new(&mut storage).require(id)?))
}

/// PUT /api/projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> ApiResult<Json<Project>> {
    let patch = body(payload)?.into_patch()?;
    let mut storage = state.lock()?;
    let project = ProjectStore::new(&mut storage).update(id, &patch)?;
    info!(id, "Updated project");
    Ok(Json(project))
}

/// DELETE /api/projects/:id - also removes its milestones and risks
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let mut storage = state.lock()?;
    ProjectStore::new(&mut storage).delete(id)?;
    info!(id, "Deleted project");
    Ok(Json(MessageResponse::deleted("Project")))
}

/// GET /api/milestones?project_id=
pub async fn list_milestones(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Milestone>>> {
    let mut storage = state.lock()?;
    Ok(Json(MilestoneStore::new(&mut storage).list(query.project_id)?))
}

/// POST /api/milestones - recalculates the owning project's completion
pub async fn create_milestone(
    State(state): State<AppState>,
    payload: Result<Json<CreateMilestoneRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Milestone>)> {
    let new = body(payload)?.into_new()?;
    let mut storage = state.lock()?;
    let milestone = MilestoneStore::new(&mut storage).insert(&new)?;
    info!(id = milestone.id, project_id = milestone.project_id, "Created milestone");
    Ok((StatusCode::CREATED, Json(milestone)))
}

/// PUT /api/milestones/:id
pub async fn update_milestone(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateMilestoneRequest>, JsonRejection>,
) -> ApiResult<Json<Milestone>> {
    let patch = body(payload)?.into_patch()?;
    let mut storage = state.lock()?;
    let milestone = MilestoneStore::new(&mut storage).update(id, &patch)?;
    info!(id, status = %milestone.status, "Updated milestone");
    Ok(Json(milestone))
}

/// DELETE /api/milestones/:id
pub async fn delete_milestone(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let mut storage = state.lock()?;
    MilestoneStore::new(&mut storage).delete(id)?;
    info!(id, "Deleted milestone");
    Ok(Json(MessageResponse::deleted("Milestone")))
}

/// GET /api/risks?project_id=
pub async fn list_risks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Risk>>> {
    let mut storage = state.lock()?;
    Ok(Json(RiskStore::new(&mut storage).list(query.project_id)?))
}

/// POST /api/risks
pub async fn create_risk(
    State(state): State<AppState>,
    payload: Result<Json<CreateRiskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Risk>)> {
    let new = body(payload)?.into_new()?;
    let mut storage = state.lock()?;
    let risk = RiskStore::new(&mut storage).insert(&new)?;
    info!(id = risk.id, project_id = risk.project_id, severity = %risk.severity, "Created risk");
    Ok((StatusCode::CREATED, Json(risk)))
}

/// PUT /api/risks/:id
pub async fn update_risk(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateRiskRequest>, JsonRejection>,
) -> ApiResult<Json<Risk>> {
    let patch = body(payload)?.into_patch()?;
    let mut storage = state.lock()?;
    let risk = RiskStore::new(&mut storage).update(id, &patch)?;
    info!(id, "Updated risk");
    Ok(Json(risk))
}

/// DELETE /api/risks/:id
pub async fn delete_risk(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let mut storage = state.lock()?;
    RiskStore::new(&mut storage).delete(id)?;
    info!(id, "Deleted risk");
    Ok(Json(MessageResponse::deleted("Risk")))
}

/// GET /api/kpis - dashboard KPI snapshot
pub async fn get_kpis(State(state): State<AppState>) -> ApiResult<Json<KpiSnapshot>> {
    let storage = state.lock()?;
    Ok(Json(Analytics::new(&storage).kpis(utc_now())?))
}

/// GET /api/export/csv - flat report download
pub async fn export_csv(State(state): State<AppState>) -> ApiResult<Response> {
    let bundles = state.load_portfolio()?;
    let csv = FlatCsvExporter::new().export(&bundles)?;
    Ok(csv_response(csv, "project_export.csv"))
}

/// GET /api/export/jira?project_key=&assignee=
pub async fn export_jira(
    State(state): State<AppState>,
    Query(query): Query<JiraQuery>,
) -> ApiResult<Response> {
    let key = query
        .project_key
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PROJECT_KEY.to_string());
    let bundles = state.load_portfolio()?;
    let (csv, stats) = JiraExporter::new(key)
        .with_assignee(query.assignee)
        .export(&bundles, utc_now())?;
    debug!(issues = stats.total(), "Serving Jira export");
    Ok(csv_response(csv, "jira_import.csv"))
}

/// GET /api/export/powerbi/:table
pub async fn export_powerbi(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> ApiResult<Response> {
    let table: PowerBiTable = table.parse().map_err(ApiError::bad_request)?;
    let bundles = state.load_portfolio()?;
    let tables = PowerBiExporter::new().export(&bundles, utc_now())?;
    let filename = format!("powerbi_{}.csv", table);
    Ok(csv_response(tables.get(table).to_string(), &filename))
}

/// POST /api/ai/summarize/:id
///
/// The summarizer may block on a model call, so it runs on the blocking
/// pool. Model failures never surface here; they fall back to the
/// deterministic body.
pub async fn summarize_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<SummaryResponse>> {
    let bundle = state.load_bundle(id)?;
    let summarizer = Arc::clone(&state.summarizer);
    let now = utc_now();

    let summary = tokio::task::spawn_blocking(move || summarizer.summarize_bundle(&bundle, now))
        .await
        .map_err(|e| ApiError::internal(format!("Summary task failed: {}", e)))?;

    info!(id, source = ?summary.source, "Summarized project");
    Ok(Json(summary.into()))
}

/// Create router with all API endpoints
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/milestones", get(list_milestones).post(create_milestone))
        .route("/api/milestones/:id", put(update_milestone).delete(delete_milestone))
        .route("/api/risks", get(list_risks).post(create_risk))
        .route("/api/risks/:id", put(update_risk).delete(delete_risk))
        .route("/api/kpis", get(get_kpis))
        .route("/api/export/csv", get(export_csv))
        .route("/api/export/jira", get(export_jira))
        .route("/api/export/powerbi/:table", get(export_powerbi))
        .route("/api/ai/summarize/:id", post(summarize_project))
}
