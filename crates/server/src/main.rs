// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod dispatch;
mod session;

#[cfg(test)]
mod tests;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use complaint_desk::Command;
use complaint_desk_api::{
    ApiError, ApproveAndCloseRequest, AssignRequest, AssignableUsersResponse, AuthenticatedActor,
    ChangeDepartmentRequest, ClosureArtifact, ClosureArtifactRenderer, CommittedTransition,
    ComplaintCapabilities, ComplaintListResponse, ComplaintResponse, ComplaintStatsResponse,
    ListComplaintsRequest, LogNotifier, PatchComplaintRequest, PostMessageRequest,
    PreparedTransition, RepairNullCellsResponse, ReturnForRedoRequest, SaveLetterRequest,
    TextClosureRenderer, WorkflowService, compute_complaint_capabilities, parse_request,
    translate_persistence_error,
};
use complaint_desk_domain::{Complaint, ComplaintId, Directory};
use complaint_desk_persistence::{ComplaintStore, SqliteSheet, load_directory};

use crate::dispatch::NotificationDispatcher;
use crate::session::Credential;

/// Complaint Desk Server - HTTP server for the school complaint desk
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    bind: IpAddr,

    /// Path to the directory snapshot (users and departments) JSON file
    #[arg(long)]
    directory: PathBuf,

    /// Base URL of the web app, used for links in notifications
    #[arg(long)]
    app_url: Option<String>,
}

/// The complaint store shared by handlers and the notification worker.
pub type SharedStore = Arc<Mutex<ComplaintStore<SqliteSheet>>>;

/// Application state shared across handlers.
///
/// The store is behind a Mutex; handlers hold it only around reads and
/// writes, never across validation.
#[derive(Clone)]
struct AppState {
    store: SharedStore,
    /// Directory snapshot loaded at startup.
    directory: Arc<Directory>,
    app_url: Option<Arc<str>>,
    dispatcher: NotificationDispatcher,
    renderer: Arc<dyn ClosureArtifactRenderer>,
}

impl AppState {
    fn service(&self) -> WorkflowService<'_> {
        WorkflowService::new(&self.directory, self.app_url.as_deref())
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error category (e.g. `forbidden`).
    error: String,
    /// Specific reason within the category.
    code: String,
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
pub struct HttpError {
    status: StatusCode,
    body: ErrorResponse,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidState { .. } | ApiError::InvalidInput { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %err, "Request failed");
        } else {
            debug!(error = %err, "Request rejected");
        }

        Self {
            status,
            body: ErrorResponse {
                error: err.category().to_string(),
                code: err.code().to_string(),
                message: err.to_string(),
            },
        }
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        Self::from(ApiError::InvalidInput {
            field: String::from("query"),
            message: rejection.body_text(),
        })
    }
}

/// Loads a complaint under a short lock.
async fn load_complaint(app_state: &AppState, id: &ComplaintId) -> Result<Complaint, HttpError> {
    let mut store = app_state.store.lock().await;
    let complaint: Complaint = store.load(id).map_err(translate_persistence_error)?;
    drop(store);
    Ok(complaint)
}

/// Loads every complaint under a short lock.
async fn load_all(app_state: &AppState) -> Result<Vec<Complaint>, HttpError> {
    let mut store = app_state.store.lock().await;
    let complaints: Vec<Complaint> = store.list().map_err(translate_persistence_error)?;
    drop(store);
    Ok(complaints)
}

/// Runs one workflow command.
///
/// The store lock is taken for the read and again for the compare-and-swap
/// write; validation runs between the two without it.
async fn run_command(
    app_state: &AppState,
    credential: Option<&str>,
    id: &str,
    command: Command,
    now: OffsetDateTime,
) -> Result<Json<ComplaintResponse>, HttpError> {
    let id: ComplaintId = ComplaintId::new(id);
    let action: &'static str = command.name();
    info!(complaint_id = id.value(), action, "Handling complaint command");

    let current: Complaint = load_complaint(app_state, &id).await?;

    let service: WorkflowService<'_> = app_state.service();
    let prepared: PreparedTransition = service.prepare(&current, credential, command, now)?;

    let mut store = app_state.store.lock().await;
    let committed: CommittedTransition = service.commit(&mut *store, prepared)?;
    drop(store);

    let actor: AuthenticatedActor = service.authenticate(credential)?;
    let capabilities: ComplaintCapabilities =
        compute_complaint_capabilities(&actor, &committed.complaint);

    app_state
        .dispatcher
        .enqueue(committed.complaint.clone(), committed.notifications);

    Ok(Json(ComplaintResponse {
        complaint: committed.complaint,
        capabilities,
    }))
}

/// Handler for GET `/complaints` endpoint.
async fn handle_list_complaints(
    AxumState(app_state): AxumState<AppState>,
    Credential(credential): Credential,
    query: Result<Query<ListComplaintsRequest>, QueryRejection>,
) -> Result<Json<ComplaintListResponse>, HttpError> {
    let Query(request) = query?;
    let complaints: Vec<Complaint> = load_all(&app_state).await?;

    let response: ComplaintListResponse =
        app_state
            .service()
            .list(complaints, credential.as_deref(), request)?;

    Ok(Json(response))
}

/// Handler for GET `/complaints/stats` endpoint.
async fn handle_complaint_stats(
    AxumState(app_state): AxumState<AppState>,
    Credential(credential): Credential,
) -> Result<Json<ComplaintStatsResponse>, HttpError> {
    let complaints: Vec<Complaint> = load_all(&app_state).await?;

    let response: ComplaintStatsResponse = app_state.service().stats(
        complaints,
        credential.as_deref(),
        OffsetDateTime::now_utc(),
    )?;

    Ok(Json(response))
}

/// Handler for GET `/complaints/{id}` endpoint.
async fn handle_get_complaint(
    AxumState(app_state): AxumState<AppState>,
    Credential(credential): Credential,
    Path(id): Path<String>,
) -> Result<Json<ComplaintResponse>, HttpError> {
    let complaint: Complaint = load_complaint(&app_state, &ComplaintId::new(&id)).await?;
    let response: ComplaintResponse = app_state.service().view(complaint, credential.as_deref())?;
    Ok(Json(response))
}

/// Handler for PATCH `/complaints/{id}` endpoint.
async fn handle_patch_complaint(
    AxumState(app_state): AxumState<AppState>,
    Credential(credential): Credential,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<ComplaintResponse>, HttpError> {
    let request: PatchComplaintRequest = parse_request(&body)?;
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    run_command(
        &app_state,
        credential.as_deref(),
        &id,
        Command::Patch(request.into_patch(now)),
        now,
    )
    .await
}

/// Handler for POST `/complaints/{id}/assign` endpoint.
async fn handle_assign(
    AxumState(app_state): AxumState<AppState>,
    Credential(credential): Credential,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<ComplaintResponse>, HttpError> {
    let request: AssignRequest = parse_request(&body)?;
    run_command(
        &app_state,
        credential.as_deref(),
        &id,
        request.into_command(),
        OffsetDateTime::now_utc(),
    )
    .await
}

/// Handler for POST `/complaints/{id}/department` endpoint.
async fn handle_change_department(
    AxumState(app_state): AxumState<AppState>,
    Credential(credential): Credential,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<ComplaintResponse>, HttpError> {
    let request: ChangeDepartmentRequest = parse_request(&body)?;
    run_command(
        &app_state,
        credential.as_deref(),
        &id,
        request.into_command(),
        OffsetDateTime::now_utc(),
    )
    .await
}

/// Handler for POST `/complaints/{id}/messages` endpoint.
async fn handle_post_message(
    AxumState(app_state): AxumState<AppState>,
    Credential(credential): Credential,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<ComplaintResponse>, HttpError> {
    let request: PostMessageRequest = parse_request(&body)?;
    run_command(
        &app_state,
        credential.as_deref(),
        &id,
        request.into_command(),
        OffsetDateTime::now_utc(),
    )
    .await
}

/// Handler for PUT `/complaints/{id}/letter` endpoint.
async fn handle_save_letter(
    AxumState(app_state): AxumState<AppState>,
    Credential(credential): Credential,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<ComplaintResponse>, HttpError> {
    let request: SaveLetterRequest = parse_request(&body)?;
    run_command(
        &app_state,
        credential.as_deref(),
        &id,
        request.into_command(),
        OffsetDateTime::now_utc(),
    )
    .await
}

/// Handler for POST `/complaints/{id}/submit` endpoint.
async fn handle_submit_for_review(
    AxumState(app_state): AxumState<AppState>,
    Credential(credential): Credential,
    Path(id): Path<String>,
) -> Result<Json<ComplaintResponse>, HttpError> {
    run_command(
        &app_state,
        credential.as_deref(),
        &id,
        Command::SubmitForReview,
        OffsetDateTime::now_utc(),
    )
    .await
}

/// Handler for POST `/complaints/{id}/return` endpoint.
async fn handle_return_for_redo(
    AxumState(app_state): AxumState<AppState>,
    Credential(credential): Credential,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<ComplaintResponse>, HttpError> {
    let request: ReturnForRedoRequest = parse_request(&body)?;
    run_command(
        &app_state,
        credential.as_deref(),
        &id,
        request.into_command(),
        OffsetDateTime::now_utc(),
    )
    .await
}

/// Handler for POST `/complaints/{id}/close` endpoint.
async fn handle_approve_and_close(
    AxumState(app_state): AxumState<AppState>,
    Credential(credential): Credential,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<ComplaintResponse>, HttpError> {
    let request: ApproveAndCloseRequest = parse_request(&body)?;
    let command: Command = request.into_command()?;
    run_command(
        &app_state,
        credential.as_deref(),
        &id,
        command,
        OffsetDateTime::now_utc(),
    )
    .await
}

/// Handler for GET `/complaints/{id}/closure-artifact` endpoint.
///
/// Returns the rendered artifact as a download.
async fn handle_closure_artifact(
    AxumState(app_state): AxumState<AppState>,
    Credential(credential): Credential,
    Path(id): Path<String>,
) -> Result<Response, HttpError> {
    let complaint: Complaint = load_complaint(&app_state, &ComplaintId::new(&id)).await?;
    let artifact: ClosureArtifact = app_state.service().closure_artifact(
        &complaint,
        credential.as_deref(),
        app_state.renderer.as_ref(),
    )?;

    let disposition: String = format!("attachment; filename=\"{}\"", artifact.file_name);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, artifact.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response())
}

/// Handler for GET `/departments/{id}/assignable-users` endpoint.
async fn handle_assignable_users(
    AxumState(app_state): AxumState<AppState>,
    Credential(credential): Credential,
    Path(department_id): Path<String>,
) -> Result<Json<AssignableUsersResponse>, HttpError> {
    let response: AssignableUsersResponse = app_state
        .service()
        .assignable_users(credential.as_deref(), &department_id)?;
    Ok(Json(response))
}

/// Handler for POST `/admin/repair-null-cells` endpoint.
async fn handle_repair_null_cells(
    AxumState(app_state): AxumState<AppState>,
    Credential(credential): Credential,
) -> Result<Json<RepairNullCellsResponse>, HttpError> {
    let service: WorkflowService<'_> = app_state.service();
    let mut store = app_state.store.lock().await;
    let response: RepairNullCellsResponse =
        service.repair_null_cells(&mut *store, credential.as_deref())?;
    drop(store);
    Ok(Json(response))
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/complaints", get(handle_list_complaints))
        .route("/complaints/stats", get(handle_complaint_stats))
        .route(
            "/complaints/{id}",
            get(handle_get_complaint).patch(handle_patch_complaint),
        )
        .route("/complaints/{id}/assign", post(handle_assign))
        .route("/complaints/{id}/department", post(handle_change_department))
        .route("/complaints/{id}/messages", post(handle_post_message))
        .route("/complaints/{id}/letter", put(handle_save_letter))
        .route("/complaints/{id}/submit", post(handle_submit_for_review))
        .route("/complaints/{id}/return", post(handle_return_for_redo))
        .route("/complaints/{id}/close", post(handle_approve_and_close))
        .route(
            "/complaints/{id}/closure-artifact",
            get(handle_closure_artifact),
        )
        .route(
            "/departments/{id}/assignable-users",
            get(handle_assignable_users),
        )
        .route("/admin/repair-null-cells", post(handle_repair_null_cells))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Complaint Desk Server");

    let directory: Directory = load_directory(&args.directory)?;

    // Initialize the sheet (in-memory or file-based based on CLI argument)
    let sheet: SqliteSheet = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path.display());
        SqliteSheet::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqliteSheet::new_in_memory()?
    };
    let store: SharedStore = Arc::new(Mutex::new(ComplaintStore::new(sheet)));

    let renderer: Arc<dyn ClosureArtifactRenderer> = Arc::new(TextClosureRenderer);
    let (dispatcher, _worker) = NotificationDispatcher::spawn(
        Arc::clone(&store),
        Arc::new(LogNotifier),
        Arc::clone(&renderer),
    );

    let app_state: AppState = AppState {
        store,
        directory: Arc::new(directory),
        app_url: args.app_url.map(Arc::from),
        dispatcher,
        renderer,
    };

    // Build router
    let app: Router = build_router(app_state);

    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
