use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::{Session, SessionError, SessionId, SessionRepository};
use crate::config::ReportConfig;
use crate::workflows::checklist::{
    Category, ChecklistError, ChecklistItemView, ChecklistSource, ItemStatus, Stats,
};
use crate::workflows::incidences::IncidenceError;
use crate::workflows::master_data::{
    export_rows, MasterDataError, MasterDataImporter, MASTER_DATA_FILE_NAME, XLSX_CONTENT_TYPE,
};
use crate::workflows::report::views::IncidenceView;
use crate::workflows::report::{ReportError, ReportFields, ReportFormat};

pub struct SessionRouterState<R> {
    repository: Arc<R>,
    defaults: ReportConfig,
}

impl<R> Clone for SessionRouterState<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            defaults: self.defaults.clone(),
        }
    }
}

type AppState<R> = State<SessionRouterState<R>>;

/// Request body cap for photo and master-data uploads.
pub const UPLOAD_BODY_LIMIT: usize = 20 * 1024 * 1024;

/// Router builder exposing the checklist, incidence log and report of every
/// session. New sessions take their community name from `defaults`.
pub fn session_router<R>(repository: Arc<R>, defaults: ReportConfig) -> Router
where
    R: SessionRepository + 'static,
{
    Router::new()
        .route("/api/v1/sessions", post(create_session::<R>))
        .route("/api/v1/sessions/:session_id", delete(remove_session::<R>))
        .route(
            "/api/v1/sessions/:session_id/checklist",
            get(checklist_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/checklist/items",
            post(add_item::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/checklist/items/remove",
            post(remove_items::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/checklist/items/:item_id",
            put(update_item::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/checklist/items/:item_id/photo",
            put(attach_photo::<R>)
                .delete(clear_photo::<R>)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/v1/sessions/:session_id/checklist/status",
            post(bulk_status::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/checklist/reset",
            post(reset_checklist::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/master-data",
            get(export_master_data::<R>)
                .post(import_master_data::<R>)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/v1/sessions/:session_id/incidences",
            get(list_incidences::<R>).post(add_incidence::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/incidences/:incidence_id",
            delete(remove_incidence::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/report",
            get(report_view::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/report/fields",
            put(update_fields::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/report/text",
            get(|state: AppState<R>, path: Path<String>| {
                download_report(state, path, ReportFormat::Text)
            }),
        )
        .route(
            "/api/v1/sessions/:session_id/report/pdf",
            get(|state: AppState<R>, path: Path<String>| {
                download_report(state, path, ReportFormat::Pdf)
            }),
        )
        .route(
            "/api/v1/sessions/:session_id/report/docx",
            get(|state: AppState<R>, path: Path<String>| {
                download_report(state, path, ReportFormat::Docx)
            }),
        )
        .with_state(SessionRouterState {
            repository,
            defaults,
        })
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Session(SessionError),
    Checklist(ChecklistError),
    Incidence(IncidenceError),
    IncidenceNotFound(u32),
    MasterData(MasterDataError),
    Report(ReportError),
    EmptyPhoto,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Session(SessionError::NotFound(_))
            | ApiError::Checklist(ChecklistError::ItemNotFound(_))
            | ApiError::IncidenceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Checklist(ChecklistError::EmptyName)
            | ApiError::Incidence(_)
            | ApiError::EmptyPhoto => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MasterData(err) if err.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MasterData(MasterDataError::Template(_))
            | ApiError::Session(SessionError::Unavailable(_))
            | ApiError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MasterData(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Session(err) => err.to_string(),
            ApiError::Checklist(err) => err.to_string(),
            ApiError::Incidence(err) => err.to_string(),
            ApiError::IncidenceNotFound(id) => format!("incidence {id} not found"),
            ApiError::MasterData(err) => err.to_string(),
            ApiError::Report(err) => err.to_string(),
            ApiError::EmptyPhoto => "photo body must not be empty".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message() });
        (self.status(), Json(payload)).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<ChecklistError> for ApiError {
    fn from(value: ChecklistError) -> Self {
        Self::Checklist(value)
    }
}

impl From<IncidenceError> for ApiError {
    fn from(value: IncidenceError) -> Self {
        Self::Incidence(value)
    }
}

impl From<MasterDataError> for ApiError {
    fn from(value: MasterDataError) -> Self {
        Self::MasterData(value)
    }
}

impl From<ReportError> for ApiError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CreateSessionRequest {
    #[serde(default)]
    pub(crate) community_name: Option<String>,
    #[serde(default)]
    pub(crate) report_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChecklistResponse {
    pub(crate) items: Vec<ChecklistItemView>,
    pub(crate) stats: Stats,
}

impl ChecklistResponse {
    fn from_session(session: &Session) -> Self {
        Self {
            items: session
                .checklist
                .items()
                .iter()
                .map(|item| item.to_view())
                .collect(),
            stats: session.checklist.stats(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddItemRequest {
    pub(crate) category: Category,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) task: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemoveItemsRequest {
    pub(crate) ids: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateItemRequest {
    #[serde(default)]
    pub(crate) status: Option<ItemStatus>,
    #[serde(default)]
    pub(crate) note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkStatusRequest {
    pub(crate) status: ItemStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddIncidenceRequest {
    pub(crate) employee: String,
    pub(crate) detail: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateFieldsRequest {
    #[serde(default)]
    pub(crate) community_name: Option<String>,
    #[serde(default)]
    pub(crate) report_date: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) needs: Option<String>,
}

pub(crate) async fn create_session<R>(
    State(state): AppState<R>,
    request: Option<Json<CreateSessionRequest>>,
) -> Result<Response, ApiError>
where
    R: SessionRepository + 'static,
{
    let request = request.map(|Json(request)| request).unwrap_or_default();
    let community_name = request
        .community_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| state.defaults.community_name.clone());
    let report_date = request
        .report_date
        .unwrap_or_else(|| Local::now().date_naive());

    let session = Session::new(ReportFields::new(community_name, report_date));
    let id = state.repository.create(session)?;
    info!(session = %id, "session created");
    Ok((StatusCode::CREATED, Json(json!({ "session_id": id }))).into_response())
}

pub(crate) async fn remove_session<R>(
    State(state): AppState<R>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    R: SessionRepository + 'static,
{
    let id = SessionId(session_id);
    state.repository.remove(&id)?;
    info!(session = %id, "session closed");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn checklist_handler<R>(
    State(state): AppState<R>,
    Path(session_id): Path<String>,
) -> Result<Json<ChecklistResponse>, ApiError>
where
    R: SessionRepository + 'static,
{
    let view = state
        .repository
        .read(&SessionId(session_id), ChecklistResponse::from_session)?;
    Ok(Json(view))
}

pub(crate) async fn add_item<R>(
    State(state): AppState<R>,
    Path(session_id): Path<String>,
    Json(request): Json<AddItemRequest>,
) -> Result<Response, ApiError>
where
    R: SessionRepository + 'static,
{
    let view = state.repository.update(&SessionId(session_id), |session| {
        session
            .checklist
            .add(request.category, &request.name, request.task.as_deref())
            .map(|item| item.to_view())
    })??;
    debug!(item = view.id, "checklist item added");
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

#[derive(Debug, Serialize)]
pub(crate) struct RemoveItemsResponse {
    pub(crate) removed: usize,
    #[serde(flatten)]
    pub(crate) checklist: ChecklistResponse,
}

pub(crate) async fn remove_items<R>(
    State(state): AppState<R>,
    Path(session_id): Path<String>,
    Json(request): Json<RemoveItemsRequest>,
) -> Result<Json<RemoveItemsResponse>, ApiError>
where
    R: SessionRepository + 'static,
{
    let ids: HashSet<u32> = request.ids.into_iter().collect();
    let response = state.repository.update(&SessionId(session_id), |session| {
        let removed = session.checklist.remove(&ids);
        RemoveItemsResponse {
            removed,
            checklist: ChecklistResponse::from_session(session),
        }
    })?;
    Ok(Json(response))
}

pub(crate) async fn update_item<R>(
    State(state): AppState<R>,
    Path((session_id, item_id)): Path<(String, u32)>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<ChecklistItemView>, ApiError>
where
    R: SessionRepository + 'static,
{
    let view = state.repository.update(&SessionId(session_id), |session| {
        let checklist = &mut session.checklist;
        if let Some(status) = request.status {
            checklist.set_status(item_id, status)?;
        }
        if let Some(note) = request.note.as_deref() {
            checklist.set_note(item_id, note)?;
        }
        checklist
            .get(item_id)
            .map(|item| item.to_view())
            .ok_or(ChecklistError::ItemNotFound(item_id))
    })??;
    Ok(Json(view))
}

pub(crate) async fn attach_photo<R>(
    State(state): AppState<R>,
    Path((session_id, item_id)): Path<(String, u32)>,
    body: Bytes,
) -> Result<Json<ChecklistItemView>, ApiError>
where
    R: SessionRepository + 'static,
{
    if body.is_empty() {
        return Err(ApiError::EmptyPhoto);
    }
    let view = state.repository.update(&SessionId(session_id), |session| {
        session.checklist.set_photo(item_id, body.to_vec())?;
        session
            .checklist
            .get(item_id)
            .map(|item| item.to_view())
            .ok_or(ChecklistError::ItemNotFound(item_id))
    })??;
    debug!(item = item_id, bytes = body.len(), "photo attached");
    Ok(Json(view))
}

pub(crate) async fn clear_photo<R>(
    State(state): AppState<R>,
    Path((session_id, item_id)): Path<(String, u32)>,
) -> Result<Json<ChecklistItemView>, ApiError>
where
    R: SessionRepository + 'static,
{
    let view = state.repository.update(&SessionId(session_id), |session| {
        session.checklist.clear_photo(item_id)?;
        session
            .checklist
            .get(item_id)
            .map(|item| item.to_view())
            .ok_or(ChecklistError::ItemNotFound(item_id))
    })??;
    Ok(Json(view))
}

pub(crate) async fn bulk_status<R>(
    State(state): AppState<R>,
    Path(session_id): Path<String>,
    Json(request): Json<BulkStatusRequest>,
) -> Result<Json<ChecklistResponse>, ApiError>
where
    R: SessionRepository + 'static,
{
    let response = state.repository.update(&SessionId(session_id), |session| {
        session.checklist.set_all_status(request.status);
        ChecklistResponse::from_session(session)
    })?;
    Ok(Json(response))
}

pub(crate) async fn reset_checklist<R>(
    State(state): AppState<R>,
    Path(session_id): Path<String>,
) -> Result<Json<ChecklistResponse>, ApiError>
where
    R: SessionRepository + 'static,
{
    let response = state.repository.update(&SessionId(session_id), |session| {
        session.checklist.initialize(ChecklistSource::Standard);
        ChecklistResponse::from_session(session)
    })?;
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub(crate) struct ImportResponse {
    pub(crate) imported: usize,
    #[serde(flatten)]
    pub(crate) checklist: ChecklistResponse,
}

pub(crate) async fn import_master_data<R>(
    State(state): AppState<R>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Result<Json<ImportResponse>, ApiError>
where
    R: SessionRepository + 'static,
{
    let response = state.repository.update(&SessionId(session_id), |session| {
        MasterDataImporter::import(&body, &mut session.checklist).map(|imported| ImportResponse {
            imported,
            checklist: ChecklistResponse::from_session(session),
        })
    })??;
    Ok(Json(response))
}

pub(crate) async fn export_master_data<R>(
    State(state): AppState<R>,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError>
where
    R: SessionRepository + 'static,
{
    let rows = state
        .repository
        .read(&SessionId(session_id), |session| session.checklist.to_rows())?;
    let workbook = export_rows(&rows)?;
    debug!(rows = rows.len(), "master data exported");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                attachment_disposition(MASTER_DATA_FILE_NAME),
            ),
        ],
        workbook,
    )
        .into_response())
}

pub(crate) async fn list_incidences<R>(
    State(state): AppState<R>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<IncidenceView>>, ApiError>
where
    R: SessionRepository + 'static,
{
    let views = state.repository.read(&SessionId(session_id), |session| {
        session
            .incidences
            .list_sorted()
            .into_iter()
            .map(IncidenceView::from)
            .collect::<Vec<_>>()
    })?;
    Ok(Json(views))
}

pub(crate) async fn add_incidence<R>(
    State(state): AppState<R>,
    Path(session_id): Path<String>,
    Json(request): Json<AddIncidenceRequest>,
) -> Result<Response, ApiError>
where
    R: SessionRepository + 'static,
{
    let view = state.repository.update(&SessionId(session_id), |session| {
        session
            .incidences
            .add(&request.employee, &request.detail)
            .map(IncidenceView::from)
    })??;
    debug!(incidence = view.id, "incidence recorded");
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

pub(crate) async fn remove_incidence<R>(
    State(state): AppState<R>,
    Path((session_id, incidence_id)): Path<(String, u32)>,
) -> Result<StatusCode, ApiError>
where
    R: SessionRepository + 'static,
{
    let removed = state
        .repository
        .update(&SessionId(session_id), |session| {
            session.incidences.remove(incidence_id)
        })?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::IncidenceNotFound(incidence_id))
    }
}

pub(crate) async fn update_fields<R>(
    State(state): AppState<R>,
    Path(session_id): Path<String>,
    Json(request): Json<UpdateFieldsRequest>,
) -> Result<Json<ReportFields>, ApiError>
where
    R: SessionRepository + 'static,
{
    let fields = state.repository.update(&SessionId(session_id), |session| {
        let fields = &mut session.fields;
        if let Some(community_name) = request.community_name {
            fields.community_name = community_name;
        }
        if let Some(report_date) = request.report_date {
            fields.report_date = report_date;
        }
        if let Some(needs) = request.needs {
            fields.needs = needs;
        }
        fields.clone()
    })?;
    Ok(Json(fields))
}

pub(crate) async fn report_view<R>(
    State(state): AppState<R>,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError>
where
    R: SessionRepository + 'static,
{
    let snapshot = state
        .repository
        .read(&SessionId(session_id), Session::snapshot)?;
    Ok(Json(snapshot.to_view()).into_response())
}

async fn download_report<R>(
    State(state): AppState<R>,
    Path(session_id): Path<String>,
    format: ReportFormat,
) -> Result<Response, ApiError>
where
    R: SessionRepository + 'static,
{
    let snapshot = state
        .repository
        .read(&SessionId(session_id), Session::snapshot)?;
    let body = format.render(&snapshot)?;
    let disposition = attachment_disposition(&format.file_name(&snapshot));
    debug!(format = format.extension(), bytes = body.len(), "report downloaded");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// `attachment` disposition carrying an ASCII fallback `filename` and the
/// exact name as a percent-encoded UTF-8 `filename*` (RFC 6266).
pub fn attachment_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' | '%' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    )
}
