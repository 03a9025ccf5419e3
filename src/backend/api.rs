//! Stub Server Routes

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    handler::Handler,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tracing::{debug, info};

use super::auth::{AuthState, ServerError};
use super::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::catalog::Catalog;
use crate::models::{
    AuthResponse, Course, Credentials, HostelAssignment, Identity, NewCourse, PayingStudent,
    Program, UploadFile, UploadKind, UploadResult,
};
use crate::services::remote::{
    COURSES_PATH, HOSTEL_PATH, LOGIN_PATH, ME_PATH, PAYING_STUDENTS_PATH, PROGRAMS_PATH,
};
use crate::services::UploadForm;

/// Shared server state
pub struct ServerState {
    pub auth: AuthState,
    pub catalog: Arc<Catalog>,
    pub max_upload_bytes: usize,
}

impl ServerState {
    pub fn new(auth: AuthState, catalog: Arc<Catalog>) -> Self {
        Self {
            auth,
            catalog,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_upload_limit(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// All backend routes
pub fn api_router(state: Arc<ServerState>) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);
    Router::new()
        .route(LOGIN_PATH, post(login_handler))
        .route(ME_PATH, get(me_handler))
        .route(COURSES_PATH, get(list_courses_handler).post(add_course_handler))
        .route(
            PROGRAMS_PATH,
            get(list_programs_handler).post(upload_handler.layer(upload_limit)),
        )
        .route(PAYING_STUDENTS_PATH, get(list_paying_students_handler))
        .route(HOSTEL_PATH, get(hostel_handler))
        .with_state(state)
}

async fn login_handler(
    State(state): State<Arc<ServerState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthResponse>, ServerError> {
    let access_token = state
        .auth
        .authenticate(credentials.login.trim(), &credentials.password)?;

    info!("Issued token for {}", credentials.login);
    Ok(Json(AuthResponse { access_token }))
}

async fn me_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<Json<Identity>, ServerError> {
    let claims = state.auth.authorize(&headers)?;
    Ok(Json(state.auth.identity(&claims)))
}

async fn list_courses_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Course>>, ServerError> {
    state.auth.authorize(&headers)?;
    Ok(Json(state.catalog.courses()))
}

async fn add_course_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(course): Json<NewCourse>,
) -> Result<Json<UploadResult>, ServerError> {
    state.auth.authorize(&headers)?.require_admin()?;

    let name = course.name.trim();
    if name.is_empty() {
        return Err(ServerError::BadRequest("Course name is required".into()));
    }
    state.catalog.add_course(name);
    Ok(Json(UploadResult::success()))
}

async fn list_programs_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Program>>, ServerError> {
    state.auth.authorize(&headers)?.require_admin()?;
    Ok(Json(state.catalog.programs()))
}

async fn list_paying_students_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<PayingStudent>>, ServerError> {
    state.auth.authorize(&headers)?.require_admin()?;
    Ok(Json(state.catalog.paying_students()))
}

async fn hostel_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<Json<HostelAssignment>, ServerError> {
    state.auth.authorize(&headers)?;
    Ok(Json(state.catalog.hostel()))
}

/// Multipart upload with a `kind` text field and a `file` part
async fn upload_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResult>, ServerError> {
    let claims = state.auth.authorize(&headers)?;

    let mut kind = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&state, e, "Malformed multipart body"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            UploadForm::KIND_FIELD => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(&state, e, "Unreadable 'kind' field"))?;
                let parsed = UploadKind::parse(value.trim())
                    .ok_or_else(|| ServerError::BadRequest(format!("Unknown upload kind '{}'", value)))?;
                kind = Some(parsed);
            }
            UploadForm::FILE_FIELD => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(&state, e, "Unreadable 'file' field"))?;
                file = Some(UploadFile::new(file_name, content_type, bytes.to_vec()));
            }
            other => debug!("Ignoring multipart field '{}'", other),
        }
    }

    let kind = kind.ok_or_else(|| ServerError::BadRequest("Missing 'kind' field".into()))?;
    let file = file.ok_or_else(|| ServerError::BadRequest("Missing 'file' field".into()))?;

    if kind != UploadKind::Payment {
        claims.require_admin()?;
    }

    let expected = kind.expected_content_type();
    if !file.content_type.eq_ignore_ascii_case(expected) {
        return Err(ServerError::BadRequest(format!(
            "Expected a {} file, got {}",
            kind.format_label(),
            file.content_type
        )));
    }

    state.catalog.store_upload(kind, &file);
    info!(
        "{} uploaded {} file {} ({} bytes)",
        claims.sub,
        kind,
        file.file_name,
        file.bytes.len()
    );
    Ok(Json(UploadResult::success()))
}

/// Body limit hits become 413, everything else is a malformed request
fn multipart_error(state: &ServerState, error: MultipartError, context: &str) -> ServerError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(state.max_upload_bytes)
    } else {
        ServerError::BadRequest(format!("{}: {}", context, error.body_text()))
    }
}
