//! Document upload, listing and per-document similarity checks.

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    middleware,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::DOCUMENT_TAG;
use crate::api::dto::{
    CheckRequest, CheckResponse, DocumentResponse, DocumentUploadForm, ErrorResponse, Paginated,
    PaginationParams,
};
use crate::api::middleware::{AuthUser, auth_middleware};
use crate::error::{AppError, AppResult};
use crate::services::UploadedFile;
use crate::state::AppState;
use crate::utils::{ValidatedJson, ValidatedQuery};

/// Creates document routes; all of them require authentication.
///
/// Routes:
/// - POST /              - Upload
/// - GET /               - List own documents
/// - GET /{id}           - Detail
/// - DELETE /{id}        - Delete
/// - POST /{id}/check    - Run a similarity check
/// - GET /{id}/checks    - Checks run against a document
pub fn document_routes(state: AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(upload_document, list_documents))
        .routes(routes!(get_document, delete_document))
        .routes(routes!(check_document))
        .routes(routes!(list_document_checks))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Fields collected from the multipart body.
#[derive(Default)]
struct UploadParts {
    file: Option<UploadedFile>,
    title: Option<String>,
    description: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> AppResult<UploadParts> {
    let mut parts = UploadParts::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                parts.file = Some(UploadedFile {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "title" => parts.title = Some(field.text().await?),
            "description" => parts.description = Some(field.text().await?),
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }
    Ok(parts)
}

/// POST /api/documents - Upload a document
#[utoipa::path(
    post,
    path = "/",
    tag = DOCUMENT_TAG,
    request_body(content = DocumentUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored", body = DocumentResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "Missing field or unsupported file type", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn upload_document(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DocumentResponse>)> {
    let parts = read_upload(multipart).await?;
    let file = parts
        .file
        .ok_or_else(|| AppError::validation("file", "A file is required"))?;
    let title = parts
        .title
        .ok_or_else(|| AppError::validation("title", "A title is required"))?;

    let document = state
        .services
        .documents
        .upload(auth_user.user_id, title, parts.description, file)
        .await?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

/// GET /api/documents - List own documents, newest first
#[utoipa::path(
    get,
    path = "/",
    tag = DOCUMENT_TAG,
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of documents", body = Paginated<DocumentResponse>)
    ),
    security(("bearerAuth" = []))
)]
async fn list_documents(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<Json<Paginated<DocumentResponse>>> {
    let page = state
        .services
        .documents
        .list(auth_user.user_id, params.offset(), params.limit())
        .await?;
    Ok(Json(Paginated::from_page(page, &params)))
}

/// GET /api/documents/{id} - Document detail
#[utoipa::path(
    get,
    path = "/{id}",
    tag = DOCUMENT_TAG,
    params(("id" = i32, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document", body = DocumentResponse),
        (status = 404, description = "No such document", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn get_document(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<DocumentResponse>> {
    let document = state.services.documents.get(auth_user.user_id, id).await?;
    Ok(Json(DocumentResponse::from(document)))
}

/// DELETE /api/documents/{id} - Delete a document and its checks
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = DOCUMENT_TAG,
    params(("id" = i32, Path, description = "Document id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such document", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn delete_document(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.documents.delete(auth_user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/documents/{id}/check - Check a document against the corpus
#[utoipa::path(
    post,
    path = "/{id}/check",
    tag = DOCUMENT_TAG,
    params(("id" = i32, Path, description = "Document id")),
    request_body = CheckRequest,
    responses(
        (status = 201, description = "Check stored", body = CheckResponse),
        (status = 404, description = "No such document", body = ErrorResponse),
        (status = 422, description = "Document has no extracted text", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn check_document(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<CheckRequest>,
) -> AppResult<(StatusCode, Json<CheckResponse>)> {
    let check = state
        .services
        .similarity
        .check_document(auth_user.user_id, id, payload.options())
        .await?;
    Ok((StatusCode::CREATED, Json(CheckResponse::from(check))))
}

/// GET /api/documents/{id}/checks - Checks run against a document
#[utoipa::path(
    get,
    path = "/{id}/checks",
    tag = DOCUMENT_TAG,
    params(("id" = i32, Path, description = "Document id")),
    responses(
        (status = 200, description = "Checks, newest first", body = Vec<CheckResponse>),
        (status = 404, description = "No such document", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_document_checks(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<CheckResponse>>> {
    let checks = state
        .services
        .similarity
        .list_document_checks(auth_user.user_id, id)
        .await?;
    Ok(Json(checks.into_iter().map(CheckResponse::from).collect()))
}
