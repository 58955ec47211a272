use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::extract::{extract_text, DocumentKind};
use crate::{
    auth::AuthUser,
    config::UploadConfig,
    courses::require_owned_course,
    error::{ApiPath, ApiResult, AppError},
    state::AppState,
    store::{DocumentSummary, NewDocument},
};

pub fn document_routes(upload: &UploadConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/documents/upload/:course_id",
            post(upload_documents).layer(DefaultBodyLimit::max(upload.body_limit())),
        )
        .route("/documents/course/:course_id", get(list_documents))
}

/// POST /documents/upload/:course_id (multipart, any number of file fields)
///
/// Every file is validated and extracted before anything is stored.
#[instrument(skip(state, user, mp), fields(user_id = %user.id))]
pub async fn upload_documents(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(course_id): ApiPath<Uuid>,
    mut mp: Multipart,
) -> ApiResult<(StatusCode, Json<Vec<DocumentSummary>>)> {
    require_owned_course(&state, &user, course_id).await?;
    let limits = &state.config.upload;

    let mut docs = Vec::new();
    while let Some(field) = mp.next_field().await.map_err(multipart_error)? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue; // plain form fields carry no document
        };
        if docs.len() == limits.max_files {
            return Err(AppError::validation(format!(
                "At most {} files can be uploaded at once.",
                limits.max_files
            )));
        }
        docs.push(read_document(field, file_name, limits).await?);
    }

    if docs.is_empty() {
        return Err(AppError::validation("At least one file is required."));
    }

    let stored = state.repo.insert_documents(course_id, docs).await?;
    info!(%course_id, count = stored.len(), "documents uploaded");
    Ok((StatusCode::CREATED, Json(stored)))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_documents(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(course_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<DocumentSummary>>> {
    require_owned_course(&state, &user, course_id).await?;
    Ok(Json(state.repo.list_documents(course_id).await?))
}

async fn read_document(
    field: Field<'_>,
    file_name: String,
    limits: &UploadConfig,
) -> ApiResult<NewDocument> {
    let declared = field.content_type().map(str::to_string);
    let kind = DocumentKind::detect(declared.as_deref(), &file_name).ok_or_else(|| {
        AppError::UnsupportedMediaType(format!(
            "{file_name}: only PDF, plain text and markdown files are supported."
        ))
    })?;

    let data = field.bytes().await.map_err(multipart_error)?;
    if data.len() > limits.max_file_bytes {
        return Err(AppError::validation(format!(
            "{file_name} is larger than {} bytes.",
            limits.max_file_bytes
        )));
    }

    let text_content = extract_text(&file_name, kind, data).await?;
    Ok(NewDocument {
        file_name,
        file_type: Some(kind.stored_mime(declared.as_deref())),
        text_content,
    })
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::validation(format!("Invalid multipart body: {}", e.body_text()))
}
