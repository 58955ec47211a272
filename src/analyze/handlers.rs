use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;
use uuid::Uuid;

use super::services::{self, CourseSummary, Quiz, TaskExtraction};
use crate::{
    auth::AuthUser,
    error::{ApiPath, ApiResult},
    state::AppState,
};

pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze/course/:course_id", post(analyze_course))
        .route("/analyze/course/:course_id/summarize", post(summarize_course))
        .route("/analyze/course/:course_id/quiz", post(quiz_course))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn analyze_course(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(course_id): ApiPath<Uuid>,
) -> ApiResult<Json<TaskExtraction>> {
    Ok(Json(services::extract_tasks(&state, &user, course_id).await?))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn summarize_course(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(course_id): ApiPath<Uuid>,
) -> ApiResult<Json<CourseSummary>> {
    Ok(Json(services::summarize(&state, &user, course_id).await?))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn quiz_course(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(course_id): ApiPath<Uuid>,
) -> ApiResult<Json<Quiz>> {
    Ok(Json(services::generate_quiz(&state, &user, course_id).await?))
}
