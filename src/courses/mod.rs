mod dto;
pub mod handlers;
mod repo;

use axum::Router;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiResult, AppError},
    state::AppState,
    store::Course,
};

pub fn router() -> Router<AppState> {
    handlers::course_routes()
}

/// Loads the course if `user` owns it. Foreign and unknown courses look the
/// same (404).
pub(crate) async fn require_owned_course(
    state: &AppState,
    user: &AuthUser,
    course_id: Uuid,
) -> ApiResult<Course> {
    state
        .repo
        .find_owned_course(user.id, course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))
}
