use std::collections::HashSet;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{MessageResponse, PatchTaskRequest, ReorderRequest, TaskRangeQuery};
use crate::{
    auth::AuthUser,
    error::{ApiJson, ApiPath, ApiQuery, ApiResult, AppError},
    state::AppState,
    store::{parse_date, DeadlineRange, ReorderOutcome, Task, TaskPatch},
    validation::non_blank,
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks))
        .route("/tasks/reorder", post(reorder_tasks))
        .route("/tasks/:task_id", patch(update_task).delete(delete_task))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_tasks(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<TaskRangeQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let range = range_from(query)?;
    Ok(Json(state.repo.list_user_tasks(user.id, range).await?))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_task(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(task_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<PatchTaskRequest>,
) -> ApiResult<Json<Task>> {
    let patch = patch_from(payload)?;

    if state.repo.find_owned_task(user.id, task_id).await?.is_none() {
        return Err(AppError::not_found("Task not found"));
    }
    let task = state
        .repo
        .update_task(task_id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("Task not found"))?;
    Ok(Json(task))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(task_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    let removed = state.repo.delete_owned_task(user.id, task_id).await?;
    if removed {
        info!(%task_id, "task deleted");
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn reorder_tasks(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<ReorderRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let ids = payload.ordered_task_ids.unwrap_or_default();
    check_reorder_ids(&ids)?;

    match state.repo.reorder_tasks(user.id, &ids).await? {
        ReorderOutcome::Applied(count) => {
            info!(count, "tasks reordered");
            Ok(Json(MessageResponse {
                message: "Task order updated.".into(),
            }))
        }
        ReorderOutcome::UnknownTask(id) => {
            warn!(task_id = %id, "reorder refers to a task outside the caller's courses");
            Err(AppError::not_found("Task not found"))
        }
        ReorderOutcome::MixedCourses => Err(AppError::validation(
            "orderedTaskIds must all belong to the same course",
        )),
    }
}

fn range_from(query: TaskRangeQuery) -> Result<DeadlineRange, AppError> {
    let bound = |raw: Option<String>, name: &str| -> Result<_, AppError> {
        non_blank(raw)
            .map(|s| {
                parse_date(&s)
                    .ok_or_else(|| AppError::validation(format!("{name} must be a YYYY-MM-DD date")))
            })
            .transpose()
    };
    Ok(DeadlineRange {
        start: bound(query.start, "start")?,
        end: bound(query.end, "end")?,
    })
}

fn patch_from(payload: PatchTaskRequest) -> Result<TaskPatch, AppError> {
    let actual_time = match payload.actual_time() {
        Some(m) if m < 0.0 => {
            return Err(AppError::validation("actualTime must not be negative"))
        }
        Some(m) if m > f64::from(i32::MAX) => {
            return Err(AppError::validation("actualTime is too large"))
        }
        Some(m) => Some(m as i32),
        None => None,
    };
    let patch = TaskPatch {
        completed: payload.completed(),
        actual_time,
    };
    if patch.is_empty() {
        return Err(AppError::validation(
            "Provide at least one of completed or actualTime.",
        ));
    }
    Ok(patch)
}

fn check_reorder_ids(ids: &[Uuid]) -> Result<(), AppError> {
    if ids.is_empty() {
        return Err(AppError::validation("orderedTaskIds must not be empty"));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    if !ids.iter().all(|id| seen.insert(*id)) {
        return Err(AppError::validation("orderedTaskIds contains duplicates"));
    }
    Ok(())
}
