use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{CreateCourseRequest, CreateTaskRequest};
use super::require_owned_course;
use crate::{
    auth::AuthUser,
    error::{ApiJson, ApiPath, ApiResult, AppError},
    state::AppState,
    store::{parse_date, Course, NewTask, Task, DEFAULT_TASK_TYPE},
    validation::{non_blank, required},
};

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/:course_id/tasks",
            get(list_course_tasks).post(create_course_task),
        )
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_courses(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(state.repo.list_courses(user.id).await?))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_course(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateCourseRequest>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    let name = required(payload.name, "Course name is required.")?;
    let course = state.repo.create_course(user.id, &name).await?;
    info!(course_id = %course.id, "course created");
    Ok((StatusCode::CREATED, Json(course)))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_course_tasks(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(course_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    require_owned_course(&state, &user, course_id).await?;
    Ok(Json(state.repo.list_course_tasks(course_id).await?))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_course_task(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(course_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let new = new_task_from(payload)?;
    require_owned_course(&state, &user, course_id).await?;
    let task = state.repo.create_task(course_id, user.id, new).await?;
    info!(task_id = %task.id, %course_id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

fn new_task_from(payload: CreateTaskRequest) -> Result<NewTask, AppError> {
    let title = required(payload.title, "Task title is required.")?;
    let deadline = match non_blank(payload.deadline) {
        Some(raw) => Some(
            parse_date(&raw)
                .ok_or_else(|| AppError::validation("deadline must be a YYYY-MM-DD date"))?,
        ),
        None => None,
    };
    if payload.estimated_time.is_some_and(|m| m < 0) {
        return Err(AppError::validation("estimatedTime must not be negative"));
    }
    Ok(NewTask {
        title,
        deadline,
        estimated_time: payload.estimated_time,
        task_type: non_blank(payload.task_type).unwrap_or_else(|| DEFAULT_TASK_TYPE.to_string()),
    })
}
