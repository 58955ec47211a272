use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, UpdateProfileRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
    },
    error::{ApiJson, ApiResult, AppError},
    state::AppState,
    store::{NewUser, ProfilePatch},
    validation::{is_valid_email, non_blank, required},
};

/// Same answer for "no such user" and "wrong password".
pub const INVALID_LOGIN: &str = "Email or password is incorrect.";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me).patch(update_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    const MISSING: &str = "Name, email and password are required.";
    let name = required(payload.name, MISSING)?;
    let email = required(payload.email, MISSING)?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation(MISSING))?;

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }

    if state.repo.find_user_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&password)?;
    let user = state
        .repo
        .create_user(NewUser {
            name,
            email,
            password_hash,
            university: non_blank(payload.university),
            department: non_blank(payload.department),
        })
        .await?
        // Lost a race against a concurrent registration.
        .ok_or_else(|| AppError::Conflict("Email already registered".into()))?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    const MISSING: &str = "Email and password are required.";
    let email = required(payload.email, MISSING)?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation(MISSING))?;

    let Some(user) = state.repo.find_user_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::Unauthorized(INVALID_LOGIN.into()));
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized(INVALID_LOGIN.into()));
    }

    let token = JwtKeys::from_ref(&state).sign(user.id, &user.name)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        token,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<PublicUser>> {
    let found = state
        .repo
        .find_user_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(PublicUser::from(found)))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<PublicUser>> {
    let patch = ProfilePatch {
        university: payload.university,
        department: payload.department,
        avatar_url: payload.avatar_url,
    };
    if patch.is_empty() {
        return Err(AppError::validation("No updatable field provided."));
    }
    let updated = state
        .repo
        .update_profile(user.id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(PublicUser::from(updated)))
}
