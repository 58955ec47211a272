use axum::{extract::State, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    auth::AuthUser,
    error::ApiResult,
    state::AppState,
    store::HomeSummary,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/home/summary", get(home_summary))
}

/// Dashboard counters. "Today" is the current UTC date.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn home_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<HomeSummary>> {
    let today = OffsetDateTime::now_utc().date();
    Ok(Json(state.repo.home_summary(user.id, today).await?))
}
