pub mod extract;
pub mod handlers;
mod repo;

use axum::Router;

use crate::{config::UploadConfig, state::AppState};

pub fn router(upload: &UploadConfig) -> Router<AppState> {
    handlers::document_routes(upload)
}
