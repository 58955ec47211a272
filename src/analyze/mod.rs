//! AI orchestration over a course's uploaded documents: task extraction,
//! summaries and quizzes.

pub mod handlers;
pub mod json_extract;
pub mod prompts;
pub mod services;

use axum::Router;

use crate::state::AppState;

pub use services::{AnswerOption, CourseSummary, Quiz, QuizQuestion, TaskExtraction};

pub fn router() -> Router<AppState> {
    handlers::analyze_routes()
}
