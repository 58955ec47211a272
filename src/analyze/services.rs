use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::json_extract::parse_reply;
use super::prompts::{build_prompt, Mode};
use crate::{
    auth::AuthUser,
    courses::require_owned_course,
    error::{ApiResult, AppError},
    state::AppState,
    store::{parse_date, NewTask},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskExtraction {
    pub message: String,
    pub created: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSummary {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub title: String,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    #[serde(default)]
    pub hint: String,
    pub answer_options: Vec<AnswerOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub text: String,
    pub is_correct: bool,
    #[serde(default)]
    pub rationale: String,
}

impl Quiz {
    /// Structural checks the client relies on when scoring.
    pub fn check(&self) -> Result<(), String> {
        if self.questions.is_empty() {
            return Err("quiz has no questions".into());
        }
        for (i, q) in self.questions.iter().enumerate() {
            if q.answer_options.is_empty() {
                return Err(format!("question {i} has no answer options"));
            }
            let correct = q.answer_options.iter().filter(|o| o.is_correct).count();
            if correct != 1 {
                return Err(format!("question {i} has {correct} correct options"));
            }
        }
        Ok(())
    }
}

/// Runs task extraction over every document of the course and stores the
/// usable items in one batch.
pub async fn extract_tasks(
    state: &AppState,
    user: &AuthUser,
    course_id: Uuid,
) -> ApiResult<TaskExtraction> {
    let reply = ask(state, user, course_id, Mode::Tasks).await?;
    let (tasks, skipped) = tasks_from_reply(&reply).map_err(|detail| malformed(Mode::Tasks, detail))?;

    let created = if tasks.is_empty() {
        0
    } else {
        state
            .repo
            .insert_tasks_batch(course_id, user.id, tasks)
            .await?
    };
    info!(%course_id, created, skipped, "tasks extracted from documents");

    Ok(TaskExtraction {
        message: format!("AI analysis complete. Added {created} tasks."),
        created,
        skipped,
    })
}

pub async fn summarize(
    state: &AppState,
    user: &AuthUser,
    course_id: Uuid,
) -> ApiResult<CourseSummary> {
    let reply = ask(state, user, course_id, Mode::Summary).await?;
    let summary = reply.trim();
    if summary.is_empty() {
        return Err(malformed(Mode::Summary, "empty summary".into()));
    }
    Ok(CourseSummary {
        summary: summary.to_string(),
    })
}

pub async fn generate_quiz(state: &AppState, user: &AuthUser, course_id: Uuid) -> ApiResult<Quiz> {
    let reply = ask(state, user, course_id, Mode::Quiz).await?;
    quiz_from_reply(&reply).map_err(|detail| malformed(Mode::Quiz, detail))
}

/// Ownership check, document loading and the generator round trip shared by
/// every mode.
async fn ask(state: &AppState, user: &AuthUser, course_id: Uuid, mode: Mode) -> ApiResult<String> {
    require_owned_course(state, user, course_id).await?;

    let texts = state.repo.load_document_texts(course_id).await?;
    if texts.is_empty() {
        return Err(AppError::not_found(
            "No documents have been uploaded for this course.",
        ));
    }

    let prompt = build_prompt(mode, &texts, OffsetDateTime::now_utc().year());
    state
        .ai
        .generate(&prompt)
        .await
        .map_err(|source| AppError::Upstream {
            public: mode.failure_message(),
            source,
        })
}

fn malformed(mode: Mode, detail: String) -> AppError {
    warn!(?mode, %detail, "unusable AI reply");
    AppError::MalformedAiResponse {
        public: mode.failure_message(),
        detail,
    }
}

/// Splits the reply into storable tasks and the number of skipped items.
pub fn tasks_from_reply(reply: &str) -> Result<(Vec<NewTask>, usize), String> {
    let value: Value = parse_reply(reply).map_err(|e| e.to_string())?;
    let Value::Array(items) = value else {
        return Err("reply is not a JSON array".into());
    };

    let total = items.len();
    let tasks: Vec<NewTask> = items.iter().filter_map(task_from_item).collect();
    let skipped = total - tasks.len();
    Ok((tasks, skipped))
}

fn task_from_item(item: &Value) -> Option<NewTask> {
    let title = item.get("title")?.as_str()?.trim();
    if title.is_empty() {
        return None;
    }
    let deadline = parse_date(item.get("deadline")?.as_str()?)?;
    let estimated_time = item
        .get("estimatedTime")
        .and_then(Value::as_f64)
        .filter(|m| m.is_finite() && *m >= 0.0 && *m <= f64::from(i32::MAX))
        .map(|m| m.round() as i32);

    Some(NewTask {
        deadline: Some(deadline),
        estimated_time,
        ..NewTask::titled(title)
    })
}

pub fn quiz_from_reply(reply: &str) -> Result<Quiz, String> {
    let quiz: Quiz = parse_reply(reply).map_err(|e| e.to_string())?;
    quiz.check()?;
    Ok(quiz)
}
