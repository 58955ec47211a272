use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Calendar dates travel as `YYYY-MM-DD` everywhere (API bodies, query
/// strings, AI replies).
pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), DATE_FORMAT).ok()
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String, // argon2 PHC string
    pub university: Option<String>,
    pub department: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub university: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub university: Option<String>,
    pub department: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.university.is_none() && self.department.is_none() && self.avatar_url.is_none()
    }
}

/// A course (the "group" owning tasks and documents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(with = "iso_date::option", default)]
    pub deadline: Option<Date>,
    pub completed: bool,
    pub course_id: Uuid,
    pub owner_id: Option<Uuid>,
    pub estimated_time: Option<i32>, // minutes
    pub actual_time: i32,            // minutes
    pub task_type: String,
    pub order_index: i32,
}

pub const DEFAULT_TASK_TYPE: &str = "other";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub deadline: Option<Date>,
    pub estimated_time: Option<i32>,
    pub task_type: String,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            deadline: None,
            estimated_time: None,
            task_type: DEFAULT_TASK_TYPE.to_string(),
        }
    }
}

/// Partial task update. Only these two attributes are writable after creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub completed: Option<bool>,
    pub actual_time: Option<i32>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.completed.is_none() && self.actual_time.is_none()
    }

    pub fn apply_to(&self, task: &mut Task) {
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(actual) = self.actual_time {
            task.actual_time = actual;
        }
    }
}

/// Inclusive deadline filter. An open bound matches everything on that side;
/// with any bound set, tasks without a deadline never match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeadlineRange {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl DeadlineRange {
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, deadline: Option<Date>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(d) = deadline else {
            return false;
        };
        self.start.map_or(true, |s| d >= s) && self.end.map_or(true, |e| d <= e)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub course_id: Uuid,
    pub file_name: String,
    pub file_type: Option<String>,
    pub upload_date: OffsetDateTime,
    pub text_content: Option<String>,
}

/// What clients get to see about a document: never the extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: Uuid,
    pub file_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub upload_date: OffsetDateTime,
}

impl From<&Document> for DocumentSummary {
    fn from(d: &Document) -> Self {
        Self {
            id: d.id,
            file_name: d.file_name.clone(),
            upload_date: d.upload_date,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub file_name: String,
    pub file_type: Option<String>,
    pub text_content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeSummary {
    pub course_count: i64,
    pub tasks_due_today_count: i64,
    pub total_study_time: i64, // minutes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    Applied(usize),
    /// The id is not a task in one of the requester's courses.
    UnknownTask(Uuid),
    /// The ids belong to more than one course.
    MixedCourses,
}
