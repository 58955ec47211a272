//! Persistence ports.
//!
//! Handlers only talk to [`Repository`]. The Postgres implementation lives
//! next to each feature (`auth::repo`, `courses::repo`, ...) on
//! [`crate::db::PgStore`]; [`memory::MemoryStore`] backs tests and
//! `AppState::fake`.

pub mod memory;
pub mod models;

use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

pub use models::*;

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Returns `None` when the email is already registered.
    async fn create_user(&self, new: NewUser) -> anyhow::Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> anyhow::Result<Option<User>>;
}

#[async_trait]
pub trait CourseRepo: Send + Sync {
    async fn list_courses(&self, owner_id: Uuid) -> anyhow::Result<Vec<Course>>;
    async fn create_course(&self, owner_id: Uuid, name: &str) -> anyhow::Result<Course>;
    async fn find_owned_course(
        &self,
        owner_id: Uuid,
        course_id: Uuid,
    ) -> anyhow::Result<Option<Course>>;
}

#[async_trait]
pub trait TaskRepo: Send + Sync {
    /// Ordered by `order_index`, then `id`.
    async fn list_course_tasks(&self, course_id: Uuid) -> anyhow::Result<Vec<Task>>;
    /// Tasks in every course owned by `owner_id`, filtered by deadline.
    async fn list_user_tasks(
        &self,
        owner_id: Uuid,
        range: DeadlineRange,
    ) -> anyhow::Result<Vec<Task>>;
    async fn create_task(
        &self,
        course_id: Uuid,
        owner_id: Uuid,
        new: NewTask,
    ) -> anyhow::Result<Task>;
    /// Inserts every task or none of them. Returns the number inserted.
    async fn insert_tasks_batch(
        &self,
        course_id: Uuid,
        owner_id: Uuid,
        tasks: Vec<NewTask>,
    ) -> anyhow::Result<usize>;
    /// A task is "owned" when its course is owned by `owner_id`.
    async fn find_owned_task(&self, owner_id: Uuid, task_id: Uuid)
        -> anyhow::Result<Option<Task>>;
    async fn update_task(&self, task_id: Uuid, patch: TaskPatch) -> anyhow::Result<Option<Task>>;
    /// Returns whether a row was removed.
    async fn delete_owned_task(&self, owner_id: Uuid, task_id: Uuid) -> anyhow::Result<bool>;
    /// Assigns `order_index = position` atomically.
    async fn reorder_tasks(
        &self,
        owner_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> anyhow::Result<ReorderOutcome>;
    async fn home_summary(&self, owner_id: Uuid, today: Date) -> anyhow::Result<HomeSummary>;
}

#[async_trait]
pub trait DocumentRepo: Send + Sync {
    /// Stores every document or none of them.
    async fn insert_documents(
        &self,
        course_id: Uuid,
        docs: Vec<NewDocument>,
    ) -> anyhow::Result<Vec<DocumentSummary>>;
    async fn list_documents(&self, course_id: Uuid) -> anyhow::Result<Vec<DocumentSummary>>;
    /// Extracted text of every document of the course, in storage order.
    async fn load_document_texts(&self, course_id: Uuid) -> anyhow::Result<Vec<String>>;
}

pub trait Repository: UserRepo + CourseRepo + TaskRepo + DocumentRepo {}

impl<T> Repository for T where T: UserRepo + CourseRepo + TaskRepo + DocumentRepo {}
