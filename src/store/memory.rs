use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{
    Course, CourseRepo, DeadlineRange, Document, DocumentRepo, DocumentSummary, HomeSummary,
    NewDocument, NewTask, NewUser, ProfilePatch, ReorderOutcome, Task, TaskPatch, TaskRepo, User,
    UserRepo,
};

/// In-process store with the same observable semantics as the Postgres one.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_batch_write: Option<usize>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    courses: Vec<Course>,
    tasks: Vec<Task>,
    documents: Vec<Document>,
}

impl Inner {
    fn owned_course_ids(&self, owner_id: Uuid) -> HashSet<Uuid> {
        self.courses
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .map(|c| c.id)
            .collect()
    }

    fn next_order_index(&self, course_id: Uuid) -> i32 {
        self.tasks
            .iter()
            .filter(|t| t.course_id == course_id)
            .map(|t| t.order_index + 1)
            .max()
            .unwrap_or(0)
    }

    fn push_task(&mut self, course_id: Uuid, owner_id: Uuid, new: NewTask) -> Task {
        let task = Task {
            id: Uuid::new_v4(),
            title: new.title,
            deadline: new.deadline,
            completed: false,
            course_id,
            owner_id: Some(owner_id),
            estimated_time: new.estimated_time,
            actual_time: 0,
            task_type: new.task_type,
            order_index: self.next_order_index(course_id),
        };
        self.tasks.push(task.clone());
        task
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `n`-th row write (zero based) of every reorder and task
    /// batch fail, as a lost connection would halfway through a transaction.
    pub fn failing_batch_write_at(n: usize) -> Self {
        Self {
            fail_batch_write: Some(n),
            ..Self::default()
        }
    }

    fn batch_write(&self, n: usize) -> anyhow::Result<()> {
        match self.fail_batch_write {
            Some(at) if at == n => anyhow::bail!("batch write {n} failed"),
            _ => Ok(()),
        }
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store poisoned"))
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create_user(&self, new: NewUser) -> anyhow::Result<Option<User>> {
        let mut inner = self.lock()?;
        if inner.users.iter().any(|u| u.email == new.email) {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            university: new.university,
            department: new.department,
            avatar_url: None,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.push(user.clone());
        Ok(Some(user))
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> anyhow::Result<Option<User>> {
        let mut inner = self.lock()?;
        let Some(user) = inner.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if patch.university.is_some() {
            user.university = patch.university;
        }
        if patch.department.is_some() {
            user.department = patch.department;
        }
        if patch.avatar_url.is_some() {
            user.avatar_url = patch.avatar_url;
        }
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl CourseRepo for MemoryStore {
    async fn list_courses(&self, owner_id: Uuid) -> anyhow::Result<Vec<Course>> {
        Ok(self
            .lock()?
            .courses
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create_course(&self, owner_id: Uuid, name: &str) -> anyhow::Result<Course> {
        let course = Course {
            id: Uuid::new_v4(),
            name: name.to_string(),
            owner_id,
            created_at: OffsetDateTime::now_utc(),
        };
        self.lock()?.courses.push(course.clone());
        Ok(course)
    }

    async fn find_owned_course(
        &self,
        owner_id: Uuid,
        course_id: Uuid,
    ) -> anyhow::Result<Option<Course>> {
        Ok(self
            .lock()?
            .courses
            .iter()
            .find(|c| c.id == course_id && c.owner_id == owner_id)
            .cloned())
    }
}

#[async_trait]
impl TaskRepo for MemoryStore {
    async fn list_course_tasks(&self, course_id: Uuid) -> anyhow::Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .lock()?
            .tasks
            .iter()
            .filter(|t| t.course_id == course_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.order_index, t.id));
        Ok(tasks)
    }

    async fn list_user_tasks(
        &self,
        owner_id: Uuid,
        range: DeadlineRange,
    ) -> anyhow::Result<Vec<Task>> {
        let inner = self.lock()?;
        let owned = inner.owned_course_ids(owner_id);
        let mut tasks: Vec<Task> = inner
            .tasks
            .iter()
            .filter(|t| owned.contains(&t.course_id) && range.contains(t.deadline))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.deadline.is_none(), t.deadline, t.order_index, t.id));
        Ok(tasks)
    }

    async fn create_task(
        &self,
        course_id: Uuid,
        owner_id: Uuid,
        new: NewTask,
    ) -> anyhow::Result<Task> {
        Ok(self.lock()?.push_task(course_id, owner_id, new))
    }

    async fn insert_tasks_batch(
        &self,
        course_id: Uuid,
        owner_id: Uuid,
        tasks: Vec<NewTask>,
    ) -> anyhow::Result<usize> {
        let mut inner = self.lock()?;
        let before = inner.tasks.len();
        let count = tasks.len();
        for (n, new) in tasks.into_iter().enumerate() {
            if let Err(err) = self.batch_write(n) {
                inner.tasks.truncate(before);
                return Err(err);
            }
            inner.push_task(course_id, owner_id, new);
        }
        Ok(count)
    }

    async fn find_owned_task(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
    ) -> anyhow::Result<Option<Task>> {
        let inner = self.lock()?;
        let owned = inner.owned_course_ids(owner_id);
        Ok(inner
            .tasks
            .iter()
            .find(|t| t.id == task_id && owned.contains(&t.course_id))
            .cloned())
    }

    async fn update_task(&self, task_id: Uuid, patch: TaskPatch) -> anyhow::Result<Option<Task>> {
        let mut inner = self.lock()?;
        let Some(task) = inner.tasks.iter_mut().find(|t| t.id == task_id) else {
            return Ok(None);
        };
        patch.apply_to(task);
        Ok(Some(task.clone()))
    }

    async fn delete_owned_task(&self, owner_id: Uuid, task_id: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.lock()?;
        let owned = inner.owned_course_ids(owner_id);
        let before = inner.tasks.len();
        inner
            .tasks
            .retain(|t| !(t.id == task_id && owned.contains(&t.course_id)));
        Ok(inner.tasks.len() != before)
    }

    async fn reorder_tasks(
        &self,
        owner_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> anyhow::Result<ReorderOutcome> {
        let mut inner = self.lock()?;
        let owned = inner.owned_course_ids(owner_id);

        // Validate everything before touching a single row.
        let mut courses = HashSet::new();
        for id in ordered_ids {
            match inner
                .tasks
                .iter()
                .find(|t| t.id == *id && owned.contains(&t.course_id))
            {
                Some(t) => {
                    courses.insert(t.course_id);
                }
                None => return Ok(ReorderOutcome::UnknownTask(*id)),
            }
        }
        if courses.len() > 1 {
            return Ok(ReorderOutcome::MixedCourses);
        }

        let mut staged = Vec::with_capacity(ordered_ids.len());
        for (position, id) in ordered_ids.iter().enumerate() {
            self.batch_write(position)?;
            staged.push((*id, i32::try_from(position)?));
        }
        for (id, index) in staged {
            if let Some(task) = inner.tasks.iter_mut().find(|t| t.id == id) {
                task.order_index = index;
            }
        }
        Ok(ReorderOutcome::Applied(ordered_ids.len()))
    }

    async fn home_summary(&self, owner_id: Uuid, today: Date) -> anyhow::Result<HomeSummary> {
        let inner = self.lock()?;
        let owned = inner.owned_course_ids(owner_id);
        let mine = inner.tasks.iter().filter(|t| owned.contains(&t.course_id));
        let mut due_today = 0;
        let mut study_time = 0i64;
        for t in mine {
            if !t.completed && t.deadline == Some(today) {
                due_today += 1;
            }
            if t.completed {
                study_time += i64::from(t.actual_time);
            }
        }
        Ok(HomeSummary {
            course_count: owned.len() as i64,
            tasks_due_today_count: due_today,
            total_study_time: study_time,
        })
    }
}

#[async_trait]
impl DocumentRepo for MemoryStore {
    async fn insert_documents(
        &self,
        course_id: Uuid,
        docs: Vec<NewDocument>,
    ) -> anyhow::Result<Vec<DocumentSummary>> {
        let mut inner = self.lock()?;
        let now = OffsetDateTime::now_utc();
        let mut out = Vec::with_capacity(docs.len());
        for d in docs {
            let doc = Document {
                id: Uuid::new_v4(),
                course_id,
                file_name: d.file_name,
                file_type: d.file_type,
                upload_date: now,
                text_content: Some(d.text_content),
            };
            out.push(DocumentSummary::from(&doc));
            inner.documents.push(doc);
        }
        Ok(out)
    }

    async fn list_documents(&self, course_id: Uuid) -> anyhow::Result<Vec<DocumentSummary>> {
        Ok(self
            .lock()?
            .documents
            .iter()
            .filter(|d| d.course_id == course_id)
            .map(DocumentSummary::from)
            .collect())
    }

    async fn load_document_texts(&self, course_id: Uuid) -> anyhow::Result<Vec<String>> {
        Ok(self
            .lock()?
            .documents
            .iter()
            .filter(|d| d.course_id == course_id)
            .filter_map(|d| d.text_content.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    async fn seeded() -> (MemoryStore, Uuid, Uuid) {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let course = store.create_course(owner, "Algorithms").await.unwrap();
        (store, owner, course.id)
    }

    #[tokio::test]
    async fn new_tasks_are_appended_to_course_order() {
        let (store, owner, course) = seeded().await;
        let a = store
            .create_task(course, owner, NewTask::titled("a"))
            .await
            .unwrap();
        let b = store
            .create_task(course, owner, NewTask::titled("b"))
            .await
            .unwrap();
        assert_eq!(a.order_index, 0);
        assert_eq!(b.order_index, 1);
        assert_eq!(b.owner_id, Some(owner));
    }

    #[tokio::test]
    async fn reorder_rejects_foreign_task_without_changes() {
        let (store, owner, course) = seeded().await;
        let a = store
            .create_task(course, owner, NewTask::titled("a"))
            .await
            .unwrap();
        let stranger = Uuid::new_v4();
        let outcome = store.reorder_tasks(owner, &[stranger, a.id]).await.unwrap();
        assert_eq!(outcome, ReorderOutcome::UnknownTask(stranger));

        // Another user cannot reorder my tasks either.
        let outcome = store.reorder_tasks(Uuid::new_v4(), &[a.id]).await.unwrap();
        assert_eq!(outcome, ReorderOutcome::UnknownTask(a.id));
        let tasks = store.list_course_tasks(course).await.unwrap();
        assert_eq!(tasks[0].order_index, 0);
    }

    #[tokio::test]
    async fn reorder_rejects_mixed_courses() {
        let (store, owner, course) = seeded().await;
        let other = store.create_course(owner, "Databases").await.unwrap();
        let a = store
            .create_task(course, owner, NewTask::titled("a"))
            .await
            .unwrap();
        let b = store
            .create_task(other.id, owner, NewTask::titled("b"))
            .await
            .unwrap();
        let outcome = store.reorder_tasks(owner, &[a.id, b.id]).await.unwrap();
        assert_eq!(outcome, ReorderOutcome::MixedCourses);
    }

    #[tokio::test]
    async fn failed_reorder_write_keeps_previous_order() {
        let store = MemoryStore::failing_batch_write_at(1);
        let owner = Uuid::new_v4();
        let course = store.create_course(owner, "Algorithms").await.unwrap().id;
        let mut ids = Vec::new();
        for title in ["a", "b", "c"] {
            let task = store
                .create_task(course, owner, NewTask::titled(title))
                .await
                .unwrap();
            ids.push(task.id);
        }

        assert!(store
            .reorder_tasks(owner, &[ids[2], ids[1], ids[0]])
            .await
            .is_err());
        let order: Vec<_> = store
            .list_course_tasks(course)
            .await
            .unwrap()
            .iter()
            .map(|t| (t.id, t.order_index))
            .collect();
        assert_eq!(order, vec![(ids[0], 0), (ids[1], 1), (ids[2], 2)]);
    }

    #[tokio::test]
    async fn failed_batch_insert_stores_nothing() {
        let store = MemoryStore::failing_batch_write_at(2);
        let owner = Uuid::new_v4();
        let course = store.create_course(owner, "Algorithms").await.unwrap().id;
        store
            .create_task(course, owner, NewTask::titled("existing"))
            .await
            .unwrap();

        let batch: Vec<NewTask> = ["a", "b", "c"]
            .into_iter()
            .map(|t| NewTask::titled(t))
            .collect();
        assert!(store.insert_tasks_batch(course, owner, batch).await.is_err());
        let tasks = store.list_course_tasks(course).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "existing");
    }

    #[tokio::test]
    async fn summary_counts_only_owned_courses() {
        let (store, owner, course) = seeded().await;
        let today = date!(2025 - 10 - 01);
        let mut due = NewTask::titled("due");
        due.deadline = Some(today);
        store.create_task(course, owner, due).await.unwrap();
        let done = store
            .create_task(course, owner, NewTask::titled("done"))
            .await
            .unwrap();
        store
            .update_task(
                done.id,
                TaskPatch {
                    completed: Some(true),
                    actual_time: Some(45),
                },
            )
            .await
            .unwrap();

        let someone_else = Uuid::new_v4();
        store.create_course(someone_else, "Other").await.unwrap();

        let summary = store.home_summary(owner, today).await.unwrap();
        assert_eq!(
            summary,
            HomeSummary {
                course_count: 1,
                tasks_due_today_count: 1,
                total_study_time: 45,
            }
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_not_created() {
        let store = MemoryStore::new();
        let new = NewUser {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            password_hash: "h".into(),
            university: None,
            department: None,
        };
        assert!(store.create_user(new.clone()).await.unwrap().is_some());
        assert!(store.create_user(new).await.unwrap().is_none());
    }
}
