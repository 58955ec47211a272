//! Drives [`AppModel`] from user intents. Every mutation goes to the server
//! first and the affected lists are fetched again afterwards; the model never
//! guesses what the server stored.

use tracing::{debug, warn};
use uuid::Uuid;

use super::api::{ClientError, ClientResult, SchedulerApi, TaskDraft, UploadFile};
use super::quiz::QuizSession;
use super::state::{AppModel, Level, Msg};
use crate::store::{DeadlineRange, TaskPatch};

pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

pub struct Controller<A: SchedulerApi> {
    api: A,
    model: AppModel,
}

impl<A: SchedulerApi> Controller<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            model: AppModel::default(),
        }
    }

    pub fn model(&self) -> &AppModel {
        &self.model
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn dismiss(&mut self, notification_id: u64) {
        self.model.apply(Msg::Dismiss(notification_id));
    }

    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<()> {
        let res = self.api.login(email, password).await;
        let token = self.guard(res)?;
        self.model.apply(Msg::LoggedIn { token });
        let token = self.token()?;
        let res = self.api.me(&token).await;
        let user = self.guard(res)?;
        self.model.apply(Msg::ProfileLoaded(user));
        self.refresh_courses().await?;
        self.refresh_all_tasks().await?;
        self.load_home().await
    }

    pub fn logout(&mut self) {
        self.model.apply(Msg::LoggedOut);
    }

    pub async fn refresh_courses(&mut self) -> ClientResult<()> {
        let token = self.token()?;
        let res = self.api.list_courses(&token).await;
        let courses = self.guard(res)?;
        self.model.apply(Msg::CoursesLoaded(courses));
        Ok(())
    }

    pub async fn refresh_all_tasks(&mut self) -> ClientResult<()> {
        let token = self.token()?;
        let res = self.api.list_tasks(&token, DeadlineRange::default()).await;
        let tasks = self.guard(res)?;
        self.model.apply(Msg::AllTasksLoaded(tasks));
        Ok(())
    }

    pub async fn load_home(&mut self) -> ClientResult<()> {
        let token = self.token()?;
        let res = self.api.home_summary(&token).await;
        let summary = self.guard(res)?;
        self.model.apply(Msg::HomeLoaded(summary));
        Ok(())
    }

    pub async fn create_course(&mut self, name: &str) -> ClientResult<()> {
        let token = self.token()?;
        let res = self.api.create_course(&token, name).await;
        let course = self.guard(res)?;
        self.refresh_courses().await?;
        self.select_course(course.id).await
    }

    pub async fn select_course(&mut self, course_id: Uuid) -> ClientResult<()> {
        self.model.apply(Msg::CourseSelected(Some(course_id)));
        self.reload_course_tasks(course_id).await?;
        let token = self.token()?;
        let res = self.api.list_documents(&token, course_id).await;
        let documents = self.guard(res)?;
        self.model.apply(Msg::DocumentsLoaded {
            course_id,
            documents,
        });
        Ok(())
    }

    pub async fn add_task(&mut self, draft: TaskDraft) -> ClientResult<()> {
        let course_id = self.selected()?;
        let token = self.token()?;
        let res = self.api.create_task(&token, course_id, &draft).await;
        self.guard(res)?;
        self.after_task_change(course_id).await
    }

    pub async fn update_task(&mut self, task_id: Uuid, patch: TaskPatch) -> ClientResult<()> {
        let token = self.token()?;
        let res = self.api.update_task(&token, task_id, patch).await;
        let task = self.guard(res)?;
        self.after_task_change(task.course_id).await
    }

    pub async fn delete_task(&mut self, task_id: Uuid) -> ClientResult<()> {
        let course_id = self.selected()?;
        let token = self.token()?;
        let res = self.api.delete_task(&token, task_id).await;
        self.guard(res)?;
        self.after_task_change(course_id).await
    }

    /// Drag-and-drop: the new order shows immediately; on failure the
    /// server's order is loaded back.
    pub async fn move_task(&mut self, from: usize, to: usize) -> ClientResult<()> {
        let course_id = self.selected()?;
        self.model.apply(Msg::TaskMoved { from, to });
        let order = self.model.task_order();
        let token = self.token()?;

        match self.api.reorder_tasks(&token, &order).await {
            Ok(()) => {
                self.notify(Level::Info, "Task order saved.");
                Ok(())
            }
            Err(ClientError::Unauthorized) => self.guard(Err(ClientError::Unauthorized)),
            Err(e) => {
                warn!(error = %e, "reorder failed; restoring server order");
                self.notify(Level::Error, "Could not save the new order.");
                self.reload_course_tasks(course_id).await?;
                Err(e)
            }
        }
    }

    pub async fn upload(&mut self, files: Vec<UploadFile>) -> ClientResult<()> {
        let course_id = self.selected()?;
        let token = self.token()?;
        let res = self.api.upload_documents(&token, course_id, files).await;
        let stored = self.guard(res)?;
        self.notify(Level::Info, &format!("Uploaded {} file(s).", stored.len()));
        self.select_course(course_id).await
    }

    pub async fn analyze(&mut self) -> ClientResult<()> {
        let course_id = self.selected()?;
        let token = self.token()?;
        let res = self.api.analyze_course(&token, course_id).await;
        let outcome = self.guard(res)?;
        self.notify(Level::Info, &outcome.message);
        self.after_task_change(course_id).await
    }

    pub async fn summarize(&mut self) -> ClientResult<String> {
        let course_id = self.selected()?;
        let token = self.token()?;
        let res = self.api.summarize_course(&token, course_id).await;
        Ok(self.guard(res)?.summary)
    }

    pub async fn start_quiz(&mut self) -> ClientResult<QuizSession> {
        let course_id = self.selected()?;
        let token = self.token()?;
        let res = self.api.quiz_course(&token, course_id).await;
        Ok(QuizSession::new(self.guard(res)?))
    }

    async fn reload_course_tasks(&mut self, course_id: Uuid) -> ClientResult<()> {
        let token = self.token()?;
        let res = self.api.list_course_tasks(&token, course_id).await;
        let tasks = self.guard(res)?;
        self.model.apply(Msg::TasksLoaded { course_id, tasks });
        Ok(())
    }

    async fn after_task_change(&mut self, course_id: Uuid) -> ClientResult<()> {
        if self.model.selected_course_id == Some(course_id) {
            self.reload_course_tasks(course_id).await?;
        }
        self.refresh_all_tasks().await?;
        self.load_home().await
    }

    fn token(&mut self) -> ClientResult<String> {
        match self.model.token() {
            Some(t) => Ok(t.to_string()),
            None => self.guard(Err(ClientError::Unauthorized)),
        }
    }

    fn selected(&mut self) -> ClientResult<Uuid> {
        match self.model.selected_course_id {
            Some(id) => Ok(id),
            None => {
                let err = ClientError::Api {
                    status: 400,
                    message: "Select a course first.".into(),
                };
                self.guard(Err(err))
            }
        }
    }

    /// Turns failures into notifications. A rejected token logs the user out.
    fn guard<T>(&mut self, res: ClientResult<T>) -> ClientResult<T> {
        if let Err(err) = &res {
            match err {
                ClientError::Unauthorized => {
                    debug!("token rejected; logging out");
                    self.notify(Level::Error, SESSION_EXPIRED);
                    self.model.apply(Msg::LoggedOut);
                }
                ClientError::Api { message, .. } => {
                    let message = message.clone();
                    self.notify(Level::Error, &message);
                }
                ClientError::Transport(e) => {
                    warn!(error = %e, "request did not reach the server");
                    self.notify(Level::Error, "Network error, please try again.");
                }
            }
        }
        res
    }

    fn notify(&mut self, level: Level, text: &str) {
        self.model.apply(Msg::Notify {
            level,
            text: text.to_string(),
        });
    }
}
