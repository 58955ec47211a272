//! Client-side application state. Only [`AppModel::apply`] mutates it.

use uuid::Uuid;

use crate::auth::dto::PublicUser;
use crate::store::{Course, DocumentSummary, HomeSummary, Task};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: Option<PublicUser>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppModel {
    pub session: Option<Session>,
    pub courses: Vec<Course>,
    /// Tasks of the selected course, in display order.
    pub tasks: Vec<Task>,
    /// Tasks across every course, for the calendar and the report chart.
    pub all_tasks: Vec<Task>,
    pub documents: Vec<DocumentSummary>,
    pub selected_course_id: Option<Uuid>,
    pub home: Option<HomeSummary>,
    pub notifications: Vec<Notification>,
    next_notification: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    LoggedIn { token: String },
    ProfileLoaded(PublicUser),
    /// Explicit logout or a rejected token.
    LoggedOut,
    CoursesLoaded(Vec<Course>),
    CourseSelected(Option<Uuid>),
    TasksLoaded { course_id: Uuid, tasks: Vec<Task> },
    AllTasksLoaded(Vec<Task>),
    DocumentsLoaded {
        course_id: Uuid,
        documents: Vec<DocumentSummary>,
    },
    HomeLoaded(HomeSummary),
    /// Local drag-and-drop move inside the selected course.
    TaskMoved { from: usize, to: usize },
    Notify { level: Level, text: String },
    Dismiss(u64),
}

impl AppModel {
    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn selected_course(&self) -> Option<&Course> {
        let id = self.selected_course_id?;
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn task_order(&self) -> Vec<Uuid> {
        self.tasks.iter().map(|t| t.id).collect()
    }

    pub fn apply(&mut self, msg: Msg) {
        match msg {
            Msg::LoggedIn { token } => {
                let notifications = std::mem::take(&mut self.notifications);
                let next = self.next_notification;
                *self = AppModel {
                    session: Some(Session { token, user: None }),
                    notifications,
                    next_notification: next,
                    ..AppModel::default()
                };
            }
            Msg::ProfileLoaded(user) => {
                if let Some(session) = self.session.as_mut() {
                    session.user = Some(user);
                }
            }
            Msg::LoggedOut => {
                // Notifications survive so the user can see why.
                let notifications = std::mem::take(&mut self.notifications);
                let next = self.next_notification;
                *self = AppModel {
                    notifications,
                    next_notification: next,
                    ..AppModel::default()
                };
            }
            Msg::CoursesLoaded(courses) => {
                if let Some(id) = self.selected_course_id {
                    if !courses.iter().any(|c| c.id == id) {
                        self.selected_course_id = None;
                        self.tasks.clear();
                        self.documents.clear();
                    }
                }
                self.courses = courses;
            }
            Msg::CourseSelected(id) => {
                if self.selected_course_id != id {
                    self.selected_course_id = id;
                    self.tasks.clear();
                    self.documents.clear();
                }
            }
            Msg::TasksLoaded { course_id, tasks } => {
                // Responses for a course the user already left are stale.
                if self.selected_course_id == Some(course_id) {
                    self.tasks = tasks;
                }
            }
            Msg::AllTasksLoaded(tasks) => self.all_tasks = tasks,
            Msg::DocumentsLoaded {
                course_id,
                documents,
            } => {
                if self.selected_course_id == Some(course_id) {
                    self.documents = documents;
                }
            }
            Msg::HomeLoaded(summary) => self.home = Some(summary),
            Msg::TaskMoved { from, to } => {
                if from < self.tasks.len() && to < self.tasks.len() && from != to {
                    let task = self.tasks.remove(from);
                    self.tasks.insert(to, task);
                    for (i, t) in self.tasks.iter_mut().enumerate() {
                        t.order_index = i as i32;
                    }
                }
            }
            Msg::Notify { level, text } => {
                self.next_notification += 1;
                self.notifications.push(Notification {
                    id: self.next_notification,
                    level,
                    text,
                });
            }
            Msg::Dismiss(id) => self.notifications.retain(|n| n.id != id),
        }
    }
}
