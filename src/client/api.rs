//! Typed HTTP client for the REST API.

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::analyze::{CourseSummary, Quiz, TaskExtraction};
use crate::auth::dto::{LoginResponse, PublicUser};
use crate::store::{Course, DeadlineRange, DocumentSummary, HomeSummary, Task, TaskPatch, DATE_FORMAT};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Missing, expired or rejected token. The session is no longer usable.
    #[error("not authenticated")]
    Unauthorized,
    #[error("request failed with {status}: {message}")]
    Api { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Body of `POST /courses/:id/tasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: String,
    pub data: Vec<u8>,
}

/// Every call the front end makes. Implemented over HTTP by
/// [`SchedulerClient`]; tests substitute a scripted fake.
#[async_trait]
pub trait SchedulerApi: Send + Sync {
    async fn register(&self, name: &str, email: &str, password: &str) -> ClientResult<PublicUser>;
    async fn login(&self, email: &str, password: &str) -> ClientResult<String>;
    async fn me(&self, token: &str) -> ClientResult<PublicUser>;
    async fn list_courses(&self, token: &str) -> ClientResult<Vec<Course>>;
    async fn create_course(&self, token: &str, name: &str) -> ClientResult<Course>;
    async fn list_course_tasks(&self, token: &str, course_id: Uuid) -> ClientResult<Vec<Task>>;
    async fn create_task(&self, token: &str, course_id: Uuid, draft: &TaskDraft)
        -> ClientResult<Task>;
    async fn list_tasks(&self, token: &str, range: DeadlineRange) -> ClientResult<Vec<Task>>;
    async fn update_task(&self, token: &str, task_id: Uuid, patch: TaskPatch) -> ClientResult<Task>;
    async fn delete_task(&self, token: &str, task_id: Uuid) -> ClientResult<()>;
    async fn reorder_tasks(&self, token: &str, ordered_ids: &[Uuid]) -> ClientResult<()>;
    async fn list_documents(&self, token: &str, course_id: Uuid)
        -> ClientResult<Vec<DocumentSummary>>;
    async fn upload_documents(
        &self,
        token: &str,
        course_id: Uuid,
        files: Vec<UploadFile>,
    ) -> ClientResult<Vec<DocumentSummary>>;
    async fn analyze_course(&self, token: &str, course_id: Uuid) -> ClientResult<TaskExtraction>;
    async fn summarize_course(&self, token: &str, course_id: Uuid) -> ClientResult<CourseSummary>;
    async fn quiz_course(&self, token: &str, course_id: Uuid) -> ClientResult<Quiz>;
    async fn home_summary(&self, token: &str) -> ClientResult<HomeSummary>;
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct SchedulerClient {
    http: Client,
    base_url: String,
}

impl SchedulerClient {
    /// `base_url` points at the API root, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<T> {
        let res = check(req.send().await?).await?;
        Ok(res.json::<T>().await?)
    }

    async fn send_empty(&self, req: RequestBuilder) -> ClientResult<()> {
        check(req.send().await?).await?;
        Ok(())
    }
}

/// Maps non-success statuses to [`ClientError`], reading the server's
/// `{message}` body when there is one.
async fn check(res: Response) -> ClientResult<Response> {
    let status = res.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }
    if status.is_success() {
        return Ok(res);
    }
    Err(api_error(res).await)
}

async fn api_error(res: Response) -> ClientError {
    let status = res.status();
    let message = match res.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl SchedulerApi for SchedulerClient {
    async fn register(&self, name: &str, email: &str, password: &str) -> ClientResult<PublicUser> {
        let body = json!({ "name": name, "email": email, "password": password });
        self.send(self.http.post(self.url("/users/register")).json(&body))
            .await
    }

    async fn login(&self, email: &str, password: &str) -> ClientResult<String> {
        let body = json!({ "email": email, "password": password });
        let res = self
            .http
            .post(self.url("/users/login"))
            .json(&body)
            .send()
            .await?;
        // A 401 here means bad credentials, not an expired session.
        if !res.status().is_success() {
            return Err(api_error(res).await);
        }
        Ok(res.json::<LoginResponse>().await?.token)
    }

    async fn me(&self, token: &str) -> ClientResult<PublicUser> {
        self.send(self.http.get(self.url("/users/me")).bearer_auth(token))
            .await
    }

    async fn list_courses(&self, token: &str) -> ClientResult<Vec<Course>> {
        self.send(self.http.get(self.url("/courses")).bearer_auth(token))
            .await
    }

    async fn create_course(&self, token: &str, name: &str) -> ClientResult<Course> {
        let req = self
            .http
            .post(self.url("/courses"))
            .bearer_auth(token)
            .json(&json!({ "name": name }));
        self.send(req).await
    }

    async fn list_course_tasks(&self, token: &str, course_id: Uuid) -> ClientResult<Vec<Task>> {
        let req = self
            .http
            .get(self.url(&format!("/courses/{course_id}/tasks")))
            .bearer_auth(token);
        self.send(req).await
    }

    async fn create_task(
        &self,
        token: &str,
        course_id: Uuid,
        draft: &TaskDraft,
    ) -> ClientResult<Task> {
        let req = self
            .http
            .post(self.url(&format!("/courses/{course_id}/tasks")))
            .bearer_auth(token)
            .json(draft);
        self.send(req).await
    }

    async fn list_tasks(&self, token: &str, range: DeadlineRange) -> ClientResult<Vec<Task>> {
        let mut query = Vec::new();
        if let Some(start) = range.start.and_then(|d| d.format(DATE_FORMAT).ok()) {
            query.push(("start", start));
        }
        if let Some(end) = range.end.and_then(|d| d.format(DATE_FORMAT).ok()) {
            query.push(("end", end));
        }
        let req = self
            .http
            .get(self.url("/tasks"))
            .bearer_auth(token)
            .query(&query);
        self.send(req).await
    }

    async fn update_task(&self, token: &str, task_id: Uuid, patch: TaskPatch) -> ClientResult<Task> {
        let mut body = serde_json::Map::new();
        if let Some(completed) = patch.completed {
            body.insert("completed".into(), json!(completed));
        }
        if let Some(actual) = patch.actual_time {
            body.insert("actualTime".into(), json!(actual));
        }
        let req = self
            .http
            .patch(self.url(&format!("/tasks/{task_id}")))
            .bearer_auth(token)
            .json(&body);
        self.send(req).await
    }

    async fn delete_task(&self, token: &str, task_id: Uuid) -> ClientResult<()> {
        let req = self
            .http
            .delete(self.url(&format!("/tasks/{task_id}")))
            .bearer_auth(token);
        self.send_empty(req).await
    }

    async fn reorder_tasks(&self, token: &str, ordered_ids: &[Uuid]) -> ClientResult<()> {
        let req = self
            .http
            .post(self.url("/tasks/reorder"))
            .bearer_auth(token)
            .json(&json!({ "orderedTaskIds": ordered_ids }));
        self.send_empty(req).await
    }

    async fn list_documents(
        &self,
        token: &str,
        course_id: Uuid,
    ) -> ClientResult<Vec<DocumentSummary>> {
        let req = self
            .http
            .get(self.url(&format!("/documents/course/{course_id}")))
            .bearer_auth(token);
        self.send(req).await
    }

    async fn upload_documents(
        &self,
        token: &str,
        course_id: Uuid,
        files: Vec<UploadFile>,
    ) -> ClientResult<Vec<DocumentSummary>> {
        let mut form = multipart::Form::new();
        for file in files {
            let part = multipart::Part::bytes(file.data)
                .file_name(file.file_name)
                .mime_str(&file.mime)?;
            form = form.part("files", part);
        }
        let req = self
            .http
            .post(self.url(&format!("/documents/upload/{course_id}")))
            .bearer_auth(token)
            .multipart(form);
        self.send(req).await
    }

    async fn analyze_course(&self, token: &str, course_id: Uuid) -> ClientResult<TaskExtraction> {
        let req = self
            .http
            .post(self.url(&format!("/analyze/course/{course_id}")))
            .bearer_auth(token);
        self.send(req).await
    }

    async fn summarize_course(&self, token: &str, course_id: Uuid) -> ClientResult<CourseSummary> {
        let req = self
            .http
            .post(self.url(&format!("/analyze/course/{course_id}/summarize")))
            .bearer_auth(token);
        self.send(req).await
    }

    async fn quiz_course(&self, token: &str, course_id: Uuid) -> ClientResult<Quiz> {
        let req = self
            .http
            .post(self.url(&format!("/analyze/course/{course_id}/quiz")))
            .bearer_auth(token);
        self.send(req).await
    }

    async fn home_summary(&self, token: &str) -> ClientResult<HomeSummary> {
        self.send(self.http.get(self.url("/home/summary")).bearer_auth(token))
            .await
    }
}
