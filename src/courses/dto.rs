use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct CreateCourseRequest {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub deadline: Option<String>,
    pub estimated_time: Option<i32>,
    pub task_type: Option<String>,
}
