use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Fields are kept loose: a value of the wrong type is ignored rather than
/// failing the whole patch.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTaskRequest {
    pub completed: Option<Value>,
    pub actual_time: Option<Value>,
}

impl PatchTaskRequest {
    pub fn completed(&self) -> Option<bool> {
        self.completed.as_ref().and_then(Value::as_bool)
    }

    /// Whole minutes; fractional values are rounded.
    pub fn actual_time(&self) -> Option<f64> {
        self.actual_time.as_ref().and_then(Value::as_f64).map(f64::round)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub ordered_task_ids: Option<Vec<Uuid>>,
}

/// `?start=YYYY-MM-DD&end=YYYY-MM-DD`, both optional.
#[derive(Debug, Default, Deserialize)]
pub struct TaskRangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
