//! WEEEK public API request/response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GET /tm/tasks` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResponse {
    #[serde(default)]
    pub success: bool,

    /// Tasks kept raw; only a few fields are read
    #[serde(default)]
    pub tasks: Vec<Value>,

    #[serde(default)]
    pub has_more: Option<bool>,
}

/// The parts of a task the link index needs
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    #[serde(default)]
    pub id: Option<Value>,

    #[serde(default)]
    pub project_id: Option<Value>,

    #[serde(default)]
    pub description: Option<String>,

    /// Either `[{"id": ..., "value": ...}]` or `{"<id>": value}`
    #[serde(default)]
    pub custom_fields: Option<Value>,
}

impl TaskSummary {
    /// Value of custom field `field_id` as a string, if set
    pub fn custom_field(&self, field_id: &str) -> Option<String> {
        let value = match self.custom_fields.as_ref()? {
            Value::Array(fields) => fields
                .iter()
                .find(|field| field.get("id").map(value_as_string).as_deref() == Some(field_id))
                .and_then(|field| field.get("value"))?,
            Value::Object(fields) => fields.get(field_id)?,
            _ => return None,
        };

        match value {
            Value::Null => None,
            other => Some(value_as_string(other)).filter(|s| !s.is_empty()),
        }
    }

    pub fn in_project(&self, project_id: &str) -> bool {
        self.project_id
            .as_ref()
            .map(|id| value_as_string(id) == project_id)
            .unwrap_or(false)
    }
}

/// Strings verbatim, everything else via its JSON text
pub fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `POST /tm/tasks` body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Map::is_empty")]
    pub custom_fields: Map<String, Value>,

    /// Numeric ids are sent as numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Value>,
}

/// `POST /tm/tasks` response
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskResponse {
    #[serde(default)]
    pub success: Option<bool>,

    #[serde(default)]
    pub task: Option<TaskSummary>,

    /// Some deployments return the task fields at the top level
    #[serde(default)]
    pub id: Option<Value>,
}

impl CreateTaskResponse {
    pub fn task_id(&self) -> Option<String> {
        self.task
            .as_ref()
            .and_then(|task| task.id.as_ref())
            .or(self.id.as_ref())
            .map(value_as_string)
    }
}
