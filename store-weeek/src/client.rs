//! WEEEK task store client

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::record::{RecordId, RecordPayload, RecordStore};
use core_runtime::config::{RecordSchema, DEFAULT_API_BASE_URL};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, WeeekError};
use crate::types::{CreateTaskRequest, CreateTaskResponse, TaskListResponse, TaskSummary};

/// Tasks requested per listing page
const DEFAULT_PAGE_SIZE: u32 = 100;

/// Links already present in the store
#[derive(Debug, Default)]
struct LinkIndex {
    links: HashSet<String>,
    /// Task descriptions, only kept when no link field is configured
    descriptions: Vec<String>,
}

impl LinkIndex {
    fn contains(&self, link: &str) -> bool {
        self.links.contains(link) || self.descriptions.iter().any(|d| d.contains(link))
    }
}

/// [`RecordStore`] backed by WEEEK tasks
///
/// # Example
///
/// ```ignore
/// use store_weeek::WeeekRecordStore;
///
/// let store = WeeekRecordStore::new(http_client, token)
///     .with_schema(config.schema.clone());
/// store.ping().await?;
/// ```
pub struct WeeekRecordStore {
    http_client: Arc<dyn HttpClient>,

    api_base: String,

    api_token: String,

    schema: RecordSchema,

    page_size: u32,

    timeout: Option<Duration>,

    /// Loaded lazily on the first existence check
    index: Mutex<Option<LinkIndex>>,
}

impl WeeekRecordStore {
    pub fn new(http_client: Arc<dyn HttpClient>, api_token: impl Into<String>) -> Self {
        Self {
            http_client,
            api_base: DEFAULT_API_BASE_URL.to_string(),
            api_token: api_token.into(),
            schema: RecordSchema::default(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: None,
            index: Mutex::new(None),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_schema(mut self, schema: RecordSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn tasks_request(&self, request: HttpRequest) -> HttpRequest {
        let request = request
            .bearer_token(&self.api_token)
            .header("Accept", "application/json");

        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}/tm/tasks", self.api_base)
    }

    fn check_status(response: &HttpResponse) -> Result<()> {
        if response.is_success() {
            Ok(())
        } else {
            Err(WeeekError::ApiError {
                status_code: response.status,
                message: response.error_snippet(),
            })
        }
    }

    async fn list_page(&self, offset: usize) -> Result<TaskListResponse> {
        let mut request = HttpRequest::get(self.tasks_url())
            .query("perPage", self.page_size.to_string())
            .query("offset", offset.to_string());

        if let Some(project_id) = &self.schema.project_id {
            request = request.query("projectId", urlencoding::encode(project_id));
        }

        let response = self.http_client.execute(self.tasks_request(request)).await?;
        Self::check_status(&response)?;

        let page: TaskListResponse = serde_json::from_slice(&response.body)
            .map_err(|e| WeeekError::ParseError(format!("Invalid task list JSON: {}", e)))?;

        if !page.success {
            return Err(WeeekError::Rejected(response.error_snippet()));
        }

        Ok(page)
    }

    /// Read every task once and index its link value
    #[instrument(skip(self))]
    async fn load_index(&self) -> Result<LinkIndex> {
        let mut index = LinkIndex::default();
        let link_field = self.schema.link_field_id.as_deref();
        let mut offset = 0usize;
        let mut scanned = 0usize;

        loop {
            let page = self.list_page(offset).await?;
            let returned = page.tasks.len();

            for raw in page.tasks {
                let task: TaskSummary = match serde_json::from_value(raw) {
                    Ok(task) => task,
                    Err(e) => {
                        warn!(error = %e, "Skipping malformed task");
                        continue;
                    }
                };
                scanned += 1;

                if let Some(project_id) = &self.schema.project_id {
                    if !task.in_project(project_id) {
                        continue;
                    }
                }

                match link_field {
                    Some(field_id) => {
                        if let Some(link) = task.custom_field(field_id) {
                            index.links.insert(link);
                        }
                    }
                    None => {
                        if let Some(description) = task.description {
                            index.descriptions.push(description);
                        }
                    }
                }
            }

            if returned == 0 || page.has_more != Some(true) {
                break;
            }
            offset += returned;
        }

        info!(
            tasks = scanned,
            links = index.links.len(),
            "Loaded existing task links"
        );
        Ok(index)
    }

    fn project_value(&self, payload: &RecordPayload) -> Option<Value> {
        payload
            .project_id
            .as_ref()
            .or(self.schema.project_id.as_ref())
            .map(|id| match id.parse::<u64>() {
                Ok(number) => Value::from(number),
                Err(_) => Value::String(id.clone()),
            })
    }

    fn to_request(&self, payload: &RecordPayload) -> CreateTaskRequest {
        CreateTaskRequest {
            title: payload.title.clone(),
            description: payload.description.clone(),
            tags: payload.tags.clone(),
            custom_fields: payload
                .custom_fields
                .iter()
                .map(|(id, value)| (id.clone(), value.clone()))
                .collect::<Map<String, Value>>(),
            project_id: self.project_value(payload),
        }
    }

    async fn create_task(&self, payload: &RecordPayload) -> Result<RecordId> {
        let request = HttpRequest::post(self.tasks_url()).json(&self.to_request(payload))?;
        let response = self.http_client.execute(self.tasks_request(request)).await?;
        Self::check_status(&response)?;

        let created: CreateTaskResponse = serde_json::from_slice(&response.body)
            .map_err(|e| WeeekError::ParseError(format!("Invalid create response JSON: {}", e)))?;

        if created.success == Some(false) {
            return Err(WeeekError::Rejected(response.error_snippet()));
        }

        created
            .task_id()
            .map(RecordId)
            .ok_or_else(|| WeeekError::ParseError("Create response carries no task id".to_string()))
    }
}

#[async_trait]
impl RecordStore for WeeekRecordStore {
    #[instrument(skip(self))]
    async fn ping(&self) -> BridgeResult<()> {
        let request = self.tasks_request(HttpRequest::get(self.tasks_url()).query("perPage", "1"));
        let response = self.http_client.execute(request).await?;
        Self::check_status(&response)?;
        debug!("WEEEK connection verified");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn exists_by_link(&self, link: &str) -> BridgeResult<bool> {
        let mut guard = self.index.lock().await;

        if guard.is_none() {
            if self.schema.link_field_id.is_none() {
                warn!("No link field configured, matching links against task descriptions");
            }
            *guard = Some(self.load_index().await?);
        }

        Ok(guard.as_ref().map(|index| index.contains(link)).unwrap_or(false))
    }

    #[instrument(skip(self, payload), fields(title = %payload.title))]
    async fn create_record(&self, payload: RecordPayload) -> BridgeResult<RecordId> {
        let id = self.create_task(&payload).await?;

        if let Some(index) = self.index.lock().await.as_mut() {
            index.links.insert(payload.link.clone());
        }

        debug!(task_id = %id, "Task created");
        Ok(id)
    }
}
