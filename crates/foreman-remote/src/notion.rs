//! Notion client and the task database built on it.

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use foreman_core::RecordStore;
use foreman_models::{ExternalLink, JournalEntry, PageId, TaskRecord, TaskStatus};

use crate::error::{RemoteError, Result};
use crate::retry::{RetryPolicy, HTTP_TIMEOUT};
use crate::schema::{
    append_file, find_by_code_query, journal_properties, recent_query, status_property,
    task_properties, NotionPage, PropertyNames,
};

/// Notion REST API base URL.
pub const NOTION_API_URL: &str = "https://api.notion.com/v1";

/// API version sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Thin JSON client for the Notion REST API.
#[derive(Clone)]
pub struct NotionClient {
    client: Client,
    token: String,
    base_url: String,
    retry: RetryPolicy,
}

impl NotionClient {
    /// Create a client authenticated with an integration token.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(RemoteError::Config("NOTION_TOKEN is empty".into()));
        }
        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            client,
            token,
            base_url: NOTION_API_URL.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// `POST /databases/{id}/query`, returning the `results` array.
    pub async fn query_database(&self, database_id: &str, body: &Value) -> Result<Vec<Value>> {
        let url = format!("{}/databases/{}/query", self.base_url, database_id);
        let response = self.send(Method::POST, &url, Some(body)).await?;
        match response.get("results") {
            Some(Value::Array(results)) => Ok(results.clone()),
            _ => Err(RemoteError::Parse("query response without results".into())),
        }
    }

    /// `POST /pages` under `database_id`.
    pub async fn create_page(&self, database_id: &str, properties: Map<String, Value>) -> Result<PageId> {
        let url = format!("{}/pages", self.base_url);
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });
        let page = self.send(Method::POST, &url, Some(&body)).await?;
        page_id_of(&page)
    }

    /// `GET /pages/{id}`.
    pub async fn get_page(&self, page_id: &PageId) -> Result<Value> {
        let url = format!("{}/pages/{}", self.base_url, page_id);
        self.send(Method::GET, &url, None).await
    }

    /// `PATCH /pages/{id}` with new property values.
    pub async fn update_page(&self, page_id: &PageId, properties: Map<String, Value>) -> Result<()> {
        let url = format!("{}/pages/{}", self.base_url, page_id);
        let body = json!({ "properties": properties });
        self.send(Method::PATCH, &url, Some(&body)).await?;
        Ok(())
    }

    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Value> {
        let what = format!("{} {}", method, url);
        let method = &method;
        self.retry
            .run(&what, move || async move {
                let mut request = self
                    .client
                    .request(method.clone(), url)
                    .bearer_auth(&self.token)
                    .header("Notion-Version", NOTION_VERSION);
                if let Some(body) = body {
                    request = request.json(body);
                }
                let response = check_status(request.send().await?).await?;
                Ok(response.json::<Value>().await?)
            })
            .await
    }
}

/// Turn a non-success response into the matching error.
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if status.as_u16() == 404 {
        return Err(RemoteError::NotFound(body));
    }
    Err(RemoteError::Status {
        code: status.as_u16(),
        body,
    })
}

fn page_id_of(page: &Value) -> Result<PageId> {
    page.get("id")
        .and_then(Value::as_str)
        .map(PageId::from_string)
        .ok_or_else(|| RemoteError::Parse("page response without id".into()))
}

/// Task database and photo journal backed by Notion.
pub struct NotionTaskStore {
    client: NotionClient,
    tasks_db: String,
    journal_db: String,
    props: PropertyNames,
}

impl NotionTaskStore {
    /// `journal_db` defaults to the task database when `None`.
    pub fn new(client: NotionClient, tasks_db: impl Into<String>, journal_db: Option<String>) -> Self {
        let tasks_db = tasks_db.into();
        Self {
            client,
            journal_db: journal_db.unwrap_or_else(|| tasks_db.clone()),
            tasks_db,
            props: PropertyNames::from_env(),
        }
    }

    pub fn with_properties(mut self, props: PropertyNames) -> Self {
        self.props = props;
        self
    }

    pub fn properties(&self) -> &PropertyNames {
        &self.props
    }

    async fn query_tasks(&self, body: &Value) -> Result<Vec<TaskRecord>> {
        let rows = self.client.query_database(&self.tasks_db, body).await?;
        let tasks: Vec<TaskRecord> = rows
            .into_iter()
            .filter_map(|row| serde_json::from_value::<NotionPage>(row).ok())
            .filter_map(|page| page.to_task(&self.props))
            .collect();
        Ok(tasks)
    }
}

#[async_trait]
impl RecordStore for NotionTaskStore {
    async fn recent_tasks(&self, limit: usize) -> foreman_core::Result<Vec<TaskRecord>> {
        Ok(self.query_tasks(&recent_query(limit)).await?)
    }

    async fn find_task(&self, code: &str) -> foreman_core::Result<Option<TaskRecord>> {
        let tasks = self.query_tasks(&find_by_code_query(code, &self.props)).await?;
        Ok(tasks.into_iter().next())
    }

    async fn create_task(&self, task: &TaskRecord) -> foreman_core::Result<PageId> {
        let page_id = self
            .client
            .create_page(&self.tasks_db, task_properties(task, &self.props))
            .await?;
        info!(identifier = %task.identifier, page_id = %page_id, "Task created");
        Ok(page_id)
    }

    async fn update_status(&self, page: &PageId, status: TaskStatus) -> foreman_core::Result<()> {
        let mut properties = Map::new();
        properties.insert(self.props.status.clone(), status_property(status));
        self.client.update_page(page, properties).await?;
        debug!(page_id = %page, status = %status, "Status updated");
        Ok(())
    }

    async fn append_attachment(&self, page: &PageId, link: &ExternalLink) -> foreman_core::Result<usize> {
        let current = self.client.get_page(page).await?;
        let files = append_file(&current, &self.props.attach, link);
        let count = files.len();

        let mut properties = Map::new();
        properties.insert(self.props.attach.clone(), json!({ "files": files }));
        self.client.update_page(page, properties).await?;
        debug!(page_id = %page, attachments = count, "Attachment added");
        Ok(count)
    }

    async fn create_journal_entry(&self, entry: &JournalEntry) -> foreman_core::Result<PageId> {
        let page_id = self
            .client
            .create_page(&self.journal_db, journal_properties(entry, &self.props))
            .await?;
        info!(section = %entry.section, page_id = %page_id, "Journal entry created");
        Ok(page_id)
    }
}
