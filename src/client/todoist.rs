// File: src/client/todoist.rs
use crate::client::TaskSource;
use crate::client::core::{HttpClient, join_url, status_error};
use crate::error::{PlannerError, PlannerResult};
use crate::model::Task;
use chrono::NaiveDate;
use serde::Deserialize;

pub const TODOIST_API: &str = "https://api.todoist.com/rest/v2";
const SERVICE: &str = "todoist";

#[derive(Debug, Deserialize)]
struct TodoistDue {
    date: String,
}

#[derive(Debug, Deserialize)]
struct TodoistTask {
    #[serde(default)]
    id: String,
    content: String,
    #[serde(default)]
    priority: Option<u8>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    due: Option<TodoistDue>,
}

impl From<TodoistTask> for Task {
    fn from(raw: TodoistTask) -> Self {
        // Recurring or timed dues come back as "YYYY-MM-DDTHH:MM:SS"; only
        // the date part matters for the planner.
        let due = raw
            .due
            .and_then(|d| NaiveDate::parse_from_str(d.date.get(..10).unwrap_or(&d.date), "%Y-%m-%d").ok());
        Task {
            id: raw.id,
            content: raw.content,
            priority: raw.priority.unwrap_or(1),
            labels: raw.labels,
            due,
        }
    }
}

/// Todoist REST v2 task source, authenticated with a static API token.
#[derive(Clone, Debug)]
pub struct TodoistClient {
    http: HttpClient,
    base_url: String,
    token: String,
}

impl TodoistClient {
    pub fn new(http: HttpClient, base_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            token: token.to_string(),
        }
    }

    async fn fetch(&self, filter: Option<&str>) -> PlannerResult<Vec<Task>> {
        let mut url = join_url(SERVICE, &self.base_url, &["tasks"])?;
        if let Some(f) = filter {
            url.query_pairs_mut().append_pair("filter", f);
        }

        let response = self.http.get(SERVICE, &url, Some(&self.token)).await?;
        if !response.is_success() {
            return Err(status_error(SERVICE, &response));
        }

        let raw: Vec<TodoistTask> = response
            .json()
            .map_err(|e| PlannerError::upstream(SERVICE, format!("unexpected payload: {}", e)))?;
        log::debug!("todoist returned {} task(s) for filter {:?}", raw.len(), filter);
        Ok(raw.into_iter().map(Task::from).collect())
    }
}

impl TaskSource for TodoistClient {
    async fn tasks_due_on(&self, date: NaiveDate) -> PlannerResult<Vec<Task>> {
        let filter = format!("due: {}", date.format("%Y-%m-%d"));
        self.fetch(Some(&filter)).await
    }

    async fn all_tasks(&self, filter: Option<&str>) -> PlannerResult<Vec<Task>> {
        self.fetch(filter).await
    }
}
