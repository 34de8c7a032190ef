use crate::domain::models::{DailyStats, Session, Task};
use crate::infrastructure::error::CoreError;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Remote REST API for tasks, sessions and daily statistics. One
/// request per call; no retries, no caching, no batching. Failures
/// surface to the caller, who decides UI feedback.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, CoreError>;

    async fn get_task(&self, task_id: &str) -> Result<Task, CoreError>;

    async fn create_task(&self, task: &Task) -> Result<Task, CoreError>;

    async fn update_task(&self, task_id: &str, task: &Task) -> Result<Task, CoreError>;

    async fn delete_task(&self, task_id: &str) -> Result<(), CoreError>;

    async fn create_session(&self, session: &Session) -> Result<Session, CoreError>;

    async fn daily_stats(&self) -> Result<Vec<DailyStats>, CoreError>;

    async fn sessions_for_task(&self, task_id: &str) -> Result<Vec<Session>, CoreError>;
}

#[derive(Debug, Clone)]
pub struct RestApiClient {
    client: Client,
    base_url: Url,
}

impl RestApiClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn ensure_non_empty(value: &str, field: &str) -> Result<(), CoreError> {
        if value.trim().is_empty() {
            return Err(CoreError::InvalidInput(format!("{field} must not be empty")));
        }
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CoreError> {
        let mut url = self.base_url.clone();
        {
            let mut parts = url.path_segments_mut().map_err(|_| {
                CoreError::InvalidInput("api base URL cannot be a base".to_string())
            })?;
            parts.pop_if_empty();
            for segment in segments {
                parts.push(segment);
            }
        }
        Ok(url)
    }

    fn http_error(status: reqwest::StatusCode, body: &str) -> CoreError {
        CoreError::Http {
            status: status.as_u16(),
            body: body.trim().to_string(),
        }
    }

    async fn read_body(
        response: reqwest::Response,
        operation: &str,
    ) -> Result<(reqwest::StatusCode, String), CoreError> {
        let status = response.status();
        let body = response.text().await.map_err(|error| {
            CoreError::Transport(format!("failed reading {operation} response: {error}"))
        })?;
        Ok((status, body))
    }

    fn parse<T: serde::de::DeserializeOwned>(body: &str, operation: &str) -> Result<T, CoreError> {
        serde_json::from_str(body).map_err(|error| {
            CoreError::Transport(format!("invalid {operation} payload: {error}; body={body}"))
        })
    }
}

#[async_trait]
impl ApiClient for RestApiClient {
    async fn list_tasks(&self) -> Result<Vec<Task>, CoreError> {
        let endpoint = self.endpoint(&["tasks"])?;
        let response = self.client.get(endpoint).send().await.map_err(|error| {
            CoreError::Transport(format!("network error while listing tasks: {error}"))
        })?;

        let (status, body) = Self::read_body(response, "task list").await?;
        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }
        Self::parse(&body, "task list")
    }

    async fn get_task(&self, task_id: &str) -> Result<Task, CoreError> {
        Self::ensure_non_empty(task_id, "task id")?;

        let endpoint = self.endpoint(&["tasks", task_id])?;
        let response = self.client.get(endpoint).send().await.map_err(|error| {
            CoreError::Transport(format!("network error while fetching task: {error}"))
        })?;

        let (status, body) = Self::read_body(response, "task fetch").await?;
        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }
        Self::parse(&body, "task fetch")
    }

    async fn create_task(&self, task: &Task) -> Result<Task, CoreError> {
        let endpoint = self.endpoint(&["tasks"])?;
        let response = self
            .client
            .post(endpoint)
            .json(task)
            .send()
            .await
            .map_err(|error| {
                CoreError::Transport(format!("network error while creating task: {error}"))
            })?;

        let (status, body) = Self::read_body(response, "task create").await?;
        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }
        Self::parse(&body, "task create")
    }

    async fn update_task(&self, task_id: &str, task: &Task) -> Result<Task, CoreError> {
        Self::ensure_non_empty(task_id, "task id")?;

        let endpoint = self.endpoint(&["tasks", task_id])?;
        let response = self
            .client
            .put(endpoint)
            .json(task)
            .send()
            .await
            .map_err(|error| {
                CoreError::Transport(format!("network error while updating task: {error}"))
            })?;

        let (status, body) = Self::read_body(response, "task update").await?;
        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }
        Self::parse(&body, "task update")
    }

    async fn delete_task(&self, task_id: &str) -> Result<(), CoreError> {
        Self::ensure_non_empty(task_id, "task id")?;

        let endpoint = self.endpoint(&["tasks", task_id])?;
        let response = self.client.delete(endpoint).send().await.map_err(|error| {
            CoreError::Transport(format!("network error while deleting task: {error}"))
        })?;

        let (status, body) = Self::read_body(response, "task delete").await?;
        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }
        Ok(())
    }

    async fn create_session(&self, session: &Session) -> Result<Session, CoreError> {
        session
            .validate()
            .map_err(CoreError::InvalidInput)?;

        let endpoint = self.endpoint(&["pomodoros"])?;
        let response = self
            .client
            .post(endpoint)
            .json(session)
            .send()
            .await
            .map_err(|error| {
                CoreError::Transport(format!("network error while recording session: {error}"))
            })?;

        let (status, body) = Self::read_body(response, "session create").await?;
        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }
        Self::parse(&body, "session create")
    }

    async fn daily_stats(&self) -> Result<Vec<DailyStats>, CoreError> {
        let endpoint = self.endpoint(&["pomodoros", "daily"])?;
        let response = self.client.get(endpoint).send().await.map_err(|error| {
            CoreError::Transport(format!("network error while fetching daily stats: {error}"))
        })?;

        let (status, body) = Self::read_body(response, "daily stats").await?;
        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }
        Self::parse(&body, "daily stats")
    }

    async fn sessions_for_task(&self, task_id: &str) -> Result<Vec<Session>, CoreError> {
        Self::ensure_non_empty(task_id, "task id")?;

        let endpoint = self.endpoint(&["pomodoros", "task", task_id])?;
        let response = self.client.get(endpoint).send().await.map_err(|error| {
            CoreError::Transport(format!("network error while listing task sessions: {error}"))
        })?;

        let (status, body) = Self::read_body(response, "task sessions").await?;
        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }
        Self::parse(&body, "task sessions")
    }
}
