use crate::domain::models::{DailyStats, Session, Task};
use crate::infrastructure::api::ApiClient;
use crate::infrastructure::error::CoreError;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// In-memory stand-in for the remote API, mirroring its observable
/// behavior: server-assigned ids and creation timestamps, 404 for
/// unknown ids, daily statistics recomputed from the stored sessions.
/// Used by unit tests and the demo binary.
#[derive(Debug, Default)]
pub struct MemoryApiClient {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tasks: Vec<Task>,
    sessions: Vec<Session>,
    next_id: u64,
    fail_next: Option<String>,
}

impl MemoryApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with already-persisted tasks. Ids must be set;
    /// the internal id counter continues past the largest numeric one.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks
            .iter()
            .filter_map(|task| task.id.as_deref())
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            state: Mutex::new(MemoryState {
                tasks,
                sessions: Vec::new(),
                next_id,
                fail_next: None,
            }),
        }
    }

    /// Force a transport error on the next call of the named operation.
    pub fn fail_next(&self, operation: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_next = Some(operation.to_string());
        }
    }

    /// Snapshot of every recorded session, for assertions.
    pub fn recorded_sessions(&self) -> Vec<Session> {
        self.state
            .lock()
            .map(|state| state.sessions.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, CoreError> {
        self.state
            .lock()
            .map_err(|error| CoreError::LockPoisoned(format!("memory api state: {error}")))
    }

    fn check_failure(
        state: &mut MutexGuard<'_, MemoryState>,
        operation: &str,
    ) -> Result<(), CoreError> {
        if state.fail_next.as_deref() == Some(operation) {
            state.fail_next = None;
            return Err(CoreError::Transport(format!(
                "simulated network error during {operation}"
            )));
        }
        Ok(())
    }

    fn not_found(what: &str) -> CoreError {
        CoreError::Http {
            status: 404,
            body: format!("{what} not found"),
        }
    }
}

#[async_trait]
impl ApiClient for MemoryApiClient {
    async fn list_tasks(&self) -> Result<Vec<Task>, CoreError> {
        let mut state = self.lock()?;
        Self::check_failure(&mut state, "list_tasks")?;
        Ok(state.tasks.clone())
    }

    async fn get_task(&self, task_id: &str) -> Result<Task, CoreError> {
        let mut state = self.lock()?;
        Self::check_failure(&mut state, "get_task")?;
        state
            .tasks
            .iter()
            .find(|task| task.id.as_deref() == Some(task_id))
            .cloned()
            .ok_or_else(|| Self::not_found("task"))
    }

    async fn create_task(&self, task: &Task) -> Result<Task, CoreError> {
        let mut state = self.lock()?;
        Self::check_failure(&mut state, "create_task")?;

        state.next_id += 1;
        let mut created = task.clone();
        created.id = Some(state.next_id.to_string());
        created.created_at = Some(Utc::now());
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, task_id: &str, task: &Task) -> Result<Task, CoreError> {
        let mut state = self.lock()?;
        Self::check_failure(&mut state, "update_task")?;

        let entry = state
            .tasks
            .iter_mut()
            .find(|candidate| candidate.id.as_deref() == Some(task_id))
            .ok_or_else(|| Self::not_found("task"))?;
        let mut updated = task.clone();
        updated.id = Some(task_id.to_string());
        updated.created_at = entry.created_at;
        *entry = updated.clone();
        Ok(updated)
    }

    async fn delete_task(&self, task_id: &str) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        Self::check_failure(&mut state, "delete_task")?;

        let before = state.tasks.len();
        state.tasks.retain(|task| task.id.as_deref() != Some(task_id));
        if state.tasks.len() == before {
            return Err(Self::not_found("task"));
        }
        Ok(())
    }

    async fn create_session(&self, session: &Session) -> Result<Session, CoreError> {
        session.validate().map_err(CoreError::InvalidInput)?;

        let mut state = self.lock()?;
        Self::check_failure(&mut state, "create_session")?;

        state.next_id += 1;
        let mut created = session.clone();
        created.id = Some(state.next_id.to_string());
        state.sessions.push(created.clone());
        Ok(created)
    }

    async fn daily_stats(&self) -> Result<Vec<DailyStats>, CoreError> {
        let mut state = self.lock()?;
        Self::check_failure(&mut state, "daily_stats")?;

        let mut per_day: BTreeMap<String, DailyStats> = BTreeMap::new();
        for session in &state.sessions {
            let key = session.started_at.date_naive().format("%Y-%m-%d").to_string();
            let entry = per_day.entry(key.clone()).or_insert_with(|| DailyStats {
                date: key,
                total_sessions: 0,
                total_work_minutes: 0,
                total_break_minutes: 0,
            });
            entry.total_sessions += 1;
            entry.total_work_minutes += session.work_minutes;
            entry.total_break_minutes += session.break_minutes;
        }
        Ok(per_day.into_values().collect())
    }

    async fn sessions_for_task(&self, task_id: &str) -> Result<Vec<Session>, CoreError> {
        let mut state = self.lock()?;
        Self::check_failure(&mut state, "sessions_for_task")?;
        Ok(state
            .sessions
            .iter()
            .filter(|session| session.task_id == task_id)
            .cloned()
            .collect())
    }
}
