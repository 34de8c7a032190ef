use crate::application::events::{AppEvent, EventSink};
use crate::domain::models::Task;
use crate::infrastructure::api::ApiClient;
use crate::infrastructure::error::CoreError;
use std::sync::Arc;

/// Pending user input for a task that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
}

impl TaskDraft {
    fn to_task(&self) -> Task {
        let description = self.description.trim();
        Task {
            id: None,
            title: self.title.trim().to_string(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
            completed: false,
            created_at: None,
        }
    }
}

/// View-model over the remote task collection. Holds an ordered local
/// cache that is only ever mutated from confirmed server responses;
/// transport failures leave it untouched until the next full load.
pub struct TaskListManager {
    client: Arc<dyn ApiClient>,
    events: Arc<dyn EventSink>,
    tasks: Vec<Task>,
    draft: TaskDraft,
    editing: Option<Task>,
    pending_delete: Option<String>,
}

impl TaskListManager {
    pub fn new(client: Arc<dyn ApiClient>, events: Arc<dyn EventSink>) -> Self {
        Self {
            client,
            events,
            tasks: Vec::new(),
            draft: TaskDraft::default(),
            editing: None,
            pending_delete: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut TaskDraft {
        &mut self.draft
    }

    pub fn editing(&self) -> Option<&Task> {
        self.editing.as_ref()
    }

    /// The snapshot being edited; display stays bound to the cache
    /// entry until `save_edit` confirms the change.
    pub fn editing_mut(&mut self) -> Option<&mut Task> {
        self.editing.as_mut()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Fetch all tasks and replace the cache wholesale. Last fetch
    /// wins; there is no merge or diff.
    pub async fn load(&mut self) {
        match self.client.list_tasks().await {
            Ok(tasks) => self.tasks = tasks,
            Err(error) => self.report_failure("load_tasks", &error),
        }
    }

    /// Submit the draft. The task appears in the cache only once the
    /// server echoes it back with an id; there is no optimistic insert.
    pub async fn add(&mut self) -> Result<(), CoreError> {
        let task = self.draft.to_task();
        task.validate().map_err(CoreError::InvalidInput)?;

        match self.client.create_task(&task).await {
            Ok(created) => {
                log::info!("created task id={:?}", created.id);
                self.tasks.push(created);
                self.draft = TaskDraft::default();
            }
            Err(error) => self.report_failure("create_task", &error),
        }
        Ok(())
    }

    /// Snapshot a copy into the editing slot, isolating edits from the
    /// list until they are saved.
    pub fn begin_edit(&mut self, task_id: &str) -> Result<(), CoreError> {
        let task = self
            .find_task(task_id)
            .ok_or_else(|| CoreError::InvalidInput(format!("task not found: {task_id}")))?;
        self.editing = Some(task.clone());
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Send the full edited snapshot as an update. On success the
    /// matching cache entry is replaced and the slot cleared; on
    /// transport failure the cache stays stale and the slot is kept.
    pub async fn save_edit(&mut self) -> Result<(), CoreError> {
        let snapshot = self
            .editing
            .clone()
            .ok_or_else(|| CoreError::InvalidInput("no edit in progress".to_string()))?;
        let task_id = snapshot
            .id
            .clone()
            .ok_or_else(|| CoreError::InvalidInput("edited task has no id".to_string()))?;
        snapshot.validate().map_err(CoreError::InvalidInput)?;

        match self.client.update_task(&task_id, &snapshot).await {
            Ok(updated) => {
                self.replace_cached(&task_id, updated);
                self.editing = None;
            }
            Err(error) => self.report_failure("update_task", &error),
        }
        Ok(())
    }

    /// Ask the host to confirm the deletion; the request is only
    /// issued by `confirm_delete`.
    pub fn request_delete(&mut self, task_id: &str) -> Result<(), CoreError> {
        let title = self
            .find_task(task_id)
            .map(|task| task.title.clone())
            .ok_or_else(|| CoreError::InvalidInput(format!("task not found: {task_id}")))?;
        self.pending_delete = Some(task_id.to_string());
        self.events.emit(AppEvent::ConfirmDeleteRequested {
            task_id: task_id.to_string(),
            title,
        });
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub async fn confirm_delete(&mut self) -> Result<(), CoreError> {
        let task_id = self
            .pending_delete
            .take()
            .ok_or_else(|| CoreError::InvalidInput("no delete pending".to_string()))?;

        match self.client.delete_task(&task_id).await {
            Ok(()) => {
                log::info!("deleted task id={task_id}");
                self.tasks.retain(|task| task.id.as_deref() != Some(task_id.as_str()));
            }
            Err(error) => self.report_failure("delete_task", &error),
        }
        Ok(())
    }

    /// Send a full update with the completion flag inverted; the cache
    /// entry is replaced only once the server confirms.
    pub async fn toggle_completion(&mut self, task_id: &str) -> Result<(), CoreError> {
        let mut toggled = self
            .find_task(task_id)
            .cloned()
            .ok_or_else(|| CoreError::InvalidInput(format!("task not found: {task_id}")))?;
        toggled.completed = !toggled.completed;

        match self.client.update_task(task_id, &toggled).await {
            Ok(updated) => self.replace_cached(task_id, updated),
            Err(error) => self.report_failure("update_task", &error),
        }
        Ok(())
    }

    pub fn completed(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.completed).collect()
    }

    pub fn pending(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|task| !task.completed).collect()
    }

    fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks
            .iter()
            .find(|task| task.id.as_deref() == Some(task_id))
    }

    fn replace_cached(&mut self, task_id: &str, updated: Task) {
        if let Some(entry) = self
            .tasks
            .iter_mut()
            .find(|task| task.id.as_deref() == Some(task_id))
        {
            *entry = updated;
        }
    }

    fn report_failure(&self, operation: &str, error: &CoreError) {
        log::warn!("{operation} failed: {error}");
        self.events.emit(AppEvent::OperationFailed {
            operation: operation.to_string(),
            message: error.to_string(),
        });
    }
}
