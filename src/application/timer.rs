use crate::application::events::{AppEvent, EventSink};
use crate::domain::models::{Session, Task};
use crate::infrastructure::api::ApiClient;
use crate::infrastructure::config::ClientConfig;
use crate::infrastructure::error::CoreError;
use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// The two alternating sub-modes of the timer, orthogonal to whether
/// the countdown is running.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Break => "break",
        }
    }

    fn flipped(self) -> Self {
        match self {
            Self::Work => Self::Break,
            Self::Break => Self::Work,
        }
    }
}

/// Countdown state machine alternating work and break intervals. Each
/// finished work phase is recorded on the server fire-and-forget; the
/// submission outcome never alters timer state. Transitions are
/// synchronous, so the machine is testable without a clock; the
/// spawned submission requires a tokio runtime.
pub struct SessionTimer {
    client: Arc<dyn ApiClient>,
    events: Arc<dyn EventSink>,
    phase: Phase,
    running: bool,
    time_left_seconds: u32,
    work_minutes: u32,
    break_minutes: u32,
    selected_task: Option<Task>,
    available_tasks: Vec<Task>,
}

impl SessionTimer {
    pub fn new(
        client: Arc<dyn ApiClient>,
        events: Arc<dyn EventSink>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            client,
            events,
            phase: Phase::Work,
            running: false,
            time_left_seconds: config.work_minutes * 60,
            work_minutes: config.work_minutes,
            break_minutes: config.break_minutes,
            selected_task: None,
            available_tasks: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn time_left_seconds(&self) -> u32 {
        self.time_left_seconds
    }

    pub fn work_minutes(&self) -> u32 {
        self.work_minutes
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_task.as_ref()
    }

    pub fn available_tasks(&self) -> &[Task] {
        &self.available_tasks
    }

    /// Change the configured work duration. Takes effect on the next
    /// `reset` or phase change, like the duration inputs it backs.
    pub fn set_work_minutes(&mut self, minutes: u32) -> Result<(), CoreError> {
        if minutes == 0 {
            return Err(CoreError::InvalidInput(
                "work duration must be > 0".to_string(),
            ));
        }
        self.work_minutes = minutes;
        Ok(())
    }

    pub fn set_break_minutes(&mut self, minutes: u32) -> Result<(), CoreError> {
        if minutes == 0 {
            return Err(CoreError::InvalidInput(
                "break duration must be > 0".to_string(),
            ));
        }
        self.break_minutes = minutes;
        Ok(())
    }

    /// Refresh the pick-list of tasks a session can be attributed to:
    /// every task not yet completed.
    pub async fn load_available_tasks(&mut self) {
        match self.client.list_tasks().await {
            Ok(tasks) => {
                self.available_tasks = tasks.into_iter().filter(|task| !task.completed).collect();
            }
            Err(error) => {
                log::warn!("load_available_tasks failed: {error}");
                self.events.emit(AppEvent::OperationFailed {
                    operation: "load_available_tasks".to_string(),
                    message: error.to_string(),
                });
            }
        }
    }

    /// Allowed in any state and never resets the countdown. The task
    /// must be persisted; a session cannot be attributed otherwise.
    pub fn select_task(&mut self, task: Task) -> Result<(), CoreError> {
        if task
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .is_none()
        {
            return Err(CoreError::InvalidInput(
                "selected task has no server id".to_string(),
            ));
        }
        self.selected_task = Some(task);
        Ok(())
    }

    /// Begin (or continue) the countdown. Requires a selected task.
    pub fn start(&mut self) -> Result<(), CoreError> {
        if self.selected_task.is_none() {
            return Err(CoreError::InvalidInput(
                "select a task before starting the timer".to_string(),
            ));
        }
        self.running = true;
        Ok(())
    }

    /// Stop the countdown; phase and remaining time are preserved.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Pause, then restore the full duration of the current phase.
    pub fn reset(&mut self) {
        self.pause();
        self.time_left_seconds = self.phase_duration_seconds(self.phase);
    }

    /// One second elapsed. Decrement first, then check: the zero
    /// crossing triggers `complete_session` exactly once.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.time_left_seconds = self.time_left_seconds.saturating_sub(1);
        if self.time_left_seconds == 0 {
            self.complete_session();
        }
    }

    /// Finish the current phase: record the session when a work phase
    /// ended, flip the phase, reload the countdown, notify the host.
    /// The next phase is NOT auto-started.
    pub fn complete_session(&mut self) {
        self.pause();

        let finished = self.phase;
        if finished == Phase::Work {
            if let Some(task_id) = self.selected_task.as_ref().and_then(|task| task.id.clone()) {
                self.record_session(task_id);
            }
        }

        self.phase = finished.flipped();
        self.time_left_seconds = self.phase_duration_seconds(self.phase);
        self.events.emit(AppEvent::PhaseEnded {
            finished,
            next: self.phase,
        });
    }

    /// Fire-and-forget submission; the outcome is surfaced only
    /// through the event sink and the diagnostic log.
    fn record_session(&self, task_id: String) {
        let ended_at = Utc::now();
        let session = Session {
            id: None,
            task_id,
            work_minutes: self.work_minutes,
            break_minutes: self.break_minutes,
            started_at: ended_at - Duration::minutes(self.work_minutes as i64),
            ended_at,
        };

        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            match client.create_session(&session).await {
                Ok(recorded) => {
                    log::info!("recorded session id={:?}", recorded.id);
                    events.emit(AppEvent::SessionRecorded(recorded));
                }
                Err(error) => {
                    log::warn!("record_session failed: {error}");
                    events.emit(AppEvent::OperationFailed {
                        operation: "record_session".to_string(),
                        message: error.to_string(),
                    });
                }
            }
        });
    }

    pub fn progress_percentage(&self) -> f64 {
        let full = self.phase_duration_seconds(self.phase);
        if full == 0 {
            return 0.0;
        }
        f64::from(full - self.time_left_seconds.min(full)) / f64::from(full) * 100.0
    }

    /// Zero-padded `MM:SS`.
    pub fn formatted_time(&self) -> String {
        let minutes = self.time_left_seconds / 60;
        let seconds = self.time_left_seconds % 60;
        format!("{minutes:02}:{seconds:02}")
    }

    fn phase_duration_seconds(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_minutes * 60,
            Phase::Break => self.break_minutes * 60,
        }
    }
}

/// Handle for the background one-second driver. Dropping it (or
/// calling `stop`) halts the interval deterministically; the callback
/// cannot outlive its owner.
pub struct TickerHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.task.abort();
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.halt();
    }
}

/// Drive a shared timer with one `tick` per second. Ticks are no-ops
/// while the timer is paused, so the driver can outlive start/pause
/// cycles.
pub fn spawn_ticker(timer: Arc<tokio::sync::Mutex<SessionTimer>>) -> TickerHandle {
    let (stop_tx, mut stop_rx) = oneshot::channel();
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first interval tick fires immediately; swallow it so the
        // countdown moves one second per elapsed second.
        interval.tick().await;
        loop {
            tokio::select! {
                _ = &mut stop_rx => break,
                _ = interval.tick() => {
                    timer.lock().await.tick();
                }
            }
        }
    });
    TickerHandle {
        stop: Some(stop_tx),
        task,
    }
}
