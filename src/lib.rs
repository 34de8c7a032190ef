//! Host-agnostic core of the Pomodesk client: a task list, a
//! work/break interval timer and a calendar of historical session
//! statistics, all backed by a remote REST API.
//!
//! The host owns a [`application::bootstrap::Core`], drives its
//! components from the UI loop and listens on the event channel for
//! notifications, confirmation requests and best-effort failures.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::bootstrap::Core;
pub use application::calendar::CalendarView;
pub use application::events::{AppEvent, ChannelEventSink, CollectingEventSink, EventSink};
pub use application::tasks::{TaskDraft, TaskListManager};
pub use application::timer::{spawn_ticker, Phase, SessionTimer, TickerHandle};
pub use domain::models::{CalendarDay, DailyStats, Intensity, Session, Task};
pub use infrastructure::api::{ApiClient, RestApiClient};
pub use infrastructure::config::{ensure_default_config, load_config, ClientConfig};
pub use infrastructure::error::CoreError;
pub use infrastructure::memory::MemoryApiClient;
