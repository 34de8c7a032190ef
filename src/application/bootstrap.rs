use crate::application::calendar::CalendarView;
use crate::application::events::{AppEvent, ChannelEventSink, EventSink};
use crate::application::tasks::TaskListManager;
use crate::application::timer::SessionTimer;
use crate::infrastructure::api::{ApiClient, RestApiClient};
use crate::infrastructure::config::{ensure_default_config, load_config, ClientConfig};
use crate::infrastructure::error::CoreError;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// The three view-model components wired to one API client and one
/// event sink. The host owns this and drives it from its UI loop.
pub struct Core {
    pub tasks: TaskListManager,
    pub timer: SessionTimer,
    pub calendar: CalendarView,
}

impl Core {
    pub fn new(
        config: &ClientConfig,
        client: Arc<dyn ApiClient>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            tasks: TaskListManager::new(client.clone(), events.clone()),
            timer: SessionTimer::new(client.clone(), events.clone(), config),
            calendar: CalendarView::new(client, events),
        }
    }

    /// Load (or create) the configuration under `config_dir`, build
    /// the REST client from it, and return the wired components plus
    /// the host's end of the event channel.
    pub fn bootstrap(config_dir: &Path) -> Result<(Self, UnboundedReceiver<AppEvent>), CoreError> {
        ensure_default_config(config_dir)?;
        let config = load_config(config_dir)?;
        let client = Arc::new(RestApiClient::new(config.base_url()?));
        let (events, receiver) = ChannelEventSink::pair();
        Ok((Self::new(&config, client, events), receiver))
    }
}
