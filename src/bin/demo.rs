use pomodesk::application::bootstrap::Core;
use pomodesk::application::events::ChannelEventSink;
use pomodesk::infrastructure::config::ClientConfig;
use pomodesk::infrastructure::memory::MemoryApiClient;
use std::sync::Arc;

/// Walks the whole component surface against the in-memory API, so
/// the crate can be exercised without a running server.
#[tokio::main]
async fn main() {
    env_logger::init();

    let config = ClientConfig {
        work_minutes: 1,
        break_minutes: 1,
        ..ClientConfig::default()
    };
    let client = Arc::new(MemoryApiClient::new());
    let (events, mut receiver) = ChannelEventSink::pair();
    let mut core = Core::new(&config, client, events);

    core.tasks.draft_mut().title = "Write report".to_string();
    core.tasks.add().await.expect("add task");
    core.tasks.load().await;
    println!("tasks: {}", core.tasks.tasks().len());

    core.timer.load_available_tasks().await;
    let task = core.timer.available_tasks()[0].clone();
    core.timer.select_task(task).expect("select task");
    core.timer.start().expect("start timer");
    for _ in 0..60 {
        core.timer.tick();
    }
    // Give the fire-and-forget session submission a moment to land.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    println!(
        "timer: phase={} time_left={}",
        core.timer.phase().as_str(),
        core.timer.formatted_time()
    );

    core.calendar.load_stats().await;
    println!(
        "calendar: {} — {} sessions this month",
        core.calendar.month_label(),
        core.calendar.month_session_total()
    );

    while let Ok(event) = receiver.try_recv() {
        println!("event: {event:?}");
    }
}
