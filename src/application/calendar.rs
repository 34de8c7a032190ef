use crate::application::events::{AppEvent, EventSink};
use crate::domain::models::{CalendarDay, DailyStats};
use crate::infrastructure::api::ApiClient;
use crate::infrastructure::error::CoreError;
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::sync::Arc;

/// Build the month grid: full weeks from the Sunday on or before the
/// 1st to the Saturday on or after the last day of the month. Stats
/// are matched by exact `YYYY-MM-DD` equality on the date's own
/// calendar fields. An impossible year/month yields an empty grid.
pub fn build_month_grid(
    year: i32,
    month: u32,
    stats: &[DailyStats],
    today: NaiveDate,
) -> Vec<CalendarDay> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let Some(next_month_first) = (if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }) else {
        return Vec::new();
    };
    let last = next_month_first - Duration::days(1);

    let start = first - Duration::days(i64::from(first.weekday().num_days_from_sunday()));
    let end = last + Duration::days(i64::from(6 - last.weekday().num_days_from_sunday()));

    let mut days = Vec::new();
    let mut date = start;
    while date <= end {
        let key = date.format("%Y-%m-%d").to_string();
        days.push(CalendarDay {
            date,
            stats: stats.iter().find(|entry| entry.date == key).cloned(),
            in_current_month: date.month() == month && date.year() == year,
            is_today: date == today,
        });
        date += Duration::days(1);
    }
    days
}

/// `"2h 5min"` / `"45min"` rendering of a minute total.
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let remainder = minutes % 60;
    if hours > 0 {
        format!("{hours}h {remainder}min")
    } else {
        format!("{remainder}min")
    }
}

/// Number of intensity dots to draw for a day, capped at 8.
pub fn dot_count(session_count: u32) -> usize {
    session_count.min(8) as usize
}

/// Month view over the daily statistics. Navigation regenerates the
/// grid from the last-loaded stats; only `load_stats` talks to the
/// API.
pub struct CalendarView {
    client: Arc<dyn ApiClient>,
    events: Arc<dyn EventSink>,
    year: i32,
    month: u32,
    stats: Vec<DailyStats>,
    days: Vec<CalendarDay>,
    selected_day: Option<usize>,
}

impl CalendarView {
    /// Anchor at the current local month.
    pub fn new(client: Arc<dyn ApiClient>, events: Arc<dyn EventSink>) -> Self {
        let today = Local::now().date_naive();
        Self::anchored(client, events, today.year(), today.month())
    }

    /// Anchor at an explicit reference month.
    pub fn anchored(
        client: Arc<dyn ApiClient>,
        events: Arc<dyn EventSink>,
        year: i32,
        month: u32,
    ) -> Self {
        let mut view = Self {
            client,
            events,
            year,
            month,
            stats: Vec::new(),
            days: Vec::new(),
            selected_day: None,
        };
        view.regenerate();
        view
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn days(&self) -> &[CalendarDay] {
        &self.days
    }

    pub fn stats(&self) -> &[DailyStats] {
        &self.stats
    }

    /// Fetch the daily statistics and rebuild the grid. On transport
    /// failure the previous grid is kept.
    pub async fn load_stats(&mut self) {
        match self.client.daily_stats().await {
            Ok(stats) => {
                self.stats = stats;
                self.regenerate();
            }
            Err(error) => {
                log::warn!("load_stats failed: {error}");
                self.events.emit(AppEvent::OperationFailed {
                    operation: "load_stats".to_string(),
                    message: error.to_string(),
                });
            }
        }
    }

    /// Shift the reference month back; the last-loaded stats are
    /// reused, not re-fetched.
    pub fn previous_month(&mut self) {
        if self.month == 1 {
            self.year -= 1;
            self.month = 12;
        } else {
            self.month -= 1;
        }
        self.regenerate();
    }

    pub fn next_month(&mut self) {
        if self.month == 12 {
            self.year += 1;
            self.month = 1;
        } else {
            self.month += 1;
        }
        self.regenerate();
    }

    pub fn select_day(&mut self, index: usize) -> Result<(), CoreError> {
        if index >= self.days.len() {
            return Err(CoreError::InvalidInput(format!(
                "day index out of range: {index}"
            )));
        }
        self.selected_day = Some(index);
        Ok(())
    }

    pub fn selected_day(&self) -> Option<&CalendarDay> {
        self.selected_day.and_then(|index| self.days.get(index))
    }

    pub fn clear_selection(&mut self) {
        self.selected_day = None;
    }

    /// Total sessions recorded in the displayed month.
    pub fn month_session_total(&self) -> u32 {
        self.days
            .iter()
            .filter(|day| day.in_current_month)
            .map(CalendarDay::session_count)
            .sum()
    }

    /// Total work minutes recorded in the displayed month.
    pub fn month_work_minutes(&self) -> u32 {
        self.days
            .iter()
            .filter(|day| day.in_current_month)
            .filter_map(|day| day.stats.as_ref())
            .map(|stats| stats.total_work_minutes)
            .sum()
    }

    /// `"August 2026"`-style heading for the displayed month.
    pub fn month_label(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(first) => first.format("%B %Y").to_string(),
            None => format!("{}-{}", self.year, self.month),
        }
    }

    fn regenerate(&mut self) {
        self.selected_day = None;
        self.days = build_month_grid(
            self.year,
            self.month,
            &self.stats,
            Local::now().date_naive(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::CollectingEventSink;
    use crate::domain::models::Intensity;
    use crate::infrastructure::memory::MemoryApiClient;
    use proptest::prelude::*;

    fn stats_for(date: &str, sessions: u32, work_minutes: u32) -> DailyStats {
        DailyStats {
            date: date.to_string(),
            total_sessions: sessions,
            total_work_minutes: work_minutes,
            total_break_minutes: sessions * 5,
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn empty_view(
        year: i32,
        month: u32,
    ) -> (CalendarView, Arc<MemoryApiClient>, Arc<CollectingEventSink>) {
        let client = Arc::new(MemoryApiClient::new());
        let events = Arc::new(CollectingEventSink::new());
        let view = CalendarView::anchored(client.clone(), events.clone(), year, month);
        (view, client, events)
    }

    #[test]
    fn february_2026_needs_exactly_four_weeks() {
        // 2026-02-01 is a Sunday and the month has 28 days, so the
        // grid has no adjacent-month padding at all.
        let days = build_month_grid(2026, 2, &[], date(2026, 8, 6));
        assert_eq!(days.len(), 28);
        assert!(days.iter().all(|day| day.in_current_month));
    }

    #[test]
    fn august_2026_pads_both_ends() {
        let days = build_month_grid(2026, 8, &[], date(2026, 8, 6));
        assert_eq!(days.len(), 42);
        assert_eq!(days[0].date, date(2026, 7, 26));
        assert_eq!(days[41].date, date(2026, 9, 5));
        assert!(!days[0].in_current_month);
        assert!(days.iter().any(|day| day.is_today));
    }

    #[test]
    fn stats_attach_to_exactly_their_date() {
        let stats = vec![stats_for("2026-08-03", 4, 100)];
        let days = build_month_grid(2026, 8, &stats, date(2026, 8, 6));

        let marked: Vec<_> = days.iter().filter(|day| day.stats.is_some()).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].date, date(2026, 8, 3));
        assert_eq!(marked[0].intensity(), Intensity::Medium);
    }

    proptest! {
        #[test]
        fn grid_covers_whole_weeks_and_the_full_month(year in 1990i32..2100, month in 1u32..=12) {
            let today = NaiveDate::from_ymd_opt(2026, 8, 6).expect("valid date");
            let days = build_month_grid(year, month, &[], today);

            prop_assert_eq!(days.len() % 7, 0);
            prop_assert_eq!(days[0].date.weekday().num_days_from_sunday(), 0);
            prop_assert_eq!(days[days.len() - 1].date.weekday().num_days_from_sunday(), 6);

            let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid first day");
            prop_assert!(days.iter().any(|day| day.date == first));
            let in_month = days.iter().filter(|day| day.in_current_month).count() as i64;
            let next_first = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1).expect("valid next first")
            } else {
                NaiveDate::from_ymd_opt(year, month + 1, 1).expect("valid next first")
            };
            prop_assert_eq!(in_month, (next_first - first).num_days());

            for window in days.windows(2) {
                prop_assert_eq!(window[1].date - window[0].date, Duration::days(1));
            }
        }
    }

    #[tokio::test]
    async fn totals_ignore_adjacent_month_days() {
        let in_august = crate::domain::models::Session {
            id: None,
            task_id: "1".to_string(),
            work_minutes: 25,
            break_minutes: 5,
            started_at: "2026-08-03T09:00:00Z".parse().expect("timestamp"),
            ended_at: "2026-08-03T09:25:00Z".parse().expect("timestamp"),
        };
        let in_july_padding = crate::domain::models::Session {
            started_at: "2026-07-27T09:00:00Z".parse().expect("timestamp"),
            ended_at: "2026-07-27T09:50:00Z".parse().expect("timestamp"),
            work_minutes: 50,
            ..in_august.clone()
        };

        let client = Arc::new(MemoryApiClient::new());
        client.create_session(&in_august).await.expect("seed");
        client.create_session(&in_july_padding).await.expect("seed");
        let events = Arc::new(CollectingEventSink::new());
        let mut view = CalendarView::anchored(client, events, 2026, 8);
        view.load_stats().await;

        // 2026-07-27 is visible in the August grid but not counted.
        assert!(view
            .days()
            .iter()
            .any(|day| day.date == date(2026, 7, 27) && day.stats.is_some()));
        assert_eq!(view.month_session_total(), 1);
        assert_eq!(view.month_work_minutes(), 25);
    }

    #[tokio::test]
    async fn navigation_crosses_year_boundaries_without_refetch() {
        let (mut view, client, events) = empty_view(2026, 1);
        view.load_stats().await;

        client.fail_next("daily_stats");
        view.previous_month();
        assert_eq!((view.year(), view.month()), (2025, 12));
        view.next_month();
        view.next_month();
        assert_eq!((view.year(), view.month()), (2026, 2));

        // Navigation never touched the API, so the armed failure is
        // still pending and no failure event was emitted.
        assert!(events.take().is_empty());
        assert!(matches!(
            client.daily_stats().await,
            Err(CoreError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn load_failure_keeps_previous_grid() {
        let session = crate::domain::models::Session {
            id: None,
            task_id: "1".to_string(),
            work_minutes: 25,
            break_minutes: 5,
            started_at: "2026-08-03T09:00:00Z".parse().expect("timestamp"),
            ended_at: "2026-08-03T09:25:00Z".parse().expect("timestamp"),
        };
        let client = Arc::new(MemoryApiClient::new());
        client.create_session(&session).await.expect("seed");
        let events = Arc::new(CollectingEventSink::new());
        let mut view = CalendarView::anchored(client.clone(), events.clone(), 2026, 8);
        view.load_stats().await;
        assert_eq!(view.month_session_total(), 1);

        client.fail_next("daily_stats");
        view.load_stats().await;

        assert_eq!(view.month_session_total(), 1);
        let emitted = events.take();
        assert!(matches!(
            emitted.as_slice(),
            [AppEvent::OperationFailed { operation, .. }] if operation == "load_stats"
        ));
    }

    #[tokio::test]
    async fn day_selection_is_bounded_and_cleared_by_navigation() {
        let (mut view, _client, _events) = empty_view(2026, 8);

        assert!(view.select_day(1000).is_err());
        view.select_day(7).expect("select day");
        assert!(view.selected_day().is_some());

        view.next_month();
        assert!(view.selected_day().is_none());
    }

    #[test]
    fn month_label_is_human_readable() {
        let client: Arc<MemoryApiClient> = Arc::new(MemoryApiClient::new());
        let events = Arc::new(CollectingEventSink::new());
        let view = CalendarView::anchored(client, events, 2026, 8);
        assert_eq!(view.month_label(), "August 2026");
    }

    #[test]
    fn minute_formatting_splits_hours() {
        assert_eq!(format_minutes(45), "45min");
        assert_eq!(format_minutes(60), "1h 0min");
        assert_eq!(format_minutes(125), "2h 5min");
        assert_eq!(format_minutes(0), "0min");
    }

    #[test]
    fn dots_cap_at_eight() {
        assert_eq!(dot_count(0), 0);
        assert_eq!(dot_count(3), 3);
        assert_eq!(dot_count(12), 8);
    }
}
