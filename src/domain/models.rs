use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A task as exchanged with the remote API. Field names on the wire
/// follow the collaborator's schema (`titulo`, `concluida`, ...);
/// `id` and `data_criacao` are assigned by the server on creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "concluida")]
    pub completed: bool,
    #[serde(rename = "data_criacao", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.title, "task.titulo")
    }
}

/// One completed work interval. Created exactly once per finished work
/// phase and never updated or deleted by this client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "tarefa_id")]
    pub task_id: String,
    #[serde(rename = "duracao_trabalho")]
    pub work_minutes: u32,
    #[serde(rename = "duracao_descanso")]
    pub break_minutes: u32,
    #[serde(rename = "data_inicio")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "data_fim")]
    pub ended_at: DateTime<Utc>,
}

impl Session {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.task_id, "session.tarefa_id")?;
        if self.work_minutes == 0 {
            return Err("session.duracao_trabalho must be > 0".to_string());
        }
        if self.break_minutes == 0 {
            return Err("session.duracao_descanso must be > 0".to_string());
        }
        if self.ended_at <= self.started_at {
            return Err("session.data_fim must be after session.data_inicio".to_string());
        }
        Ok(())
    }
}

/// Server-side aggregate of the sessions recorded on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyStats {
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "total_pomodoros")]
    pub total_sessions: u32,
    #[serde(rename = "tempo_total_trabalho")]
    pub total_work_minutes: u32,
    #[serde(rename = "tempo_total_descanso")]
    pub total_break_minutes: u32,
}

impl DailyStats {
    pub fn validate(&self) -> Result<(), String> {
        validate_date(&self.date, "stats.data")
    }
}

/// One cell of the month grid. Derived on the client and regenerated
/// on every navigation or stats refresh; never sent anywhere.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub stats: Option<DailyStats>,
    pub in_current_month: bool,
    pub is_today: bool,
}

impl CalendarDay {
    /// Key used to match this cell against `DailyStats.date`. Built
    /// from the date's own calendar fields, never a UTC-shifted clock.
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn session_count(&self) -> u32 {
        self.stats
            .as_ref()
            .map(|stats| stats.total_sessions)
            .unwrap_or(0)
    }

    pub fn intensity(&self) -> Intensity {
        Intensity::for_count(self.session_count())
    }
}

/// Display bucket for a day's session count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Intensity {
    None,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Intensity {
    pub fn for_count(count: u32) -> Self {
        match count {
            0 => Self::None,
            1..=2 => Self::Low,
            3..=4 => Self::Medium,
            5..=6 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very-high",
        }
    }
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

fn validate_date(value: &str, field_name: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("{field_name} must be YYYY-MM-DD"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn sample_task() -> Task {
        Task {
            id: Some("5".to_string()),
            title: "Write report".to_string(),
            description: Some("quarterly summary".to_string()),
            completed: false,
            created_at: Some(fixed_time("2026-08-03T08:00:00Z")),
        }
    }

    fn sample_session() -> Session {
        Session {
            id: Some("pom-1".to_string()),
            task_id: "5".to_string(),
            work_minutes: 25,
            break_minutes: 5,
            started_at: fixed_time("2026-08-03T09:00:00Z"),
            ended_at: fixed_time("2026-08-03T09:25:00Z"),
        }
    }

    fn sample_stats() -> DailyStats {
        DailyStats {
            date: "2026-08-03".to_string(),
            total_sessions: 4,
            total_work_minutes: 100,
            total_break_minutes: 20,
        }
    }

    #[test]
    fn task_validate_rejects_blank_title() {
        let mut task = sample_task();
        task.title = "   ".to_string();
        assert!(task.validate().is_err());
        assert!(sample_task().validate().is_ok());
    }

    #[test]
    fn session_validate_rejects_zero_durations() {
        let mut session = sample_session();
        session.work_minutes = 0;
        assert!(session.validate().is_err());

        let mut session = sample_session();
        session.break_minutes = 0;
        assert!(session.validate().is_err());
    }

    #[test]
    fn session_validate_rejects_reversed_interval() {
        let mut session = sample_session();
        session.ended_at = session.started_at;
        assert!(session.validate().is_err());
    }

    #[test]
    fn stats_validate_rejects_malformed_date() {
        let mut stats = sample_stats();
        stats.date = "03/08/2026".to_string();
        assert!(stats.validate().is_err());
        assert!(sample_stats().validate().is_ok());
    }

    #[test]
    fn task_serializes_with_wire_field_names() {
        let value = serde_json::to_value(sample_task()).expect("serialize task");
        let object = value.as_object().expect("task object");
        assert!(object.contains_key("titulo"));
        assert!(object.contains_key("descricao"));
        assert!(object.contains_key("concluida"));
        assert!(object.contains_key("data_criacao"));
        assert!(!object.contains_key("title"));
    }

    #[test]
    fn unsaved_task_omits_server_assigned_fields() {
        let task = Task {
            id: None,
            title: "New".to_string(),
            description: None,
            completed: false,
            created_at: None,
        };
        let value = serde_json::to_value(task).expect("serialize task");
        let object = value.as_object().expect("task object");
        assert!(!object.contains_key("id"));
        assert!(!object.contains_key("data_criacao"));
    }

    #[test]
    fn session_serializes_with_wire_field_names() {
        let value = serde_json::to_value(sample_session()).expect("serialize session");
        let object = value.as_object().expect("session object");
        for key in [
            "tarefa_id",
            "duracao_trabalho",
            "duracao_descanso",
            "data_inicio",
            "data_fim",
        ] {
            assert!(object.contains_key(key), "missing wire field {key}");
        }
    }

    #[test]
    fn stats_deserialize_from_wire_payload() {
        let stats: DailyStats = serde_json::from_str(
            r#"{"data":"2026-08-03","total_pomodoros":4,"tempo_total_trabalho":100,"tempo_total_descanso":20}"#,
        )
        .expect("deserialize stats");
        assert_eq!(stats, sample_stats());
    }

    #[test]
    fn models_support_serde_roundtrip() {
        let task = sample_task();
        let session = sample_session();
        let stats = sample_stats();

        let task_roundtrip: Task =
            serde_json::from_str(&serde_json::to_string(&task).expect("serialize task"))
                .expect("deserialize task");
        let session_roundtrip: Session =
            serde_json::from_str(&serde_json::to_string(&session).expect("serialize session"))
                .expect("deserialize session");
        let stats_roundtrip: DailyStats =
            serde_json::from_str(&serde_json::to_string(&stats).expect("serialize stats"))
                .expect("deserialize stats");

        assert_eq!(task_roundtrip, task);
        assert_eq!(session_roundtrip, session);
        assert_eq!(stats_roundtrip, stats);
    }

    #[test]
    fn intensity_buckets_match_display_scale() {
        assert_eq!(Intensity::for_count(0), Intensity::None);
        assert_eq!(Intensity::for_count(2), Intensity::Low);
        assert_eq!(Intensity::for_count(4), Intensity::Medium);
        assert_eq!(Intensity::for_count(6), Intensity::High);
        assert_eq!(Intensity::for_count(7), Intensity::VeryHigh);
        assert_eq!(Intensity::VeryHigh.as_str(), "very-high");
    }

    #[test]
    fn calendar_day_key_uses_calendar_fields() {
        let day = CalendarDay {
            date: NaiveDate::from_ymd_opt(2026, 8, 3).expect("valid date"),
            stats: Some(sample_stats()),
            in_current_month: true,
            is_today: false,
        };
        assert_eq!(day.date_key(), "2026-08-03");
        assert_eq!(day.session_count(), 4);
        assert_eq!(day.intensity(), Intensity::Medium);
    }
}
