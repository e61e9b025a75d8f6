use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{GoogleError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    #[default]
    NeedsAction,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Body of a task insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// RFC 3339 timestamp; see `to_rfc3339`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

impl NewTask {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// Parses `due` with `to_rfc3339`.
    pub fn due(mut self, due: &str, day_first: bool) -> Result<Self> {
        self.due = Some(to_rfc3339(due, day_first)?);
        Ok(self)
    }
}

const RFC3339_MILLIS: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// Formats a date or date-time string as the timestamp Tasks expects
/// (`2024-03-05T00:00:00.000Z`). Accepts RFC 3339, ISO dates and date-times,
/// and slash dates read as `d/m/Y` when `day_first`, `m/d/Y` otherwise.
pub fn to_rfc3339(value: &str, day_first: bool) -> Result<String> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc).format(RFC3339_MILLIS).to_string());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.format(RFC3339_MILLIS).to_string());
        }
    }

    let slash_format = if day_first { "%d/%m/%Y" } else { "%m/%d/%Y" };
    for format in ["%Y-%m-%d", slash_format] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
            return Ok(midnight.format(RFC3339_MILLIS).to_string());
        }
    }

    Err(GoogleError::InvalidArgument(format!(
        "'{}' is not a recognised date or date-time",
        value
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_are_formatted_at_midnight_utc() {
        assert_eq!(to_rfc3339("2024-03-05", false).unwrap(), "2024-03-05T00:00:00.000Z");
        assert_eq!(
            to_rfc3339("2024-03-05T14:30:00", false).unwrap(),
            "2024-03-05T14:30:00.000Z"
        );
        assert_eq!(
            to_rfc3339("2024-03-05T14:30:00+02:00", false).unwrap(),
            "2024-03-05T12:30:00.000Z"
        );
    }

    #[test]
    fn slash_dates_follow_day_first() {
        assert_eq!(to_rfc3339("05/03/2024", true).unwrap(), "2024-03-05T00:00:00.000Z");
        assert_eq!(to_rfc3339("05/03/2024", false).unwrap(), "2024-05-03T00:00:00.000Z");
        assert!(to_rfc3339("31/12/2024", false).is_err());
        assert!(to_rfc3339("tomorrow", false).is_err());
    }

    #[test]
    fn new_task_omits_unset_fields() {
        let task = NewTask::new("Buy milk").due("2024-01-02", false).unwrap();
        assert_eq!(
            serde_json::to_value(task).unwrap(),
            serde_json::json!({ "title": "Buy milk", "due": "2024-01-02T00:00:00.000Z" })
        );
    }

    #[test]
    fn status_uses_api_names() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": "t1", "title": "x", "status": "completed"
        }))
        .unwrap();
        assert!(task.is_completed());
    }
}
