use serde::Serialize;

use crate::arrangement::{ArrangementId, WindowRecord};

/// How a single window record fared during restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RestoreStatus {
    Restored,
    AppNotRunning,
    WindowNotFound,
    ControlFailed { reason: String },
}

impl RestoreStatus {
    pub fn is_restored(&self) -> bool {
        matches!(self, RestoreStatus::Restored)
    }
}

impl std::fmt::Display for RestoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestoreStatus::Restored => write!(f, "restored"),
            RestoreStatus::AppNotRunning => write!(f, "app not running"),
            RestoreStatus::WindowNotFound => write!(f, "window not found"),
            RestoreStatus::ControlFailed { reason } => write!(f, "control failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestoreOutcome {
    pub owning_app_id: String,
    pub app_display_name: String,
    pub window_title: String,
    #[serde(flatten)]
    pub status: RestoreStatus,
}

impl RestoreOutcome {
    pub fn new(record: &WindowRecord, status: RestoreStatus) -> Self {
        Self {
            owning_app_id: record.owning_app_id.clone(),
            app_display_name: record.app_display_name.clone(),
            window_title: record.window_title.clone(),
            status,
        }
    }

    /// Human-readable one-liner, e.g. `Safari "Docs": restored`.
    pub fn summary(&self) -> String {
        let title = if self.window_title.is_empty() {
            "(untitled)".to_string()
        } else {
            format!("\"{}\"", self.window_title)
        };
        format!("{} {}: {}", self.app_display_name, title, self.status)
    }
}

/// Per-window results of one restore, in arrangement order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestoreReport {
    pub arrangement_id: ArrangementId,
    pub arrangement_name: String,
    pub outcomes: Vec<RestoreOutcome>,
}

impl RestoreReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn restored_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_restored()).count()
    }

    /// Outcomes that did not restore.
    pub fn failed(&self) -> impl Iterator<Item = &RestoreOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_restored())
    }

    pub fn is_complete(&self) -> bool {
        self.failed().next().is_none()
    }

    pub fn summary(&self) -> Vec<String> {
        self.outcomes.iter().map(RestoreOutcome::summary).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::Frame;
    use crate::testing::window_record;

    fn report(statuses: Vec<RestoreStatus>) -> RestoreReport {
        let record = window_record("com.apple.Safari", "Docs", Frame::default());
        RestoreReport {
            arrangement_id: ArrangementId::generate(),
            arrangement_name: "Work".to_string(),
            outcomes: statuses
                .into_iter()
                .map(|s| RestoreOutcome::new(&record, s))
                .collect(),
        }
    }

    #[test]
    fn test_report_counts() {
        let report = report(vec![
            RestoreStatus::Restored,
            RestoreStatus::AppNotRunning,
            RestoreStatus::ControlFailed {
                reason: "denied".to_string(),
            },
        ]);
        assert_eq!(report.total(), 3);
        assert_eq!(report.restored_count(), 1);
        assert_eq!(report.failed().count(), 2);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_summary_lines() {
        let report = report(vec![
            RestoreStatus::Restored,
            RestoreStatus::ControlFailed {
                reason: "window is not resizable".to_string(),
            },
        ]);
        assert_eq!(
            report.summary(),
            [
                "Safari \"Docs\": restored".to_string(),
                "Safari \"Docs\": control failed: window is not resizable".to_string(),
            ]
        );
    }

    #[test]
    fn test_untitled_summary() {
        let record = window_record("com.example.app", "", Frame::default());
        let outcome = RestoreOutcome::new(&record, RestoreStatus::WindowNotFound);
        assert_eq!(outcome.summary(), "app (untitled): window not found");
    }

    #[test]
    fn test_outcome_serializes_status_inline() {
        let record = window_record("com.example.app", "Doc", Frame::default());
        let outcome = RestoreOutcome::new(&record, RestoreStatus::AppNotRunning);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "app_not_running");
        assert_eq!(json["window_title"], "Doc");
    }

    #[test]
    fn test_empty_report_is_complete() {
        assert!(report(vec![]).is_complete());
    }
}
