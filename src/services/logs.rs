//! Maintenance log listing

use serde::Serialize;

use super::{best_effort::best_effort, Backend, SESSION_EXPIRED};
use crate::{
    error::{AppError, AppResult},
    models::{CompletionStatus, LogStatus, MaintenanceLog, MaintenanceType, Profile},
    notify::Notice,
};

pub const CONFIRMED: &str = "Maintenance log marked as completed.";
pub const CONFIRM_FAILED: &str = "Failed to mark as completed.";
pub const RATING_RANGE: &str = "Service rating must be between 1 and 5.";

/// Status shown in the log table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StatusBadge {
    Completed,
    Scheduled,
    InProgress,
    Other(String),
}

impl StatusBadge {
    pub fn for_log(log: &MaintenanceLog) -> Self {
        if log.status == Some(LogStatus::Completed)
            || log.completion_status == Some(CompletionStatus::Completed)
        {
            return StatusBadge::Completed;
        }

        let legacy_scheduled = matches!(
            &log.maintenance_type,
            Some(MaintenanceType::Other(t)) if t == "Scheduled"
        );
        if log.status == Some(LogStatus::Scheduled) || legacy_scheduled {
            return StatusBadge::Scheduled;
        }
        if log.status == Some(LogStatus::InProgress) {
            return StatusBadge::InProgress;
        }

        let text = log
            .status
            .as_ref()
            .map(|s| s.as_str().to_string())
            .or_else(|| log.completion_status.as_ref().map(|c| c.as_str().to_string()))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Pending".to_string());
        StatusBadge::Other(text)
    }

    pub fn as_str(&self) -> &str {
        match self {
            StatusBadge::Completed => "Completed",
            StatusBadge::Scheduled => "Scheduled",
            StatusBadge::InProgress => "In Progress",
            StatusBadge::Other(text) => text.as_str(),
        }
    }
}

impl std::fmt::Display for StatusBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authorized roles may confirm anything not yet completed
pub fn can_confirm(profile: &Profile, log: &MaintenanceLog) -> bool {
    profile.is_authorized() && StatusBadge::for_log(log) != StatusBadge::Completed
}

/// One row of the log table
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub log: MaintenanceLog,
    pub badge: StatusBadge,
    pub can_confirm: bool,
}

pub fn rows(profile: &Profile, logs: Vec<MaintenanceLog>) -> Vec<LogRow> {
    logs.into_iter()
        .map(|log| LogRow {
            badge: StatusBadge::for_log(&log),
            can_confirm: can_confirm(profile, &log),
            log,
        })
        .collect()
}

#[derive(Clone)]
pub struct LogsService {
    backend: Backend,
}

impl LogsService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// All logs; empty when the list cannot be read
    pub async fn list(&self) -> Vec<MaintenanceLog> {
        best_effort("list_logs", self.backend.api.list_logs())
            .await
            .unwrap_or_default()
    }

    pub async fn rows(&self, profile: &Profile) -> Vec<LogRow> {
        rows(profile, self.list().await)
    }

    /// Close a log directly with a service rating
    pub async fn confirm(&self, profile: &Profile, log: &MaintenanceLog, service_rating: u8) -> AppResult<()> {
        if !can_confirm(profile, log) {
            return Err(AppError::Authorization(format!(
                "Maintenance {} cannot be confirmed by this user",
                log.maintenance_id
            )));
        }
        if !(1..=5).contains(&service_rating) {
            self.backend.notify(Notice::warning(RATING_RANGE));
            return Err(AppError::Validation(RATING_RANGE.to_string()));
        }

        match self.backend.api.confirm(&log.maintenance_id, service_rating).await {
            Ok(_) => {
                tracing::info!(maintenance_id = %log.maintenance_id, service_rating, "Maintenance confirmed");
                self.backend.notify(Notice::success(CONFIRMED));
                Ok(())
            }
            Err(e) if e.is_session_failure() => {
                self.backend.notify(Notice::error(SESSION_EXPIRED));
                self.backend.terminate_session(SESSION_EXPIRED);
                Err(e)
            }
            Err(e) => {
                tracing::warn!(maintenance_id = %log.maintenance_id, error = %e, "Confirm failed");
                self.backend.notify(Notice::error(CONFIRM_FAILED));
                Err(e)
            }
        }
    }
}
