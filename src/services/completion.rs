//! Technician completion of a scheduled task

use validator::Validate;

use super::{Backend, SESSION_EXPIRED};
use crate::{
    error::{AppError, AppResult},
    models::{CompletionRequest, LogStatus, MaintenanceLog, Profile},
    notify::Notice,
};

pub const COMPLETED: &str = "Maintenance marked as completed! Admin will be notified for review.";
pub const NO_TASK_FOUND: &str = "No maintenance task found for this equipment.";
pub const FIELDS_REQUIRED: &str = "Please fill in all required fields (downtime hours and cost).";
pub const CANNOT_REACH: &str =
    "Cannot connect to server. Please check if the backend is running and try again.";

/// Completion form as typed by the technician
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct CompletionDraft {
    #[validate(
        required(message = "Please fill in all required fields (downtime hours and cost)."),
        range(min = 0.0, message = "Downtime hours cannot be negative.")
    )]
    pub downtime_hours: Option<f64>,

    #[validate(
        required(message = "Please fill in all required fields (downtime hours and cost)."),
        range(min = 0.0, message = "Cost cannot be negative.")
    )]
    pub cost_inr: Option<f64>,

    pub parts_replaced: String,
    pub vendor: String,

    #[validate(range(min = 0.0, message = "Response time cannot be negative."))]
    pub response_time_hours: Option<f64>,
}

impl CompletionDraft {
    /// `Parts: <p> | Vendor: <v> | Response Time: <r> hours`
    pub fn remarks(&self) -> String {
        let text = |value: &str, fallback: &str| {
            let value = value.trim();
            if value.is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };
        let response_time = self
            .response_time_hours
            .map(|r| r.to_string())
            .unwrap_or_else(|| "N/A".to_string());

        format!(
            "Parts: {} | Vendor: {} | Response Time: {} hours",
            text(&self.parts_replaced, "None"),
            text(&self.vendor, "N/A"),
            response_time
        )
    }

    /// Validate locally and build the request body for `technician_id`
    pub fn to_request(&self, technician_id: String) -> AppResult<CompletionRequest> {
        self.validate()?;
        let finite = |v: Option<f64>| v.filter(|n| n.is_finite());
        let (Some(downtime_hours), Some(cost_inr)) = (finite(self.downtime_hours), finite(self.cost_inr)) else {
            return Err(AppError::Validation(FIELDS_REQUIRED.to_string()));
        };

        Ok(CompletionRequest {
            downtime_hours,
            cost_inr,
            remarks: self.remarks(),
            technician_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompletionState {
    Idle,
    Locating { equipment_id: String },
    Composing { log: MaintenanceLog, draft: CompletionDraft },
    Submitting { log: MaintenanceLog },
    Succeeded { maintenance_id: String },
    Failed { log: MaintenanceLog, draft: CompletionDraft, message: String },
}

/// First log for `equipment_id` that still needs technician attention
pub fn find_task<'a>(logs: &'a [MaintenanceLog], equipment_id: &str) -> Option<&'a MaintenanceLog> {
    logs.iter()
        .find(|log| log.equipment_id == equipment_id && log.is_active())
}

pub struct CompletionFlow {
    backend: Backend,
    state: CompletionState,
}

impl CompletionFlow {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            state: CompletionState::Idle,
        }
    }

    pub fn state(&self) -> &CompletionState {
        &self.state
    }

    /// Log being completed, when the composer is open
    pub fn task(&self) -> Option<&MaintenanceLog> {
        match &self.state {
            CompletionState::Composing { log, .. } | CompletionState::Failed { log, .. } => Some(log),
            _ => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut CompletionDraft> {
        match &mut self.state {
            CompletionState::Composing { draft, .. } | CompletionState::Failed { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.state = CompletionState::Idle;
    }

    /// Find the task to complete for `equipment_id` and open the composer
    pub async fn locate(&mut self, equipment_id: &str) -> AppResult<&MaintenanceLog> {
        self.state = CompletionState::Locating {
            equipment_id: equipment_id.to_string(),
        };

        let logs = match self.backend.api.logs_by_equipment(equipment_id).await {
            Ok(logs) => logs,
            Err(e) => {
                self.state = CompletionState::Idle;
                let message = match &e {
                    AppError::Network(_) => CANNOT_REACH.to_string(),
                    _ => format!(
                        "Error loading maintenance details: {}",
                        e.detail().map(str::to_string).unwrap_or_else(|| e.to_string())
                    ),
                };
                self.report_failure(&e, message);
                return Err(e);
            }
        };

        let Some(log) = find_task(&logs, equipment_id).cloned() else {
            self.state = CompletionState::Idle;
            self.backend.notify(Notice::warning(NO_TASK_FOUND));
            return Err(AppError::NotFound(NO_TASK_FOUND.to_string()));
        };

        tracing::debug!(equipment_id = %equipment_id, maintenance_id = %log.maintenance_id, "Completion task located");
        self.state = CompletionState::Composing {
            log,
            draft: CompletionDraft::default(),
        };
        self.task()
            .ok_or_else(|| AppError::Internal("completion composer did not open".to_string()))
    }

    /// Report progress on the open task without completing it
    pub async fn mark_in_progress(&mut self) -> AppResult<()> {
        let maintenance_id = self
            .task()
            .map(|log| log.maintenance_id.clone())
            .ok_or_else(|| AppError::Validation("No maintenance task is open".to_string()))?;

        match self
            .backend
            .api
            .update_status(&maintenance_id, &LogStatus::InProgress)
            .await
        {
            Ok(ack) => {
                if let Some(message) = ack.message {
                    self.backend.notify(Notice::info(message));
                }
                Ok(())
            }
            Err(e) => {
                let message = self.failure_message(&e);
                self.report_failure(&e, message);
                Err(e)
            }
        }
    }

    /// Submit the open draft on behalf of `profile`.
    ///
    /// Missing fields or an unresolvable technician identity are rejected
    /// without any request.
    pub async fn submit(&mut self, profile: &Profile) -> AppResult<String> {
        let (log, draft) = match &self.state {
            CompletionState::Composing { log, draft } | CompletionState::Failed { log, draft, .. } => {
                (log.clone(), draft.clone())
            }
            _ => return Err(AppError::Validation("No maintenance task is open".to_string())),
        };

        let request = match profile
            .technician_identity()
            .and_then(|technician_id| draft.to_request(technician_id))
        {
            Ok(request) => request,
            Err(e) => {
                let message = match &e {
                    AppError::Validation(msg) => msg.clone(),
                    other => other.to_string(),
                };
                self.backend.notify(Notice::warning(message));
                return Err(e);
            }
        };

        self.state = CompletionState::Submitting { log: log.clone() };
        tracing::info!(
            maintenance_id = %log.maintenance_id,
            technician_id = %request.technician_id,
            "Submitting maintenance completion"
        );

        match self.backend.api.mark_complete(&log.maintenance_id, &request).await {
            Ok(_) => {
                self.backend.notify(Notice::success(COMPLETED));
                self.state = CompletionState::Succeeded {
                    maintenance_id: log.maintenance_id.clone(),
                };
                Ok(log.maintenance_id)
            }
            Err(e) => {
                let message = self.failure_message(&e);
                tracing::warn!(maintenance_id = %log.maintenance_id, error = %e, "Completion failed");
                self.report_failure(&e, message.clone());
                if !e.is_session_failure() {
                    self.state = CompletionState::Failed { log, draft, message };
                }
                Err(e)
            }
        }
    }

    fn failure_message(&self, err: &AppError) -> String {
        match err {
            AppError::Authentication(_) | AppError::Authorization(_) => SESSION_EXPIRED.to_string(),
            AppError::Network(_) => CANNOT_REACH.to_string(),
            AppError::Server { status, detail } => detail
                .clone()
                .unwrap_or_else(|| format!("Server error: {}", status)),
            other => other
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        }
    }

    /// Session failures end the session; everything else is a plain error notice
    fn report_failure(&mut self, err: &AppError, message: String) {
        if err.is_session_failure() {
            self.backend.notify(Notice::error(SESSION_EXPIRED));
            self.backend.terminate_session(SESSION_EXPIRED);
            self.state = CompletionState::Idle;
        } else {
            self.backend.notify(Notice::error(message));
        }
    }
}
