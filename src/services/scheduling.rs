//! Scheduling a maintenance visit for one equipment item

use chrono::{NaiveDate, Utc};

use super::Backend;
use crate::{
    error::{AppError, AppResult},
    models::{MaintenanceType, ScheduleRequest},
    notify::Notice,
};

pub const SCHEDULED: &str = "Maintenance scheduled successfully.";
pub const PERMISSION_DENIED: &str = "Permission denied. Please check your role permissions.";
pub const SCHEDULE_CONFLICT: &str =
    "There was a conflict generating the maintenance ID. Please try again.";
pub const SCHEDULE_FAILED: &str = "Error scheduling maintenance";
pub const DESCRIPTION_REQUIRED: &str = "Please provide an issue description before scheduling.";
pub const ALREADY_SCHEDULED: &str = "Maintenance is already scheduled for this equipment.";
pub const CANNOT_CONNECT: &str = "Network error - Cannot connect to server.";

/// Form contents for one schedule request
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDraft {
    pub equipment_id: String,
    /// `None` means today
    pub date: Option<NaiveDate>,
    pub issue_description: String,
    pub maintenance_type: MaintenanceType,
    pub technician_id: Option<String>,
}

impl ScheduleDraft {
    pub fn new(equipment_id: impl Into<String>) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            date: None,
            issue_description: String::new(),
            maintenance_type: MaintenanceType::Preventive,
            technician_id: None,
        }
    }

    /// Validate locally and build the request body
    pub fn to_request(&self, today: NaiveDate) -> AppResult<ScheduleRequest> {
        let description = self.issue_description.trim();
        if description.is_empty() {
            return Err(AppError::Validation(DESCRIPTION_REQUIRED.to_string()));
        }

        Ok(ScheduleRequest {
            maintenance_type: self.maintenance_type.clone(),
            date: self.date.unwrap_or(today),
            issue_description: description.to_string(),
            technician_id: self
                .technician_id
                .clone()
                .filter(|t| !t.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchedulingState {
    Idle,
    Composing(ScheduleDraft),
    Submitting(ScheduleDraft),
    Succeeded(ScheduleOutcome),
    /// The draft is kept so the user can resubmit
    Failed { draft: ScheduleDraft, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleOutcome {
    pub equipment_id: String,
    pub maintenance_id: Option<String>,
    pub message: String,
}

/// User-facing text for a failed schedule call
pub fn failure_message(err: &AppError) -> String {
    match err {
        AppError::Authorization(_) => PERMISSION_DENIED.to_string(),
        AppError::Validation(msg) => msg.clone(),
        AppError::Network(_) => CANNOT_CONNECT.to_string(),
        _ => match err.detail() {
            Some(detail) if detail.contains("UNIQUE constraint") => SCHEDULE_CONFLICT.to_string(),
            Some(detail) if !detail.is_empty() => detail.to_string(),
            _ => SCHEDULE_FAILED.to_string(),
        },
    }
}

/// Single-draft scheduling composer
pub struct SchedulingFlow {
    backend: Backend,
    state: SchedulingState,
}

impl SchedulingFlow {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            state: SchedulingState::Idle,
        }
    }

    pub fn state(&self) -> &SchedulingState {
        &self.state
    }

    /// Equipment whose draft is open, if any
    pub fn open_for(&self) -> Option<&str> {
        self.draft().map(|d| d.equipment_id.as_str())
    }

    pub fn draft(&self) -> Option<&ScheduleDraft> {
        match &self.state {
            SchedulingState::Composing(draft) | SchedulingState::Failed { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut ScheduleDraft> {
        match &mut self.state {
            SchedulingState::Composing(draft) | SchedulingState::Failed { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Open the composer for `equipment_id`, discarding any other open draft
    pub fn open(&mut self, equipment_id: &str, already_scheduled: bool) -> AppResult<()> {
        if already_scheduled {
            return Err(AppError::Validation(ALREADY_SCHEDULED.to_string()));
        }
        if let Some(previous) = self.open_for() {
            if previous != equipment_id {
                tracing::debug!(previous = %previous, equipment_id = %equipment_id, "Replacing open schedule draft");
            }
        }
        self.state = SchedulingState::Composing(ScheduleDraft::new(equipment_id));
        Ok(())
    }

    /// Close the composer without contacting the backend
    pub fn cancel(&mut self) {
        self.state = SchedulingState::Idle;
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        if let Some(draft) = self.draft_mut() {
            draft.date = Some(date);
        }
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        if let Some(draft) = self.draft_mut() {
            draft.issue_description = description.into();
        }
    }

    pub fn set_maintenance_type(&mut self, maintenance_type: MaintenanceType) {
        if let Some(draft) = self.draft_mut() {
            draft.maintenance_type = maintenance_type;
        }
    }

    pub fn set_technician(&mut self, technician_id: Option<String>) {
        if let Some(draft) = self.draft_mut() {
            draft.technician_id = technician_id;
        }
    }

    /// Submit the open draft.
    ///
    /// A blank description is rejected without any request. On failure the
    /// draft stays open; nothing is retried.
    pub async fn submit(&mut self) -> AppResult<ScheduleOutcome> {
        let draft = self
            .draft()
            .cloned()
            .ok_or_else(|| AppError::Validation("No schedule draft is open".to_string()))?;

        let request = match draft.to_request(Utc::now().date_naive()) {
            Ok(request) => request,
            Err(e) => {
                self.backend.notify(Notice::warning(failure_message(&e)));
                return Err(e);
            }
        };

        self.state = SchedulingState::Submitting(draft.clone());
        tracing::info!(
            equipment_id = %draft.equipment_id,
            date = %request.date,
            maintenance_type = %request.maintenance_type,
            "Scheduling maintenance"
        );

        match self.backend.api.schedule(&draft.equipment_id, &request).await {
            Ok(receipt) => {
                let outcome = ScheduleOutcome {
                    equipment_id: draft.equipment_id,
                    maintenance_id: receipt.maintenance_id,
                    message: receipt
                        .message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| SCHEDULED.to_string()),
                };
                self.backend.notify(Notice::success(outcome.message.clone()));
                self.state = SchedulingState::Succeeded(outcome.clone());
                Ok(outcome)
            }
            Err(e) => {
                let message = failure_message(&e);
                tracing::warn!(equipment_id = %draft.equipment_id, error = %e, "Scheduling failed");
                self.backend.notify(Notice::error(message.clone()));
                self.state = SchedulingState::Failed { draft, message };
                Err(e)
            }
        }
    }
}
