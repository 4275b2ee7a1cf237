//! In-memory maintenance backend for workflow tests

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Value};

use medmaint_console::{
    api::MaintenanceApi,
    config::AppConfig,
    error::{AppError, AppResult},
    models::{
        ApiMessage, CompletionRequest, CompletionStatus, EdaImage, Equipment, EquipmentInsight,
        LogStatus, MaintenanceLog, PendingReview, PriorityAssessment, Profile, ReviewReceipt,
        ReviewRequest, ScheduleReceipt, ScheduleRequest, ScheduledTask, UserSummary,
    },
    notify::MemoryNotifier,
    session::Session,
    Console,
};

#[derive(Default)]
pub struct FakeState {
    pub profile: Profile,
    pub equipments: Vec<Equipment>,
    pub users: Vec<UserSummary>,
    pub logs: Vec<MaintenanceLog>,
    pub priorities: HashMap<String, PriorityAssessment>,
    /// Successive answers of the new-scheduled endpoint; the last one repeats
    pub new_scheduled_counts: VecDeque<usize>,
    /// Answer 403 to the profile endpoint
    pub forbid_profile: bool,
    /// Answer 500 to the equipment list
    pub fail_equipment_list: bool,
    pub schedule_requests: Vec<(String, Value)>,
    pub completion_requests: Vec<(String, CompletionRequest)>,
    pub review_requests: Vec<(String, ReviewRequest)>,
    next_id: u32,
}

/// Backend double that keeps maintenance logs in memory and applies the
/// same transitions as the real service
#[derive(Clone)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
    session: Session,
}

impl FakeBackend {
    pub fn new(session: Session) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                next_id: 1000,
                ..Default::default()
            })),
            session,
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn authorize(&self) -> AppResult<MutexGuard<'_, FakeState>> {
        self.session.bearer()?;
        Ok(self.state())
    }

    pub fn log(&self, maintenance_id: &str) -> Option<MaintenanceLog> {
        self.state()
            .logs
            .iter()
            .find(|l| l.maintenance_id == maintenance_id)
            .cloned()
    }
}

pub fn equipment(id: &str, kind: &str, location: &str) -> Equipment {
    Equipment {
        equipment_id: id.to_string(),
        equipment_type: kind.to_string(),
        manufacturer: "Acme".to_string(),
        location: location.to_string(),
        criticality: "High".to_string(),
        installation_date: Some("2020-01-15".to_string()),
    }
}

pub fn log(value: Value) -> MaintenanceLog {
    serde_json::from_value(value).unwrap()
}

pub fn profile(role: &str, personnel_id: Option<&str>) -> Profile {
    Profile {
        name: Some("Test User".to_string()),
        role: Some(role.to_string()),
        personnel_id: personnel_id.map(str::to_string),
        ..Default::default()
    }
}

pub fn healthy(id: &str) -> PriorityAssessment {
    serde_json::from_value(json!({
        "equipment_id": id,
        "predicted_to_fail": false,
        "maintenance_needs": {"preventive": "Low", "corrective": "Low", "replacement": "Low"}
    }))
    .unwrap()
}

pub fn at_risk(id: &str) -> PriorityAssessment {
    serde_json::from_value(json!({
        "equipment_id": id,
        "predicted_to_fail": true,
        "maintenance_needs": {"preventive": "High", "corrective": "Low"}
    }))
    .unwrap()
}

/// Console wired to a fresh fake backend
pub struct Harness {
    pub console: Console,
    pub backend: FakeBackend,
    pub notifier: Arc<MemoryNotifier>,
}

impl Harness {
    pub fn new(setup: impl FnOnce(&mut FakeState)) -> Self {
        let session = Session::with_token("test-token");
        let backend = FakeBackend::new(session.clone());
        setup(&mut backend.state());

        let notifier = Arc::new(MemoryNotifier::new());
        let console = Console::with_api(
            AppConfig::default(),
            session,
            Arc::new(backend.clone()),
            notifier.clone(),
        );
        Self {
            console,
            backend,
            notifier,
        }
    }
}

#[async_trait]
impl MaintenanceApi for FakeBackend {
    async fn current_user(&self) -> AppResult<Profile> {
        let state = self.authorize()?;
        if state.forbid_profile {
            return Err(AppError::Authorization("Not authenticated".into()));
        }
        Ok(state.profile.clone())
    }

    async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
        Ok(self.authorize()?.users.clone())
    }

    async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        let state = self.authorize()?;
        if state.fail_equipment_list {
            return Err(AppError::Server {
                status: 500,
                detail: Some("database is locked".into()),
            });
        }
        Ok(state.equipments.clone())
    }

    async fn get_equipment(&self, equipment_id: &str) -> AppResult<Equipment> {
        self.authorize()?
            .equipments
            .iter()
            .find(|e| e.equipment_id == equipment_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Equipment not found".into()))
    }

    async fn list_logs(&self) -> AppResult<Vec<MaintenanceLog>> {
        Ok(self.authorize()?.logs.clone())
    }

    async fn logs_by_equipment(&self, equipment_id: &str) -> AppResult<Vec<MaintenanceLog>> {
        Ok(self
            .authorize()?
            .logs
            .iter()
            .filter(|l| l.equipment_id == equipment_id)
            .cloned()
            .collect())
    }

    async fn pending_reviews(&self) -> AppResult<Vec<PendingReview>> {
        Ok(self
            .authorize()?
            .logs
            .iter()
            .filter(|l| l.is_pending_review())
            .map(|l| PendingReview {
                maintenance_id: l.maintenance_id.clone(),
                equipment_id: l.equipment_id.clone(),
                technician_id: l.technician_id.clone(),
                date: l.date.clone(),
            })
            .collect())
    }

    async fn new_scheduled(&self) -> AppResult<Vec<ScheduledTask>> {
        let mut state = self.authorize()?;
        let count = if state.new_scheduled_counts.len() > 1 {
            state.new_scheduled_counts.pop_front().unwrap_or(0)
        } else {
            state.new_scheduled_counts.front().copied().unwrap_or(0)
        };
        Ok((0..count)
            .map(|i| ScheduledTask {
                maintenance_id: format!("MTN{i}"),
                equipment_id: format!("EQ-{i}"),
                date: None,
                maintenance_type: None,
            })
            .collect())
    }

    async fn schedule(&self, equipment_id: &str, request: &ScheduleRequest) -> AppResult<ScheduleReceipt> {
        let mut state = self.authorize()?;
        state.next_id += 1;
        let maintenance_id = format!("MTN{}", state.next_id);

        let body = serde_json::to_value(request)?;
        state
            .schedule_requests
            .push((equipment_id.to_string(), body.clone()));

        let mut row = json!({
            "maintenance_id": maintenance_id,
            "equipment_id": equipment_id,
            "status": "Scheduled",
            "completion_status": "Pending"
        });
        if let (Some(row), Some(body)) = (row.as_object_mut(), body.as_object()) {
            row.extend(body.clone());
        }
        state.logs.push(serde_json::from_value(row)?);

        Ok(ScheduleReceipt {
            message: Some(format!("Maintenance scheduled successfully with ID {}", maintenance_id)),
            maintenance_id: Some(maintenance_id),
        })
    }

    async fn mark_complete(&self, maintenance_id: &str, request: &CompletionRequest) -> AppResult<ApiMessage> {
        let mut state = self.authorize()?;
        state
            .completion_requests
            .push((maintenance_id.to_string(), request.clone()));
        let log = state
            .logs
            .iter_mut()
            .find(|l| l.maintenance_id == maintenance_id)
            .ok_or_else(|| AppError::NotFound("Maintenance log not found".into()))?;
        log.status = Some(LogStatus::Completed);
        log.completion_status = Some(CompletionStatus::Pending);
        log.downtime_hours = Some(request.downtime_hours);
        log.cost_inr = Some(request.cost_inr);
        log.technician_id = Some(request.technician_id.clone());
        Ok(ApiMessage {
            message: Some("Maintenance marked as completed and pending confirmation".into()),
        })
    }

    async fn update_status(&self, maintenance_id: &str, status: &LogStatus) -> AppResult<ApiMessage> {
        let mut state = self.authorize()?;
        if let Some(log) = state
            .logs
            .iter_mut()
            .find(|l| l.maintenance_id == maintenance_id)
        {
            log.status = Some(status.clone());
        }
        Ok(ApiMessage {
            message: Some(format!("Maintenance log {} updated to status: {}", maintenance_id, status)),
        })
    }

    async fn confirm(&self, maintenance_id: &str, service_rating: u8) -> AppResult<ApiMessage> {
        let mut state = self.authorize()?;
        let log = state
            .logs
            .iter_mut()
            .find(|l| l.maintenance_id == maintenance_id)
            .ok_or_else(|| AppError::NotFound("Maintenance ID not found".into()))?;
        log.status = Some(LogStatus::Completed);
        log.completion_status = Some(CompletionStatus::Confirmed);
        log.service_rating = Some(f64::from(service_rating));
        Ok(ApiMessage::default())
    }

    async fn review_completion(&self, maintenance_id: &str, request: &ReviewRequest) -> AppResult<ReviewReceipt> {
        let mut state = self.authorize()?;
        state
            .review_requests
            .push((maintenance_id.to_string(), request.clone()));
        let log = state
            .logs
            .iter_mut()
            .find(|l| l.maintenance_id == maintenance_id)
            .ok_or_else(|| AppError::NotFound("Maintenance log not found".into()))?;
        log.status = Some(request.status.clone());
        log.completion_status = Some(request.completion_status.clone());
        log.service_rating = Some(f64::from(request.service_rating));
        Ok(ReviewReceipt {
            message: Some("Review completed".into()),
            updated_status: Some(request.status.clone()),
            updated_completion_status: Some(request.completion_status.clone()),
        })
    }

    async fn priority(&self, equipment_id: &str) -> AppResult<PriorityAssessment> {
        self.authorize()?
            .priorities
            .get(equipment_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("No prediction found".into()))
    }

    async fn combined(&self, equipment_id: &str) -> AppResult<EquipmentInsight> {
        let priority = self.priority(equipment_id).await?;
        Ok(serde_json::from_value(json!({
            "equipment_id": equipment_id,
            "metrics": {"usage_hours": 10, "risk_score": 0.4},
            "maintenance_needs": priority.maintenance_needs,
            "predicted_to_fail": priority.predicted_to_fail,
            "explanation": "Derived from recent usage"
        }))?)
    }

    async fn eda_image(&self) -> AppResult<EdaImage> {
        self.authorize()?;
        Ok(EdaImage::default())
    }

    async fn trigger_prediction(&self) -> AppResult<()> {
        self.authorize()?;
        Ok(())
    }
}
