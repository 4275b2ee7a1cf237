//! Client side of the maintenance REST API
//!
//! [`MaintenanceApi`] is the only way the console reaches the backend. The
//! production implementation is [`http::HttpApi`]; tests substitute mocks or
//! in-memory fakes.

pub mod http;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        ApiMessage, CompletionRequest, EdaImage, Equipment, EquipmentInsight, LogStatus,
        MaintenanceLog, PendingReview, PriorityAssessment, Profile, ReviewReceipt, ReviewRequest,
        ScheduleReceipt, ScheduleRequest, ScheduledTask, UserSummary,
    },
};

pub use http::HttpApi;

/// Operations exposed by the maintenance backend.
///
/// Every call carries the session credential. Responses are normalized into
/// the canonical models before they are returned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MaintenanceApi: Send + Sync {
    /// `GET /users/me`
    async fn current_user(&self) -> AppResult<Profile>;

    /// `GET /users`
    async fn list_users(&self) -> AppResult<Vec<UserSummary>>;

    /// `GET /equipments`
    async fn list_equipment(&self) -> AppResult<Vec<Equipment>>;

    /// `GET /equipments/{equipment_id}`
    async fn get_equipment(&self, equipment_id: &str) -> AppResult<Equipment>;

    /// `GET /maintenance-log/`
    async fn list_logs(&self) -> AppResult<Vec<MaintenanceLog>>;

    /// `GET /maintenance-log/by-equipment/{equipment_id}`
    async fn logs_by_equipment(&self, equipment_id: &str) -> AppResult<Vec<MaintenanceLog>>;

    /// `GET /maintenance-log/pending-reviews`
    async fn pending_reviews(&self) -> AppResult<Vec<PendingReview>>;

    /// `GET /maintenance-log/new-scheduled`
    async fn new_scheduled(&self) -> AppResult<Vec<ScheduledTask>>;

    /// `PUT /maintenance-log/schedule/{equipment_id}`
    async fn schedule(&self, equipment_id: &str, request: &ScheduleRequest) -> AppResult<ScheduleReceipt>;

    /// `PUT /maintenance-log/mark-complete/{maintenance_id}`
    async fn mark_complete(&self, maintenance_id: &str, request: &CompletionRequest) -> AppResult<ApiMessage>;

    /// `PUT /maintenance-log/update-status/{maintenance_id}`
    async fn update_status(&self, maintenance_id: &str, status: &LogStatus) -> AppResult<ApiMessage>;

    /// `PUT /maintenance-log/confirm/{maintenance_id}`
    async fn confirm(&self, maintenance_id: &str, service_rating: u8) -> AppResult<ApiMessage>;

    /// `PUT /maintenance-log/review-completion/{maintenance_id}`
    async fn review_completion(&self, maintenance_id: &str, request: &ReviewRequest) -> AppResult<ReviewReceipt>;

    /// `GET /maintenance-log/priority/{equipment_id}`
    async fn priority(&self, equipment_id: &str) -> AppResult<PriorityAssessment>;

    /// `GET /maintenance-log/combined/{equipment_id}`
    async fn combined(&self, equipment_id: &str) -> AppResult<EquipmentInsight>;

    /// `GET /eda/overall-eda-image`
    async fn eda_image(&self) -> AppResult<EdaImage>;

    /// `POST /predict`
    async fn trigger_prediction(&self) -> AppResult<()>;
}
