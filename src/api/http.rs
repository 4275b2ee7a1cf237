//! `reqwest` implementation of [`MaintenanceApi`]

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use super::MaintenanceApi;
use crate::{
    config::ApiConfig,
    error::{AppError, AppResult},
    models::{
        equipment::{EquipmentListResponse, EquipmentResponse},
        maintenance::{LogsResponse, NewScheduledResponse, PendingReviewsResponse},
        normalize_equipment,
        user::{UserListResponse, UserRecord},
        ApiMessage, CompletionRequest, EdaImage, Equipment, EquipmentInsight, LogStatus,
        MaintenanceLog, PendingReview, PriorityAssessment, Profile, ReviewReceipt, ReviewRequest,
        ScheduleReceipt, ScheduleRequest, ScheduledTask, UserSummary,
    },
    session::Session,
};

const MAINTENANCE_LOG: &str = "maintenance-log";

#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
    session: Session,
}

impl HttpApi {
    pub fn new(config: &ApiConfig, session: Session) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| AppError::Internal(format!("Invalid API base URL '{}': {}", config.base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(AppError::Internal(format!(
                "API base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    /// Build an endpoint URL from path segments, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("API base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> AppResult<RequestBuilder> {
        let bearer = self.session.bearer()?;
        Ok(self
            .client
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, bearer))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AppResult<T> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = AppError::from_response(status, &body);
            tracing::debug!(path = %url, status = status.as_u16(), error = %err, "Backend rejected request");
            return Err(err);
        }

        let bytes = response.bytes().await?;
        let value = serde_json::from_slice(&bytes)?;
        tracing::trace!(path = %url, "Backend request succeeded");
        Ok(value)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> AppResult<T> {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::GET, url)?).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, segments: &[&str], body: &B) -> AppResult<T> {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::PUT, url)?.json(body)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, segments: &[&str], body: &B) -> AppResult<T> {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::POST, url)?.json(body)).await
    }
}

#[async_trait]
impl MaintenanceApi for HttpApi {
    async fn current_user(&self) -> AppResult<Profile> {
        self.get(&["users", "me"]).await
    }

    async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
        let body: UserListResponse = self.get(&["users"]).await?;
        Ok(body
            .users
            .unwrap_or_default()
            .into_iter()
            .filter_map(UserRecord::into_summary)
            .collect())
    }

    async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        let body: EquipmentListResponse = self.get(&["equipments"]).await?;
        Ok(normalize_equipment(body.equipments.unwrap_or_default()))
    }

    async fn get_equipment(&self, equipment_id: &str) -> AppResult<Equipment> {
        let body: EquipmentResponse = self.get(&["equipments", equipment_id]).await?;
        let record = body
            .equipment
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", equipment_id)))?;
        Equipment::try_from(record)
    }

    async fn list_logs(&self) -> AppResult<Vec<MaintenanceLog>> {
        let body: LogsResponse = self.get(&[MAINTENANCE_LOG, ""]).await?;
        Ok(body.logs.unwrap_or_default())
    }

    async fn logs_by_equipment(&self, equipment_id: &str) -> AppResult<Vec<MaintenanceLog>> {
        let body: LogsResponse = self
            .get(&[MAINTENANCE_LOG, "by-equipment", equipment_id])
            .await?;
        Ok(body.logs.unwrap_or_default())
    }

    async fn pending_reviews(&self) -> AppResult<Vec<PendingReview>> {
        let body: PendingReviewsResponse = self.get(&[MAINTENANCE_LOG, "pending-reviews"]).await?;
        Ok(body.reviews.unwrap_or_default())
    }

    async fn new_scheduled(&self) -> AppResult<Vec<ScheduledTask>> {
        let body: NewScheduledResponse = self.get(&[MAINTENANCE_LOG, "new-scheduled"]).await?;
        Ok(body.new_scheduled.unwrap_or_default())
    }

    async fn schedule(&self, equipment_id: &str, request: &ScheduleRequest) -> AppResult<ScheduleReceipt> {
        self.put(&[MAINTENANCE_LOG, "schedule", equipment_id], request)
            .await
    }

    async fn mark_complete(&self, maintenance_id: &str, request: &CompletionRequest) -> AppResult<ApiMessage> {
        self.put(&[MAINTENANCE_LOG, "mark-complete", maintenance_id], request)
            .await
    }

    async fn update_status(&self, maintenance_id: &str, status: &LogStatus) -> AppResult<ApiMessage> {
        self.put(
            &[MAINTENANCE_LOG, "update-status", maintenance_id],
            &json!({ "status": status }),
        )
        .await
    }

    async fn confirm(&self, maintenance_id: &str, service_rating: u8) -> AppResult<ApiMessage> {
        self.put(
            &[MAINTENANCE_LOG, "confirm", maintenance_id],
            &json!({ "service_rating": service_rating }),
        )
        .await
    }

    async fn review_completion(&self, maintenance_id: &str, request: &ReviewRequest) -> AppResult<ReviewReceipt> {
        self.put(&[MAINTENANCE_LOG, "review-completion", maintenance_id], request)
            .await
    }

    async fn priority(&self, equipment_id: &str) -> AppResult<PriorityAssessment> {
        self.get(&[MAINTENANCE_LOG, "priority", equipment_id]).await
    }

    async fn combined(&self, equipment_id: &str) -> AppResult<EquipmentInsight> {
        self.get(&[MAINTENANCE_LOG, "combined", equipment_id]).await
    }

    async fn eda_image(&self) -> AppResult<EdaImage> {
        self.get(&["eda", "overall-eda-image"]).await
    }

    async fn trigger_prediction(&self) -> AppResult<()> {
        // The body is either a prediction list or a "not enough data" message; neither is used.
        let _: serde_json::Value = self.post(&["predict"], &json!({})).await?;
        Ok(())
    }
}
