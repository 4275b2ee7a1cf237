//! Per-equipment detail view

use serde::Serialize;

use super::{
    best_effort::best_effort,
    scheduling::{ScheduleOutcome, SchedulingFlow, PERMISSION_DENIED},
    Backend,
};
use crate::{
    error::{AppError, AppResult},
    models::{Equipment, EquipmentInsight, HealthAssessment, MaintenanceLog, Profile, UserSummary},
    notify::Notice,
};

/// Metric figures as displayed; missing values read as zero
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub usage_hours: f64,
    pub avg_cpu_temp: f64,
    pub error_count: f64,
    pub risk_score: f64,
    pub equipment_age: f64,
    pub downtime_hours: f64,
    pub num_failures: f64,
    pub response_time_hours: f64,
    pub criticality: String,
}

impl MetricSummary {
    pub fn from_insight(insight: Option<&EquipmentInsight>) -> Self {
        let Some(insight) = insight else {
            return Self {
                criticality: "Medium".to_string(),
                ..Default::default()
            };
        };
        let m = &insight.metrics;
        let criticality = if m.maintenance_needs.is_empty() {
            insight
                .maintenance_needs
                .get("corrective")
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| m.criticality().to_string())
        } else {
            m.criticality().to_string()
        };

        Self {
            usage_hours: m.usage_hours.unwrap_or(0.0),
            avg_cpu_temp: m.avg_cpu_temp.unwrap_or(0.0),
            error_count: m.error_count.unwrap_or(0.0),
            risk_score: m.risk_score.unwrap_or(0.0),
            equipment_age: m.equipment_age.unwrap_or(0.0),
            downtime_hours: m.downtime_hours.unwrap_or(0.0),
            num_failures: m.num_failures.unwrap_or(0.0),
            response_time_hours: m.response_time_hours.unwrap_or(0.0),
            criticality,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EquipmentDetail {
    pub profile: Profile,
    pub equipment: Equipment,
    /// Metrics, prediction, explanation and chart; `None` when unavailable
    pub insight: Option<EquipmentInsight>,
    pub health: HealthAssessment,
    pub logs: Vec<MaintenanceLog>,
    pub scheduled: bool,
    pub technicians: Vec<UserSummary>,
}

impl EquipmentDetail {
    pub fn can_schedule(&self) -> bool {
        self.profile.is_authorized() && !self.scheduled
    }

    pub fn metrics(&self) -> MetricSummary {
        MetricSummary::from_insight(self.insight.as_ref())
    }

    pub fn explanation(&self) -> Option<&str> {
        self.insight
            .as_ref()
            .and_then(|i| i.explanation.as_deref())
            .filter(|e| !e.trim().is_empty())
    }

    pub fn chart_png(&self) -> AppResult<Option<Vec<u8>>> {
        match &self.insight {
            Some(insight) => insight.chart_png(),
            None => Ok(None),
        }
    }
}

#[derive(Clone)]
pub struct DetailService {
    backend: Backend,
}

impl DetailService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Profile and equipment are required; the rest is best-effort
    pub async fn load(&self, equipment_id: &str) -> AppResult<EquipmentDetail> {
        let api = &self.backend.api;

        let profile = api.current_user().await?;
        let equipment = api.get_equipment(equipment_id).await?;

        let (insight, logs, users) = tokio::join!(
            best_effort("combined", api.combined(equipment_id)),
            best_effort("list_logs", api.list_logs()),
            async {
                if profile.can_list_users() {
                    best_effort("list_users", api.list_users()).await
                } else {
                    None
                }
            },
        );

        let logs: Vec<MaintenanceLog> = logs
            .unwrap_or_default()
            .into_iter()
            .filter(|log| log.equipment_id == equipment_id)
            .collect();
        let scheduled = logs.iter().any(MaintenanceLog::is_scheduled);
        let technicians = users
            .unwrap_or_default()
            .into_iter()
            .filter(UserSummary::is_technician)
            .collect();
        let health = insight
            .as_ref()
            .map(|i| HealthAssessment::from_priority(&i.priority()))
            .unwrap_or_else(HealthAssessment::unknown);

        tracing::debug!(equipment_id = %equipment_id, logs = logs.len(), scheduled, "Equipment detail loaded");

        Ok(EquipmentDetail {
            profile,
            equipment,
            insight,
            health,
            logs,
            scheduled,
            technicians,
        })
    }

    /// Open a scheduling draft for the equipment on display
    pub fn begin_schedule(&self, detail: &EquipmentDetail) -> AppResult<SchedulingFlow> {
        if !detail.profile.is_authorized() {
            self.backend.notify(Notice::error(PERMISSION_DENIED));
            return Err(AppError::Authorization(PERMISSION_DENIED.to_string()));
        }
        let mut flow = SchedulingFlow::new(self.backend.clone());
        flow.open(&detail.equipment.equipment_id, detail.scheduled)?;
        Ok(flow)
    }

    /// Submit a draft opened with [`DetailService::begin_schedule`]; the
    /// detail is marked scheduled on success.
    pub async fn schedule(
        &self,
        detail: &mut EquipmentDetail,
        flow: &mut SchedulingFlow,
    ) -> AppResult<ScheduleOutcome> {
        let outcome = flow.submit().await?;
        if outcome.equipment_id == detail.equipment.equipment_id {
            detail.scheduled = true;
        }
        flow.cancel();
        Ok(outcome)
    }
}
