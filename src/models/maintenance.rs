//! Maintenance log model and request/response bodies

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids;

// ---------------------------------------------------------------------------
// MaintenanceType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum MaintenanceType {
    #[default]
    Preventive,
    Corrective,
    Calibration,
    Inspection,
    /// Free-form value stored by older clients
    Other(String),
}

impl MaintenanceType {
    pub fn as_str(&self) -> &str {
        match self {
            MaintenanceType::Preventive => "Preventive",
            MaintenanceType::Corrective => "Corrective",
            MaintenanceType::Calibration => "Calibration",
            MaintenanceType::Inspection => "Inspection",
            MaintenanceType::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for MaintenanceType {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "preventive" => MaintenanceType::Preventive,
            "corrective" => MaintenanceType::Corrective,
            "calibration" => MaintenanceType::Calibration,
            "inspection" => MaintenanceType::Inspection,
            _ => MaintenanceType::Other(s),
        }
    }
}

impl From<MaintenanceType> for String {
    fn from(t: MaintenanceType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for MaintenanceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LogStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogStatus {
    Scheduled,
    InProgress,
    Completed,
    Other(String),
}

impl LogStatus {
    pub fn as_str(&self) -> &str {
        match self {
            LogStatus::Scheduled => "Scheduled",
            LogStatus::InProgress => "In Progress",
            LogStatus::Completed => "Completed",
            LogStatus::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for LogStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Scheduled" => LogStatus::Scheduled,
            "In Progress" => LogStatus::InProgress,
            "Completed" => LogStatus::Completed,
            _ => LogStatus::Other(s),
        }
    }
}

impl From<LogStatus> for String {
    fn from(s: LogStatus) -> Self {
        s.as_str().to_string()
    }
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CompletionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompletionStatus {
    Pending,
    Approved,
    RequiresFollowUp,
    Rejected,
    /// Set by the legacy confirm endpoint
    Confirmed,
    Completed,
    Other(String),
}

impl CompletionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CompletionStatus::Pending => "Pending",
            CompletionStatus::Approved => "Approved",
            CompletionStatus::RequiresFollowUp => "Requires Follow-up",
            CompletionStatus::Rejected => "Rejected",
            CompletionStatus::Confirmed => "Confirmed",
            CompletionStatus::Completed => "Completed",
            CompletionStatus::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for CompletionStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Pending" => CompletionStatus::Pending,
            "Approved" => CompletionStatus::Approved,
            "Requires Follow-up" => CompletionStatus::RequiresFollowUp,
            "Rejected" => CompletionStatus::Rejected,
            "Confirmed" => CompletionStatus::Confirmed,
            "Completed" => CompletionStatus::Completed,
            _ => CompletionStatus::Other(s),
        }
    }
}

impl From<CompletionStatus> for String {
    fn from(s: CompletionStatus) -> Self {
        s.as_str().to_string()
    }
}

impl std::fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MaintenanceLog
// ---------------------------------------------------------------------------

/// Where a log sits in the maintenance lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Scheduled, waiting for technician work
    AwaitingWork,
    /// Technician finished, waiting for biomedical review
    PendingReview,
    /// Completed and approved, no further transition
    Closed,
    /// Any other combination the backend may hold
    Unclassified,
}

/// Maintenance log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceLog {
    #[serde(deserialize_with = "ids::text")]
    pub maintenance_id: String,
    #[serde(deserialize_with = "ids::text")]
    pub equipment_id: String,
    #[serde(default)]
    pub maintenance_type: Option<MaintenanceType>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "ids::opt_text")]
    pub technician_id: Option<String>,
    #[serde(default)]
    pub issue_description: Option<String>,
    #[serde(default)]
    pub status: Option<LogStatus>,
    #[serde(default)]
    pub completion_status: Option<CompletionStatus>,
    #[serde(default, deserialize_with = "ids::opt_number")]
    pub downtime_hours: Option<f64>,
    #[serde(default, deserialize_with = "ids::opt_number")]
    pub cost_inr: Option<f64>,
    #[serde(default)]
    pub parts_replaced: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default, deserialize_with = "ids::opt_number")]
    pub response_time_hours: Option<f64>,
    #[serde(default, deserialize_with = "ids::opt_number")]
    pub service_rating: Option<f64>,
    #[serde(default)]
    pub warranty_covered: Option<String>,
}

impl MaintenanceLog {
    pub fn is_scheduled(&self) -> bool {
        self.status == Some(LogStatus::Scheduled)
    }

    pub fn is_pending_review(&self) -> bool {
        self.status == Some(LogStatus::Completed)
            && self.completion_status == Some(CompletionStatus::Pending)
    }

    /// Scheduled, or completed and waiting for review
    pub fn is_active(&self) -> bool {
        self.is_scheduled() || self.is_pending_review()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        if self.is_scheduled() {
            return Lifecycle::AwaitingWork;
        }
        if self.is_pending_review() {
            return Lifecycle::PendingReview;
        }
        match (&self.status, &self.completion_status) {
            (Some(LogStatus::Completed), Some(CompletionStatus::Approved))
            | (Some(LogStatus::Completed), Some(CompletionStatus::Confirmed)) => Lifecycle::Closed,
            _ => Lifecycle::Unclassified,
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.get(..10).unwrap_or(d), "%Y-%m-%d").ok())
    }
}

/// Summary row returned by `GET maintenance-log/pending-reviews`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReview {
    #[serde(deserialize_with = "ids::text")]
    pub maintenance_id: String,
    #[serde(deserialize_with = "ids::text")]
    pub equipment_id: String,
    #[serde(default, deserialize_with = "ids::opt_text")]
    pub technician_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Summary row returned by `GET maintenance-log/new-scheduled`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    #[serde(deserialize_with = "ids::text")]
    pub maintenance_id: String,
    #[serde(deserialize_with = "ids::text")]
    pub equipment_id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub maintenance_type: Option<MaintenanceType>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `PUT maintenance-log/schedule/{equipment_id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRequest {
    pub maintenance_type: MaintenanceType,
    /// Serialized as YYYY-MM-DD
    pub date: NaiveDate,
    pub issue_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technician_id: Option<String>,
}

/// Body of `PUT maintenance-log/mark-complete/{maintenance_id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub downtime_hours: f64,
    pub cost_inr: f64,
    pub remarks: String,
    pub technician_id: String,
}

/// Body of `PUT maintenance-log/review-completion/{maintenance_id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRequest {
    pub service_rating: u8,
    pub completion_status: CompletionStatus,
    pub status: LogStatus,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: Option<Vec<MaintenanceLog>>,
}

#[derive(Debug, Deserialize)]
pub struct PendingReviewsResponse {
    #[serde(default)]
    pub reviews: Option<Vec<PendingReview>>,
}

#[derive(Debug, Deserialize)]
pub struct NewScheduledResponse {
    #[serde(default)]
    pub new_scheduled: Option<Vec<ScheduledTask>>,
}

/// Generic `{"message": ...}` acknowledgement
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of the schedule endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "ids::opt_text")]
    pub maintenance_id: Option<String>,
}

/// Response of the review endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub updated_status: Option<LogStatus>,
    #[serde(default)]
    pub updated_completion_status: Option<CompletionStatus>,
}
