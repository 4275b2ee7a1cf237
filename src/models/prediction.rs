//! Risk prediction results and the health badge derived from them

use base64::{engine::general_purpose::STANDARD, Engine as _};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::ids;
use crate::error::{AppError, AppResult};

/// Severity of a maintenance need category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    High,
    Medium,
    Low,
    Other(String),
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        match s.as_str() {
            "High" => Severity::High,
            "Medium" => Severity::Medium,
            "Low" => Severity::Low,
            _ => Severity::Other(s),
        }
    }
}

impl From<Severity> for String {
    fn from(s: Severity) -> Self {
        s.as_str().to_string()
    }
}

/// Category (preventive, corrective, replacement, ...) to severity, in backend order
pub type MaintenanceNeeds = IndexMap<String, Severity>;

/// `GET maintenance-log/priority/{equipment_id}` response body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriorityAssessment {
    #[serde(default, deserialize_with = "ids::opt_text")]
    pub equipment_id: Option<String>,
    #[serde(default)]
    pub predicted_to_fail: bool,
    #[serde(default)]
    pub maintenance_needs: MaintenanceNeeds,
}

impl PriorityAssessment {
    /// Categories rated `High`, in backend order
    pub fn high_needs(&self) -> impl Iterator<Item = &str> {
        self.maintenance_needs
            .iter()
            .filter(|(_, severity)| **severity == Severity::High)
            .map(|(category, _)| category.as_str())
    }
}

// ---------------------------------------------------------------------------
// Health badge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthLabel {
    Healthy,
    #[serde(rename = "High Risk")]
    HighRisk,
    Unknown,
}

impl HealthLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthLabel::Healthy => "Healthy",
            HealthLabel::HighRisk => "High Risk",
            HealthLabel::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HealthLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(' ', "").as_str() {
            "healthy" => Ok(HealthLabel::Healthy),
            "highrisk" => Ok(HealthLabel::HighRisk),
            "unknown" => Ok(HealthLabel::Unknown),
            _ => Err(format!("Invalid health label: {}", s)),
        }
    }
}

/// Derived per-equipment health badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthAssessment {
    pub label: HealthLabel,
    /// Explanation shown under a High Risk badge, empty otherwise
    pub message: String,
}

impl HealthAssessment {
    /// Sentinel for items whose prediction could not be fetched
    pub fn unknown() -> Self {
        Self {
            label: HealthLabel::Unknown,
            message: String::new(),
        }
    }

    /// High Risk when failure is predicted or any category is rated `High`.
    ///
    /// The message lists "Predicted to Fail" and then the `High` categories,
    /// capitalized, as "Preventive, Corrective maintenance".
    pub fn from_priority(priority: &PriorityAssessment) -> Self {
        let high: Vec<String> = priority.high_needs().map(capitalize).collect();

        if !priority.predicted_to_fail && high.is_empty() {
            return Self {
                label: HealthLabel::Healthy,
                message: String::new(),
            };
        }

        let mut parts = Vec::with_capacity(2);
        if priority.predicted_to_fail {
            parts.push("Predicted to Fail".to_string());
        }
        if !high.is_empty() {
            parts.push(format!("{} maintenance", high.join(", ")));
        }

        Self {
            label: HealthLabel::HighRisk,
            message: parts.join(", "),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Detail view payloads
// ---------------------------------------------------------------------------

/// Usage and reliability metrics for one equipment item
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EquipmentMetrics {
    #[serde(default, deserialize_with = "ids::opt_number")]
    pub usage_hours: Option<f64>,
    #[serde(default, deserialize_with = "ids::opt_number")]
    pub avg_cpu_temp: Option<f64>,
    #[serde(default, deserialize_with = "ids::opt_number")]
    pub error_count: Option<f64>,
    #[serde(default, deserialize_with = "ids::opt_number")]
    pub risk_score: Option<f64>,
    #[serde(default, deserialize_with = "ids::opt_number")]
    pub equipment_age: Option<f64>,
    #[serde(default, deserialize_with = "ids::opt_number")]
    pub downtime_hours: Option<f64>,
    #[serde(default, deserialize_with = "ids::opt_number")]
    pub num_failures: Option<f64>,
    #[serde(default, deserialize_with = "ids::opt_number")]
    pub response_time_hours: Option<f64>,
    #[serde(default)]
    pub maintenance_needs: MaintenanceNeeds,
}

impl EquipmentMetrics {
    /// Corrective need, `Medium` when the backend did not rate it
    pub fn criticality(&self) -> &str {
        self.maintenance_needs
            .get("corrective")
            .map(Severity::as_str)
            .unwrap_or("Medium")
    }
}

/// `GET maintenance-log/combined/{equipment_id}` response body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EquipmentInsight {
    #[serde(default, deserialize_with = "ids::opt_text")]
    pub equipment_id: Option<String>,
    /// Base64 PNG trend chart
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub metrics: EquipmentMetrics,
    #[serde(default)]
    pub maintenance_needs: MaintenanceNeeds,
    #[serde(default)]
    pub predicted_to_fail: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl EquipmentInsight {
    pub fn priority(&self) -> PriorityAssessment {
        PriorityAssessment {
            equipment_id: self.equipment_id.clone(),
            predicted_to_fail: self.predicted_to_fail,
            maintenance_needs: self.maintenance_needs.clone(),
        }
    }

    /// Decoded trend chart, `None` when the backend sent no chart
    pub fn chart_png(&self) -> AppResult<Option<Vec<u8>>> {
        self.image_base64
            .as_deref()
            .filter(|b| !b.is_empty())
            .map(decode_image)
            .transpose()
    }
}

/// `GET eda/overall-eda-image` response body
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EdaImage {
    #[serde(default)]
    pub image_base64: String,
}

impl EdaImage {
    pub fn is_empty(&self) -> bool {
        self.image_base64.is_empty()
    }

    pub fn png(&self) -> AppResult<Vec<u8>> {
        decode_image(&self.image_base64)
    }
}

fn decode_image(encoded: &str) -> AppResult<Vec<u8>> {
    let payload = encoded
        .split_once("base64,")
        .map(|(_, data)| data)
        .unwrap_or(encoded);
    STANDARD
        .decode(payload.trim())
        .map_err(|e| AppError::Decode(format!("invalid base64 image: {}", e)))
}
