//! Equipment model
//!
//! Equipment arrives either as a positional row
//! `[id, type, manufacturer, location, criticality, installation_date]`
//! or as a field-named object. Both are decoded into [`EquipmentRecord`] and
//! normalized into [`Equipment`] as soon as a response is received.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ids::{self, value_to_text};
use crate::error::{AppError, AppResult};

/// Canonical equipment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub equipment_id: String,
    /// Equipment type (e.g. "Ventilator")
    pub equipment_type: String,
    pub manufacturer: String,
    pub location: String,
    pub criticality: String,
    /// Installation date as sent by the backend (YYYY-MM-DD)
    pub installation_date: Option<String>,
}

/// Field-named wire form
#[derive(Debug, Clone, Deserialize)]
pub struct NamedEquipment {
    #[serde(deserialize_with = "ids::text")]
    pub equipment_id: String,
    #[serde(rename = "type", alias = "equipment_type", default)]
    pub equipment_type: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "ids::opt_text")]
    pub criticality: Option<String>,
    #[serde(default)]
    pub installation_date: Option<String>,
}

/// Equipment as it appears on the wire
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EquipmentRecord {
    Positional(Vec<Value>),
    Named(NamedEquipment),
}

impl TryFrom<EquipmentRecord> for Equipment {
    type Error = AppError;

    fn try_from(record: EquipmentRecord) -> AppResult<Self> {
        match record {
            EquipmentRecord::Positional(row) => {
                let column = |idx: usize| row.get(idx).and_then(value_to_text);
                let equipment_id = column(0).ok_or_else(|| {
                    AppError::Decode("equipment row without an identifier".to_string())
                })?;
                Ok(Equipment {
                    equipment_id,
                    equipment_type: column(1).unwrap_or_default(),
                    manufacturer: column(2).unwrap_or_default(),
                    location: column(3).unwrap_or_default(),
                    criticality: column(4).unwrap_or_default(),
                    installation_date: column(5),
                })
            }
            EquipmentRecord::Named(named) => Ok(Equipment {
                equipment_id: named.equipment_id,
                equipment_type: named.equipment_type.unwrap_or_default(),
                manufacturer: named.manufacturer.unwrap_or_default(),
                location: named.location.unwrap_or_default(),
                criticality: named.criticality.unwrap_or_default(),
                installation_date: named.installation_date.filter(|d| !d.is_empty()),
            }),
        }
    }
}

/// Normalize a decoded equipment list, dropping rows that carry no identifier
pub fn normalize_equipment(records: Vec<EquipmentRecord>) -> Vec<Equipment> {
    records
        .into_iter()
        .filter_map(|record| match Equipment::try_from(record) {
            Ok(equipment) => Some(equipment),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed equipment record");
                None
            }
        })
        .collect()
}

/// `GET /equipments` response body
#[derive(Debug, Deserialize)]
pub struct EquipmentListResponse {
    #[serde(default)]
    pub equipments: Option<Vec<EquipmentRecord>>,
}

/// `GET /equipments/{id}` response body
#[derive(Debug, Deserialize)]
pub struct EquipmentResponse {
    pub equipment: Option<EquipmentRecord>,
}
