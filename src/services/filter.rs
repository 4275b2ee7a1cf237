//! Equipment filtering and ordering

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::models::{Equipment, HealthAssessment, HealthLabel};

/// Dropdown selections; empty or absent values match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquipmentFilter {
    pub equipment_type: Option<String>,
    pub location: Option<String>,
    pub health: Option<HealthLabel>,
}

impl EquipmentFilter {
    pub fn matches(&self, equipment: &Equipment, health: &HashMap<String, HealthAssessment>) -> bool {
        let type_ok = selected(&self.equipment_type)
            .map_or(true, |t| equipment.equipment_type == t);
        let location_ok = selected(&self.location).map_or(true, |l| equipment.location == l);
        let health_ok = self.health.map_or(true, |wanted| {
            health
                .get(&equipment.equipment_id)
                .map_or(false, |h| h.label == wanted)
        });
        type_ok && location_ok && health_ok
    }
}

fn selected(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Collation used for equipment identifiers: case-insensitive first, then
/// byte order so that the result is total.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Apply `filter` and sort the survivors ascending by `equipment_id`.
///
/// The sort is stable, so equal ids keep their input order and running the
/// function on its own output returns the same list.
pub fn filter_equipments<'a>(
    equipments: &'a [Equipment],
    filter: &EquipmentFilter,
    health: &HashMap<String, HealthAssessment>,
) -> Vec<&'a Equipment> {
    let mut matched: Vec<&Equipment> = equipments
        .iter()
        .filter(|e| filter.matches(e, health))
        .collect();
    matched.sort_by(|a, b| compare_ids(&a.equipment_id, &b.equipment_id));
    matched
}

/// Technician ordering: High Risk items first, then by id
pub fn sort_by_priority(items: &mut [&Equipment], health: &HashMap<String, HealthAssessment>) {
    let risky = |e: &Equipment| {
        health
            .get(&e.equipment_id)
            .map_or(false, |h| h.label == HealthLabel::HighRisk)
    };
    items.sort_by(|a, b| {
        risky(b)
            .cmp(&risky(a))
            .then_with(|| compare_ids(&a.equipment_id, &b.equipment_id))
    });
}

/// Distinct values offered by the type and location dropdowns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub types: Vec<String>,
    pub locations: Vec<String>,
}

impl FilterOptions {
    pub fn from_equipments<'a>(equipments: impl IntoIterator<Item = &'a Equipment>) -> Self {
        let mut types = BTreeSet::new();
        let mut locations = BTreeSet::new();
        for e in equipments {
            if !e.equipment_type.is_empty() {
                types.insert(e.equipment_type.clone());
            }
            if !e.location.is_empty() {
                locations.insert(e.location.clone());
            }
        }
        Self {
            types: types.into_iter().collect(),
            locations: locations.into_iter().collect(),
        }
    }
}
