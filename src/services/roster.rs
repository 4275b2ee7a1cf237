//! Equipment roster loading and derived per-item state

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;

use super::{
    best_effort::{best_effort, or_sentinel},
    filter::{filter_equipments, sort_by_priority, EquipmentFilter, FilterOptions},
    Backend,
};
use crate::{
    error::AppResult,
    models::{EdaImage, Equipment, HealthAssessment, HealthLabel, MaintenanceLog, Profile, UserSummary},
    notify::Notice,
};

pub const LOAD_FAILED: &str = "Failed to load some data. Please check your permissions.";

/// Equipment list plus the derived health and scheduling state
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub profile: Profile,
    pub equipments: Vec<Equipment>,
    /// Empty unless the profile may list users
    pub users: Vec<UserSummary>,
    pub eda_image: Option<EdaImage>,
    /// Every equipment id has an entry once loaded
    pub health: HashMap<String, HealthAssessment>,
    /// Some log for the item has status `Scheduled`
    pub scheduled: HashMap<String, bool>,
    /// Some log for the item is scheduled or waiting for review
    pub active: HashMap<String, bool>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl Roster {
    pub fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }

    pub fn health_of(&self, equipment_id: &str) -> Option<&HealthAssessment> {
        self.health.get(equipment_id)
    }

    pub fn health_label(&self, equipment_id: &str) -> HealthLabel {
        self.health_of(equipment_id)
            .map_or(HealthLabel::Unknown, |h| h.label)
    }

    pub fn is_scheduled(&self, equipment_id: &str) -> bool {
        self.scheduled.get(equipment_id).copied().unwrap_or(false)
    }

    pub fn has_active_log(&self, equipment_id: &str) -> bool {
        self.active.get(equipment_id).copied().unwrap_or(false)
    }

    /// Optimistic update after a successful schedule call
    pub fn mark_scheduled(&mut self, equipment_id: &str) {
        self.scheduled.insert(equipment_id.to_string(), true);
        self.active.insert(equipment_id.to_string(), true);
    }

    pub fn equipment(&self, equipment_id: &str) -> Option<&Equipment> {
        self.equipments
            .iter()
            .find(|e| e.equipment_id == equipment_id)
    }

    pub fn filtered(&self, filter: &EquipmentFilter) -> Vec<&Equipment> {
        filter_equipments(&self.equipments, filter, &self.health)
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_equipments(&self.equipments)
    }

    pub fn technicians(&self) -> Vec<&UserSummary> {
        self.users.iter().filter(|u| u.is_technician()).collect()
    }

    /// Work list shown to technicians: items with an active log only
    pub fn technician_queue(&self, filter: &EquipmentFilter) -> TechnicianQueue<'_> {
        let queued: Vec<&Equipment> = self
            .equipments
            .iter()
            .filter(|e| self.has_active_log(&e.equipment_id))
            .collect();

        let mut items: Vec<&Equipment> = queued
            .iter()
            .copied()
            .filter(|e| filter.matches(e, &self.health))
            .collect();
        sort_by_priority(&mut items, &self.health);

        let count = |label: HealthLabel| {
            items
                .iter()
                .filter(|e| self.health_label(&e.equipment_id) == label)
                .count()
        };
        let summary = QueueSummary {
            scheduled_tasks: queued.len(),
            high_priority: count(HealthLabel::HighRisk),
            healthy: count(HealthLabel::Healthy),
        };

        TechnicianQueue {
            options: FilterOptions::from_equipments(queued.iter().copied()),
            items,
            summary,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueSummary {
    /// Items with an active log, before filtering
    pub scheduled_tasks: usize,
    pub high_priority: usize,
    pub healthy: usize,
}

#[derive(Debug, Clone)]
pub struct TechnicianQueue<'a> {
    pub items: Vec<&'a Equipment>,
    pub summary: QueueSummary,
    pub options: FilterOptions,
}

/// Result of the two per-item lookups
#[derive(Debug)]
struct ItemState {
    equipment_id: String,
    health: HealthAssessment,
    scheduled: bool,
    active: bool,
}

fn log_flags(logs: &[MaintenanceLog]) -> (bool, bool) {
    (
        logs.iter().any(MaintenanceLog::is_scheduled),
        logs.iter().any(MaintenanceLog::is_active),
    )
}

#[derive(Clone)]
pub struct RosterService {
    backend: Backend,
}

impl RosterService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Load a complete roster.
    ///
    /// The profile and equipment list are required and their failure is
    /// returned. Everything after them is best-effort: the user list, the
    /// overview chart, the prediction recompute and every per-item lookup.
    pub async fn load(&self) -> AppResult<Roster> {
        let api = &self.backend.api;

        let profile = api.current_user().await?;
        let equipments = api.list_equipment().await?;

        let users = if profile.can_list_users() {
            best_effort("list_users", api.list_users())
                .await
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let wants_chart = !profile.is_technician();
        let chart = async {
            if wants_chart {
                best_effort("eda_image", api.eda_image()).await
            } else {
                None
            }
        };
        let items = async {
            best_effort("trigger_prediction", api.trigger_prediction()).await;
            join_all(equipments.iter().map(|e| self.inspect(&e.equipment_id))).await
        };
        let (eda_image, items) = tokio::join!(chart, items);

        let mut roster = Roster {
            profile,
            users,
            eda_image,
            loaded_at: Some(Utc::now()),
            ..Default::default()
        };
        for item in items {
            roster.health.insert(item.equipment_id.clone(), item.health);
            roster.scheduled.insert(item.equipment_id.clone(), item.scheduled);
            roster.active.insert(item.equipment_id, item.active);
        }
        roster.equipments = equipments;

        tracing::debug!(
            equipments = roster.equipments.len(),
            users = roster.users.len(),
            "Roster loaded"
        );
        Ok(roster)
    }

    /// Reload into `roster`, leaving it untouched when a required call fails.
    ///
    /// Returns whether the roster was replaced.
    pub async fn refresh(&self, roster: &mut Roster) -> bool {
        match self.load().await {
            Ok(fresh) => {
                *roster = fresh;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Roster refresh failed, keeping previous state");
                self.backend.notify(Notice::warning(LOAD_FAILED));
                if e.is_session_failure() {
                    self.backend.terminate_session(&e.to_string());
                }
                false
            }
        }
    }

    async fn inspect(&self, equipment_id: &str) -> ItemState {
        let api = &self.backend.api;
        let (health, (scheduled, active)) = tokio::join!(
            or_sentinel("priority", equipment_id, HealthAssessment::unknown(), async {
                api.priority(equipment_id)
                    .await
                    .map(|p| HealthAssessment::from_priority(&p))
            }),
            or_sentinel("logs_by_equipment", equipment_id, (false, false), async {
                api.logs_by_equipment(equipment_id)
                    .await
                    .map(|logs| log_flags(&logs))
            }),
        );
        ItemState {
            equipment_id: equipment_id.to_string(),
            health,
            scheduled,
            active,
        }
    }
}
