//! Dashboard for admins and biomedical engineers

use super::Tab;
use crate::{
    error::{AppError, AppResult},
    models::{Equipment, MaintenanceType},
    services::{
        filter::{EquipmentFilter, FilterOptions},
        logs::LogRow,
        review::{PendingReviews, ReviewDecision, ReviewFlow},
        roster::Roster,
        scheduling::{ScheduleOutcome, SchedulingFlow},
        Services,
    },
};

pub struct BiomedicalDashboard {
    services: Services,
    roster: Roster,
    pending: PendingReviews,
    filter: EquipmentFilter,
    tab: Tab,
    scheduling: SchedulingFlow,
    review: ReviewFlow,
}

impl BiomedicalDashboard {
    pub fn new(services: Services) -> Self {
        Self {
            scheduling: services.scheduling_flow(),
            review: services.review_flow(),
            services,
            roster: Roster::default(),
            pending: PendingReviews::default(),
            filter: EquipmentFilter::default(),
            tab: Tab::default(),
        }
    }

    /// Build the dashboard and run the initial load
    pub async fn open(services: Services) -> Self {
        let mut dashboard = Self::new(services);
        dashboard.refresh().await;
        dashboard
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn pending_reviews(&self) -> &PendingReviews {
        &self.pending
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn filter(&self) -> &EquipmentFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: EquipmentFilter) {
        self.filter = filter;
    }

    pub fn filter_options(&self) -> FilterOptions {
        self.roster.filter_options()
    }

    pub fn visible_equipments(&self) -> Vec<&Equipment> {
        self.roster.filtered(&self.filter)
    }

    /// Reload the roster, then the pending reviews for the loaded profile
    pub async fn refresh(&mut self) -> bool {
        let reloaded = self.services.roster.refresh(&mut self.roster).await;
        if reloaded {
            self.pending = self.services.reviews.load(&self.roster.profile).await;
        }
        reloaded
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    pub fn scheduling(&self) -> &SchedulingFlow {
        &self.scheduling
    }

    pub fn scheduling_mut(&mut self) -> &mut SchedulingFlow {
        &mut self.scheduling
    }

    /// Open the calendar composer for an item without a scheduled log
    pub fn begin_schedule(&mut self, equipment_id: &str) -> AppResult<()> {
        let already_scheduled = self.roster.is_scheduled(equipment_id);
        self.scheduling.open(equipment_id, already_scheduled)
    }

    /// Open the form composer, which also picks a type and a technician
    pub fn begin_schedule_form(
        &mut self,
        equipment_id: &str,
        maintenance_type: MaintenanceType,
        technician_id: Option<String>,
    ) -> AppResult<()> {
        self.begin_schedule(equipment_id)?;
        self.scheduling.set_maintenance_type(maintenance_type);
        self.scheduling.set_technician(technician_id);
        Ok(())
    }

    pub fn cancel_schedule(&mut self) {
        self.scheduling.cancel();
    }

    /// Submit the open draft.
    ///
    /// On success the item is marked scheduled right away and the roster is
    /// then reloaded to pick up the server state.
    pub async fn submit_schedule(&mut self) -> AppResult<ScheduleOutcome> {
        let outcome = self.scheduling.submit().await?;
        self.roster.mark_scheduled(&outcome.equipment_id);
        self.scheduling.cancel();
        self.refresh().await;
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Review
    // -----------------------------------------------------------------------

    pub fn review(&self) -> &ReviewFlow {
        &self.review
    }

    pub fn begin_review(&mut self, maintenance_id: &str) -> AppResult<()> {
        let review = self
            .pending
            .find(maintenance_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No pending review for {}", maintenance_id)))?;
        self.review.open(&self.roster.profile, review)
    }

    pub fn rate(&mut self, service_rating: u8, decision: ReviewDecision) {
        if let Some(draft) = self.review.draft_mut() {
            draft.service_rating = Some(service_rating);
            draft.decision = Some(decision);
        }
    }

    pub fn cancel_review(&mut self) {
        self.review.cancel();
    }

    /// Submit the review, then reload the roster and the pending list
    pub async fn submit_review(&mut self) -> AppResult<ReviewDecision> {
        let decision = self.review.submit().await?;
        self.review.cancel();
        self.refresh().await;
        Ok(decision)
    }

    // -----------------------------------------------------------------------
    // Logs tab
    // -----------------------------------------------------------------------

    pub async fn log_rows(&self) -> Vec<LogRow> {
        self.services.logs.rows(&self.roster.profile).await
    }

    pub async fn confirm_log(&mut self, row: &LogRow, service_rating: u8) -> AppResult<()> {
        self.services
            .logs
            .confirm(&self.roster.profile, &row.log, service_rating)
            .await?;
        self.refresh().await;
        Ok(())
    }
}
