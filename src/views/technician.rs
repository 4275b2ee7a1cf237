//! Dashboard for technicians

use std::time::Duration;

use crate::{
    error::AppResult,
    models::MaintenanceLog,
    services::{
        completion::{CompletionDraft, CompletionFlow},
        filter::EquipmentFilter,
        poller::{NewTasks, PollerHandle, PollingNotifier},
        roster::{Roster, TechnicianQueue},
        Services,
    },
};

pub struct TechnicianDashboard {
    services: Services,
    roster: Roster,
    filter: EquipmentFilter,
    completion: CompletionFlow,
    poll_interval: Duration,
    poller: Option<PollerHandle>,
}

impl TechnicianDashboard {
    pub fn new(services: Services, poll_interval: Duration) -> Self {
        Self {
            completion: services.completion_flow(),
            services,
            roster: Roster::default(),
            filter: EquipmentFilter::default(),
            poll_interval,
            poller: None,
        }
    }

    /// Initial load plus the new-task poller
    pub async fn open(services: Services, poll_interval: Duration) -> Self {
        let mut dashboard = Self::new(services, poll_interval);
        dashboard.refresh().await;
        dashboard.start_polling();
        dashboard
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn set_filter(&mut self, filter: EquipmentFilter) {
        self.filter = filter;
    }

    pub fn queue(&self) -> TechnicianQueue<'_> {
        self.roster.technician_queue(&self.filter)
    }

    pub async fn refresh(&mut self) -> bool {
        self.services.roster.refresh(&mut self.roster).await
    }

    // -----------------------------------------------------------------------
    // Polling
    // -----------------------------------------------------------------------

    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    pub fn start_polling(&mut self) {
        if self.poller.is_some() {
            return;
        }
        let poller = PollingNotifier::new(self.services.backend.clone(), self.poll_interval);
        self.poller = Some(poller.spawn());
    }

    /// Wait for the poller to report new tasks, then reload the roster.
    ///
    /// Returns `None` when polling is not running.
    pub async fn next_new_tasks(&mut self) -> Option<NewTasks> {
        let event = self.poller.as_mut()?.next_event().await?;
        self.refresh().await;
        Some(event)
    }

    pub async fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.shutdown().await;
        }
    }

    // -----------------------------------------------------------------------
    // Completion
    // -----------------------------------------------------------------------

    pub fn completion(&self) -> &CompletionFlow {
        &self.completion
    }

    pub async fn begin_completion(&mut self, equipment_id: &str) -> AppResult<MaintenanceLog> {
        self.completion.locate(equipment_id).await.cloned()
    }

    pub fn completion_draft(&mut self) -> Option<&mut CompletionDraft> {
        self.completion.draft_mut()
    }

    pub fn cancel_completion(&mut self) {
        self.completion.cancel();
    }

    pub async fn start_work(&mut self) -> AppResult<()> {
        self.completion.mark_in_progress().await
    }

    /// Submit the open completion draft, then reload the roster
    pub async fn submit_completion(&mut self) -> AppResult<String> {
        let maintenance_id = self.completion.submit(&self.roster.profile).await?;
        self.completion.cancel();
        self.refresh().await;
        Ok(maintenance_id)
    }
}
