//! Business logic services

pub mod best_effort;
pub mod completion;
pub mod detail;
pub mod filter;
pub mod logs;
pub mod poller;
pub mod review;
pub mod roster;
pub mod scheduling;

use std::sync::Arc;

use crate::{
    api::MaintenanceApi,
    notify::{Notice, Notifier},
    session::Session,
};

pub const SESSION_EXPIRED: &str = "Session expired. Please login again.";

/// Collaborators every service and flow needs
#[derive(Clone)]
pub struct Backend {
    pub api: Arc<dyn MaintenanceApi>,
    pub session: Session,
    pub notifier: Arc<dyn Notifier>,
}

impl Backend {
    pub fn new(api: Arc<dyn MaintenanceApi>, session: Session, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            session,
            notifier,
        }
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Drop the credential and send the user back to login
    pub fn terminate_session(&self, reason: &str) {
        self.session.expire(reason);
        self.notifier.session_terminated();
    }
}

/// Container for the stateless services
#[derive(Clone)]
pub struct Services {
    pub backend: Backend,
    pub roster: roster::RosterService,
    pub reviews: review::PendingReviewService,
    pub logs: logs::LogsService,
    pub detail: detail::DetailService,
}

impl Services {
    pub fn new(backend: Backend) -> Self {
        Self {
            roster: roster::RosterService::new(backend.clone()),
            reviews: review::PendingReviewService::new(backend.clone()),
            logs: logs::LogsService::new(backend.clone()),
            detail: detail::DetailService::new(backend.clone()),
            backend,
        }
    }

    pub fn scheduling_flow(&self) -> scheduling::SchedulingFlow {
        scheduling::SchedulingFlow::new(self.backend.clone())
    }

    pub fn completion_flow(&self) -> completion::CompletionFlow {
        completion::CompletionFlow::new(self.backend.clone())
    }

    pub fn review_flow(&self) -> review::ReviewFlow {
        review::ReviewFlow::new(self.backend.clone())
    }
}
