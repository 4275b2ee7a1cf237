//! Biomedical equipment maintenance console
//!
//! Headless core of the maintenance dashboard: a REST client for the
//! maintenance backend, typed models for what it returns, and the workflows
//! built on top (roster loading, scheduling, completion, review and polling
//! for new tasks). Rendering is left to the embedder; everything meant for the
//! user is delivered as a [`notify::Notice`].

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;
pub mod session;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use api::{HttpApi, MaintenanceApi};
use notify::Notifier;
use services::{Backend, Services};
use session::Session;

/// Console state shared by every view
#[derive(Clone)]
pub struct Console {
    pub config: Arc<AppConfig>,
    pub session: Session,
    pub services: Services,
}

impl Console {
    /// Connect to the configured backend over HTTP
    pub fn connect(config: AppConfig, notifier: Arc<dyn Notifier>) -> AppResult<Self> {
        let session = match config.session.token.as_deref() {
            Some(token) => Session::with_token(token),
            None => Session::new(),
        };
        let api = HttpApi::new(&config.api, session.clone())?;
        Ok(Self::with_api(config, session, Arc::new(api), notifier))
    }

    /// Assemble a console around any backend implementation
    pub fn with_api(
        config: AppConfig,
        session: Session,
        api: Arc<dyn MaintenanceApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let backend = Backend::new(api, session.clone(), notifier);
        Self {
            config: Arc::new(config),
            session,
            services: Services::new(backend),
        }
    }

    pub fn biomedical_dashboard(&self) -> views::BiomedicalDashboard {
        views::BiomedicalDashboard::new(self.services.clone())
    }

    pub fn technician_dashboard(&self) -> views::TechnicianDashboard {
        views::TechnicianDashboard::new(self.services.clone(), self.config.polling.interval())
    }
}
