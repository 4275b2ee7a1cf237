//! Page-level composition of the services
//!
//! A view owns the roster snapshot and the single open draft of each flow it
//! offers. Every user action is a method that calls the backend, merges the
//! response into local state and reloads what the action may have changed.

pub mod biomedical;
pub mod technician;

pub use biomedical::BiomedicalDashboard;
pub use technician::TechnicianDashboard;

/// Tabs of the biomedical dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Equipment,
    Logs,
}
