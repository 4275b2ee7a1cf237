//! Data models exchanged with the maintenance backend

pub mod equipment;
pub mod ids;
pub mod maintenance;
pub mod prediction;
pub mod user;

// Re-export commonly used types
pub use equipment::{normalize_equipment, Equipment, EquipmentRecord};
pub use maintenance::{
    ApiMessage, CompletionRequest, CompletionStatus, Lifecycle, LogStatus, MaintenanceLog,
    MaintenanceType, PendingReview, ReviewReceipt, ReviewRequest, ScheduleReceipt,
    ScheduleRequest, ScheduledTask,
};
pub use prediction::{
    EdaImage, EquipmentInsight, EquipmentMetrics, HealthAssessment, HealthLabel,
    PriorityAssessment, Severity,
};
pub use user::{is_authorized_role, normalize_role, Profile, Role, UserSummary};
