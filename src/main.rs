//! Maintenance console - terminal driver
//!
//! Opens a session with the configured token and runs the dashboard that
//! matches the user's role.

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medmaint_console::{
    config::AppConfig,
    models::Profile,
    notify::TracingNotifier,
    views::{BiomedicalDashboard, TechnicianDashboard},
    Console,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("medmaint_console={}", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting maintenance console v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(base_url = %config.api.base_url, "Using maintenance backend");

    let console = Console::connect(config, Arc::new(TracingNotifier))?;
    if !console.session.is_active() {
        bail!("No session token configured; set API_TOKEN or session.token");
    }

    let profile = console
        .services
        .backend
        .api
        .current_user()
        .await
        .context("Failed to load the user profile")?;
    describe_profile(&profile);

    if profile.is_technician() {
        run_technician(&console).await
    } else {
        run_biomedical(&console).await
    }
}

fn describe_profile(profile: &Profile) {
    tracing::info!(
        name = profile.name.as_deref().unwrap_or("-"),
        role = profile.role.as_deref().unwrap_or("-"),
        department = profile.department.as_deref().unwrap_or("-"),
        id = profile.display_id(),
        "Signed in"
    );
}

async fn run_biomedical(console: &Console) -> anyhow::Result<()> {
    let dashboard = BiomedicalDashboard::open(console.services.clone()).await;
    let roster = dashboard.roster();

    for equipment in dashboard.visible_equipments() {
        let health = roster.health_of(&equipment.equipment_id);
        tracing::info!(
            equipment_id = %equipment.equipment_id,
            equipment_type = %equipment.equipment_type,
            location = %equipment.location,
            health = %roster.health_label(&equipment.equipment_id),
            detail = health.map(|h| h.message.as_str()).unwrap_or(""),
            scheduled = roster.is_scheduled(&equipment.equipment_id),
            "Equipment"
        );
    }

    let pending = dashboard.pending_reviews();
    if !pending.is_empty() {
        tracing::info!(count = pending.count(), "Maintenance tasks awaiting review");
        for review in pending.preview() {
            tracing::info!(
                maintenance_id = %review.maintenance_id,
                equipment_id = %review.equipment_id,
                technician_id = review.technician_id.as_deref().unwrap_or("-"),
                date = review.date.as_deref().unwrap_or("-"),
                "Pending review"
            );
        }
        if pending.overflow() > 0 {
            tracing::info!("... and {} more", pending.overflow());
        }
    }

    Ok(())
}

async fn run_technician(console: &Console) -> anyhow::Result<()> {
    let mut dashboard = TechnicianDashboard::open(console.services.clone(), console.config.polling.interval()).await;
    report_queue(&dashboard);

    tracing::info!("Watching for new maintenance tasks, press Ctrl-C to stop");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = dashboard.next_new_tasks() => match event {
                Some(_) => report_queue(&dashboard),
                None => break,
            },
        }
        if !console.session.is_active() {
            break;
        }
    }

    dashboard.stop_polling().await;
    tracing::info!("Console stopped");
    Ok(())
}

fn report_queue(dashboard: &TechnicianDashboard) {
    let queue = dashboard.queue();
    tracing::info!(
        scheduled_tasks = queue.summary.scheduled_tasks,
        high_priority = queue.summary.high_priority,
        healthy = queue.summary.healthy,
        "Task summary"
    );
    for equipment in &queue.items {
        tracing::info!(
            equipment_id = %equipment.equipment_id,
            equipment_type = %equipment.equipment_type,
            location = %equipment.location,
            health = %dashboard.roster().health_label(&equipment.equipment_id),
            "Queued task"
        );
    }
}
