//! End-to-end dashboard workflows against the in-memory backend

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;

use medmaint_console::{
    models::{CompletionStatus, HealthLabel, LogStatus, MaintenanceType},
    services::{
        completion::COMPLETED,
        poller::{NewTasks, NEW_TASK},
        review::{ReviewDecision, RETURNED},
        roster::LOAD_FAILED,
        scheduling::DESCRIPTION_REQUIRED,
    },
    session::SessionState,
    views::{BiomedicalDashboard, TechnicianDashboard},
};

use crate::support::{at_risk, equipment, healthy, log, profile, Harness};

fn ward() -> Harness {
    Harness::new(|state| {
        state.profile = profile("admin", Some("A-1"));
        state.equipments = vec![
            equipment("EQ-1", "Ventilator", "ICU"),
            equipment("EQ-2", "Infusion Pump", "Ward 3"),
        ];
        state.priorities.insert("EQ-1".into(), healthy("EQ-1"));
        state.priorities.insert("EQ-2".into(), at_risk("EQ-2"));
    })
}

#[tokio::test]
async fn test_schedule_marks_item_even_when_reload_fails() {
    let harness = ward();
    let mut dashboard = BiomedicalDashboard::open(harness.console.services.clone()).await;
    assert!(!dashboard.roster().is_scheduled("EQ-1"));

    dashboard
        .begin_schedule_form("EQ-1", MaintenanceType::Preventive, None)
        .unwrap();
    let flow = dashboard.scheduling_mut();
    flow.set_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    flow.set_description("  noisy fan ");

    harness.backend.state().fail_equipment_list = true;
    let outcome = dashboard.submit_schedule().await.unwrap();

    assert_eq!(outcome.equipment_id, "EQ-1");
    assert!(dashboard.roster().is_scheduled("EQ-1"));
    assert!(dashboard.scheduling().draft().is_none());

    let requests = harness.backend.state().schedule_requests.clone();
    assert_eq!(
        requests,
        vec![(
            "EQ-1".to_string(),
            json!({
                "maintenance_type": "Preventive",
                "date": "2024-03-01",
                "issue_description": "noisy fan"
            })
        )]
    );

    let messages = harness.notifier.messages();
    assert!(messages
        .iter()
        .any(|m| m.starts_with("Maintenance scheduled successfully")));
    assert_eq!(messages.last().map(String::as_str), Some(LOAD_FAILED));
}

#[tokio::test]
async fn test_blank_description_sends_nothing() {
    let harness = ward();
    let mut dashboard = BiomedicalDashboard::open(harness.console.services.clone()).await;

    dashboard.begin_schedule("EQ-1").unwrap();
    dashboard.scheduling_mut().set_description("   ");

    assert!(dashboard.submit_schedule().await.is_err());
    assert!(harness.backend.state().schedule_requests.is_empty());
    assert_eq!(harness.notifier.last().unwrap().message, DESCRIPTION_REQUIRED);
    // the draft stays open for correction
    assert_eq!(dashboard.scheduling().open_for(), Some("EQ-1"));
}

#[tokio::test]
async fn test_technician_completes_task() {
    let harness = Harness::new(|state| {
        state.profile = profile("technician", Some("T-7"));
        state.equipments = vec![equipment("EQ-1", "Ventilator", "ICU")];
        state.priorities.insert("EQ-1".into(), at_risk("EQ-1"));
        state.logs = vec![log(json!({
            "maintenance_id": "MTN5",
            "equipment_id": "EQ-1",
            "status": "Scheduled",
            "maintenance_type": "Corrective",
            "date": "2024-03-01"
        }))];
    });
    let mut dashboard = TechnicianDashboard::new(harness.console.services.clone(), Duration::from_secs(30));
    dashboard.refresh().await;

    let queue = dashboard.queue();
    assert_eq!(queue.summary.scheduled_tasks, 1);
    assert_eq!(queue.summary.high_priority, 1);

    let task = dashboard.begin_completion("EQ-1").await.unwrap();
    assert_eq!(task.maintenance_id, "MTN5");

    let draft = dashboard.completion_draft().unwrap();
    draft.downtime_hours = Some(2.0);
    draft.cost_inr = Some(1500.0);
    draft.parts_replaced = "Filter".to_string();

    let maintenance_id = dashboard.submit_completion().await.unwrap();
    assert_eq!(maintenance_id, "MTN5");

    let (_, request) = harness.backend.state().completion_requests[0].clone();
    assert_eq!(request.remarks, "Parts: Filter | Vendor: N/A | Response Time: N/A hours");
    assert_eq!(request.technician_id, "T-7");

    let stored = harness.backend.log("MTN5").unwrap();
    assert_eq!(stored.status, Some(LogStatus::Completed));
    assert_eq!(stored.completion_status, Some(CompletionStatus::Pending));
    assert!(harness.notifier.messages().iter().any(|m| m == COMPLETED));

    // still active while waiting for review
    assert_eq!(dashboard.queue().summary.scheduled_tasks, 1);
}

#[tokio::test(start_paused = true)]
async fn test_poller_reports_new_tasks_once() {
    let harness = Harness::new(|state| {
        state.profile = profile("technician", Some("T-7"));
        state.equipments = vec![equipment("EQ-1", "Ventilator", "ICU")];
        state.new_scheduled_counts = [3, 3, 5].into();
    });
    let mut dashboard =
        TechnicianDashboard::open(harness.console.services.clone(), Duration::from_secs(30)).await;
    assert!(dashboard.is_polling());

    let event = dashboard.next_new_tasks().await.unwrap();
    assert_eq!(
        event,
        NewTasks {
            previous: 3,
            current: 5
        }
    );

    let announced = harness
        .notifier
        .messages()
        .into_iter()
        .filter(|m| m == NEW_TASK)
        .count();
    assert_eq!(announced, 1);

    dashboard.stop_polling().await;
    assert!(!dashboard.is_polling());
}

#[tokio::test]
async fn test_forbidden_reload_keeps_roster_and_ends_session() {
    let harness = ward();
    let mut dashboard = BiomedicalDashboard::open(harness.console.services.clone()).await;
    assert_eq!(dashboard.roster().equipments.len(), 2);
    assert_eq!(dashboard.roster().health_label("EQ-2"), HealthLabel::HighRisk);

    harness.backend.state().forbid_profile = true;
    assert!(!dashboard.refresh().await);

    assert_eq!(dashboard.roster().equipments.len(), 2);
    assert_eq!(dashboard.roster().health_label("EQ-2"), HealthLabel::HighRisk);
    assert!(matches!(harness.console.session.state(), SessionState::Expired { .. }));
    assert_eq!(harness.notifier.terminations(), 1);
    assert!(harness.notifier.messages().iter().any(|m| m == LOAD_FAILED));
}

#[tokio::test]
async fn test_rejected_review_returns_task_to_queue() {
    let harness = Harness::new(|state| {
        state.profile = profile("Biomedical Engineer", Some("B-2"));
        state.equipments = vec![equipment("EQ-2", "Infusion Pump", "Ward 3")];
        state.priorities.insert("EQ-2".into(), healthy("EQ-2"));
        state.logs = vec![log(json!({
            "maintenance_id": "MTN9",
            "equipment_id": "EQ-2",
            "technician_id": "T-7",
            "status": "Completed",
            "completion_status": "Pending"
        }))];
    });
    let mut dashboard = BiomedicalDashboard::open(harness.console.services.clone()).await;
    assert_eq!(dashboard.pending_reviews().count(), 1);
    assert!(!dashboard.roster().is_scheduled("EQ-2"));

    dashboard.begin_review("MTN9").unwrap();
    dashboard.rate(2, ReviewDecision::Rejected);
    let decision = dashboard.submit_review().await.unwrap();
    assert_eq!(decision, ReviewDecision::Rejected);

    let (_, request) = harness.backend.state().review_requests[0].clone();
    assert_eq!(request.service_rating, 2);
    assert_eq!(request.status, LogStatus::Scheduled);
    assert_eq!(request.completion_status, CompletionStatus::Rejected);

    assert!(dashboard.pending_reviews().is_empty());
    assert!(dashboard.roster().is_scheduled("EQ-2"));
    assert!(harness.notifier.messages().iter().any(|m| m == RETURNED));
}

#[tokio::test]
async fn test_detail_view_for_scheduled_item() {
    let harness = Harness::new(|state| {
        state.profile = profile("admin", None);
        state.equipments = vec![equipment("EQ-1", "Ventilator", "ICU")];
        state.priorities.insert("EQ-1".into(), at_risk("EQ-1"));
        state.logs = vec![
            log(json!({"maintenance_id": "MTN1", "equipment_id": "EQ-1", "status": "Scheduled"})),
            log(json!({"maintenance_id": "MTN2", "equipment_id": "EQ-9", "status": "Scheduled"})),
        ];
    });

    let detail = harness.console.services.detail.load("EQ-1").await.unwrap();
    assert_eq!(detail.logs.len(), 1);
    assert!(detail.scheduled);
    assert!(!detail.can_schedule());
    assert_eq!(detail.health.label, HealthLabel::HighRisk);
    assert_eq!(detail.explanation(), Some("Derived from recent usage"));
}
