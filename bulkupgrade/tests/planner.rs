//! Upgrade planner tests

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;

use bulkupgrade::manifest::UpgradeRow;
use bulkupgrade::upgrade::{plan_and_submit, OutcomeKind, OutcomeLog, Severity};
use common::{state_on, Call, FakeController};

fn row(n: usize, serial: &str, version: &str, interfaces: Option<&str>) -> UpgradeRow {
    UpgradeRow {
        row: n,
        serial_number: Some(serial.to_string()),
        software_version: Some(version.to_string()),
        download_time: Some("2024-01-01T00:00:00Z".to_string()),
        upgrade_time: Some("2024-01-02T00:00:00Z".to_string()),
        interfaces: interfaces.map(str::to_string),
        download_interval: Some("30".to_string()),
        upgrade_interval: Some("60".to_string()),
    }
}

fn lines(log: &OutcomeLog) -> Vec<String> {
    log.outcomes().iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn test_schedules_upgrade_with_resolved_interfaces() {
    let fake = FakeController::standard();
    let catalog = fake.catalog().await;
    let mut log = OutcomeLog::new();

    plan_and_submit(&[row(1, "SN123", "5.2.1", Some("ge0-0,ge0-1"))], &catalog, &fake, &mut log).await;

    assert_eq!(fake.count(|c| matches!(c, Call::GetState(id) if id == "D1")), 1);
    let puts = fake.puts();
    assert_eq!(puts.len(), 1);
    let (device_id, state) = &puts[0];
    assert_eq!(device_id, "D1");
    assert_eq!(state.image_id.as_deref(), Some("IMG-521"));
    assert_eq!(state.interface_ids, Some(vec!["I1".to_string(), "I2".to_string()]));
    assert_eq!(state.scheduled_download.as_deref(), Some("2024-01-01T00:00:00Z"));
    assert_eq!(state.scheduled_upgrade.as_deref(), Some("2024-01-02T00:00:00Z"));
    assert_eq!(state.download_interval, Some(30));
    assert_eq!(state.upgrade_interval, Some(60));

    // server-managed fields from the fetched state survive
    assert_eq!(state.extra.get("id"), Some(&json!("st-D1")));
    assert_eq!(state.extra.get("_etag"), Some(&json!(3)));

    assert_eq!(lines(&log), vec!["INFO: [CSV Row 1] Device SN123 upgrade to 5.2.1 scheduled"]);
}

#[tokio::test]
async fn test_already_current_is_skipped() {
    let fake = FakeController::standard();
    fake.set_state("D1", state_on("D1", "IMG-521"));
    let catalog = fake.catalog().await;
    let mut log = OutcomeLog::new();

    plan_and_submit(&[row(1, "SN123", "5.2.1", Some("ge0-0,ge0-1"))], &catalog, &fake, &mut log).await;

    assert_eq!(fake.calls(), vec![Call::GetState("D1".to_string())]);
    assert_eq!(
        lines(&log),
        vec!["INFO: [CSV Row 1] Device SN123 already at 5.2.1. Skipping Upgrade.."]
    );
    assert_eq!(log.count(OutcomeKind::AlreadyCurrent), 1);
}

#[tokio::test]
async fn test_repeated_run_issues_no_mutation() {
    let fake = FakeController::standard();
    let catalog = fake.catalog().await;
    let rows = vec![
        row(1, "SN123", "5.2.1", None),
        row(2, "SN999", "5.2.1", None),
        row(3, "SN777", "5.2.1", None),
    ];

    let mut first = OutcomeLog::new();
    plan_and_submit(&rows, &catalog, &fake, &mut first).await;
    assert_eq!(fake.puts().len(), 2);

    fake.clear_calls();
    let mut second = OutcomeLog::new();
    plan_and_submit(&rows, &catalog, &fake, &mut second).await;
    assert_eq!(fake.puts().len(), 0);
    assert_eq!(second.count(OutcomeKind::AlreadyCurrent), 3);
}

#[tokio::test]
async fn test_unknown_serial_makes_no_calls() {
    let fake = FakeController::standard();
    let catalog = fake.catalog().await;
    let mut log = OutcomeLog::new();

    plan_and_submit(&[row(7, "SN404", "5.2.1", Some("ge0-0"))], &catalog, &fake, &mut log).await;

    assert!(fake.calls().is_empty());
    assert_eq!(
        lines(&log),
        vec!["ERR: [CSV Row 7] Device SN404 not found. Please check the Serial Number"]
    );
}

#[tokio::test]
async fn test_version_resolution_errors() {
    let fake = FakeController::standard();
    let catalog = fake.catalog().await;
    let mut log = OutcomeLog::new();

    let rows = vec![row(1, "SN123", "4.7.1", None), row(2, "SN123", "9.9.9", None)];
    plan_and_submit(&rows, &catalog, &fake, &mut log).await;

    assert!(fake.calls().is_empty());
    assert_eq!(
        lines(&log),
        vec![
            "ERR: [CSV Row 1] Image 4.7.1 is no longer supported. Please choose a different software image",
            "ERR: [CSV Row 2] Invalid Software Image 9.9.9",
        ]
    );
}

#[tokio::test]
async fn test_unassigned_device_ignores_interfaces() {
    let fake = FakeController::standard();
    let catalog = fake.catalog().await;
    let mut log = OutcomeLog::new();

    plan_and_submit(&[row(1, "SN999", "5.2.1", Some("ge0-0"))], &catalog, &fake, &mut log).await;

    let puts = fake.puts();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].1.interface_ids, None);
    assert_eq!(fake.count(|c| matches!(c, Call::ListInterfaces { .. })), 0);
    assert_eq!(
        lines(&log),
        vec![
            "WARN: [CSV Row 1] Device SN999 is not assigned to a site. Ignoring Interface settings for upgrade.",
            "INFO: [CSV Row 1] Device SN999 upgrade to 5.2.1 scheduled",
        ]
    );
}

#[tokio::test]
async fn test_unassigned_device_without_interfaces_has_no_warning() {
    let fake = FakeController::standard();
    let catalog = fake.catalog().await;
    let mut log = OutcomeLog::new();

    plan_and_submit(&[row(1, "SN999", "5.2.1", None)], &catalog, &fake, &mut log).await;

    assert_eq!(log.count(OutcomeKind::Warning), 0);
    assert_eq!(fake.puts()[0].1.interface_ids, None);
}

#[tokio::test]
async fn test_invalid_interfaces_are_dropped() {
    let fake = FakeController::standard();
    let catalog = fake.catalog().await;
    let mut log = OutcomeLog::new();

    plan_and_submit(&[row(3, "SN123", "5.2.1", Some("ge0-0, bogus"))], &catalog, &fake, &mut log).await;

    assert_eq!(fake.puts()[0].1.interface_ids, Some(vec!["I1".to_string()]));
    assert_eq!(
        lines(&log),
        vec![
            "ERR: [CSV Row 3] Interface bogus not found on Device SN123. Ignoring Interface settings for upgrade.",
            "INFO: [CSV Row 3] Device SN123 upgrade to 5.2.1 scheduled",
        ]
    );
}

#[tokio::test]
async fn test_all_invalid_interfaces_collapse_to_all() {
    let fake = FakeController::standard();
    let catalog = fake.catalog().await;
    let mut log = OutcomeLog::new();

    // ge0-1 exists on D1 but not on D3
    plan_and_submit(&[row(1, "SN777", "5.2.0", Some("ge0-1,bogus"))], &catalog, &fake, &mut log).await;

    let puts = fake.puts();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].1.interface_ids, None);
    assert_eq!(log.error_count(), 2);
    assert_eq!(log.count(OutcomeKind::Scheduled), 1);
}

#[tokio::test]
async fn test_interface_names_are_scoped_to_the_device() {
    let fake = FakeController::standard();
    let catalog = fake.catalog().await;
    let mut log = OutcomeLog::new();

    plan_and_submit(&[row(1, "SN777", "5.2.0", Some("ge0-0"))], &catalog, &fake, &mut log).await;

    assert_eq!(fake.puts()[0].1.interface_ids, Some(vec!["I31".to_string()]));
}

#[tokio::test]
async fn test_state_fetch_failure_continues() {
    let mut fake = FakeController::standard();
    fake.failures.state_fetch.insert("D1".to_string());
    let catalog = fake.catalog().await;
    let mut log = OutcomeLog::new();

    let rows = vec![row(1, "SN123", "5.2.1", None), row(2, "SN999", "5.2.1", None)];
    plan_and_submit(&rows, &catalog, &fake, &mut log).await;

    assert_eq!(fake.count(|c| matches!(c, Call::PutState(id, _) if id == "D1")), 0);
    assert_eq!(
        lines(&log),
        vec![
            "ERR: [CSV Row 1] Could not retrieve software status for Device SN123",
            "INFO: [CSV Row 2] Device SN999 upgrade to 5.2.1 scheduled",
        ]
    );
}

#[tokio::test]
async fn test_state_update_failure_continues() {
    let mut fake = FakeController::standard();
    fake.failures.state_update.insert("D1".to_string());
    let catalog = fake.catalog().await;
    let mut log = OutcomeLog::new();

    let rows = vec![row(1, "SN123", "5.2.1", None), row(2, "SN999", "5.2.1", None)];
    plan_and_submit(&rows, &catalog, &fake, &mut log).await;

    assert_eq!(fake.puts().len(), 2);
    assert_eq!(
        lines(&log),
        vec![
            "ERR: [CSV Row 1] Device SN123 could not be upgraded to 5.2.1",
            "INFO: [CSV Row 2] Device SN999 upgrade to 5.2.1 scheduled",
        ]
    );
}

#[tokio::test]
async fn test_blank_schedule_fields_are_sent_as_null() {
    let fake = FakeController::standard();
    let catalog = fake.catalog().await;
    let mut log = OutcomeLog::new();

    let blank = UpgradeRow {
        row: 1,
        serial_number: Some("SN123".to_string()),
        software_version: Some("5.2.1".to_string()),
        ..Default::default()
    };
    plan_and_submit(&[blank], &catalog, &fake, &mut log).await;

    let puts = fake.puts();
    let state = &puts[0].1;
    assert_eq!(state.scheduled_download, None);
    assert_eq!(state.scheduled_upgrade, None);
    assert_eq!(state.download_interval, None);
    assert_eq!(state.interface_ids, None);

    let body = serde_json::to_value(state).unwrap();
    assert_eq!(body["scheduled_download"], serde_json::Value::Null);
    assert_eq!(body["interface_ids"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_invalid_interval_rejects_row() {
    let fake = FakeController::standard();
    let catalog = fake.catalog().await;
    let mut log = OutcomeLog::new();

    let mut bad = row(2, "SN123", "5.2.1", None);
    bad.download_interval = Some("daily".to_string());
    plan_and_submit(&[bad], &catalog, &fake, &mut log).await;

    assert!(fake.calls().is_empty());
    assert_eq!(log.outcomes()[0].severity, Severity::Err);
    assert_eq!(
        lines(&log),
        vec!["ERR: [CSV Row 2] Invalid download_interval value daily for Device SN123"]
    );
}

#[tokio::test]
async fn test_blank_row_is_reported_not_found() {
    let fake = FakeController::standard();
    let catalog = fake.catalog().await;
    let mut log = OutcomeLog::new();
    let blank = UpgradeRow {
        row: 1,
        ..Default::default()
    };

    plan_and_submit(&[blank, row(2, "SN123", "5.2.1", None)], &catalog, &fake, &mut log).await;

    assert_eq!(
        lines(&log),
        vec![
            "ERR: [CSV Row 1] Device <blank> not found. Please check the Serial Number",
            "INFO: [CSV Row 2] Device SN123 upgrade to 5.2.1 scheduled",
        ]
    );
    assert_eq!(fake.puts().len(), 1);
}
