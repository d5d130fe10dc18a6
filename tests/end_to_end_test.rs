// Integration tests driving the registry and the bridge the way the
// transports do: snapshots from polling, messages from the push feed.

use panel_bridge::accessory::{
    AccessoryContext, AccessoryState, ContactState, DeviceKind, LockState, SecurityState,
};
use panel_bridge::bridge::{self, Bridge};
use panel_bridge::config::BridgeConfig;
use panel_bridge::device::{DeviceId, DeviceUpdate};
use panel_bridge::message::{parse_timestamp_str, Inbound, Message, SystemSnapshot};
use panel_bridge::registry::{DeviceSet, MessageOutcome};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;

const SYSTEM_PANEL_ID: i64 = 38;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn device_set() -> DeviceSet {
    DeviceSet::new(
        Arc::new(BridgeConfig::default()),
        Some(DeviceId::Num(SYSTEM_PANEL_ID)),
    )
}

fn message(value: Value) -> Message {
    serde_json::from_value(value).unwrap()
}

fn patch_at(timestamp: &str, devices: Value) -> Message {
    message(json!({
        "Id": SYSTEM_PANEL_ID,
        "Type": "account_partition",
        "Data": {
            "PlatformContext": {"Timestamp": timestamp},
            "Devices": devices
        }
    }))
}

fn snapshot(value: Value) -> SystemSnapshot {
    serde_json::from_value(value).unwrap()
}

fn count(rx: &mut broadcast::Receiver<DeviceUpdate>) -> usize {
    let mut n = 0;
    while rx.try_recv().is_ok() {
        n += 1;
    }
    n
}

fn contact(set: &DeviceSet) -> ContactState {
    match set.device(&DeviceId::Num(42)).unwrap().state() {
        AccessoryState::Contact { contact, .. } => contact,
        other => panic!("expected contact state, got {:?}", other),
    }
}

// ── Registry scenarios ───────────────────────────────────────────────────────

#[test]
fn test_contact_sensor_snapshot_patch_and_stale_patch() {
    let mut set = device_set();
    set.bind_accessory(
        &AccessoryContext::new(42, "Back Door", DeviceKind::ContactSensor),
        Some(json!({"Id": 42, "Status": false})),
    )
    .unwrap();
    let mut rx = set.subscribe();

    let t1 = parse_timestamp_str("2018-06-16T05:03:49.230000").unwrap();
    set.handle_snapshot(
        snapshot(json!({"Devices": [{"Id": 42, "Status": false}]})),
        t1,
    )
    .unwrap();
    assert_eq!(contact(&set), ContactState::Detected);
    assert_eq!(count(&mut rx), 1);

    // Newer real-time patch
    let outcome = set
        .handle_message(patch_at(
            "2018-06-16T05:04:00.000000",
            json!([{"Id": 42, "Status": true}]),
        ))
        .unwrap();
    assert_eq!(outcome, MessageOutcome::Applied { devices: 1 });
    assert_eq!(contact(&set), ContactState::NotDetected);
    assert_eq!(count(&mut rx), 1);

    // Patch that raced behind the snapshot
    let outcome = set
        .handle_message(patch_at(
            "2018-06-16T05:03:00.000000",
            json!([{"Id": 42, "Status": false}]),
        ))
        .unwrap();
    assert_eq!(outcome, MessageOutcome::Stale);
    assert_eq!(contact(&set), ContactState::NotDetected);
    assert_eq!(count(&mut rx), 0);
}

#[test]
fn test_jammed_lock_alert() {
    let mut set = device_set();
    set.bind_accessory(
        &AccessoryContext::new(17, "Front Door", DeviceKind::Lock),
        Some(json!({"Id": 17, "Type": "door_lock_device", "Status": true})),
    )
    .unwrap();

    set.handle_message(message(json!({
        "Id": 900,
        "Type": "inbox_message",
        "Data": {
            "PlatformContext": {"Timestamp": "2018-06-16T05:03:49.230000"},
            "Subject": "Alert: Front Door failed to lock"
        }
    })))
    .unwrap();

    assert_eq!(
        set.device(&DeviceId::Num(17)).unwrap().state(),
        AccessoryState::Lock {
            current: LockState::Jammed,
            target_secured: false
        }
    );
}

#[test]
fn test_panel_status_follows_snapshot_and_messages() {
    let mut set = device_set();
    set.bind_accessory(&AccessoryContext::new(1, "Panel", DeviceKind::Panel), None)
        .unwrap();

    set.handle_snapshot(
        snapshot(json!({
            "Status": 0,
            "Devices": [{"Id": 1, "Type": "primary_touch_link_device"}]
        })),
        parse_timestamp_str("2018-06-16T05:00:00").unwrap(),
    )
    .unwrap();
    let panel_state = |set: &DeviceSet| set.device(&DeviceId::Num(1)).unwrap().state();
    assert_eq!(
        panel_state(&set),
        AccessoryState::SecuritySystem {
            current: Some(SecurityState::Disarmed)
        }
    );

    set.handle_message(message(json!({
        "Id": SYSTEM_PANEL_ID,
        "Data": {
            "PlatformContext": {"Timestamp": "2018-06-16T05:10:00"},
            "Status": 3
        }
    })))
    .unwrap();
    assert_eq!(
        panel_state(&set),
        AccessoryState::SecuritySystem {
            current: Some(SecurityState::StayArm)
        }
    );
}

#[test]
fn test_nested_patch_reaches_device_data() {
    let mut set = device_set();
    set.bind_accessory(
        &AccessoryContext::new(60, "Thermostat", DeviceKind::Thermostat),
        Some(json!({
            "Id": 60,
            "Schedule": {"Days": [{"Heat": 20, "Cool": 25}, {"Heat": 19, "Cool": 26}]}
        })),
    )
    .unwrap();

    set.handle_message(patch_at(
        "2018-06-16T05:00:00",
        json!([{"Id": 60, "Schedule.Days": [{"Heat": 21}]}]),
    ))
    .unwrap();

    assert_eq!(
        set.device(&DeviceId::Num(60)).unwrap().data()["Schedule"],
        json!({"Days": [{"Heat": 21, "Cool": 25}, {"Heat": 19, "Cool": 26}]})
    );
}

// ── Bridge runtime ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_bridge_processes_newline_delimited_inbound() {
    let config = BridgeConfig::default();
    let set = device_set();
    let mut rx_updates = set.subscribe();
    let (tx, rx) = bridge::channel(&config);
    let runner = tokio::spawn(Bridge::new(set, Vec::new()).run(rx));

    let lines = [
        r#"{"snapshot": {"Status": 0, "Devices": [{"Id": 42, "Name": "Window", "Type": "wireless_sensor", "EquipmentCode": 1251, "Status": false}, {"Id": 17, "Name": "Front Door", "Type": "door_lock_device", "Status": true}]}, "timestamp": "2018-06-16T05:00:00Z"}"#,
        r#"{"message": {"Id": 38, "Data": {"PlatformContext": {"Timestamp": "2018-06-16T05:00:05"}, "Devices": [{"Id": 42, "Status": true}]}}}"#,
        r#"{"message": {"Type": "inbox_message", "Data": {"PlatformContext": {"Timestamp": "2018-06-16T05:00:06"}, "Subject": "Alert: Front Door failed to lock"}}}"#,
        r#"{"message": {"Id": 38, "Data": {"PlatformContext": {"Timestamp": "2018-06-16T04:59:59"}, "Devices": [{"Id": 42, "Status": false}]}}}"#,
    ];
    for line in lines {
        let inbound: Inbound = serde_json::from_str(line).unwrap();
        tx.send(inbound).await.unwrap();
    }
    drop(tx);

    let bridge = runner.await.unwrap();
    let set = bridge.device_set();

    assert_eq!(set.len(), 2);
    assert_eq!(contact(set), ContactState::NotDetected);
    assert_eq!(
        set.device(&DeviceId::Num(17)).unwrap().state(),
        AccessoryState::Lock {
            current: LockState::Jammed,
            target_secured: false
        }
    );
    // Two from the snapshot, one patch, one jam; the stale patch is silent
    assert_eq!(count(&mut rx_updates), 4);
}
