use super::*;
use crate::accessory::{AccessoryState, ContactState};
use crate::device::DeviceId;
use crate::dictionary::{device_type, equipment_code};
use crate::message::Message;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn snapshot_inbound(devices: Value, timestamp: &str) -> Inbound {
    serde_json::from_value(json!({
        "snapshot": {"Devices": devices, "Status": 0},
        "timestamp": timestamp
    }))
    .unwrap()
}

fn system_devices() -> Value {
    json!([
        {
            "Id": 42,
            "Name": "Window",
            "Type": device_type::WIRELESS_SENSOR,
            "EquipmentCode": equipment_code::DW10_THIN_DOOR_WINDOW,
            "Status": false
        },
        {"Id": 1, "Name": "Panel", "Type": device_type::PANEL},
        {"Id": 99, "Type": "keyfob_device"}
    ])
}

fn bridge_with(cached: Vec<AccessoryContext>) -> Bridge {
    let set = DeviceSet::new(Arc::new(BridgeConfig::default()), Some(DeviceId::Num(1000)));
    Bridge::new(set, cached)
}

#[test]
fn test_first_snapshot_bootstraps_and_applies() {
    let mut bridge = bridge_with(Vec::new());
    assert!(!bridge.is_bootstrapped());

    bridge
        .ingest(snapshot_inbound(system_devices(), "2018-06-16T05:00:00Z"))
        .unwrap();

    assert!(bridge.is_bootstrapped());
    let set = bridge.device_set();
    assert_eq!(set.len(), 2);
    assert_eq!(set.panel_device_id(), Some(&DeviceId::Num(1)));
    assert_eq!(
        set.device(&DeviceId::Num(42)).unwrap().state(),
        AccessoryState::Contact {
            contact: ContactState::Detected,
            tampered: false
        }
    );
    // System status copied onto the panel record
    assert_eq!(set.device(&DeviceId::Num(1)).unwrap().data()["Status"], json!(0));
}

#[test]
fn test_bootstrap_reconciles_cache() {
    let cached = vec![
        AccessoryContext::new(42, "Window", DeviceKind::ContactSensor),
        AccessoryContext::new(7, "Old Lock", DeviceKind::Lock),
    ];
    let mut bridge = bridge_with(cached);

    bridge
        .ingest(snapshot_inbound(system_devices(), "2018-06-16T05:00:00Z"))
        .unwrap();

    let plan = bridge.plan().unwrap();
    assert_eq!(plan.retained.len(), 1);
    assert_eq!(plan.added.len(), 1);
    assert_eq!(plan.removed[0].id, DeviceId::Num(7));
    assert!(bridge.device_set().device(&DeviceId::Num(7)).is_none());
}

#[test]
fn test_later_snapshots_do_not_rebind() {
    let mut bridge = bridge_with(Vec::new());
    bridge
        .ingest(snapshot_inbound(system_devices(), "2018-06-16T05:00:00Z"))
        .unwrap();

    let mut devices = system_devices();
    devices.as_array_mut().unwrap().push(json!({
        "Id": 5, "Name": "Front Door", "Type": device_type::DOOR_LOCK
    }));
    bridge
        .ingest(snapshot_inbound(devices, "2018-06-16T06:00:00Z"))
        .unwrap();

    assert_eq!(bridge.device_set().len(), 2);
}

#[test]
fn test_bad_cached_class_fails_bootstrap() {
    let mut context = AccessoryContext::new(42, "Window", DeviceKind::ContactSensor);
    context.device_class_name = "Toaster".to_string();
    let mut bridge = bridge_with(vec![context]);

    let err = bridge
        .ingest(snapshot_inbound(system_devices(), "2018-06-16T05:00:00Z"))
        .unwrap_err();
    assert!(format!("{:#}", err).contains("Toaster"));
    assert!(!bridge.is_bootstrapped());
}

#[test]
fn test_snapshot_with_bad_timestamp_is_rejected() {
    let mut bridge = bridge_with(Vec::new());
    assert!(bridge
        .ingest(snapshot_inbound(system_devices(), "not a time"))
        .is_err());
    assert!(bridge.device_set().is_empty());
}

#[tokio::test]
async fn test_run_drains_channel_in_order() {
    let bridge = bridge_with(Vec::new());
    let mut updates = bridge.device_set().subscribe();
    let (tx, rx) = channel(&BridgeConfig::default());
    let handle = tokio::spawn(bridge.run(rx));

    tx.send(snapshot_inbound(system_devices(), "2018-06-16T05:00:00Z"))
        .await
        .unwrap();
    let fresh: Message = serde_json::from_value(json!({
        "Data": {
            "PlatformContext": {"Timestamp": "2018-06-16T05:00:01"},
            "Devices": [{"Id": 42, "Status": true}]
        }
    }))
    .unwrap();
    tx.send(Inbound::message(fresh)).await.unwrap();
    drop(tx);

    let bridge = handle.await.unwrap();
    let set = bridge.into_device_set();
    assert_eq!(
        set.device(&DeviceId::Num(42)).unwrap().data()["Status"],
        json!(true)
    );

    // Two records from the snapshot, then the patch
    let mut count = 0;
    while updates.try_recv().is_ok() {
        count += 1;
    }
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_run_survives_bad_items() {
    let bridge = bridge_with(Vec::new());
    let (tx, rx) = channel(&BridgeConfig::default());
    let handle = tokio::spawn(bridge.run(rx));

    tx.send(snapshot_inbound(system_devices(), "garbage"))
        .await
        .unwrap();
    tx.send(snapshot_inbound(system_devices(), "2018-06-16T05:00:00Z"))
        .await
        .unwrap();
    drop(tx);

    let bridge = handle.await.unwrap();
    assert!(bridge.is_bootstrapped());
    assert_eq!(bridge.device_set().len(), 2);
}

#[tokio::test]
async fn test_snapshot_refresh_feeds_bridge_until_closed() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (tx, mut rx) = mpsc::channel(4);

    let counter = calls.clone();
    let refresh = tokio::spawn(run_snapshot_refresh(
        Duration::from_millis(5),
        tx,
        move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 1 {
                    anyhow::bail!("transport hiccup");
                }
                let snapshot: SystemSnapshot =
                    serde_json::from_value(json!({"Devices": [{"Id": n}]}))?;
                Ok::<_, anyhow::Error>((snapshot, Utc::now()))
            }
        },
    ));

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert!(matches!(first, Inbound::Snapshot { .. }));
    match second {
        Inbound::Snapshot { snapshot, .. } => {
            // The failed fetch in between was skipped
            assert_eq!(snapshot.devices, vec![json!({"Id": 2})]);
        }
        other => panic!("expected snapshot, got {:?}", other),
    }

    drop(rx);
    refresh.await.unwrap();
    assert!(calls.load(Ordering::SeqCst) >= 3);
}
