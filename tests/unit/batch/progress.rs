use super::*;

#[test]
fn wire_shapes() {
    let skipped = ProgressEvent::Skipped {
        name: "GC Luz".to_string(),
        reason: SkipReason::TemplateNotFound,
    };
    let v: serde_json::Value = serde_json::from_str(&skipped.to_json()).unwrap();
    assert_eq!(v["name"], "GC Luz");
    assert_eq!(v["status"], "IGNORED");
    assert_eq!(v["reason"], "template not found");
    assert!(v["message"].as_str().unwrap().contains("GC Luz"));
    assert!(v.get("archiveLocator").is_none());

    let generated = ProgressEvent::Generated {
        name: "GC Paz".to_string(),
    };
    let v: serde_json::Value = serde_json::from_str(&generated.to_json()).unwrap();
    assert_eq!(v["status"], "GENERATED");
    assert!(v.get("reason").is_none());

    let done = ProgressEvent::BatchComplete {
        archive_locator: "https://files.example/banners.zip".to_string(),
    };
    let v: serde_json::Value = serde_json::from_str(&done.to_json()).unwrap();
    assert_eq!(v["status"], "COMPLETE");
    assert_eq!(v["archiveLocator"], "https://files.example/banners.zip");
    assert!(v.get("name").is_none());
}

#[test]
fn render_failure_reason_carries_cause() {
    let wire = ProgressEvent::Skipped {
        name: "x".to_string(),
        reason: SkipReason::RenderFailed("disk full".to_string()),
    }
    .to_wire();
    assert_eq!(wire.reason.as_deref(), Some("render failed: disk full"));
}

#[test]
fn every_subscriber_sees_every_event() {
    let hub = ProgressBroadcaster::new();
    let a = hub.subscribe();
    let b = hub.subscribe();

    hub.publish(ProgressEvent::Generated {
        name: "one".to_string(),
    });
    hub.publish(ProgressEvent::Generated {
        name: "two".to_string(),
    });

    for rx in [&a, &b] {
        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(got.len(), 2);
        assert_eq!(
            got[1],
            ProgressEvent::Generated {
                name: "two".to_string()
            }
        );
    }
}

#[test]
fn late_subscribers_get_no_replay_and_dropped_ones_are_pruned() {
    let hub = ProgressBroadcaster::new();
    let early = hub.subscribe();
    hub.publish(ProgressEvent::Generated {
        name: "before".to_string(),
    });

    let late = hub.subscribe();
    drop(early);
    assert_eq!(hub.subscriber_count(), 2);

    hub.publish(ProgressEvent::BatchComplete {
        archive_locator: "out/banners.zip".to_string(),
    });
    assert_eq!(hub.subscriber_count(), 1);

    let got: Vec<_> = late.try_iter().collect();
    assert_eq!(
        got,
        vec![ProgressEvent::BatchComplete {
            archive_locator: "out/banners.zip".to_string()
        }]
    );
}
