//! Watch lifecycle tests against the public client API.

use std::time::Duration;

use nebucloud_xds_client::prelude::*;
use nebucloud_xds_client::types::envoy::config::cluster::v3::cluster::LbPolicy;

use crate::harness::*;

const LONG: Duration = Duration::from_secs(300);

#[tokio::test]
async fn watch_sends_cds_request_with_node() {
    let mut harness = TestHarness::new();
    let handle = harness
        .client()
        .watch_cluster("backend", |_| {})
        .await
        .expect("watch should register");
    assert!(handle.request_sent());

    let request = harness.next_request().await.expect("request should be sent");
    assert_eq!(request.type_url, TypeUrl::CLUSTER);
    assert_eq!(request.resource_names, vec!["backend".to_string()]);
    assert!(request.version_info.is_empty());
    assert!(request.response_nonce.is_empty());

    let node = request.node.expect("node should be set");
    assert_eq!(node.id, TEST_NODE);
    assert_eq!(node.cluster, "integration");
}

/// Concrete scenario: EDS over ADS, round robin, no service name.
#[tokio::test]
async fn scenario_fallback_to_cluster_name() {
    let harness = TestHarness::new();
    let (callback, rx) = oneshot_callback();
    harness
        .client()
        .watch_cluster_with_timeout("A", LONG, callback)
        .await
        .unwrap();

    harness
        .client()
        .handle_response(&cds_response("1", &[eds_cluster("A", "")]))
        .unwrap();

    let expected = ClusterUpdate {
        service_name: "A".to_string(),
        enable_lrs: false,
    };
    assert_eq!(rx.await.unwrap().unwrap(), expected);
    assert_eq!(harness.client().cluster_cache().get("A"), Some(&expected));
}

#[tokio::test]
async fn configured_service_name_is_kept() {
    let harness = TestHarness::new();
    let (callback, rx) = oneshot_callback();
    harness
        .client()
        .watch_cluster_with_timeout("A", LONG, callback)
        .await
        .unwrap();

    let mut cluster = eds_cluster("A", "a-endpoints");
    cluster.lrs_server = Some(self_source());
    harness
        .client()
        .handle_response(&cds_response("1", &[cluster, eds_cluster("B", "")]))
        .unwrap();

    let update = rx.await.unwrap().unwrap();
    assert_eq!(update.service_name, "a-endpoints");
    assert!(update.enable_lrs);
}

#[tokio::test]
async fn round_trip_cache_matches_callback() {
    let harness = TestHarness::new();
    for (i, service) in ["", "svc-1", "svc-2"].iter().enumerate() {
        let (callback, rx) = oneshot_callback();
        harness
            .client()
            .watch_cluster_with_timeout("target", LONG, callback)
            .await
            .unwrap();

        harness
            .client()
            .handle_response(&cds_response(
                &i.to_string(),
                &[eds_cluster("other", ""), eds_cluster("target", service)],
            ))
            .unwrap();

        let delivered = rx.await.unwrap().unwrap();
        assert_eq!(harness.client().cluster_cache().get("target"), Some(&delivered));
    }
}

#[tokio::test]
async fn absent_target_updates_cache_and_reports_not_found() {
    let harness = TestHarness::new();
    let (callback, rx) = oneshot_callback();
    harness
        .client()
        .watch_cluster_with_timeout("missing", LONG, callback)
        .await
        .unwrap();

    harness
        .client()
        .handle_response(&cds_response(
            "1",
            &[eds_cluster("x", ""), eds_cluster("y", "y-eds"), eds_cluster("z", "")],
        ))
        .unwrap();

    let err = rx.await.unwrap().unwrap_err();
    assert!(matches!(err, XdsError::ResourceNotFound { ref name, .. } if name == "missing"));

    let cache = harness.client().cluster_cache();
    assert_eq!(cache.len(), 3);
    assert_eq!(cache["y"].service_name, "y-eds");
    assert_eq!(cache["z"].service_name, "z");
}

#[tokio::test]
async fn invalid_resource_leaves_cache_and_watch_untouched() {
    let harness = TestHarness::new();
    let outcomes = Outcomes::new();
    harness
        .client()
        .watch_cluster_with_timeout("A", LONG, outcomes.callback())
        .await
        .unwrap();
    harness
        .client()
        .handle_response(&cds_response("1", &[eds_cluster("A", ""), eds_cluster("B", "")]))
        .unwrap();
    let before = harness.client().cluster_cache();

    let later = Outcomes::new();
    harness
        .client()
        .watch_cluster_with_timeout("A", LONG, later.callback())
        .await
        .unwrap();

    for bad in [
        static_cluster("C"),
        cluster_with_policy("C", LbPolicy::LeastRequest),
        cluster_with_policy("C", LbPolicy::RingHash),
    ] {
        let err = harness
            .client()
            .handle_response(&cds_response("2", &[eds_cluster("A", "changed"), bad]))
            .unwrap_err();
        assert!(err.is_validation_failure());
        assert_eq!(*harness.client().cluster_cache(), *before);
    }

    assert_eq!(later.count(), 0);
    assert!(harness.client().clusters().has_pending_watch());
    assert_eq!(outcomes.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn timeout_fires_once_and_keeps_cache() {
    let harness = TestHarness::with_timeout(Duration::from_secs(15));
    let outcomes = Outcomes::new();
    harness
        .client()
        .watch_cluster("A", outcomes.callback())
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(14)).await;
    assert_eq!(outcomes.count(), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    tokio::time::sleep(Duration::from_secs(60)).await;

    let outcomes = outcomes.take();
    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0], Err(XdsError::Timeout { .. })));
    assert!(harness.client().cluster_cache().is_empty());
    assert_eq!(harness.client().stats().watch_timeouts(), 1);
}

#[tokio::test(start_paused = true)]
async fn reregistration_disarms_stale_timer() {
    let harness = TestHarness::with_timeout(Duration::from_secs(5));
    let first = Outcomes::new();
    let second = Outcomes::new();

    harness
        .client()
        .watch_cluster("A", first.callback())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;
    harness
        .client()
        .watch_cluster("B", second.callback())
        .await
        .unwrap();

    // The first watch's deadline passes; only its cancellation was delivered.
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(matches!(first.take()[..], [Err(XdsError::WatchCancelled { .. })]));
    assert_eq!(second.count(), 0);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(matches!(second.take()[..], [Err(XdsError::Timeout { .. })]));
}

#[tokio::test]
async fn callback_may_register_next_watch() {
    let harness = TestHarness::new();
    let client = harness.client().clone();
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();

    let follow_up = client.clone();
    client
        .watch_cluster_with_timeout("A", LONG, move |outcome| {
            assert!(outcome.is_ok());
            tokio::spawn(async move {
                let handle = follow_up.watch_cluster_with_timeout("B", LONG, |_| {}).await;
                let _ = done_tx.send(handle.is_ok());
            });
        })
        .await
        .unwrap();

    client
        .handle_response(&cds_response("1", &[eds_cluster("A", "")]))
        .unwrap();

    assert!(done_rx.await.unwrap());
    assert_eq!(client.clusters().watched_targets(), Some(vec!["B".to_string()]));
}

#[tokio::test]
async fn unsolicited_response_is_rejected() {
    let harness = TestHarness::new();
    let err = harness
        .client()
        .handle_response(&cds_response("1", &[eds_cluster("A", "")]))
        .unwrap_err();

    assert!(matches!(err, XdsError::NoActiveWatch { .. }));
    assert!(harness.client().cluster_cache().is_empty());
}

#[tokio::test]
async fn awaitable_watch_resolves() {
    let harness = TestHarness::new();
    let client = harness.client().clone();
    let waiter = tokio::spawn(async move { client.cluster("A").await });

    while !harness.client().clusters().has_pending_watch() {
        tokio::task::yield_now().await;
    }
    harness
        .client()
        .handle_response(&cds_response("1", &[eds_cluster("A", "a-eds")]))
        .unwrap();

    let update = waiter.await.unwrap().unwrap();
    assert_eq!(update.service_name, "a-eds");
}
