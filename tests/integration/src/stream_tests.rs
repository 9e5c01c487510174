//! Response loop tests: the client driven by a fake control plane.

use std::time::Duration;

use nebucloud_xds_client::core::encode_any;
use nebucloud_xds_client::prelude::*;

use crate::harness::*;

const LONG: Duration = Duration::from_secs(300);

#[tokio::test]
async fn responses_flow_through_run_loop() {
    let mut harness = TestHarness::new();
    harness.start();

    let (callback, rx) = oneshot_callback();
    harness
        .client()
        .watch_cluster_with_timeout("A", LONG, callback)
        .await
        .unwrap();
    let request = harness.next_request().await.expect("subscription");
    assert_eq!(request.resource_names, vec!["A".to_string()]);

    harness
        .respond(cds_response("1", &[eds_cluster("A", "a-eds")]))
        .await;
    let update = rx.await.unwrap().unwrap();
    assert_eq!(update.service_name, "a-eds");

    // Later versions refresh the cache only.
    harness
        .respond(cds_response("2", &[eds_cluster("A", "a-eds-2")]))
        .await;
    harness.close();

    let reason = harness.stopped().await.expect("loop result");
    assert!(matches!(reason, XdsError::StreamClosed { .. }));
    assert_eq!(harness.client().cluster_cache()["A"].service_name, "a-eds-2");
    assert_eq!(harness.client().stats().responses_handled(), 2);
    assert_eq!(harness.client().stats().watches_satisfied(), 1);
}

/// Concrete scenario: a statically configured cluster is rejected.
#[tokio::test]
async fn scenario_static_cluster_rejected() {
    let mut harness = TestHarness::new();
    harness.start();

    // Establish prior cache state.
    let (callback, rx) = oneshot_callback();
    harness
        .client()
        .watch_cluster_with_timeout("A", LONG, callback)
        .await
        .unwrap();
    harness.respond(cds_response("1", &[eds_cluster("A", "")])).await;
    rx.await.unwrap().unwrap();
    let before = harness.client().cluster_cache();

    let (callback, rx) = oneshot_callback();
    harness
        .client()
        .watch_cluster_with_timeout("B", LONG, callback)
        .await
        .unwrap();
    harness.respond(cds_response("2", &[static_cluster("B")])).await;

    let err = rx.await.unwrap().unwrap_err();
    assert!(err.is_validation_failure());
    assert!(err.to_string().contains("discovery type"));
    assert_eq!(*harness.client().cluster_cache(), *before);

    let reason = harness.stopped().await.expect("loop result");
    assert!(reason.is_validation_failure());
    assert_eq!(harness.client().stats().responses_rejected(), 1);
}

#[tokio::test]
async fn foreign_type_url_ends_loop() {
    let mut harness = TestHarness::new();
    harness.start();

    harness
        .respond(DiscoveryResponse {
            version_info: "1".to_string(),
            type_url: TypeUrl::ROUTE.to_string(),
            ..Default::default()
        })
        .await;

    let reason = harness.stopped().await.expect("loop result");
    assert!(matches!(reason, XdsError::InvalidTypeUrl { .. }));
    assert!(reason.is_protocol_violation());
}

#[tokio::test]
async fn mismatched_envelope_fails_watch() {
    let mut harness = TestHarness::new();
    harness.start();

    let (callback, rx) = oneshot_callback();
    harness
        .client()
        .watch_cluster_with_timeout("A", LONG, callback)
        .await
        .unwrap();

    let mut response = cds_response("1", &[eds_cluster("A", "")]);
    response.resources[0] = encode_any(&eds_cluster("A", ""), TypeUrl::LISTENER);
    harness.respond(response).await;

    let err = rx.await.unwrap().unwrap_err();
    assert!(matches!(err, XdsError::UnexpectedResourceType { .. }));
    assert!(harness.client().cluster_cache().is_empty());
}

#[tokio::test]
async fn transport_failure_keeps_watch_pending() {
    let mut harness = TestHarness::new();
    harness.start();

    let outcomes = Outcomes::new();
    harness
        .client()
        .watch_cluster_with_timeout("A", LONG, outcomes.callback())
        .await
        .unwrap();
    harness
        .fail(tonic::Status::unavailable("control plane restarting"))
        .await;

    let reason = harness.stopped().await.expect("loop result");
    assert!(matches!(reason, XdsError::TransportError { .. }));
    assert_eq!(outcomes.count(), 0);
    assert!(harness.client().clusters().has_pending_watch());
}

#[tokio::test]
async fn reconnect_resubscribes_and_completes_watch() {
    let mut harness = TestHarness::new();
    let (callback, rx) = oneshot_callback();
    harness
        .client()
        .watch_cluster_with_timeout("A", LONG, callback)
        .await
        .unwrap();
    harness.next_request().await.expect("first subscription");

    let (fresh, mut requests) = ChannelStream::pair(4);
    assert_eq!(harness.client().replace_stream(fresh).await, 1);

    let request = tokio_stream::StreamExt::next(&mut requests)
        .await
        .expect("resubscription on the new stream");
    assert_eq!(request.resource_names, vec!["A".to_string()]);
    assert!(harness.next_request().await.is_none());

    harness
        .client()
        .handle_response(&cds_response("1", &[eds_cluster("A", "")]))
        .unwrap();
    assert!(rx.await.unwrap().is_ok());
}

#[tokio::test]
async fn closed_request_stream_reports_send_failure() {
    let harness = TestHarness::new();
    let (stream, requests) = ChannelStream::pair(1);
    drop(requests);
    harness.client().replace_stream(stream).await;

    let handle = harness
        .client()
        .watch_cluster_with_timeout("A", LONG, |_| {})
        .await
        .expect("registration succeeds without a live stream");

    assert!(!handle.request_sent());
    assert!(harness.client().clusters().has_pending_watch());
    assert_eq!(harness.client().stats().send_failures(), 1);
}
