//! Test harness for client integration tests.
//!
//! Provides utilities for:
//! - Wiring an [`XdsClient`] to an in-process fake control plane
//! - Creating sample cluster resources and responses
//! - Capturing watch outcomes

use std::sync::Arc;
use std::time::Duration;

use nebucloud_xds_client::core::encode_any;
use nebucloud_xds_client::prelude::*;
use nebucloud_xds_client::types::envoy::config::cluster::v3::cluster::{
    ClusterDiscoveryType, DiscoveryType, EdsClusterConfig, LbPolicy,
};
use nebucloud_xds_client::types::envoy::config::cluster::v3::Cluster;
use nebucloud_xds_client::types::envoy::config::core::v3::config_source::ConfigSourceSpecifier;
use nebucloud_xds_client::types::envoy::config::core::v3::{
    AggregatedConfigSource, ConfigSource, SelfConfigSource,
};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::info;

/// Node id used by every harness client.
pub const TEST_NODE: &str = "integration-node";

/// Inbound item as produced by a tonic streaming call.
pub type ResponseItem = Result<DiscoveryResponse, tonic::Status>;

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A client wired to a fake control plane.
///
/// Requests written by the client are readable with
/// [`next_request`](Self::next_request). Responses pushed with
/// [`respond`](Self::respond) are consumed by the client's response loop
/// once [`start`](Self::start) has been called.
pub struct TestHarness {
    client: XdsClient,
    requests: ReceiverStream<DiscoveryRequest>,
    responses: Option<mpsc::Sender<ResponseItem>>,
    inbound: Option<mpsc::Receiver<ResponseItem>>,
    run: Option<JoinHandle<XdsError>>,
}

impl TestHarness {
    /// Create a harness using the default watch timeout.
    pub fn new() -> Self {
        Self::with_timeout(ClientConfig::DEFAULT_WATCH_TIMEOUT)
    }

    /// Create a harness whose watches expire after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        init_tracing();

        let (responses, inbound) = mpsc::channel(64);
        let (client, requests) = XdsClient::builder()
            .node(NodeIdentity::new(TEST_NODE).with_cluster("integration"))
            .watch_timeout(timeout)
            .request_buffer(64)
            .build_channel()
            .expect("harness client should build");

        Self {
            client,
            requests,
            responses: Some(responses),
            inbound: Some(inbound),
            run: None,
        }
    }

    /// The client under test.
    pub fn client(&self) -> &XdsClient {
        &self.client
    }

    /// Spawn the client's response loop.
    pub fn start(&mut self) {
        if let Some(inbound) = self.inbound.take() {
            let client = self.client.clone();
            self.run = Some(tokio::spawn(async move {
                client.run(ReceiverStream::new(inbound)).await
            }));
            info!("harness response loop started");
        }
    }

    /// Next request the client wrote, if any arrives within a second.
    pub async fn next_request(&mut self) -> Option<DiscoveryRequest> {
        tokio::time::timeout(Duration::from_secs(1), self.requests.next())
            .await
            .ok()
            .flatten()
    }

    /// Push a response to the client.
    pub async fn respond(&self, response: DiscoveryResponse) {
        self.push(Ok(response)).await;
    }

    /// Push a transport failure to the client.
    pub async fn fail(&self, status: tonic::Status) {
        self.push(Err(status)).await;
    }

    async fn push(&self, item: ResponseItem) {
        if let Some(responses) = &self.responses {
            responses
                .send(item)
                .await
                .expect("response loop should be receiving");
        }
    }

    /// Close the inbound stream.
    pub fn close(&mut self) {
        self.responses = None;
    }

    /// Wait for the response loop to end and return its reason.
    pub async fn stopped(&mut self) -> Option<XdsError> {
        let run = self.run.take()?;
        run.await.ok()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Captured watch outcomes.
#[derive(Clone, Default)]
pub struct Outcomes(Arc<Mutex<Vec<XdsResult<ClusterUpdate>>>>);

impl Outcomes {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback recording every outcome it receives.
    pub fn callback(&self) -> impl FnOnce(XdsResult<ClusterUpdate>) + Send + 'static {
        let inner = Arc::clone(&self.0);
        move |outcome| inner.lock().push(outcome)
    }

    /// Number of callback invocations so far.
    pub fn count(&self) -> usize {
        self.0.lock().len()
    }

    /// Take the recorded outcomes.
    pub fn take(&self) -> Vec<XdsResult<ClusterUpdate>> {
        std::mem::take(&mut *self.0.lock())
    }
}

/// Callback forwarding its outcome to a oneshot receiver.
pub fn oneshot_callback() -> (
    impl FnOnce(XdsResult<ClusterUpdate>) + Send + 'static,
    oneshot::Receiver<XdsResult<ClusterUpdate>>,
) {
    let (tx, rx) = oneshot::channel();
    (
        move |outcome| {
            let _ = tx.send(outcome);
        },
        rx,
    )
}

/// Endpoints delivered over the aggregated stream.
pub fn ads_source() -> ConfigSource {
    ConfigSource {
        config_source_specifier: Some(ConfigSourceSpecifier::Ads(AggregatedConfigSource {})),
    }
}

/// The control plane itself.
pub fn self_source() -> ConfigSource {
    ConfigSource {
        config_source_specifier: Some(ConfigSourceSpecifier::Self_(SelfConfigSource {
            transport_api_version: 2,
        })),
    }
}

/// A cluster the client accepts.
pub fn eds_cluster(name: &str, service_name: &str) -> Cluster {
    Cluster {
        name: name.to_string(),
        cluster_discovery_type: Some(ClusterDiscoveryType::Type(DiscoveryType::Eds as i32)),
        eds_cluster_config: Some(EdsClusterConfig {
            eds_config: Some(ads_source()),
            service_name: service_name.to_string(),
        }),
        lb_policy: LbPolicy::RoundRobin as i32,
        lrs_server: None,
    }
}

/// A statically configured cluster, which the client rejects.
pub fn static_cluster(name: &str) -> Cluster {
    Cluster {
        cluster_discovery_type: Some(ClusterDiscoveryType::Type(DiscoveryType::Static as i32)),
        ..eds_cluster(name, "")
    }
}

/// A cluster using the given load balancing policy.
pub fn cluster_with_policy(name: &str, policy: LbPolicy) -> Cluster {
    Cluster {
        lb_policy: policy as i32,
        ..eds_cluster(name, "")
    }
}

/// A CDS response carrying `clusters`.
pub fn cds_response(version: &str, clusters: &[Cluster]) -> DiscoveryResponse {
    DiscoveryResponse {
        version_info: version.to_string(),
        resources: clusters
            .iter()
            .map(|c| encode_any(c, TypeUrl::CLUSTER))
            .collect(),
        type_url: TypeUrl::CLUSTER.to_string(),
        nonce: format!("nonce-{version}"),
        ..Default::default()
    }
}
