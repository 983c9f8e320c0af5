//! Kafka Kubernetes Operator binary.
//!
//! Runs the KafkaCluster controller, which keeps per-broker ConfigMaps and
//! Services in line with the declared listeners and brokers.

use futures::StreamExt;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use kafka_operator::OperatorConfig;
use kafka_operator::controller::{ControllerContext, KafkaClusterController, cluster_error_policy};
use kafka_operator::crd::KafkaCluster;
use kube::runtime::Controller;
use kube::runtime::controller::Action;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::{Api, Client, CustomResourceExt};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kafka_operator=info".parse()?)
                .add_directive("kube=info".parse()?),
        )
        .init();

    // Check for CRD generation mode
    if std::env::args().any(|arg| arg == "--generate-crds") {
        generate_crds()?;
        return Ok(());
    }

    tracing::info!("Starting Kafka Kubernetes Operator");

    let config = OperatorConfig::from_env()?;
    tracing::info!(
        field_manager = %config.field_manager,
        namespace = config.watch_namespace.as_deref().unwrap_or("*"),
        resync_secs = config.resync_interval_secs,
        "Loaded operator configuration"
    );

    // Connect to Kubernetes
    let client = Client::try_default().await?;
    tracing::info!("Connected to Kubernetes cluster");

    let ctx = Arc::new(ControllerContext::new(client.clone(), config));
    run_cluster_controller(client, ctx).await
}

/// Run the KafkaCluster controller.
async fn run_cluster_controller(client: Client, ctx: Arc<ControllerContext>) -> anyhow::Result<()> {
    tracing::info!("Starting KafkaCluster controller");

    let (clusters, config_maps, services): (Api<KafkaCluster>, Api<ConfigMap>, Api<Service>) =
        match ctx.config.watch_namespace.as_deref() {
            Some(ns) => (
                Api::namespaced(client.clone(), ns),
                Api::namespaced(client.clone(), ns),
                Api::namespaced(client.clone(), ns),
            ),
            None => (
                Api::all(client.clone()),
                Api::all(client.clone()),
                Api::all(client.clone()),
            ),
        };
    let controller = KafkaClusterController::new(ctx.clone());

    Controller::new(clusters, WatcherConfig::default())
        .owns(config_maps, WatcherConfig::default())
        .owns(services, WatcherConfig::default())
        .shutdown_on_signal()
        .run(
            move |cluster, _ctx| {
                let controller = controller.clone();
                async move { controller.reconcile(cluster).await.map(Action::from) }
            },
            cluster_error_policy,
            ctx,
        )
        .for_each(|result| async move {
            match result {
                Ok((obj, action)) => {
                    tracing::debug!(
                        cluster = %obj.name,
                        namespace = obj.namespace.as_deref().unwrap_or_default(),
                        ?action,
                        "Reconciled cluster"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Cluster controller stream error");
                }
            }
        })
        .await;

    Ok(())
}

/// Generate CRD YAML.
fn generate_crds() -> anyhow::Result<()> {
    println!("---");
    println!("{}", serde_yaml::to_string(&KafkaCluster::crd())?);
    Ok(())
}
