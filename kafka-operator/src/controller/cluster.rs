//! KafkaCluster controller.
//!
//! Reconciles KafkaCluster resources into per-broker ConfigMaps and Services.

use super::{ControllerContext, ReconcileAction};
use crate::crd::{BrokerErrorStatus, ClusterPhase, KafkaCluster, KafkaClusterStatus};
use crate::error::{OperatorError, OperatorResult, ResolutionError, ValidationError};
use crate::listeners::{ClusterTopology, assemble_all, derive_ports};
use crate::properties::PropertiesDocument;
use crate::resources;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use kube::api::{DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::core::NamespaceResourceScope;
use kube::runtime::controller::Action;
use kube::{Api, Resource, ResourceExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

/// Controller for KafkaCluster resources.
#[derive(Clone)]
pub struct KafkaClusterController {
    ctx: Arc<ControllerContext>,
}

impl KafkaClusterController {
    /// Create a new cluster controller.
    pub fn new(ctx: Arc<ControllerContext>) -> Self {
        Self { ctx }
    }

    /// Reconcile a KafkaCluster resource.
    ///
    /// 1. Builds and validates the cluster topology
    /// 2. Resolves the listener configuration of every broker
    /// 3. Applies each resolved broker's ConfigMap and Service
    /// 4. Deletes the objects of brokers no longer declared
    /// 5. Updates the cluster status
    ///
    /// An invalid spec is reported in the status and not retried until the
    /// resource changes. A broker that cannot be resolved keeps its previous
    /// objects and is listed in `status.brokerErrors`.
    pub async fn reconcile(&self, cluster: Arc<KafkaCluster>) -> OperatorResult<ReconcileAction> {
        let name = cluster.name_any();
        let namespace = cluster
            .namespace()
            .ok_or_else(|| ValidationError::MissingNamespace {
                cluster: name.clone(),
            })?;

        tracing::info!(
            name = %name,
            namespace = %namespace,
            brokers = cluster.spec.brokers.len(),
            listeners = cluster.spec.listeners.len(),
            "Reconciling KafkaCluster"
        );

        let clusters: Api<KafkaCluster> = Api::namespaced(self.ctx.client.clone(), &namespace);

        let topology = match ClusterTopology::from_cluster(&cluster) {
            Ok(topology) => topology,
            Err(err) => {
                return self
                    .handle_invalid_spec(&cluster, &clusters, err.to_string())
                    .await;
            }
        };

        let read_only = match cluster.spec.read_only_config.as_deref() {
            Some(text) => match PropertiesDocument::parse(text) {
                Ok(doc) => Some(doc),
                Err(err) => {
                    return self
                        .handle_invalid_spec(&cluster, &clusters, err.to_string())
                        .await;
                }
            },
            None => None,
        };

        let ports = derive_ports(topology.catalog());
        let mut configured = 0;
        let mut failures = Vec::new();
        let mut warned_ignored = false;

        for (broker_id, result) in assemble_all(&topology) {
            let listener_properties = match result {
                Ok(doc) => doc,
                Err(err) => {
                    tracing::warn!(
                        name = %name,
                        broker = broker_id,
                        error = %err,
                        "Broker listener configuration could not be resolved"
                    );
                    failures.push(err);
                    continue;
                }
            };

            let (properties, ignored) =
                resources::broker_properties(&listener_properties, read_only.as_ref());
            if !ignored.is_empty() && !warned_ignored {
                tracing::warn!(
                    name = %name,
                    keys = ?ignored,
                    "Ignoring operator-owned listener properties in readOnlyConfig"
                );
                warned_ignored = true;
            }

            let cm = resources::build_broker_configmap(&cluster, &namespace, broker_id, &properties);
            self.ensure_resource(&namespace, &cm).await?;

            let svc = resources::build_broker_service(&cluster, &namespace, broker_id, &ports);
            self.ensure_resource(&namespace, &svc).await?;

            configured += 1;
        }

        let declared: HashSet<u32> = topology.brokers().iter().map(|b| b.id).collect();
        self.prune_removed_brokers::<ConfigMap>(&name, &namespace, &declared)
            .await?;
        self.prune_removed_brokers::<Service>(&name, &namespace, &declared)
            .await?;

        let has_failures = !failures.is_empty();
        let status = reconciled_status(configured, &failures, cluster.metadata.generation);
        self.update_status_if_changed(&cluster, &clusters, status)
            .await?;

        if has_failures {
            Ok(ReconcileAction::Requeue(self.ctx.config.error_requeue()))
        } else {
            tracing::info!(name = %name, brokers = configured, "KafkaCluster reconciled");
            Ok(ReconcileAction::Requeue(self.ctx.config.resync_interval()))
        }
    }

    /// Report an invalid spec and wait for the resource to change.
    async fn handle_invalid_spec(
        &self,
        cluster: &KafkaCluster,
        api: &Api<KafkaCluster>,
        reason: String,
    ) -> OperatorResult<ReconcileAction> {
        let name = cluster.name_any();
        tracing::warn!(name = %name, error = %reason, "KafkaCluster spec is invalid");

        let status = KafkaClusterStatus {
            phase: ClusterPhase::Failed,
            configured_brokers: 0,
            broker_errors: Vec::new(),
            observed_generation: cluster.metadata.generation,
            last_updated: None,
            message: Some(format!("Invalid spec: {}", reason)),
        };
        self.update_status_if_changed(cluster, api, status).await?;

        Ok(ReconcileAction::Done)
    }

    /// Create or server-side apply a namespaced object.
    async fn ensure_resource<K>(&self, namespace: &str, resource: &K) -> OperatorResult<()>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + Debug
            + Serialize
            + DeserializeOwned,
    {
        let kind = K::kind(&());
        let name = resource.meta().name.clone().unwrap_or_default();
        let api: Api<K> = Api::namespaced(self.ctx.client.clone(), namespace);

        match api.get(&name).await {
            Ok(_existing) => {
                tracing::debug!(kind = %kind, name = %name, "Applying existing object");
                api.patch(
                    &name,
                    &PatchParams::apply(&self.ctx.config.field_manager).force(),
                    &Patch::Apply(resource),
                )
                .await?;
            }
            Err(kube::Error::Api(err)) if err.code == 404 => {
                tracing::info!(kind = %kind, name = %name, "Creating object");
                api.create(&PostParams::default(), resource).await?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Delete cluster objects labelled with a broker id that is no longer declared.
    async fn prune_removed_brokers<K>(
        &self,
        cluster_name: &str,
        namespace: &str,
        declared: &HashSet<u32>,
    ) -> OperatorResult<()>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + Debug
            + DeserializeOwned,
    {
        let api: Api<K> = Api::namespaced(self.ctx.client.clone(), namespace);
        let selector = resources::cluster_selector(cluster_name);
        let objects = api.list(&ListParams::default().labels(&selector)).await?;

        for obj in objects.items {
            let Some(broker_id) = resources::broker_id_of(&obj) else {
                continue;
            };
            if declared.contains(&broker_id) {
                continue;
            }

            let obj_name = obj.name_any();
            tracing::info!(
                kind = %K::kind(&()),
                name = %obj_name,
                broker = broker_id,
                "Deleting object of removed broker"
            );
            match api.delete(&obj_name, &DeleteParams::default()).await {
                Ok(_) => {}
                Err(kube::Error::Api(err)) if err.code == 404 => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Patch the status unless it already says the same thing.
    async fn update_status_if_changed(
        &self,
        cluster: &KafkaCluster,
        api: &Api<KafkaCluster>,
        mut status: KafkaClusterStatus,
    ) -> OperatorResult<()> {
        if !status_changed(cluster.status.as_ref(), &status) {
            tracing::debug!(name = %cluster.name_any(), "Status unchanged");
            return Ok(());
        }

        status.last_updated = Some(chrono::Utc::now().to_rfc3339());
        let patch = serde_json::json!({
            "status": status
        });

        api.patch_status(
            &cluster.name_any(),
            &PatchParams::default(),
            &Patch::Merge(&patch),
        )
        .await?;

        Ok(())
    }
}

/// Status after a pass that resolved `configured` brokers.
fn reconciled_status(
    configured: usize,
    failures: &[ResolutionError],
    generation: Option<i64>,
) -> KafkaClusterStatus {
    let broker_errors: Vec<BrokerErrorStatus> = failures
        .iter()
        .map(|err| BrokerErrorStatus {
            broker_id: err.broker(),
            message: err.to_string(),
        })
        .collect();

    let (phase, message) = if broker_errors.is_empty() {
        (
            ClusterPhase::Running,
            format!("{} brokers configured", configured),
        )
    } else {
        (
            ClusterPhase::Degraded,
            format!(
                "{} brokers configured, {} could not be resolved",
                configured,
                broker_errors.len()
            ),
        )
    };

    KafkaClusterStatus {
        phase,
        configured_brokers: i32::try_from(configured).unwrap_or(i32::MAX),
        broker_errors,
        observed_generation: generation,
        last_updated: None,
        message: Some(message),
    }
}

/// Whether `desired` differs from `current` in anything but the timestamp.
fn status_changed(current: Option<&KafkaClusterStatus>, desired: &KafkaClusterStatus) -> bool {
    let Some(current) = current else {
        return true;
    };
    current.phase != desired.phase
        || current.configured_brokers != desired.configured_brokers
        || current.broker_errors != desired.broker_errors
        || current.observed_generation != desired.observed_generation
        || current.message != desired.message
}

/// Handle errors during reconciliation.
pub fn error_policy(
    cluster: Arc<KafkaCluster>,
    error: &OperatorError,
    ctx: Arc<ControllerContext>,
) -> Action {
    tracing::error!(name = %cluster.name_any(), error = %error, "Reconciliation error");
    Action::requeue(ctx.config.error_requeue())
}
