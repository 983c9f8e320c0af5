//! KafkaCluster Custom Resource Definition.
//!
//! Declares a Kafka-compatible broker fleet: its listeners and its brokers.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// KafkaCluster is the Schema for the kafkaclusters API.
///
/// The operator resolves the listener configuration of every declared broker
/// and materializes one ConfigMap (`<name>-config-<id>`) and one Service
/// (`<name>-<id>`) per broker.
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "kafka.operator.io",
    version = "v1beta1",
    kind = "KafkaCluster",
    plural = "kafkaclusters",
    shortname = "kc",
    namespaced,
    status = "KafkaClusterStatus",
    printcolumn = r#"{"name":"Brokers", "type":"integer", "jsonPath":".status.configuredBrokers"}"#,
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct KafkaClusterSpec {
    /// Address internal and controller listeners through a headless service.
    /// When disabled, each broker is addressed through its own Service.
    #[serde(default = "default_true")]
    pub headless_service_enabled: bool,

    /// Headless service name template. Supports `{clusterName}` and `{namespace}`.
    #[serde(default = "default_headless_service_name")]
    pub headless_service_name: String,

    /// Kubernetes cluster DNS domain.
    #[serde(default = "default_cluster_domain")]
    pub kubernetes_cluster_domain: String,

    /// Port of the broker metrics endpoint.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Listener declarations. Their order is the rendering order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listeners: Vec<ListenerDeclaration>,

    /// Brokers of the cluster.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub brokers: Vec<BrokerDeclaration>,

    /// Extra broker properties appended to every broker configuration.
    /// Listener properties are owned by the operator and ignored here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only_config: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_headless_service_name() -> String {
    "{clusterName}-headless".to_string()
}

fn default_cluster_domain() -> String {
    "cluster.local".to_string()
}

fn default_metrics_port() -> u16 {
    9020
}

/// Role of a declared listener.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListenerRoleKind {
    /// Cluster-local traffic.
    Internal,
    /// Controller-to-controller traffic.
    Controller,
    /// Traffic from outside the cluster.
    External,
}

/// A listener declaration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListenerDeclaration {
    /// Listener name, unique within the cluster.
    pub name: String,

    /// Listener role.
    pub role: ListenerRoleKind,

    /// Port the broker binds.
    pub container_port: u16,

    /// Serve the listener over TLS.
    #[serde(default)]
    pub tls: bool,

    /// First port of the per-broker external port allocation (external only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_starting_port: Option<u16>,

    /// Zone to advertised host template (external only).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub zone_host_templates: BTreeMap<String, String>,
}

/// A broker declaration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrokerDeclaration {
    /// Broker id, unique within the cluster.
    pub id: u32,

    /// Availability zone or rack label.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub zone: String,

    /// Host advertised on external listeners instead of the zone template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertised_host_override: Option<String>,
}

/// KafkaCluster status.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KafkaClusterStatus {
    /// Current phase of the cluster.
    #[serde(default)]
    pub phase: ClusterPhase,

    /// Number of brokers whose configuration was applied in the last pass.
    #[serde(default)]
    pub configured_brokers: i32,

    /// Brokers whose listener configuration could not be resolved.
    /// Always serialized so that a merge patch clears resolved errors.
    #[serde(default)]
    pub broker_errors: Vec<BrokerErrorStatus>,

    /// Generation of the spec the status reflects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Last time the status was updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    /// Human-readable message about current state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Cluster phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub enum ClusterPhase {
    /// Not reconciled yet.
    #[default]
    Pending,
    /// Every broker configuration is applied.
    Running,
    /// Some brokers could not be configured.
    Degraded,
    /// The spec is invalid.
    Failed,
}

/// Resolution failure of one broker.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrokerErrorStatus {
    /// Broker id.
    pub broker_id: u32,
    /// Error message.
    pub message: String,
}
