//! Builders for the Kubernetes objects materialized per broker.
//!
//! Each broker gets a ConfigMap `<cluster>-config-<id>` holding its rendered
//! properties under [`BROKER_CONFIG_KEY`], and a Service `<cluster>-<id>`
//! exposing its listener and metrics ports. Both carry the labels returned by
//! [`broker_labels`] and a controller owner reference to the KafkaCluster.

use crate::crd::KafkaCluster;
use crate::listeners::{LISTENER_PROPERTY_KEYS, ServicePortSpec};
use crate::properties::PropertiesDocument;
use k8s_openapi::api::core::v1::{ConfigMap, Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;

/// Label naming the managed application.
pub const APP_LABEL_KEY: &str = "app";

/// Value of [`APP_LABEL_KEY`] on every broker object.
pub const APP_LABEL_VALUE: &str = "kafka";

/// Label naming the owning KafkaCluster.
pub const KAFKA_CR_LABEL_KEY: &str = "kafka_cr";

/// Label holding the broker id.
pub const BROKER_ID_LABEL_KEY: &str = "brokerId";

/// ConfigMap data key holding the broker properties.
pub const BROKER_CONFIG_KEY: &str = "broker-config";

/// Name of a broker's ConfigMap.
pub fn config_map_name(cluster_name: &str, broker_id: u32) -> String {
    format!("{}-config-{}", cluster_name, broker_id)
}

/// Name of a broker's Service.
pub fn service_name(cluster_name: &str, broker_id: u32) -> String {
    format!("{}-{}", cluster_name, broker_id)
}

/// Labels shared by every object of a cluster.
pub fn cluster_labels(cluster_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (APP_LABEL_KEY.to_string(), APP_LABEL_VALUE.to_string()),
        (KAFKA_CR_LABEL_KEY.to_string(), cluster_name.to_string()),
    ])
}

/// Labels of one broker's objects.
pub fn broker_labels(cluster_name: &str, broker_id: u32) -> BTreeMap<String, String> {
    let mut labels = cluster_labels(cluster_name);
    labels.insert(BROKER_ID_LABEL_KEY.to_string(), broker_id.to_string());
    labels
}

/// Label selector matching every object of a cluster.
pub fn cluster_selector(cluster_name: &str) -> String {
    cluster_labels(cluster_name)
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Broker id recorded in an object's labels.
pub fn broker_id_of<K: Resource>(resource: &K) -> Option<u32> {
    resource
        .meta()
        .labels
        .as_ref()
        .and_then(|labels| labels.get(BROKER_ID_LABEL_KEY))
        .and_then(|id| id.parse().ok())
}

/// Full broker configuration: the listener properties followed by the
/// cluster's read-only configuration.
///
/// Returns the merged document and the read-only keys that were dropped
/// because the listener engine owns them.
pub fn broker_properties(
    listener_properties: &PropertiesDocument,
    read_only: Option<&PropertiesDocument>,
) -> (PropertiesDocument, Vec<String>) {
    let mut merged = listener_properties.clone();
    let Some(read_only) = read_only else {
        return (merged, Vec::new());
    };

    let allowed: PropertiesDocument = read_only
        .iter()
        .filter(|(key, _)| !LISTENER_PROPERTY_KEYS.contains(key))
        .collect();
    let mut ignored: Vec<String> = read_only
        .keys()
        .filter(|key| LISTENER_PROPERTY_KEYS.contains(key))
        .map(str::to_string)
        .collect();

    ignored.extend(merged.merge_missing(&allowed));
    (merged, ignored)
}

fn broker_metadata(
    cluster: &KafkaCluster,
    namespace: &str,
    name: String,
    broker_id: u32,
) -> ObjectMeta {
    let cluster_name = cluster.name_any();
    ObjectMeta {
        name: Some(name),
        namespace: Some(namespace.to_string()),
        labels: Some(broker_labels(&cluster_name, broker_id)),
        owner_references: cluster.controller_owner_ref(&()).map(|owner| vec![owner]),
        ..Default::default()
    }
}

/// Build a broker's ConfigMap.
pub fn build_broker_configmap(
    cluster: &KafkaCluster,
    namespace: &str,
    broker_id: u32,
    properties: &PropertiesDocument,
) -> ConfigMap {
    let name = config_map_name(&cluster.name_any(), broker_id);
    ConfigMap {
        metadata: broker_metadata(cluster, namespace, name, broker_id),
        data: Some(BTreeMap::from([(
            BROKER_CONFIG_KEY.to_string(),
            properties.to_string(),
        )])),
        ..Default::default()
    }
}

/// Build a broker's Service.
pub fn build_broker_service(
    cluster: &KafkaCluster,
    namespace: &str,
    broker_id: u32,
    ports: &[ServicePortSpec],
) -> Service {
    let cluster_name = cluster.name_any();
    let name = service_name(&cluster_name, broker_id);
    Service {
        metadata: broker_metadata(cluster, namespace, name, broker_id),
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            selector: Some(broker_labels(&cluster_name, broker_id)),
            ports: Some(ports.iter().map(to_service_port).collect()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn to_service_port(port: &ServicePortSpec) -> ServicePort {
    ServicePort {
        name: Some(port.name.clone()),
        protocol: Some(port.protocol.clone()),
        port: i32::from(port.port),
        target_port: Some(IntOrString::Int(i32::from(port.target_port))),
        ..Default::default()
    }
}
