//! Validated cluster topology, the input of every resolution.

use super::catalog::{DEFAULT_METRICS_PORT, ListenerCatalog};
use super::template::{self, SERVICE_NAME_PLACEHOLDERS};
use super::types::{BrokerIdentity, ExternalAccess, ListenerRole, ListenerSpec};
use crate::crd::{KafkaCluster, ListenerDeclaration, ListenerRoleKind};
use crate::error::ValidationError;
use kube::ResourceExt;
use std::collections::HashSet;

/// Default Kubernetes cluster DNS domain.
pub const DEFAULT_CLUSTER_DOMAIN: &str = "cluster.local";

/// Default headless service name template.
pub const DEFAULT_HEADLESS_SERVICE_TEMPLATE: &str = "{clusterName}-headless";

/// Fully validated description of one cluster's brokers and listeners.
///
/// Rebuilt from the resource on every reconciliation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterTopology {
    namespace: String,
    cluster_name: String,
    headless_service: Option<String>,
    cluster_domain: String,
    brokers: Vec<BrokerIdentity>,
    catalog: ListenerCatalog,
}

impl ClusterTopology {
    /// Create a topology builder.
    pub fn builder() -> ClusterTopologyBuilder {
        ClusterTopologyBuilder::default()
    }

    /// Build the topology declared by a KafkaCluster resource.
    pub fn from_cluster(cluster: &KafkaCluster) -> Result<Self, ValidationError> {
        let name = cluster.name_any();
        let namespace = cluster
            .namespace()
            .ok_or_else(|| ValidationError::MissingNamespace {
                cluster: name.clone(),
            })?;
        let spec = &cluster.spec;

        let mut builder = Self::builder()
            .namespace(namespace)
            .cluster_name(name)
            .cluster_domain(spec.kubernetes_cluster_domain.clone())
            .metrics_port(spec.metrics_port);

        builder = if spec.headless_service_enabled {
            builder.headless_service(spec.headless_service_name.clone())
        } else {
            builder.without_headless_service()
        };

        for declaration in &spec.listeners {
            builder = builder.listener(listener_from_declaration(declaration)?);
        }

        for broker in &spec.brokers {
            let mut identity = BrokerIdentity::new(broker.id).in_zone(broker.zone.clone());
            if let Some(host) = broker
                .advertised_host_override
                .as_deref()
                .filter(|h| !h.trim().is_empty())
            {
                identity = identity.with_advertised_host(host);
            }
            builder = builder.broker(identity);
        }

        builder.build()
    }

    /// Namespace of the cluster.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Name of the cluster resource.
    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    /// Rendered headless service name, if brokers are addressed through one.
    pub fn headless_service(&self) -> Option<&str> {
        self.headless_service.as_deref()
    }

    /// Kubernetes cluster DNS domain.
    pub fn cluster_domain(&self) -> &str {
        &self.cluster_domain
    }

    /// Brokers in declaration order.
    pub fn brokers(&self) -> &[BrokerIdentity] {
        &self.brokers
    }

    /// Look up a broker by id.
    pub fn broker(&self, id: u32) -> Option<&BrokerIdentity> {
        self.brokers.iter().find(|b| b.id == id)
    }

    /// Validated listeners.
    pub fn catalog(&self) -> &ListenerCatalog {
        &self.catalog
    }

    /// In-cluster DNS name of a broker.
    ///
    /// `<cluster>-<id>.<headless>.<namespace>.svc.<domain>` with a headless
    /// service, `<cluster>-<id>.<namespace>.svc.<domain>` (the broker's own
    /// Service) without one.
    pub fn broker_host(&self, broker_id: u32) -> String {
        match &self.headless_service {
            Some(headless) => format!(
                "{}-{}.{}.{}.svc.{}",
                self.cluster_name, broker_id, headless, self.namespace, self.cluster_domain
            ),
            None => format!(
                "{}-{}.{}.svc.{}",
                self.cluster_name, broker_id, self.namespace, self.cluster_domain
            ),
        }
    }
}

fn listener_from_declaration(
    declaration: &ListenerDeclaration,
) -> Result<ListenerSpec, ValidationError> {
    let has_external_settings = declaration.external_starting_port.is_some()
        || !declaration.zone_host_templates.is_empty();

    let role = match declaration.role {
        ListenerRoleKind::Internal => ListenerRole::Internal,
        ListenerRoleKind::Controller => ListenerRole::Controller,
        ListenerRoleKind::External => ListenerRole::External(ExternalAccess {
            zone_hosts: declaration.zone_host_templates.clone(),
            starting_port: declaration.external_starting_port,
        }),
    };

    if has_external_settings && !matches!(role, ListenerRole::External(_)) {
        return Err(ValidationError::UnexpectedExternalSettings {
            listener: declaration.name.clone(),
            role: role.as_str().to_string(),
        });
    }

    Ok(ListenerSpec::new(declaration.name.clone(), declaration.container_port, role)
        .with_tls(declaration.tls))
}

/// Builder for [`ClusterTopology`].
#[derive(Debug)]
pub struct ClusterTopologyBuilder {
    namespace: String,
    cluster_name: String,
    headless_service: Option<String>,
    cluster_domain: String,
    metrics_port: u16,
    brokers: Vec<BrokerIdentity>,
    listeners: Vec<ListenerSpec>,
}

impl Default for ClusterTopologyBuilder {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            cluster_name: String::new(),
            headless_service: Some(DEFAULT_HEADLESS_SERVICE_TEMPLATE.to_string()),
            cluster_domain: DEFAULT_CLUSTER_DOMAIN.to_string(),
            metrics_port: DEFAULT_METRICS_PORT,
            brokers: Vec::new(),
            listeners: Vec::new(),
        }
    }
}

impl ClusterTopologyBuilder {
    /// Set the namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the cluster name.
    pub fn cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = name.into();
        self
    }

    /// Address brokers through a headless service named by `template`.
    pub fn headless_service(mut self, template: impl Into<String>) -> Self {
        self.headless_service = Some(template.into());
        self
    }

    /// Address brokers through their own Services.
    pub fn without_headless_service(mut self) -> Self {
        self.headless_service = None;
        self
    }

    /// Set the cluster DNS domain.
    pub fn cluster_domain(mut self, domain: impl Into<String>) -> Self {
        self.cluster_domain = domain.into();
        self
    }

    /// Set the metrics port.
    pub fn metrics_port(mut self, port: u16) -> Self {
        self.metrics_port = port;
        self
    }

    /// Add a broker.
    pub fn broker(mut self, broker: BrokerIdentity) -> Self {
        self.brokers.push(broker);
        self
    }

    /// Add a listener.
    pub fn listener(mut self, listener: ListenerSpec) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Validate and build the topology.
    pub fn build(self) -> Result<ClusterTopology, ValidationError> {
        if self.cluster_name.is_empty() {
            return Err(ValidationError::MissingClusterName);
        }
        if self.namespace.is_empty() {
            return Err(ValidationError::MissingNamespace {
                cluster: self.cluster_name,
            });
        }

        let headless_service = match self.headless_service {
            Some(tpl) => {
                template::validate(&tpl, SERVICE_NAME_PLACEHOLDERS).map_err(|reason| {
                    ValidationError::InvalidServiceTemplate {
                        template: tpl.clone(),
                        reason,
                    }
                })?;
                Some(template::render(
                    &tpl,
                    &[
                        ("clusterName", self.cluster_name.as_str()),
                        ("namespace", self.namespace.as_str()),
                    ],
                ))
            }
            None => None,
        };

        let mut ids = HashSet::new();
        for broker in &self.brokers {
            if !ids.insert(broker.id) {
                return Err(ValidationError::DuplicateBrokerId { id: broker.id });
            }
            if broker
                .advertised_host_override
                .as_deref()
                .is_some_and(|host| host.trim().is_empty())
            {
                return Err(ValidationError::BlankAdvertisedHost { broker: broker.id });
            }
        }

        let catalog = ListenerCatalog::build(self.listeners, self.metrics_port)?;

        Ok(ClusterTopology {
            namespace: self.namespace,
            cluster_name: self.cluster_name,
            headless_service,
            cluster_domain: self.cluster_domain,
            brokers: self.brokers,
            catalog,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{BrokerDeclaration, KafkaClusterSpec};
    use crate::listeners::types::SecurityProtocol;

    fn cluster(spec: serde_json::Value) -> KafkaCluster {
        let spec: KafkaClusterSpec = serde_json::from_value(spec).expect("valid spec");
        let mut cluster = KafkaCluster::new("kafkacluster-1", spec);
        cluster.metadata.namespace = Some("kafka-1".to_string());
        cluster
    }

    #[test]
    fn broker_host_through_headless_service() {
        let topology = ClusterTopology::builder()
            .namespace("kafka")
            .cluster_name("kafkacluster")
            .build()
            .unwrap();

        assert_eq!(topology.headless_service(), Some("kafkacluster-headless"));
        assert_eq!(
            topology.broker_host(2),
            "kafkacluster-2.kafkacluster-headless.kafka.svc.cluster.local"
        );
    }

    #[test]
    fn broker_host_through_broker_service() {
        let topology = ClusterTopology::builder()
            .namespace("kafka-1")
            .cluster_name("kafkacluster-1")
            .without_headless_service()
            .build()
            .unwrap();

        assert_eq!(
            topology.broker_host(0),
            "kafkacluster-1-0.kafka-1.svc.cluster.local"
        );
    }

    #[test]
    fn duplicate_broker_id_is_rejected() {
        let err = ClusterTopology::builder()
            .namespace("kafka")
            .cluster_name("kc")
            .broker(BrokerIdentity::new(1))
            .broker(BrokerIdentity::new(1).in_zone("az2"))
            .build()
            .unwrap_err();

        assert_eq!(err, ValidationError::DuplicateBrokerId { id: 1 });
    }

    #[test]
    fn blank_advertised_host_is_rejected() {
        let err = ClusterTopology::builder()
            .namespace("kafka")
            .cluster_name("kafkacluster")
            .listener(ListenerSpec::external("test", 9094, ExternalAccess::new()))
            .broker(BrokerIdentity::new(0).with_advertised_host(" "))
            .build()
            .unwrap_err();

        assert_eq!(err, ValidationError::BlankAdvertisedHost { broker: 0 });
    }

    #[test]
    fn blank_override_in_resource_falls_back_to_zone_template() {
        let cluster = cluster(serde_json::json!({
            "listeners": [{
                "name": "test",
                "role": "external",
                "containerPort": 9094,
                "zoneHostTemplates": {"az1": "external.az1.host.com"}
            }],
            "brokers": [{"id": 0, "zone": "az1", "advertisedHostOverride": ""}]
        }));

        let topology = ClusterTopology::from_cluster(&cluster).expect("valid topology");
        assert_eq!(topology.brokers()[0].advertised_host_override, None);
    }

    #[test]
    fn missing_names_are_rejected() {
        assert_eq!(
            ClusterTopology::builder().namespace("kafka").build(),
            Err(ValidationError::MissingClusterName)
        );
        assert!(matches!(
            ClusterTopology::builder().cluster_name("kc").build(),
            Err(ValidationError::MissingNamespace { .. })
        ));
    }

    #[test]
    fn invalid_headless_template_is_rejected() {
        let err = ClusterTopology::builder()
            .namespace("kafka")
            .cluster_name("kc")
            .headless_service("{brokerId}-headless")
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidServiceTemplate { .. }));
    }

    #[test]
    fn from_cluster_reads_listeners_and_brokers() {
        let cluster = cluster(serde_json::json!({
            "headlessServiceEnabled": false,
            "listeners": [
                {"name": "test", "role": "external", "containerPort": 9094, "tls": true,
                 "externalStartingPort": 19090,
                 "zoneHostTemplates": {"az1": "external.az1.host.com"}},
                {"name": "internal", "role": "internal", "containerPort": 29092},
                {"name": "controller", "role": "controller", "containerPort": 29093}
            ],
            "brokers": [
                {"id": 0, "zone": "az1"},
                {"id": 1, "zone": "az1", "advertisedHostOverride": "broker-1"},
                {"id": 2, "advertisedHostOverride": "  "}
            ]
        }));

        let topology = ClusterTopology::from_cluster(&cluster).expect("valid topology");

        assert_eq!(topology.namespace(), "kafka-1");
        assert_eq!(topology.cluster_name(), "kafkacluster-1");
        assert_eq!(topology.headless_service(), None);
        assert_eq!(topology.catalog().len(), 3);

        let test = topology.catalog().get("TEST").expect("test listener");
        assert_eq!(test.security, SecurityProtocol::Ssl);
        assert!(matches!(
            &test.role,
            ListenerRole::External(access) if access.starting_port == Some(19090)
        ));

        assert_eq!(topology.brokers().len(), 3);
        assert_eq!(
            topology.broker(1).and_then(|b| b.advertised_host_override.as_deref()),
            Some("broker-1")
        );
        assert_eq!(topology.broker(2).and_then(|b| b.advertised_host_override.clone()), None);
    }

    #[test]
    fn from_cluster_requires_namespace() {
        let spec = KafkaClusterSpec {
            headless_service_enabled: true,
            headless_service_name: DEFAULT_HEADLESS_SERVICE_TEMPLATE.to_string(),
            kubernetes_cluster_domain: DEFAULT_CLUSTER_DOMAIN.to_string(),
            metrics_port: 9020,
            listeners: vec![],
            brokers: vec![BrokerDeclaration {
                id: 0,
                zone: String::new(),
                advertised_host_override: None,
            }],
            read_only_config: None,
        };
        let cluster = KafkaCluster::new("kc", spec);

        assert_eq!(
            ClusterTopology::from_cluster(&cluster),
            Err(ValidationError::MissingNamespace {
                cluster: "kc".to_string()
            })
        );
    }

    #[test]
    fn external_settings_on_internal_listener_are_rejected() {
        let cluster = cluster(serde_json::json!({
            "listeners": [
                {"name": "internal", "role": "internal", "containerPort": 29092,
                 "externalStartingPort": 19090}
            ]
        }));

        assert_eq!(
            ClusterTopology::from_cluster(&cluster),
            Err(ValidationError::UnexpectedExternalSettings {
                listener: "internal".to_string(),
                role: "internal".to_string(),
            })
        );
    }
}
