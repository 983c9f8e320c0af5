//! Integration tests for broker listener resolution.

use std::collections::HashSet;

use kafka_operator::ValidationError;
use kafka_operator::crd::{KafkaCluster, KafkaClusterSpec};
use kafka_operator::listeners::{
    ADVERTISED_LISTENERS, BrokerIdentity, ClusterTopology, ExternalAccess, HostPort,
    LISTENER_SECURITY_PROTOCOL_MAP, LISTENERS, ListenerCatalog, ListenerSpec, ServicePortSpec,
    assemble, assemble_all, derive_ports, resolve_advertised_address,
};
use kafka_operator::properties::PropertiesDocument;
use kafka_operator::resources;

fn multi_zone_external() -> ListenerSpec {
    ListenerSpec::external(
        "external",
        9094,
        ExternalAccess::new()
            .zone_host("az1", "external.az1.host.com")
            .zone_host("az2", "external.az2.host.com")
            .starting_port(19090),
    )
}

#[test]
fn multi_zone_external_ports_follow_broker_id() {
    let topology = ClusterTopology::builder()
        .namespace("kafka")
        .cluster_name("kafkacluster")
        .listener(multi_zone_external())
        .broker(BrokerIdentity::new(0).in_zone("az1"))
        .broker(BrokerIdentity::new(1).in_zone("az2"))
        .broker(BrokerIdentity::new(2).in_zone("az2"))
        .build()
        .expect("valid topology");
    let listener = &topology.catalog().listeners()[0];

    let resolved: Vec<HostPort> = topology
        .brokers()
        .iter()
        .map(|b| resolve_advertised_address(&topology, b, listener).unwrap())
        .collect();

    assert_eq!(
        resolved,
        vec![
            HostPort::new("external.az1.host.com", 19090),
            HostPort::new("external.az2.host.com", 19091),
            HostPort::new("external.az2.host.com", 19092),
        ]
    );
}

#[test]
fn explicit_override_advertises_container_port_over_tls() {
    let topology = ClusterTopology::builder()
        .namespace("kafka")
        .cluster_name("kafkacluster")
        .listener(
            ListenerSpec::external(
                "test",
                29092,
                ExternalAccess::new()
                    .zone_host("az1", "external.az1.host.com")
                    .starting_port(19090),
            )
            .with_tls(true),
        )
        .broker(BrokerIdentity::new(1).in_zone("az1").with_advertised_host("broker-1"))
        .build()
        .expect("valid topology");

    let doc = assemble(&topology, &topology.brokers()[0]).unwrap();

    assert_eq!(doc.get(ADVERTISED_LISTENERS), Some("TEST://broker-1:29092"));
    assert_eq!(doc.get(LISTENER_SECURITY_PROTOCOL_MAP), Some("TEST:SSL"));
}

fn three_listener_catalog() -> Vec<ListenerSpec> {
    vec![
        ListenerSpec::internal("internal", 29092),
        ListenerSpec::controller("controller", 29093),
        ListenerSpec::external(
            "test",
            9094,
            ExternalAccess::new()
                .zone_host("az1", "external.az1.host.com")
                .starting_port(19090),
        ),
    ]
}

#[test]
fn bind_list_is_independent_of_advertised_resolution() {
    let mut builder = ClusterTopology::builder()
        .namespace("kafka")
        .cluster_name("kafkacluster")
        .broker(BrokerIdentity::new(0).in_zone("az1"))
        .broker(BrokerIdentity::new(5).in_zone("az1").with_advertised_host("b5.example.com"));
    for listener in three_listener_catalog() {
        builder = builder.listener(listener);
    }
    let topology = builder.build().expect("valid topology");

    for broker in topology.brokers() {
        let doc = assemble(&topology, broker).unwrap();
        assert_eq!(
            doc.get(LISTENERS),
            Some("INTERNAL://:29092,CONTROLLER://:29093,TEST://:9094")
        );
    }

    let doc = assemble(&topology, &topology.brokers()[1]).unwrap();
    assert_eq!(
        doc.get(ADVERTISED_LISTENERS),
        Some(
            "INTERNAL://kafkacluster-5.kafkacluster-headless.kafka.svc.cluster.local:29092,\
             CONTROLLER://kafkacluster-5.kafkacluster-headless.kafka.svc.cluster.local:29093,\
             TEST://b5.example.com:9094"
        )
    );
}

#[test]
fn service_ports_cover_listeners_and_metrics() {
    let catalog = ListenerCatalog::build(three_listener_catalog(), 9020).expect("valid catalog");

    let ports: HashSet<ServicePortSpec> = derive_ports(&catalog).into_iter().collect();
    let expected: HashSet<ServicePortSpec> = [
        ServicePortSpec::tcp("tcp-internal", 29092),
        ServicePortSpec::tcp("tcp-controller", 29093),
        ServicePortSpec::tcp("tcp-test", 9094),
        ServicePortSpec::tcp("metrics", 9020),
    ]
    .into_iter()
    .collect();

    assert_eq!(ports, expected);
}

#[test]
fn duplicate_listener_name_produces_no_catalog() {
    let result = ListenerCatalog::build(
        vec![
            ListenerSpec::internal("internal", 29092),
            ListenerSpec::controller("internal", 29093),
        ],
        9020,
    );

    assert_eq!(
        result.unwrap_err(),
        ValidationError::DuplicateListenerName {
            name: "internal".to_string()
        }
    );
}

#[test]
fn unknown_zone_fails_only_that_broker() {
    let topology = ClusterTopology::builder()
        .namespace("kafka")
        .cluster_name("kafkacluster")
        .listener(ListenerSpec::internal("internal", 29092))
        .listener(multi_zone_external())
        .broker(BrokerIdentity::new(0).in_zone("az1"))
        .broker(BrokerIdentity::new(1).in_zone("az3"))
        .broker(BrokerIdentity::new(2).in_zone("az2"))
        .build()
        .expect("valid topology");

    let results = assemble_all(&topology);

    assert_eq!(results.len(), 3);
    assert!(results[0].1.is_ok());
    let err = results[1].1.as_ref().unwrap_err();
    assert_eq!(err.broker(), 1);
    assert!(err.to_string().contains("az3"));
    assert!(results[2].1.is_ok());
}

fn cluster_from_yaml(yaml: &str, name: &str, namespace: &str) -> KafkaCluster {
    let spec: KafkaClusterSpec = serde_yaml::from_str(yaml).expect("valid spec");
    let mut cluster = KafkaCluster::new(name, spec);
    cluster.metadata.namespace = Some(namespace.to_string());
    cluster.metadata.uid = Some("6b2f5a3c".to_string());
    cluster
}

#[test]
fn per_broker_service_addressing_from_resource() {
    let cluster = cluster_from_yaml(
        r#"
headlessServiceEnabled: false
listeners:
  - name: test
    role: external
    containerPort: 9094
    externalStartingPort: 19090
    zoneHostTemplates:
      az1: external.az1.host.com
      az2: external.az2.host.com
  - name: internal
    role: internal
    containerPort: 29092
  - name: controller
    role: controller
    containerPort: 29093
brokers:
  - id: 0
    zone: az1
  - id: 1
    zone: az2
  - id: 2
    zone: az2
"#,
        "kafkacluster-1",
        "kafka-1",
    );
    let topology = ClusterTopology::from_cluster(&cluster).expect("valid cluster");

    let doc = assemble(&topology, topology.broker(2).expect("broker 2")).unwrap();

    assert_eq!(
        doc.to_string(),
        "listeners=TEST://:9094,INTERNAL://:29092,CONTROLLER://:29093\n\
         advertised.listeners=TEST://external.az2.host.com:19092,\
         INTERNAL://kafkacluster-1-2.kafka-1.svc.cluster.local:29092,\
         CONTROLLER://kafkacluster-1-2.kafka-1.svc.cluster.local:29093\n\
         listener.security.protocol.map=TEST:PLAINTEXT,INTERNAL:PLAINTEXT,CONTROLLER:PLAINTEXT\n"
    );
}

#[test]
fn resource_to_broker_objects() {
    let cluster = cluster_from_yaml(
        r#"
metricsPort: 9020
listeners:
  - name: internal
    role: internal
    containerPort: 29092
  - name: external
    role: external
    containerPort: 9094
    tls: true
    externalStartingPort: 19090
    zoneHostTemplates:
      az1: "{clusterName}-{brokerId}.{zone}.example.com"
brokers:
  - id: 3
    zone: az1
readOnlyConfig: |
  auto.create.topics.enable=false
  listeners=PLAINTEXT://:9092
"#,
        "kc",
        "kafka",
    );
    let topology = ClusterTopology::from_cluster(&cluster).expect("valid cluster");
    let read_only = PropertiesDocument::parse(
        cluster.spec.read_only_config.as_deref().unwrap_or_default(),
    )
    .unwrap();

    let listener_props = assemble(&topology, &topology.brokers()[0]).unwrap();
    let (props, ignored) = resources::broker_properties(&listener_props, Some(&read_only));
    assert_eq!(ignored, vec!["listeners".to_string()]);

    let cm = resources::build_broker_configmap(&cluster, "kafka", 3, &props);
    let rendered = cm
        .data
        .as_ref()
        .and_then(|d| d.get(resources::BROKER_CONFIG_KEY))
        .expect("broker config");
    assert_eq!(
        rendered,
        "listeners=INTERNAL://:29092,EXTERNAL://:9094\n\
         advertised.listeners=INTERNAL://kc-3.kc-headless.kafka.svc.cluster.local:29092,\
         EXTERNAL://kc-3.az1.example.com:19093\n\
         listener.security.protocol.map=INTERNAL:PLAINTEXT,EXTERNAL:SSL\n\
         auto.create.topics.enable=false\n"
    );

    let svc = resources::build_broker_service(&cluster, "kafka", 3, &derive_ports(topology.catalog()));
    assert_eq!(svc.metadata.name.as_deref(), Some("kc-3"));
    let names: Vec<String> = svc
        .spec
        .and_then(|s| s.ports)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["tcp-internal", "tcp-external", "metrics"]);
}

#[test]
fn external_settings_on_internal_listener_are_rejected() {
    let cluster = cluster_from_yaml(
        r#"
listeners:
  - name: internal
    role: internal
    containerPort: 29092
    externalStartingPort: 19090
"#,
        "kc",
        "kafka",
    );

    let err = ClusterTopology::from_cluster(&cluster).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::UnexpectedExternalSettings { ref listener, .. } if listener == "internal"
    ));
}
