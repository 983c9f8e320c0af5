//! Listener configuration resolution.
//!
//! For every broker the engine computes which endpoints it binds, which
//! address it advertises for each listener and which security protocol each
//! listener uses. Everything here is a pure function of the
//! [`ClusterTopology`]: evaluating the same topology twice yields identical
//! output, which is what keeps the reconciler from restarting brokers over
//! spurious configuration differences.
//!
//! ```text
//! KafkaCluster -> ClusterTopology (ListenerCatalog)
//!              -> resolve_advertised_address / derive_ports
//!              -> assemble -> PropertiesDocument
//! ```
//!
//! # Example
//!
//! ```
//! use kafka_operator::listeners::{
//!     BrokerIdentity, ClusterTopology, ExternalAccess, ListenerSpec, assemble,
//! };
//!
//! let topology = ClusterTopology::builder()
//!     .namespace("kafka")
//!     .cluster_name("kc")
//!     .listener(ListenerSpec::internal("internal", 29092))
//!     .listener(ListenerSpec::external(
//!         "external",
//!         9094,
//!         ExternalAccess::new()
//!             .zone_host("az1", "external.az1.host.com")
//!             .starting_port(19090),
//!     ))
//!     .broker(BrokerIdentity::new(1).in_zone("az1"))
//!     .build()?;
//!
//! let doc = assemble(&topology, &topology.brokers()[0])?;
//! assert_eq!(
//!     doc.get("advertised.listeners"),
//!     Some("INTERNAL://kc-1.kc-headless.kafka.svc.cluster.local:29092,EXTERNAL://external.az1.host.com:19091")
//! );
//! # Ok::<(), kafka_operator::OperatorError>(())
//! ```

pub mod assembler;
pub mod catalog;
pub mod ports;
pub mod resolver;
mod template;
pub mod topology;
mod types;

pub use assembler::{
    ADVERTISED_LISTENERS, LISTENER_PROPERTY_KEYS, LISTENER_SECURITY_PROTOCOL_MAP, LISTENERS,
    assemble, assemble_all,
};
pub use catalog::{DEFAULT_METRICS_PORT, ListenerCatalog};
pub use ports::{METRICS_PORT_NAME, ServicePortSpec, derive_ports};
pub use resolver::{resolve_advertised_address, resolve_all_advertised};
pub use topology::{
    ClusterTopology, ClusterTopologyBuilder, DEFAULT_CLUSTER_DOMAIN,
    DEFAULT_HEADLESS_SERVICE_TEMPLATE,
};
pub use types::{
    BrokerIdentity, ExternalAccess, HostPort, ListenerRole, ListenerSpec, SecurityProtocol,
};
