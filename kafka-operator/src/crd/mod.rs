//! Custom Resource Definitions for the Kafka cluster operator.
//!
//! - [`KafkaCluster`]: a broker fleet and its listeners

mod cluster;

pub use cluster::{
    BrokerDeclaration, BrokerErrorStatus, ClusterPhase, KafkaCluster, KafkaClusterSpec,
    KafkaClusterStatus, ListenerDeclaration, ListenerRoleKind,
};
