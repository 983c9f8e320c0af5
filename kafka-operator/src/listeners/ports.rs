//! Service ports exposed for each broker.

use super::catalog::ListenerCatalog;

/// Name of the metrics service port.
pub const METRICS_PORT_NAME: &str = "metrics";

/// Transport protocol of every broker port.
pub const TCP: &str = "TCP";

/// One port of a broker Service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServicePortSpec {
    /// Port name.
    pub name: String,
    /// Transport protocol.
    pub protocol: String,
    /// Service port.
    pub port: u16,
    /// Container port traffic is forwarded to.
    pub target_port: u16,
}

impl ServicePortSpec {
    /// A TCP port forwarding to the same container port.
    pub fn tcp(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            protocol: TCP.to_string(),
            port,
            target_port: port,
        }
    }
}

/// Ports of a broker Service: one per listener (`tcp-<name>`) plus `metrics`.
///
/// Listener ports come first in catalog order. Consumers should treat the
/// result as a set.
pub fn derive_ports(catalog: &ListenerCatalog) -> Vec<ServicePortSpec> {
    catalog
        .iter()
        .map(|listener| ServicePortSpec::tcp(listener.port_name(), listener.container_port))
        .chain(std::iter::once(ServicePortSpec::tcp(
            METRICS_PORT_NAME,
            catalog.metrics_port(),
        )))
        .collect()
}
