//! Rendering of the per-broker listener properties.

use super::resolver::resolve_all_advertised;
use super::topology::ClusterTopology;
use super::types::BrokerIdentity;
use crate::error::ResolutionError;
use crate::properties::PropertiesDocument;

/// Bind-side listener list.
pub const LISTENERS: &str = "listeners";

/// Advertised listener list.
pub const ADVERTISED_LISTENERS: &str = "advertised.listeners";

/// Listener name to security protocol map.
pub const LISTENER_SECURITY_PROTOCOL_MAP: &str = "listener.security.protocol.map";

/// Properties owned by the listener engine.
pub const LISTENER_PROPERTY_KEYS: [&str; 3] = [
    LISTENERS,
    ADVERTISED_LISTENERS,
    LISTENER_SECURITY_PROTOCOL_MAP,
];

/// Render the listener properties of `broker`.
///
/// The document holds exactly [`LISTENER_PROPERTY_KEYS`], each listing the
/// catalog's listeners in declaration order. Fails without a partial
/// document when any listener cannot be resolved.
pub fn assemble(
    topology: &ClusterTopology,
    broker: &BrokerIdentity,
) -> Result<PropertiesDocument, ResolutionError> {
    let resolved = resolve_all_advertised(topology, broker)?;

    let listeners = resolved
        .iter()
        .map(|(l, _)| format!("{}://:{}", l.protocol_name(), l.container_port))
        .collect::<Vec<_>>()
        .join(",");

    let advertised = resolved
        .iter()
        .map(|(l, addr)| format!("{}://{}", l.protocol_name(), addr))
        .collect::<Vec<_>>()
        .join(",");

    let protocol_map = resolved
        .iter()
        .map(|(l, _)| format!("{}:{}", l.protocol_name(), l.security))
        .collect::<Vec<_>>()
        .join(",");

    let mut doc = PropertiesDocument::new();
    doc.insert(LISTENERS, listeners);
    doc.insert(ADVERTISED_LISTENERS, advertised);
    doc.insert(LISTENER_SECURITY_PROTOCOL_MAP, protocol_map);
    Ok(doc)
}

/// Render every broker of the topology independently, in broker order.
pub fn assemble_all(
    topology: &ClusterTopology,
) -> Vec<(u32, Result<PropertiesDocument, ResolutionError>)> {
    topology
        .brokers()
        .iter()
        .map(|broker| (broker.id, assemble(topology, broker)))
        .collect()
}
