//! Advertised address resolution.
//!
//! Internal and controller listeners are advertised on the broker's in-cluster
//! DNS name. External listeners are advertised either on the broker's explicit
//! host override (with the declared container port) or on the host template of
//! the broker's zone, with a port taken from the listener's sequential
//! per-broker allocation.
//!
//! Resolution never falls back to another zone's template: a broker whose
//! zone has no entry fails with [`ResolutionError::UnresolvedZone`].

use super::template;
use super::topology::ClusterTopology;
use super::types::{BrokerIdentity, ExternalAccess, HostPort, ListenerRole, ListenerSpec};
use crate::error::ResolutionError;

/// Resolve the address `broker` advertises for `listener`.
pub fn resolve_advertised_address(
    topology: &ClusterTopology,
    broker: &BrokerIdentity,
    listener: &ListenerSpec,
) -> Result<HostPort, ResolutionError> {
    match &listener.role {
        ListenerRole::Internal | ListenerRole::Controller => Ok(HostPort::new(
            topology.broker_host(broker.id),
            listener.container_port,
        )),
        ListenerRole::External(access) => resolve_external(topology, broker, listener, access),
    }
}

/// Resolve every listener of the topology for `broker`, in catalog order.
///
/// Stops at the first listener that cannot be resolved.
pub fn resolve_all_advertised<'a>(
    topology: &'a ClusterTopology,
    broker: &BrokerIdentity,
) -> Result<Vec<(&'a ListenerSpec, HostPort)>, ResolutionError> {
    topology
        .catalog()
        .iter()
        .map(|listener| {
            resolve_advertised_address(topology, broker, listener).map(|addr| (listener, addr))
        })
        .collect()
}

fn resolve_external(
    topology: &ClusterTopology,
    broker: &BrokerIdentity,
    listener: &ListenerSpec,
    access: &ExternalAccess,
) -> Result<HostPort, ResolutionError> {
    if let Some(host) = &broker.advertised_host_override {
        return Ok(HostPort::new(host.clone(), listener.container_port));
    }

    let host_template =
        access
            .zone_hosts
            .get(&broker.zone)
            .ok_or_else(|| ResolutionError::UnresolvedZone {
                listener: listener.name.clone(),
                broker: broker.id,
                zone: broker.zone.clone(),
            })?;

    let broker_id = broker.id.to_string();
    let host = template::render(
        host_template,
        &[
            ("zone", broker.zone.as_str()),
            ("brokerId", broker_id.as_str()),
            ("clusterName", topology.cluster_name()),
            ("namespace", topology.namespace()),
        ],
    );

    let port = match access.starting_port {
        Some(starting_port) => sequential_port(starting_port, broker.id).ok_or_else(|| {
            ResolutionError::PortOutOfRange {
                listener: listener.name.clone(),
                broker: broker.id,
                starting_port,
            }
        })?,
        None => listener.container_port,
    };

    Ok(HostPort::new(host, port))
}

/// `starting_port + broker_id`, if it is a valid TCP port.
fn sequential_port(starting_port: u16, broker_id: u32) -> Option<u16> {
    u32::from(starting_port)
        .checked_add(broker_id)
        .and_then(|port| u16::try_from(port).ok())
}
