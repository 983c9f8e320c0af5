//! Listener and broker types shared by the resolution engine.

use std::collections::BTreeMap;
use std::fmt;

/// Transport security of a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityProtocol {
    /// Unencrypted TCP.
    Plaintext,
    /// TLS-encrypted TCP.
    Ssl,
}

impl SecurityProtocol {
    /// Map a declared TLS flag to a protocol.
    pub fn from_tls(tls: bool) -> Self {
        if tls { Self::Ssl } else { Self::Plaintext }
    }

    /// Kafka protocol name as used in `listener.security.protocol.map`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plaintext => "PLAINTEXT",
            Self::Ssl => "SSL",
        }
    }
}

impl fmt::Display for SecurityProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an external listener is reached from outside the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalAccess {
    /// Zone id to host template. A template without placeholders is a literal hostname.
    pub zone_hosts: BTreeMap<String, String>,
    /// First port of the sequential per-broker allocation (`starting_port + broker id`).
    pub starting_port: Option<u16>,
}

impl ExternalAccess {
    /// Create external access with no zones and no port allocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a host template for a zone.
    pub fn zone_host(mut self, zone: impl Into<String>, template: impl Into<String>) -> Self {
        self.zone_hosts.insert(zone.into(), template.into());
        self
    }

    /// Set the starting port for per-broker allocation.
    pub fn starting_port(mut self, port: u16) -> Self {
        self.starting_port = Some(port);
        self
    }

    /// Whether advertised addresses come from zone templates.
    ///
    /// A listener without templates and without port allocation can only be
    /// resolved through per-broker host overrides.
    pub fn is_zone_templated(&self) -> bool {
        self.starting_port.is_some() || !self.zone_hosts.is_empty()
    }
}

/// Network context a listener serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerRole {
    /// Cluster-local client and inter-broker traffic.
    Internal,
    /// Controller-to-controller coordination.
    Controller,
    /// Reachable from outside the cluster.
    External(ExternalAccess),
}

impl ListenerRole {
    /// Short role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::Controller => "controller",
            Self::External(_) => "external",
        }
    }
}

/// A declared listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerSpec {
    /// Listener name as declared.
    pub name: String,
    /// Port the broker binds inside its pod.
    pub container_port: u16,
    /// Network context.
    pub role: ListenerRole,
    /// Transport security.
    pub security: SecurityProtocol,
}

impl ListenerSpec {
    /// Create a plaintext listener.
    pub fn new(name: impl Into<String>, container_port: u16, role: ListenerRole) -> Self {
        Self {
            name: name.into(),
            container_port,
            role,
            security: SecurityProtocol::Plaintext,
        }
    }

    /// Create a plaintext internal listener.
    pub fn internal(name: impl Into<String>, container_port: u16) -> Self {
        Self::new(name, container_port, ListenerRole::Internal)
    }

    /// Create a plaintext controller listener.
    pub fn controller(name: impl Into<String>, container_port: u16) -> Self {
        Self::new(name, container_port, ListenerRole::Controller)
    }

    /// Create a plaintext external listener.
    pub fn external(name: impl Into<String>, container_port: u16, access: ExternalAccess) -> Self {
        Self::new(name, container_port, ListenerRole::External(access))
    }

    /// Set the TLS flag.
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.security = SecurityProtocol::from_tls(tls);
        self
    }

    /// Name as it appears in broker properties (upper-cased).
    pub fn protocol_name(&self) -> String {
        self.name.to_ascii_uppercase()
    }

    /// Service port name (`tcp-<lower-cased name>`).
    pub fn port_name(&self) -> String {
        format!("tcp-{}", self.name.to_ascii_lowercase())
    }
}

/// Identity of one broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerIdentity {
    /// Broker id, unique within the cluster.
    pub id: u32,
    /// Availability zone or rack label. Empty when unset.
    pub zone: String,
    /// Host advertised on external listeners instead of the zone template.
    pub advertised_host_override: Option<String>,
}

impl BrokerIdentity {
    /// Create a broker with no zone and no override.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            zone: String::new(),
            advertised_host_override: None,
        }
    }

    /// Set the zone.
    pub fn in_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = zone.into();
        self
    }

    /// Set the advertised host override.
    pub fn with_advertised_host(mut self, host: impl Into<String>) -> Self {
        self.advertised_host_override = Some(host.into());
        self
    }
}

/// A resolved advertised address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostPort {
    /// Hostname.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl HostPort {
    /// Create a host:port pair.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
