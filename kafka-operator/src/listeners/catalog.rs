//! Validated set of listener declarations.
//!
//! The catalog is the single source of listener order: every rendered list
//! (bind listeners, advertised listeners, security protocol map, service
//! ports) enumerates listeners in the order they were declared.

use super::template::{self, ZONE_HOST_PLACEHOLDERS};
use super::types::{ListenerRole, ListenerSpec};
use crate::error::ValidationError;
use std::collections::{HashMap, HashSet};

/// Port of the broker metrics endpoint unless the cluster overrides it.
pub const DEFAULT_METRICS_PORT: u16 = 9020;

/// Owner name reported when the metrics port collides with a listener.
const METRICS_OWNER: &str = "metrics";

/// Validated listeners in declaration order plus the metrics port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerCatalog {
    listeners: Vec<ListenerSpec>,
    metrics_port: u16,
}

impl ListenerCatalog {
    /// Validate listener declarations.
    ///
    /// Fails on the first declaration that breaks an invariant; no catalog is
    /// produced in that case.
    pub fn build(
        listeners: impl IntoIterator<Item = ListenerSpec>,
        metrics_port: u16,
    ) -> Result<Self, ValidationError> {
        let listeners: Vec<ListenerSpec> = listeners.into_iter().collect();

        let mut names: HashSet<String> = HashSet::new();
        let mut ports: HashMap<u16, &str> = HashMap::new();

        for listener in &listeners {
            if !template::is_valid_listener_name(&listener.name) {
                return Err(ValidationError::InvalidListenerName {
                    name: listener.name.clone(),
                });
            }

            if !names.insert(listener.name.to_ascii_lowercase()) {
                return Err(ValidationError::DuplicateListenerName {
                    name: listener.name.clone(),
                });
            }

            if listener.container_port == 0 {
                return Err(ValidationError::InvalidPort {
                    listener: listener.name.clone(),
                });
            }

            if let Some(first) = ports.insert(listener.container_port, &listener.name) {
                return Err(ValidationError::DuplicatePort {
                    port: listener.container_port,
                    first: first.to_string(),
                    second: listener.name.clone(),
                });
            }

            if let ListenerRole::External(access) = &listener.role {
                if access.is_zone_templated() && access.zone_hosts.is_empty() {
                    return Err(ValidationError::MissingZoneTemplate {
                        listener: listener.name.clone(),
                    });
                }

                for (zone, host) in &access.zone_hosts {
                    let invalid = |reason: String| ValidationError::InvalidHostTemplate {
                        listener: listener.name.clone(),
                        zone: zone.clone(),
                        reason,
                    };
                    if zone.is_empty() {
                        return Err(invalid("zone name is empty".to_string()));
                    }
                    template::validate(host, ZONE_HOST_PLACEHOLDERS).map_err(invalid)?;
                }
            }
        }

        if metrics_port == 0 {
            return Err(ValidationError::InvalidPort {
                listener: METRICS_OWNER.to_string(),
            });
        }
        if let Some(first) = ports.get(&metrics_port) {
            return Err(ValidationError::DuplicatePort {
                port: metrics_port,
                first: first.to_string(),
                second: METRICS_OWNER.to_string(),
            });
        }

        Ok(Self {
            listeners,
            metrics_port,
        })
    }

    /// Listeners in declaration order.
    pub fn listeners(&self) -> &[ListenerSpec] {
        &self.listeners
    }

    /// Iterate listeners in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ListenerSpec> {
        self.listeners.iter()
    }

    /// Find a listener by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&ListenerSpec> {
        self.listeners
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// Port of the metrics endpoint.
    pub fn metrics_port(&self) -> u16 {
        self.metrics_port
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is declared.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<'a> IntoIterator for &'a ListenerCatalog {
    type Item = &'a ListenerSpec;
    type IntoIter = std::slice::Iter<'a, ListenerSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
