//! Operator runtime configuration.

use crate::error::{OperatorError, OperatorResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the server-side apply field manager.
pub const ENV_FIELD_MANAGER: &str = "KAFKA_OPERATOR_FIELD_MANAGER";

/// Environment variable restricting the operator to one namespace.
pub const ENV_WATCH_NAMESPACE: &str = "KAFKA_OPERATOR_WATCH_NAMESPACE";

/// Environment variable holding the periodic resync interval in seconds.
pub const ENV_RESYNC_SECS: &str = "KAFKA_OPERATOR_RESYNC_SECS";

/// Environment variable holding the requeue interval after errors in seconds.
pub const ENV_ERROR_REQUEUE_SECS: &str = "KAFKA_OPERATOR_ERROR_REQUEUE_SECS";

/// Configuration of the operator process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Field manager used for server-side apply.
    pub field_manager: String,

    /// Namespace to watch. All namespaces when unset.
    pub watch_namespace: Option<String>,

    /// Requeue interval after a successful reconciliation, in seconds.
    pub resync_interval_secs: u64,

    /// Requeue interval after a failed reconciliation or broker, in seconds.
    pub error_requeue_secs: u64,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            field_manager: "kafka-operator".to_string(),
            watch_namespace: None,
            // Periodic drift correction every 5 minutes
            resync_interval_secs: 300,
            error_requeue_secs: 30,
        }
    }
}

impl OperatorConfig {
    /// Create a new configuration builder.
    pub fn builder() -> OperatorConfigBuilder {
        OperatorConfigBuilder::default()
    }

    /// Read configuration from the process environment.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> OperatorResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through a variable lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> OperatorResult<Self> {
        let mut config = Self::default();

        if let Some(manager) = lookup(ENV_FIELD_MANAGER) {
            config.field_manager = manager;
        }
        config.watch_namespace = lookup(ENV_WATCH_NAMESPACE).filter(|ns| !ns.is_empty());
        if let Some(raw) = lookup(ENV_RESYNC_SECS) {
            config.resync_interval_secs = parse_secs(ENV_RESYNC_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_ERROR_REQUEUE_SECS) {
            config.error_requeue_secs = parse_secs(ENV_ERROR_REQUEUE_SECS, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Requeue interval after a successful reconciliation.
    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }

    /// Requeue interval after a failure.
    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> OperatorResult<()> {
        if self.field_manager.trim().is_empty() {
            return Err(OperatorError::InvalidConfig(
                "field_manager must not be empty".to_string(),
            ));
        }
        if self.resync_interval_secs == 0 {
            return Err(OperatorError::InvalidConfig(
                "resync_interval_secs must be > 0".to_string(),
            ));
        }
        if self.error_requeue_secs == 0 {
            return Err(OperatorError::InvalidConfig(
                "error_requeue_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_secs(key: &str, raw: &str) -> OperatorResult<u64> {
    raw.trim().parse().map_err(|_| {
        OperatorError::InvalidConfig(format!("{} must be a number of seconds, got `{}`", key, raw))
    })
}

/// Builder for OperatorConfig.
#[derive(Debug, Default)]
pub struct OperatorConfigBuilder {
    config: OperatorConfig,
}

impl OperatorConfigBuilder {
    /// Set the server-side apply field manager.
    pub fn field_manager(mut self, manager: impl Into<String>) -> Self {
        self.config.field_manager = manager.into();
        self
    }

    /// Restrict the operator to one namespace.
    pub fn watch_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.watch_namespace = Some(namespace.into());
        self
    }

    /// Set the resync interval in seconds.
    pub fn resync_interval_secs(mut self, secs: u64) -> Self {
        self.config.resync_interval_secs = secs;
        self
    }

    /// Set the error requeue interval in seconds.
    pub fn error_requeue_secs(mut self, secs: u64) -> Self {
        self.config.error_requeue_secs = secs;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> OperatorResult<OperatorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = OperatorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, OperatorConfig::default());
        assert_eq!(config.resync_interval(), Duration::from_secs(300));
        assert_eq!(config.error_requeue(), Duration::from_secs(30));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = OperatorConfig::from_lookup(lookup(&[
            (ENV_FIELD_MANAGER, "kafka-ops"),
            (ENV_WATCH_NAMESPACE, "kafka"),
            (ENV_RESYNC_SECS, "60"),
            (ENV_ERROR_REQUEUE_SECS, " 5 "),
        ]))
        .unwrap();

        assert_eq!(config.field_manager, "kafka-ops");
        assert_eq!(config.watch_namespace.as_deref(), Some("kafka"));
        assert_eq!(config.resync_interval_secs, 60);
        assert_eq!(config.error_requeue_secs, 5);
    }

    #[test]
    fn empty_namespace_means_all_namespaces() {
        let config = OperatorConfig::from_lookup(lookup(&[(ENV_WATCH_NAMESPACE, "")])).unwrap();
        assert_eq!(config.watch_namespace, None);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = OperatorConfig::from_lookup(lookup(&[(ENV_RESYNC_SECS, "soon")])).unwrap_err();
        assert!(err.to_string().contains(ENV_RESYNC_SECS));

        assert!(OperatorConfig::from_lookup(lookup(&[(ENV_ERROR_REQUEUE_SECS, "0")])).is_err());
    }

    #[test]
    fn builder_validates() {
        assert!(OperatorConfig::builder().field_manager(" ").build().is_err());

        let config = OperatorConfig::builder()
            .watch_namespace("kafka")
            .resync_interval_secs(120)
            .build()
            .unwrap();
        assert_eq!(config.watch_namespace.as_deref(), Some("kafka"));
        assert_eq!(config.resync_interval_secs, 120);
    }
}
