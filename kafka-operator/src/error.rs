//! Error types for the Kafka cluster operator.
//!
//! The listener resolution engine has two failure classes:
//!
//! - [`ValidationError`]: the declared cluster spec is inconsistent. Fatal for
//!   the whole cluster until the spec is corrected.
//! - [`ResolutionError`]: one broker cannot be given a complete listener
//!   configuration. Fatal for that broker only.
//!
//! [`OperatorError`] wraps both together with Kubernetes API failures for the
//! controller.

use thiserror::Error;

/// The declared cluster spec is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two listeners share a name (compared case-insensitively).
    #[error("duplicate listener name `{name}`")]
    DuplicateListenerName {
        /// The repeated listener name as declared.
        name: String,
    },

    /// Two listeners, or a listener and the metrics endpoint, share a container port.
    #[error("container port {port} is used by both `{first}` and `{second}`")]
    DuplicatePort {
        /// The conflicting port.
        port: u16,
        /// Owner declared first.
        first: String,
        /// Owner declared second.
        second: String,
    },

    /// A zone-templated external listener has no zone template entry.
    #[error("external listener `{listener}` declares no zone host templates")]
    MissingZoneTemplate {
        /// Listener name.
        listener: String,
    },

    /// Listener name is not usable as a Kafka listener name or Service port name.
    #[error(
        "invalid listener name `{name}`: must start with a letter, contain only letters, digits or `-`, not end with `-` and be at most 59 characters"
    )]
    InvalidListenerName {
        /// The rejected name.
        name: String,
    },

    /// Listener declares container port 0.
    #[error("listener `{listener}` declares invalid container port 0")]
    InvalidPort {
        /// Listener name.
        listener: String,
    },

    /// A zone host template is empty or uses an unknown placeholder.
    #[error("host template for zone `{zone}` of listener `{listener}` is invalid: {reason}")]
    InvalidHostTemplate {
        /// Listener name.
        listener: String,
        /// Zone whose template was rejected.
        zone: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A non-external listener declares external starting port or zone templates.
    #[error("{role} listener `{listener}` cannot declare external ports or zone host templates")]
    UnexpectedExternalSettings {
        /// Listener name.
        listener: String,
        /// Declared role.
        role: String,
    },

    /// The headless service name template is invalid.
    #[error("headless service name template `{template}` is invalid: {reason}")]
    InvalidServiceTemplate {
        /// The rejected template.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two brokers share an id.
    #[error("duplicate broker id {id}")]
    DuplicateBrokerId {
        /// The repeated id.
        id: u32,
    },

    /// A broker's advertised host override is blank.
    #[error("broker {broker} declares a blank advertised host override")]
    BlankAdvertisedHost {
        /// Broker id.
        broker: u32,
    },

    /// The cluster resource has no namespace.
    #[error("cluster `{cluster}` must be namespaced")]
    MissingNamespace {
        /// Cluster name.
        cluster: String,
    },

    /// The topology has no cluster name.
    #[error("cluster name must not be empty")]
    MissingClusterName,
}

/// A broker cannot be given a complete listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No host template exists for the broker's zone and no override is set.
    #[error("broker {broker}: listener `{listener}` has no host template for zone `{zone}`")]
    UnresolvedZone {
        /// Listener name.
        listener: String,
        /// Broker id.
        broker: u32,
        /// The zone that was looked up (may be empty).
        zone: String,
    },

    /// `starting_port + broker id` does not fit in a TCP port.
    #[error(
        "broker {broker}: listener `{listener}` starting port {starting_port} plus broker id exceeds 65535"
    )]
    PortOutOfRange {
        /// Listener name.
        listener: String,
        /// Broker id.
        broker: u32,
        /// Declared external starting port.
        starting_port: u16,
    },
}

impl ResolutionError {
    /// Id of the broker the error belongs to.
    pub fn broker(&self) -> u32 {
        match self {
            Self::UnresolvedZone { broker, .. } | Self::PortOutOfRange { broker, .. } => *broker,
        }
    }
}

/// Errors that can occur during operator operations.
#[derive(Debug, Error)]
pub enum OperatorError {
    /// Kubernetes API error.
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// Cluster spec validation error.
    #[error("Cluster spec validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Broker listener resolution error.
    #[error("Listener resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// Malformed properties text.
    #[error("Invalid broker properties: {0}")]
    Properties(#[from] crate::properties::PropertiesError),

    /// Invalid operator configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for operator operations.
pub type OperatorResult<T> = Result<T, OperatorError>;

impl From<serde_json::Error> for OperatorError {
    fn from(err: serde_json::Error) -> Self {
        OperatorError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for OperatorError {
    fn from(err: serde_yaml::Error) -> Self {
        OperatorError::SerializationError(err.to_string())
    }
}
