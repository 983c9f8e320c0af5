//! Kafka Kubernetes Operator
//!
//! This crate provides a Kubernetes operator that resolves the listener
//! configuration of Kafka-compatible brokers and materializes it as one
//! ConfigMap and one Service per broker.
//!
//! # Custom Resource Definitions
//!
//! - **KafkaCluster**: Declares the listeners and brokers of a cluster
//!
//! # Example
//!
//! ```yaml
//! apiVersion: kafka.operator.io/v1beta1
//! kind: KafkaCluster
//! metadata:
//!   name: kc
//!   namespace: kafka
//! spec:
//!   listeners:
//!     - name: internal
//!       role: internal
//!       containerPort: 29092
//!     - name: controller
//!       role: controller
//!       containerPort: 29093
//!     - name: external
//!       role: external
//!       containerPort: 9094
//!       externalStartingPort: 19090
//!       zoneHostTemplates:
//!         az1: external.az1.host.com
//!         az2: external.az2.host.com
//!   brokers:
//!     - id: 0
//!       zone: az1
//!     - id: 1
//!       zone: az2
//! ```
//!
//! The listener engine in [`listeners`] is pure and can be used without a
//! Kubernetes connection.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod controller;
pub mod crd;
pub mod error;
pub mod listeners;
pub mod properties;
pub mod resources;

pub use config::OperatorConfig;
pub use crd::{KafkaCluster, KafkaClusterSpec};
pub use error::{OperatorError, OperatorResult, ResolutionError, ValidationError};
