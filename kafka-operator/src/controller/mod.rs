//! Kubernetes controllers for Kafka cluster resources.
//!
//! - [`KafkaClusterController`]: Manages KafkaCluster resources
//!
//! # Usage with kube-runtime
//!
//! The controller runtime requires both a reconcile function and an error policy:
//!
//! ```ignore
//! use kafka_operator::controller::{KafkaClusterController, cluster_error_policy};
//!
//! Controller::new(clusters, watcher_config)
//!     .run(|cluster, ctx| async move {
//!         KafkaClusterController::new(ctx).reconcile(cluster).await.map(Action::from)
//!     }, cluster_error_policy, context)
//!     .for_each(|_| futures::future::ready(()))
//!     .await;
//! ```

mod cluster;

pub use cluster::{KafkaClusterController, error_policy as cluster_error_policy};

use crate::config::OperatorConfig;
use kube::runtime::controller::Action;

/// Shared context for controllers.
pub struct ControllerContext {
    /// Kubernetes client.
    pub client: kube::Client,
    /// Operator configuration.
    pub config: OperatorConfig,
}

impl ControllerContext {
    /// Create a new controller context.
    pub fn new(client: kube::Client, config: OperatorConfig) -> Self {
        Self { client, config }
    }
}

/// Result type for reconciliation actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Requeue after the specified duration.
    Requeue(std::time::Duration),
    /// Don't requeue; wait for the resource to change.
    Done,
}

impl From<ReconcileAction> for Action {
    fn from(action: ReconcileAction) -> Self {
        match action {
            ReconcileAction::Requeue(duration) => Action::requeue(duration),
            ReconcileAction::Done => Action::await_change(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn reconcile_action_maps_to_runtime_action() {
        assert_eq!(
            Action::from(ReconcileAction::Requeue(Duration::from_secs(30))),
            Action::requeue(Duration::from_secs(30))
        );
        assert_eq!(Action::from(ReconcileAction::Done), Action::await_change());
    }
}
