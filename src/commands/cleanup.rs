//! Cleanup command: conditional deletion of everything the tool creates

use anyhow::Result;
use std::path::Path;

use crate::config::Settings;
use crate::k8s::kubectl;
use crate::utils::dryrun;

/// A resource slated for deletion, namespaced or cluster-scoped
struct Target<'a> {
    kind: &'a str,
    name: &'a str,
    namespace: Option<&'a str>,
}

impl<'a> Target<'a> {
    fn namespaced(kind: &'a str, name: &'a str, namespace: &'a str) -> Self {
        Self {
            kind,
            name,
            namespace: Some(namespace),
        }
    }

    fn cluster(kind: &'a str, name: &'a str) -> Self {
        Self {
            kind,
            name,
            namespace: None,
        }
    }
}

/// Tear down the monitoring stack and the test application.
/// Each resource is existence-checked first; absent resources produce a
/// warning instead of a fatal "not found". Namespaces go last.
pub fn cleanup(settings: &Settings, assume_yes: bool, kubeconfig: Option<&Path>) -> Result<()> {
    if settings.behavior.confirm_destructive && !assume_yes && !dryrun::is_dry_run() {
        let prompt = format!(
            "Delete the monitoring stack in namespace '{}' and the test app in '{}'?",
            settings.stack.namespace, settings.test_app.namespace
        );
        if !crate::utils::confirm(&prompt)? {
            crate::log_info!("Cleanup cancelled");
            return Ok(());
        }
    }

    crate::log_info!("Cleaning up monitoring stack resources...");

    let ns = settings.stack.namespace.as_str();
    let test_ns = settings.test_app.namespace.as_str();

    let targets = [
        // Test application first
        Target::namespaced("service", "test-app", test_ns),
        Target::namespaced("deployment", "test-app", test_ns),
        Target::cluster("namespace", test_ns),
        // Grafana
        Target::namespaced("service", "grafana", ns),
        Target::namespaced("deployment", "grafana", ns),
        Target::namespaced("configmap", "grafana-datasources", ns),
        // Prometheus
        Target::namespaced("service", "prometheus-service", ns),
        Target::namespaced("deployment", "prometheus", ns),
        Target::namespaced("configmap", "prometheus-server-conf", ns),
        Target::cluster("clusterrolebinding", "prometheus"),
        Target::cluster("clusterrole", "prometheus"),
        Target::namespaced("serviceaccount", "prometheus", ns),
        // node-exporter
        Target::namespaced("service", "node-exporter", ns),
        Target::namespaced("daemonset", "node-exporter", ns),
        // kube-state-metrics
        Target::namespaced("service", "kube-state-metrics", ns),
        Target::namespaced("deployment", "kube-state-metrics", ns),
        Target::cluster("clusterrolebinding", "kube-state-metrics"),
        Target::cluster("clusterrole", "kube-state-metrics"),
        Target::namespaced("serviceaccount", "kube-state-metrics", ns),
        // Stack namespace last
        Target::cluster("namespace", ns),
    ];

    for target in &targets {
        delete_if_exists(target, &settings.timeouts.delete, kubeconfig)?;
    }

    crate::log_info!("Cleanup complete!");
    Ok(())
}

/// Existence-checked delete: a missing resource is a warning, not an error
fn delete_if_exists(target: &Target<'_>, timeout: &str, kubeconfig: Option<&Path>) -> Result<()> {
    let exists = kubectl::resource_exists(target.kind, target.name, target.namespace, kubeconfig)?;

    if !exists {
        crate::log_warn!(
            "{} '{}' not found, skipping",
            target.kind,
            target.name
        );
        return Ok(());
    }

    crate::log_info!("Deleting {} '{}'...", target.kind, target.name);
    kubectl::delete_resource(
        target.kind,
        target.name,
        target.namespace,
        timeout,
        kubeconfig,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_constructors() {
        let ns_target = Target::namespaced("deployment", "grafana", "monitoring");
        assert_eq!(ns_target.namespace, Some("monitoring"));

        let cluster_target = Target::cluster("clusterrole", "prometheus");
        assert_eq!(cluster_target.namespace, None);
    }
}
