//! Installation modules for the monitoring stack components

pub mod grafana;
pub mod kube_state_metrics;
pub mod namespace;
pub mod node_exporter;
pub mod prometheus;
pub mod test_app;

use anyhow::Result;
use std::path::Path;

use crate::k8s::kubectl;
use crate::utils::progress::WaitProgress;

/// Bounded wait for a Deployment's Available condition, with an optional spinner
pub(crate) fn wait_available(
    resource: &str,
    namespace: &str,
    timeout: &str,
    show_progress: bool,
    kubeconfig: Option<&Path>,
) -> Result<()> {
    if !show_progress || crate::utils::dryrun::is_dry_run() {
        crate::log_info!("Waiting for {} to be Available...", resource);
        return kubectl::wait_for_condition(
            resource,
            "condition=Available",
            Some(namespace),
            timeout,
            kubeconfig,
        );
    }

    let progress = WaitProgress::new(resource, "Available");
    match kubectl::wait_for_condition(
        resource,
        "condition=Available",
        Some(namespace),
        timeout,
        kubeconfig,
    ) {
        Ok(()) => {
            progress.finish_success();
            Ok(())
        }
        Err(e) => {
            progress.finish_error(&e.to_string());
            Err(e)
        }
    }
}

/// Bounded wait for a rollout to complete, with an optional spinner
pub(crate) fn wait_rollout(
    resource: &str,
    namespace: &str,
    timeout: &str,
    show_progress: bool,
    kubeconfig: Option<&Path>,
) -> Result<()> {
    if !show_progress || crate::utils::dryrun::is_dry_run() {
        crate::log_info!("Waiting for {} rollout...", resource);
        return kubectl::rollout_status(resource, namespace, timeout, kubeconfig);
    }

    let progress = WaitProgress::new(resource, "rolled out");
    match kubectl::rollout_status(resource, namespace, timeout, kubeconfig) {
        Ok(()) => {
            progress.finish_success();
            Ok(())
        }
        Err(e) => {
            progress.finish_error(&e.to_string());
            Err(e)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde::Deserialize;

    /// Parse a (possibly multi-document) manifest into YAML values
    pub(crate) fn parse_docs(yaml: &str) -> Vec<serde_yaml::Value> {
        serde_yaml::Deserializer::from_str(yaml)
            .map(|doc| serde_yaml::Value::deserialize(doc).expect("manifest must be valid YAML"))
            .collect()
    }

    #[test]
    fn test_parse_docs_multi_document() {
        let docs = parse_docs("a: 1\n---\nb: 2\n");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["a"], 1);
        assert_eq!(docs[1]["b"], 2);
    }
}
