//! Namespace creation

use anyhow::{Context, Result};
use std::path::Path;

use crate::k8s::kubectl;

/// Render a Namespace manifest
fn namespace_manifest(name: &str) -> String {
    format!(
        r#"apiVersion: v1
kind: Namespace
metadata:
  name: {name}
  labels:
    app.kubernetes.io/managed-by: monitoring-dev
"#
    )
}

/// Apply a Namespace manifest. Apply is declarative, so an existing namespace
/// is updated in place rather than treated as a conflict.
pub fn ensure(name: &str, kubeconfig: Option<&Path>) -> Result<()> {
    crate::log_info!("Ensuring namespace '{}' exists...", name);

    kubectl::apply_yaml(&namespace_manifest(name), None, kubeconfig)
        .with_context(|| format!("Failed to create namespace {}", name))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_manifest() {
        let yaml = namespace_manifest("monitoring");
        assert!(yaml.contains("kind: Namespace"));
        assert!(yaml.contains("name: monitoring"));
    }
}
