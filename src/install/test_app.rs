//! Test application installation
//!
//! A small Flask service exporting request counters on /metrics, used as the
//! load target for autoscaling experiments. The image is built locally and
//! loaded into minikube rather than pulled from a registry.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Settings;
use crate::install::wait_available;
use crate::k8s::kubectl;

/// Deployment with scrape annotations on the pod template so the
/// kubernetes-pods Prometheus job discovers it, and CPU requests sized so the
/// autoscaling experiments have headroom to saturate.
fn deployment_manifest(image: &str, replicas: u32) -> String {
    format!(
        r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: test-app
  labels:
    app: test-app
spec:
  replicas: {replicas}
  selector:
    matchLabels:
      app: test-app
  template:
    metadata:
      labels:
        app: test-app
      annotations:
        prometheus.io/scrape: "true"
        prometheus.io/path: "/metrics"
        prometheus.io/port: "5000"
    spec:
      containers:
        - name: test-app
          image: {image}
          imagePullPolicy: IfNotPresent
          ports:
            - containerPort: 5000
          readinessProbe:
            httpGet:
              path: /
              port: 5000
            initialDelaySeconds: 5
            periodSeconds: 5
          resources:
            requests:
              cpu: 100m
              memory: 128Mi
            limits:
              cpu: 200m
              memory: 256Mi
"#
    )
}

fn service_manifest(node_port: u16) -> String {
    format!(
        r#"apiVersion: v1
kind: Service
metadata:
  name: test-app
  labels:
    app: test-app
spec:
  type: NodePort
  selector:
    app: test-app
  ports:
    - port: 5000
      targetPort: 5000
      nodePort: {node_port}
"#
    )
}

/// Apply the test application manifests and wait for the deployment
pub fn install(settings: &Settings, image: &str, kubeconfig: Option<&Path>) -> Result<()> {
    let namespace = settings.test_app.namespace.as_str();

    crate::log_info!("Deploying test application...");

    kubectl::apply_yaml(
        &deployment_manifest(image, settings.test_app.replicas),
        Some(namespace),
        kubeconfig,
    )
    .context("Failed to apply test-app deployment")?;

    kubectl::apply_yaml(
        &service_manifest(settings.test_app.node_port),
        Some(namespace),
        kubeconfig,
    )
    .context("Failed to apply test-app service")?;

    wait_available(
        "deployment/test-app",
        namespace,
        &settings.timeouts.ready,
        settings.behavior.show_progress,
        kubeconfig,
    )
    .context("test-app deployment not ready")?;

    crate::log_info!("Test application deployed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::tests::parse_docs;

    #[test]
    fn test_deployment_scrape_annotations() {
        let docs = parse_docs(&deployment_manifest("test-app:latest", 1));
        let annotations = &docs[0]["spec"]["template"]["metadata"]["annotations"];
        assert_eq!(annotations["prometheus.io/scrape"], "true");
        assert_eq!(annotations["prometheus.io/port"], "5000");
        assert_eq!(docs[0]["spec"]["replicas"], 1);
    }

    #[test]
    fn test_deployment_replicas_rendered() {
        let docs = parse_docs(&deployment_manifest("test-app:latest", 3));
        assert_eq!(docs[0]["spec"]["replicas"], 3);
    }

    #[test]
    fn test_service_manifest_node_port() {
        let docs = parse_docs(&service_manifest(30500));
        assert_eq!(docs[0]["spec"]["type"], "NodePort");
        assert_eq!(docs[0]["spec"]["ports"][0]["nodePort"], 30500);
        assert_eq!(docs[0]["spec"]["ports"][0]["port"], 5000);
    }
}
