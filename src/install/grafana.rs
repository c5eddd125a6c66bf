//! Grafana installation

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Settings;
use crate::install::wait_available;
use crate::k8s::kubectl;

/// Provisioned datasource pointing at the Prometheus service port (8080, not
/// the node port), so the wiring survives node IP changes.
fn datasource_manifest(namespace: &str) -> String {
    format!(
        r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: grafana-datasources
  labels:
    app: grafana
data:
  datasources.yaml: |-
    apiVersion: 1
    datasources:
      - name: Prometheus
        type: prometheus
        access: proxy
        url: http://prometheus-service.{namespace}.svc:8080
        isDefault: true
        editable: true
"#
    )
}

fn deployment_manifest(image: &str) -> String {
    format!(
        r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: grafana
  labels:
    app: grafana
spec:
  replicas: 1
  selector:
    matchLabels:
      app: grafana
  template:
    metadata:
      labels:
        app: grafana
    spec:
      containers:
        - name: grafana
          image: {image}
          ports:
            - containerPort: 3000
          readinessProbe:
            httpGet:
              path: /api/health
              port: 3000
            initialDelaySeconds: 10
            periodSeconds: 10
          resources:
            requests:
              cpu: 250m
              memory: 256Mi
            limits:
              cpu: 500m
              memory: 512Mi
          volumeMounts:
            - name: grafana-storage
              mountPath: /var/lib/grafana
            - name: grafana-datasources
              mountPath: /etc/grafana/provisioning/datasources
              readOnly: true
      volumes:
        - name: grafana-storage
          emptyDir: {{}}
        - name: grafana-datasources
          configMap:
            name: grafana-datasources
"#
    )
}

fn service_manifest(node_port: u16) -> String {
    format!(
        r#"apiVersion: v1
kind: Service
metadata:
  name: grafana
  labels:
    app: grafana
spec:
  type: NodePort
  selector:
    app: grafana
  ports:
    - port: 3000
      targetPort: 3000
      nodePort: {node_port}
"#
    )
}

/// Apply the Grafana manifests and wait for the deployment to become Available
pub fn install(settings: &Settings, kubeconfig: Option<&Path>) -> Result<()> {
    let namespace = settings.stack.namespace.as_str();

    crate::log_info!("Deploying Grafana...");

    kubectl::apply_yaml(&datasource_manifest(namespace), Some(namespace), kubeconfig)
        .context("Failed to apply Grafana datasource configuration")?;

    kubectl::apply_yaml(
        &deployment_manifest(&settings.images.grafana),
        Some(namespace),
        kubeconfig,
    )
    .context("Failed to apply Grafana deployment")?;

    kubectl::apply_yaml(
        &service_manifest(settings.stack.grafana_node_port),
        Some(namespace),
        kubeconfig,
    )
    .context("Failed to apply Grafana service")?;

    wait_available(
        "deployment/grafana",
        namespace,
        &settings.timeouts.ready,
        settings.behavior.show_progress,
        kubeconfig,
    )
    .context("Grafana deployment not ready")?;

    crate::log_info!("Grafana deployed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::tests::parse_docs;

    #[test]
    fn test_datasource_points_at_prometheus_service() {
        let docs = parse_docs(&datasource_manifest("monitoring"));
        let provisioning = docs[0]["data"]["datasources.yaml"].as_str().unwrap();
        assert!(provisioning.contains("http://prometheus-service.monitoring.svc:8080"));

        let inner: serde_yaml::Value = serde_yaml::from_str(provisioning).unwrap();
        assert_eq!(inner["datasources"][0]["type"], "prometheus");
    }

    #[test]
    fn test_service_manifest_node_port() {
        let docs = parse_docs(&service_manifest(32000));
        assert_eq!(docs[0]["spec"]["type"], "NodePort");
        assert_eq!(docs[0]["spec"]["ports"][0]["nodePort"], 32000);
        assert_eq!(docs[0]["spec"]["ports"][0]["port"], 3000);
    }

    #[test]
    fn test_deployment_mounts_datasources() {
        let docs = parse_docs(&deployment_manifest("grafana/grafana:10.4.2"));
        let volumes = docs[0]["spec"]["template"]["spec"]["volumes"]
            .as_sequence()
            .unwrap();
        assert!(
            volumes
                .iter()
                .any(|v| v["configMap"]["name"] == "grafana-datasources")
        );
    }
}
