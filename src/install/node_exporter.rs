//! node-exporter installation

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Settings;
use crate::install::wait_rollout;
use crate::k8s::kubectl;

/// DaemonSet on the host network so node metrics reflect the node, not the pod
/// sandbox. Tolerates the control-plane taint to cover single-node minikube.
fn daemonset_manifest(image: &str) -> String {
    format!(
        r#"apiVersion: apps/v1
kind: DaemonSet
metadata:
  name: node-exporter
  labels:
    app: node-exporter
spec:
  selector:
    matchLabels:
      app: node-exporter
  template:
    metadata:
      labels:
        app: node-exporter
    spec:
      hostNetwork: true
      hostPID: true
      tolerations:
        - key: node-role.kubernetes.io/control-plane
          operator: Exists
          effect: NoSchedule
      containers:
        - name: node-exporter
          image: {image}
          args:
            - "--path.procfs=/host/proc"
            - "--path.sysfs=/host/sys"
            - "--path.rootfs=/host/root"
          ports:
            - name: metrics
              containerPort: 9100
              hostPort: 9100
          resources:
            requests:
              cpu: 100m
              memory: 64Mi
            limits:
              cpu: 200m
              memory: 128Mi
          volumeMounts:
            - name: proc
              mountPath: /host/proc
              readOnly: true
            - name: sys
              mountPath: /host/sys
              readOnly: true
            - name: root
              mountPath: /host/root
              readOnly: true
      volumes:
        - name: proc
          hostPath:
            path: /proc
        - name: sys
          hostPath:
            path: /sys
        - name: root
          hostPath:
            path: /
"#
    )
}

/// Headless-style ClusterIP service; Prometheus discovers the endpoints by name.
const SERVICE: &str = r#"apiVersion: v1
kind: Service
metadata:
  name: node-exporter
  labels:
    app: node-exporter
  annotations:
    prometheus.io/scrape: "true"
    prometheus.io/port: "9100"
spec:
  type: ClusterIP
  selector:
    app: node-exporter
  ports:
    - name: metrics
      port: 9100
      targetPort: 9100
"#;

/// Apply the node-exporter manifests and wait for the rollout to complete
pub fn install(settings: &Settings, kubeconfig: Option<&Path>) -> Result<()> {
    let namespace = settings.stack.namespace.as_str();

    crate::log_info!("Deploying node-exporter...");

    kubectl::apply_yaml(
        &daemonset_manifest(&settings.images.node_exporter),
        Some(namespace),
        kubeconfig,
    )
    .context("Failed to apply node-exporter daemonset")?;

    kubectl::apply_yaml(SERVICE, Some(namespace), kubeconfig)
        .context("Failed to apply node-exporter service")?;

    wait_rollout(
        "daemonset/node-exporter",
        namespace,
        &settings.timeouts.ready,
        settings.behavior.show_progress,
        kubeconfig,
    )
    .context("node-exporter rollout did not complete")?;

    crate::log_info!("node-exporter deployed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::tests::parse_docs;

    #[test]
    fn test_daemonset_host_mounts() {
        let docs = parse_docs(&daemonset_manifest("prom/node-exporter:v1.8.1"));
        assert_eq!(docs[0]["kind"], "DaemonSet");
        assert_eq!(docs[0]["spec"]["template"]["spec"]["hostNetwork"], true);

        let volumes = docs[0]["spec"]["template"]["spec"]["volumes"]
            .as_sequence()
            .unwrap();
        assert_eq!(volumes.len(), 3);
    }

    #[test]
    fn test_service_scrape_annotation() {
        let docs = parse_docs(SERVICE);
        assert_eq!(
            docs[0]["metadata"]["annotations"]["prometheus.io/scrape"],
            "true"
        );
        assert_eq!(docs[0]["spec"]["ports"][0]["port"], 9100);
    }
}
