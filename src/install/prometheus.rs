//! Prometheus installation

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Settings;
use crate::install::wait_available;
use crate::k8s::kubectl;

/// ServiceAccount, ClusterRole and ClusterRoleBinding for the Prometheus server.
/// The binding subject carries the namespace, so this one is rendered.
fn rbac_manifest(namespace: &str) -> String {
    format!(
        r#"apiVersion: v1
kind: ServiceAccount
metadata:
  name: prometheus
---
apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRole
metadata:
  name: prometheus
rules:
  - apiGroups: [""]
    resources:
      - nodes
      - nodes/proxy
      - nodes/metrics
      - services
      - endpoints
      - pods
    verbs: ["get", "list", "watch"]
  - apiGroups: [""]
    resources:
      - configmaps
    verbs: ["get"]
  - apiGroups:
      - discovery.k8s.io
    resources:
      - endpointslices
    verbs: ["get", "list", "watch"]
  - nonResourceURLs: ["/metrics"]
    verbs: ["get"]
---
apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRoleBinding
metadata:
  name: prometheus
roleRef:
  apiGroup: rbac.authorization.k8s.io
  kind: ClusterRole
  name: prometheus
subjects:
  - kind: ServiceAccount
    name: prometheus
    namespace: {namespace}
"#
    )
}

/// Scrape configuration. The 5s interval matches the resolution the
/// autoscaling experiments sample at; the kubernetes-pods job discovers any
/// pod carrying the prometheus.io/scrape annotation, which is how the test
/// application is picked up.
fn config_manifest(namespace: &str) -> String {
    format!(
        r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: prometheus-server-conf
  labels:
    app: prometheus
data:
  prometheus.yml: |-
    global:
      scrape_interval: 5s
      evaluation_interval: 5s

    scrape_configs:
      - job_name: prometheus
        static_configs:
          - targets: ['localhost:9090']

      - job_name: kube-state-metrics
        static_configs:
          - targets: ['kube-state-metrics.{namespace}.svc.cluster.local:8080']

      - job_name: node-exporter
        kubernetes_sd_configs:
          - role: endpoints
        relabel_configs:
          - source_labels: [__meta_kubernetes_endpoints_name]
            regex: node-exporter
            action: keep

      - job_name: kubernetes-pods
        kubernetes_sd_configs:
          - role: pod
        relabel_configs:
          - source_labels: [__meta_kubernetes_pod_annotation_prometheus_io_scrape]
            action: keep
            regex: true
          - source_labels: [__meta_kubernetes_pod_annotation_prometheus_io_path]
            action: replace
            target_label: __metrics_path__
            regex: (.+)
          - source_labels: [__address__, __meta_kubernetes_pod_annotation_prometheus_io_port]
            action: replace
            regex: ([^:]+)(?::\d+)?;(\d+)
            replacement: $1:$2
            target_label: __address__
          - action: labelmap
            regex: __meta_kubernetes_pod_label_(.+)
          - source_labels: [__meta_kubernetes_namespace]
            action: replace
            target_label: kubernetes_namespace
          - source_labels: [__meta_kubernetes_pod_name]
            action: replace
            target_label: kubernetes_pod_name
"#
    )
}

fn deployment_manifest(image: &str) -> String {
    format!(
        r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: prometheus
  labels:
    app: prometheus
spec:
  replicas: 1
  selector:
    matchLabels:
      app: prometheus
  template:
    metadata:
      labels:
        app: prometheus
    spec:
      serviceAccountName: prometheus
      containers:
        - name: prometheus
          image: {image}
          args:
            - "--config.file=/etc/prometheus/prometheus.yml"
            - "--storage.tsdb.path=/prometheus/"
          ports:
            - containerPort: 9090
          readinessProbe:
            httpGet:
              path: /-/ready
              port: 9090
            initialDelaySeconds: 5
            periodSeconds: 5
          resources:
            requests:
              cpu: 250m
              memory: 512Mi
            limits:
              cpu: "1"
              memory: 1Gi
          volumeMounts:
            - name: prometheus-config
              mountPath: /etc/prometheus/
            - name: prometheus-storage
              mountPath: /prometheus/
      volumes:
        - name: prometheus-config
          configMap:
            name: prometheus-server-conf
        - name: prometheus-storage
          emptyDir: {{}}
"#
    )
}

/// NodePort service. Cluster-internal consumers (Grafana, the autoscaler)
/// reach it on port 8080; the node port is for the developer's browser.
fn service_manifest(node_port: u16) -> String {
    format!(
        r#"apiVersion: v1
kind: Service
metadata:
  name: prometheus-service
  labels:
    app: prometheus
  annotations:
    prometheus.io/scrape: "true"
    prometheus.io/port: "9090"
spec:
  type: NodePort
  selector:
    app: prometheus
  ports:
    - port: 8080
      targetPort: 9090
      nodePort: {node_port}
"#
    )
}

/// Apply the Prometheus manifests and wait for the deployment to become Available
pub fn install(settings: &Settings, kubeconfig: Option<&Path>) -> Result<()> {
    let namespace = settings.stack.namespace.as_str();

    crate::log_info!("Deploying Prometheus...");

    kubectl::apply_yaml(&rbac_manifest(namespace), Some(namespace), kubeconfig)
        .context("Failed to apply Prometheus RBAC")?;

    kubectl::apply_yaml(&config_manifest(namespace), Some(namespace), kubeconfig)
        .context("Failed to apply Prometheus configuration")?;

    kubectl::apply_yaml(
        &deployment_manifest(&settings.images.prometheus),
        Some(namespace),
        kubeconfig,
    )
    .context("Failed to apply Prometheus deployment")?;

    kubectl::apply_yaml(
        &service_manifest(settings.stack.prometheus_node_port),
        Some(namespace),
        kubeconfig,
    )
    .context("Failed to apply Prometheus service")?;

    wait_available(
        "deployment/prometheus",
        namespace,
        &settings.timeouts.ready,
        settings.behavior.show_progress,
        kubeconfig,
    )
    .context("Prometheus deployment not ready")?;

    crate::log_info!("Prometheus deployed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::tests::parse_docs;

    #[test]
    fn test_rbac_manifest_shape() {
        let docs = parse_docs(&rbac_manifest("monitoring"));
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0]["kind"], "ServiceAccount");
        assert_eq!(docs[1]["kind"], "ClusterRole");
        assert_eq!(docs[2]["kind"], "ClusterRoleBinding");
        assert_eq!(docs[2]["subjects"][0]["namespace"], "monitoring");
    }

    #[test]
    fn test_config_manifest_targets_namespace() {
        let yaml = config_manifest("monitoring");
        let docs = parse_docs(&yaml);
        assert_eq!(docs[0]["kind"], "ConfigMap");
        assert_eq!(docs[0]["metadata"]["name"], "prometheus-server-conf");

        let config = docs[0]["data"]["prometheus.yml"].as_str().unwrap();
        assert!(config.contains("kube-state-metrics.monitoring.svc.cluster.local:8080"));
        assert!(config.contains("scrape_interval: 5s"));
        // Inner prometheus.yml must itself be valid YAML
        let inner: serde_yaml::Value = serde_yaml::from_str(config).unwrap();
        assert!(inner["scrape_configs"].as_sequence().unwrap().len() >= 4);
    }

    #[test]
    fn test_service_manifest_node_port() {
        let docs = parse_docs(&service_manifest(30000));
        assert_eq!(docs[0]["spec"]["type"], "NodePort");
        assert_eq!(docs[0]["spec"]["ports"][0]["nodePort"], 30000);
        assert_eq!(docs[0]["spec"]["ports"][0]["targetPort"], 9090);
    }

    #[test]
    fn test_deployment_manifest_image() {
        let docs = parse_docs(&deployment_manifest("prom/prometheus:v2.53.0"));
        assert_eq!(docs[0]["kind"], "Deployment");
        assert_eq!(
            docs[0]["spec"]["template"]["spec"]["containers"][0]["image"],
            "prom/prometheus:v2.53.0"
        );
    }
}
