//! kube-state-metrics installation

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Settings;
use crate::install::wait_available;
use crate::k8s::kubectl;

/// RBAC for kube-state-metrics. The role is the standard read-everything set
/// the exporter ships with, trimmed to the API groups it actually lists.
fn rbac_manifest(namespace: &str) -> String {
    format!(
        r#"apiVersion: v1
kind: ServiceAccount
metadata:
  name: kube-state-metrics
  labels:
    app: kube-state-metrics
---
apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRole
metadata:
  name: kube-state-metrics
  labels:
    app: kube-state-metrics
rules:
  - apiGroups: [""]
    resources:
      - configmaps
      - endpoints
      - limitranges
      - namespaces
      - nodes
      - persistentvolumeclaims
      - persistentvolumes
      - pods
      - replicationcontrollers
      - resourcequotas
      - secrets
      - services
      - serviceaccounts
    verbs: ["list", "watch"]
  - apiGroups: ["apps"]
    resources:
      - daemonsets
      - deployments
      - replicasets
      - statefulsets
    verbs: ["list", "watch"]
  - apiGroups: ["batch"]
    resources:
      - cronjobs
      - jobs
    verbs: ["list", "watch"]
  - apiGroups: ["autoscaling"]
    resources:
      - horizontalpodautoscalers
    verbs: ["list", "watch"]
  - apiGroups: ["policy"]
    resources:
      - poddisruptionbudgets
    verbs: ["list", "watch"]
  - apiGroups: ["certificates.k8s.io"]
    resources:
      - certificatesigningrequests
    verbs: ["list", "watch"]
  - apiGroups: ["discovery.k8s.io"]
    resources:
      - endpointslices
    verbs: ["list", "watch"]
  - apiGroups: ["storage.k8s.io"]
    resources:
      - storageclasses
      - volumeattachments
    verbs: ["list", "watch"]
  - apiGroups: ["networking.k8s.io"]
    resources:
      - ingressclasses
      - ingresses
      - networkpolicies
    verbs: ["list", "watch"]
  - apiGroups: ["coordination.k8s.io"]
    resources:
      - leases
    verbs: ["list", "watch"]
---
apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRoleBinding
metadata:
  name: kube-state-metrics
  labels:
    app: kube-state-metrics
roleRef:
  apiGroup: rbac.authorization.k8s.io
  kind: ClusterRole
  name: kube-state-metrics
subjects:
  - kind: ServiceAccount
    name: kube-state-metrics
    namespace: {namespace}
"#
    )
}

fn deployment_manifest(image: &str) -> String {
    format!(
        r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: kube-state-metrics
  labels:
    app: kube-state-metrics
spec:
  replicas: 1
  selector:
    matchLabels:
      app: kube-state-metrics
  template:
    metadata:
      labels:
        app: kube-state-metrics
    spec:
      serviceAccountName: kube-state-metrics
      containers:
        - name: kube-state-metrics
          image: {image}
          ports:
            - name: http-metrics
              containerPort: 8080
            - name: telemetry
              containerPort: 8081
          readinessProbe:
            httpGet:
              path: /
              port: 8081
            initialDelaySeconds: 5
            timeoutSeconds: 5
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

const SERVICE: &str = r#"apiVersion: v1
kind: Service
metadata:
  name: kube-state-metrics
  labels:
    app: kube-state-metrics
spec:
  type: ClusterIP
  selector:
    app: kube-state-metrics
  ports:
    - name: http-metrics
      port: 8080
      targetPort: http-metrics
    - name: telemetry
      port: 8081
      targetPort: telemetry
"#;

/// Apply the kube-state-metrics manifests and wait for the deployment
pub fn install(settings: &Settings, kubeconfig: Option<&Path>) -> Result<()> {
    let namespace = settings.stack.namespace.as_str();

    crate::log_info!("Deploying kube-state-metrics...");

    kubectl::apply_yaml(&rbac_manifest(namespace), Some(namespace), kubeconfig)
        .context("Failed to apply kube-state-metrics RBAC")?;

    kubectl::apply_yaml(
        &deployment_manifest(&settings.images.kube_state_metrics),
        Some(namespace),
        kubeconfig,
    )
    .context("Failed to apply kube-state-metrics deployment")?;

    kubectl::apply_yaml(SERVICE, Some(namespace), kubeconfig)
        .context("Failed to apply kube-state-metrics service")?;

    wait_available(
        "deployment/kube-state-metrics",
        namespace,
        &settings.timeouts.ready,
        settings.behavior.show_progress,
        kubeconfig,
    )
    .context("kube-state-metrics deployment not ready")?;

    crate::log_info!("kube-state-metrics deployed");
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
        assert_eq!(docs[1]["kind"], "ClusterRole");
        assert_eq!(docs[2]["subjects"][0]["namespace"], "monitoring");
    }

    #[test]
    fn test_service_is_cluster_ip() {
        let docs = parse_docs(SERVICE);
        assert_eq!(docs[0]["spec"]["type"], "ClusterIP");
        assert_eq!(docs[0]["spec"]["ports"][0]["port"], 8080);
    }

    #[test]
    fn test_deployment_ports() {
        let docs = parse_docs(&deployment_manifest(
            "registry.k8s.io/kube-state-metrics/kube-state-metrics:v2.12.0",
        ));
        let ports = docs[0]["spec"]["template"]["spec"]["containers"][0]["ports"]
            .as_sequence()
            .unwrap();
        assert_eq!(ports.len(), 2);
    }
}
