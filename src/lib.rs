//! monitoring-dev - development CLI for a minikube monitoring stack
//!
//! Wraps kubectl and minikube to deploy, inspect and tear down Prometheus,
//! Grafana, kube-state-metrics, node-exporter and a sample test application.
//! Everything goes through the two CLIs; the tool keeps no state of its own.

pub mod commands;
pub mod config;
pub mod install;
pub mod k8s;
pub mod utils;
