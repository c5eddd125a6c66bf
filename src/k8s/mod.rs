//! Kubernetes and minikube CLI plumbing

pub mod kubectl;
pub mod minikube;
