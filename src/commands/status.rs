//! Status command: a read-only snapshot of the deployed stack

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::config::Settings;
use crate::k8s::kubectl;
use crate::k8s::minikube::MinikubeProfile;

/// Show minikube state, workload tables for both namespaces and the NodePort
/// endpoints. Purely read-only; failures to reach optional pieces degrade to
/// warnings rather than aborting.
pub fn status(settings: &Settings, kubeconfig: Option<&Path>) -> Result<()> {
    let profile = MinikubeProfile::new(&settings.defaults.profile);

    if !profile.is_running()? {
        crate::log_warn!(
            "Minikube profile '{}' is not running",
            settings.defaults.profile
        );
        return Ok(());
    }

    crate::log_info!("Minikube profile '{}' is running", settings.defaults.profile);
    println!();

    print_namespace_section(&settings.stack.namespace, kubeconfig);
    print_namespace_section(&settings.test_app.namespace, kubeconfig);

    match profile.ip() {
        Ok(ip) => {
            println!("{}", "Endpoints:".bold());
            println!(
                "  Prometheus  http://{}:{}",
                ip, settings.stack.prometheus_node_port
            );
            println!(
                "  Grafana     http://{}:{}",
                ip, settings.stack.grafana_node_port
            );
            println!("  Test app    http://{}:{}", ip, settings.test_app.node_port);
        }
        Err(e) => {
            crate::log_warn!("Could not determine minikube IP: {}", e);
        }
    }

    Ok(())
}

/// Print the workload tables for one namespace, or a note when it is absent
fn print_namespace_section(namespace: &str, kubeconfig: Option<&Path>) {
    println!("{} {}", "Namespace:".bold(), namespace);

    let exists = kubectl::resource_exists("namespace", namespace, None, kubeconfig)
        .unwrap_or(false);

    if !exists {
        println!("  (namespace does not exist)");
        println!();
        return;
    }

    for resource in ["deployments", "daemonsets", "services"] {
        let result = kubectl::run_kubectl_output(
            &["get", resource, "-n", namespace, "-o", "wide"],
            kubeconfig,
        );

        match result {
            Ok(output) if !output.trim().is_empty() => {
                for line in output.lines() {
                    println!("  {}", line);
                }
            }
            Ok(_) => {}
            Err(_) => {
                println!("  (could not list {})", resource);
            }
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_status_module_exists() {
        // Basic compile test; status is exercised against a live cluster only
    }
}
