//! Interactive menu for debugging the deployed stack

use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

use crate::config::Settings;

/// Show interactive menu for stack operations
pub fn show_menu(settings: &Settings, kubeconfig: Option<&Path>) -> Result<()> {
    crate::log_info!("");
    crate::log_info!("==========================================");
    crate::log_info!("Interactive Menu");
    crate::log_info!("==========================================");
    crate::log_info!("");

    loop {
        println!();
        println!("Available actions:");
        println!("  1) Port-forward to Prometheus UI (http://localhost:9090)");
        println!("  2) Port-forward to Grafana UI (http://localhost:3000)");
        println!("  3) View Prometheus logs");
        println!("  4) View Grafana logs");
        println!("  5) Show cluster information");
        println!("  6) kubectl shell (interactive)");
        println!("  7) Exit");
        println!();
        print!("Select an action [1-7]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        match input.trim() {
            "1" => port_forward_prometheus(settings, kubeconfig)?,
            "2" => port_forward_grafana(settings, kubeconfig)?,
            "3" => view_logs(&settings.stack.namespace, "app=prometheus", kubeconfig)?,
            "4" => view_logs(&settings.stack.namespace, "app=grafana", kubeconfig)?,
            "5" => show_cluster_info(kubeconfig)?,
            "6" => kubectl_shell(kubeconfig)?,
            "7" => {
                crate::log_info!("Exiting...");
                break;
            }
            _ => {
                crate::log_error!("Invalid selection. Please choose 1-7.");
            }
        }
    }

    Ok(())
}

fn base_kubectl(kubeconfig: Option<&Path>) -> Command {
    let mut cmd = Command::new("kubectl");
    if let Some(kc) = kubeconfig {
        cmd.env("KUBECONFIG", kc);
    }
    cmd
}

/// Port-forward to the Prometheus service
fn port_forward_prometheus(settings: &Settings, kubeconfig: Option<&Path>) -> Result<()> {
    crate::log_info!("Starting port-forward to Prometheus UI...");
    crate::log_info!("Access Prometheus at: http://localhost:9090");
    crate::log_info!("Press Ctrl+C to stop port-forwarding and return to menu");

    let mut cmd = base_kubectl(kubeconfig);
    cmd.args([
        "port-forward",
        "-n",
        settings.stack.namespace.as_str(),
        "svc/prometheus-service",
        "9090:8080",
    ]);

    let _ = cmd.status(); // Ignore error from Ctrl+C

    Ok(())
}

/// Port-forward to the Grafana service
fn port_forward_grafana(settings: &Settings, kubeconfig: Option<&Path>) -> Result<()> {
    crate::log_info!("Starting port-forward to Grafana UI...");
    crate::log_info!("Access Grafana at: http://localhost:3000");
    crate::log_info!("Press Ctrl+C to stop port-forwarding and return to menu");

    let mut cmd = base_kubectl(kubeconfig);
    cmd.args([
        "port-forward",
        "-n",
        settings.stack.namespace.as_str(),
        "svc/grafana",
        "3000:3000",
    ]);

    let _ = cmd.status(); // Ignore error from Ctrl+C

    Ok(())
}

/// Tail logs for a labeled workload
fn view_logs(namespace: &str, selector: &str, kubeconfig: Option<&Path>) -> Result<()> {
    crate::log_info!("Showing logs for {}...", selector);
    crate::log_info!("Press Ctrl+C to stop and return to menu");

    let mut cmd = base_kubectl(kubeconfig);
    cmd.args(["logs", "-n", namespace, "-l", selector, "-f", "--tail=100"]);

    let _ = cmd.status(); // Ignore error from Ctrl+C

    Ok(())
}

/// Show cluster information
fn show_cluster_info(kubeconfig: Option<&Path>) -> Result<()> {
    let mut cmd = base_kubectl(kubeconfig);
    cmd.args(["cluster-info"]);
    let _ = cmd.status();

    let mut cmd = base_kubectl(kubeconfig);
    cmd.args(["get", "nodes", "-o", "wide"]);
    let _ = cmd.status();

    Ok(())
}

/// Free-form kubectl command prompt
fn kubectl_shell(kubeconfig: Option<&Path>) -> Result<()> {
    crate::log_info!("kubectl shell. Type a kubectl subcommand, or 'exit' to return.");

    loop {
        print!("kubectl> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let line = input.trim();

        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let args = match shell_words::split(line) {
            Ok(args) => args,
            Err(e) => {
                crate::log_error!("Could not parse command: {}", e);
                continue;
            }
        };

        let mut cmd = base_kubectl(kubeconfig);
        cmd.args(&args);
        let _ = cmd.status(); // Errors are visible on the inherited stderr
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_interactive_module_exists() {
        // Basic compile test - menu requires a terminal
    }
}
