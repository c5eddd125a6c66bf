//! Minikube profile probing and helpers

use anyhow::{Context, Result, anyhow};
use std::process::Command;

use crate::utils::dryrun;
use crate::utils::errors::MonitoringDevError;

/// Handle to a named minikube profile
#[derive(Debug, Clone)]
pub struct MinikubeProfile {
    pub name: String,
}

impl MinikubeProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Probe the profile host state. `minikube status` exits non-zero for a
    /// stopped or missing profile, so the exit status is not the answer here;
    /// the formatted host field is.
    pub fn is_running(&self) -> Result<bool> {
        let output = Command::new("minikube")
            .args(["status", "-p", self.name.as_str(), "--format", "{{.Host}}"])
            .output()
            .context("Failed to run minikube status")?;

        let host = String::from_utf8_lossy(&output.stdout);
        Ok(host_is_running(&host))
    }

    /// Readiness probe: abort with an actionable error unless the profile is up
    pub fn ensure_running(&self) -> Result<()> {
        crate::log_info!("Checking minikube profile '{}'...", self.name);

        if self.is_running()? {
            crate::log_info!("Minikube profile '{}' is running", self.name);
            return Ok(());
        }

        let err = MonitoringDevError::cluster_not_running(&self.name);
        Err(anyhow!(err))
    }

    /// Get the node IP of the profile
    pub fn ip(&self) -> Result<String> {
        let output = Command::new("minikube")
            .args(["ip", "-p", self.name.as_str()])
            .output()
            .context("Failed to run minikube ip")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "Failed to get minikube IP for profile '{}': {}",
                self.name,
                stderr.trim()
            ));
        }

        Ok(String::from_utf8(output.stdout)?.trim().to_string())
    }

    /// Load a locally built image into the profile's container runtime
    pub fn load_image(&self, image: &str) -> Result<()> {
        if dryrun::is_dry_run() {
            dryrun::log_action(&format!(
                "minikube image load {} -p {}",
                image, self.name
            ));
            return Ok(());
        }

        crate::log_info!("Loading image into minikube: {}", image);

        let status = Command::new("minikube")
            .args(["image", "load", image, "-p", self.name.as_str()])
            .status()
            .with_context(|| format!("Failed to load image {} into minikube", image))?;

        if !status.success() {
            return Err(anyhow!("minikube image load failed for {}", image));
        }

        Ok(())
    }

    /// NodePort endpoint URL for a service exposed on this profile's node IP
    pub fn node_port_url(&self, node_port: u16) -> Result<String> {
        let ip = self.ip()?;
        Ok(format_node_port_url(&ip, node_port))
    }
}

/// True when the formatted `{{.Host}}` field reports a running host
fn host_is_running(status_output: &str) -> bool {
    status_output.trim() == "Running"
}

/// Assemble the http endpoint for a NodePort service
fn format_node_port_url(ip: &str, node_port: u16) -> String {
    format!("http://{}:{}", ip, node_port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_is_running() {
        assert!(host_is_running("Running"));
        assert!(host_is_running("Running\n"));
        assert!(!host_is_running("Stopped"));
        assert!(!host_is_running(""));
        assert!(!host_is_running("Nonexistent"));
    }

    #[test]
    fn test_format_node_port_url() {
        assert_eq!(
            format_node_port_url("192.168.49.2", 30000),
            "http://192.168.49.2:30000"
        );
        assert_eq!(
            format_node_port_url("192.168.49.2", 32000),
            "http://192.168.49.2:32000"
        );
    }

    #[test]
    fn test_profile_name() {
        let profile = MinikubeProfile::new("minikube");
        assert_eq!(profile.name, "minikube");
    }
}
