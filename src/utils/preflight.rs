//! Preflight validation checks before touching the cluster

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::process::Command;

/// Result of a preflight check
#[derive(Debug, Clone)]
pub enum CheckResult {
    Pass(String),
    Warn(String),
    Fail(String),
}

impl CheckResult {
    pub fn is_error(&self) -> bool {
        matches!(self, CheckResult::Fail(_))
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, CheckResult::Warn(_))
    }

    pub fn display(&self) {
        match self {
            CheckResult::Pass(msg) => {
                println!("  {} {}", "✓".green(), msg);
            }
            CheckResult::Warn(msg) => {
                println!("  {} {}", "⚠".yellow(), msg);
            }
            CheckResult::Fail(msg) => {
                println!("  {} {}", "✗".red(), msg);
            }
        }
    }
}

/// Preflight checker run before stack deployment
pub struct PreflightChecker {
    checks: Vec<CheckResult>,
}

impl PreflightChecker {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Run all preflight checks
    pub fn run_all(&mut self, namespace: &str, kubeconfig: Option<&Path>) -> Result<()> {
        crate::log_info!("Running preflight checks...");
        println!();

        self.check_cluster_connection(kubeconfig)?;
        self.check_server_version(kubeconfig)?;
        self.check_existing_installation(namespace, kubeconfig)?;

        Ok(())
    }

    /// Display results and return whether deployment should continue
    pub fn display_results(&self) -> bool {
        println!();

        let errors = self.checks.iter().filter(|c| c.is_error()).count();
        let warnings = self.checks.iter().filter(|c| c.is_warning()).count();

        for check in &self.checks {
            check.display();
        }

        println!();

        if errors > 0 {
            println!("{} error(s), {} warning(s)", errors, warnings);
            false
        } else if warnings > 0 {
            println!(
                "{} warning(s). Deployment may continue but proceed with caution.",
                warnings
            );
            true
        } else {
            println!("{}", "All checks passed!".green());
            true
        }
    }

    /// Check if cluster is reachable
    fn check_cluster_connection(&mut self, kubeconfig: Option<&Path>) -> Result<()> {
        let mut cmd = Command::new("kubectl");
        if let Some(kc) = kubeconfig {
            cmd.env("KUBECONFIG", kc);
        }

        cmd.args(["cluster-info"]);

        match cmd.output() {
            Ok(output) if output.status.success() => {
                self.checks
                    .push(CheckResult::Pass("Cluster is reachable".to_string()));
            }
            _ => {
                self.checks
                    .push(CheckResult::Fail("Cannot connect to cluster".to_string()));
            }
        }

        Ok(())
    }

    /// Check Kubernetes server version
    fn check_server_version(&mut self, kubeconfig: Option<&Path>) -> Result<()> {
        let mut cmd = Command::new("kubectl");
        if let Some(kc) = kubeconfig {
            cmd.env("KUBECONFIG", kc);
        }

        cmd.args(["version", "--output=json"]);

        match cmd.output() {
            Ok(output) if output.status.success() => {
                let version_json = String::from_utf8_lossy(&output.stdout);
                match extract_server_version(&version_json) {
                    Some(version) => {
                        self.checks.push(CheckResult::Pass(format!(
                            "Kubernetes server version: {}",
                            version
                        )));
                    }
                    None => {
                        self.checks.push(CheckResult::Warn(
                            "Could not determine Kubernetes server version".to_string(),
                        ));
                    }
                }
            }
            _ => {
                self.checks.push(CheckResult::Warn(
                    "Could not check Kubernetes server version".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Check for an existing monitoring stack installation
    fn check_existing_installation(
        &mut self,
        namespace: &str,
        kubeconfig: Option<&Path>,
    ) -> Result<()> {
        let mut cmd = Command::new("kubectl");
        if let Some(kc) = kubeconfig {
            cmd.env("KUBECONFIG", kc);
        }

        cmd.args(["get", "namespace", namespace]);

        match cmd.output() {
            Ok(output) if output.status.success() => {
                self.checks.push(CheckResult::Warn(format!(
                    "Namespace '{}' already exists (manifests will be re-applied)",
                    namespace
                )));
            }
            _ => {
                self.checks.push(CheckResult::Pass(format!(
                    "No existing installation in namespace '{}'",
                    namespace
                )));
            }
        }

        Ok(())
    }
}

impl Default for PreflightChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract serverVersion.gitVersion from `kubectl version -o json` output
fn extract_server_version(json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    value
        .get("serverVersion")?
        .get("gitVersion")?
        .as_str()
        .map(|s| s.to_string())
}

/// Quick preflight check with user confirmation
pub fn run_preflight_with_confirm(namespace: &str, kubeconfig: Option<&Path>) -> Result<bool> {
    let mut checker = PreflightChecker::new();
    checker.run_all(namespace, kubeconfig)?;

    let can_continue = checker.display_results();

    if !can_continue {
        return Ok(false);
    }

    // If there are warnings, ask for confirmation
    let has_warnings = checker.checks.iter().any(|c| c.is_warning());
    if has_warnings && !crate::utils::dryrun::is_dry_run() {
        println!();
        return crate::utils::confirm_default_yes("Continue with deployment?");
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_is_error() {
        let pass = CheckResult::Pass("test".to_string());
        let warn = CheckResult::Warn("test".to_string());
        let fail = CheckResult::Fail("test".to_string());

        assert!(!pass.is_error());
        assert!(!warn.is_error());
        assert!(fail.is_error());
    }

    #[test]
    fn test_check_result_is_warning() {
        let pass = CheckResult::Pass("test".to_string());
        let warn = CheckResult::Warn("test".to_string());
        let fail = CheckResult::Fail("test".to_string());

        assert!(!pass.is_warning());
        assert!(warn.is_warning());
        assert!(!fail.is_warning());
    }

    #[test]
    fn test_preflight_checker_new() {
        let checker = PreflightChecker::new();
        assert_eq!(checker.checks.len(), 0);
    }

    #[test]
    fn test_extract_server_version() {
        let json = r#"{
            "clientVersion": {"gitVersion": "v1.31.0"},
            "serverVersion": {"major": "1", "minor": "31", "gitVersion": "v1.31.0"}
        }"#;
        assert_eq!(extract_server_version(json), Some("v1.31.0".to_string()));
    }

    #[test]
    fn test_extract_server_version_malformed() {
        assert_eq!(extract_server_version("not json"), None);
        assert_eq!(extract_server_version(r#"{"clientVersion": {}}"#), None);
    }
}
