//! Enhanced error types with actionable suggestions

use colored::Colorize;
use thiserror::Error;

/// Enhanced error with suggestions and documentation links
#[derive(Error, Debug)]
#[error("{message}")]
pub struct MonitoringDevError {
    pub message: String,
    pub suggestions: Vec<String>,
    pub docs_link: Option<String>,
}

impl MonitoringDevError {
    /// Create a new error with suggestions
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestions: Vec::new(),
            docs_link: None,
        }
    }

    /// Add a suggestion to the error
    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a documentation link
    pub fn with_docs(mut self, link: impl Into<String>) -> Self {
        self.docs_link = Some(link.into());
        self
    }

    /// Display the error with suggestions
    pub fn display(&self) {
        crate::log_error!("{}", self.message);

        if !self.suggestions.is_empty() {
            println!();
            println!("{}", "Suggestions:".yellow().bold());
            for suggestion in &self.suggestions {
                println!("  {} {}", "→".blue(), suggestion);
            }
        }

        if let Some(docs) = &self.docs_link {
            println!();
            println!("{} {}", "Documentation:".cyan(), docs);
        }
    }

    // Common error patterns

    /// Minikube cluster not running error
    pub fn cluster_not_running(profile: &str) -> Self {
        Self::new(format!("Minikube profile '{}' is not running", profile))
            .suggest(format!("Start it with: minikube start -p {}", profile))
            .suggest("Check profile state with: minikube status")
            .with_docs("https://minikube.sigs.k8s.io/docs/start/")
    }

    /// Cluster unreachable error
    pub fn cluster_unreachable() -> Self {
        Self::new("Cannot connect to the Kubernetes cluster")
            .suggest("Verify minikube is running: minikube status")
            .suggest("Check kubectl context: kubectl config current-context")
            .suggest("Use --kubeconfig to point at the right cluster")
    }

    /// Tool not found error
    pub fn tool_not_found(tool: &str, install_hint: &str) -> Self {
        Self::new(format!("Required tool '{}' not found", tool))
            .suggest(format!("Install with: {}", install_hint))
            .suggest("Ensure the tool is in your PATH")
    }

    /// Deployment not ready error
    pub fn deployment_not_ready(name: &str, namespace: &str) -> Self {
        Self::new(format!(
            "Deployment {}/{} failed to become ready",
            namespace, name
        ))
        .suggest(format!(
            "Check pod status: kubectl get pods -n {}",
            namespace
        ))
        .suggest(format!(
            "View logs: kubectl logs -n {} -l app={}",
            namespace, name
        ))
        .suggest("Increase the ready timeout in .monitoring-dev.toml")
    }

    /// Connection timeout error
    pub fn wait_timeout(resource: &str) -> Self {
        Self::new(format!("Timeout waiting for {}", resource))
            .suggest("Check if the cluster is healthy")
            .suggest("Check for pending pods: kubectl get pods --all-namespaces")
            .suggest("Increase the ready timeout in .monitoring-dev.toml")
    }

    /// Permission denied error
    pub fn permission_denied(operation: &str) -> Self {
        Self::new(format!("Permission denied: {}", operation))
            .suggest("Verify you have sufficient cluster permissions")
            .suggest("Check if you need cluster-admin role")
    }
}

/// Helper to display error and exit
pub fn display_error_and_exit(error: MonitoringDevError) -> ! {
    error.display();
    std::process::exit(1);
}

/// Convert anyhow error to MonitoringDevError when possible
pub fn enhance_error(err: anyhow::Error) -> MonitoringDevError {
    // Already enhanced somewhere below: keep its suggestions
    let err = match err.downcast::<MonitoringDevError>() {
        Ok(enhanced) => return enhanced,
        Err(err) => err,
    };

    let err_str = err.to_string();

    // Pattern match common kubectl/minikube failure strings
    if err_str.contains("connection refused") || err_str.contains("Unable to connect") {
        return MonitoringDevError::cluster_unreachable();
    }

    if err_str.contains("timed out") || err_str.contains("timeout") {
        return MonitoringDevError::wait_timeout("resource");
    }

    if err_str.contains("unauthorized") || err_str.contains("forbidden") {
        return MonitoringDevError::permission_denied("cluster operation");
    }

    // Default error with generic suggestion
    MonitoringDevError::new(err_str)
        .suggest("Run with --verbose for more details")
        .suggest("Check logs for additional context")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_not_running_error() {
        let err = MonitoringDevError::cluster_not_running("minikube");
        assert!(err.message.contains("minikube"));
        assert_eq!(err.suggestions.len(), 2);
        assert!(err.docs_link.is_some());
    }

    #[test]
    fn test_error_suggestions() {
        let err = MonitoringDevError::new("test")
            .suggest("suggestion 1")
            .suggest("suggestion 2");
        assert_eq!(err.suggestions.len(), 2);
    }

    #[test]
    fn test_enhance_error_connection_refused() {
        let err = anyhow::anyhow!("dial tcp 192.168.49.2:8443: connection refused");
        let enhanced = enhance_error(err);
        assert!(enhanced.message.contains("Cannot connect"));
    }

    #[test]
    fn test_enhance_error_preserves_enhanced() {
        let original = MonitoringDevError::cluster_not_running("minikube");
        let err = anyhow::anyhow!(original);
        let enhanced = enhance_error(err);
        assert!(enhanced.message.contains("not running"));
        assert_eq!(enhanced.suggestions.len(), 2);
    }

    #[test]
    fn test_enhance_error_timeout() {
        let err = anyhow::anyhow!("error: timed out waiting for the condition on deployments/grafana");
        let enhanced = enhance_error(err);
        assert!(enhanced.message.contains("Timeout"));
    }
}
