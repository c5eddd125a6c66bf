//! Configuration file support for monitoring-dev

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub stack: StackSettings,

    #[serde(default)]
    pub test_app: TestAppSettings,

    #[serde(default)]
    pub behavior: Behavior,

    #[serde(default)]
    pub timeouts: Timeouts,

    #[serde(default)]
    pub images: Images,
}

/// Default values for common operations
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Defaults {
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Optional kubeconfig path passed to every kubectl invocation.
    /// If not set, kubectl's own resolution (KUBECONFIG, ~/.kube/config) applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig_path: Option<String>,
}

/// Monitoring stack settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StackSettings {
    #[serde(default = "default_stack_namespace")]
    pub namespace: String,

    #[serde(default = "default_prometheus_node_port")]
    pub prometheus_node_port: u16,

    #[serde(default = "default_grafana_node_port")]
    pub grafana_node_port: u16,
}

/// Test application settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TestAppSettings {
    #[serde(default = "default_test_app_namespace")]
    pub namespace: String,

    #[serde(default = "default_test_app_image")]
    pub image: String,

    #[serde(default = "default_test_app_node_port")]
    pub node_port: u16,

    #[serde(default = "default_test_app_replicas")]
    pub replicas: u32,
}

/// Behavior settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Behavior {
    #[serde(default = "default_true")]
    pub confirm_destructive: bool,

    #[serde(default = "default_true")]
    pub show_progress: bool,
}

/// Timeouts passed through verbatim to kubectl wait/delete
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Timeouts {
    #[serde(default = "default_ready_timeout")]
    pub ready: String,

    #[serde(default = "default_delete_timeout")]
    pub delete: String,
}

/// Container images deployed by the stack
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Images {
    #[serde(default = "default_prometheus_image")]
    pub prometheus: String,

    #[serde(default = "default_grafana_image")]
    pub grafana: String,

    #[serde(default = "default_kube_state_metrics_image")]
    pub kube_state_metrics: String,

    #[serde(default = "default_node_exporter_image")]
    pub node_exporter: String,
}

// Default value functions
fn default_profile() -> String {
    "minikube".to_string()
}

fn default_stack_namespace() -> String {
    "monitoring".to_string()
}

fn default_test_app_namespace() -> String {
    "test-autoscaler".to_string()
}

fn default_test_app_image() -> String {
    "test-app:latest".to_string()
}

fn default_prometheus_node_port() -> u16 {
    30000
}

fn default_grafana_node_port() -> u16 {
    32000
}

fn default_test_app_node_port() -> u16 {
    30500
}

fn default_test_app_replicas() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_ready_timeout() -> String {
    "300s".to_string()
}

fn default_delete_timeout() -> String {
    "60s".to_string()
}

fn default_prometheus_image() -> String {
    "prom/prometheus:v2.53.0".to_string()
}

fn default_grafana_image() -> String {
    "grafana/grafana:10.4.2".to_string()
}

fn default_kube_state_metrics_image() -> String {
    "registry.k8s.io/kube-state-metrics/kube-state-metrics:v2.12.0".to_string()
}

fn default_node_exporter_image() -> String {
    "prom/node-exporter:v1.8.1".to_string()
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            kubeconfig_path: None,
        }
    }
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            namespace: default_stack_namespace(),
            prometheus_node_port: default_prometheus_node_port(),
            grafana_node_port: default_grafana_node_port(),
        }
    }
}

impl Default for TestAppSettings {
    fn default() -> Self {
        Self {
            namespace: default_test_app_namespace(),
            image: default_test_app_image(),
            node_port: default_test_app_node_port(),
            replicas: default_test_app_replicas(),
        }
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            confirm_destructive: default_true(),
            show_progress: default_true(),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            ready: default_ready_timeout(),
            delete: default_delete_timeout(),
        }
    }
}

impl Default for Images {
    fn default() -> Self {
        Self {
            prometheus: default_prometheus_image(),
            grafana: default_grafana_image(),
            kube_state_metrics: default_kube_state_metrics_image(),
            node_exporter: default_node_exporter_image(),
        }
    }
}

impl Settings {
    /// Load settings from file or return defaults
    pub fn load() -> Self {
        if let Some(path) = Self::find_config_file() {
            Self::load_from_file(&path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Find config file in standard locations
    /// Priority:
    /// 1. .monitoring-dev.toml in current directory
    /// 2. ~/.config/monitoring-dev/config.toml (XDG config directory)
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory
        let local_config = PathBuf::from(".monitoring-dev.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        // Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("monitoring-dev").join("config.toml");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }

        None
    }

    /// Save settings to file
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example config file content
    pub fn example_config() -> String {
        let example = Settings::default();
        let header = "# monitoring-dev configuration file\n\
                      # Place this file at ~/.config/monitoring-dev/config.toml or .monitoring-dev.toml in your project\n\n";

        match toml::to_string_pretty(&example) {
            Ok(config) => format!("{}{}", header, config),
            Err(_) => header.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.defaults.profile, "minikube");
        assert_eq!(settings.stack.namespace, "monitoring");
        assert_eq!(settings.test_app.namespace, "test-autoscaler");
        assert_eq!(settings.stack.prometheus_node_port, 30000);
        assert_eq!(settings.stack.grafana_node_port, 32000);
        assert_eq!(settings.test_app.node_port, 30500);
        assert_eq!(settings.timeouts.ready, "300s");
        assert_eq!(settings.timeouts.delete, "60s");
        assert!(settings.behavior.confirm_destructive);
        assert!(settings.behavior.show_progress);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        assert!(toml_str.contains("prometheus_node_port"));
        assert!(toml_str.contains("monitoring"));
    }

    #[test]
    fn test_settings_deserialization() {
        let toml_str = r#"
[defaults]
profile = "experiments"

[stack]
namespace = "observability"
prometheus_node_port = 30100

[behavior]
confirm_destructive = false
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.defaults.profile, "experiments");
        assert_eq!(settings.stack.namespace, "observability");
        assert_eq!(settings.stack.prometheus_node_port, 30100);
        // Unset fields fall back to defaults
        assert_eq!(settings.stack.grafana_node_port, 32000);
        assert_eq!(settings.timeouts.ready, "300s");
        assert!(!settings.behavior.confirm_destructive);
    }

    #[test]
    fn test_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.test_app.image = "test-app:v2".to_string();
        settings.save(&path).unwrap();

        let loaded = Settings::load_from_file(&path).unwrap();
        assert_eq!(loaded.test_app.image, "test-app:v2");
        assert_eq!(loaded.stack.namespace, "monitoring");
    }

    #[test]
    fn test_example_config() {
        let example = Settings::example_config();
        assert!(example.contains("monitoring-dev configuration"));
        assert!(example.contains("[defaults]"));
        assert!(example.contains("[stack]"));
        assert!(example.contains("[timeouts]"));
    }
}
