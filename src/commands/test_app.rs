//! Test application command implementations

use anyhow::Result;
use std::path::Path;

use crate::config::Settings;
use crate::install::{namespace, test_app};
use crate::k8s::kubectl;
use crate::k8s::minikube::MinikubeProfile;
use crate::utils::dryrun;

/// Options for deploying the test application
pub struct DeployOptions {
    /// Image override; defaults to the configured test_app.image
    pub image: Option<String>,
    /// Load the image from the local container runtime into minikube first
    pub load_image: bool,
}

/// Deploy the test application into its own namespace
pub fn deploy(settings: &Settings, options: DeployOptions, kubeconfig: Option<&Path>) -> Result<()> {
    let image = options
        .image
        .as_deref()
        .unwrap_or(&settings.test_app.image);

    let profile = MinikubeProfile::new(&settings.defaults.profile);
    profile.ensure_running()?;

    if options.load_image {
        profile.load_image(image)?;
    }

    namespace::ensure(&settings.test_app.namespace, kubeconfig)?;
    test_app::install(settings, image, kubeconfig)?;

    match profile.node_port_url(settings.test_app.node_port) {
        Ok(url) => {
            crate::log_info!("");
            crate::log_info!("Test application available at: {}", url);
            crate::log_info!("Metrics endpoint: {}/metrics", url);
            crate::log_info!("");
        }
        Err(_) => {
            crate::log_warn!(
                "Could not determine minikube IP; test app NodePort is {}",
                settings.test_app.node_port
            );
        }
    }

    Ok(())
}

/// Delete the test application and its namespace, existence-checked
pub fn delete(settings: &Settings, assume_yes: bool, kubeconfig: Option<&Path>) -> Result<()> {
    if settings.behavior.confirm_destructive && !assume_yes && !dryrun::is_dry_run() {
        let prompt = format!(
            "Delete the test application in namespace '{}'?",
            settings.test_app.namespace
        );
        if !crate::utils::confirm(&prompt)? {
            crate::log_info!("Deletion cancelled");
            return Ok(());
        }
    }

    let ns = settings.test_app.namespace.as_str();
    let timeout = &settings.timeouts.delete;

    for (kind, name, namespace) in [
        ("service", "test-app", Some(ns)),
        ("deployment", "test-app", Some(ns)),
        ("namespace", ns, None),
    ] {
        if kubectl::resource_exists(kind, name, namespace, kubeconfig)? {
            crate::log_info!("Deleting {} '{}'...", kind, name);
            kubectl::delete_resource(kind, name, namespace, timeout, kubeconfig)?;
        } else {
            crate::log_warn!("{} '{}' not found, skipping", kind, name);
        }
    }

    crate::log_info!("Test application removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_options_default_image() {
        let settings = Settings::default();
        let options = DeployOptions {
            image: None,
            load_image: false,
        };
        let image = options
            .image
            .as_deref()
            .unwrap_or(&settings.test_app.image);
        assert_eq!(image, "test-app:latest");
    }
}
