//! monitoring-dev CLI - deploy and tear down a minikube monitoring stack

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::Colorize;
use monitoring_dev::config::Settings;
use monitoring_dev::utils::{CommonPrereqs, Prerequisite, dryrun, errors, preflight};
use monitoring_dev::{log_error, log_info};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "monitoring-dev")]
#[command(author, version, about = "Development CLI tool for the minikube monitoring stack", long_about = None)]
struct Cli {
    /// Verbose output (can be used multiple times: -v, -vv)
    /// -v: DEBUG, -vv: TRACE
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Dry-run mode: show what would be done without making changes
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the monitoring stack (Prometheus, Grafana, kube-state-metrics, node-exporter)
    Setup {
        /// Path to kubeconfig file
        #[arg(short, long, env = "KUBECONFIG")]
        kubeconfig: Option<String>,

        /// Also deploy the sample test application
        #[arg(long)]
        with_test_app: bool,

        /// Skip preflight checks
        #[arg(long)]
        skip_preflight: bool,
    },

    /// Tear down the monitoring stack and the test application
    Cleanup {
        /// Path to kubeconfig file
        #[arg(short, long, env = "KUBECONFIG")]
        kubeconfig: Option<String>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage the sample test application
    TestApp {
        #[command(subcommand)]
        command: TestAppCommands,
    },

    /// Show stack status and endpoints
    Status {
        /// Path to kubeconfig file
        #[arg(short, long, env = "KUBECONFIG")]
        kubeconfig: Option<String>,
    },

    /// Check prerequisites and cluster reachability
    Check {
        /// Path to kubeconfig file
        #[arg(short, long, env = "KUBECONFIG")]
        kubeconfig: Option<String>,
    },

    /// Interactive debugging menu
    Interactive {
        /// Path to kubeconfig file
        #[arg(short, long, env = "KUBECONFIG")]
        kubeconfig: Option<String>,
    },

    /// Show the resolved configuration
    Config {
        /// Print an example configuration file instead
        #[arg(long)]
        example: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum TestAppCommands {
    /// Deploy the test application
    Deploy {
        /// Path to kubeconfig file
        #[arg(short, long, env = "KUBECONFIG")]
        kubeconfig: Option<String>,

        /// Image to deploy (defaults to the configured test_app.image)
        #[arg(long)]
        image: Option<String>,

        /// Load the image into minikube before deploying
        #[arg(long)]
        load_image: bool,
    },

    /// Delete the test application
    Delete {
        /// Path to kubeconfig file
        #[arg(short, long, env = "KUBECONFIG")]
        kubeconfig: Option<String>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging based on verbosity level
    let log_level = match cli.verbose {
        0 => "info",  // Default
        1 => "debug", // -v: debug level
        _ => "trace", // -vv: trace level
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    if cli.dry_run {
        dryrun::set_dry_run(true);
        log_info!("DRY RUN MODE: No changes will be made");
        println!();
    }

    let settings = Settings::load();

    let result = match cli.command {
        Commands::Setup {
            kubeconfig,
            with_test_app,
            skip_preflight,
        } => handle_setup_command(&settings, kubeconfig, with_test_app, skip_preflight),
        Commands::Cleanup { kubeconfig, yes } => handle_cleanup_command(&settings, kubeconfig, yes),
        Commands::TestApp { command } => handle_test_app_command(&settings, command),
        Commands::Status { kubeconfig } => handle_status_command(&settings, kubeconfig),
        Commands::Check { kubeconfig } => handle_check_command(&settings, kubeconfig),
        Commands::Interactive { kubeconfig } => {
            handle_interactive_command(&settings, kubeconfig)
        }
        Commands::Config { example } => handle_config_command(&settings, example),
        Commands::Completion { shell } => handle_completion_command(shell),
        Commands::Version => handle_version_command(),
    };

    if let Err(err) = result {
        errors::display_error_and_exit(errors::enhance_error(err));
    }
}

/// Resolve the kubeconfig path: CLI flag/env first, then the settings file
fn resolve_kubeconfig(cli_arg: Option<String>, settings: &Settings) -> Option<PathBuf> {
    cli_arg
        .map(PathBuf::from)
        .or_else(|| settings.defaults.kubeconfig_path.as_ref().map(PathBuf::from))
}

fn handle_setup_command(
    settings: &Settings,
    kubeconfig: Option<String>,
    with_test_app: bool,
    skip_preflight: bool,
) -> Result<()> {
    let kc = resolve_kubeconfig(kubeconfig, settings);

    monitoring_dev::commands::setup::setup(
        settings,
        monitoring_dev::commands::setup::SetupOptions {
            with_test_app,
            skip_preflight,
        },
        kc.as_deref(),
    )
}

fn handle_cleanup_command(
    settings: &Settings,
    kubeconfig: Option<String>,
    yes: bool,
) -> Result<()> {
    let kc = resolve_kubeconfig(kubeconfig, settings);
    monitoring_dev::commands::cleanup::cleanup(settings, yes, kc.as_deref())
}

fn handle_test_app_command(settings: &Settings, command: TestAppCommands) -> Result<()> {
    match command {
        TestAppCommands::Deploy {
            kubeconfig,
            image,
            load_image,
        } => {
            let kc = resolve_kubeconfig(kubeconfig, settings);
            monitoring_dev::commands::test_app::deploy(
                settings,
                monitoring_dev::commands::test_app::DeployOptions { image, load_image },
                kc.as_deref(),
            )
        }
        TestAppCommands::Delete { kubeconfig, yes } => {
            let kc = resolve_kubeconfig(kubeconfig, settings);
            monitoring_dev::commands::test_app::delete(settings, yes, kc.as_deref())
        }
    }
}

fn handle_status_command(settings: &Settings, kubeconfig: Option<String>) -> Result<()> {
    let kc = resolve_kubeconfig(kubeconfig, settings);
    monitoring_dev::commands::status::status(settings, kc.as_deref())
}

fn handle_check_command(settings: &Settings, kubeconfig: Option<String>) -> Result<()> {
    log_info!("Checking prerequisites...");

    let kubectl = CommonPrereqs::kubectl();
    let minikube = CommonPrereqs::minikube();
    let prereqs: Vec<&dyn Prerequisite> = vec![&kubectl, &minikube];

    let (found, missing) = CommonPrereqs::check_all(&prereqs);

    for name in &found {
        println!("  {} {}", "✓".green(), name);
    }

    if !missing.is_empty() {
        for (name, hint) in &missing {
            println!("  {} {} ({})", "✗".red(), name, hint);
        }
        log_error!("Missing prerequisites");
        std::process::exit(1);
    }

    let kc = resolve_kubeconfig(kubeconfig, settings);
    let mut checker = preflight::PreflightChecker::new();
    checker.run_all(&settings.stack.namespace, kc.as_deref())?;

    if !checker.display_results() {
        std::process::exit(1);
    }

    Ok(())
}

fn handle_interactive_command(settings: &Settings, kubeconfig: Option<String>) -> Result<()> {
    let kc = resolve_kubeconfig(kubeconfig, settings);
    monitoring_dev::commands::interactive::show_menu(settings, kc.as_deref())
}

fn handle_config_command(settings: &Settings, example: bool) -> Result<()> {
    if example {
        println!("{}", Settings::example_config());
    } else {
        println!("{}", toml::to_string_pretty(settings)?);
    }
    Ok(())
}

fn handle_completion_command(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "monitoring-dev", &mut io::stdout());
    Ok(())
}

fn handle_version_command() -> Result<()> {
    println!("monitoring-dev {}", env!("CARGO_PKG_VERSION"));
    println!("Development CLI tool for the minikube monitoring stack");
    Ok(())
}
