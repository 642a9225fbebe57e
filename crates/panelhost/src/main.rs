mod cli;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, error};

use panelhost_core::kernel::constants::{APP_NAME, APP_VERSION};
use panelhost_core::kernel::{DashboardHost, Result as KernelResult};
use panelhost_core::plugin_system::PluginRegistry;
use panelhost_core::storage::HostConfig;

/// Panelhost: dashboard plugin host
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Print "pong" and exit; a quick liveness check
    #[arg(long)]
    ping: bool,

    /// Verbose log output on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Host config file (.json, .yaml or .toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Backend base URL; overrides the config file and PANELHOST_API_URL
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Session token; overrides PANELHOST_TOKEN
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage plugins
    Plugin {
        #[command(subcommand)]
        command: PluginCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum PluginCommand {
    /// List registered plugins
    List {
        /// Only plugins of this category
        #[arg(long)]
        category: Option<String>,
        /// Only sidebar plugins, in sidebar order
        #[arg(long)]
        sidebar: bool,
        /// Only core plugins
        #[arg(long)]
        core: bool,
    },
    /// Search registered plugins by name, description or tag
    Search { query: String },
    /// Show which plugins are enabled for the current user
    Status,
    /// Enable a plugin for the current user
    Enable { name: String },
    /// Disable a plugin for the current user
    Disable { name: String },
    /// Read or change a plugin's config
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Mount a plugin, render it once and unmount it
    Render { name: String },
    /// Mount a plugin's settings page, render it once and unmount it
    Settings { name: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show a plugin's config
    Get { name: String },
    /// Merge KEY=VALUE pairs into a plugin's config
    Set {
        name: String,
        #[arg(required = true, value_name = "KEY=VALUE")]
        values: Vec<String>,
    },
}

/// Statically register the first-party plugins.
fn register_core_plugins(registry: &PluginRegistry) -> KernelResult<()> {
    core_chat::register(registry)?;
    core_drive::register(registry)?;
    debug!("Registered {} core plugins", registry.get_core_plugins().len());
    Ok(())
}

/// Defaults, then the config file, then the environment, then flags.
fn load_config(args: &CliArgs) -> KernelResult<HostConfig> {
    let config = match &args.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if let Some(url) = &args.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(token) = &args.token {
        config.token = Some(token.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    logging::init(args.verbose);

    let registry = PluginRegistry::global();
    if let Err(e) = register_core_plugins(&registry) {
        eprintln!("Fatal: failed to register core plugins: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(Commands::Plugin { command }) = &args.command else {
        println!("{} v{}: {} plugins registered.", APP_NAME, APP_VERSION, registry.len());
        println!("Run `panelhost plugin --help` for available commands.");
        return ExitCode::SUCCESS;
    };

    let host = match load_config(&args).and_then(DashboardHost::from_config) {
        Ok(host) => host,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli::run_plugin_command(&host, command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
