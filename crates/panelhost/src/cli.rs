//! Handlers for `panelhost plugin ...`.
//!
//! Everything printed to stdout is meant for the user; diagnostics go
//! through `log` to stderr.
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use panelhost_core::kernel::{DashboardHost, Error, Result};
use panelhost_core::plugin_system::{ConfigFieldType, PluginCategory, PluginDefinition, PluginSystemError};
use panelhost_core::provider::PluginProvider;
use panelhost_core::renderer::{PluginView, RenderSurface};
use panelhost_core::utils::merge_config;

use crate::{ConfigCommand, PluginCommand};

pub async fn run_plugin_command(host: &DashboardHost, command: &PluginCommand) -> Result<()> {
    match command {
        PluginCommand::List { category, sidebar, core } => list(host, category.as_deref(), *sidebar, *core),
        PluginCommand::Search { query } => {
            search(host, query);
            Ok(())
        }
        PluginCommand::Status => status(host).await,
        PluginCommand::Enable { name } => set_enabled(host, name, true).await,
        PluginCommand::Disable { name } => set_enabled(host, name, false).await,
        PluginCommand::Config { command } => match command {
            ConfigCommand::Get { name } => config_get(host, name).await,
            ConfigCommand::Set { name, values } => config_set(host, name, values).await,
        },
        PluginCommand::Render { name } => render(host, name, RenderSurface::Main).await,
        PluginCommand::Settings { name } => render(host, name, RenderSurface::Settings).await,
    }
}

fn describe(definition: &PluginDefinition) -> String {
    let mut line = format!(
        "  - {} ({}) v{} [{}]",
        definition.name, definition.display_name, definition.version, definition.category
    );
    if definition.is_core {
        line.push_str(" core");
    }
    if definition.sidebar.show_in_sidebar {
        line.push_str(&format!(" sidebar:{}", definition.sidebar.effective_order()));
    }
    line
}

fn print_definitions(definitions: &[Arc<PluginDefinition>]) {
    if definitions.is_empty() {
        println!("  No plugins found.");
    }
    for definition in definitions {
        println!("{}", describe(definition));
    }
}

fn list(host: &DashboardHost, category: Option<&str>, sidebar_only: bool, core_only: bool) -> Result<()> {
    let category = category.map(PluginCategory::from_str).transpose()?;
    let registry = host.registry();
    let base = if sidebar_only { registry.get_sidebar_plugins() } else { registry.get_all() };
    let definitions: Vec<_> = base
        .into_iter()
        .filter(|d| category.is_none_or(|c| d.category == c))
        .filter(|d| !core_only || d.is_core)
        .collect();

    println!("Registered plugins:");
    print_definitions(&definitions);
    Ok(())
}

fn search(host: &DashboardHost, query: &str) {
    let definitions = host.registry().search(query);
    println!("Plugins matching '{}':", query);
    print_definitions(&definitions);
}

fn require_registered(host: &DashboardHost, name: &str) -> Result<Arc<PluginDefinition>> {
    host.registry().get(name).ok_or_else(|| {
        PluginSystemError::NotRegistered {
            plugin_id: name.to_string(),
        }
        .into()
    })
}

/// Open an authenticated session whose plugin list loaded successfully.
async fn session(host: &DashboardHost) -> Result<PluginProvider> {
    let token = host
        .config()
        .token
        .clone()
        .ok_or_else(|| Error::Other("No session token: pass --token or set PANELHOST_TOKEN".to_string()))?;
    let provider = host.open_session(Some(token)).await?;
    match provider.error() {
        Some(message) => Err(Error::Other(message)),
        None => Ok(provider),
    }
}

async fn status(host: &DashboardHost) -> Result<()> {
    let provider = session(host).await?;
    println!("Plugin status:");
    for (definition, enabled) in provider.available_plugins() {
        println!(
            "  - {}: {}",
            definition.name,
            if enabled { "Enabled" } else { "Disabled" }
        );
    }

    let unknown: Vec<_> = provider
        .user_plugins()
        .into_iter()
        .filter(|p| !host.registry().contains(&p.plugin_name))
        .collect();
    for entry in unknown {
        println!(
            "  - {}: {} (not installed on this host)",
            entry.plugin_name,
            if entry.enabled { "Enabled" } else { "Disabled" }
        );
    }
    Ok(())
}

async fn set_enabled(host: &DashboardHost, name: &str, enabled: bool) -> Result<()> {
    require_registered(host, name)?;
    let provider = session(host).await?;
    if enabled {
        provider.enable_plugin(name).await?;
        println!("Plugin '{}' enabled.", name);
    } else {
        provider.disable_plugin(name).await?;
        println!("Plugin '{}' disabled.", name);
    }
    Ok(())
}

fn mask(field_type: Option<&ConfigFieldType>, value: &str) -> String {
    match field_type {
        Some(ConfigFieldType::Secret) if !value.is_empty() => "********".to_string(),
        _ => value.to_string(),
    }
}

async fn config_get(host: &DashboardHost, name: &str) -> Result<()> {
    let definition = require_registered(host, name)?;
    let provider = session(host).await?;
    let config = provider.get_plugin_config(name);

    println!("Config for '{}':", name);
    let Some(schema) = &definition.config_schema else {
        let sorted: BTreeMap<_, _> = config.iter().collect();
        if sorted.is_empty() {
            println!("  (empty)");
        }
        for (key, value) in sorted {
            println!("  {} = {}", key, value);
        }
        return Ok(());
    };

    for (key, field) in schema.iter() {
        match config.get(key).or(field.default.as_ref()) {
            Some(value) => {
                let marker = if config.contains_key(key) { "" } else { " (default)" };
                println!("  {} = {}{}", key, mask(Some(&field.field_type), value), marker);
            }
            None => println!("  {} is unset", key),
        }
    }
    let extra: BTreeMap<_, _> = config.iter().filter(|(k, _)| schema.get(k).is_none()).collect();
    for (key, value) in extra {
        println!("  {} = {} (not in schema)", key, value);
    }
    Ok(())
}

fn parse_assignments(raw: &[String]) -> Result<HashMap<String, String>> {
    raw.iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
            _ => Err(Error::Other(format!("Expected KEY=VALUE, got '{}'", pair))),
        })
        .collect()
}

async fn config_set(host: &DashboardHost, name: &str, raw: &[String]) -> Result<()> {
    let definition = require_registered(host, name)?;
    let partial = parse_assignments(raw)?;
    let provider = session(host).await?;

    // Validate the config as it will look after the merge.
    if let Some(schema) = &definition.config_schema {
        let merged = merge_config(&provider.get_plugin_config(name), &partial);
        if let Err(violations) = schema.validate(&merged) {
            for violation in &violations {
                eprintln!("  {}", violation);
            }
            return Err(Error::Other(format!(
                "{} invalid config value(s) for plugin '{}'",
                violations.len(),
                name
            )));
        }
    }

    let updated = provider.update_plugin_config(name, partial).await?;
    println!("Updated config for '{}' ({} keys).", name, updated.len());
    Ok(())
}

async fn render(host: &DashboardHost, name: &str, surface: RenderSurface) -> Result<()> {
    if surface == RenderSurface::Settings {
        require_registered(host, name)?;
    }
    let provider = session(host).await?;
    let mut renderer = match surface {
        RenderSurface::Main => host.renderer(&provider, name),
        RenderSurface::Settings => host.settings_renderer(&provider, name),
    };
    renderer.mount().await;
    let view = renderer.render();
    let failure = renderer.failure().cloned();
    renderer.unmount();

    println!("{}", view);
    if let Some(failure) = failure {
        return Err(failure.into());
    }
    if let PluginView::NotFound { plugin, .. } = view {
        if !host.registry().contains(&plugin) {
            return Err(PluginSystemError::NotRegistered { plugin_id: plugin }.into());
        }
    }
    Ok(())
}
