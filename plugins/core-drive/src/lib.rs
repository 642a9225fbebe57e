//! File drive browser plugin.
//!
//! The only first-party plugin with a non-trivial [`ConfigSchema`]; the CLI
//! validates `plugin config set drive ...` against it before persisting.
use std::collections::HashMap;
use std::sync::Arc;

use panelhost_core::plugin_system::{
    BoxError, ConfigField, ConfigFieldType, ConfigSchema, LoadedComponent, PluginCategory, PluginComponent,
    PluginDefinition, PluginRegistry, PluginSystemError, RegisterOutcome,
};
use panelhost_core::provider::PluginContext;
use panelhost_core::utils::merge_config;

use log::{debug, info};

/// Registry name of the drive plugin
pub const PLUGIN_NAME: &str = "drive";

pub const VIEW_MODES: [&str; 2] = ["list", "grid"];

const MAX_PAGE_SIZE: u32 = 100;

/// Config schema of the drive plugin
pub fn config_schema() -> ConfigSchema {
    ConfigSchema::new()
        .field(
            "root_folder",
            ConfigField::new(ConfigFieldType::String, "Root folder").default_value("root"),
        )
        .field(
            "view_mode",
            ConfigField::new(
                ConfigFieldType::Select(VIEW_MODES.iter().map(|m| m.to_string()).collect()),
                "View mode",
            )
            .default_value("list"),
        )
        .field(
            "page_size",
            ConfigField::new(ConfigFieldType::Number, "Files per page")
                .default_value("25")
                .validator(|v| match v.trim().parse::<u32>() {
                    Ok(n) if (1..=MAX_PAGE_SIZE).contains(&n) => Ok(()),
                    _ => Err(format!("must be between 1 and {}", MAX_PAGE_SIZE)),
                }),
        )
        .field(
            "show_hidden",
            ConfigField::new(ConfigFieldType::Boolean, "Show hidden files").default_value("false"),
        )
        .field("api_key", ConfigField::new(ConfigFieldType::Secret, "API key"))
}

/// Drive browser panel
#[derive(Debug)]
pub struct DrivePanel {
    defaults: HashMap<String, String>,
}

impl Default for DrivePanel {
    fn default() -> Self {
        Self {
            defaults: config_schema().defaults(),
        }
    }
}

impl DrivePanel {
    fn effective_config(&self, ctx: &PluginContext) -> HashMap<String, String> {
        merge_config(&self.defaults, ctx.config())
    }
}

impl PluginComponent for DrivePanel {
    fn render(&self, ctx: &PluginContext) -> Result<String, BoxError> {
        let config = self.effective_config(ctx);
        let setting = |key: &str| config.get(key).map(String::as_str).unwrap_or_default();

        let page_size: u32 = setting("page_size")
            .trim()
            .parse()
            .map_err(|e| format!("invalid page_size '{}': {}", setting("page_size"), e))?;
        let view_mode = setting("view_mode");
        if !VIEW_MODES.contains(&view_mode) {
            return Err(format!("unknown view_mode '{}'", view_mode).into());
        }
        let hidden = if setting("show_hidden") == "true" { ", hidden files shown" } else { "" };
        let linked = if setting("api_key").is_empty() { "not linked" } else { "linked" };

        Ok(format!(
            "Drive ({})\nFolder: {}\n{} view, {} files per page{}",
            linked,
            setting("root_folder"),
            view_mode,
            page_size,
            hidden
        ))
    }
}

/// Settings page listing each schema field with its effective value.
///
/// Secrets are masked.
#[derive(Debug)]
pub struct DriveSettings {
    schema: ConfigSchema,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            schema: config_schema(),
        }
    }
}

impl PluginComponent for DriveSettings {
    fn render(&self, ctx: &PluginContext) -> Result<String, BoxError> {
        let config = merge_config(&self.schema.defaults(), ctx.config());
        let mut lines = vec!["Drive settings".to_string()];
        for (key, field) in self.schema.iter() {
            let value = config.get(key).map(String::as_str).unwrap_or_default();
            let shown = match field.field_type {
                ConfigFieldType::Secret if !value.is_empty() => "********",
                _ if value.is_empty() => "(unset)",
                _ => value,
            };
            lines.push(format!("  {}: {}", field.label, shown));
        }
        Ok(lines.join("\n"))
    }
}

/// Definition of the drive plugin
pub fn definition() -> PluginDefinition {
    PluginDefinition::builder(PLUGIN_NAME, "Drive")
        .description("Browse and open files from your connected drive")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Panelhost Developers")
        .tags(["files", "storage", "documents"])
        .core(true)
        .category(PluginCategory::Integration)
        .load_component(|| async {
            debug!("Loading drive panel");
            Ok(Arc::new(DrivePanel::default()) as LoadedComponent)
        })
        .load_settings_component(|| async {
            debug!("Loading drive settings");
            Ok(Arc::new(DriveSettings::default()) as LoadedComponent)
        })
        .route("/drive", "Drive")
        .route("/drive/settings", "Drive settings")
        .config_schema(config_schema())
        .on_init(|ctx: PluginContext| async move {
            info!(
                "Drive plugin initialized at folder '{}'",
                ctx.config_value("root_folder").unwrap_or("root")
            );
            Ok(())
        })
        .sidebar("hard-drive", Some("My Drive"))
        .sidebar_order(20)
        .build()
}

/// Register the drive plugin with `registry`.
pub fn register(registry: &PluginRegistry) -> Result<RegisterOutcome, PluginSystemError> {
    registry.register(definition())
}
