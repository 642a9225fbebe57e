use std::sync::Arc;

use panelhost_core::plugin_system::{
    BoxError, ConfigField, ConfigFieldType, ConfigSchema, LoadedComponent, PluginCategory, PluginComponent,
    PluginDefinition, PluginRegistry, PluginSystemError, RegisterOutcome,
};
use panelhost_core::provider::PluginContext;

use log::{debug, info};

/// Registry name of the chat plugin
pub const PLUGIN_NAME: &str = "chat";

const DEFAULT_HISTORY_LIMIT: &str = "50";

/// Main chat panel
#[derive(Debug, Default)]
pub struct ChatPanel;

impl PluginComponent for ChatPanel {
    fn render(&self, ctx: &PluginContext) -> Result<String, BoxError> {
        let history_limit: u32 = ctx
            .config_value("history_limit")
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .trim()
            .parse()
            .map_err(|e| format!("invalid history_limit: {}", e))?;
        let greeting = ctx.config_value("greeting").unwrap_or("How can I help?");

        let session = if ctx.token().is_some() { "signed in" } else { "signed out" };
        Ok(format!(
            "Chat ({})\n{}\nKeeping the last {} messages.",
            session, greeting, history_limit
        ))
    }
}

fn config_schema() -> ConfigSchema {
    ConfigSchema::new()
        .field(
            "history_limit",
            ConfigField::new(ConfigFieldType::Number, "Messages to keep")
                .default_value(DEFAULT_HISTORY_LIMIT)
                .validator(|v| match v.trim().parse::<u32>() {
                    Ok(n) if n > 0 => Ok(()),
                    _ => Err("must be a positive whole number".to_string()),
                }),
        )
        .field("greeting", ConfigField::new(ConfigFieldType::String, "Greeting"))
}

/// Definition of the chat plugin
pub fn definition() -> PluginDefinition {
    PluginDefinition::builder(PLUGIN_NAME, "Chat")
        .description("Conversational assistant panel")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Panelhost Developers")
        .tags(["chat", "assistant", "messages"])
        .core(true)
        .category(PluginCategory::Communication)
        .load_component(|| async {
            debug!("Loading chat panel");
            Ok(Arc::new(ChatPanel) as LoadedComponent)
        })
        .route("/chat", "Chat")
        .config_schema(config_schema())
        .on_init(|ctx: PluginContext| async move {
            let limit = ctx.config_value("history_limit").unwrap_or(DEFAULT_HISTORY_LIMIT);
            info!("Chat plugin initialized (history limit {})", limit);
            Ok(())
        })
        .on_destroy(|| {
            debug!("Chat plugin destroyed");
            Ok(())
        })
        .sidebar("message-square", None)
        .sidebar_order(10)
        .build()
}

/// Register the chat plugin with `registry`.
pub fn register(registry: &PluginRegistry) -> Result<RegisterOutcome, PluginSystemError> {
    registry.register(definition())
}
