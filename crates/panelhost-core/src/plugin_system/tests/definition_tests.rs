use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::kernel::constants::DEFAULT_SIDEBAR_ORDER;
use crate::plugin_system::{BoxError, PluginCategory, PluginComponent, PluginDefinition, PluginSystemError};
use crate::provider::PluginContext;

struct Hello;

impl PluginComponent for Hello {
    fn render(&self, ctx: &PluginContext) -> Result<String, BoxError> {
        Ok(format!("hello from {}", ctx.plugin_name()))
    }
}

#[test]
fn test_builder_defaults() {
    let def = PluginDefinition::builder("chat", "Chat").build();
    assert_eq!(def.name, "chat");
    assert_eq!(def.display_name, "Chat");
    assert_eq!(def.version, "0.1.0");
    assert_eq!(def.category, PluginCategory::Other);
    assert!(!def.is_core);
    assert!(!def.sidebar.show_in_sidebar);
    assert_eq!(def.sidebar.effective_order(), DEFAULT_SIDEBAR_ORDER);
    assert!(def.load_component.is_none());
    assert!(def.on_init.is_none());
    assert!(def.on_destroy.is_none());
}

#[test]
fn test_builder_sets_everything() {
    let def = PluginDefinition::builder("drive", "Google Drive")
        .description("Files")
        .version("2.1.0")
        .author("Team")
        .tags(["files", "cloud"])
        .core(true)
        .category(PluginCategory::Integration)
        .component(Hello)
        .route("/drive", "Drive")
        .sidebar("hard-drive", Some("My Drive"))
        .sidebar_order(3)
        .build();

    assert_eq!(def.version, "2.1.0");
    assert_eq!(def.tags, vec!["files".to_string(), "cloud".to_string()]);
    assert!(def.is_core);
    assert_eq!(def.routes.len(), 1);
    assert_eq!(def.routes[0].path, "/drive");
    assert!(def.sidebar.show_in_sidebar);
    assert_eq!(def.sidebar.icon.as_deref(), Some("hard-drive"));
    assert_eq!(def.sidebar_label(), "My Drive");
    assert_eq!(def.sidebar.effective_order(), 3);
}

#[test]
fn test_sidebar_label_falls_back_to_display_name() {
    let def = PluginDefinition::builder("chat", "Chat").sidebar("chat", None).build();
    assert_eq!(def.sidebar_label(), "Chat");
}

#[tokio::test]
async fn test_loader_is_lazy_and_repeatable() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let def = PluginDefinition::builder("chat", "Chat")
        .load_component(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(Arc::new(Hello) as crate::plugin_system::LoadedComponent) }
        })
        .build();

    assert_eq!(calls.load(Ordering::SeqCst), 0, "building must not load");
    let loader = def.load_component.clone().expect("loader");
    loader().await.expect("first load");
    loader().await.expect("second load");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_matches_is_case_insensitive() {
    let def = PluginDefinition::builder("drive", "Google Drive")
        .description("Browse your Files")
        .tags(["Storage"])
        .build();
    assert!(def.matches("google"));
    assert!(def.matches("FILES"));
    assert!(def.matches("storage"));
    assert!(def.matches("riv"));
    assert!(!def.matches("chat"));
}

#[test]
fn test_category_parsing() {
    assert_eq!(PluginCategory::from_str("utility").ok(), Some(PluginCategory::Utility));
    assert_eq!(PluginCategory::from_str(" Analytics ").ok(), Some(PluginCategory::Analytics));
    assert!(matches!(
        PluginCategory::from_str("games"),
        Err(PluginSystemError::UnknownCategory(c)) if c == "games"
    ));
    for category in PluginCategory::ALL {
        assert_eq!(PluginCategory::from_str(&category.to_string()).ok(), Some(category));
    }
}

#[test]
fn test_category_serde_is_lowercase() {
    let json = serde_json::to_string(&PluginCategory::Communication).expect("serialize");
    assert_eq!(json, "\"communication\"");
    let parsed: PluginCategory = serde_json::from_str("\"integration\"").expect("deserialize");
    assert_eq!(parsed, PluginCategory::Integration);
}
