use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::event::{PluginEvent, PluginEventType};
use crate::plugin_system::error::{InvalidDefinitionReason, PluginSystemError};
use crate::plugin_system::{
    BoxError, DuplicatePolicy, PluginCategory, PluginComponent, PluginDefinition, PluginRegistry, RegisterOutcome,
    validate_plugin_name,
};
use crate::provider::PluginContext;

struct StaticComponent(&'static str);

impl PluginComponent for StaticComponent {
    fn render(&self, _ctx: &PluginContext) -> Result<String, BoxError> {
        Ok(self.0.to_string())
    }
}

fn plugin(name: &str, display_name: &str) -> PluginDefinition {
    PluginDefinition::builder(name, display_name)
        .component(StaticComponent("body"))
        .build()
}

fn sidebar_plugin(name: &str, order: Option<i32>) -> PluginDefinition {
    let builder = PluginDefinition::builder(name, name)
        .component(StaticComponent("body"))
        .sidebar("icon", None);
    match order {
        Some(order) => builder.sidebar_order(order).build(),
        None => builder.build(),
    }
}

fn names(defs: &[Arc<PluginDefinition>]) -> Vec<&str> {
    defs.iter().map(|d| d.name.as_str()).collect()
}

#[test]
fn test_validate_plugin_name() {
    for ok in ["chat", "google-drive", "a", "x1-2"] {
        assert!(validate_plugin_name(ok).is_ok(), "{} should be valid", ok);
    }
    for bad in ["Chat", "1chat", "-chat", "my_plugin", "chat!", " chat"] {
        assert!(
            matches!(
                validate_plugin_name(bad),
                Err(PluginSystemError::InvalidDefinition {
                    reason: InvalidDefinitionReason::MalformedName,
                    ..
                })
            ),
            "{} should be rejected",
            bad
        );
    }
    assert!(matches!(
        validate_plugin_name(""),
        Err(PluginSystemError::InvalidDefinition {
            reason: InvalidDefinitionReason::MissingName,
            ..
        })
    ));
}

#[test]
fn test_register_and_get_returns_same_instance() {
    let registry = PluginRegistry::new();
    let def = Arc::new(plugin("chat", "Chat"));

    let outcome = registry.register(Arc::clone(&def)).expect("register");
    assert_eq!(outcome, RegisterOutcome::Registered);

    let fetched = registry.get("chat").expect("chat registered");
    assert!(Arc::ptr_eq(&def, &fetched));
    assert!(registry.contains("chat"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_first_registration_wins() {
    let registry = PluginRegistry::new();
    registry.register(plugin("chat", "Chat")).expect("first");
    let outcome = registry.register(plugin("chat", "Chat v2")).expect("duplicate is not an error");

    assert_eq!(outcome, RegisterOutcome::Duplicate);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("chat").map(|d| d.display_name.clone()), Some("Chat".to_string()));
}

#[test]
fn test_replace_policy_keeps_insertion_slot() {
    let registry = PluginRegistry::with_duplicate_policy(DuplicatePolicy::Replace);
    registry.register(plugin("chat", "Chat")).expect("chat");
    registry.register(plugin("drive", "Drive")).expect("drive");
    let outcome = registry.register(plugin("chat", "Chat v2")).expect("replace");

    assert_eq!(outcome, RegisterOutcome::Replaced);
    assert_eq!(names(&registry.get_all()), vec!["chat", "drive"]);
    assert_eq!(registry.get("chat").map(|d| d.display_name.clone()), Some("Chat v2".to_string()));
}

#[test]
fn test_invalid_definition_leaves_registry_untouched() {
    let registry = PluginRegistry::new();

    let err = registry.register(plugin("My_Plugin", "Mine")).expect_err("bad name");
    assert!(matches!(
        err,
        PluginSystemError::InvalidDefinition {
            reason: InvalidDefinitionReason::MalformedName,
            ..
        }
    ));

    let err = registry.register(plugin("chat", "  ")).expect_err("blank display name");
    assert!(matches!(
        err,
        PluginSystemError::InvalidDefinition {
            reason: InvalidDefinitionReason::MissingDisplayName,
            ..
        }
    ));

    let no_loader = PluginDefinition::builder("chat", "Chat").build();
    let err = registry.register(no_loader).expect_err("missing loader");
    assert!(matches!(
        err,
        PluginSystemError::InvalidDefinition {
            reason: InvalidDefinitionReason::MissingComponentLoader,
            ..
        }
    ));

    assert_eq!(registry.len(), 0);
    assert!(registry.is_empty());
}

#[test]
fn test_get_all_preserves_registration_order() {
    let registry = PluginRegistry::new();
    for name in ["zeta", "alpha", "mid"] {
        registry.register(plugin(name, name)).expect("register");
    }
    assert_eq!(names(&registry.get_all()), vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_get_by_names_skips_unknown() {
    let registry = PluginRegistry::new();
    registry.register(plugin("chat", "Chat")).expect("chat");
    registry.register(plugin("drive", "Drive")).expect("drive");

    let found = registry.get_by_names(&["drive", "ghost", "chat"]);
    assert_eq!(names(&found), vec!["drive", "chat"]);
}

#[test]
fn test_sidebar_sort_is_stable() {
    let registry = PluginRegistry::new();
    registry.register(sidebar_plugin("b", Some(5))).expect("b");
    registry.register(sidebar_plugin("a", Some(5))).expect("a");
    registry.register(sidebar_plugin("c", None)).expect("c");
    registry.register(sidebar_plugin("d", Some(1))).expect("d");
    registry.register(plugin("hidden", "Hidden")).expect("hidden");

    assert_eq!(names(&registry.get_sidebar_plugins()), vec!["d", "b", "a", "c"]);
}

#[test]
fn test_category_core_and_search_filters() {
    let registry = PluginRegistry::new();
    registry
        .register(
            PluginDefinition::builder("chat", "Chat")
                .description("Talk to the assistant")
                .tags(["messages"])
                .category(PluginCategory::Communication)
                .core(true)
                .component(StaticComponent("chat"))
                .build(),
        )
        .expect("chat");
    registry
        .register(
            PluginDefinition::builder("drive", "Google Drive")
                .category(PluginCategory::Integration)
                .tags(["Files"])
                .component(StaticComponent("drive"))
                .build(),
        )
        .expect("drive");

    assert_eq!(names(&registry.get_by_category(PluginCategory::Communication)), vec!["chat"]);
    assert!(registry.get_by_category(PluginCategory::Analytics).is_empty());
    assert_eq!(names(&registry.get_core_plugins()), vec!["chat"]);

    assert_eq!(names(&registry.search("GOOGLE")), vec!["drive"]);
    assert_eq!(names(&registry.search("assistant")), vec!["chat"]);
    assert_eq!(names(&registry.search("files")), vec!["drive"]);
    assert!(registry.search("nothing-matches").is_empty());
}

#[test]
fn test_unregister_runs_on_destroy() {
    let registry = PluginRegistry::new();
    let destroyed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&destroyed);
    registry
        .register(
            PluginDefinition::builder("chat", "Chat")
                .component(StaticComponent("chat"))
                .on_destroy(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build(),
        )
        .expect("register");

    let removed = registry.unregister("chat");
    assert!(removed.is_some());
    assert_eq!(destroyed.load(Ordering::SeqCst), 1);
    assert!(registry.get("chat").is_none());
    assert!(registry.unregister("chat").is_none());
}

#[test]
fn test_unregister_with_failing_on_destroy_still_removes() {
    let registry = PluginRegistry::new();
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    registry.on(PluginEventType::Error, move |event| {
        sink.lock().unwrap().push(event.clone());
    });

    registry
        .register(
            PluginDefinition::builder("failing", "Failing")
                .component(StaticComponent("x"))
                .on_destroy(|| Err("cleanup failed".into()))
                .build(),
        )
        .expect("failing");
    registry
        .register(
            PluginDefinition::builder("panicking", "Panicking")
                .component(StaticComponent("x"))
                .on_destroy(|| panic!("cleanup exploded"))
                .build(),
        )
        .expect("panicking");

    assert!(registry.unregister("failing").is_some());
    assert!(registry.unregister("panicking").is_some());
    assert!(registry.is_empty());

    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].error_message(), Some("cleanup failed"));
    assert!(errors[1].error_message().unwrap_or_default().contains("cleanup exploded"));
}

#[test]
fn test_clear_drops_definitions_and_subscribers() {
    let registry = PluginRegistry::new();
    registry.register(plugin("chat", "Chat")).expect("chat");
    let _sub = registry.on(PluginEventType::Enabled, |_| {});

    registry.clear();

    assert!(registry.is_empty());
    assert_eq!(registry.events().handler_count(PluginEventType::Enabled), 0);
    assert_eq!(registry.emit(&PluginEvent::enabled("chat")), 0);
}

#[test]
fn test_global_registry_is_shared() {
    let a = PluginRegistry::global();
    let b = PluginRegistry::global();
    assert!(Arc::ptr_eq(&a, &b));
}
