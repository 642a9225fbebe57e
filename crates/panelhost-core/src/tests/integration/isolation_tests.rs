#![cfg(test)]

use std::sync::Arc;
use std::sync::atomic::Ordering;

use wiremock::MockServer;

use crate::event::PluginEventType;
use crate::plugin_system::{BoxError, LoadedComponent, PluginDefinition, PluginRegistry};
use crate::renderer::{LifecyclePhase, RenderState};
use crate::tests::integration::common::{TestPanel, entry, http_host, record_events, serve_user_plugins, sidebar_definition};

#[tokio::test]
async fn test_failures_stay_inside_their_own_panel() {
    let server = MockServer::start().await;
    serve_user_plugins(
        &server,
        vec![entry("chat", true), entry("drive", true), entry("notes", true), entry("stats", true)],
        None,
    )
    .await;

    let registry = Arc::new(PluginRegistry::new());
    let chat = TestPanel::ok("chat body");
    let chat_renders = Arc::clone(&chat.renders);
    registry.register(sidebar_definition("chat", 1, chat)).expect("chat");
    registry
        .register(sidebar_definition("drive", 2, TestPanel::failing("quota exceeded")))
        .expect("drive");
    registry
        .register(
            PluginDefinition::builder("notes", "Notes")
                .load_component(|| async { Err::<LoadedComponent, BoxError>("bundle unavailable".into()) })
                .sidebar("icon", None)
                .sidebar_order(3)
                .build(),
        )
        .expect("notes");
    registry.register(sidebar_definition("stats", 4, TestPanel::ok("stats body"))).expect("stats");
    let events = record_events(&registry);
    let host = http_host(&server, Arc::clone(&registry));

    let provider = host.open_session(Some("tok".to_string())).await.expect("session");
    let mut dashboard = host.mount_sidebar(&provider).await;
    let views = dashboard.render_all();

    let rendered: Vec<String> = views.iter().map(ToString::to_string).collect();
    assert_eq!(rendered[0], "chat body");
    assert_eq!(rendered[1], "Plugin 'drive' crashed: quota exceeded\nReload the page to try again.");
    assert_eq!(rendered[2], "Plugin 'notes' crashed: bundle unavailable\nReload the page to try again.");
    assert_eq!(rendered[3], "stats body");

    assert_eq!(
        dashboard.panel("notes").and_then(|p| p.failure()).map(|f| f.phase),
        Some(LifecyclePhase::Load)
    );
    assert_eq!(
        dashboard.panel("drive").and_then(|p| p.failure()).map(|f| f.phase),
        Some(LifecyclePhase::Render)
    );

    // A second pass re-renders the healthy panels only and reports nothing new.
    dashboard.render_all();
    assert_eq!(chat_renders.load(Ordering::SeqCst), 2);

    let events = events.lock().unwrap();
    let failed: Vec<&str> = events
        .iter()
        .filter(|e| e.event_type == PluginEventType::Error)
        .map(|e| e.plugin_name.as_str())
        .collect();
    assert_eq!(failed, vec!["notes", "drive"]);
}

#[tokio::test]
async fn test_panicking_subscriber_does_not_break_the_session() {
    let store = Arc::new(crate::storage::InMemoryPluginStore::new());
    store.seed("tok", vec![crate::storage::UserPluginState::new("chat", false)]);
    let registry = Arc::new(PluginRegistry::new());
    registry.register(sidebar_definition("chat", 1, TestPanel::ok("chat body"))).expect("chat");
    registry.on(PluginEventType::Enabled, |_| panic!("analytics hook crashed"));
    let host = crate::kernel::DashboardHost::new(registry, store.clone(), crate::storage::HostConfig::default());

    let provider = host.open_session(Some("tok".to_string())).await.expect("session");
    let mut dashboard = host.mount(&provider, &["chat"]).await;
    assert_eq!(dashboard.states()[0].1, RenderState::Disabled);

    provider.enable_plugin("chat").await.expect("enable survives the panic");
    assert!(dashboard.panel("chat").map(|p| p.needs_sync()).unwrap_or(false));
    dashboard.sync().await;

    assert_eq!(dashboard.states()[0].1, RenderState::Mounted);
    assert_eq!(dashboard.render_all()[0].to_string(), "chat body");
}
