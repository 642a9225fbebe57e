#![cfg(test)]

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::event::PluginEventType;
use crate::plugin_system::{BoxError, PluginDefinition, PluginRegistry};
use crate::provider::ApiRequest;
use crate::renderer::RenderState;
use crate::tests::integration::common::{TestPanel, entry, http_host, record_events, serve_user_plugins, sidebar_definition};

#[tokio::test]
async fn test_enable_from_settings_then_mount_sidebar() {
    let server = MockServer::start().await;
    serve_user_plugins(&server, vec![entry("chat", false)], Some(1)).await;
    serve_user_plugins(&server, vec![entry("chat", true)], None).await;
    Mock::given(method("PATCH"))
        .and(path("/user-plugins/chat/enable"))
        .and(header("Authorization", "Bearer alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry("chat", true)))
        .expect(1)
        .mount(&server)
        .await;

    let registry = Arc::new(PluginRegistry::new());
    registry.register(sidebar_definition("chat", 10, TestPanel::ok("chat body"))).expect("chat");
    let events = record_events(&registry);
    let host = http_host(&server, Arc::clone(&registry));

    let provider = host.open_session(Some("alice".to_string())).await.expect("session");
    assert!(!provider.is_plugin_enabled("chat"));
    assert!(host.mount_sidebar(&provider).await.panels().is_empty());

    provider.enable_plugin("chat").await.expect("enable");
    assert!(provider.is_plugin_enabled("chat"));

    let mut dashboard = host.mount_sidebar(&provider).await;
    let views = dashboard.render_all();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].to_string(), "chat body");

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, PluginEventType::Enabled);
}

#[tokio::test]
async fn test_plugin_talks_to_its_namespace_during_init() {
    let server = MockServer::start().await;
    serve_user_plugins(&server, vec![json!({"plugin_name": "drive", "enabled": true, "config": {"root": "docs"}})], None)
        .await;
    Mock::given(method("POST"))
        .and(path("/plugins/drive/warmup"))
        .and(header("Authorization", "Bearer bob"))
        .and(body_json(json!({"root": "docs"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/user-plugins/drive/config"))
        .and(body_json(json!({"config": {"root": "docs", "view": "grid"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry("drive", true)))
        .expect(1)
        .mount(&server)
        .await;

    let registry = Arc::new(PluginRegistry::new());
    registry
        .register(
            PluginDefinition::builder("drive", "Drive")
                .component(TestPanel::ok("drive body"))
                .on_init(|ctx| async move {
                    let root = ctx.config_value("root").unwrap_or("root").to_string();
                    ctx.call_api("warmup", ApiRequest::post(json!({ "root": root }))).await?;
                    let partial: HashMap<String, String> = [("view".to_string(), "grid".to_string())].into_iter().collect();
                    ctx.update_config(partial).await?;
                    Ok::<(), BoxError>(())
                })
                .build(),
        )
        .expect("drive");
    let errors = record_events(&registry);
    let host = http_host(&server, Arc::clone(&registry));

    let provider = host.open_session(Some("bob".to_string())).await.expect("session");
    let dashboard = host.mount(&provider, &["drive"]).await;

    assert_eq!(dashboard.states(), vec![("drive".to_string(), RenderState::Mounted)]);
    let events = errors.lock().unwrap();
    assert!(events.iter().all(|e| e.event_type != PluginEventType::Error), "{:?}", *events);
    assert!(events.iter().any(|e| e.event_type == PluginEventType::ConfigUpdated));
}

#[tokio::test]
async fn test_rejected_token_leaves_everything_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user-plugins/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token"})))
        .mount(&server)
        .await;

    let registry = Arc::new(PluginRegistry::new());
    registry.register(sidebar_definition("chat", 10, TestPanel::ok("chat body"))).expect("chat");
    let host = http_host(&server, registry);

    let provider = host.open_session(Some("expired".to_string())).await.expect("session");
    let error = provider.error().expect("refresh error");
    assert!(error.starts_with("Failed to load plugins:"));
    assert!(error.contains("Invalid token"));

    assert!(host.mount_sidebar(&provider).await.panels().is_empty());
    let mut dashboard = host.mount(&provider, &["chat"]).await;
    assert!(matches!(dashboard.render_all()[0], crate::renderer::PluginView::Disabled { .. }));
}
