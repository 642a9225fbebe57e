#![cfg(test)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::event::{PluginEvent, PluginEventType};
use crate::kernel::DashboardHost;
use crate::plugin_system::{BoxError, PluginComponent, PluginDefinition, PluginRegistry};
use crate::provider::PluginContext;
use crate::storage::{HostConfig, HttpPluginStore};

// ===== MOCK PLUGINS =====

/// Renders a fixed body, or fails on demand
pub struct TestPanel {
    pub body: &'static str,
    pub fail_with: Option<&'static str>,
    pub renders: Arc<AtomicUsize>,
}

impl TestPanel {
    pub fn ok(body: &'static str) -> Self {
        Self {
            body,
            fail_with: None,
            renders: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: &'static str) -> Self {
        Self {
            body: "",
            fail_with: Some(message),
            renders: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl PluginComponent for TestPanel {
    fn render(&self, _ctx: &PluginContext) -> Result<String, BoxError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        match self.fail_with {
            Some(message) => Err(message.into()),
            None => Ok(self.body.to_string()),
        }
    }
}

pub fn sidebar_definition(name: &str, order: i32, panel: TestPanel) -> PluginDefinition {
    PluginDefinition::builder(name, name)
        .component(panel)
        .sidebar("icon", None)
        .sidebar_order(order)
        .build()
}

// ===== BACKEND =====

pub fn entry(name: &str, enabled: bool) -> Value {
    json!({"plugin_name": name, "enabled": enabled, "config": {}})
}

/// Serve `entries` from `GET /user-plugins/`; `times` limits how often, so a
/// later mount can take over.
pub async fn serve_user_plugins(server: &MockServer, entries: Vec<Value>, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path("/user-plugins/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(entries)));
    let mock = match times {
        Some(n) => mock.up_to_n_times(n),
        None => mock,
    };
    mock.mount(server).await;
}

pub fn http_host(server: &MockServer, registry: Arc<PluginRegistry>) -> DashboardHost {
    let config = HostConfig {
        api_base_url: server.uri(),
        ..HostConfig::default()
    };
    let store = HttpPluginStore::new(&config).expect("valid config");
    DashboardHost::new(registry, Arc::new(store), config)
}

/// Collect every event published on `registry`
pub fn record_events(registry: &PluginRegistry) -> Arc<Mutex<Vec<PluginEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    for event_type in PluginEventType::ALL {
        let sink = Arc::clone(&events);
        registry.on(event_type, move |e| sink.lock().unwrap().push(e.clone()));
    }
    events
}
