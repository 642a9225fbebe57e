use std::collections::HashMap;
use std::str::FromStr;

use serde_json::json;

use crate::event::{EventSystemError, PluginEvent, PluginEventType};

#[test]
fn test_event_type_wire_names() {
    let expected = [
        (PluginEventType::Enabled, "plugin:enabled"),
        (PluginEventType::Disabled, "plugin:disabled"),
        (PluginEventType::ConfigUpdated, "plugin:config-updated"),
        (PluginEventType::Error, "plugin:error"),
    ];
    for (event_type, name) in expected {
        assert_eq!(event_type.as_str(), name);
        assert_eq!(event_type.to_string(), name);
        assert_eq!(PluginEventType::from_str(name).ok(), Some(event_type));
        assert_eq!(serde_json::to_value(event_type).ok(), Some(json!(name)));
    }
}

#[test]
fn test_unknown_event_name() {
    let err = PluginEventType::from_str("plugin:exploded").expect_err("unknown");
    assert!(matches!(err, EventSystemError::UnknownEventType(ref n) if n == "plugin:exploded"));
}

#[test]
fn test_event_serializes_with_wire_field_names() {
    let event = PluginEvent::enabled("chat");
    let value = serde_json::to_value(&event).expect("serialize");
    assert_eq!(value, json!({"type": "plugin:enabled", "pluginName": "chat"}));

    let parsed: PluginEvent = serde_json::from_value(json!({
        "type": "plugin:error",
        "pluginName": "drive",
        "payload": {"error": "boom"}
    }))
    .expect("deserialize");
    assert_eq!(parsed.event_type, PluginEventType::Error);
    assert_eq!(parsed.error_message(), Some("boom"));
}

#[test]
fn test_config_updated_payload_is_the_config() {
    let config: HashMap<String, String> = [("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        .into_iter()
        .collect();
    let event = PluginEvent::config_updated("drive", &config);
    assert_eq!(event.event_type, PluginEventType::ConfigUpdated);
    assert_eq!(event.payload, Some(json!({"a": "1", "b": "2"})));
}

#[test]
fn test_error_message_absent_for_other_payloads() {
    assert_eq!(PluginEvent::disabled("chat").error_message(), None);
    assert_eq!(PluginEvent::error("chat", json!({"phase": "render"})).error_message(), None);
}
