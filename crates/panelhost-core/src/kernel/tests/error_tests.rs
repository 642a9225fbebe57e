use crate::kernel::{Error, Result};
use crate::plugin_system::PluginSystemError;
use crate::provider::ProviderError;

fn require_registered(name: &str, known: bool) -> Result<()> {
    if !known {
        Err(PluginSystemError::NotRegistered {
            plugin_id: name.to_string(),
        })?;
    }
    Ok(())
}

#[test]
fn test_subsystem_errors_convert_with_question_mark() {
    assert!(require_registered("chat", true).is_ok());

    let err = require_registered("weather", false).expect_err("unknown plugin");
    assert!(matches!(err, Error::PluginSystem(PluginSystemError::NotRegistered { .. })));
    assert_eq!(err.to_string(), "Plugin system error: Plugin 'weather' is not registered");

    let err: Error = ProviderError::NotAuthenticated.into();
    assert_eq!(err.to_string(), "Provider error: Not authenticated");
}

#[test]
fn test_other_errors_are_built_explicitly() {
    let err = Error::Other("Expected KEY=VALUE, got 'x'".to_string());
    assert_eq!(err.to_string(), "Error: Expected KEY=VALUE, got 'x'");
}
