/// Application name
pub const APP_NAME: &str = "Panelhost";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sidebar sort key for plugins that do not declare one
pub const DEFAULT_SIDEBAR_ORDER: i32 = 99;

/// Pattern every plugin name must match
pub const PLUGIN_NAME_PATTERN: &str = "^[a-z][a-z0-9-]*$";

/// Backend base URL when none is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Path segment under which plugin-relative API calls are namespaced
pub const DEFAULT_PLUGIN_API_NAMESPACE: &str = "plugins";

/// Backend collection holding per-user plugin state
pub const USER_PLUGINS_PATH: &str = "user-plugins";

/// Environment variable overriding the backend base URL
pub const ENV_API_URL: &str = "PANELHOST_API_URL";

/// Environment variable carrying the session token
pub const ENV_TOKEN: &str = "PANELHOST_TOKEN";

pub const EVENT_PLUGIN_ENABLED: &str = "plugin:enabled";
pub const EVENT_PLUGIN_DISABLED: &str = "plugin:disabled";
pub const EVENT_PLUGIN_CONFIG_UPDATED: &str = "plugin:config-updated";
pub const EVENT_PLUGIN_ERROR: &str = "plugin:error";
