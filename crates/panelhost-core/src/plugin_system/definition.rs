use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};

use crate::kernel::constants::DEFAULT_SIDEBAR_ORDER;
use crate::plugin_system::error::{BoxError, PluginSystemError};
use crate::plugin_system::schema::ConfigSchema;
use crate::provider::PluginContext;

/// The UI module a plugin renders into its mount point.
pub trait PluginComponent: Send + Sync {
    /// Render the plugin body for the given capability object.
    fn render(&self, ctx: &PluginContext) -> Result<String, BoxError>;
}

/// A resolved UI module, shared between the loader and the renderer.
pub type LoadedComponent = Arc<dyn PluginComponent>;

/// Deferred factory producing a plugin's UI module.
pub type ComponentLoader = Arc<dyn Fn() -> BoxFuture<'static, Result<LoadedComponent, BoxError>> + Send + Sync>;

/// Hook run once a plugin instance is enabled and mounted.
pub type InitHook = Arc<dyn Fn(PluginContext) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// Hook run when a plugin instance is unmounted, disabled or unregistered.
pub type DestroyHook = Arc<dyn Fn() -> Result<(), BoxError> + Send + Sync>;

/// Closed set of plugin categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginCategory {
    Integration,
    Utility,
    Communication,
    Analytics,
    #[default]
    Other,
}

impl PluginCategory {
    pub const ALL: [PluginCategory; 5] = [
        PluginCategory::Integration,
        PluginCategory::Utility,
        PluginCategory::Communication,
        PluginCategory::Analytics,
        PluginCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginCategory::Integration => "integration",
            PluginCategory::Utility => "utility",
            PluginCategory::Communication => "communication",
            PluginCategory::Analytics => "analytics",
            PluginCategory::Other => "other",
        }
    }
}

impl fmt::Display for PluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginCategory {
    type Err = PluginSystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PluginCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PluginSystemError::UnknownCategory(s.to_string()))
    }
}

/// In-plugin navigation entry (display only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRoute {
    pub path: String,
    pub label: String,
}

/// Where and how a plugin shows up in the dashboard sidebar
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidebarPlacement {
    pub show_in_sidebar: bool,
    pub icon: Option<String>,
    pub label: Option<String>,
    pub order: Option<i32>,
}

impl SidebarPlacement {
    /// Sort key used by the sidebar; absent order sorts as 99.
    pub fn effective_order(&self) -> i32 {
        self.order.unwrap_or(DEFAULT_SIDEBAR_ORDER)
    }
}

/// Static, declarative description of a plugin.
///
/// Definitions are registered once and shared as `Arc<PluginDefinition>`;
/// the registry hands back the same `Arc` it was given.
#[derive(Clone, Default)]
pub struct PluginDefinition {
    /// Unique kebab-case identifier; registry key, backend join key and route segment
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub tags: Vec<String>,
    /// Platform-provided rather than third-party
    pub is_core: bool,
    pub category: PluginCategory,
    pub load_component: Option<ComponentLoader>,
    pub load_settings_component: Option<ComponentLoader>,
    pub routes: Vec<PluginRoute>,
    pub config_schema: Option<ConfigSchema>,
    pub on_init: Option<InitHook>,
    pub on_destroy: Option<DestroyHook>,
    pub sidebar: SidebarPlacement,
}

impl fmt::Debug for PluginDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDefinition")
            .field("name", &self.name)
            .field("display_name", &self.display_name)
            .field("version", &self.version)
            .field("is_core", &self.is_core)
            .field("category", &self.category)
            .field("has_component", &self.load_component.is_some())
            .field("has_settings_component", &self.load_settings_component.is_some())
            .field("has_on_init", &self.on_init.is_some())
            .field("has_on_destroy", &self.on_destroy.is_some())
            .field("sidebar", &self.sidebar)
            .finish_non_exhaustive()
    }
}

impl PluginDefinition {
    /// Start building a definition. Validation happens at registration, not here.
    pub fn builder(name: &str, display_name: &str) -> PluginDefinitionBuilder {
        PluginDefinitionBuilder {
            definition: PluginDefinition {
                name: name.to_string(),
                display_name: display_name.to_string(),
                version: "0.1.0".to_string(),
                ..Default::default()
            },
        }
    }

    /// Case-insensitive substring match across name, display name, description and tags.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.display_name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    /// Label shown in the sidebar, falling back to the display name.
    pub fn sidebar_label(&self) -> &str {
        self.sidebar.label.as_deref().unwrap_or(&self.display_name)
    }
}

/// Fluent builder for [`PluginDefinition`]
#[derive(Debug)]
pub struct PluginDefinitionBuilder {
    definition: PluginDefinition,
}

impl PluginDefinitionBuilder {
    pub fn description(mut self, description: &str) -> Self {
        self.definition.description = description.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.definition.version = version.to_string();
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.definition.author = author.to_string();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definition.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn core(mut self, is_core: bool) -> Self {
        self.definition.is_core = is_core;
        self
    }

    pub fn category(mut self, category: PluginCategory) -> Self {
        self.definition.category = category;
        self
    }

    /// Set the deferred factory for the plugin's UI module.
    pub fn load_component<F, Fut>(mut self, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<LoadedComponent, BoxError>> + Send + 'static,
    {
        self.definition.load_component = Some(Arc::new(move || loader().boxed()));
        self
    }

    /// Convenience for components that need no asynchronous loading.
    pub fn component<C>(self, component: C) -> Self
    where
        C: PluginComponent + 'static,
    {
        let component: LoadedComponent = Arc::new(component);
        self.load_component(move || {
            let component = component.clone();
            async move { Ok(component) }
        })
    }

    pub fn load_settings_component<F, Fut>(mut self, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<LoadedComponent, BoxError>> + Send + 'static,
    {
        self.definition.load_settings_component = Some(Arc::new(move || loader().boxed()));
        self
    }

    /// Settings counterpart of [`component`](Self::component).
    pub fn settings_component<C>(self, component: C) -> Self
    where
        C: PluginComponent + 'static,
    {
        let component: LoadedComponent = Arc::new(component);
        self.load_settings_component(move || {
            let component = component.clone();
            async move { Ok(component) }
        })
    }

    pub fn route(mut self, path: &str, label: &str) -> Self {
        self.definition.routes.push(PluginRoute {
            path: path.to_string(),
            label: label.to_string(),
        });
        self
    }

    pub fn config_schema(mut self, schema: ConfigSchema) -> Self {
        self.definition.config_schema = Some(schema);
        self
    }

    pub fn on_init<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(PluginContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.definition.on_init = Some(Arc::new(move |ctx| hook(ctx).boxed()));
        self
    }

    pub fn on_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.definition.on_destroy = Some(Arc::new(hook));
        self
    }

    /// Show the plugin in the sidebar with an icon and optional label override.
    pub fn sidebar(mut self, icon: &str, label: Option<&str>) -> Self {
        self.definition.sidebar.show_in_sidebar = true;
        self.definition.sidebar.icon = Some(icon.to_string());
        self.definition.sidebar.label = label.map(str::to_string);
        self
    }

    pub fn sidebar_order(mut self, order: i32) -> Self {
        self.definition.sidebar.order = Some(order);
        self
    }

    pub fn build(self) -> PluginDefinition {
        self.definition
    }
}
