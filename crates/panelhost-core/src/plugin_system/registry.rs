use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, LazyLock, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use regex::Regex;
use serde_json::json;

use crate::event::{EventBus, PluginEvent, PluginEventType, Subscription};
use crate::kernel::constants::PLUGIN_NAME_PATTERN;
use crate::plugin_system::definition::{PluginCategory, PluginDefinition};
use crate::plugin_system::error::{InvalidDefinitionReason, PluginSystemError};
use crate::utils::panic_message;

static PLUGIN_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLUGIN_NAME_PATTERN).expect("plugin name pattern is a valid regex"));

static GLOBAL_REGISTRY: OnceLock<Arc<PluginRegistry>> = OnceLock::new();

/// Check a plugin name against `^[a-z][a-z0-9-]*$`.
pub fn validate_plugin_name(name: &str) -> Result<(), PluginSystemError> {
    if name.is_empty() {
        return Err(PluginSystemError::invalid("<unnamed>", InvalidDefinitionReason::MissingName));
    }
    if !PLUGIN_NAME_RE.is_match(name) {
        return Err(PluginSystemError::invalid(name, InvalidDefinitionReason::MalformedName));
    }
    Ok(())
}

fn validate_definition(definition: &PluginDefinition) -> Result<(), PluginSystemError> {
    validate_plugin_name(&definition.name)?;
    if definition.display_name.trim().is_empty() {
        return Err(PluginSystemError::invalid(&definition.name, InvalidDefinitionReason::MissingDisplayName));
    }
    if definition.load_component.is_none() {
        return Err(PluginSystemError::invalid(&definition.name, InvalidDefinitionReason::MissingComponentLoader));
    }
    Ok(())
}

/// What `register` does when the name is already taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep the first definition and log a warning
    #[default]
    Ignore,
    /// Swap in the new definition at the original position
    Replace,
}

/// Result of a successful `register` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    /// Name already registered; the existing definition was kept
    Duplicate,
    /// Name already registered; the existing definition was replaced
    Replaced,
}

#[derive(Default)]
struct RegistryState {
    definitions: HashMap<String, Arc<PluginDefinition>>,
    /// Registration order, used for listing and as the sidebar tie-breaker
    order: Vec<String>,
}

impl RegistryState {
    fn ordered(&self) -> impl Iterator<Item = &Arc<PluginDefinition>> {
        self.order.iter().filter_map(|name| self.definitions.get(name))
    }
}

/// Registry mapping plugin name to [`PluginDefinition`], plus the plugin event bus.
///
/// All operations take `&self`; share the registry as `Arc<PluginRegistry>`.
/// [`PluginRegistry::global`] is the process-wide instance plugin crates
/// register into at startup, while [`PluginRegistry::new`] builds an isolated
/// one for injection and tests.
pub struct PluginRegistry {
    state: RwLock<RegistryState>,
    events: EventBus,
    duplicate_policy: DuplicatePolicy,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.read().order)
            .field("duplicate_policy", &self.duplicate_policy)
            .field("events", &self.events)
            .finish()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginRegistry {
    /// Create an empty registry that ignores duplicate registrations
    pub fn new() -> Self {
        Self::with_duplicate_policy(DuplicatePolicy::Ignore)
    }

    pub fn with_duplicate_policy(duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            events: EventBus::new(),
            duplicate_policy,
        }
    }

    /// The process-wide registry, created on first use
    pub fn global() -> Arc<PluginRegistry> {
        GLOBAL_REGISTRY.get_or_init(|| Arc::new(PluginRegistry::new())).clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    /// Register a definition.
    ///
    /// A malformed identity (bad name, missing display name, missing loader)
    /// is an error and leaves the registry untouched. A duplicate name is not:
    /// it is resolved by the registry's [`DuplicatePolicy`].
    pub fn register(&self, definition: impl Into<Arc<PluginDefinition>>) -> Result<RegisterOutcome, PluginSystemError> {
        let definition = definition.into();
        validate_definition(&definition)?;

        let mut state = self.write();
        let name = definition.name.clone();
        if let Some(existing) = state.definitions.get_mut(&name) {
            return Ok(match self.duplicate_policy {
                DuplicatePolicy::Ignore => {
                    log::warn!("Plugin '{}' is already registered; ignoring duplicate registration", name);
                    RegisterOutcome::Duplicate
                }
                DuplicatePolicy::Replace => {
                    log::info!("Plugin '{}' is already registered; replacing definition", name);
                    *existing = definition;
                    RegisterOutcome::Replaced
                }
            });
        }

        state.order.push(name.clone());
        state.definitions.insert(name.clone(), definition);
        log::debug!("Registered plugin '{}'", name);
        Ok(RegisterOutcome::Registered)
    }

    /// Remove a definition, running its `on_destroy` hook.
    ///
    /// A failing or panicking hook is logged and reported as `plugin:error`;
    /// it never prevents removal.
    pub fn unregister(&self, name: &str) -> Option<Arc<PluginDefinition>> {
        let removed = {
            let mut state = self.write();
            let removed = state.definitions.remove(name)?;
            state.order.retain(|n| n != name);
            removed
        };

        if let Some(hook) = removed.on_destroy.clone() {
            let failure = match panic::catch_unwind(AssertUnwindSafe(|| hook())) {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(panic_obj) => Some(format!("panic: {}", panic_message(panic_obj.as_ref()))),
            };
            if let Some(message) = failure {
                log::error!("onDestroy for plugin '{}' failed during unregister: {}", name, message);
                self.emit(&PluginEvent::error(name, json!({ "error": message, "phase": "destroy" })));
            }
        }

        log::debug!("Unregistered plugin '{}'", name);
        Some(removed)
    }

    pub fn get(&self, name: &str) -> Option<Arc<PluginDefinition>> {
        self.read().definitions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().definitions.contains_key(name)
    }

    /// All definitions in registration order
    pub fn get_all(&self) -> Vec<Arc<PluginDefinition>> {
        self.read().ordered().cloned().collect()
    }

    /// Definitions for `names`, in the order given. Unknown names are skipped silently.
    pub fn get_by_names<S: AsRef<str>>(&self, names: &[S]) -> Vec<Arc<PluginDefinition>> {
        let state = self.read();
        names
            .iter()
            .filter_map(|name| state.definitions.get(name.as_ref()).cloned())
            .collect()
    }

    pub fn get_by_category(&self, category: PluginCategory) -> Vec<Arc<PluginDefinition>> {
        self.read().ordered().filter(|d| d.category == category).cloned().collect()
    }

    /// Sidebar plugins sorted ascending by order (default 99), ties in registration order
    pub fn get_sidebar_plugins(&self) -> Vec<Arc<PluginDefinition>> {
        let mut plugins: Vec<_> = self.read().ordered().filter(|d| d.sidebar.show_in_sidebar).cloned().collect();
        // sort_by_key is stable
        plugins.sort_by_key(|d| d.sidebar.effective_order());
        plugins
    }

    pub fn get_core_plugins(&self) -> Vec<Arc<PluginDefinition>> {
        self.read().ordered().filter(|d| d.is_core).cloned().collect()
    }

    /// Case-insensitive substring search across name, display name, description and tags
    pub fn search(&self, query: &str) -> Vec<Arc<PluginDefinition>> {
        self.read().ordered().filter(|d| d.matches(query)).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().definitions.is_empty()
    }

    /// Drop every definition and subscriber without running hooks.
    pub fn clear(&self) {
        let mut state = self.write();
        state.definitions.clear();
        state.order.clear();
        self.events.clear();
    }

    pub fn on<F>(&self, event_type: PluginEventType, handler: F) -> Subscription
    where
        F: Fn(&PluginEvent) + Send + Sync + 'static,
    {
        self.events.on(event_type, handler)
    }

    pub fn emit(&self, event: &PluginEvent) -> usize {
        self.events.emit(event)
    }

    /// Handle onto the registry's event bus
    pub fn events(&self) -> &EventBus {
        &self.events
    }
}
