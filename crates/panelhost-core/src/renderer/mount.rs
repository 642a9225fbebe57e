use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::event::{PluginEvent, PluginEventType, Subscription};
use crate::plugin_system::{ComponentLoader, LoadedComponent, PluginDefinition, PluginRegistry};
use crate::provider::PluginProvider;
use crate::renderer::boundary::{LifecyclePhase, RenderFailure, contain, contain_async};
use crate::renderer::view::PluginView;

const RELOAD_HINT: &str = "Reload the page to try again.";

/// Lifecycle state of one plugin mount point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderState {
    Resolving,
    NotFound,
    Disabled,
    Loading,
    Mounted,
    Errored,
}

impl fmt::Display for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RenderState::Resolving => "resolving",
            RenderState::NotFound => "not-found",
            RenderState::Disabled => "disabled",
            RenderState::Loading => "loading",
            RenderState::Mounted => "mounted",
            RenderState::Errored => "errored",
        };
        f.write_str(s)
    }
}

/// Which of a plugin's components a renderer mounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderSurface {
    /// The plugin's main panel, gated on enablement with lifecycle hooks
    #[default]
    Main,
    /// The plugin's settings page. Not gated on enablement and runs no hooks.
    Settings,
}

/// A component load started by [`PluginRenderer::start_mount`].
///
/// Awaiting [`PendingLoad::load`] does not borrow the renderer, so the host
/// can keep rendering the loading view until the outcome is handed back
/// through [`PluginRenderer::finish_mount`].
pub struct PendingLoad {
    plugin: String,
    cycle: u64,
    loader: ComponentLoader,
}

impl fmt::Debug for PendingLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingLoad")
            .field("plugin", &self.plugin)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}

impl PendingLoad {
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// Run the loader inside the isolation boundary.
    pub async fn load(self) -> LoadOutcome {
        let result = contain_async(&self.plugin, LifecyclePhase::Load, (self.loader)()).await;
        LoadOutcome {
            cycle: self.cycle,
            result,
        }
    }
}

/// Result of a [`PendingLoad`], consumed by [`PluginRenderer::finish_mount`]
pub struct LoadOutcome {
    cycle: u64,
    result: Result<LoadedComponent, RenderFailure>,
}

impl fmt::Debug for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOutcome")
            .field("cycle", &self.cycle)
            .field("loaded", &self.result.is_ok())
            .finish()
    }
}

/// Mounts a single plugin by name inside its own failure boundary.
///
/// The renderer resolves the definition, gates on the user's enablement,
/// loads the component once per mount cycle, and fires `on_init` once per
/// enabling transition. Any failure in plugin code moves this renderer (and
/// only this renderer) to [`RenderState::Errored`] and emits a single
/// `plugin:error` event.
///
/// Dropping a mounted renderer runs `on_destroy`.
///
/// [`mount`](Self::mount) drives a whole cycle in one call. Hosts that want
/// to show the loading view while the component loads use
/// [`start_mount`](Self::start_mount) and [`finish_mount`](Self::finish_mount)
/// instead.
pub struct PluginRenderer {
    name: String,
    surface: RenderSurface,
    registry: Arc<PluginRegistry>,
    provider: PluginProvider,
    state: RenderState,
    transitions: Vec<RenderState>,
    definition: Option<Arc<PluginDefinition>>,
    component: Option<LoadedComponent>,
    failure: Option<RenderFailure>,
    init_fired: bool,
    load_count: usize,
    load_cycle: u64,
    stale: Arc<AtomicBool>,
    subscriptions: Vec<Subscription>,
}

impl fmt::Debug for PluginRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRenderer")
            .field("name", &self.name)
            .field("surface", &self.surface)
            .field("state", &self.state)
            .field("transitions", &self.transitions)
            .field("failure", &self.failure)
            .field("init_fired", &self.init_fired)
            .finish_non_exhaustive()
    }
}

impl PluginRenderer {
    pub fn new(name: &str, registry: Arc<PluginRegistry>, provider: PluginProvider) -> Self {
        Self::for_surface(name, registry, provider, RenderSurface::Main)
    }

    /// Renderer for the plugin's settings page
    pub fn settings(name: &str, registry: Arc<PluginRegistry>, provider: PluginProvider) -> Self {
        Self::for_surface(name, registry, provider, RenderSurface::Settings)
    }

    fn for_surface(name: &str, registry: Arc<PluginRegistry>, provider: PluginProvider, surface: RenderSurface) -> Self {
        // Enablement changes for this plugin mark the renderer for a re-sync.
        let stale = Arc::new(AtomicBool::new(false));
        let subscriptions = [PluginEventType::Enabled, PluginEventType::Disabled]
            .into_iter()
            .map(|event_type| {
                let stale = Arc::clone(&stale);
                let watched = name.to_string();
                registry.on(event_type, move |event| {
                    if event.plugin_name == watched {
                        stale.store(true, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        Self {
            name: name.to_string(),
            surface,
            registry,
            provider,
            state: RenderState::Resolving,
            transitions: vec![RenderState::Resolving],
            definition: None,
            component: None,
            failure: None,
            init_fired: false,
            load_count: 0,
            load_cycle: 0,
            stale,
            subscriptions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surface(&self) -> RenderSurface {
        self.surface
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Every state this renderer has entered, oldest first
    pub fn transitions(&self) -> &[RenderState] {
        &self.transitions
    }

    pub fn failure(&self) -> Option<&RenderFailure> {
        self.failure.as_ref()
    }

    /// How many times the component loader has been invoked
    pub fn load_count(&self) -> usize {
        self.load_count
    }

    /// True once an enable/disable event for this plugin arrived since the last sync
    pub fn needs_sync(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    fn transition(&mut self, next: RenderState) {
        if self.state != next {
            log::debug!("Plugin '{}' renderer: {} -> {}", self.name, self.state, next);
            self.state = next;
            self.transitions.push(next);
        }
    }

    fn fail(&mut self, failure: RenderFailure) {
        log::error!("{}", failure);
        self.registry
            .emit(&PluginEvent::error(&self.name, failure.to_event_payload()));
        self.failure = Some(failure);
        self.transition(RenderState::Errored);
    }

    /// Drive the renderer as far as it can go: resolve, gate, load, init.
    ///
    /// The provider should already hold a refreshed plugin list. Calling this
    /// on a renderer that is already mounted or errored does nothing.
    pub async fn mount(&mut self) -> RenderState {
        let Some(pending) = self.start_mount() else {
            return self.state;
        };
        let outcome = pending.load().await;
        self.finish_mount(outcome).await
    }

    /// Resolve and gate the plugin, then hand back its loader.
    ///
    /// Returns `None` when no load is needed: the renderer is already past
    /// loading, or it stopped at `NotFound`, `Disabled` or `Errored`. On
    /// `Some` the renderer sits in [`RenderState::Loading`] until the outcome
    /// is passed to [`finish_mount`](Self::finish_mount).
    pub fn start_mount(&mut self) -> Option<PendingLoad> {
        match self.state {
            RenderState::Mounted | RenderState::Errored | RenderState::NotFound => return None,
            RenderState::Resolving | RenderState::Disabled | RenderState::Loading => {}
        }

        let Some(definition) = self.registry.get(&self.name) else {
            log::warn!("Plugin '{}' is not registered", self.name);
            self.transition(RenderState::NotFound);
            return None;
        };
        self.definition = Some(Arc::clone(&definition));

        let loader = match self.surface {
            RenderSurface::Main => {
                if !self.provider.is_plugin_enabled(&self.name) {
                    self.transition(RenderState::Disabled);
                    return None;
                }
                self.transition(RenderState::Loading);
                let Some(loader) = definition.load_component.clone() else {
                    let failure = RenderFailure::missing_loader(&self.name);
                    self.fail(failure);
                    return None;
                };
                loader
            }
            RenderSurface::Settings => {
                let Some(loader) = definition.load_settings_component.clone() else {
                    log::debug!("Plugin '{}' has no settings component", self.name);
                    self.transition(RenderState::NotFound);
                    return None;
                };
                self.transition(RenderState::Loading);
                loader
            }
        };

        self.load_count += 1;
        self.load_cycle += 1;
        Some(PendingLoad {
            plugin: self.name.clone(),
            cycle: self.load_cycle,
            loader,
        })
    }

    /// Apply a finished load and, for the main surface, fire `on_init`.
    ///
    /// An outcome from an earlier cycle, or one that arrives after the
    /// renderer left `Loading`, is dropped.
    pub async fn finish_mount(&mut self, outcome: LoadOutcome) -> RenderState {
        if self.state != RenderState::Loading || outcome.cycle != self.load_cycle {
            log::debug!("Discarding stale load of plugin '{}' ({})", self.name, self.state);
            return self.state;
        }
        match outcome.result {
            Ok(component) => self.component = Some(component),
            Err(failure) => {
                self.fail(failure);
                return self.state;
            }
        }

        self.transition(RenderState::Mounted);
        if self.surface == RenderSurface::Main {
            if let Some(definition) = self.definition.clone() {
                self.run_init(&definition).await;
            }
        }
        self.state
    }

    async fn run_init(&mut self, definition: &PluginDefinition) {
        if self.init_fired {
            return;
        }
        self.init_fired = true;
        let Some(hook) = definition.on_init.clone() else {
            return;
        };
        let ctx = self.provider.create_plugin_context(&self.name);
        if let Err(failure) = contain_async(&self.name, LifecyclePhase::Init, hook(ctx)).await {
            // A failed init does not unmount the plugin.
            log::error!("{}", failure);
            self.registry
                .emit(&PluginEvent::error(&self.name, failure.to_event_payload()));
        }
    }

    /// Run `on_destroy` if a component is currently mounted.
    fn teardown(&mut self) {
        if self.component.take().is_none() || self.surface == RenderSurface::Settings {
            return;
        }
        let Some(hook) = self.definition.as_ref().and_then(|d| d.on_destroy.clone()) else {
            return;
        };
        if let Err(failure) = contain(&self.name, LifecyclePhase::Destroy, || hook()) {
            log::error!("{}", failure);
            self.registry
                .emit(&PluginEvent::error(&self.name, failure.to_event_payload()));
        }
    }

    /// Re-evaluate gating after the registry or the user's plugin state changed.
    pub async fn sync(&mut self) -> RenderState {
        self.stale.store(false, Ordering::SeqCst);
        match self.state {
            RenderState::Mounted => {
                if !self.registry.contains(&self.name) {
                    self.teardown();
                    self.init_fired = false;
                    self.transition(RenderState::NotFound);
                } else if self.surface == RenderSurface::Main && !self.provider.is_plugin_enabled(&self.name) {
                    self.teardown();
                    self.init_fired = false;
                    self.transition(RenderState::Disabled);
                }
                self.state
            }
            RenderState::Resolving | RenderState::Disabled | RenderState::Loading => self.mount().await,
            RenderState::NotFound | RenderState::Errored => self.state,
        }
    }

    /// Produce the view for the current state, rendering the component if mounted.
    pub fn render(&mut self) -> PluginView {
        match self.state {
            RenderState::Resolving => PluginView::Resolving,
            RenderState::Loading => PluginView::Loading {
                label: format!("Loading {}...", self.display_name()),
            },
            RenderState::NotFound => PluginView::NotFound {
                plugin: self.name.clone(),
                notice: match (&self.definition, self.surface) {
                    (Some(definition), RenderSurface::Settings) => {
                        format!("{} has no settings page", definition.display_name)
                    }
                    _ => format!("Plugin '{}' not found", self.name),
                },
            },
            RenderState::Disabled => PluginView::Disabled {
                plugin: self.name.clone(),
                notice: format!("{} is disabled. Enable it in plugin settings.", self.display_name()),
            },
            RenderState::Errored => self.errored_view(),
            RenderState::Mounted => self.render_component(),
        }
    }

    fn render_component(&mut self) -> PluginView {
        let Some(component) = self.component.clone() else {
            return PluginView::Resolving;
        };
        let ctx = self.provider.create_plugin_context(&self.name);
        match contain(&self.name, LifecyclePhase::Render, || component.render(&ctx)) {
            Ok(body) => PluginView::Content {
                plugin: self.name.clone(),
                body,
            },
            Err(failure) => {
                self.teardown();
                self.fail(failure);
                self.errored_view()
            }
        }
    }

    fn errored_view(&self) -> PluginView {
        PluginView::Errored {
            plugin: self.name.clone(),
            message: self
                .failure
                .as_ref()
                .map(|f| f.message.clone())
                .unwrap_or_default(),
            reload_hint: RELOAD_HINT.to_string(),
        }
    }

    fn display_name(&self) -> &str {
        self.definition
            .as_ref()
            .map(|d| d.display_name.as_str())
            .unwrap_or(&self.name)
    }

    /// Tear the instance down, running `on_destroy` if mounted.
    pub fn unmount(mut self) {
        self.teardown();
    }
}

impl Drop for PluginRenderer {
    fn drop(&mut self) {
        self.teardown();
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }
}
