use std::fmt;
use std::sync::Arc;

use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::plugin_system::PluginRegistry;
use crate::provider::PluginProvider;
use crate::renderer::{PluginRenderer, PluginView, RenderState};
use crate::storage::{HostConfig, HttpPluginStore, UserPluginStore};

/// Process-level host: one registry, one user-state store, one config.
///
/// Sessions are opened per token; each gets its own [`PluginProvider`].
pub struct DashboardHost {
    registry: Arc<PluginRegistry>,
    store: Arc<dyn UserPluginStore>,
    config: HostConfig,
}

impl fmt::Debug for DashboardHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardHost")
            .field("plugins", &self.registry.len())
            .field("store", &self.store.name())
            .field("api_base_url", &self.config.api_base_url)
            .finish()
    }
}

impl DashboardHost {
    pub fn new(registry: Arc<PluginRegistry>, store: Arc<dyn UserPluginStore>, config: HostConfig) -> Self {
        log::info!(
            "Initializing {} v{} with {} registered plugins",
            constants::APP_NAME,
            constants::APP_VERSION,
            registry.len()
        );
        Self { registry, store, config }
    }

    /// Host backed by the dashboard backend over HTTP, using the process-wide registry.
    pub fn from_config(config: HostConfig) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(HttpPluginStore::new(&config)?);
        Ok(Self::new(PluginRegistry::global(), store, config))
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn UserPluginStore> {
        &self.store
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Open a session for `token` and load the user's plugin list.
    ///
    /// A failed load does not fail the session; it is reported through
    /// [`PluginProvider::error`].
    pub async fn open_session(&self, token: Option<String>) -> Result<PluginProvider> {
        let mut config = self.config.clone();
        config.token = token;
        let provider = PluginProvider::new(Arc::clone(&self.registry), Arc::clone(&self.store), config)?;
        provider.refresh_plugins().await;
        Ok(provider)
    }

    pub fn renderer(&self, provider: &PluginProvider, name: &str) -> PluginRenderer {
        PluginRenderer::new(name, Arc::clone(&self.registry), provider.clone())
    }

    /// Renderer for a plugin's settings page.
    pub fn settings_renderer(&self, provider: &PluginProvider, name: &str) -> PluginRenderer {
        PluginRenderer::settings(name, Arc::clone(&self.registry), provider.clone())
    }

    /// Mount every enabled sidebar plugin, in sidebar order.
    pub async fn mount_sidebar(&self, provider: &PluginProvider) -> Dashboard {
        let mut panels = Vec::new();
        for definition in self.registry.get_sidebar_plugins() {
            if !provider.is_plugin_enabled(&definition.name) {
                continue;
            }
            let mut renderer = self.renderer(provider, &definition.name);
            renderer.mount().await;
            panels.push(renderer);
        }
        log::debug!("Mounted {} sidebar panels", panels.len());
        Dashboard {
            provider: provider.clone(),
            panels,
        }
    }

    /// Mount the named plugins, in the given order.
    pub async fn mount(&self, provider: &PluginProvider, names: &[&str]) -> Dashboard {
        let mut panels = Vec::with_capacity(names.len());
        for name in names {
            let mut renderer = self.renderer(provider, name);
            renderer.mount().await;
            panels.push(renderer);
        }
        Dashboard {
            provider: provider.clone(),
            panels,
        }
    }
}

/// A set of sibling mount points sharing one session
#[derive(Debug)]
pub struct Dashboard {
    provider: PluginProvider,
    panels: Vec<PluginRenderer>,
}

impl Dashboard {
    pub fn provider(&self) -> &PluginProvider {
        &self.provider
    }

    pub fn panels(&self) -> &[PluginRenderer] {
        &self.panels
    }

    pub fn panel(&self, name: &str) -> Option<&PluginRenderer> {
        self.panels.iter().find(|p| p.name() == name)
    }

    pub fn states(&self) -> Vec<(String, RenderState)> {
        self.panels
            .iter()
            .map(|p| (p.name().to_string(), p.state()))
            .collect()
    }

    /// Render every panel. A failing panel yields an error view in its own slot only.
    pub fn render_all(&mut self) -> Vec<PluginView> {
        self.panels.iter_mut().map(PluginRenderer::render).collect()
    }

    /// Re-sync panels whose plugin was enabled or disabled since the last sync.
    pub async fn sync(&mut self) {
        for panel in self.panels.iter_mut().filter(|p| p.needs_sync()) {
            panel.sync().await;
        }
    }

    /// Detach the session and tear down every mounted panel.
    pub fn close(self) {
        self.provider.detach();
        for panel in self.panels {
            panel.unmount();
        }
    }
}
