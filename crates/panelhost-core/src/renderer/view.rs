use std::fmt;

/// What a mount point shows for its plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginView {
    /// Definition lookup has not happened yet
    Resolving,
    Loading { label: String },
    Disabled { plugin: String, notice: String },
    NotFound { plugin: String, notice: String },
    Content { plugin: String, body: String },
    /// Recovery is a full reload only
    Errored { plugin: String, message: String, reload_hint: String },
}

impl PluginView {
    pub fn is_content(&self) -> bool {
        matches!(self, PluginView::Content { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PluginView::Errored { .. })
    }
}

impl fmt::Display for PluginView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginView::Resolving => write!(f, "..."),
            PluginView::Loading { label } => write!(f, "{}", label),
            PluginView::Disabled { notice, .. } => write!(f, "{}", notice),
            PluginView::NotFound { notice, .. } => write!(f, "{}", notice),
            PluginView::Content { body, .. } => write!(f, "{}", body),
            PluginView::Errored { plugin, message, reload_hint } => {
                write!(f, "Plugin '{}' crashed: {}\n{}", plugin, message, reload_hint)
            }
        }
    }
}
