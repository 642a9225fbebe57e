//! Per-plugin isolation boundary.
//!
//! Every call into plugin code (loader, hooks, render) goes through
//! [`contain`] or [`contain_async`], which turn both returned errors and
//! panics into a [`RenderFailure`]. Nothing a plugin does can unwind into the
//! host shell or a sibling plugin.
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use serde::Serialize;
use serde_json::{Value, json};

use crate::plugin_system::BoxError;
use crate::utils::{error_chain, panic_message};

/// Which call into plugin code failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePhase {
    Load,
    Init,
    Render,
    Destroy,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecyclePhase::Load => "load",
            LifecyclePhase::Init => "init",
            LifecyclePhase::Render => "render",
            LifecyclePhase::Destroy => "destroy",
        };
        f.write_str(s)
    }
}

/// A contained failure of plugin code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("Plugin '{plugin}' failed during {phase}: {message}")]
pub struct RenderFailure {
    pub plugin: String,
    pub phase: LifecyclePhase,
    pub message: String,
    /// Error source chain, outermost first; empty for panics
    pub stack: Vec<String>,
    /// Where in the host the failure was caught
    pub component_stack: String,
    pub panicked: bool,
}

impl RenderFailure {
    fn from_error(plugin: &str, phase: LifecyclePhase, err: BoxError) -> Self {
        let stack = error_chain(err.as_ref());
        Self {
            plugin: plugin.to_string(),
            phase,
            message: err.to_string(),
            stack,
            component_stack: component_stack(plugin, phase),
            panicked: false,
        }
    }

    fn from_panic(plugin: &str, phase: LifecyclePhase, message: String) -> Self {
        Self {
            plugin: plugin.to_string(),
            phase,
            message,
            stack: Vec::new(),
            component_stack: component_stack(plugin, phase),
            panicked: true,
        }
    }

    pub(crate) fn missing_loader(plugin: &str) -> Self {
        Self {
            plugin: plugin.to_string(),
            phase: LifecyclePhase::Load,
            message: "definition has no component loader".to_string(),
            stack: Vec::new(),
            component_stack: component_stack(plugin, LifecyclePhase::Load),
            panicked: false,
        }
    }

    /// Payload of the `plugin:error` event reporting this failure
    pub fn to_event_payload(&self) -> Value {
        json!({
            "error": self.message,
            "stack": self.stack.join("\n"),
            "componentStack": self.component_stack,
            "phase": self.phase,
        })
    }
}

fn component_stack(plugin: &str, phase: LifecyclePhase) -> String {
    format!("in {} (plugin '{}')\nin PluginBoundary\nin PluginRenderer", phase, plugin)
}

/// Run synchronous plugin code inside the boundary
pub fn contain<T, F>(plugin: &str, phase: LifecyclePhase, f: F) -> Result<T, RenderFailure>
where
    F: FnOnce() -> Result<T, BoxError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(RenderFailure::from_error(plugin, phase, err)),
        Err(panic_obj) => Err(RenderFailure::from_panic(plugin, phase, panic_message(panic_obj.as_ref()))),
    }
}

/// Await plugin code inside the boundary
pub async fn contain_async<T, Fut>(plugin: &str, phase: LifecyclePhase, fut: Fut) -> Result<T, RenderFailure>
where
    Fut: Future<Output = Result<T, BoxError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(RenderFailure::from_error(plugin, phase, err)),
        Err(panic_obj) => Err(RenderFailure::from_panic(plugin, phase, panic_message(panic_obj.as_ref()))),
    }
}
