//! # Panelhost Plugin Renderer
//!
//! Mount points for individual plugins. A [`PluginRenderer`] walks one
//! plugin through `Resolving -> Loading -> Mounted`, or stops early at
//! `NotFound` or `Disabled`. Plugin code only ever runs inside the
//! [`boundary`], so a failing plugin ends up `Errored` without disturbing the
//! host shell or its siblings.
pub mod boundary;
pub mod mount;
pub mod view;

pub use boundary::{LifecyclePhase, RenderFailure, contain, contain_async};
pub use mount::{LoadOutcome, PendingLoad, PluginRenderer, RenderState, RenderSurface};
pub use view::PluginView;
