//! Host Renderer
//!
//! A minimal retained renderer: it mounts a [`Component`](crate::view::Component)
//! tree as a tree of scopes, each with its own subscriptions, hooks and
//! cached output, and re-renders only the scopes whose reads changed.

mod config;
mod cx;
mod renderer;
mod scope;

pub use config::RendererConfig;
pub use cx::Cx;
pub use renderer::Renderer;
pub use scope::ScopeId;
