//! vellum library: template rendering over vault-backed secrets.

pub mod env;
pub mod render;

pub use render::{RenderError, Renderer};
