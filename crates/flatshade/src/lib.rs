//! Flatshade core crate.
//!
//! A minimal WGSL stage pair: the vertex stage moves object-space positions to
//! clip space with a per-frame `view_proj` matrix, the fragment stage writes a
//! solid color. This crate owns the device program and the data contract a
//! host must honor to run it; creating and destroying GPU resources is left to
//! the host.

pub mod fill;
pub mod interface;
pub mod logging;
pub mod reference;
pub mod shader;
pub mod uniforms;
pub mod vertex;

pub use fill::FillColor;
pub use reference::ClipPosition;
pub use uniforms::Uniforms;
pub use vertex::Vertex;
