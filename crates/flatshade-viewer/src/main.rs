//! Reference host for the flatshade stages.
//!
//! Opens a window, builds the pipeline from the core's descriptors, and
//! updates `view_proj` every frame from a keyboard-driven camera.
//! Usage: `flatshade-viewer [config.toml]`.

mod camera;
mod config;
mod gpu;
mod mesh;
mod pipeline;
mod runtime;

use anyhow::Result;
use flatshade::logging::init_logging;

use config::ViewerConfig;
use mesh::Mesh;
use runtime::Runtime;

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_PATH.to_string());

    let config = ViewerConfig::load_from_path(&path)?;
    init_logging(config.logging());
    log::debug!("config from {path}: {config:?}");

    log::info!("W/S/A/D move, Q/E turn, Esc quits");
    Runtime::run(config, Mesh::demo())
}
