//! Viewer settings, read from an optional `flatshade.toml`.
//!
//! A missing file means defaults; a malformed file is an error.

use std::path::Path;

use anyhow::{Context, Result};
use flatshade::logging::LoggingConfig;
use flatshade::FillColor;
use serde::Deserialize;

use crate::gpu::GpuInit;

pub const DEFAULT_PATH: &str = "flatshade.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub graphics: GraphicsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "flatshade".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub present_mode: String,
    pub prefer_srgb: bool,
    pub clear_color: [f32; 4],
    /// Overrides the fragment color; unset keeps the shader default.
    pub fill_color: Option<[f32; 4]>,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            present_mode: "fifo".to_string(),
            prefer_srgb: true,
            clear_color: [0.0, 1.0, 0.0, 1.0],
            fill_color: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `env_logger` filter, e.g. "info,flatshade=debug".
    pub filter: Option<String>,
}

impl ViewerConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn present_mode(&self) -> wgpu::PresentMode {
        match self.graphics.present_mode.to_lowercase().as_str() {
            "fifo" => wgpu::PresentMode::Fifo,
            "fifo_relaxed" => wgpu::PresentMode::FifoRelaxed,
            "mailbox" => wgpu::PresentMode::Mailbox,
            "immediate" => wgpu::PresentMode::Immediate,
            "auto_vsync" => wgpu::PresentMode::AutoVsync,
            "auto_no_vsync" => wgpu::PresentMode::AutoNoVsync,
            other => {
                log::warn!("unknown present mode '{other}', using fifo");
                wgpu::PresentMode::Fifo
            }
        }
    }

    pub fn fill_color(&self) -> FillColor {
        match self.graphics.fill_color {
            None => FillColor::default(),
            Some([r, g, b, a]) => FillColor::new(r, g, b, a).unwrap_or_else(|| {
                log::warn!("fill_color has non-finite channels, using default");
                FillColor::default()
            }),
        }
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.graphics.clear_color;
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }

    pub fn gpu_init(&self) -> GpuInit {
        GpuInit {
            prefer_srgb: self.graphics.prefer_srgb,
            present_mode: self.present_mode(),
            ..Default::default()
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.log.filter.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        let cfg = ViewerConfig::parse("").unwrap();
        assert_eq!(cfg.window.title, "flatshade");
        assert_eq!((cfg.window.width, cfg.window.height), (1280, 720));
        assert_eq!(cfg.present_mode(), wgpu::PresentMode::Fifo);
        assert_eq!(cfg.fill_color(), FillColor::RED);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = ViewerConfig::parse(
            r#"
            [window]
            title = "triangles"

            [graphics]
            present_mode = "Mailbox"
            fill_color = [0.0, 0.0, 1.0, 1.0]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.window.title, "triangles");
        assert_eq!(cfg.window.width, 1280);
        assert_eq!(cfg.present_mode(), wgpu::PresentMode::Mailbox);
        assert_eq!(cfg.fill_color().to_array(), [0.0, 0.0, 1.0, 1.0]);
        assert!(cfg.graphics.prefer_srgb);
    }

    #[test]
    fn unknown_present_mode_falls_back() {
        let cfg = ViewerConfig::parse("[graphics]\npresent_mode = \"warp\"").unwrap();
        assert_eq!(cfg.present_mode(), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn malformed_file_is_error() {
        assert!(ViewerConfig::parse("[window]\nwidth = \"wide\"").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let cfg = ViewerConfig::load_from_path("does/not/exist/flatshade.toml").unwrap();
        assert_eq!(cfg.graphics.clear_color, [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn log_filter_reaches_logging_config() {
        let cfg = ViewerConfig::parse("[log]\nfilter = \"debug\"").unwrap();
        assert_eq!(cfg.logging().env_filter.as_deref(), Some("debug"));
    }
}
