//! The device program and the pipeline pieces a host assembles around it.
//!
//! Hosts select the stages by name when creating the pipeline object:
//! [`VERTEX_ENTRY`] and [`FRAGMENT_ENTRY`]. The vertex stage reads
//! [`Uniforms`](crate::Uniforms) at group 0, binding 0 and one
//! [`Vertex`](crate::Vertex) attribute at location 0; it passes no varyings.
//! The fragment stage writes a single RGBA value to color location 0.

/// WGSL source of both stages.
pub const SOURCE: &str = include_str!("shaders/flat.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Color attachment location written by the fragment stage.
pub const COLOR_LOCATION: u32 = 0;

pub fn module_descriptor() -> wgpu::ShaderModuleDescriptor<'static> {
    wgpu::ShaderModuleDescriptor {
        label: Some("flatshade shader"),
        source: wgpu::ShaderSource::Wgsl(SOURCE.into()),
    }
}

/// The single color target. The fragment output replaces the attachment.
pub fn color_target(format: wgpu::TextureFormat) -> wgpu::ColorTargetState {
    wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState::REPLACE),
        write_mask: wgpu::ColorWrites::ALL,
    }
}

/// Triangle lists, no culling: flat geometry is visible from both sides.
pub fn primitive_state() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_points_are_declared() {
        assert!(SOURCE.contains(&format!("fn {VERTEX_ENTRY}(")));
        assert!(SOURCE.contains(&format!("fn {FRAGMENT_ENTRY}(")));
    }

    #[test]
    fn shipped_source_satisfies_contract() {
        crate::interface::check(SOURCE).expect("shipped shader must match its contract");
    }

    #[test]
    fn color_target_replaces() {
        let t = color_target(wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(t.blend, Some(wgpu::BlendState::REPLACE));
        assert_eq!(t.write_mask, wgpu::ColorWrites::ALL);
        assert_eq!(t.format, wgpu::TextureFormat::Bgra8UnormSrgb);
    }

    #[test]
    fn descriptor_carries_wgsl() {
        let desc = module_descriptor();
        assert_eq!(desc.label, Some("flatshade shader"));
        assert!(matches!(desc.source, wgpu::ShaderSource::Wgsl(ref s) if s == SOURCE));
    }
}
