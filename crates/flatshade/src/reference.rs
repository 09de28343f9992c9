//! CPU model of the two stages.
//!
//! Same arithmetic as the device program: IEEE-754 f32, no clamping, no
//! perspective divide. Every call is an independent invocation; nothing is
//! carried between calls.

use glam::Vec3;

use crate::{FillColor, Uniforms, Vertex};

/// Homogeneous clip-space position produced by the vertex stage.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClipPosition(pub [f32; 4]);

impl ClipPosition {
    #[inline]
    pub fn x(self) -> f32 {
        self.0[0]
    }

    #[inline]
    pub fn y(self) -> f32 {
        self.0[1]
    }

    #[inline]
    pub fn z(self) -> f32 {
        self.0[2]
    }

    #[inline]
    pub fn w(self) -> f32 {
        self.0[3]
    }

    /// Bitwise equality, distinguishing `-0.0` from `0.0` and comparing NaNs by payload.
    pub fn bit_eq(self, other: Self) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

/// One vertex-stage invocation: `view_proj * vec4(position, 1.0)`.
pub fn vertex_stage(uniforms: &Uniforms, vertex: Vertex) -> ClipPosition {
    let v = Vec3::from_array(vertex.position).extend(1.0);
    ClipPosition((uniforms.view_proj() * v).to_array())
}

/// One fragment-stage invocation. The stage has no inputs; only the pipeline
/// constants decide the result.
#[inline]
pub fn fragment_stage(fill: FillColor) -> [f32; 4] {
    fill.to_array()
}

/// Fragment output of a pipeline created without override constants.
#[inline]
pub fn fragment_stage_default() -> [f32; 4] {
    fragment_stage(FillColor::default())
}

/// Runs the vertex stage once per vertex of a draw.
pub fn transform_all(uniforms: &Uniforms, vertices: &[Vertex]) -> Vec<ClipPosition> {
    vertices.iter().map(|v| vertex_stage(uniforms, *v)).collect()
}
