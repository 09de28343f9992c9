//! Fill color of the fragment stage.
//!
//! The shader exposes the color as pipeline-overridable constants
//! (`fill_r`, `fill_g`, `fill_b`, `fill_a`). Their declared defaults are the
//! compatibility color `(1, 0, 0, 1)`, so a pipeline built without constants
//! renders red.

/// Override constant names, in RGBA order.
pub const OVERRIDE_NAMES: [&str; 4] = ["fill_r", "fill_g", "fill_b", "fill_a"];

/// Straight-alpha RGBA color written to color attachment 0.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FillColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl FillColor {
    /// The color the fragment stage writes when no override is supplied.
    pub const RED: Self = Self { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };

    /// Creates a color, rejecting non-finite channels.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Option<Self> {
        let c = Self { r, g, b, a };
        c.is_finite().then_some(c)
    }

    /// Creates a color from `0`–`255` channel bytes.
    #[inline]
    pub fn from_rgba_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Constants for `wgpu::PipelineCompilationOptions::constants`.
    pub fn pipeline_constants(self) -> [(&'static str, f64); 4] {
        let [r, g, b, a] = self.to_array();
        [
            (OVERRIDE_NAMES[0], r as f64),
            (OVERRIDE_NAMES[1], g as f64),
            (OVERRIDE_NAMES[2], b as f64),
            (OVERRIDE_NAMES[3], a as f64),
        ]
    }
}

impl Default for FillColor {
    fn default() -> Self {
        Self::RED
    }
}

/// Takes the components as given, NaN and infinities included. Use
/// [`FillColor::new`] for untrusted input, or check [`FillColor::is_finite`].
impl From<[f32; 4]> for FillColor {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}
