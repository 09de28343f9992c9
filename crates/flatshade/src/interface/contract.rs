use crate::shader::{COLOR_LOCATION, FRAGMENT_ENTRY, VERTEX_ENTRY};
use crate::{Uniforms, Vertex};

use super::{Io, IoFormat};

/// Resource slot plus the byte size the host binds there.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformSlot {
    pub group: u32,
    pub binding: u32,
    pub size: u32,
}

/// What a host assumes about the device program when building a pipeline.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Contract {
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
    pub vertex_inputs: &'static [Io],
    pub fragment_outputs: &'static [Io],
    pub uniform: UniformSlot,
}

const FLAT_VERTEX_INPUTS: [Io; 1] = [Io::new(Vertex::POSITION_LOCATION, IoFormat::F32X3)];
const FLAT_FRAGMENT_OUTPUTS: [Io; 1] = [Io::new(COLOR_LOCATION, IoFormat::F32X4)];

impl Contract {
    /// The contract of the shipped flat-color program.
    pub const fn flat() -> Self {
        Self {
            vertex_entry: VERTEX_ENTRY,
            fragment_entry: FRAGMENT_ENTRY,
            vertex_inputs: &FLAT_VERTEX_INPUTS,
            fragment_outputs: &FLAT_FRAGMENT_OUTPUTS,
            uniform: UniformSlot {
                group: Uniforms::GROUP,
                binding: Uniforms::BINDING,
                size: Uniforms::SIZE as u32,
            },
        }
    }
}

impl Default for Contract {
    fn default() -> Self {
        Self::flat()
    }
}
