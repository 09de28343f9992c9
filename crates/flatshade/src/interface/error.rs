use super::{Io, Stage};

/// A mismatch between the WGSL program and what the host binds.
///
/// On the device these surface as pipeline-creation failures; checking on
/// the host reports them with names and locations before any GPU call.
#[derive(Debug, thiserror::Error)]
pub enum InterfaceError {
    #[error("WGSL parse error:\n{0}")]
    Parse(String),

    #[error("WGSL validation error:\n{0}")]
    Validation(String),

    #[error("missing {stage} entry point `{name}`")]
    MissingEntryPoint { name: String, stage: Stage },

    #[error("vertex entry `{entry}` reads {found:?}, host supplies {expected:?}")]
    VertexInput {
        entry: String,
        expected: Vec<Io>,
        found: Vec<Io>,
    },

    #[error("vertex entry `{entry}` does not write @builtin(position)")]
    MissingPosition { entry: String },

    #[error("vertex entry `{entry}` writes varyings at locations {locations:?}")]
    Varyings { entry: String, locations: Vec<u32> },

    #[error("fragment entry `{entry}` reads varyings at locations {locations:?}")]
    FragmentInput { entry: String, locations: Vec<u32> },

    #[error("fragment entry `{entry}` writes {found:?}, color targets expect {expected:?}")]
    FragmentOutput {
        entry: String,
        expected: Vec<Io>,
        found: Vec<Io>,
    },

    #[error("no uniform block at group {group}, binding {binding}")]
    UniformBinding { group: u32, binding: u32 },

    #[error("uniform at group {group}, binding {binding}: {reason}")]
    UniformLayout {
        group: u32,
        binding: u32,
        reason: String,
    },

    #[error("unexpected resource at group {group}, binding {binding}")]
    UnexpectedBinding { group: u32, binding: u32 },
}
