//! Host-side check of the WGSL program against the binding contract.
//!
//! The graphics API rejects a pipeline whose layout disagrees with the
//! program (wrong binding, attribute format, output count). This module finds
//! the same class of mismatch on the host with `naga`, so a broken shader is
//! reported with names and locations instead of a driver validation message.

mod contract;
mod error;

use std::fmt;

use naga::{AddressSpace, Binding, BuiltIn, Module, TypeInner, VectorSize};

pub use contract::{Contract, UniformSlot};
pub use error::InterfaceError;

/// Pipeline stage of an entry point.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Stage {
    Vertex,
    Fragment,
    Compute,
    Other,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
            Stage::Compute => "compute",
            Stage::Other => "other",
        })
    }
}

impl From<naga::ShaderStage> for Stage {
    fn from(s: naga::ShaderStage) -> Self {
        match s {
            naga::ShaderStage::Vertex => Stage::Vertex,
            naga::ShaderStage::Fragment => Stage::Fragment,
            naga::ShaderStage::Compute => Stage::Compute,
            _ => Stage::Other,
        }
    }
}

/// Shape of a user-defined stage input or output.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct IoFormat {
    pub components: u8,
    pub is_f32: bool,
}

impl IoFormat {
    pub const F32X3: Self = Self { components: 3, is_f32: true };
    pub const F32X4: Self = Self { components: 4, is_f32: true };
}

impl fmt::Debug for IoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scalar = if self.is_f32 { "f32" } else { "?" };
        match self.components {
            1 => write!(f, "{scalar}"),
            n => write!(f, "vec{n}<{scalar}>"),
        }
    }
}

/// A `@location(n)` input or output.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Io {
    pub location: u32,
    pub format: IoFormat,
}

impl Io {
    pub const fn new(location: u32, format: IoFormat) -> Self {
        Self { location, format }
    }
}

impl fmt::Debug for Io {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@location({}) {:?}", self.location, self.format)
    }
}

#[derive(Debug, Clone)]
pub struct EntryPointInfo {
    pub name: String,
    pub stage: Stage,
    /// Location inputs, sorted by location. Builtins are excluded.
    pub inputs: Vec<Io>,
    /// Location outputs, sorted by location.
    pub outputs: Vec<Io>,
    pub writes_position: bool,
}

#[derive(Debug, Clone)]
pub struct UniformBlock {
    pub group: u32,
    pub binding: u32,
    pub size: u32,
    /// The block starts with (or is) a column-major `mat4x4<f32>`.
    pub leading_mat4x4_f32: bool,
}

/// Address space of a bound resource.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResourceKind {
    Uniform,
    Storage,
    /// Textures and samplers.
    Handle,
    Other,
}

impl From<AddressSpace> for ResourceKind {
    fn from(space: AddressSpace) -> Self {
        match space {
            AddressSpace::Uniform => ResourceKind::Uniform,
            AddressSpace::Storage { .. } => ResourceKind::Storage,
            AddressSpace::Handle => ResourceKind::Handle,
            _ => ResourceKind::Other,
        }
    }
}

/// Any global declared with `@group(g) @binding(b)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BoundResource {
    pub group: u32,
    pub binding: u32,
    pub kind: ResourceKind,
}

/// Reflected interface of a WGSL module.
#[derive(Debug, Clone)]
pub struct ShaderInterface {
    pub entry_points: Vec<EntryPointInfo>,
    pub uniforms: Vec<UniformBlock>,
    /// Every bound global, uniform blocks included.
    pub resources: Vec<BoundResource>,
    /// Names of pipeline-overridable constants.
    pub overrides: Vec<String>,
}

/// Parses, validates and reflects `source`.
pub fn reflect(source: &str) -> Result<ShaderInterface, InterfaceError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| InterfaceError::Parse(e.emit_to_string(source)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    )
    .validate(&module)
    .map_err(|e| InterfaceError::Validation(e.emit_to_string(source)))?;

    let entry_points = module
        .entry_points
        .iter()
        .map(|ep| {
            let mut inputs = Vec::new();
            for arg in &ep.function.arguments {
                collect_locations(&module, arg.binding.as_ref(), arg.ty, &mut inputs);
            }

            let mut outputs = Vec::new();
            let mut writes_position = false;
            if let Some(result) = &ep.function.result {
                collect_locations(&module, result.binding.as_ref(), result.ty, &mut outputs);
                writes_position = writes_builtin_position(&module, result.binding.as_ref(), result.ty);
            }

            inputs.sort_by_key(|io| io.location);
            outputs.sort_by_key(|io| io.location);

            EntryPointInfo {
                name: ep.name.clone(),
                stage: ep.stage.into(),
                inputs,
                outputs,
                writes_position,
            }
        })
        .collect::<Vec<_>>();

    let uniforms = module
        .global_variables
        .iter()
        .filter(|(_, var)| matches!(var.space, AddressSpace::Uniform))
        .filter_map(|(_, var)| {
            let rb = var.binding.as_ref()?;
            let inner = &module.types[var.ty].inner;
            Some(UniformBlock {
                group: rb.group,
                binding: rb.binding,
                size: inner.size(module.to_ctx()),
                leading_mat4x4_f32: leading_mat4x4_f32(&module, inner),
            })
        })
        .collect::<Vec<_>>();

    let resources = module
        .global_variables
        .iter()
        .filter_map(|(_, var)| {
            let rb = var.binding.as_ref()?;
            Some(BoundResource {
                group: rb.group,
                binding: rb.binding,
                kind: var.space.into(),
            })
        })
        .collect::<Vec<_>>();

    let overrides = module
        .overrides
        .iter()
        .filter_map(|(_, o)| o.name.clone())
        .collect::<Vec<_>>();

    log::debug!(
        "reflected WGSL: {} entry points, {} bound resources, {} overrides",
        entry_points.len(),
        resources.len(),
        overrides.len()
    );

    Ok(ShaderInterface {
        entry_points,
        uniforms,
        resources,
        overrides,
    })
}

/// Reflects `source` and verifies it against [`Contract::flat`].
pub fn check(source: &str) -> Result<ShaderInterface, InterfaceError> {
    let iface = reflect(source)?;
    iface.verify(&Contract::flat())?;
    Ok(iface)
}

impl ShaderInterface {
    pub fn entry_point(&self, name: &str, stage: Stage) -> Option<&EntryPointInfo> {
        self.entry_points
            .iter()
            .find(|ep| ep.name == name && ep.stage == stage)
    }

    /// Checks every assumption `contract` makes about this program.
    pub fn verify(&self, contract: &Contract) -> Result<(), InterfaceError> {
        self.verify_vertex(contract)?;
        self.verify_fragment(contract)?;
        self.verify_uniform(contract)
    }

    fn verify_vertex(&self, contract: &Contract) -> Result<(), InterfaceError> {
        let name = contract.vertex_entry;
        let vs = self
            .entry_point(name, Stage::Vertex)
            .ok_or_else(|| InterfaceError::MissingEntryPoint {
                name: name.to_string(),
                stage: Stage::Vertex,
            })?;

        if vs.inputs != contract.vertex_inputs {
            return Err(InterfaceError::VertexInput {
                entry: vs.name.clone(),
                expected: contract.vertex_inputs.to_vec(),
                found: vs.inputs.clone(),
            });
        }

        if !vs.writes_position {
            return Err(InterfaceError::MissingPosition {
                entry: vs.name.clone(),
            });
        }

        if !vs.outputs.is_empty() {
            return Err(InterfaceError::Varyings {
                entry: vs.name.clone(),
                locations: vs.outputs.iter().map(|io| io.location).collect(),
            });
        }

        Ok(())
    }

    fn verify_fragment(&self, contract: &Contract) -> Result<(), InterfaceError> {
        let name = contract.fragment_entry;
        let fs = self
            .entry_point(name, Stage::Fragment)
            .ok_or_else(|| InterfaceError::MissingEntryPoint {
                name: name.to_string(),
                stage: Stage::Fragment,
            })?;

        if !fs.inputs.is_empty() {
            return Err(InterfaceError::FragmentInput {
                entry: fs.name.clone(),
                locations: fs.inputs.iter().map(|io| io.location).collect(),
            });
        }

        if fs.outputs != contract.fragment_outputs {
            return Err(InterfaceError::FragmentOutput {
                entry: fs.name.clone(),
                expected: contract.fragment_outputs.to_vec(),
                found: fs.outputs.clone(),
            });
        }

        Ok(())
    }

    fn verify_uniform(&self, contract: &Contract) -> Result<(), InterfaceError> {
        let slot = contract.uniform;

        // The host binds one uniform buffer and nothing else.
        if let Some(extra) = self.resources.iter().find(|r| {
            r.kind != ResourceKind::Uniform || (r.group, r.binding) != (slot.group, slot.binding)
        }) {
            return Err(InterfaceError::UnexpectedBinding {
                group: extra.group,
                binding: extra.binding,
            });
        }

        let block = self
            .uniforms
            .iter()
            .find(|u| u.group == slot.group && u.binding == slot.binding)
            .ok_or(InterfaceError::UniformBinding {
                group: slot.group,
                binding: slot.binding,
            })?;

        if block.size != slot.size {
            return Err(InterfaceError::UniformLayout {
                group: slot.group,
                binding: slot.binding,
                reason: format!("block is {} bytes, host uploads {}", block.size, slot.size),
            });
        }

        if !block.leading_mat4x4_f32 {
            return Err(InterfaceError::UniformLayout {
                group: slot.group,
                binding: slot.binding,
                reason: "block does not start with mat4x4<f32>".to_string(),
            });
        }

        Ok(())
    }
}

fn io_format(inner: &TypeInner) -> Option<IoFormat> {
    match *inner {
        TypeInner::Scalar(scalar) => Some(IoFormat {
            components: 1,
            is_f32: scalar == naga::Scalar::F32,
        }),
        TypeInner::Vector { size, scalar } => Some(IoFormat {
            components: size as u8,
            is_f32: scalar == naga::Scalar::F32,
        }),
        _ => None,
    }
}

fn collect_locations(
    module: &Module,
    binding: Option<&Binding>,
    ty: naga::Handle<naga::Type>,
    out: &mut Vec<Io>,
) {
    let inner = &module.types[ty].inner;
    match binding {
        Some(Binding::Location { location, .. }) => {
            if let Some(format) = io_format(inner) {
                out.push(Io::new(*location, format));
            }
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = inner {
                for m in members {
                    collect_locations(module, m.binding.as_ref(), m.ty, out);
                }
            }
        }
    }
}

fn writes_builtin_position(
    module: &Module,
    binding: Option<&Binding>,
    ty: naga::Handle<naga::Type>,
) -> bool {
    match binding {
        Some(Binding::BuiltIn(BuiltIn::Position { .. })) => true,
        Some(_) => false,
        None => match &module.types[ty].inner {
            TypeInner::Struct { members, .. } => members
                .iter()
                .any(|m| writes_builtin_position(module, m.binding.as_ref(), m.ty)),
            _ => false,
        },
    }
}

fn leading_mat4x4_f32(module: &Module, inner: &TypeInner) -> bool {
    let is_mat4 = |t: &TypeInner| {
        matches!(
            t,
            TypeInner::Matrix {
                columns: VectorSize::Quad,
                rows: VectorSize::Quad,
                scalar,
            } if *scalar == naga::Scalar::F32
        )
    };

    match inner {
        TypeInner::Struct { members, .. } => members
            .first()
            .is_some_and(|m| m.offset == 0 && is_mat4(&module.types[m.ty].inner)),
        other => is_mat4(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::SOURCE;

    fn mutate(from: &str, to: &str) -> String {
        assert!(SOURCE.contains(from), "fixture drift: `{from}` not in shader");
        SOURCE.replacen(from, to, 1)
    }

    // ── reflection ────────────────────────────────────────────────────────

    #[test]
    fn reflects_shipped_program() {
        let iface = reflect(SOURCE).unwrap();

        let vs = iface.entry_point("vs_main", Stage::Vertex).unwrap();
        assert_eq!(vs.inputs, vec![Io::new(0, IoFormat::F32X3)]);
        assert!(vs.outputs.is_empty());
        assert!(vs.writes_position);

        let fs = iface.entry_point("fs_main", Stage::Fragment).unwrap();
        assert!(fs.inputs.is_empty());
        assert_eq!(fs.outputs, vec![Io::new(0, IoFormat::F32X4)]);

        assert_eq!(iface.uniforms.len(), 1);
        let u = &iface.uniforms[0];
        assert_eq!((u.group, u.binding, u.size), (0, 0, 64));
        assert!(u.leading_mat4x4_f32);
        assert_eq!(
            iface.resources,
            vec![BoundResource { group: 0, binding: 0, kind: ResourceKind::Uniform }]
        );
    }

    #[test]
    fn reflects_fill_overrides() {
        let iface = reflect(SOURCE).unwrap();
        for name in crate::fill::OVERRIDE_NAMES {
            assert!(iface.overrides.iter().any(|o| o == name), "missing override {name}");
        }
    }

    #[test]
    fn shipped_program_passes() {
        check(SOURCE).unwrap();
    }

    // ── front end ─────────────────────────────────────────────────────────

    #[test]
    fn syntax_error_is_parse() {
        let src = mutate("fn fs_main()", "fn fs_main(");
        assert!(matches!(check(&src), Err(InterfaceError::Parse(_))));
    }

    #[test]
    fn type_error_is_validation() {
        // Parses, but the return type no longer matches the declared result.
        let src = mutate(
            "return vec4<f32>(fill_r, fill_g, fill_b, fill_a);",
            "return vec3<f32>(fill_r, fill_g, fill_b);",
        );
        assert!(matches!(
            check(&src),
            Err(InterfaceError::Parse(_) | InterfaceError::Validation(_))
        ));
    }

    // ── layout mismatches ─────────────────────────────────────────────────

    #[test]
    fn renamed_vertex_entry_is_missing() {
        let src = mutate("fn vs_main(", "fn vertex_main(");
        match check(&src) {
            Err(InterfaceError::MissingEntryPoint { name, stage }) => {
                assert_eq!(name, "vs_main");
                assert_eq!(stage, Stage::Vertex);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn renamed_fragment_entry_is_missing() {
        let src = mutate("fn fs_main(", "fn frag(");
        assert!(matches!(
            check(&src),
            Err(InterfaceError::MissingEntryPoint { stage: Stage::Fragment, .. })
        ));
    }

    #[test]
    fn wrong_attribute_location() {
        let src = mutate("@location(0) position", "@location(1) position");
        assert!(matches!(check(&src), Err(InterfaceError::VertexInput { .. })));
    }

    #[test]
    fn wrong_attribute_format() {
        let src = mutate(
            "@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {\n    return uniforms.view_proj * vec4<f32>(position, 1.0);",
            "@location(0) position: vec4<f32>) -> @builtin(position) vec4<f32> {\n    return uniforms.view_proj * position;",
        );
        assert!(matches!(check(&src), Err(InterfaceError::VertexInput { .. })));
    }

    #[test]
    fn wrong_uniform_binding() {
        let src = mutate("@group(0) @binding(0)", "@group(0) @binding(1)");
        assert!(matches!(
            check(&src),
            Err(InterfaceError::UnexpectedBinding { group: 0, binding: 1 })
        ));
    }

    #[test]
    fn extra_texture_binding_is_rejected() {
        let body = mutate(
            "return vec4<f32>(fill_r, fill_g, fill_b, fill_a);",
            "let d = f32(textureDimensions(t).x);\n    return vec4<f32>(fill_r, fill_g, fill_b, fill_a + d * 0.0);",
        );
        let src = format!("{body}\n@group(0) @binding(1) var t: texture_2d<f32>;\n");
        let iface = reflect(&src).unwrap();
        assert!(iface.resources.contains(&BoundResource {
            group: 0,
            binding: 1,
            kind: ResourceKind::Handle,
        }));
        assert!(matches!(
            iface.verify(&Contract::flat()),
            Err(InterfaceError::UnexpectedBinding { group: 0, binding: 1 })
        ));
    }

    #[test]
    fn storage_buffer_in_uniform_slot_is_rejected() {
        let src = mutate(
            "var<uniform> uniforms: Uniforms;",
            "var<storage, read> uniforms: Uniforms;",
        );
        assert!(matches!(
            check(&src),
            Err(InterfaceError::UnexpectedBinding { group: 0, binding: 0 })
        ));
    }

    #[test]
    fn oversized_uniform_block() {
        let src = mutate(
            "view_proj: mat4x4<f32>,\n",
            "view_proj: mat4x4<f32>,\n    extra: vec4<f32>,\n",
        );
        match check(&src) {
            Err(InterfaceError::UniformLayout { reason, .. }) => assert!(reason.contains("80")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn second_color_output_is_rejected() {
        let src = format!(
            "{SOURCE}\nstruct Two {{ @location(0) a: vec4<f32>, @location(1) b: vec4<f32> }}\n"
        )
        .replacen("fn fs_main() -> @location(0) vec4<f32> {\n    return vec4<f32>(fill_r, fill_g, fill_b, fill_a);",
            "fn fs_main() -> Two {\n    let c = vec4<f32>(fill_r, fill_g, fill_b, fill_a);\n    return Two(c, c);",
            1);
        match check(&src) {
            Err(InterfaceError::FragmentOutput { found, .. }) => assert_eq!(found.len(), 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    // ── contract directly ─────────────────────────────────────────────────

    #[test]
    fn varyings_are_rejected() {
        let mut iface = reflect(SOURCE).unwrap();
        let vs_idx = iface
            .entry_points
            .iter()
            .position(|ep| ep.stage == Stage::Vertex)
            .unwrap();
        iface.entry_points[vs_idx].outputs = vec![Io::new(0, IoFormat::F32X4)];
        assert!(matches!(
            iface.verify(&Contract::flat()),
            Err(InterfaceError::Varyings { .. })
        ));
    }

    #[test]
    fn missing_position_is_rejected() {
        let mut iface = reflect(SOURCE).unwrap();
        for ep in &mut iface.entry_points {
            ep.writes_position = false;
        }
        assert!(matches!(
            iface.verify(&Contract::flat()),
            Err(InterfaceError::MissingPosition { .. })
        ));
    }

    #[test]
    fn fragment_varying_input_is_rejected() {
        let mut iface = reflect(SOURCE).unwrap();
        for ep in iface.entry_points.iter_mut().filter(|ep| ep.stage == Stage::Fragment) {
            ep.inputs.push(Io::new(0, IoFormat::F32X4));
        }
        assert!(matches!(
            iface.verify(&Contract::flat()),
            Err(InterfaceError::FragmentInput { .. })
        ));
    }

    #[test]
    fn missing_uniform_is_rejected() {
        let mut iface = reflect(SOURCE).unwrap();
        iface.uniforms.clear();
        assert!(matches!(
            iface.verify(&Contract::flat()),
            Err(InterfaceError::UniformBinding { group: 0, binding: 0 })
        ));
    }

    #[test]
    fn error_messages_name_the_entry() {
        let err = InterfaceError::MissingEntryPoint {
            name: "vs_main".into(),
            stage: Stage::Vertex,
        };
        assert_eq!(err.to_string(), "missing vertex entry point `vs_main`");
    }
}
