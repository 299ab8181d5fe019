use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("Failed to read shader source {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse shader {path:?}:\n{diagnostic}")]
    Parse { path: PathBuf, diagnostic: String },
    #[error("Shader {path:?} has no entry point `{entry}`")]
    MissingEntryPoint { path: PathBuf, entry: &'static str },
    #[error("Failed to compile shader {path:?}:\n{diagnostic}")]
    Compile { path: PathBuf, diagnostic: String },
}

/// Where a `var<uniform>` lives in the bind group layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
}

/// Compiled vertex/fragment WGSL pair
pub struct Shader {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    uniforms: HashMap<String, UniformLocation>,
}

impl Shader {
    /// Read, validate and compile both stages.
    ///
    /// Compilation runs inside a validation error scope, so a broken shader
    /// comes back as `ShaderError::Compile` with the compiler's message instead
    /// of aborting the device.
    pub fn create(
        device: &wgpu::Device,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let vertex_path = vertex_path.as_ref();
        let fragment_path = fragment_path.as_ref();

        let (vertex_source, vertex_module) = read_source(vertex_path, VERTEX_ENTRY)?;
        let (fragment_source, fragment_module) = read_source(fragment_path, FRAGMENT_ENTRY)?;

        let vertex = compile(device, vertex_path, &vertex_source)?;
        let fragment = compile(device, fragment_path, &fragment_source)?;

        let mut uniforms = reflect_uniforms(&vertex_module);
        uniforms.extend(reflect_uniforms(&fragment_module));
        log::debug!("Shader uniforms: {:?}", uniforms);

        Ok(Self {
            vertex,
            fragment,
            uniforms,
        })
    }

    pub fn vertex_module(&self) -> &wgpu::ShaderModule {
        &self.vertex
    }

    pub fn fragment_module(&self) -> &wgpu::ShaderModule {
        &self.fragment
    }

    /// Look up a uniform by variable name.
    ///
    /// A name that neither stage declares is reported once here and yields
    /// `None`; writes aimed at it are dropped by the caller.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        let location = self.uniforms.get(name).copied();
        if location.is_none() {
            log::warn!("Unable to locate uniform '{}' in shader", name);
        }
        location
    }
}

/// Read a WGSL file and parse it, requiring an entry point named `entry`
fn read_source(path: &Path, entry: &'static str) -> Result<(String, naga::Module), ShaderError> {
    let source = std::fs::read_to_string(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let module = parse_wgsl(path, &source)?;
    check_entry_point(&module, path, entry)?;
    Ok((source, module))
}

fn parse_wgsl(path: &Path, source: &str) -> Result<naga::Module, ShaderError> {
    naga::front::wgsl::parse_str(source).map_err(|error| ShaderError::Parse {
        path: path.to_path_buf(),
        diagnostic: error.emit_to_string(source),
    })
}

fn check_entry_point(module: &naga::Module, path: &Path, entry: &'static str) -> Result<(), ShaderError> {
    if module.entry_points.iter().any(|ep| ep.name == entry) {
        Ok(())
    } else {
        Err(ShaderError::MissingEntryPoint {
            path: path.to_path_buf(),
            entry,
        })
    }
}

fn compile(device: &wgpu::Device, path: &Path, source: &str) -> Result<wgpu::ShaderModule, ShaderError> {
    let label = path.to_string_lossy();
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(ShaderError::Compile {
            path: path.to_path_buf(),
            diagnostic: error.to_string(),
        }),
        None => Ok(module),
    }
}

/// Named `var<uniform>` globals of a parsed module and their bindings
pub fn reflect_uniforms(module: &naga::Module) -> HashMap<String, UniformLocation> {
    module
        .global_variables
        .iter()
        .filter(|(_, var)| var.space == naga::AddressSpace::Uniform)
        .filter_map(|(_, var)| {
            let name = var.name.clone()?;
            let binding = var.binding.as_ref()?;
            Some((
                name,
                UniformLocation {
                    group: binding.group,
                    binding: binding.binding,
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "
struct FrameUniforms {
    projection: mat4x4<f32>,
    illumination: mat4x4<f32>,
}

struct ObjectUniforms {
    model_view: mat4x4<f32>,
}

@group(0) @binding(0) var<uniform> frame: FrameUniforms;
// @group(3) @binding(3) var<uniform> line_commented: FrameUniforms;
/* @group(3) @binding(4) var<uniform> block_commented: FrameUniforms; */
@group(1)
@binding( 0 )
var<uniform> object: ObjectUniforms;
@group(2) @binding(0) var tex: texture_2d<f32>;

fn vs_main_old() -> vec4<f32> {
    return vec4<f32>(0.0);
}

@vertex
fn vs_main_legacy() -> @builtin(position) vec4<f32> {
    return vs_main_old();
}
";

    fn parse(source: &str) -> naga::Module {
        parse_wgsl(Path::new("test.wgsl"), source).expect("valid WGSL")
    }

    #[test]
    fn test_reflect_finds_uniforms() {
        let uniforms = reflect_uniforms(&parse(SOURCE));
        assert_eq!(uniforms.len(), 2);
        assert_eq!(uniforms["frame"], UniformLocation { group: 0, binding: 0 });
        assert_eq!(uniforms["object"], UniformLocation { group: 1, binding: 0 });
    }

    #[test]
    fn test_reflect_skips_comments_and_textures() {
        let uniforms = reflect_uniforms(&parse(SOURCE));
        assert!(!uniforms.contains_key("line_commented"));
        assert!(!uniforms.contains_key("block_commented"));
        assert!(!uniforms.contains_key("tex"));
    }

    #[test]
    fn test_entry_point_needs_exact_name() {
        let module = parse(SOURCE);
        let path = Path::new("test.wgsl");
        assert!(check_entry_point(&module, path, "vs_main_legacy").is_ok());
        let err = check_entry_point(&module, path, VERTEX_ENTRY).unwrap_err();
        assert!(matches!(err, ShaderError::MissingEntryPoint { entry: "vs_main", .. }));
    }

    #[test]
    fn test_parse_error_carries_diagnostic() {
        let err = parse_wgsl(Path::new("broken.wgsl"), "fn broken( {").unwrap_err();
        match err {
            ShaderError::Parse { path, diagnostic } => {
                assert_eq!(path, PathBuf::from("broken.wgsl"));
                assert!(!diagnostic.is_empty());
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_source_file() {
        let err = read_source(Path::new("no/such/shader.wgsl"), VERTEX_ENTRY).unwrap_err();
        assert!(matches!(err, ShaderError::Read { .. }));
    }

    #[test]
    fn test_shipped_shaders_declare_entry_points_and_uniforms() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders");
        let (_, vertex) = read_source(&dir.join("vertex.wgsl"), VERTEX_ENTRY).expect("vertex shader");
        let (_, fragment) = read_source(&dir.join("fragment.wgsl"), FRAGMENT_ENTRY).expect("fragment shader");

        let vs = reflect_uniforms(&vertex);
        let fs = reflect_uniforms(&fragment);
        assert_eq!(vs.get("object"), Some(&UniformLocation { group: 1, binding: 0 }));
        assert_eq!(vs.get("frame"), Some(&UniformLocation { group: 0, binding: 0 }));
        assert_eq!(fs.get("frame"), Some(&UniformLocation { group: 0, binding: 0 }));
    }
}
