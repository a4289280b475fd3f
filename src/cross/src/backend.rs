//! The seam between the compilation passes and SPIRV-Cross.
//!
//! Passes only see the `Annotate` and `Backend` traits, so they can run
//! against a recording implementation in tests.

use std::collections::HashMap;

use log::trace;
use spirv_cross2::compile::{glsl, hlsl, msl, CompilableTarget};
use spirv_cross2::handle::{Handle, TypeId, VariableId};
use spirv_cross2::reflect::DecorationValue;
use spirv_cross2::spirv::Decoration;
use spirv_cross2::targets::{Glsl, Hlsl, Msl};
use spirv_cross2::{Compiler, Module};

use crate::*;

/// Names and decorations that passes may rewrite before emission.
pub trait Annotate {
    /// The name the backend will emit for `id`.
    fn name_of(&mut self, id: u32) -> Result<String>;

    fn rename(&mut self, id: u32, name: &str) -> Result<()>;

    /// Marks a matrix member of a struct as column-major.
    fn set_column_major(&mut self, struct_id: u32, member: u32) -> Result<()>;

    /// Removes a `RowMajor` decoration from a struct member.
    fn clear_row_major(&mut self, struct_id: u32, member: u32) -> Result<()>;
}

/// A combined image-sampler binding synthesized from an image and a
/// sampler used together.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CombinedSampler {
    pub combined_id: u32,
    pub image_id: u32,
    pub sampler_id: u32,
}

/// A configured code generator for one target.
pub trait Backend: Annotate {
    /// Builds a combined image-sampler for every image/sampler pair the
    /// module uses together. Backends with separate sampler objects
    /// produce none.
    fn combine_samplers(&mut self) -> Result<Vec<CombinedSampler>> {
        Ok(Vec::new())
    }

    fn emit_source(&mut self) -> Result<String>;
}

/// A SPIRV-Cross compiler for one target together with the options it
/// will compile with.
///
/// Passes address ids by number, so the handles of every resource
/// variable and its block type are collected up front.
pub struct CrossCompiler<T: CompilableTarget> {
    // Taken by `emit_source`
    compiler: Option<Compiler<T>>,
    options: T::Options,
    variables: HashMap<u32, Handle<VariableId>>,
    types: HashMap<u32, Handle<TypeId>>,
}

impl<T: CompilableTarget> std::fmt::Debug for CrossCompiler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossCompiler")
            .field("compiled", &self.compiler.is_none())
            .field("variables", &self.variables.len())
            .field("types", &self.types.len())
            .finish()
    }
}

fn unknown_id(id: u32) -> CrossError {
    CrossError::Backend(format!("no resource with id {}", id))
}

fn already_compiled() -> CrossError {
    CrossError::Backend("module already compiled".to_owned())
}

impl<T: CompilableTarget> CrossCompiler<T> {
    pub fn new(words: &[u32], options: T::Options) -> Result<Self> {
        let compiler = Compiler::<T>::new(Module::from_words(words))?;
        let resources = compiler.shader_resources()?.all_resources()?;
        let lists = [
            &resources.uniform_buffers,
            &resources.storage_buffers,
            &resources.push_constant_buffers,
            &resources.sampled_images,
            &resources.separate_images,
            &resources.separate_samplers,
            &resources.storage_images,
            &resources.stage_inputs,
            &resources.stage_outputs,
        ];
        let mut variables = HashMap::new();
        let mut types = HashMap::new();
        for res in lists.iter().flat_map(|list| list.iter()) {
            variables.insert(res.id.id(), res.id);
            types.insert(res.base_type_id.id(), res.base_type_id);
        }
        trace!(
            "CrossCompiler::new: {} variables, {} types",
            variables.len(), types.len(),
        );
        Ok(Self { compiler: Some(compiler), options, variables, types })
    }

    fn compiler(&mut self) -> Result<&mut Compiler<T>> {
        self.compiler.as_mut().ok_or_else(already_compiled)
    }

    fn variable(&self, id: u32) -> Result<Handle<VariableId>> {
        self.variables.get(&id).copied().ok_or_else(|| unknown_id(id))
    }

    fn struct_type(&self, id: u32) -> Result<Handle<TypeId>> {
        self.types.get(&id).copied().ok_or_else(|| unknown_id(id))
    }

    fn compile(&mut self) -> Result<String> {
        let compiler = self.compiler.take().ok_or_else(already_compiled)?;
        let artifact = compiler.compile(&self.options)?;
        Ok(artifact.to_string())
    }
}

impl<T: CompilableTarget> Annotate for CrossCompiler<T> {
    fn name_of(&mut self, id: u32) -> Result<String> {
        let handle = self.variable(id)?;
        let name = self.compiler()?.name(handle)?;
        Ok(name.map(|name| name.to_string()).unwrap_or_default())
    }

    fn rename(&mut self, id: u32, name: &str) -> Result<()> {
        trace!("Annotate::rename: {} -> {}", id, name);
        let handle = self.variable(id)?;
        Ok(self.compiler()?.set_name(handle, name)?)
    }

    fn set_column_major(&mut self, struct_id: u32, member: u32) -> Result<()> {
        trace!("Annotate::set_column_major: {}[{}]", struct_id, member);
        let handle = self.struct_type(struct_id)?;
        Ok(self.compiler()?.set_member_decoration_by_handle(
            handle,
            member,
            Decoration::ColMajor,
            Some(DecorationValue::Present),
        )?)
    }

    fn clear_row_major(&mut self, struct_id: u32, member: u32) -> Result<()> {
        trace!("Annotate::clear_row_major: {}[{}]", struct_id, member);
        let handle = self.struct_type(struct_id)?;
        Ok(self.compiler()?.set_member_decoration_by_handle(
            handle,
            member,
            Decoration::RowMajor,
            DecorationValue::unset(),
        )?)
    }
}

impl Backend for CrossCompiler<Glsl> {
    fn combine_samplers(&mut self) -> Result<Vec<CombinedSampler>> {
        let compiler = self.compiler()?;
        let proof = compiler.create_dummy_sampler_for_combined_images()?;
        compiler.build_combined_image_samplers(proof)?;
        let combined: Vec<_> = compiler.combined_image_samplers()?.collect();
        let mut pairs = Vec::with_capacity(combined.len());
        for cis in combined {
            // Combined bindings are new variables; later renames need them
            self.variables.insert(cis.combined_id.id(), cis.combined_id);
            pairs.push(CombinedSampler {
                combined_id: cis.combined_id.id(),
                image_id: cis.image_id.id(),
                sampler_id: cis.sampler_id.id(),
            });
        }
        Ok(pairs)
    }

    fn emit_source(&mut self) -> Result<String> {
        self.compile()
    }
}

impl Backend for CrossCompiler<Hlsl> {
    fn emit_source(&mut self) -> Result<String> {
        self.compile()
    }
}

impl Backend for CrossCompiler<Msl> {
    fn emit_source(&mut self) -> Result<String> {
        self.compile()
    }
}

/// Maps a GLSL version number onto the closest version the backend
/// knows. ES versions round down to the nearest ES release.
pub fn glsl_version(options: &GlslOptions) -> Option<glsl::GlslVersion> {
    use glsl::GlslVersion::*;
    Some(match (options.es, options.version) {
        (true, 100..=299) => Glsl100Es,
        (true, 300..=309) => Glsl300Es,
        (true, 310..=319) => Glsl310Es,
        (true, v) if v >= 320 => Glsl320Es,
        (false, 110) => Glsl110,
        (false, 120) => Glsl120,
        (false, 130) => Glsl130,
        (false, 140) => Glsl140,
        (false, 150) => Glsl150,
        (false, 330) => Glsl330,
        (false, 400) => Glsl400,
        (false, 410) => Glsl410,
        (false, 420) => Glsl420,
        (false, 430) => Glsl430,
        (false, 440) => Glsl440,
        (false, 450) => Glsl450,
        (false, 460) => Glsl460,
        _ => return None,
    })
}

pub fn shader_model(options: &HlslOptions) -> Option<hlsl::HlslShaderModel> {
    use hlsl::HlslShaderModel::*;
    Some(match options.shader_model {
        30 => ShaderModel3_0,
        40 => ShaderModel4_0,
        41 => ShaderModel4_1,
        50 => ShaderModel5_0,
        51 => ShaderModel5_1,
        60 => ShaderModel6_0,
        _ => return None,
    })
}

pub(crate) fn glsl_compiler_options(
    target: ShadingLanguage,
    options: &GlslOptions,
) -> Result<glsl::CompilerOptions> {
    let version = glsl_version(options).ok_or(
        CrossError::UnsupportedVersion { target, version: options.version },
    )?;
    let mut opts = Glsl::options();
    opts.version = version;
    opts.vulkan_semantics = options.vulkan_semantics;
    opts.enable_420pack_extension = options.enable_420pack_extension;
    Ok(opts)
}

pub(crate) fn hlsl_compiler_options(options: &HlslOptions) ->
    Result<hlsl::CompilerOptions>
{
    let model = shader_model(options).ok_or(
        CrossError::UnsupportedVersion {
            target: ShadingLanguage::Hlsl,
            version: options.shader_model,
        },
    )?;
    let mut opts = Hlsl::options();
    opts.shader_model = model;
    Ok(opts)
}

pub(crate) fn msl_compiler_options(_: &MslOptions) -> msl::CompilerOptions {
    Msl::options()
}
