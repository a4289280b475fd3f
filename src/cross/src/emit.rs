use enum_map::{enum_map, EnumMap};
use log::debug;
use spirv_cross2::targets::{Glsl, Hlsl, Msl};

use crate::*;

/// Generated source for one target.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    pub target: ShadingLanguage,
    pub source: String,
}

impl Output {
    pub fn new(target: ShadingLanguage, source: String) -> Self {
        Self { target, source }
    }

    /// The file name for this output, e.g. `lit_vk.glsl` for the stem
    /// `lit`.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}{}", stem, self.target.extension())
    }
}

/// Runs the passes the target needs and emits source. The backend must
/// already hold the parsed module and its compiler options.
pub fn emit_with(
    module: &spv::Module,
    target: ShadingLanguage,
    backend: &mut impl Backend,
) -> Result<String> {
    let renamed = naming::normalize(module, target, backend)?;
    debug!("emit_with: {}: renamed {} blocks", target, renamed);
    if target.combines_samplers() {
        let combined = samplers::combine(backend)?;
        debug!("emit_with: {}: combined {} samplers", target, combined);
    }
    if target.needs_column_major() {
        let fixed = layout::fix_matrix_layout(module, backend)?;
        debug!("emit_with: {}: {} column-major members", target, fixed);
    }
    backend.emit_source()
}

/// Cross-compiles `words` to `target` using `options`. Fails on an
/// empty or malformed module, on options meant for another backend,
/// and when the backend cannot express the module.
pub fn emit(
    words: &[u32],
    target: ShadingLanguage,
    options: &BackendOptions,
) -> Result<String> {
    if words.is_empty() {
        return Err(CrossError::EmptyModule);
    }
    if !options.applies_to(target) {
        return Err(CrossError::OptionsMismatch { target });
    }

    let model = spv::parse_words(&words)?;
    match options {
        BackendOptions::Glsl(opts) => {
            let opts = glsl_compiler_options(target, opts)?;
            let mut backend = CrossCompiler::<Glsl>::new(words, opts)?;
            emit_with(&model, target, &mut backend)
        },
        BackendOptions::Hlsl(opts) => {
            let opts = hlsl_compiler_options(opts)?;
            let mut backend = CrossCompiler::<Hlsl>::new(words, opts)?;
            emit_with(&model, target, &mut backend)
        },
        BackendOptions::Msl(opts) => {
            let opts = msl_compiler_options(opts);
            let mut backend = CrossCompiler::<Msl>::new(words, opts)?;
            emit_with(&model, target, &mut backend)
        },
    }
}

/// Cross-compiles `words` to `target` with the target's default
/// options.
pub fn cross_compile(words: &[u32], target: ShadingLanguage) ->
    Result<String>
{
    emit(words, target, &select(target))
}

/// Cross-compiles `words` to every target. Each target is an
/// independent request; one failing does not affect the others.
pub fn cross_compile_all(words: &[u32]) ->
    EnumMap<ShadingLanguage, Result<Output>>
{
    enum_map! {
        target => cross_compile(words, target)
            .map(|source| Output::new(target, source)),
    }
}

#[cfg(test)]
mod tests {
    use spv::testing::ModuleBuilder;
    use crate::testing::Recorder;
    use super::*;

    fn camera_module() -> (Vec<u32>, u32) {
        let mut b = ModuleBuilder::new();
        let mat4 = b.mat(4, 4);
        let ubo = b.block("u_Camera", &[("view", mat4, 0)]);
        b.uniform_buffer(ubo, "Camera", 0, 0);
        let tex = b.texture("albedo", 0, 1);
        let smp = b.sampler("albedo_sampler", 0, 2);
        b.sample(tex, smp);
        (b.finish(spv::ExecutionModel::Fragment), ubo)
    }

    fn run(target: ShadingLanguage) -> Recorder {
        let (words, _) = camera_module();
        let module = spv::parse_words(&words).unwrap();
        let mut backend = Recorder::default();
        backend.combined = vec![CombinedSampler {
            combined_id: 100,
            image_id: 1000,
            sampler_id: 1001,
        }];
        backend.names.insert(1000, "albedo".to_owned());
        emit_with(&module, target, &mut backend).unwrap();
        assert!(backend.emitted);
        backend
    }

    #[test]
    fn hlsl_passes() {
        let (_, ubo) = camera_module();
        let backend = run(ShadingLanguage::Hlsl);
        assert_eq!(backend.column_major, [(ubo, 0)]);
        assert_eq!(backend.name(100), None);
    }

    #[test]
    fn msl_passes() {
        let backend = run(ShadingLanguage::Msl);
        assert!(backend.column_major.is_empty());
        assert_eq!(backend.name(100), None);
    }

    #[test]
    fn combining_glsl_passes() {
        for &target in &[
            ShadingLanguage::GlslEs2,
            ShadingLanguage::GlslEs3,
            ShadingLanguage::Glsl450,
        ] {
            let backend = run(target);
            assert!(backend.column_major.is_empty());
            assert_eq!(backend.name(100), Some("albedo"));
        }
        assert_eq!(run(ShadingLanguage::GlslVulkan).name(100), None);
    }

    #[test]
    fn output_file_name() {
        let output = Output::new(ShadingLanguage::GlslEs3, String::new());
        assert_eq!(output.file_name("lit"), "lit_es3.glsl");
        let output = Output::new(ShadingLanguage::Hlsl, String::new());
        assert_eq!(output.file_name("lit"), "lit.hlsl");
    }
}
