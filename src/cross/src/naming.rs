use log::debug;

use crate::*;

/// How a uniform block instance is renamed for a target.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NamingRule {
    /// Drop the two-character prefix of the block's type name and use
    /// the rest as the instance name, e.g. `u_Light` becomes `light`.
    StripTypePrefix,
    /// Lower-case the first character of the instance name.
    LowerFirst,
}

fn lower_first(name: &str) -> Option<String> {
    let mut chars = name.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

/// The new instance name of a uniform block, or `None` if the block
/// should keep its current name.
pub fn instance_name(rule: NamingRule, instance: &str, type_name: &str) ->
    Option<String>
{
    match rule {
        NamingRule::StripTypePrefix => {
            let mut chars = type_name.chars();
            chars.nth(1)?;
            lower_first(chars.as_str())
        },
        NamingRule::LowerFirst => lower_first(instance),
    }
}

/// The byte count reported for an array member: the scalar size times
/// the outermost length. Vector and matrix shape are not included.
fn array_total(desc: &spv::TypeDesc) -> u32 {
    desc.base.size() * desc.array_length()
}

fn log_members(block: &spv::Resource<'_>) {
    debug!("uniform block {}", block.type_name().unwrap_or(""));
    for member in block.members() {
        let desc = member.desc();
        let name = member.name().unwrap_or("");
        let size = desc.base.size();
        debug!("  {}: {} ({} bytes)", name, desc.base, size);
        if desc.is_vector_or_matrix() {
            debug!("    {}x{}", desc.columns, desc.vec_size);
        }
        if desc.is_array() {
            debug!("    [{}] ({} bytes total)", desc.array_length(),
                array_total(&desc));
        }
    }
}

/// Renames every uniform block instance according to the target's
/// naming rule. Returns the number of renamed blocks.
pub fn normalize(
    module: &spv::Module,
    target: ShadingLanguage,
    backend: &mut impl Annotate,
) -> Result<usize> {
    let rule = target.naming_rule();
    let mut count = 0;
    for block in module.resources_of(spv::ResourceKind::UniformBuffer) {
        if rule == NamingRule::StripTypePrefix {
            log_members(&block);
        }

        let instance = block.name().unwrap_or("");
        let type_name = block.type_name().unwrap_or("");
        match instance_name(rule, instance, type_name) {
            Some(name) => {
                backend.rename(block.id(), &name)?;
                count += 1;
            },
            None => debug!(
                "normalize: keeping name of block {} ({:?})",
                block.id(), instance,
            ),
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use spv::testing::ModuleBuilder;
    use crate::testing::Recorder;
    use super::*;

    #[test]
    fn strip_type_prefix() {
        let rule = NamingRule::StripTypePrefix;
        assert_eq!(instance_name(rule, "", "u_Light").as_deref(), Some("light"));
        assert_eq!(instance_name(rule, "x", "ubMaterial").as_deref(),
            Some("material"));
        assert_eq!(instance_name(rule, "x", "u_"), None);
        assert_eq!(instance_name(rule, "x", ""), None);
    }

    #[test]
    fn lower_first_char() {
        let rule = NamingRule::LowerFirst;
        assert_eq!(instance_name(rule, "MyBlock", "").as_deref(),
            Some("myBlock"));
        assert_eq!(instance_name(rule, "Éclair", "").as_deref(),
            Some("éclair"));
        assert_eq!(instance_name(rule, "", "Ignored"), None);
    }

    fn light_module() -> (spv::Module, u32) {
        let mut b = ModuleBuilder::new();
        let vec4 = b.vec(4);
        let mat4 = b.mat(4, 4);
        let arr = b.array(vec4, 4);
        let block = b.block("u_Light", &[
            ("color", vec4, 0),
            ("transform", mat4, 16),
            ("corners", arr, 80),
        ]);
        let var = b.uniform_buffer(block, "MyBlock", 0, 0);
        let words = b.finish(spv::ExecutionModel::Fragment);
        (spv::parse_words(&words).unwrap(), var)
    }

    #[test]
    fn array_total_is_scalar_size_times_length() {
        let (module, _) = light_module();
        let block = module.resources_of(spv::ResourceKind::UniformBuffer)
            .next().unwrap();
        let corners = block.members().nth(2).unwrap().desc();
        assert_eq!(corners.vec_size, 4);
        assert_eq!(array_total(&corners), 16);
    }

    #[test]
    fn normalize_es2() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (module, var) = light_module();
        let mut backend = Recorder::default();
        let count = normalize(&module, ShadingLanguage::GlslEs2, &mut backend)
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(backend.name(var), Some("light"));
    }

    #[test]
    fn normalize_other_targets() {
        let (module, var) = light_module();
        for &target in &[
            ShadingLanguage::GlslEs3,
            ShadingLanguage::Glsl450,
            ShadingLanguage::GlslVulkan,
            ShadingLanguage::Hlsl,
            ShadingLanguage::Msl,
        ] {
            let mut backend = Recorder::default();
            normalize(&module, target, &mut backend).unwrap();
            assert_eq!(backend.name(var), Some("myBlock"), "{}", target);
        }
    }

    #[test]
    fn empty_instance_name_is_kept() {
        let mut b = ModuleBuilder::new();
        let float = b.float();
        let block = b.block("Globals", &[("time", float, 0)]);
        b.uniform_buffer(block, "", 0, 0);
        let module = spv::parse_words(&b.finish(spv::ExecutionModel::Vertex))
            .unwrap();

        let mut backend = Recorder::default();
        let count = normalize(&module, ShadingLanguage::Msl, &mut backend)
            .unwrap();
        assert_eq!(count, 0);
        assert!(backend.names.is_empty());
    }
}
