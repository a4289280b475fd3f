use log::debug;

use crate::*;

/// Extracts reflection data from `words`. Set and binding decorations
/// are target-independent, so the result is the same for every target.
pub fn extract(words: &[u32], target: ShadingLanguage) ->
    Result<ReflectionData>
{
    if words.is_empty() {
        return Err(CrossError::EmptyModule);
    }
    let data = spv::reflect(&words)?;
    debug!(
        "extract: {}: {} sets, {} push constants, {} unresolved",
        target,
        data.descriptor_sets.len(),
        data.push_constant_members.len(),
        data.unresolved.len(),
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use spv::testing::ModuleBuilder;
    use super::*;

    #[test]
    fn same_for_every_target() {
        let mut b = ModuleBuilder::new();
        let float = b.float();
        let block = b.block("Params", &[("scale", float, 0)]);
        b.uniform_buffer(block, "params", 3, 1);
        b.texture("noise", 1, 0);
        let words = b.finish(spv::ExecutionModel::Fragment);

        let vk = extract(&words, ShadingLanguage::GlslVulkan).unwrap();
        assert_eq!(vk.descriptor_sets.keys().copied().collect::<Vec<_>>(),
            [1, 3]);
        for &target in ShadingLanguage::ALL.iter() {
            assert_eq!(extract(&words, target).unwrap(), vk);
        }
    }

    #[test]
    fn empty_module() {
        assert!(matches!(
            extract(&[], ShadingLanguage::GlslVulkan),
            Err(CrossError::EmptyModule),
        ));
    }
}
