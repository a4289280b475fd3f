use log::debug;

use crate::*;

/// Merges each image/sampler pair the module uses together into a
/// combined binding named after the image. Returns the number of
/// combined bindings.
pub fn combine(backend: &mut impl Backend) -> Result<usize> {
    let combined = backend.combine_samplers()?;
    for cis in combined.iter() {
        let name = backend.name_of(cis.image_id)?;
        debug!(
            "combine: {} + {} -> {} ({:?})",
            cis.image_id, cis.sampler_id, cis.combined_id, name,
        );
        if !name.is_empty() {
            backend.rename(cis.combined_id, &name)?;
        }
    }
    Ok(combined.len())
}
