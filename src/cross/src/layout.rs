use log::trace;

use crate::*;

/// Marks every floating-point matrix member of every uniform and storage
/// buffer block as column-major, dropping any `RowMajor` decoration the
/// member carried. Returns the number of members marked.
pub fn fix_matrix_layout(
    module: &spv::Module,
    backend: &mut impl Annotate,
) -> Result<usize> {
    let buffers = module.resources().filter(|res| matches!(
        res.kind(),
        spv::ResourceKind::UniformBuffer | spv::ResourceKind::StorageBuffer,
    ));
    let mut count = 0;
    for buffer in buffers {
        for member in buffer.members() {
            if !member.desc().is_float_matrix() { continue; }
            trace!(
                "fix_matrix_layout: {}.{} (row_major: {}, col_major: {}, \
                    stride: {:?})",
                buffer.type_name().unwrap_or(""),
                member.name().unwrap_or(""),
                member.is_row_major(),
                member.is_col_major(),
                member.matrix_stride(),
            );
            if member.is_row_major() {
                backend.clear_row_major(member.struct_id(), member.index())?;
            }
            backend.set_column_major(member.struct_id(), member.index())?;
            count += 1;
        }
    }
    Ok(count)
}
