//! Cross-compiles SPIR-V modules into GLSL, HLSL and MSL source and
//! extracts descriptor reflection data.

mod backend;
mod emit;
mod error;
mod layout;
mod naming;
mod reflect;
mod samplers;
mod target;

#[cfg(test)]
mod testing;

pub use backend::*;
pub use emit::*;
pub use error::*;
pub use layout::fix_matrix_layout;
pub use naming::{instance_name, normalize, NamingRule};
pub use reflect::extract;
pub use samplers::combine;
pub use target::*;

pub use spv::{Descriptor, DescriptorType, PushConstantMember, ReflectionData};
