use spirv_headers as spv;

mod base_type;
mod build;
mod data;
mod error;
mod reflect;
mod types;
mod view;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use base_type::BaseType;
pub use build::{parse_bytes, parse_words};
pub use data::{Module, ResourceKind};
pub use error::*;
pub use reflect::*;
pub use types::*;
pub use view::*;

pub use spv::Decoration;
pub use spv::ExecutionModel;
pub use spv::StorageClass;

pub type Version = (u8, u8);

pub(crate) fn is_interface_storage(class: spv::StorageClass) -> bool {
    [spv::StorageClass::Input, spv::StorageClass::Output].contains(&class)
}
