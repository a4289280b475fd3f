use derivative::Derivative;
use fnv::FnvHashMap as HashMap;
use spirv_headers as spv;

use crate::{Id, Type, Version};

#[derive(Debug)]
pub struct Module {
    pub(crate) version: Version,
    pub(crate) types: HashMap<Id, Type>,
    pub(crate) constants: HashMap<Id, u64>,
    pub(crate) variables: HashMap<Id, Variable>,
    // Declaration order
    pub(crate) resources: Vec<Resource>,
    pub(crate) entry_points: HashMap<String, EntryPoint>,
    pub(crate) decorations: HashMap<Id, DecorationSet>,
    pub(crate) member_decorations: HashMap<(Id, u32), MemberDecorationSet>,
}

#[derive(Debug, Default)]
pub(crate) struct DecorationSet {
    pub(crate) name: Option<String>,
    pub(crate) location: Option<u32>,
    pub(crate) set: Option<u32>,
    pub(crate) binding: Option<u32>,
    pub(crate) block: bool,
    pub(crate) buffer_block: bool,
}

#[derive(Debug, Default)]
pub(crate) struct MemberDecorationSet {
    pub(crate) name: Option<String>,
    pub(crate) offset: Option<u32>,
    pub(crate) matrix_stride: Option<u32>,
    pub(crate) row_major: bool,
    pub(crate) col_major: bool,
}

#[derive(Debug, Derivative)]
#[derivative(Default)]
pub(crate) struct Variable {
    #[derivative(Default(value = "spv::StorageClass::Input"))]
    pub(crate) storage_class: spv::StorageClass,
    pub(crate) location: u32,
    pub(crate) name: Option<String>,
}

/// The categories of shader resources this model tracks.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ResourceKind {
    UniformBuffer,
    StorageBuffer,
    SeparateSampler,
    SeparateImage,
    StorageImage,
    PushConstant,
}

#[derive(Debug, Derivative)]
#[derivative(Default)]
pub(crate) struct Resource {
    pub(crate) id: Id,
    #[derivative(Default(value = "ResourceKind::UniformBuffer"))]
    pub(crate) kind: ResourceKind,
    #[derivative(Default(value = "spv::StorageClass::Uniform"))]
    pub(crate) storage_class: spv::StorageClass,
    /// The variable's pointer type.
    pub(crate) type_id: Id,
    /// The pointee with array dimensions stripped.
    pub(crate) base_type_id: Id,
    pub(crate) set: Option<u32>,
    pub(crate) binding: Option<u32>,
    pub(crate) name: Option<String>,
}

#[derive(Debug, Derivative)]
#[derivative(Default)]
pub(crate) struct EntryPoint {
    #[derivative(Default(value = "spv::ExecutionModel::Vertex"))]
    pub(crate) execution_model: spv::ExecutionModel,
    pub(crate) inputs: Vec<Id>,
    pub(crate) outputs: Vec<Id>,
}
