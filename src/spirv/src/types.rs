use spirv_headers as spv;

use crate::BaseType;

pub type Id = u32;

/// A node of the module's type graph. Composite types refer to their
/// constituents by id.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Type {
    Void,
    Bool,
    Int { width: u32, signed: bool },
    Float { width: u32 },
    Vector { component: Id, count: u32 },
    Matrix { column: Id, count: u32 },
    /// `length` is `None` when the length is not a literal constant,
    /// e.g. a specialization constant.
    Array { elem: Id, length: Option<u32> },
    RuntimeArray { elem: Id },
    Struct { members: Vec<Id> },
    Image { sampled_type: Id, dim: spv::Dim, sampled: u32 },
    SampledImage { image: Id },
    Sampler,
    Pointer { storage_class: spv::StorageClass, target: Id },
}

impl Type {
    /// The base type of a non-composite type. Vectors, matrices,
    /// arrays and pointers report `Unknown`; use `Module::describe` to
    /// look through them.
    pub fn base_type(&self) -> BaseType {
        match *self {
            Type::Void => BaseType::Void,
            Type::Bool => BaseType::Boolean,
            Type::Int { width, signed } => BaseType::int(width, signed),
            Type::Float { width } => BaseType::float(width),
            Type::Struct { .. } => BaseType::Struct,
            Type::Image { .. } => BaseType::Image,
            Type::SampledImage { .. } => BaseType::SampledImage,
            Type::Sampler => BaseType::Sampler,
            Type::Vector { .. }
            | Type::Matrix { .. }
            | Type::Array { .. }
            | Type::RuntimeArray { .. }
            | Type::Pointer { .. } => BaseType::Unknown,
        }
    }
}

/// Flattened shape of a type: base type, vector width, column count
/// and array dimensions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeDesc {
    pub base: BaseType,
    /// Components per vector (rows of a matrix). 1 for scalars.
    pub vec_size: u32,
    /// Matrix column count. 1 for scalars and vectors.
    pub columns: u32,
    /// Array dimensions, outermost first. Runtime-sized and
    /// unresolved dimensions are 0.
    pub array: Vec<u32>,
}

impl Default for TypeDesc {
    fn default() -> Self {
        Self {
            base: BaseType::Unknown,
            vec_size: 1,
            columns: 1,
            array: Vec::new(),
        }
    }
}

impl TypeDesc {
    pub fn is_vector_or_matrix(&self) -> bool {
        self.vec_size > 1 || self.columns > 1
    }

    pub fn is_matrix(&self) -> bool {
        self.vec_size > 1 && self.columns > 1
    }

    pub fn is_float_matrix(&self) -> bool {
        self.base.is_float() && self.is_matrix()
    }

    pub fn is_array(&self) -> bool {
        !self.array.is_empty()
    }

    /// The first array dimension, or 1 for non-arrays.
    pub fn array_length(&self) -> u32 {
        self.array.first().copied().unwrap_or(1)
    }
}
