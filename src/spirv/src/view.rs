use spirv_headers as spv;

use crate::*;
use crate::data;

macro_rules! indexed_type {
    ($name:ident) => {
        indexed_type!($name, $name);
    };
    ($name:ident, $data_name:ident) => {
        #[derive(Clone, Copy, Debug)]
        pub struct $name<'m> {
            module: &'m Module,
            index: u32,
            inner: &'m data::$data_name,
        }

        impl<'m> $name<'m> {
            pub fn module(&self) -> &'m Module {
                self.module
            }

            pub fn index(&self) -> u32 {
                self.index
            }

            fn inner(&self) -> &'m data::$data_name {
                self.inner
            }
        }
    };
}

indexed_type!(Variable);
indexed_type!(Resource);

#[derive(Clone, Copy, Debug)]
pub struct EntryPoint<'m> {
    module: &'m Module,
    name: &'m str,
    inner: &'m data::EntryPoint,
}

/// A member of a struct type, addressed by the struct's id and the
/// member's position.
#[derive(Clone, Copy, Debug)]
pub struct Member<'m> {
    module: &'m Module,
    struct_id: Id,
    index: u32,
    ty: Id,
}

impl Module {
    pub(crate) fn new(version: Version) -> Self {
        Self {
            version,
            types: Default::default(),
            constants: Default::default(),
            variables: Default::default(),
            resources: Default::default(),
            entry_points: Default::default(),
            decorations: Default::default(),
            member_decorations: Default::default(),
        }
    }

    /// The SPIR-V version as a pair `(major, minor)`.
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn entry_points(&self) ->
        impl ExactSizeIterator<Item = EntryPoint<'_>> + '_
    {
        self.entry_points.iter().map(move |(name, inner)|
            EntryPoint { module: self, name, inner })
    }

    pub fn get_entry_point<'m>(&'m self, name: &impl AsRef<str>) ->
        Option<EntryPoint<'m>>
    {
        let (name, inner) = self.entry_points.get_key_value(name.as_ref())?;
        Some(EntryPoint { module: self, name, inner })
    }

    pub fn get_variable(&self, index: u32) -> Option<Variable<'_>> {
        let inner = self.variables.get(&index)?;
        Some(Variable { module: self, index, inner })
    }

    /// All resources in declaration order.
    pub fn resources(&self) ->
        impl ExactSizeIterator<Item = Resource<'_>> + '_
    {
        self.resources.iter().map(move |inner|
            Resource { module: self, index: inner.id, inner })
    }

    pub fn resources_of(&self, kind: ResourceKind) ->
        impl Iterator<Item = Resource<'_>> + '_
    {
        self.resources().filter(move |res| res.kind() == kind)
    }

    /// The debug name of any id, if the module carries one.
    pub fn name(&self, id: Id) -> Option<&str> {
        self.decorations.get(&id)?.name.as_deref()
    }

    /// The members of a struct type. Empty if `id` is not a struct.
    pub fn members(&self, id: Id) ->
        impl ExactSizeIterator<Item = Member<'_>> + '_
    {
        let members: &[Id] = match self.types.get(&id) {
            Some(Type::Struct { members }) => &members[..],
            _ => &[],
        };
        members.iter().enumerate().map(move |(index, &ty)| Member {
            module: self,
            struct_id: id,
            index: index as u32,
            ty,
        })
    }

    /// Resolves the shape of a type by looking through arrays, matrices
    /// and vectors down to the base type.
    pub fn describe(&self, mut id: Id) -> TypeDesc {
        let mut desc = TypeDesc::default();
        // Bounded in case of a cyclic (invalid) type graph
        for _ in 0..=self.types.len() {
            match self.types.get(&id) {
                Some(&Type::Array { elem, length }) => {
                    desc.array.push(length.unwrap_or(0));
                    id = elem;
                },
                Some(&Type::RuntimeArray { elem }) => {
                    desc.array.push(0);
                    id = elem;
                },
                Some(&Type::Matrix { column, count }) => {
                    desc.columns = count;
                    id = column;
                },
                Some(&Type::Vector { component, count }) => {
                    desc.vec_size = count;
                    id = component;
                },
                Some(ty) => {
                    desc.base = ty.base_type();
                    break;
                },
                None => break,
            }
        }
        desc
    }

    fn member_decorations(&self, struct_id: Id, index: u32) ->
        Option<&data::MemberDecorationSet>
    {
        self.member_decorations.get(&(struct_id, index))
    }
}

impl<'m> EntryPoint<'m> {
    pub fn module(&self) -> &'m Module {
        self.module
    }

    pub fn name(&self) -> &'m str {
        self.name
    }

    fn inner(&self) -> &'m data::EntryPoint {
        self.inner
    }

    pub fn execution_model(&self) -> spv::ExecutionModel {
        self.inner().execution_model
    }

    pub fn inputs(&self) -> impl Iterator<Item = Variable<'m>> + 'm {
        let module = self.module;
        self.inner().inputs.iter()
            .filter_map(move |&idx| module.get_variable(idx))
    }

    pub fn outputs(&self) -> impl Iterator<Item = Variable<'m>> + 'm {
        let module = self.module;
        self.inner().outputs.iter()
            .filter_map(move |&idx| module.get_variable(idx))
    }
}

impl<'m> Variable<'m> {
    pub fn storage_class(&self) -> spv::StorageClass {
        self.inner().storage_class
    }

    pub fn location(&self) -> u32 {
        self.inner().location
    }

    pub fn name(&self) -> Option<&'m str> {
        self.inner().name.as_deref()
    }
}

impl<'m> Resource<'m> {
    pub fn id(&self) -> Id {
        self.index
    }

    pub fn kind(&self) -> ResourceKind {
        self.inner().kind
    }

    pub fn storage_class(&self) -> spv::StorageClass {
        self.inner().storage_class
    }

    pub fn type_id(&self) -> Id {
        self.inner().type_id
    }

    pub fn base_type_id(&self) -> Id {
        self.inner().base_type_id
    }

    pub fn set(&self) -> Option<u32> {
        self.inner().set
    }

    pub fn binding(&self) -> Option<u32> {
        self.inner().binding
    }

    /// The instance name.
    pub fn name(&self) -> Option<&'m str> {
        self.inner().name.as_deref()
    }

    /// The name of the resource's base type, e.g. the block name of a
    /// uniform buffer.
    pub fn type_name(&self) -> Option<&'m str> {
        self.module.name(self.base_type_id())
    }

    pub fn members(&self) -> impl ExactSizeIterator<Item = Member<'m>> + 'm {
        self.module.members(self.base_type_id())
    }
}

impl<'m> Member<'m> {
    pub fn module(&self) -> &'m Module {
        self.module
    }

    pub fn struct_id(&self) -> Id {
        self.struct_id
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn type_id(&self) -> Id {
        self.ty
    }

    fn decorations(&self) -> Option<&'m data::MemberDecorationSet> {
        self.module.member_decorations(self.struct_id, self.index)
    }

    pub fn name(&self) -> Option<&'m str> {
        self.decorations()?.name.as_deref()
    }

    /// Explicit byte offset within the struct, if decorated.
    pub fn offset(&self) -> Option<u32> {
        self.decorations()?.offset
    }

    pub fn matrix_stride(&self) -> Option<u32> {
        self.decorations()?.matrix_stride
    }

    pub fn is_row_major(&self) -> bool {
        self.decorations().map_or(false, |decos| decos.row_major)
    }

    pub fn is_col_major(&self) -> bool {
        self.decorations().map_or(false, |decos| decos.col_major)
    }

    pub fn desc(&self) -> TypeDesc {
        self.module.describe(self.ty)
    }
}

#[cfg(test)]
mod tests {
    use spirv_headers as spv;
    use crate::testing::ModuleBuilder;
    use super::*;

    #[test]
    fn member_layout() {
        let mut b = ModuleBuilder::new();
        let mat4 = b.mat(4, 4);
        let vec4 = b.vec(4);
        let bones = b.array(mat4, 2);
        let camera = b.block("Camera", &[
            ("view", mat4, 0),
            ("pos", vec4, 64),
            ("bones", bones, 80),
        ]);
        b.uniform_buffer(camera, "camera", 0, 0);
        b.matrix_layout(Some(spv::Decoration::RowMajor));
        let skin = b.block("Skin", &[("model", mat4, 0)]);
        b.uniform_buffer(skin, "skin", 0, 1);
        b.matrix_layout(None);
        let bare = b.block("Bare", &[("model", mat4, 0)]);
        b.uniform_buffer(bare, "bare", 0, 2);
        let module = parse_words(&b.finish(spv::ExecutionModel::Vertex))
            .unwrap();

        let members: Vec<_> = module.members(camera).collect();
        assert_eq!(members[0].name(), Some("view"));
        assert_eq!(members[0].matrix_stride(), Some(16));
        assert!(members[0].is_col_major() && !members[0].is_row_major());
        assert_eq!(members[1].matrix_stride(), None);
        assert!(!members[1].is_col_major());
        assert_eq!(members[2].offset(), Some(80));
        assert!(members[2].is_col_major());

        let model = module.members(skin).next().unwrap();
        assert!(model.is_row_major() && !model.is_col_major());

        let model = module.members(bare).next().unwrap();
        assert!(!model.is_row_major() && !model.is_col_major());
        assert_eq!(model.matrix_stride(), Some(16));
    }
}
