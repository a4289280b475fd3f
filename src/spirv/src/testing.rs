//! Assembles small SPIR-V modules in code for tests.

use fnv::FnvHashMap as HashMap;
use rspirv::binary::Assemble;
use rspirv::dr;
use spirv_headers as spv;

use crate::Id;

pub struct ModuleBuilder {
    builder: dr::Builder,
    void: Id,
    float: Id,
    uint: Option<Id>,
    image_2d: Option<Id>,
    storage_image_2d: Option<Id>,
    sampler: Option<Id>,
    interface: Vec<Id>,
    // Variable -> pointee type
    pointees: HashMap<Id, Id>,
    samples: Vec<(Id, Id, Id)>,
    // Matrix or array-of-matrix type -> matrix stride
    matrices: HashMap<Id, u32>,
    matrix_layout: Option<spv::Decoration>,
}

impl std::fmt::Debug for ModuleBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleBuilder")
            .field("interface", &self.interface)
            .field("matrix_layout", &self.matrix_layout)
            .finish()
    }
}

impl Default for ModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleBuilder {
    pub fn new() -> Self {
        let mut builder = dr::Builder::new();
        builder.capability(spv::Capability::Shader);
        builder.memory_model(
            spv::AddressingModel::Logical,
            spv::MemoryModel::GLSL450,
        );
        let void = builder.type_void();
        let float = builder.type_float(32);
        Self {
            builder,
            void,
            float,
            uint: None,
            image_2d: None,
            storage_image_2d: None,
            sampler: None,
            interface: Vec::new(),
            pointees: Default::default(),
            samples: Vec::new(),
            matrices: Default::default(),
            matrix_layout: Some(spv::Decoration::ColMajor),
        }
    }

    pub fn float(&self) -> Id {
        self.float
    }

    pub fn uint(&mut self) -> Id {
        let builder = &mut self.builder;
        *self.uint.get_or_insert_with(|| builder.type_int(32, 0))
    }

    pub fn vec(&mut self, size: u32) -> Id {
        self.builder.type_vector(self.float, size)
    }

    /// A float matrix with `columns` columns of `rows` components.
    pub fn mat(&mut self, columns: u32, rows: u32) -> Id {
        let column = self.vec(rows);
        let id = self.builder.type_matrix(column, columns);
        // std140 rounds every column up to a vec4
        self.matrices.insert(id, 16);
        id
    }

    pub fn array(&mut self, elem: Id, length: u32) -> Id {
        let uint = self.uint();
        let length = self.builder.constant_u32(uint, length);
        let id = self.builder.type_array(elem, length);
        self.inherit_matrix_stride(id, elem);
        id
    }

    pub fn runtime_array(&mut self, elem: Id) -> Id {
        let id = self.builder.type_runtime_array(elem);
        self.inherit_matrix_stride(id, elem);
        id
    }

    fn inherit_matrix_stride(&mut self, array: Id, elem: Id) {
        if let Some(&stride) = self.matrices.get(&elem) {
            self.matrices.insert(array, stride);
        }
    }

    /// Sets the layout decoration given to matrix members of structs
    /// declared from now on. Front ends emit `ColMajor`, which is the
    /// default; `None` leaves matrix members without either decoration.
    pub fn matrix_layout(&mut self, layout: Option<spv::Decoration>) {
        self.matrix_layout = layout;
    }

    /// Declares a struct decorated as an interface block. Members are
    /// `(name, type, offset)`.
    pub fn block(&mut self, name: &str, members: &[(&str, Id, u32)]) -> Id {
        self.decorated_struct(name, members, spv::Decoration::Block)
    }

    /// Declares a struct decorated as a storage buffer block.
    pub fn buffer_block(&mut self, name: &str, members: &[(&str, Id, u32)]) ->
        Id
    {
        self.decorated_struct(name, members, spv::Decoration::BufferBlock)
    }

    fn decorated_struct(
        &mut self,
        name: &str,
        members: &[(&str, Id, u32)],
        decoration: spv::Decoration,
    ) -> Id {
        let types: Vec<Id> = members.iter().map(|&(_, ty, _)| ty).collect();
        let id = self.builder.type_struct(types);
        self.builder.name(id, name.to_string());
        self.builder.decorate(id, decoration, Vec::<dr::Operand>::new());
        for (i, &(member, ty, offset)) in members.iter().enumerate() {
            let i = i as u32;
            self.builder.member_name(id, i, member.to_string());
            self.builder.member_decorate(
                id,
                i,
                spv::Decoration::Offset,
                vec![dr::Operand::LiteralInt32(offset)],
            );
            if let Some(&stride) = self.matrices.get(&ty) {
                if let Some(layout) = self.matrix_layout {
                    self.builder.member_decorate(
                        id,
                        i,
                        layout,
                        Vec::<dr::Operand>::new(),
                    );
                }
                self.builder.member_decorate(
                    id,
                    i,
                    spv::Decoration::MatrixStride,
                    vec![dr::Operand::LiteralInt32(stride)],
                );
            }
        }
        id
    }

    fn global(
        &mut self,
        pointee: Id,
        class: spv::StorageClass,
        name: &str,
        set_binding: Option<(u32, u32)>,
    ) -> Id {
        let ptr = self.builder.type_pointer(None, class, pointee);
        let var = self.builder.variable(ptr, None, class, None);
        self.builder.name(var, name.to_string());
        if let Some((set, binding)) = set_binding {
            self.builder.decorate(
                var,
                spv::Decoration::DescriptorSet,
                vec![dr::Operand::LiteralInt32(set)],
            );
            self.builder.decorate(
                var,
                spv::Decoration::Binding,
                vec![dr::Operand::LiteralInt32(binding)],
            );
        }
        self.pointees.insert(var, pointee);
        // SPIR-V 1.4 lists every global in the entry point interface
        self.interface.push(var);
        var
    }

    pub fn uniform_buffer(
        &mut self,
        block: Id,
        instance: &str,
        set: u32,
        binding: u32,
    ) -> Id {
        self.global(block, spv::StorageClass::Uniform, instance,
            Some((set, binding)))
    }

    /// A uniform buffer without descriptor decorations.
    pub fn undecorated_uniform_buffer(&mut self, block: Id, instance: &str) ->
        Id
    {
        self.global(block, spv::StorageClass::Uniform, instance, None)
    }

    pub fn storage_buffer(
        &mut self,
        block: Id,
        instance: &str,
        set: u32,
        binding: u32,
    ) -> Id {
        self.global(block, spv::StorageClass::Uniform, instance,
            Some((set, binding)))
    }

    pub fn push_constants(&mut self, block: Id, instance: &str) -> Id {
        self.global(block, spv::StorageClass::PushConstant, instance, None)
    }

    pub fn texture(&mut self, name: &str, set: u32, binding: u32) -> Id {
        let float = self.float;
        let builder = &mut self.builder;
        let ty = *self.image_2d.get_or_insert_with(|| builder.type_image(
            float,
            spv::Dim::Dim2D,
            0,
            0,
            0,
            1,
            spv::ImageFormat::Unknown,
            None,
        ));
        self.global(ty, spv::StorageClass::UniformConstant, name,
            Some((set, binding)))
    }

    pub fn storage_image(&mut self, name: &str, set: u32, binding: u32) -> Id {
        let float = self.float;
        let builder = &mut self.builder;
        let ty = *self.storage_image_2d.get_or_insert_with(|| {
            builder.type_image(
                float,
                spv::Dim::Dim2D,
                0,
                0,
                0,
                2,
                spv::ImageFormat::Rgba8,
                None,
            )
        });
        self.global(ty, spv::StorageClass::UniformConstant, name,
            Some((set, binding)))
    }

    pub fn sampler(&mut self, name: &str, set: u32, binding: u32) -> Id {
        let builder = &mut self.builder;
        let ty = *self.sampler.get_or_insert_with(|| builder.type_sampler());
        self.global(ty, spv::StorageClass::UniformConstant, name,
            Some((set, binding)))
    }

    pub fn input(&mut self, ty: Id, name: &str, location: u32) -> Id {
        self.interface_var(ty, spv::StorageClass::Input, name, location)
    }

    pub fn output(&mut self, ty: Id, name: &str, location: u32) -> Id {
        self.interface_var(ty, spv::StorageClass::Output, name, location)
    }

    fn interface_var(
        &mut self,
        ty: Id,
        class: spv::StorageClass,
        name: &str,
        location: u32,
    ) -> Id {
        let var = self.global(ty, class, name, None);
        self.builder.decorate(
            var,
            spv::Decoration::Location,
            vec![dr::Operand::LiteralInt32(location)],
        );
        var
    }

    /// Makes the entry point combine `image` with `sampler`.
    pub fn sample(&mut self, image: Id, sampler: Id) {
        let image_ty = self.pointees[&image];
        let sampled_ty = self.builder.type_sampled_image(image_ty);
        self.samples.push((image, sampler, sampled_ty));
    }

    /// Emits a `main` entry point and assembles the module.
    pub fn finish(mut self, model: spv::ExecutionModel) -> Vec<u32> {
        let b = &mut self.builder;
        let fn_ty = b.type_function(self.void, Vec::<Id>::new());
        let main = b.begin_function(
            self.void,
            None,
            spv::FunctionControl::NONE,
            fn_ty,
        ).unwrap();
        b.begin_block(None).unwrap();
        for &(image, sampler, sampled_ty) in self.samples.iter() {
            let image_ty = self.pointees[&image];
            let sampler_ty = self.pointees[&sampler];
            let image = b.load(image_ty, None, image, None,
                Vec::<dr::Operand>::new()).unwrap();
            let sampler = b.load(sampler_ty, None, sampler, None,
                Vec::<dr::Operand>::new()).unwrap();
            b.sampled_image(sampled_ty, None, image, sampler).unwrap();
        }
        b.ret().unwrap();
        b.end_function().unwrap();
        b.entry_point(model, main, "main".to_string(), self.interface.clone());
        self.builder.module().assemble()
    }
}
