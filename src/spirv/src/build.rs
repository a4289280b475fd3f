use std::convert::TryFrom;

use log::trace;
use rspirv::{self, dr};
use rspirv::binary::{Consumer, ParseAction};
use spirv_headers as spv;

use crate::*;
use crate::data;

#[derive(Debug)]
struct RawModule {
    header: dr::ModuleHeader,
    instructions: Vec<dr::Instruction>,
}

impl RawModule {
    fn new() -> Self {
        Self {
            header: dr::ModuleHeader::new(0),
            instructions: Default::default(),
        }
    }

    #[inline]
    fn occurrences(&self, opcode: spv::Op) ->
        impl Iterator<Item = &'_ dr::Instruction> + '_
    {
        self.instructions.iter()
            .filter(move |inst| inst.class.opcode == opcode)
    }
}

macro_rules! get_operand_variant {
    ($operand:expr, $variant:ident) => {
        match $operand {
            dr::Operand::$variant(ref val) => val.clone(),
            _ => return Err(ErrorKind::InvalidModule.into()),
        }
    }
}

macro_rules! parse_operand {
    ($operands:expr, $variant:ident) => {
        get_operand_variant!(
            $operands.next().ok_or(ErrorKind::InvalidModule)?, $variant)
    };
    ($operands:expr, $variant:ident*) => {{
        let mut vals = Vec::new();
        for operand in $operands {
            vals.push(get_operand_variant!(operand, $variant));
        }
        vals
    }};
}

fn result_id(inst: &dr::Instruction) -> Result<Id> {
    Ok(inst.result_id.ok_or(ErrorKind::InvalidModule)?)
}

fn raise_module(raw: &RawModule) -> Result<Module> {
    let mut module = Module::new(to_version(raw.header.version));
    build_decoration_sets(&mut module, raw)?;
    raise_types(&mut module, raw)?;
    raise_variables(&mut module, raw)?;
    raise_entry_points(&mut module, raw)?;
    Ok(module)
}

fn to_version(word: u32) -> Version {
    let byte = |n| ((word >> (8 * n)) & 0xffu32) as u8;
    (byte(2), byte(1))
}

fn build_decoration_sets(module: &mut Module, raw: &RawModule) -> Result<()> {
    for inst in raw.instructions.iter() {
        let operands = &inst.operands;
        match inst.class.opcode {
            spv::Op::Decorate => apply_decoration(module, operands)?,
            spv::Op::MemberDecorate =>
                apply_member_decoration(module, operands)?,
            spv::Op::Name => apply_name(module, operands)?,
            spv::Op::MemberName => apply_member_name(module, operands)?,
            _ => {},
        }
    }
    Ok(())
}

fn apply_decoration(module: &mut Module, operands: &[dr::Operand]) ->
    Result<()>
{
    let mut ops = operands.iter();
    let target = parse_operand!(ops, IdRef);
    let decoration = parse_operand!(ops, Decoration);
    let decos = module.decorations.entry(target).or_default();
    match decoration {
        spv::Decoration::Location => {
            let val = parse_operand!(ops, LiteralInt32);
            decos.location = Some(val);
        },
        spv::Decoration::Binding => {
            let val = parse_operand!(ops, LiteralInt32);
            decos.binding = Some(val);
        },
        spv::Decoration::DescriptorSet => {
            let val = parse_operand!(ops, LiteralInt32);
            decos.set = Some(val);
        },
        spv::Decoration::Block => decos.block = true,
        spv::Decoration::BufferBlock => decos.buffer_block = true,
        _ => {},
    }
    Ok(())
}

fn apply_member_decoration(module: &mut Module, operands: &[dr::Operand]) ->
    Result<()>
{
    let mut ops = operands.iter();
    let target = parse_operand!(ops, IdRef);
    let member = parse_operand!(ops, LiteralInt32);
    let decoration = parse_operand!(ops, Decoration);
    let decos = module.member_decorations.entry((target, member))
        .or_default();
    match decoration {
        spv::Decoration::Offset => {
            let val = parse_operand!(ops, LiteralInt32);
            decos.offset = Some(val);
        },
        spv::Decoration::MatrixStride => {
            let val = parse_operand!(ops, LiteralInt32);
            decos.matrix_stride = Some(val);
        },
        spv::Decoration::RowMajor => decos.row_major = true,
        spv::Decoration::ColMajor => decos.col_major = true,
        _ => {},
    }
    Ok(())
}

fn apply_name(module: &mut Module, operands: &[dr::Operand]) -> Result<()> {
    let mut ops = operands.iter();
    let target = parse_operand!(ops, IdRef);
    let name = parse_operand!(ops, LiteralString);
    let decos = module.decorations.entry(target).or_default();
    decos.name = Some(name);
    Ok(())
}

fn apply_member_name(module: &mut Module, operands: &[dr::Operand]) ->
    Result<()>
{
    let mut ops = operands.iter();
    let target = parse_operand!(ops, IdRef);
    let member = parse_operand!(ops, LiteralInt32);
    let name = parse_operand!(ops, LiteralString);
    let decos = module.member_decorations.entry((target, member))
        .or_default();
    decos.name = Some(name);
    Ok(())
}

fn raise_types(module: &mut Module, raw: &RawModule) -> Result<()> {
    // Types are declared before use, so array lengths always refer to
    // constants that precede them.
    for inst in raw.instructions.iter() {
        if inst.class.opcode == spv::Op::Constant {
            raise_constant(module, inst)?;
        } else if let Some(ty) = raise_type(module, inst)? {
            module.types.insert(result_id(inst)?, ty);
        }
    }
    Ok(())
}

fn raise_constant(module: &mut Module, inst: &dr::Instruction) ->
    Result<()>
{
    let id = result_id(inst)?;
    let value = match inst.operands.first() {
        Some(&dr::Operand::LiteralInt32(val)) => val as u64,
        Some(&dr::Operand::LiteralInt64(val)) => val,
        // Floating point and composite constants are never lengths
        _ => return Ok(()),
    };
    module.constants.insert(id, value);
    Ok(())
}

fn raise_type(module: &Module, inst: &dr::Instruction) ->
    Result<Option<Type>>
{
    let mut ops = inst.operands.iter();
    Ok(Some(match inst.class.opcode {
        spv::Op::TypeVoid => Type::Void,
        spv::Op::TypeBool => Type::Bool,
        spv::Op::TypeInt => {
            let width = parse_operand!(ops, LiteralInt32);
            let signed = parse_operand!(ops, LiteralInt32) != 0;
            Type::Int { width, signed }
        },
        spv::Op::TypeFloat => {
            let width = parse_operand!(ops, LiteralInt32);
            Type::Float { width }
        },
        spv::Op::TypeVector => {
            let component = parse_operand!(ops, IdRef);
            let count = parse_operand!(ops, LiteralInt32);
            Type::Vector { component, count }
        },
        spv::Op::TypeMatrix => {
            let column = parse_operand!(ops, IdRef);
            let count = parse_operand!(ops, LiteralInt32);
            Type::Matrix { column, count }
        },
        spv::Op::TypeArray => {
            let elem = parse_operand!(ops, IdRef);
            let length_id = parse_operand!(ops, IdRef);
            let length = match module.constants.get(&length_id) {
                Some(&len) => Some(u32::try_from(len)?),
                None => None,
            };
            Type::Array { elem, length }
        },
        spv::Op::TypeRuntimeArray => {
            let elem = parse_operand!(ops, IdRef);
            Type::RuntimeArray { elem }
        },
        spv::Op::TypeStruct => {
            let members = parse_operand!(ops, IdRef*);
            Type::Struct { members }
        },
        spv::Op::TypeImage => {
            let sampled_type = parse_operand!(ops, IdRef);
            let dim = parse_operand!(ops, Dim);
            let _depth = parse_operand!(ops, LiteralInt32);
            let _arrayed = parse_operand!(ops, LiteralInt32);
            let _multisampled = parse_operand!(ops, LiteralInt32);
            let sampled = parse_operand!(ops, LiteralInt32);
            Type::Image { sampled_type, dim, sampled }
        },
        spv::Op::TypeSampledImage => {
            let image = parse_operand!(ops, IdRef);
            Type::SampledImage { image }
        },
        spv::Op::TypeSampler => Type::Sampler,
        spv::Op::TypePointer => {
            let storage_class = parse_operand!(ops, StorageClass);
            let target = parse_operand!(ops, IdRef);
            Type::Pointer { storage_class, target }
        },
        _ => return Ok(None),
    }))
}

fn raise_variables(module: &mut Module, raw: &RawModule) -> Result<()> {
    for inst in raw.occurrences(spv::Op::Variable) {
        raise_variable(module, inst)?;
    }
    Ok(())
}

fn raise_variable(module: &mut Module, inst: &dr::Instruction) ->
    Result<()>
{
    let mut ops = inst.operands.iter();
    let id = result_id(inst)?;
    let type_id = inst.result_type.ok_or(ErrorKind::InvalidModule)?;

    let storage_class = parse_operand!(ops, StorageClass);
    if storage_class == spv::StorageClass::Function { return Ok(()); }

    let (location, set, binding, name) = match module.decorations.get(&id) {
        Some(decos) =>
            (decos.location, decos.set, decos.binding, decos.name.clone()),
        None => (None, None, None, None),
    };

    if is_interface_storage(storage_class) {
        if let Some(location) = location {
            module.variables.insert(id, data::Variable {
                storage_class,
                location,
                name,
            });
        }
        return Ok(());
    }

    let base_type_id = strip_arrays(module, pointee(module, type_id)?);
    let kind = match classify(module, storage_class, base_type_id) {
        Some(kind) => kind,
        None => {
            trace!(
                "raise_variable: skipping {} ({:?}, {:?})",
                id, name, storage_class,
            );
            return Ok(());
        },
    };

    module.resources.push(data::Resource {
        id,
        kind,
        storage_class,
        type_id,
        base_type_id,
        set,
        binding,
        name,
    });
    Ok(())
}

fn pointee(module: &Module, type_id: Id) -> Result<Id> {
    match module.types.get(&type_id) {
        Some(&Type::Pointer { target, .. }) => Ok(target),
        _ => Err(ErrorKind::InvalidModule.into()),
    }
}

fn strip_arrays(module: &Module, mut id: Id) -> Id {
    // Bounded in case of a cyclic (invalid) type graph
    for _ in 0..=module.types.len() {
        match module.types.get(&id) {
            Some(&Type::Array { elem, .. })
            | Some(&Type::RuntimeArray { elem }) => id = elem,
            _ => break,
        }
    }
    id
}

fn classify(
    module: &Module,
    storage_class: spv::StorageClass,
    base_type_id: Id,
) -> Option<ResourceKind> {
    let decos = module.decorations.get(&base_type_id);
    let is_block = decos.map_or(false, |decos| decos.block);
    let is_buffer_block = decos.map_or(false, |decos| decos.buffer_block);
    match storage_class {
        spv::StorageClass::Uniform if is_buffer_block =>
            Some(ResourceKind::StorageBuffer),
        spv::StorageClass::Uniform if is_block =>
            Some(ResourceKind::UniformBuffer),
        spv::StorageClass::StorageBuffer => Some(ResourceKind::StorageBuffer),
        spv::StorageClass::PushConstant => Some(ResourceKind::PushConstant),
        spv::StorageClass::UniformConstant => {
            match module.types.get(&base_type_id)? {
                Type::Image { dim: spv::Dim::DimSubpassData, .. } => None,
                Type::Image { sampled: 2, .. } =>
                    Some(ResourceKind::StorageImage),
                Type::Image { .. } => Some(ResourceKind::SeparateImage),
                Type::Sampler => Some(ResourceKind::SeparateSampler),
                _ => None,
            }
        },
        _ => None,
    }
}

fn raise_entry_points(module: &mut Module, raw: &RawModule) -> Result<()> {
    for inst in raw.occurrences(spv::Op::EntryPoint) {
        raise_entry_point(module, inst)?;
    }
    Ok(())
}

fn raise_entry_point(module: &mut Module, inst: &dr::Instruction) ->
    Result<()>
{
    let mut ops = inst.operands.iter();
    let execution_model = parse_operand!(ops, ExecutionModel);
    let _function = parse_operand!(ops, IdRef);
    let name = parse_operand!(ops, LiteralString);
    let interface = parse_operand!(ops, IdRef*);

    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for (idx, var) in interface.iter().copied()
        .filter_map(|idx| Some((idx, module.variables.get(&idx)?)))
    {
        match var.storage_class {
            spv::StorageClass::Input => inputs.push(idx),
            spv::StorageClass::Output => outputs.push(idx),
            _ => return Err(ErrorKind::UnsupportedModule.into()),
        }
    }

    module.entry_points.insert(name, data::EntryPoint {
        execution_model,
        inputs,
        outputs,
    });
    Ok(())
}

impl Consumer for RawModule {
    fn initialize(&mut self) -> ParseAction {
        ParseAction::Continue
    }

    fn finalize(&mut self) -> ParseAction {
        ParseAction::Continue
    }

    fn consume_header(&mut self, header: dr::ModuleHeader) -> ParseAction {
        self.instructions.reserve(header.bound as usize);
        self.header = header;
        ParseAction::Continue
    }

    fn consume_instruction(&mut self, inst: dr::Instruction) -> ParseAction {
        self.instructions.push(inst);
        ParseAction::Continue
    }
}

/// Raises a module from its binary form. Fails if the words are not a
/// decodable SPIR-V module.
pub fn parse_words(words: &impl AsRef<[u32]>) -> Result<Module> {
    let words = words.as_ref();
    if words.is_empty() {
        return Err(ErrorKind::InvalidModule.into());
    }
    let mut raw = RawModule::new();
    rspirv::binary::parse_words(words, &mut raw)
        .map_err(|_| ErrorKind::InvalidModule)?;
    raise_module(&raw)
}

pub fn parse_bytes(bytes: &impl AsRef<[u8]>) -> Result<Module> {
    let bytes = bytes.as_ref();
    if bytes.is_empty() {
        return Err(ErrorKind::InvalidModule.into());
    }
    let mut raw = RawModule::new();
    rspirv::binary::parse_bytes(bytes, &mut raw)
        .map_err(|_| ErrorKind::InvalidModule)?;
    raise_module(&raw)
}
