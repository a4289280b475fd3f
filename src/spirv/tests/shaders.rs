use rspirv::binary::Assemble;
use rspirv::dr;
use spirv_headers as spv;
use tessera_spirv::*;

fn decorate_u32(
    b: &mut dr::Builder,
    id: u32,
    decoration: spv::Decoration,
    value: u32,
) {
    b.decorate(id, decoration, vec![dr::Operand::LiteralInt32(value)]);
}

/// A fragment shader with a texture, a sampler and a color output.
fn fragment_shader() -> Vec<u32> {
    let mut b = dr::Builder::new();
    b.capability(spv::Capability::Shader);
    b.memory_model(spv::AddressingModel::Logical, spv::MemoryModel::GLSL450);

    let void = b.type_void();
    let float = b.type_float(32);
    let vec2 = b.type_vector(float, 2);
    let vec4 = b.type_vector(float, 4);

    let image = b.type_image(float, spv::Dim::Dim2D, 0, 0, 0, 1,
        spv::ImageFormat::Unknown, None);
    let image_ptr = b.type_pointer(None, spv::StorageClass::UniformConstant,
        image);
    let tex = b.variable(image_ptr, None, spv::StorageClass::UniformConstant,
        None);
    b.name(tex, "albedo".to_string());
    decorate_u32(&mut b, tex, spv::Decoration::DescriptorSet, 1);
    decorate_u32(&mut b, tex, spv::Decoration::Binding, 0);

    let sampler = b.type_sampler();
    let sampler_ptr = b.type_pointer(None,
        spv::StorageClass::UniformConstant, sampler);
    let smp = b.variable(sampler_ptr, None,
        spv::StorageClass::UniformConstant, None);
    b.name(smp, "albedo_sampler".to_string());
    decorate_u32(&mut b, smp, spv::Decoration::DescriptorSet, 1);
    decorate_u32(&mut b, smp, spv::Decoration::Binding, 1);

    let in_ptr = b.type_pointer(None, spv::StorageClass::Input, vec2);
    let in_uv = b.variable(in_ptr, None, spv::StorageClass::Input, None);
    b.name(in_uv, "in_texcoord0".to_string());
    decorate_u32(&mut b, in_uv, spv::Decoration::Location, 2);

    let out_ptr = b.type_pointer(None, spv::StorageClass::Output, vec4);
    let out_color = b.variable(out_ptr, None, spv::StorageClass::Output, None);
    b.name(out_color, "out_color".to_string());
    decorate_u32(&mut b, out_color, spv::Decoration::Location, 0);

    let fn_ty = b.type_function(void, Vec::<u32>::new());
    let main = b.begin_function(void, None, spv::FunctionControl::NONE, fn_ty)
        .unwrap();
    b.begin_block(None).unwrap();
    b.ret().unwrap();
    b.end_function().unwrap();
    b.entry_point(spv::ExecutionModel::Fragment, main, "main".to_string(),
        vec![in_uv, out_color]);

    b.module().assemble()
}

#[test]
fn parse() {
    let module = parse_words(&fragment_shader()).unwrap();

    assert_eq!(module.entry_points().len(), 1);

    let entry = module.get_entry_point(&"main").unwrap();
    assert_eq!(entry.execution_model(), ExecutionModel::Fragment);
    assert_eq!(entry.inputs().count(), 1);
    assert_eq!(entry.outputs().count(), 1);

    let tex_coord = entry.inputs().find(|var| var.location() == 2).unwrap();
    assert_eq!(tex_coord.storage_class(), StorageClass::Input);
    assert_eq!(tex_coord.name(), Some("in_texcoord0"));

    let color = entry.outputs().find(|var| var.location() == 0).unwrap();
    assert_eq!(color.storage_class(), StorageClass::Output);
    assert_eq!(color.name(), Some("out_color"));

    let albedo = module.resources()
        .find(|res| (res.set(), res.binding()) == (Some(1), Some(0)))
        .unwrap();
    assert_eq!(albedo.kind(), ResourceKind::SeparateImage);
    assert_eq!(albedo.storage_class(), StorageClass::UniformConstant);
    assert_eq!(albedo.name(), Some("albedo"));

    assert_eq!(module.resources_of(ResourceKind::SeparateSampler).count(), 1);
}

#[test]
fn parse_bytes_matches_words() {
    let words = fragment_shader();
    let bytes: Vec<u8> = words.iter()
        .flat_map(|word| word.to_le_bytes().to_vec())
        .collect();
    let module = parse_bytes(&bytes).unwrap();
    assert_eq!(module.resources().len(), 2);
    assert_eq!(
        module.reflect(),
        parse_words(&words).unwrap().reflect(),
    );
}

#[test]
fn reflect_fragment_shader() {
    let data = reflect(&fragment_shader()).unwrap();
    assert!(data.push_constant_members.is_empty());
    assert!(data.descriptors(0).is_empty());
    assert_eq!(data.descriptors(1), &[
        Descriptor {
            ty: DescriptorType::Texture,
            binding: 0,
            name: "albedo".to_owned(),
        },
        Descriptor {
            ty: DescriptorType::Sampler,
            binding: 1,
            name: "albedo_sampler".to_owned(),
        },
    ]);
    assert_eq!(data.entry_points[0].inputs, [2]);
    assert_eq!(data.entry_points[0].outputs, [0]);
}

#[test]
fn reject_garbage() {
    assert_eq!(parse_words(&Vec::<u32>::new()).unwrap_err().kind(),
        ErrorKind::InvalidModule);
    assert_eq!(parse_bytes(&[1u8, 2, 3]).unwrap_err().kind(),
        ErrorKind::InvalidModule);
    assert_eq!(parse_words(&[0x0723_0203u32]).unwrap_err().kind(),
        ErrorKind::InvalidModule);
}
