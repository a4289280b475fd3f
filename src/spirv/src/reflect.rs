use std::collections::BTreeMap;

use derive_more::Display;
use log::{trace, warn};

use crate::*;

/// The binding model a descriptor is exposed through.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum DescriptorType {
    #[display(fmt = "UBO")]
    Ubo,
    #[display(fmt = "SSBO")]
    Ssbo,
    Sampler,
    Texture,
    Image,
    PushConstant,
}

impl From<ResourceKind> for DescriptorType {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::UniformBuffer => Self::Ubo,
            ResourceKind::StorageBuffer => Self::Ssbo,
            ResourceKind::SeparateSampler => Self::Sampler,
            ResourceKind::SeparateImage => Self::Texture,
            ResourceKind::StorageImage => Self::Image,
            ResourceKind::PushConstant => Self::PushConstant,
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Descriptor {
    pub ty: DescriptorType,
    pub binding: u32,
    pub name: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PushConstantMember {
    pub name: String,
    /// Byte offset within the block, from the `Offset` decoration.
    pub offset: u32,
    pub base_type: BaseType,
    pub vec_size: u32,
    pub columns: u32,
    /// Outermost array dimension; 1 if the member is not an array.
    pub array_length: u32,
}

impl PushConstantMember {
    pub fn type_name(&self) -> &'static str {
        self.base_type.name()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryPointInfo {
    pub name: String,
    pub execution_model: ExecutionModel,
    /// Input locations, ascending.
    pub inputs: Vec<u32>,
    /// Output locations, ascending.
    pub outputs: Vec<u32>,
}

/// Resource interface of a shader module.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReflectionData {
    pub push_constant_members: Vec<PushConstantMember>,
    /// Descriptors keyed by set index, each sorted by binding.
    pub descriptor_sets: BTreeMap<u32, Vec<Descriptor>>,
    /// Names of resources that lack a set or binding decoration.
    pub unresolved: Vec<String>,
    /// Entry points, sorted by name.
    pub entry_points: Vec<EntryPointInfo>,
}

impl ReflectionData {
    /// The descriptors of `set`, or an empty slice if the set is not
    /// used.
    pub fn descriptors(&self, set: u32) -> &[Descriptor] {
        self.descriptor_sets.get(&set).map(|descs| &descs[..]).unwrap_or(&[])
    }

    pub fn insert(&mut self, set: u32, descriptor: Descriptor) {
        self.descriptor_sets.entry(set).or_default().push(descriptor);
    }

    /// Sorts each set by binding. Descriptors sharing a binding keep
    /// their insertion order.
    pub fn sort(&mut self) {
        for descs in self.descriptor_sets.values_mut() {
            descs.sort_by_key(|desc| desc.binding);
        }
    }
}

// The order in which descriptor categories are gathered.
const DESCRIPTOR_KINDS: [ResourceKind; 5] = [
    ResourceKind::SeparateImage,
    ResourceKind::SeparateSampler,
    ResourceKind::UniformBuffer,
    ResourceKind::StorageBuffer,
    ResourceKind::StorageImage,
];

fn display_name<'m>(res: &Resource<'m>) -> &'m str {
    res.name()
        .filter(|name| !name.is_empty())
        .or_else(|| res.type_name())
        .unwrap_or("")
}

impl Module {
    /// Extracts descriptor bindings, push-constant layout and entry
    /// points. Never fails: resources without descriptor decorations
    /// are listed in `unresolved` instead.
    pub fn reflect(&self) -> ReflectionData {
        let mut data = ReflectionData::default();

        for &kind in DESCRIPTOR_KINDS.iter() {
            for res in self.resources_of(kind) {
                let name = display_name(&res);
                match (res.set(), res.binding()) {
                    (Some(set), Some(binding)) => {
                        trace!(
                            "Module::reflect: {:?} {} at ({}, {})",
                            kind, name, set, binding,
                        );
                        data.insert(set, Descriptor {
                            ty: kind.into(),
                            binding,
                            name: name.to_owned(),
                        });
                    },
                    _ => {
                        warn!(
                            "Module::reflect: {:?} {} has no set/binding",
                            kind, name,
                        );
                        data.unresolved.push(name.to_owned());
                    },
                }
            }
        }
        data.sort();

        for res in self.resources_of(ResourceKind::PushConstant) {
            reflect_push_constants(&res, &mut data.push_constant_members);
        }

        data.entry_points = self.entry_points().map(reflect_entry_point)
            .collect();
        data.entry_points.sort_by(|a, b| a.name.cmp(&b.name));

        data
    }
}

fn reflect_push_constants(
    block: &Resource<'_>,
    members: &mut Vec<PushConstantMember>,
) {
    for member in block.members() {
        let name = member.name().unwrap_or("").to_owned();
        let offset = member.offset().unwrap_or_else(|| {
            warn!(
                "reflect_push_constants: member {} of {} has no offset",
                name, display_name(block),
            );
            0
        });
        let desc = member.desc();
        members.push(PushConstantMember {
            name,
            offset,
            base_type: desc.base,
            vec_size: desc.vec_size,
            columns: desc.columns,
            array_length: desc.array_length(),
        });
    }
}

fn sorted_locations<'m>(vars: impl Iterator<Item = Variable<'m>>) ->
    Vec<u32>
{
    let mut locs: Vec<_> = vars.map(|var| var.location()).collect();
    locs.sort_unstable();
    locs
}

fn reflect_entry_point(entry: EntryPoint<'_>) -> EntryPointInfo {
    EntryPointInfo {
        name: entry.name().to_owned(),
        execution_model: entry.execution_model(),
        inputs: sorted_locations(entry.inputs()),
        outputs: sorted_locations(entry.outputs()),
    }
}

/// Parses `words` and reflects the resulting module.
pub fn reflect(words: &impl AsRef<[u32]>) -> Result<ReflectionData> {
    Ok(parse_words(words)?.reflect())
}
