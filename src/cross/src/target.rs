use std::str::FromStr;

use derive_more::Display;
use enum_map::Enum;

use crate::*;

/// The languages a module can be cross-compiled to.
#[derive(Clone, Copy, Debug, Display, Enum, Eq, Hash, PartialEq)]
pub enum ShadingLanguage {
    #[display(fmt = "es2")]
    GlslEs2,
    #[display(fmt = "es3")]
    GlslEs3,
    #[display(fmt = "450")]
    Glsl450,
    #[display(fmt = "vk")]
    GlslVulkan,
    #[display(fmt = "hlsl")]
    Hlsl,
    #[display(fmt = "msl")]
    Msl,
}

impl ShadingLanguage {
    pub const ALL: [ShadingLanguage; 6] = [
        Self::GlslEs2,
        Self::GlslEs3,
        Self::Glsl450,
        Self::GlslVulkan,
        Self::Hlsl,
        Self::Msl,
    ];

    /// File name suffix for generated source.
    pub fn extension(self) -> &'static str {
        match self {
            Self::GlslEs2 => "_es2.glsl",
            Self::GlslEs3 => "_es3.glsl",
            Self::Glsl450 => "_450.glsl",
            Self::GlslVulkan => "_vk.glsl",
            Self::Hlsl => ".hlsl",
            Self::Msl => ".metal",
        }
    }

    pub fn is_glsl(self) -> bool {
        matches!(
            self,
            Self::GlslEs2 | Self::GlslEs3 | Self::Glsl450 | Self::GlslVulkan,
        )
    }

    /// True if the target lacks separate sampler objects, so textures
    /// and samplers must be merged before emission.
    pub fn combines_samplers(self) -> bool {
        matches!(self, Self::GlslEs2 | Self::GlslEs3 | Self::Glsl450)
    }

    /// True if buffer matrices must be explicitly marked column-major.
    pub fn needs_column_major(self) -> bool {
        self == Self::Hlsl
    }

    pub fn naming_rule(self) -> NamingRule {
        match self {
            Self::GlslEs2 => NamingRule::StripTypePrefix,
            _ => NamingRule::LowerFirst,
        }
    }
}

impl FromStr for ShadingLanguage {
    type Err = CrossError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL.iter().copied()
            .find(|target| target.to_string() == s)
            .ok_or_else(|| CrossError::UnknownTarget(s.to_owned()))
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct GlslOptions {
    pub version: u32,
    pub es: bool,
    pub vulkan_semantics: bool,
    pub enable_420pack_extension: bool,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct HlslOptions {
    /// Shader model times ten, e.g. 50 for SM 5.0.
    pub shader_model: u32,
}

/// Platform options are left at the backend's defaults.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct MslOptions {}

/// Backend configuration for a single compilation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BackendOptions {
    Glsl(GlslOptions),
    Hlsl(HlslOptions),
    Msl(MslOptions),
}

impl BackendOptions {
    /// True if these options configure the backend that emits `target`.
    pub fn applies_to(&self, target: ShadingLanguage) -> bool {
        match self {
            Self::Glsl(_) => target.is_glsl(),
            Self::Hlsl(_) => target == ShadingLanguage::Hlsl,
            Self::Msl(_) => target == ShadingLanguage::Msl,
        }
    }
}

/// The options used to compile for `target`.
pub fn select(target: ShadingLanguage) -> BackendOptions {
    use ShadingLanguage as Sl;
    let glsl = |version, es, vulkan_semantics| {
        BackendOptions::Glsl(GlslOptions {
            version,
            es,
            vulkan_semantics,
            enable_420pack_extension: true,
        })
    };
    match target {
        Sl::GlslEs2 => glsl(200, true, false),
        Sl::GlslEs3 => glsl(310, true, false),
        Sl::Glsl450 => glsl(450, false, false),
        Sl::GlslVulkan => glsl(450, false, true),
        Sl::Hlsl => BackendOptions::Hlsl(HlslOptions { shader_model: 50 }),
        Sl::Msl => BackendOptions::Msl(MslOptions {}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        for &target in ShadingLanguage::ALL.iter() {
            let name = target.to_string();
            assert_eq!(name.parse::<ShadingLanguage>().unwrap(), target);
        }
        assert!("glsl".parse::<ShadingLanguage>().is_err());
    }

    #[test]
    fn policies() {
        use ShadingLanguage as Sl;
        let combining: Vec<_> = Sl::ALL.iter().copied()
            .filter(|t| t.combines_samplers())
            .collect();
        assert_eq!(combining, [Sl::GlslEs2, Sl::GlslEs3, Sl::Glsl450]);
        assert!(Sl::Hlsl.needs_column_major());
        assert!(!Sl::Msl.needs_column_major());
        assert_eq!(Sl::GlslEs2.naming_rule(), NamingRule::StripTypePrefix);
        assert_eq!(Sl::GlslVulkan.naming_rule(), NamingRule::LowerFirst);
        assert_eq!(Sl::Msl.extension(), ".metal");
    }

    #[test]
    fn options_apply_to_family() {
        for &target in ShadingLanguage::ALL.iter() {
            assert!(select(target).applies_to(target));
        }
        let glsl = select(ShadingLanguage::Glsl450);
        assert!(!glsl.applies_to(ShadingLanguage::Hlsl));
        assert!(!select(ShadingLanguage::Msl)
            .applies_to(ShadingLanguage::GlslVulkan));
    }
}
