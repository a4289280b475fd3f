use derive_more::Display;
use spirv_cross2::SpirvCrossError;

use crate::ShadingLanguage;

#[derive(Debug, Display)]
#[non_exhaustive]
pub enum CrossError {
    /// The module contains no words.
    #[display(fmt = "empty SPIR-V module")]
    EmptyModule,
    #[display(fmt = "{}", _0)]
    Parse(spv::Error),
    /// The options belong to a different backend than the target.
    #[display(fmt = "options do not match target {}", target)]
    OptionsMismatch { target: ShadingLanguage },
    /// The backend has no equivalent of the requested version or
    /// shader model.
    #[display(fmt = "unsupported {} version {}", target, version)]
    UnsupportedVersion { target: ShadingLanguage, version: u32 },
    #[display(fmt = "unknown shading language: {}", _0)]
    UnknownTarget(String),
    /// The code generator failed on the module.
    #[display(fmt = "backend error: {}", _0)]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, CrossError>;

impl std::error::Error for CrossError {}

impl From<spv::Error> for CrossError {
    fn from(error: spv::Error) -> Self {
        Self::Parse(error)
    }
}

impl From<SpirvCrossError> for CrossError {
    fn from(error: SpirvCrossError) -> Self {
        Self::Backend(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(CrossError::EmptyModule.to_string(), "empty SPIR-V module");
        let err = CrossError::UnsupportedVersion {
            target: ShadingLanguage::Hlsl,
            version: 20,
        };
        assert_eq!(err.to_string(), "unsupported hlsl version 20");
        let err: CrossError =
            SpirvCrossError::InvalidSpirv("bad".to_owned()).into();
        assert_eq!(err.to_string(),
            "backend error: The SPIR-V is invalid: bad.");
    }
}
