use std::fmt;

/// Scalar or aggregate category of a SPIR-V type, after stripping
/// vector, matrix and array dimensions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BaseType {
    Unknown,
    Void,
    Boolean,
    Char,
    Int,
    UInt,
    Int64,
    UInt64,
    AtomicCounter,
    Half,
    Float,
    Double,
    Struct,
    Image,
    SampledImage,
    Sampler,
    SByte,
    UByte,
    Short,
    UShort,
}

impl Default for BaseType {
    fn default() -> Self {
        Self::Unknown
    }
}

impl BaseType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Void => "Void",
            Self::Boolean => "Boolean",
            Self::Char => "Char",
            Self::Int => "Int",
            Self::UInt => "UInt",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::AtomicCounter => "AtomicCounter",
            Self::Half => "Half",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Struct => "Struct",
            Self::Image => "Image",
            Self::SampledImage => "SampledImage",
            Self::Sampler => "Sampler",
            Self::SByte => "SByte",
            Self::UByte => "UByte",
            Self::Short => "Short",
            Self::UShort => "UShort",
        }
    }

    /// Size in bytes of one scalar of this type. Zero for types without
    /// a fixed scalar size.
    pub fn size(self) -> u32 {
        match self {
            Self::Boolean | Self::Char | Self::SByte | Self::UByte => 1,
            Self::Half | Self::Short | Self::UShort => 2,
            Self::Int | Self::UInt | Self::Float => 4,
            Self::Int64 | Self::UInt64 | Self::Double => 8,
            Self::Unknown
            | Self::Void
            | Self::AtomicCounter
            | Self::Struct
            | Self::Image
            | Self::SampledImage
            | Self::Sampler => 0,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Half | Self::Float | Self::Double)
    }

    pub(crate) fn int(width: u32, signed: bool) -> Self {
        match (width, signed) {
            (8, true) => Self::SByte,
            (8, false) => Self::UByte,
            (16, true) => Self::Short,
            (16, false) => Self::UShort,
            (32, true) => Self::Int,
            (32, false) => Self::UInt,
            (64, true) => Self::Int64,
            (64, false) => Self::UInt64,
            _ => Self::Unknown,
        }
    }

    pub(crate) fn float(width: u32) -> Self {
        match width {
            16 => Self::Half,
            32 => Self::Float,
            64 => Self::Double,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(BaseType::Float.size(), 4);
        assert_eq!(BaseType::Double.size(), 8);
        assert_eq!(BaseType::Boolean.size(), 1);
        assert_eq!(BaseType::Struct.size(), 0);
        assert_eq!(BaseType::Image.size(), 0);
    }

    #[test]
    fn from_widths() {
        assert_eq!(BaseType::int(32, true), BaseType::Int);
        assert_eq!(BaseType::int(64, false), BaseType::UInt64);
        assert_eq!(BaseType::int(24, false), BaseType::Unknown);
        assert_eq!(BaseType::float(16), BaseType::Half);
        assert_eq!(BaseType::float(32).to_string(), "Float");
    }
}
