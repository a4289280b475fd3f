#[cfg(test)]
use std::backtrace::Backtrace;

use derive_more::*;

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ShaderParseErrorKind {
    /// The word stream is not a valid SPIR-V module.
    #[display(fmt = "invalid module")]
    InvalidModule,
    /// A library limitation has been exceeded, such as an array length.
    #[display(fmt = "limit exceeded")]
    LimitExceeded,
    /// The module uses a construct this model cannot represent.
    #[display(fmt = "unsupported module")]
    UnsupportedModule,
}

#[cfg(not(test))]
#[derive(Debug, Display)]
#[display(fmt = "{}", kind)]
pub struct ShaderParseError {
    kind: ErrorKind,
}

#[cfg(test)]
#[derive(Debug, Display)]
#[display(fmt = "{}\n{}", kind, backtrace)]
pub struct ShaderParseError {
    kind: ErrorKind,
    backtrace: Backtrace,
}

pub type ErrorKind = ShaderParseErrorKind;
pub type Error = ShaderParseError;
pub type Result<T> = std::result::Result<T, Error>;

impl std::error::Error for Error {}

impl Error {
    #[cfg(test)]
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    #[cfg(not(test))]
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<std::num::TryFromIntError> for ErrorKind {
    fn from(_: std::num::TryFromIntError) -> Self {
        Self::LimitExceeded
    }
}

impl<T> From<T> for Error
    where ErrorKind: From<T>
{
    fn from(val: T) -> Self {
        Self::new(val.into())
    }
}
