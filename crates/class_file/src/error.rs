use thiserror::Error;

use crate::constant_pool::Tag;

macro_rules! class_format_error {
    ($($arg:tt)*) => {
        crate::ClassFileError::ClassFormat(format!($($arg)*))
    };
}

macro_rules! invalid_constant {
    ($($arg:tt)*) => {
        crate::ClassFileError::InvalidConstant(format!($($arg)*))
    };
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassFileError {
    #[error("Truncated class file: {requested} bytes requested at offset {position}")]
    Truncated { position: usize, requested: usize },
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Extra bytes at the end of class file: {0}")]
    TrailingBytes(usize),
    #[error("Invalid attribute_length for {name} attribute (reported {reported} != parsed {parsed})")]
    InvalidAttributeLength {
        name: String,
        reported: usize,
        parsed: usize,
    },
    #[error("Unsupported major.minor version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },
    #[error("{0}")]
    InvalidConstant(String),
    #[error("Expected {} at constant pool index {index}, found {found}", display_tags(.expected))]
    PoolEntryMismatch {
        index: u16,
        found: Tag,
        expected: &'static [Tag],
    },
    #[error("Method <clinit> is not static")]
    MethodNotStatic,
    #[error("Invalid ConstantValue for field {field}: {reason}")]
    InvalidConstantValue { field: String, reason: String },
    #[error("{0}")]
    ClassFormat(String),
    #[error("{0}")]
    NotAClass(String),
    #[error("{found} (wrong name: {expected})")]
    NameMismatch { expected: String, found: String },
}

/// Coarse classification of [`ClassFileError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad magic, truncated or over-long input, attribute length mismatch.
    MalformedInput,
    UnsupportedVersion,
    /// Malformed, out-of-window or mistyped constant pool entries.
    InvalidConstant,
    /// Illegal flags, duplicates, bad descriptors and other format rule violations.
    StructuralViolation,
    /// The bytes describe a module, not a class.
    NotAClass,
    /// The class is well formed but does not have the expected name.
    NameMismatch,
}

impl ClassFileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassFileError::Truncated { .. }
            | ClassFileError::InvalidMagicIdentifier(_)
            | ClassFileError::TrailingBytes(_)
            | ClassFileError::InvalidAttributeLength { .. } => ErrorKind::MalformedInput,
            ClassFileError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            ClassFileError::InvalidConstant(_) | ClassFileError::PoolEntryMismatch { .. } => {
                ErrorKind::InvalidConstant
            }
            ClassFileError::MethodNotStatic
            | ClassFileError::InvalidConstantValue { .. }
            | ClassFileError::ClassFormat(_) => ErrorKind::StructuralViolation,
            ClassFileError::NotAClass(_) => ErrorKind::NotAClass,
            ClassFileError::NameMismatch { .. } => ErrorKind::NameMismatch,
        }
    }
}

fn display_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(|tag| tag.to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}
