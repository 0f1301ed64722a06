// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html

#[macro_use]
mod error;

mod access_flags;
pub mod attributes;
mod checks;
mod class_file;
pub mod constant_pool;
mod options;
mod parser;
mod stream;

pub use self::class_file::{ClassFile, ClassVersion, FieldInfo, MethodInfo};
pub use access_flags::AccessFlags;
pub use constant_pool::{ConstantPool, CpInfo, Tag};
pub use error::{ClassFileError, ErrorKind};
pub use options::{JavaVersion, ParserOptions};
pub use parser::Parser;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
