// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.2

mod descriptor;
mod error;
mod names;
mod symbol;

pub use descriptor::{
    field_descriptor_kind, is_array_type, method_descriptor_slots, returns_void, JavaKind,
};
pub use error::SymbolError;
pub use names::{
    is_valid_class_name, is_valid_method_name, is_valid_unqualified_name, validate_class_name,
    validate_field_name, validate_method_name,
};
pub use symbol::{is_modified_utf8, Symbol, SymbolTable};

pub type Result<T, E = SymbolError> = std::result::Result<T, E>;
