use std::fmt;

use classcheck_symbols::{JavaKind, Symbol, SymbolTable};

use crate::{
    attributes::{Attribute, Attributes, CodeAttribute},
    parser::Parser,
    AccessFlags, ConstantPool, ParserOptions, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassVersion {
    pub major: u16,
    pub minor: u16,
}

impl ClassVersion {
    pub const JAVA_1_1: u16 = 45;
    pub const JAVA_5: u16 = 49;
    pub const JAVA_6: u16 = 50;
    pub const JAVA_7: u16 = 51;
    pub const JAVA_8: u16 = 52;
    pub const JAVA_9: u16 = 53;
    pub const JAVA_11: u16 = 55;
    pub const JAVA_12: u16 = 56;
    pub const JAVA_14: u16 = 58;
    pub const JAVA_17: u16 = 61;

    pub const MIN_SUPPORTED_MAJOR: u16 = Self::JAVA_1_1;
    pub const MAX_SUPPORTED_MINOR: u16 = 0;
    pub const PREVIEW_MINOR: u16 = 65535;

    pub fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ClassVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A parsed and validated class file.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub version: ClassVersion,
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub name: Symbol,
    /// `None` only for `java/lang/Object`.
    pub super_name: Option<Symbol>,
    pub interfaces: Vec<Symbol>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Attributes,
}

impl ClassFile {
    pub fn parse(bytes: &[u8], options: &ParserOptions, symbols: &SymbolTable) -> Result<ClassFile> {
        Parser::new(bytes, options, symbols).parse()
    }

    /// Reads just enough of `bytes` to return the name of the class they define.
    pub fn peek_name(bytes: &[u8], options: &ParserOptions, symbols: &SymbolTable) -> Result<Symbol> {
        Parser::new(bytes, options, symbols).peek_name()
    }

    pub fn class_name(&self) -> &str {
        &self.name
    }

    pub fn super_class(&self) -> Option<&str> {
        self.super_name.as_deref()
    }

    pub fn field_name<'a>(&self, field: &'a FieldInfo) -> &'a str {
        &field.name
    }

    pub fn field_descriptor<'a>(&self, field: &'a FieldInfo) -> &'a str {
        &field.descriptor
    }

    pub fn method_name<'a>(&self, method: &'a MethodInfo) -> &'a str {
        &method.name
    }

    pub fn method_descriptor<'a>(&self, method: &'a MethodInfo) -> &'a str {
        &method.descriptor
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.is_interface()
    }

    /// The class declares a `finalize()V` method other than the one in `java/lang/Object`.
    pub fn has_finalizer(&self) -> bool {
        self.access_flags.contains(AccessFlags::FINALIZER)
    }

    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }

    pub fn find_field(&self, name: &str, descriptor: &str) -> Option<&FieldInfo> {
        self.fields
            .iter()
            .find(|f| f.name == name && f.descriptor == descriptor)
    }

    pub fn source_file(&self) -> Option<&str> {
        match self.attributes.find_by_name("SourceFile")? {
            Attribute::SourceFile { source_file_index } => self
                .constant_pool
                .utf8_at(*source_file_index)
                .ok()
                .map(Symbol::as_str),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub access_flags: AccessFlags,
    pub name: Symbol,
    pub descriptor: Symbol,
    pub kind: JavaKind,
    pub attributes: Attributes,
}

impl FieldInfo {
    pub fn is_static(&self) -> bool {
        self.access_flags.is_static()
    }

    pub fn constant_value_index(&self) -> Option<u16> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::ConstantValue {
                constant_value_index,
            } => Some(*constant_value_index),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub access_flags: AccessFlags,
    pub name: Symbol,
    pub descriptor: Symbol,
    pub attributes: Attributes,
}

impl MethodInfo {
    pub fn code(&self) -> Option<&CodeAttribute> {
        self.attributes.code()
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.is_static()
    }
}
