use std::fmt;

use classcheck_symbols::Symbol;

use crate::AccessFlags;

/// Names of the attributes the parser decodes.
pub mod names {
    pub const ANNOTATION_DEFAULT: &str = "AnnotationDefault";
    pub const BOOTSTRAP_METHODS: &str = "BootstrapMethods";
    pub const CODE: &str = "Code";
    pub const CONSTANT_VALUE: &str = "ConstantValue";
    pub const ENCLOSING_METHOD: &str = "EnclosingMethod";
    pub const EXCEPTIONS: &str = "Exceptions";
    pub const INNER_CLASSES: &str = "InnerClasses";
    pub const LINE_NUMBER_TABLE: &str = "LineNumberTable";
    pub const LOCAL_VARIABLE_TABLE: &str = "LocalVariableTable";
    pub const LOCAL_VARIABLE_TYPE_TABLE: &str = "LocalVariableTypeTable";
    pub const METHOD_PARAMETERS: &str = "MethodParameters";
    pub const NEST_HOST: &str = "NestHost";
    pub const NEST_MEMBERS: &str = "NestMembers";
    pub const PERMITTED_SUBCLASSES: &str = "PermittedSubclasses";
    pub const RECORD: &str = "Record";
    pub const RUNTIME_INVISIBLE_ANNOTATIONS: &str = "RuntimeInvisibleAnnotations";
    pub const RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS: &str =
        "RuntimeInvisibleParameterAnnotations";
    pub const RUNTIME_INVISIBLE_TYPE_ANNOTATIONS: &str = "RuntimeInvisibleTypeAnnotations";
    pub const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
    pub const RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS: &str = "RuntimeVisibleParameterAnnotations";
    pub const RUNTIME_VISIBLE_TYPE_ANNOTATIONS: &str = "RuntimeVisibleTypeAnnotations";
    pub const SIGNATURE: &str = "Signature";
    pub const SOURCE_DEBUG_EXTENSION: &str = "SourceDebugExtension";
    pub const SOURCE_FILE: &str = "SourceFile";
    pub const STACK_MAP_TABLE: &str = "StackMapTable";
    pub const SYNTHETIC: &str = "Synthetic";
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// Kept as it appeared in the class file.
    Raw(RawAttribute),
    Code(CodeAttribute),
    /// `CONSTANT_Class` indices of the checked exceptions.
    Exceptions(Vec<u16>),
    /// Empty when the table had duplicate entries or a cycle.
    InnerClasses(Vec<InnerClassEntry>),
    BootstrapMethods(Vec<BootstrapMethod>),
    NestHost { host_class_index: u16 },
    NestMembers(Vec<u16>),
    PermittedSubclasses(Vec<u16>),
    Record(Vec<RecordComponent>),
    LineNumberTable(Vec<LineNumber>),
    LocalVariableTable(Vec<Local>),
    LocalVariableTypeTable(Vec<Local>),
    MethodParameters(Vec<MethodParameter>),
    ConstantValue { constant_value_index: u16 },
    Signature { signature_index: u16 },
    SourceFile { source_file_index: u16 },
    /// `None` if the bytes were not valid modified UTF-8.
    SourceDebugExtension(Option<String>),
    EnclosingMethod { class_index: u16, method_index: u16 },
    /// Frames are not interpreted; empty unless the class is parsed for verification.
    StackMapTable(Vec<u8>),
    Synthetic,
}

impl Attribute {
    pub fn name(&self) -> &str {
        match self {
            Attribute::Raw(raw) => raw.name.as_str(),
            Attribute::Code(_) => names::CODE,
            Attribute::Exceptions(_) => names::EXCEPTIONS,
            Attribute::InnerClasses(_) => names::INNER_CLASSES,
            Attribute::BootstrapMethods(_) => names::BOOTSTRAP_METHODS,
            Attribute::NestHost { .. } => names::NEST_HOST,
            Attribute::NestMembers(_) => names::NEST_MEMBERS,
            Attribute::PermittedSubclasses(_) => names::PERMITTED_SUBCLASSES,
            Attribute::Record(_) => names::RECORD,
            Attribute::LineNumberTable(_) => names::LINE_NUMBER_TABLE,
            Attribute::LocalVariableTable(_) => names::LOCAL_VARIABLE_TABLE,
            Attribute::LocalVariableTypeTable(_) => names::LOCAL_VARIABLE_TYPE_TABLE,
            Attribute::MethodParameters(_) => names::METHOD_PARAMETERS,
            Attribute::ConstantValue { .. } => names::CONSTANT_VALUE,
            Attribute::Signature { .. } => names::SIGNATURE,
            Attribute::SourceFile { .. } => names::SOURCE_FILE,
            Attribute::SourceDebugExtension(_) => names::SOURCE_DEBUG_EXTENSION,
            Attribute::EnclosingMethod { .. } => names::ENCLOSING_METHOD,
            Attribute::StackMapTable(_) => names::STACK_MAP_TABLE,
            Attribute::Synthetic => names::SYNTHETIC,
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct RawAttribute {
    pub name: Symbol,
    pub info: Vec<u8>,
}

impl fmt::Debug for RawAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawAttribute")
            .field("name", &self.name)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes(pub Vec<Attribute>);

impl Attributes {
    pub fn find_by_name(&self, name: &str) -> Option<&Attribute> {
        self.0.iter().find(|a| a.name() == name)
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        self.0.iter().find_map(|a| match a {
            Attribute::Code(code) => Some(code),
            _ => None,
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(Attribute::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// Zero for a handler that catches everything.
    pub catch_type: u16,
    pub catch_type_name: Option<Symbol>,
}

#[derive(Clone, PartialEq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}

impl CodeAttribute {
    pub fn line_numbers(&self) -> &[LineNumber] {
        self.attributes
            .iter()
            .find_map(|a| match a {
                Attribute::LineNumberTable(lines) => Some(lines.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn local_variables(&self) -> impl Iterator<Item = &Local> {
        self.attributes
            .iter()
            .filter_map(|a| match a {
                Attribute::LocalVariableTable(locals) => Some(locals.iter()),
                _ => None,
            })
            .flatten()
    }

    pub fn stack_map_table(&self) -> Option<&[u8]> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::StackMapTable(frames) => Some(frames.as_slice()),
            _ => None,
        })
    }
}

impl fmt::Debug for CodeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeAttribute")
            .field("max_stack", &self.max_stack)
            .field("max_locals", &self.max_locals)
            .field("code", &format!("({} bytes)", self.code.len()))
            .field("exception_table", &self.exception_table)
            .field("attributes", &self.attributes)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

/// An entry of a `LocalVariableTable` or `LocalVariableTypeTable`. For the latter `descriptor`
/// holds the generic signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Local {
    pub name: Symbol,
    pub descriptor: Symbol,
    pub start_pc: u16,
    pub length: u16,
    pub slot: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerClassEntry {
    pub inner_class_index: u16,
    pub outer_class_index: u16,
    pub inner_name_index: u16,
    pub access_flags: AccessFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethod {
    /// Index of a `CONSTANT_MethodHandle`.
    pub method_ref: u16,
    /// Indices of loadable constants.
    pub arguments: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodParameter {
    pub name_index: u16,
    pub access_flags: AccessFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponent {
    pub name: Symbol,
    pub descriptor: Symbol,
    pub attributes: Attributes,
}
