use std::{borrow::Cow, fmt, ops::Index};

use byteorder::{BigEndian, WriteBytesExt};
use classcheck_symbols::{self as symbols, JavaKind, Symbol, SymbolError};

use crate::{class_file::ClassVersion, ClassFileError, Result};

/// Borrows the payload of the entry at `index` if it is a `CpInfo::$i`.
macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {
        match $cp.at($index) {
            CpInfo::$i(n) => Ok(n),
            c => Err(ClassFileError::PoolEntryMismatch {
                index: $index,
                found: c.tag(),
                expected: &[Tag::$i],
            }),
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Invalid = 0,
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

impl Tag {
    /// Maps a tag byte read from a class file. `0` is not a valid tag byte.
    pub fn from_u8(tag: u8) -> Option<Tag> {
        Some(match tag {
            1 => Tag::Utf8,
            3 => Tag::Integer,
            4 => Tag::Float,
            5 => Tag::Long,
            6 => Tag::Double,
            7 => Tag::Class,
            8 => Tag::String,
            9 => Tag::FieldRef,
            10 => Tag::MethodRef,
            11 => Tag::InterfaceMethodRef,
            12 => Tag::NameAndType,
            15 => Tag::MethodHandle,
            16 => Tag::MethodType,
            17 => Tag::Dynamic,
            18 => Tag::InvokeDynamic,
            19 => Tag::Module,
            20 => Tag::Package,
            _ => return None,
        })
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    /// First class file major version in which the tag may appear.
    pub fn since_major_version(self) -> u16 {
        match self {
            Tag::MethodHandle | Tag::MethodType | Tag::InvokeDynamic => ClassVersion::JAVA_7,
            Tag::Module | Tag::Package => ClassVersion::JAVA_9,
            Tag::Dynamic => ClassVersion::JAVA_11,
            _ => ClassVersion::JAVA_1_1,
        }
    }

    pub fn is_valid_for_version(self, major_version: u16) -> bool {
        self != Tag::Invalid && major_version >= self.since_major_version()
    }

    /// Tags an `ldc` or a bootstrap method argument may refer to.
    pub fn is_loadable(self) -> bool {
        matches!(
            self,
            Tag::Integer
                | Tag::Float
                | Tag::Long
                | Tag::Double
                | Tag::Class
                | Tag::String
                | Tag::MethodHandle
                | Tag::MethodType
                | Tag::Dynamic
        )
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tag::Invalid => "CONSTANT_Invalid",
            Tag::Utf8 => "CONSTANT_Utf8",
            Tag::Integer => "CONSTANT_Integer",
            Tag::Float => "CONSTANT_Float",
            Tag::Long => "CONSTANT_Long",
            Tag::Double => "CONSTANT_Double",
            Tag::Class => "CONSTANT_Class",
            Tag::String => "CONSTANT_String",
            Tag::FieldRef => "CONSTANT_Fieldref",
            Tag::MethodRef => "CONSTANT_Methodref",
            Tag::InterfaceMethodRef => "CONSTANT_InterfaceMethodref",
            Tag::NameAndType => "CONSTANT_NameAndType",
            Tag::MethodHandle => "CONSTANT_MethodHandle",
            Tag::MethodType => "CONSTANT_MethodType",
            Tag::Dynamic => "CONSTANT_Dynamic",
            Tag::InvokeDynamic => "CONSTANT_InvokeDynamic",
            Tag::Module => "CONSTANT_Module",
            Tag::Package => "CONSTANT_Package",
        })
    }
}

/// Method handle reference kinds (JVMS §5.4.3.5).
pub mod reference_kind {
    pub const GET_FIELD: u8 = 1;
    pub const GET_STATIC: u8 = 2;
    pub const PUT_FIELD: u8 = 3;
    pub const PUT_STATIC: u8 = 4;
    pub const INVOKE_VIRTUAL: u8 = 5;
    pub const INVOKE_STATIC: u8 = 6;
    pub const INVOKE_SPECIAL: u8 = 7;
    pub const NEW_INVOKE_SPECIAL: u8 = 8;
    pub const INVOKE_INTERFACE: u8 = 9;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPool {
    cp_infos: Vec<CpInfo>,
    version: ClassVersion,
    raw: Vec<u8>,
}

static INVALID: CpInfo = CpInfo::Invalid;

impl ConstantPool {
    /// `cp_infos[0]` must be [`CpInfo::Invalid`]; `raw` is the pool as it appeared in the class
    /// file, without the leading count.
    pub fn new(cp_infos: Vec<CpInfo>, version: ClassVersion, raw: Vec<u8>) -> Self {
        debug_assert!(matches!(cp_infos.first(), Some(CpInfo::Invalid)));
        Self {
            cp_infos,
            version,
            raw,
        }
    }

    /// The `constant_pool_count` item: one more than the highest index.
    pub fn len(&self) -> usize {
        self.cp_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cp_infos.len() <= 1
    }

    pub fn version(&self) -> ClassVersion {
        self.version
    }

    pub fn major_version(&self) -> u16 {
        self.version.major
    }

    pub fn minor_version(&self) -> u16 {
        self.version.minor
    }

    /// Entry at `index`; [`CpInfo::Invalid`] for index 0, the second slot of wide entries and
    /// out-of-range indices.
    pub fn at(&self, index: u16) -> &CpInfo {
        self.cp_infos.get(index as usize).unwrap_or(&INVALID)
    }

    pub fn tag_at(&self, index: u16) -> Tag {
        self.at(index).tag()
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    pub fn validate_constant_at(&self, index: u16, tag: Tag) -> Result<()> {
        let found = self.tag_at(index);
        if found == tag {
            Ok(())
        } else {
            Err(ClassFileError::PoolEntryMismatch {
                index,
                found,
                expected: expected_tag(tag),
            })
        }
    }

    /// Text of the `CONSTANT_Utf8` entry at `index`. Entries with no `str` form are rejected
    /// here, since every caller needs the text as a name, descriptor or string.
    pub fn utf8_at(&self, index: u16) -> Result<&Symbol> {
        match self.at(index) {
            CpInfo::RawUtf8(_) => {
                Err(invalid_constant!("Invalid modified UTF-8 index {}", index))
            }
            _ => matches_cp_info!(self, index, Utf8),
        }
    }

    /// Bytes of the `CONSTANT_Utf8` entry at `index` as they appear in the class file.
    pub fn utf8_bytes_at(&self, index: u16) -> Result<Cow<'_, [u8]>> {
        match self.at(index) {
            CpInfo::Utf8(s) => Ok(cesu8::to_java_cesu8(s)),
            CpInfo::RawUtf8(bytes) => Ok(Cow::Borrowed(bytes)),
            c => Err(ClassFileError::PoolEntryMismatch {
                index,
                found: c.tag(),
                expected: &[Tag::Utf8],
            }),
        }
    }

    pub fn int_at(&self, index: u16) -> Result<i32> {
        matches_cp_info!(self, index, Integer).copied()
    }

    pub fn float_at(&self, index: u16) -> Result<f32> {
        matches_cp_info!(self, index, Float).copied()
    }

    pub fn long_at(&self, index: u16) -> Result<i64> {
        matches_cp_info!(self, index, Long).copied()
    }

    pub fn double_at(&self, index: u16) -> Result<f64> {
        matches_cp_info!(self, index, Double).copied()
    }

    pub fn class_at(&self, index: u16) -> Result<&ClassInfo> {
        matches_cp_info!(self, index, Class)
    }

    /// Name of the class referenced by the `CONSTANT_Class` entry at `index`.
    pub fn class_name_at(&self, index: u16) -> Result<&Symbol> {
        let ClassInfo { name_index } = self.class_at(index)?;
        self.utf8_at(*name_index)
    }

    /// Value of the `CONSTANT_String` entry at `index`.
    pub fn string_at(&self, index: u16) -> Result<&Symbol> {
        match self.at(index) {
            CpInfo::String { string_index } => self.utf8_at(*string_index),
            c => Err(ClassFileError::PoolEntryMismatch {
                index,
                found: c.tag(),
                expected: &[Tag::String],
            }),
        }
    }

    pub fn field_at(&self, index: u16) -> Result<&RefInfo> {
        matches_cp_info!(self, index, FieldRef)
    }

    /// Either a `CONSTANT_Methodref` or a `CONSTANT_InterfaceMethodref`.
    pub fn method_at(&self, index: u16) -> Result<&RefInfo> {
        match self.at(index) {
            CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => Ok(r),
            c => Err(ClassFileError::PoolEntryMismatch {
                index,
                found: c.tag(),
                expected: &[Tag::MethodRef, Tag::InterfaceMethodRef],
            }),
        }
    }

    pub fn name_and_type_at(&self, index: u16) -> Result<&NameAndTypeInfo> {
        matches_cp_info!(self, index, NameAndType)
    }

    pub fn method_handle_at(&self, index: u16) -> Result<&MethodHandleInfo> {
        matches_cp_info!(self, index, MethodHandle)
    }

    pub fn method_type_at(&self, index: u16) -> Result<&MethodTypeInfo> {
        matches_cp_info!(self, index, MethodType)
    }

    pub fn indy_at(&self, index: u16) -> Result<&DynamicInfo> {
        matches_cp_info!(self, index, InvokeDynamic)
    }

    pub fn dynamic_at(&self, index: u16) -> Result<&DynamicInfo> {
        matches_cp_info!(self, index, Dynamic)
    }

    /// Cross-entry checks: every reference points at an entry of the right kind and every name
    /// or descriptor is well formed.
    pub fn validate(&self) -> Result<()> {
        for index in 1..self.cp_infos.len() {
            self.validate_entry(index as u16)?;
        }
        Ok(())
    }

    fn validate_entry(&self, index: u16) -> Result<()> {
        match self.at(index) {
            CpInfo::Class(ClassInfo { name_index }) => {
                let name = self.utf8_at(*name_index)?;
                symbols::validate_class_name(name).map_err(|e| pool_error(index, e))
            }
            CpInfo::String { string_index } => self.utf8_bytes_at(*string_index).map(|_| ()),
            CpInfo::FieldRef(r) => {
                self.class_at(r.class_index)?;
                let (name, descriptor) = self.name_and_type_symbols(r.name_and_type_index)?;
                symbols::validate_field_name(name).map_err(|e| pool_error(index, e))?;
                symbols::field_descriptor_kind(descriptor, false)
                    .map_err(|e| pool_error(index, e))?;
                Ok(())
            }
            CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
                self.class_at(r.class_index)?;
                let (name, descriptor) = self.name_and_type_symbols(r.name_and_type_index)?;
                symbols::validate_method_name(name).map_err(|e| pool_error(index, e))?;
                symbols::method_descriptor_slots(descriptor).map_err(|e| pool_error(index, e))?;
                if name.as_str() == "<clinit>" {
                    return Err(invalid_constant!(
                        "Invalid method reference to <clinit> at index {}",
                        index
                    ));
                }
                if name.as_str() == "<init>" && !symbols::returns_void(descriptor) {
                    return Err(invalid_constant!(
                        "Invalid <init> reference with non-void descriptor {} at index {}",
                        descriptor,
                        index
                    ));
                }
                Ok(())
            }
            CpInfo::NameAndType(nat) => {
                let name = self.utf8_at(nat.name_index)?;
                let descriptor = self.utf8_at(nat.descriptor_index)?;
                if descriptor.starts_with('(') {
                    symbols::validate_method_name(name).map_err(|e| pool_error(index, e))?;
                    symbols::method_descriptor_slots(descriptor)
                        .map_err(|e| pool_error(index, e))?;
                } else {
                    symbols::validate_field_name(name).map_err(|e| pool_error(index, e))?;
                    symbols::field_descriptor_kind(descriptor, false)
                        .map_err(|e| pool_error(index, e))?;
                }
                Ok(())
            }
            CpInfo::MethodHandle(handle) => self.validate_method_handle(index, handle),
            CpInfo::MethodType(MethodTypeInfo { descriptor_index }) => {
                let descriptor = self.utf8_at(*descriptor_index)?;
                symbols::method_descriptor_slots(descriptor).map_err(|e| pool_error(index, e))?;
                Ok(())
            }
            CpInfo::Dynamic(info) => {
                let (_, descriptor) = self.name_and_type_symbols(info.name_and_type_index)?;
                symbols::field_descriptor_kind(descriptor, false)
                    .map_err(|e| pool_error(index, e))?;
                Ok(())
            }
            CpInfo::InvokeDynamic(info) => {
                let (_, descriptor) = self.name_and_type_symbols(info.name_and_type_index)?;
                symbols::method_descriptor_slots(descriptor).map_err(|e| pool_error(index, e))?;
                Ok(())
            }
            CpInfo::Module { name_index } | CpInfo::Package { name_index } => {
                self.utf8_at(*name_index).map(|_| ())
            }
            CpInfo::Invalid
            | CpInfo::Utf8(_)
            | CpInfo::RawUtf8(_)
            | CpInfo::Integer(_)
            | CpInfo::Float(_)
            | CpInfo::Long(_)
            | CpInfo::Double(_) => Ok(()),
        }
    }

    fn validate_method_handle(&self, index: u16, handle: &MethodHandleInfo) -> Result<()> {
        use reference_kind::*;

        let target = handle.reference_index;
        let name = match handle.reference_kind {
            GET_FIELD | GET_STATIC | PUT_FIELD | PUT_STATIC => {
                let r = self.field_at(target)?;
                return self.name_and_type_symbols(r.name_and_type_index).map(|_| ());
            }
            INVOKE_VIRTUAL | NEW_INVOKE_SPECIAL => {
                let r = matches_cp_info!(self, target, MethodRef)?;
                self.name_and_type_symbols(r.name_and_type_index)?.0
            }
            INVOKE_STATIC | INVOKE_SPECIAL => {
                let r = if self.version.major >= ClassVersion::JAVA_8 {
                    self.method_at(target)?
                } else {
                    matches_cp_info!(self, target, MethodRef)?
                };
                self.name_and_type_symbols(r.name_and_type_index)?.0
            }
            INVOKE_INTERFACE => {
                let r = matches_cp_info!(self, target, InterfaceMethodRef)?;
                self.name_and_type_symbols(r.name_and_type_index)?.0
            }
            kind => {
                return Err(invalid_constant!(
                    "Invalid method handle reference kind {} at index {}",
                    kind,
                    index
                ))
            }
        };

        let is_initializer = name.as_str() == "<init>" || name.as_str() == "<clinit>";
        let valid = if handle.reference_kind == NEW_INVOKE_SPECIAL {
            name.as_str() == "<init>"
        } else {
            !is_initializer
        };
        if !valid {
            return Err(invalid_constant!(
                "Invalid method handle target {} for reference kind {} at index {}",
                name,
                handle.reference_kind,
                index
            ));
        }
        Ok(())
    }

    fn name_and_type_symbols(&self, index: u16) -> Result<(&Symbol, &Symbol)> {
        let nat = self.name_and_type_at(index)?;
        Ok((
            self.utf8_at(nat.name_index)?,
            self.utf8_at(nat.descriptor_index)?,
        ))
    }

    /// Re-encodes the entries in class file format, without the leading count.
    pub fn to_raw_bytes(&self) -> Vec<u8> {
        let mut w = Vec::with_capacity(self.raw.len());
        for cp_info in &self.cp_infos[1..] {
            // Writing into a Vec cannot fail.
            let _ = cp_info.write_to(&mut w);
        }
        w
    }
}

impl Index<u16> for ConstantPool {
    type Output = CpInfo;

    fn index(&self, index: u16) -> &Self::Output {
        self.at(index)
    }
}

impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a CpInfo;
    type IntoIter = std::slice::Iter<'a, CpInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cp_infos.iter()
    }
}

fn pool_error(index: u16, e: SymbolError) -> ClassFileError {
    invalid_constant!("{} at constant pool index {}", e, index)
}

fn expected_tag(tag: Tag) -> &'static [Tag] {
    match tag {
        Tag::Invalid => &[Tag::Invalid],
        Tag::Utf8 => &[Tag::Utf8],
        Tag::Integer => &[Tag::Integer],
        Tag::Float => &[Tag::Float],
        Tag::Long => &[Tag::Long],
        Tag::Double => &[Tag::Double],
        Tag::Class => &[Tag::Class],
        Tag::String => &[Tag::String],
        Tag::FieldRef => &[Tag::FieldRef],
        Tag::MethodRef => &[Tag::MethodRef],
        Tag::InterfaceMethodRef => &[Tag::InterfaceMethodRef],
        Tag::NameAndType => &[Tag::NameAndType],
        Tag::MethodHandle => &[Tag::MethodHandle],
        Tag::MethodType => &[Tag::MethodType],
        Tag::Dynamic => &[Tag::Dynamic],
        Tag::InvokeDynamic => &[Tag::InvokeDynamic],
        Tag::Module => &[Tag::Module],
        Tag::Package => &[Tag::Package],
    }
}

#[derive(Debug, Clone)]
pub enum CpInfo {
    Invalid,
    Utf8(Symbol),
    /// A `CONSTANT_Utf8` that is well-formed modified UTF-8 but has no `str` form, such as an
    /// unpaired surrogate half. Only `CONSTANT_String` may refer to it.
    RawUtf8(Box<[u8]>),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(ClassInfo),
    String { string_index: u16 },
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Dynamic(DynamicInfo),
    InvokeDynamic(DynamicInfo),
    Module { name_index: u16 },
    Package { name_index: u16 },
}

impl CpInfo {
    pub fn tag(&self) -> Tag {
        match self {
            CpInfo::Invalid => Tag::Invalid,
            CpInfo::Utf8(_) | CpInfo::RawUtf8(_) => Tag::Utf8,
            CpInfo::Integer(_) => Tag::Integer,
            CpInfo::Float(_) => Tag::Float,
            CpInfo::Long(_) => Tag::Long,
            CpInfo::Double(_) => Tag::Double,
            CpInfo::Class(_) => Tag::Class,
            CpInfo::String { .. } => Tag::String,
            CpInfo::FieldRef(_) => Tag::FieldRef,
            CpInfo::MethodRef(_) => Tag::MethodRef,
            CpInfo::InterfaceMethodRef(_) => Tag::InterfaceMethodRef,
            CpInfo::NameAndType(_) => Tag::NameAndType,
            CpInfo::MethodHandle(_) => Tag::MethodHandle,
            CpInfo::MethodType(_) => Tag::MethodType,
            CpInfo::Dynamic(_) => Tag::Dynamic,
            CpInfo::InvokeDynamic(_) => Tag::InvokeDynamic,
            CpInfo::Module { .. } => Tag::Module,
            CpInfo::Package { .. } => Tag::Package,
        }
    }

    /// Kind of value a `ConstantValue` attribute referring to this entry initializes.
    pub fn constant_value_kind(&self) -> Option<JavaKind> {
        match self {
            CpInfo::Integer(_) => Some(JavaKind::Int),
            CpInfo::Float(_) => Some(JavaKind::Float),
            CpInfo::Long(_) => Some(JavaKind::Long),
            CpInfo::Double(_) => Some(JavaKind::Double),
            CpInfo::String { .. } => Some(JavaKind::Object),
            _ => None,
        }
    }

    fn write_to(&self, w: &mut Vec<u8>) -> std::io::Result<()> {
        // The second slot of a wide entry has no bytes of its own.
        if let CpInfo::Invalid = self {
            return Ok(());
        }

        w.write_u8(self.tag().value())?;
        match self {
            CpInfo::Invalid => {}
            CpInfo::Utf8(s) => {
                let bytes = cesu8::to_java_cesu8(s);
                w.write_u16::<BigEndian>(bytes.len() as u16)?;
                w.extend_from_slice(&bytes);
            }
            CpInfo::RawUtf8(bytes) => {
                w.write_u16::<BigEndian>(bytes.len() as u16)?;
                w.extend_from_slice(bytes);
            }
            CpInfo::Integer(i) => w.write_i32::<BigEndian>(*i)?,
            CpInfo::Float(f) => w.write_f32::<BigEndian>(*f)?,
            CpInfo::Long(l) => w.write_i64::<BigEndian>(*l)?,
            CpInfo::Double(d) => w.write_f64::<BigEndian>(*d)?,
            CpInfo::Class(ClassInfo { name_index })
            | CpInfo::String {
                string_index: name_index,
            }
            | CpInfo::MethodType(MethodTypeInfo {
                descriptor_index: name_index,
            })
            | CpInfo::Module { name_index }
            | CpInfo::Package { name_index } => w.write_u16::<BigEndian>(*name_index)?,
            CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
                w.write_u16::<BigEndian>(r.class_index)?;
                w.write_u16::<BigEndian>(r.name_and_type_index)?;
            }
            CpInfo::NameAndType(nat) => {
                w.write_u16::<BigEndian>(nat.name_index)?;
                w.write_u16::<BigEndian>(nat.descriptor_index)?;
            }
            CpInfo::MethodHandle(handle) => {
                w.write_u8(handle.reference_kind)?;
                w.write_u16::<BigEndian>(handle.reference_index)?;
            }
            CpInfo::Dynamic(info) | CpInfo::InvokeDynamic(info) => {
                w.write_u16::<BigEndian>(info.bootstrap_method_attr_index)?;
                w.write_u16::<BigEndian>(info.name_and_type_index)?;
            }
        }
        Ok(())
    }
}

/// Floating-point constants compare by bit pattern, so a pool holding a NaN equals itself.
impl PartialEq for CpInfo {
    fn eq(&self, other: &Self) -> bool {
        use CpInfo::*;

        match (self, other) {
            (Invalid, Invalid) => true,
            (Utf8(a), Utf8(b)) => a == b,
            (RawUtf8(a), RawUtf8(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Long(a), Long(b)) => a == b,
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (Class(a), Class(b)) => a == b,
            (String { string_index: a }, String { string_index: b }) => a == b,
            (FieldRef(a), FieldRef(b))
            | (MethodRef(a), MethodRef(b))
            | (InterfaceMethodRef(a), InterfaceMethodRef(b)) => a == b,
            (NameAndType(a), NameAndType(b)) => a == b,
            (MethodHandle(a), MethodHandle(b)) => a == b,
            (MethodType(a), MethodType(b)) => a == b,
            (Dynamic(a), Dynamic(b)) | (InvokeDynamic(a), InvokeDynamic(b)) => a == b,
            (Module { name_index: a }, Module { name_index: b })
            | (Package { name_index: a }, Package { name_index: b }) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

/// Shared by `CONSTANT_Dynamic` and `CONSTANT_InvokeDynamic`.
#[derive(Debug, PartialEq, Clone)]
pub struct DynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}


#[cfg(test)]
mod validate_tests {
    use classcheck_symbols::SymbolTable;

    use super::*;

    fn method_ref_pool(name: &str, descriptor: &str) -> ConstantPool {
        let symbols = SymbolTable::new();
        ConstantPool::new(
            vec![
                CpInfo::Invalid,
                CpInfo::Utf8(symbols.intern("Foo")),
                CpInfo::Class(ClassInfo { name_index: 1 }),
                CpInfo::Utf8(symbols.intern(name)),
                CpInfo::Utf8(symbols.intern(descriptor)),
                CpInfo::NameAndType(NameAndTypeInfo {
                    name_index: 3,
                    descriptor_index: 4,
                }),
                CpInfo::MethodRef(RefInfo {
                    class_index: 2,
                    name_and_type_index: 5,
                }),
            ],
            ClassVersion::new(52, 0),
            Vec::new(),
        )
    }

    #[test]
    fn it_should_accept_well_formed_references() {
        assert!(method_ref_pool("run", "(IJ)V").validate().is_ok());
        assert!(method_ref_pool("<init>", "()V").validate().is_ok());
    }

    #[test]
    fn it_should_reject_non_void_init_references() {
        let error = method_ref_pool("<init>", "()I").validate().unwrap_err();

        assert_eq!(crate::ErrorKind::InvalidConstant, error.kind());
    }

    #[test]
    fn it_should_reject_malformed_descriptors() {
        assert!(method_ref_pool("run", "(I").validate().is_err());
    }

    #[test]
    fn it_should_reject_references_to_the_wrong_kind_of_entry() {
        let symbols = SymbolTable::new();
        let pool = ConstantPool::new(
            vec![
                CpInfo::Invalid,
                CpInfo::Utf8(symbols.intern("Foo")),
                CpInfo::Class(ClassInfo { name_index: 2 }),
            ],
            ClassVersion::new(52, 0),
            Vec::new(),
        );

        assert_eq!(
            Err(ClassFileError::PoolEntryMismatch {
                index: 2,
                found: Tag::Class,
                expected: &[Tag::Utf8],
            }),
            pool.validate()
        );
    }

    #[test]
    fn it_should_check_method_handle_reference_kinds() {
        let mut cp_infos = method_ref_pool("run", "()V").cp_infos;
        cp_infos.push(CpInfo::MethodHandle(MethodHandleInfo {
            reference_kind: reference_kind::INVOKE_VIRTUAL,
            reference_index: 6,
        }));
        cp_infos.push(CpInfo::MethodHandle(MethodHandleInfo {
            reference_kind: reference_kind::NEW_INVOKE_SPECIAL,
            reference_index: 6,
        }));
        let pool = ConstantPool::new(cp_infos, ClassVersion::new(52, 0), Vec::new());

        assert!(pool.validate_entry(7).is_ok());
        assert_eq!(
            crate::ErrorKind::InvalidConstant,
            pool.validate_entry(8).unwrap_err().kind()
        );
    }
}
