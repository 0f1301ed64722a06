use std::collections::HashSet;

use classcheck_symbols::{self as symbols, Symbol, SymbolError, SymbolTable};

use crate::{
    attributes::{Attribute, RawAttribute},
    checks,
    class_file::{ClassFile, ClassVersion},
    stream::ClassfileStream,
    AccessFlags, ClassFileError, ConstantPool, ParserOptions, Result,
};

mod annotations;
mod class_attributes;
mod code;
mod common;
mod constant_pool;
mod fields;
mod methods;

use self::constant_pool::PoolSummary;

const MAGIC: u32 = 0xCAFEBABE;
const JAVA_LANG_OBJECT: &str = "java/lang/Object";

/// What the member and attribute stages need to know about the class being parsed.
pub(crate) struct ClassContext<'p> {
    pub pool: &'p ConstantPool,
    pub version: ClassVersion,
    pub name: Symbol,
    /// Class flags, including the bits derived while parsing members and attributes.
    pub flags: AccessFlags,
    /// Highest bootstrap method index referenced from the constant pool.
    pub max_bootstrap_method_index: Option<u16>,
}

impl ClassContext<'_> {
    pub fn is_interface(&self) -> bool {
        self.flags.is_interface()
    }

    pub fn major_version(&self) -> u16 {
        self.version.major
    }
}

/// Single-pass class file parser. One parser handles one class file.
pub struct Parser<'a> {
    stream: ClassfileStream<'a>,
    options: &'a ParserOptions,
    symbols: &'a SymbolTable,
}

impl<'a> Parser<'a> {
    pub fn new(bytes: &'a [u8], options: &'a ParserOptions, symbols: &'a SymbolTable) -> Self {
        Self {
            stream: ClassfileStream::new(bytes),
            options,
            symbols,
        }
    }

    pub fn parse(mut self) -> Result<ClassFile> {
        self.parse_magic_identifier()?;
        let version = self.parse_version()?;
        let (constant_pool, summary) = self.parse_constant_pool(version)?;
        let access_flags = self.parse_class_flags(version, &summary)?;

        let this_class = self.stream.read_u16()?;
        let name = self.parse_this_class(&constant_pool, this_class)?;

        let mut cx = ClassContext {
            pool: &constant_pool,
            version,
            name,
            flags: access_flags,
            max_bootstrap_method_index: summary.max_bootstrap_method_index,
        };

        let super_name = self.parse_super_class(&cx)?;
        let interfaces = self.parse_interfaces(&cx)?;
        let fields = self.parse_fields(&cx)?;
        let methods = self.parse_methods(&mut cx)?;
        let attributes = self.parse_class_attributes(&mut cx)?;

        self.stream.check_end_of_file()?;

        log::debug!(
            "Parsed {}: {} fields, {} methods, {} attributes",
            cx.name,
            fields.len(),
            methods.len(),
            attributes.len()
        );

        let ClassContext {
            name,
            flags: access_flags,
            ..
        } = cx;

        Ok(ClassFile {
            version,
            constant_pool,
            access_flags,
            this_class,
            name,
            super_name,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Parses up to `this_class` and returns the class name.
    pub fn peek_name(mut self) -> Result<Symbol> {
        self.parse_magic_identifier()?;
        let version = self.parse_version()?;
        let (constant_pool, _) = self.parse_constant_pool(version)?;
        let _access_flags = self.stream.read_u16()?;
        let this_class = self.stream.read_u16()?;

        constant_pool.class_name_at(this_class).cloned()
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.stream.read_u32()? {
            MAGIC => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<ClassVersion> {
        let minor = self.stream.read_u16()?;
        let major = self.stream.read_u16()?;
        checks::verify_version(
            self.options.java_version,
            self.options.preview_enabled,
            major,
            minor,
        )?;

        log::debug!("Class file version {}.{}", major, minor);
        Ok(ClassVersion::new(major, minor))
    }

    fn parse_class_flags(&mut self, version: ClassVersion, summary: &PoolSummary) -> Result<AccessFlags> {
        let mut recognized = AccessFlags::RECOGNIZED_CLASS_MODIFIERS;
        if version.major >= ClassVersion::JAVA_9 {
            recognized |= AccessFlags::MODULE;
        }

        let mut flags = AccessFlags::from_u16(self.stream.read_u16()?) & recognized;
        if flags.is_interface() && version.major < ClassVersion::JAVA_6 {
            flags |= AccessFlags::ABSTRACT;
        }

        // ACC_MODULE takes precedence over any unknown constant seen in the pool.
        if flags.contains(AccessFlags::MODULE) {
            return Err(ClassFileError::NotAClass(format!(
                "{} is not a class because access_flag ACC_MODULE is set",
                self.options.requested_name.as_deref().unwrap_or("<unnamed>")
            )));
        }
        if let Some(tag) = summary.bad_constant {
            return Err(class_format_error!("Unknown constant tag {}", tag.value()));
        }

        checks::verify_class_flags(flags, version.major)?;
        Ok(flags)
    }

    fn parse_this_class(&self, pool: &ConstantPool, this_class: u16) -> Result<Symbol> {
        let name = pool.class_name_at(this_class)?.clone();
        if symbols::is_array_type(&name) {
            return Err(class_format_error!(
                ".this_class cannot be array nor primitive {}",
                name
            ));
        }

        if let Some(requested) = &self.options.requested_name {
            if !self.options.hidden && requested != name.as_str() {
                return Err(ClassFileError::NameMismatch {
                    expected: requested.clone(),
                    found: name.to_string(),
                });
            }
        }

        Ok(name)
    }

    fn parse_super_class(&mut self, cx: &ClassContext) -> Result<Option<Symbol>> {
        let index = self.stream.read_u16()?;
        let super_name = if index == 0 {
            if cx.name != JAVA_LANG_OBJECT {
                return Err(class_format_error!("Invalid superclass index 0"));
            }
            None
        } else {
            Some(cx.pool.class_name_at(index)?.clone())
        };

        if cx.is_interface() && super_name.as_deref() != Some(JAVA_LANG_OBJECT) {
            return Err(class_format_error!(
                "Interface {} must extend java.lang.Object",
                cx.name
            ));
        }

        Ok(super_name)
    }

    fn parse_interfaces(&mut self, cx: &ClassContext) -> Result<Vec<Symbol>> {
        let interfaces_count = self.stream.read_u16()?;
        let mut interfaces = Vec::with_capacity(interfaces_count as usize);
        let mut present = HashSet::with_capacity(interfaces_count as usize);

        for _ in 0..interfaces_count {
            let index = self.stream.read_u16()?;
            let interface = cx.pool.class_name_at(index)?;
            if symbols::is_array_type(interface) {
                return Err(class_format_error!(
                    "{} superinterfaces cannot contain arrays nor primitives",
                    cx.name
                ));
            }
            if !present.insert(interface) {
                return Err(class_format_error!(
                    "Duplicate interface name in classfile: {}",
                    interface
                ));
            }
            interfaces.push(interface.clone());
        }

        Ok(interfaces)
    }

    /// Reads `attribute_name_index` and `attribute_length`, returning the name, the length and
    /// the position of the first byte of `info`.
    fn read_attribute_header(&mut self, pool: &ConstantPool) -> Result<(Symbol, usize, usize)> {
        let name_index = self.stream.read_u16()?;
        let name = pool.utf8_at(name_index)?.clone();
        let size = self.stream.read_u32()? as usize;
        Ok((name, size, self.stream.position()))
    }

    fn read_raw_attribute(&mut self, name: Symbol, size: usize) -> Result<Attribute> {
        let info = self.stream.read_bytes(size)?.to_vec();
        Ok(Attribute::Raw(RawAttribute { name, info }))
    }

    fn check_attribute_length(&self, name: &str, reported: usize, start: usize) -> Result<()> {
        let parsed = self.stream.position() - start;
        if reported != parsed {
            return Err(ClassFileError::InvalidAttributeLength {
                name: name.to_owned(),
                reported,
                parsed,
            });
        }
        Ok(())
    }
}

fn symbol_error(e: SymbolError) -> ClassFileError {
    ClassFileError::ClassFormat(e.to_string())
}
