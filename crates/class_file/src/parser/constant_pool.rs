use classcheck_symbols as symbols;

use super::Parser;
use crate::{
    class_file::ClassVersion,
    constant_pool::{
        ClassInfo, CpInfo, DynamicInfo, MethodHandleInfo, MethodTypeInfo, NameAndTypeInfo,
        RefInfo, Tag,
    },
    ConstantPool, Result,
};

/// Facts gathered while reading the pool that later stages act on.
#[derive(Debug, Default)]
pub(super) struct PoolSummary {
    pub max_bootstrap_method_index: Option<u16>,
    /// First `CONSTANT_Module` or `CONSTANT_Package` entry, reported once the class flags
    /// have been read.
    pub bad_constant: Option<Tag>,
}

impl PoolSummary {
    fn update_max_bootstrap_method_index(&mut self, index: u16) {
        self.max_bootstrap_method_index = Some(match self.max_bootstrap_method_index {
            Some(max) => max.max(index),
            None => index,
        });
    }
}

impl<'a> Parser<'a> {
    pub(super) fn parse_constant_pool(
        &mut self,
        version: ClassVersion,
    ) -> Result<(ConstantPool, PoolSummary)> {
        let length = self.stream.read_u16()? as usize;
        if length < 1 {
            return Err(class_format_error!("Invalid constant pool size ({})", length));
        }

        let start = self.stream.position();
        let mut summary = PoolSummary::default();
        let mut cp_infos = Vec::with_capacity(length);
        cp_infos.push(CpInfo::Invalid);

        let mut i = 1;
        while i < length {
            let tag_byte = self.stream.read_u8()?;
            let tag = Tag::from_u8(tag_byte)
                .ok_or_else(|| invalid_constant!("Invalid constant pool entry tag at index {}", i))?;

            // Module and Package are reported after the class flags are known.
            if !tag.is_valid_for_version(version.major) && !matches!(tag, Tag::Module | Tag::Package)
            {
                return Err(invalid_constant!(
                    "Class file version does not support constant tag {} in class file",
                    tag_byte
                ));
            }

            let cp_info = match tag {
                Tag::Utf8 => {
                    let len = self.stream.read_u16()? as usize;
                    let bytes = self.stream.read_bytes(len)?;
                    match self.symbols.intern_modified_utf8(bytes) {
                        Ok(symbol) => CpInfo::Utf8(symbol),
                        Err(_) if symbols::is_modified_utf8(bytes) => {
                            log::debug!("Keeping undecodable UTF-8 constant {} as bytes", i);
                            CpInfo::RawUtf8(bytes.into())
                        }
                        Err(_) => {
                            return Err(invalid_constant!("Invalid modified UTF-8 index {}", i))
                        }
                    }
                }
                Tag::Integer => CpInfo::Integer(self.stream.read_i32()?),
                Tag::Float => CpInfo::Float(self.stream.read_f32()?),
                Tag::Long | Tag::Double => {
                    if i + 1 >= length {
                        let what = if tag == Tag::Long { "long" } else { "double" };
                        return Err(invalid_constant!("Invalid {} constant index {}", what, i));
                    }
                    if tag == Tag::Long {
                        CpInfo::Long(self.stream.read_i64()?)
                    } else {
                        CpInfo::Double(self.stream.read_f64()?)
                    }
                }
                Tag::Class => CpInfo::Class(ClassInfo {
                    name_index: self.stream.read_u16()?,
                }),
                Tag::String => {
                    let string_index = self.stream.read_u16()?;
                    if string_index == 0 || string_index as usize >= length {
                        return Err(invalid_constant!("Invalid String constant index {}", i));
                    }
                    CpInfo::String { string_index }
                }
                Tag::FieldRef => CpInfo::FieldRef(self.parse_ref_info()?),
                Tag::MethodRef => CpInfo::MethodRef(self.parse_ref_info()?),
                Tag::InterfaceMethodRef => CpInfo::InterfaceMethodRef(self.parse_ref_info()?),
                Tag::NameAndType => CpInfo::NameAndType(NameAndTypeInfo {
                    name_index: self.stream.read_u16()?,
                    descriptor_index: self.stream.read_u16()?,
                }),
                Tag::MethodHandle => CpInfo::MethodHandle(MethodHandleInfo {
                    reference_kind: self.stream.read_u8()?,
                    reference_index: self.stream.read_u16()?,
                }),
                Tag::MethodType => CpInfo::MethodType(MethodTypeInfo {
                    descriptor_index: self.stream.read_u16()?,
                }),
                Tag::Dynamic | Tag::InvokeDynamic => {
                    let info = DynamicInfo {
                        bootstrap_method_attr_index: self.stream.read_u16()?,
                        name_and_type_index: self.stream.read_u16()?,
                    };
                    summary.update_max_bootstrap_method_index(info.bootstrap_method_attr_index);
                    if tag == Tag::Dynamic {
                        CpInfo::Dynamic(info)
                    } else {
                        CpInfo::InvokeDynamic(info)
                    }
                }
                Tag::Module | Tag::Package => {
                    let name_index = self.stream.read_u16()?;
                    summary.bad_constant.get_or_insert(tag);
                    if tag == Tag::Module {
                        CpInfo::Module { name_index }
                    } else {
                        CpInfo::Package { name_index }
                    }
                }
                Tag::Invalid => {
                    return Err(invalid_constant!("Invalid constant pool entry tag at index {}", i))
                }
            };

            cp_infos.push(cp_info);
            if matches!(tag, Tag::Long | Tag::Double) {
                cp_infos.push(CpInfo::Invalid);
                i += 2;
            } else {
                i += 1;
            }
        }

        let raw = self.stream.consumed_since(start).to_vec();
        let constant_pool = ConstantPool::new(cp_infos, version, raw);
        log::debug!(
            "Read {} constant pool entries ({} bytes)",
            constant_pool.len(),
            constant_pool.raw_len()
        );

        if summary.bad_constant.is_none() && self.options.validate {
            constant_pool.validate()?;
        }

        Ok((constant_pool, summary))
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        Ok(RefInfo {
            class_index: self.stream.read_u16()?,
            name_and_type_index: self.stream.read_u16()?,
        })
    }
}
