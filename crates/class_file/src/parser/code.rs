use std::collections::{hash_map::Entry, HashMap};

use classcheck_symbols::{self as symbols, JavaKind, Symbol};

use super::{
    common::{CommonAttributeParser, InfoType},
    symbol_error, ClassContext, Parser,
};
use crate::{
    attributes::{
        names, Attribute, Attributes, CodeAttribute, ExceptionTableEntry, LineNumber, Local,
    },
    class_file::ClassVersion,
    Result,
};

const MAX_CODE_LENGTH: u32 = 0xFFFF;

impl<'a> Parser<'a> {
    pub(super) fn parse_code_attribute(&mut self, cx: &ClassContext) -> Result<CodeAttribute> {
        let max_stack = self.stream.read_u16()?;
        let max_locals = self.stream.read_u16()?;

        let code_length = self.stream.read_u32()?;
        if code_length == 0 {
            return Err(class_format_error!("code_length must be > than 0"));
        } else if code_length > MAX_CODE_LENGTH {
            return Err(class_format_error!("code_length > than 64 KB"));
        }
        let code = self.stream.read_bytes(code_length as usize)?.to_vec();
        let exception_table = self.parse_exception_table(cx)?;

        let attributes_count = self.stream.read_u16()?;
        let mut attributes = Vec::with_capacity(attributes_count as usize);
        let mut common = CommonAttributeParser::new(InfoType::Code);
        let mut has_local_variable_table = false;
        let mut has_stack_map_table = false;

        for _ in 0..attributes_count {
            let (attribute_name, size, start) = self.read_attribute_header(cx.pool)?;

            let attribute = if attribute_name == names::LINE_NUMBER_TABLE {
                self.parse_line_number_table()?
            } else if attribute_name == names::LOCAL_VARIABLE_TABLE {
                has_local_variable_table = true;
                let locals = self.parse_local_variable_table(cx, code_length, max_locals, false)?;
                Attribute::LocalVariableTable(locals)
            } else if attribute_name == names::LOCAL_VARIABLE_TYPE_TABLE {
                let locals = self.parse_local_variable_table(cx, code_length, max_locals, true)?;
                Attribute::LocalVariableTypeTable(locals)
            } else if attribute_name == names::STACK_MAP_TABLE {
                if has_stack_map_table {
                    return Err(class_format_error!("Duplicate StackMapTable attribute"));
                }
                has_stack_map_table = true;
                self.parse_stack_map_table(size)?
            } else {
                match self.parse_common_attribute(&mut common, cx, &attribute_name, size)? {
                    Some(attribute) => attribute,
                    None => self.read_raw_attribute(attribute_name.clone(), size)?,
                }
            };

            self.check_attribute_length(&attribute_name, size, start)?;
            attributes.push(attribute);
        }

        if self.options.validate
            && has_local_variable_table
            && cx.major_version() >= ClassVersion::JAVA_5
        {
            validate_local_tables(&attributes)?;
        }

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes: Attributes(attributes),
        })
    }

    fn parse_exception_table(&mut self, cx: &ClassContext) -> Result<Vec<ExceptionTableEntry>> {
        let exception_table_length = self.stream.read_u16()?;
        let mut exception_table = Vec::with_capacity(exception_table_length as usize);

        for _ in 0..exception_table_length {
            let start_pc = self.stream.read_u16()?;
            let end_pc = self.stream.read_u16()?;
            let handler_pc = self.stream.read_u16()?;
            let catch_type = self.stream.read_u16()?;
            let catch_type_name = match catch_type {
                0 => None,
                index => Some(cx.pool.class_name_at(index)?.clone()),
            };

            exception_table.push(ExceptionTableEntry {
                start_pc,
                end_pc,
                handler_pc,
                catch_type,
                catch_type_name,
            });
        }

        Ok(exception_table)
    }

    fn parse_line_number_table(&mut self) -> Result<Attribute> {
        let line_number_table_length = self.stream.read_u16()?;
        let mut line_numbers = Vec::with_capacity(line_number_table_length as usize);
        for _ in 0..line_number_table_length {
            line_numbers.push(LineNumber {
                start_pc: self.stream.read_u16()?,
                line_number: self.stream.read_u16()?,
            });
        }
        Ok(Attribute::LineNumberTable(line_numbers))
    }

    fn parse_local_variable_table(
        &mut self,
        cx: &ClassContext,
        code_length: u32,
        max_locals: u16,
        is_type_table: bool,
    ) -> Result<Vec<Local>> {
        let table_length = self.stream.read_u16()?;
        let mut locals = Vec::with_capacity(table_length as usize);

        for _ in 0..table_length {
            let start_pc = self.stream.read_u16()?;
            let length = self.stream.read_u16()?;
            let name_index = self.stream.read_u16()?;
            let descriptor_index = self.stream.read_u16()?;
            let slot = self.stream.read_u16()?;

            if start_pc as u32 >= code_length {
                return Err(class_format_error!(
                    "Invalid local variable table attribute entry: start_pc out of bounds: {}",
                    start_pc
                ));
            }
            let end = start_pc as u32 + length as u32;
            if end > code_length {
                return Err(class_format_error!(
                    "Invalid local variable table attribute entry: start_pc + length out of bounds: {}",
                    end
                ));
            }

            let name = cx.pool.utf8_at(name_index)?.clone();
            let descriptor = cx.pool.utf8_at(descriptor_index)?.clone();

            // Signatures in a type table say nothing about the width of the slot.
            let extra_slot = if is_type_table {
                0
            } else {
                match self.local_kind(&descriptor)? {
                    JavaKind::Long | JavaKind::Double => 1,
                    _ => 0,
                }
            };
            if slot as u32 + extra_slot >= max_locals as u32 {
                return Err(class_format_error!(
                    "Invalid local variable table attribute entry: index points to an invalid frame slot: {}",
                    slot
                ));
            }

            if self.options.validate {
                symbols::validate_field_name(&name).map_err(symbol_error)?;
            }

            locals.push(Local {
                name,
                descriptor,
                start_pc,
                length,
                slot,
            });
        }

        Ok(locals)
    }

    fn local_kind(&self, descriptor: &Symbol) -> Result<JavaKind> {
        let kind = symbols::field_descriptor_kind(descriptor, false);
        if self.options.validate {
            kind.map_err(symbol_error)
        } else {
            Ok(kind.unwrap_or(JavaKind::Object))
        }
    }

    fn parse_stack_map_table(&mut self, size: usize) -> Result<Attribute> {
        let frames = self.stream.read_bytes(size)?;
        if self.options.verifiable {
            Ok(Attribute::StackMapTable(frames.to_vec()))
        } else {
            Ok(Attribute::StackMapTable(Vec::new()))
        }
    }
}

/// Every `LocalVariableTypeTable` entry must describe a `LocalVariableTable` entry, and neither
/// table may describe the same variable twice.
fn validate_local_tables(attributes: &[Attribute]) -> Result<()> {
    let mut table: HashMap<(&Symbol, u16, u16, u16), bool> = HashMap::new();

    for attribute in attributes {
        if let Attribute::LocalVariableTable(locals) = attribute {
            for local in locals {
                if table.insert(local_key(local), false).is_some() {
                    return Err(class_format_error!(
                        "Duplicate local in local variable table: {}",
                        local.name
                    ));
                }
            }
        }
    }

    for attribute in attributes {
        if let Attribute::LocalVariableTypeTable(locals) = attribute {
            for local in locals {
                match table.entry(local_key(local)) {
                    Entry::Vacant(_) => {
                        return Err(class_format_error!(
                            "Local in local variable type table does not match any local variable table entry: {}",
                            local.name
                        ))
                    }
                    Entry::Occupied(mut entry) => {
                        if entry.insert(true) {
                            return Err(class_format_error!(
                                "Duplicate local in local variable type table: {}",
                                local.name
                            ));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn local_key(local: &Local) -> (&Symbol, u16, u16, u16) {
    (&local.name, local.slot, local.start_pc, local.length)
}
