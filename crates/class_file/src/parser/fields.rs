use std::collections::HashSet;

use classcheck_symbols::{self as symbols, JavaKind, Symbol};

use super::{
    annotations::AnnotationLocation,
    common::{CommonAttributeParser, InfoType},
    symbol_error, ClassContext, Parser,
};
use crate::{
    attributes::{names, Attribute, Attributes},
    checks,
    class_file::{ClassVersion, FieldInfo},
    constant_pool::Tag,
    AccessFlags, ClassFileError, Result,
};

const JAVA_LANG_STRING: &str = "Ljava/lang/String;";

impl<'a> Parser<'a> {
    pub(super) fn parse_fields(&mut self, cx: &ClassContext) -> Result<Vec<FieldInfo>> {
        let fields_count = self.stream.read_u16()?;
        let mut fields: Vec<FieldInfo> = Vec::with_capacity(fields_count as usize);
        let mut present = HashSet::with_capacity(fields_count as usize);

        for _ in 0..fields_count {
            let field = self.parse_field(cx)?;
            if !present.insert((field.name.clone(), field.descriptor.clone())) {
                return Err(class_format_error!(
                    "Duplicate field name and signature: {} {}",
                    field.name,
                    field.descriptor
                ));
            }
            fields.push(field);
        }

        log::debug!("Read {} fields", fields.len());
        Ok(fields)
    }

    fn parse_field(&mut self, cx: &ClassContext) -> Result<FieldInfo> {
        let mut access_flags = AccessFlags::from_u16(self.stream.read_u16()?);
        let name_index = self.stream.read_u16()?;
        let descriptor_index = self.stream.read_u16()?;

        let name = cx.pool.utf8_at(name_index)?.clone();
        if self.options.validate {
            symbols::validate_field_name(&name).map_err(symbol_error)?;
        }
        checks::verify_field_flags(&name, access_flags, cx.is_interface())?;

        let descriptor = cx.pool.utf8_at(descriptor_index)?.clone();
        let kind = self.field_kind(&descriptor)?;

        let attributes_count = self.stream.read_u16()?;
        let mut attributes = Vec::with_capacity(attributes_count as usize);
        let mut common = CommonAttributeParser::new(InfoType::Field);
        let mut constant_value_index = None;

        for _ in 0..attributes_count {
            let (attribute_name, size, start) = self.read_attribute_header(cx.pool)?;

            let attribute = if access_flags.is_static() && attribute_name == names::CONSTANT_VALUE {
                if constant_value_index.is_some() {
                    return Err(class_format_error!("Duplicate ConstantValue attribute"));
                }
                let index = self.stream.read_u16()?;
                if index == 0 {
                    return Err(class_format_error!("Invalid ConstantValue index"));
                }
                constant_value_index = Some(index);
                Attribute::ConstantValue {
                    constant_value_index: index,
                }
            } else if attribute_name == names::SYNTHETIC {
                access_flags |= AccessFlags::SYNTHETIC;
                Attribute::Synthetic
            } else if cx.major_version() >= ClassVersion::JAVA_5 {
                if attribute_name == names::RUNTIME_VISIBLE_ANNOTATIONS {
                    let (attribute, flags) = self.parse_runtime_visible_annotations(
                        &mut common,
                        cx,
                        &attribute_name,
                        size,
                        AnnotationLocation::Field,
                    )?;
                    access_flags |= flags;
                    attribute
                } else {
                    match self.parse_common_attribute(&mut common, cx, &attribute_name, size)? {
                        Some(attribute) => attribute,
                        None => self.read_raw_attribute(attribute_name.clone(), size)?,
                    }
                }
            } else {
                self.read_raw_attribute(attribute_name.clone(), size)?
            };

            self.check_attribute_length(&attribute_name, size, start)?;
            attributes.push(attribute);
        }

        if kind == JavaKind::Void {
            return Err(class_format_error!("Fields cannot be of type void"));
        }

        if let Some(index) = constant_value_index {
            check_constant_value(&name, &descriptor, kind, cx.pool.tag_at(index))?;
        }

        Ok(FieldInfo {
            access_flags,
            name,
            descriptor,
            kind,
            attributes: Attributes(attributes),
        })
    }

    /// Kind of the field type. Descriptors are only checked when validating; an unparsable
    /// descriptor then counts as a reference.
    fn field_kind(&self, descriptor: &Symbol) -> Result<JavaKind> {
        let kind = symbols::field_descriptor_kind(descriptor, true);
        if self.options.validate {
            kind.map_err(symbol_error)
        } else {
            Ok(kind.unwrap_or(JavaKind::Object))
        }
    }
}

fn check_constant_value(name: &str, descriptor: &str, kind: JavaKind, tag: Tag) -> Result<()> {
    let valid = match kind {
        JavaKind::Float => tag == Tag::Float,
        JavaKind::Long => tag == Tag::Long,
        JavaKind::Double => tag == Tag::Double,
        JavaKind::Object => tag == Tag::String && descriptor == JAVA_LANG_STRING,
        JavaKind::Void => false,
        _ => tag == Tag::Integer,
    };

    if !valid {
        return Err(ClassFileError::InvalidConstantValue {
            field: name.to_owned(),
            reason: format!("{} does not match field type {}", tag, descriptor),
        });
    }
    Ok(())
}
