use std::collections::HashSet;

use classcheck_symbols as symbols;

use super::{
    annotations::AnnotationLocation,
    common::{CommonAttributeParser, InfoType},
    symbol_error, ClassContext, Parser, JAVA_LANG_OBJECT,
};
use crate::{
    attributes::{names, Attribute, Attributes, MethodParameter},
    checks,
    class_file::{ClassVersion, MethodInfo},
    constant_pool::Tag,
    AccessFlags, ClassFileError, Result,
};

const MAX_ARGUMENT_SLOTS: usize = 255;

impl<'a> Parser<'a> {
    pub(super) fn parse_methods(&mut self, cx: &mut ClassContext) -> Result<Vec<MethodInfo>> {
        let methods_count = self.stream.read_u16()?;
        let mut methods: Vec<MethodInfo> = Vec::with_capacity(methods_count as usize);
        let mut present = HashSet::with_capacity(methods_count as usize);

        for _ in 0..methods_count {
            let method = self.parse_method(cx)?;
            if !present.insert((method.name.clone(), method.descriptor.clone())) {
                return Err(class_format_error!(
                    "Duplicate method name and signature: {} {}",
                    method.name,
                    method.descriptor
                ));
            }
            methods.push(method);
        }

        log::debug!("Read {} methods", methods.len());
        Ok(methods)
    }

    fn parse_method(&mut self, cx: &mut ClassContext) -> Result<MethodInfo> {
        let declared_flags = AccessFlags::from_u16(self.stream.read_u16()?);
        let name_index = self.stream.read_u16()?;
        let descriptor_index = self.stream.read_u16()?;

        let name = cx.pool.utf8_at(name_index)?.clone();
        if self.options.validate {
            symbols::validate_method_name(&name).map_err(symbol_error)?;
        }

        let mut access_flags = declared_flags;
        let is_clinit = name == "<clinit>";
        let is_init = name == "<init>";
        if is_clinit {
            // Only ACC_STRICT is meaningful on a class initializer.
            if cx.major_version() < ClassVersion::JAVA_7 {
                access_flags = AccessFlags::STATIC;
            } else if access_flags.is_static() {
                access_flags &= AccessFlags::STRICT | AccessFlags::STATIC;
            } else if self.options.java_version.java9_or_later() {
                return Err(ClassFileError::MethodNotStatic);
            }
        } else if is_init && cx.is_interface() {
            return Err(class_format_error!(
                "Method <init> is not valid in an interface."
            ));
        }

        checks::verify_method_flags(
            access_flags,
            cx.is_interface(),
            is_init,
            is_clinit,
            cx.major_version(),
        )?;

        let descriptor = cx.pool.utf8_at(descriptor_index)?.clone();
        let slots = symbols::method_descriptor_slots(&descriptor).map_err(symbol_error)?;

        if (is_init || is_clinit) && !symbols::returns_void(&descriptor) {
            return Err(class_format_error!(
                "Invalid <init>/<clinit> signature, expected void return type: {}",
                descriptor
            ));
        }
        if is_clinit && cx.major_version() >= ClassVersion::JAVA_7 && descriptor != "()V" {
            return Err(class_format_error!(
                "Method <clinit> has invalid signature: {}",
                descriptor
            ));
        }

        let receiver = if declared_flags.is_static() { 0 } else { 1 };
        if slots + receiver > MAX_ARGUMENT_SLOTS {
            return Err(class_format_error!(
                "Too many arguments in method signature: {}",
                descriptor
            ));
        }

        if name == "finalize"
            && descriptor == "()V"
            && !access_flags.is_static()
            && cx.name != JAVA_LANG_OBJECT
        {
            cx.flags |= AccessFlags::FINALIZER;
        }

        let attributes_count = self.stream.read_u16()?;
        let mut attributes = Vec::with_capacity(attributes_count as usize);
        let mut common = CommonAttributeParser::new(InfoType::Method);
        let mut has_code = false;
        let mut has_exceptions = false;
        let mut has_method_parameters = false;

        for _ in 0..attributes_count {
            let (attribute_name, size, start) = self.read_attribute_header(cx.pool)?;

            let attribute = if attribute_name == names::CODE {
                if has_code {
                    return Err(class_format_error!("Duplicate Code attribute"));
                }
                has_code = true;
                Attribute::Code(self.parse_code_attribute(cx)?)
            } else if attribute_name == names::EXCEPTIONS {
                if has_exceptions {
                    return Err(class_format_error!("Duplicate Exceptions attribute"));
                }
                has_exceptions = true;
                self.parse_exceptions(cx)?
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
                        AnnotationLocation::Method,
                    )?;
                    access_flags |= flags;
                    attribute
                } else if attribute_name == names::METHOD_PARAMETERS {
                    if has_method_parameters {
                        return Err(class_format_error!("Duplicate MethodParameters attribute"));
                    }
                    has_method_parameters = true;
                    self.parse_method_parameters()?
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

        if access_flags.is_abstract() || access_flags.is_native() {
            if has_code {
                return Err(class_format_error!(
                    "Code attribute supplied for native or abstract method"
                ));
            }
        } else if !has_code {
            return Err(class_format_error!("Missing Code attribute"));
        }

        if self.options.hidden {
            access_flags |= AccessFlags::HIDDEN;
        }

        Ok(MethodInfo {
            access_flags,
            name,
            descriptor,
            attributes: Attributes(attributes),
        })
    }

    fn parse_exceptions(&mut self, cx: &ClassContext) -> Result<Attribute> {
        let number_of_exceptions = self.stream.read_u16()?;
        let mut exceptions = Vec::with_capacity(number_of_exceptions as usize);

        for _ in 0..number_of_exceptions {
            let index = self.stream.read_u16()?;
            if index as usize >= cx.pool.len() {
                return Err(class_format_error!(
                    "Invalid exception_index_table: out of bounds."
                ));
            }
            if index == 0 {
                return Err(class_format_error!("Invalid exception_index_table: 0."));
            }
            if cx.pool.tag_at(index) != Tag::Class {
                return Err(class_format_error!(
                    "Invalid exception_index_table: not a CONSTANT_Class_info structure."
                ));
            }
            exceptions.push(index);
        }

        Ok(Attribute::Exceptions(exceptions))
    }

    fn parse_method_parameters(&mut self) -> Result<Attribute> {
        let parameters_count = self.stream.read_u8()?;
        let mut parameters = Vec::with_capacity(parameters_count as usize);
        for _ in 0..parameters_count {
            parameters.push(MethodParameter {
                name_index: self.stream.read_u16()?,
                access_flags: AccessFlags::from_u16(self.stream.read_u16()?),
            });
        }

        Ok(Attribute::MethodParameters(parameters))
    }
}
