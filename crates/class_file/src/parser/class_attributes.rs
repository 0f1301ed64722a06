use classcheck_symbols as symbols;

use super::{
    annotations::AnnotationLocation,
    common::{CommonAttributeParser, InfoType},
    symbol_error, ClassContext, Parser,
};
use crate::{
    attributes::{names, Attribute, Attributes, BootstrapMethod, InnerClassEntry, RecordComponent},
    checks,
    class_file::ClassVersion,
    constant_pool::Tag,
    AccessFlags, Result,
};

/// Which of the single-occurrence class attributes have been read.
#[derive(Default)]
struct Seen {
    source_file: bool,
    source_debug_extension: bool,
    inner_classes: bool,
    bootstrap_methods: bool,
    enclosing_method: bool,
    nest_host: bool,
    nest_members: bool,
    record: bool,
    permitted_subclasses: bool,
}

fn mark(seen: &mut bool, name: &str) -> Result<()> {
    if *seen {
        return Err(class_format_error!("Duplicate {} attribute", name));
    }
    *seen = true;
    Ok(())
}

impl<'a> Parser<'a> {
    pub(super) fn parse_class_attributes(&mut self, cx: &mut ClassContext) -> Result<Attributes> {
        let attributes_count = self.stream.read_u16()?;
        let mut attributes = Vec::with_capacity(attributes_count as usize);
        let mut common = CommonAttributeParser::new(InfoType::Class);
        let mut seen = Seen::default();
        let major = cx.major_version();

        for _ in 0..attributes_count {
            let (attribute_name, size, start) = self.read_attribute_header(cx.pool)?;

            let attribute = if attribute_name == names::SOURCE_FILE {
                mark(&mut seen.source_file, &attribute_name)?;
                Attribute::SourceFile {
                    source_file_index: self.stream.read_u16()?,
                }
            } else if attribute_name == names::SOURCE_DEBUG_EXTENSION {
                mark(&mut seen.source_debug_extension, &attribute_name)?;
                let bytes = self.stream.read_bytes(size)?;
                // Undecodable debug extensions are dropped, not rejected.
                let extension = cesu8::from_java_cesu8(bytes).ok().map(|s| s.into_owned());
                Attribute::SourceDebugExtension(extension)
            } else if attribute_name == names::SYNTHETIC {
                cx.flags |= AccessFlags::SYNTHETIC;
                Attribute::Synthetic
            } else if attribute_name == names::INNER_CLASSES {
                mark(&mut seen.inner_classes, &attribute_name)?;
                Attribute::InnerClasses(self.parse_inner_classes(cx)?)
            } else if major < ClassVersion::JAVA_5 {
                self.read_raw_attribute(attribute_name.clone(), size)?
            } else if major >= ClassVersion::JAVA_7 && attribute_name == names::BOOTSTRAP_METHODS {
                mark(&mut seen.bootstrap_methods, &attribute_name)?;
                Attribute::BootstrapMethods(self.parse_bootstrap_methods(cx)?)
            } else if attribute_name == names::ENCLOSING_METHOD {
                mark(&mut seen.enclosing_method, &attribute_name)?;
                Attribute::EnclosingMethod {
                    class_index: self.stream.read_u16()?,
                    method_index: self.stream.read_u16()?,
                }
            } else if major >= ClassVersion::JAVA_11 && attribute_name == names::NEST_HOST {
                mark(&mut seen.nest_host, &attribute_name)?;
                if seen.nest_members {
                    return Err(both_nest_attributes());
                }
                if size != 2 {
                    return Err(class_format_error!("Attribute length of NestHost must be 2"));
                }
                let host_class_index = self.stream.read_u16()?;
                cx.pool.validate_constant_at(host_class_index, Tag::Class)?;
                Attribute::NestHost { host_class_index }
            } else if major >= ClassVersion::JAVA_11 && attribute_name == names::NEST_MEMBERS {
                mark(&mut seen.nest_members, &attribute_name)?;
                if seen.nest_host {
                    return Err(both_nest_attributes());
                }
                Attribute::NestMembers(self.parse_class_list(cx)?)
            } else if major >= ClassVersion::JAVA_14 && attribute_name == names::RECORD {
                mark(&mut seen.record, &attribute_name)?;
                Attribute::Record(self.parse_record(cx)?)
            } else if major >= ClassVersion::JAVA_17
                && attribute_name == names::PERMITTED_SUBCLASSES
            {
                mark(&mut seen.permitted_subclasses, &attribute_name)?;
                if cx.flags.is_final() {
                    return Err(class_format_error!(
                        "A final class may not declare a permitted subclasses attribute."
                    ));
                }
                Attribute::PermittedSubclasses(self.parse_class_list(cx)?)
            } else if attribute_name == names::RUNTIME_VISIBLE_ANNOTATIONS {
                let (attribute, flags) = self.parse_runtime_visible_annotations(
                    &mut common,
                    cx,
                    &attribute_name,
                    size,
                    AnnotationLocation::Class,
                )?;
                cx.flags |= flags;
                attribute
            } else {
                match self.parse_common_attribute(&mut common, cx, &attribute_name, size)? {
                    Some(attribute) => attribute,
                    None => self.read_raw_attribute(attribute_name.clone(), size)?,
                }
            };

            self.check_attribute_length(&attribute_name, size, start)?;
            attributes.push(attribute);
        }

        if cx.max_bootstrap_method_index.is_some() && !seen.bootstrap_methods {
            return Err(class_format_error!("BootstrapMethods attribute is missing"));
        }

        Ok(Attributes(attributes))
    }

    fn parse_inner_classes(&mut self, cx: &ClassContext) -> Result<Vec<InnerClassEntry>> {
        let number_of_classes = self.stream.read_u16()?;
        let mut entries: Vec<InnerClassEntry> = Vec::with_capacity(number_of_classes as usize);
        let mut duplicate_inner_class = false;

        for _ in 0..number_of_classes {
            let entry = self.parse_inner_class_entry(cx)?;

            if self.options.strict_java_compliance
                && cx.major_version() >= ClassVersion::JAVA_7
                && entry.inner_name_index == 0
                && entry.outer_class_index != 0
            {
                return Err(class_format_error!(
                    "InnerClasses attribute: outer_class_info_index must be zero if inner_name_index is zero."
                ));
            }
            if entry.inner_class_index == entry.outer_class_index {
                return Err(class_format_error!("Class is both outer and inner class"));
            }

            let inner_class_name = match entry.inner_class_index {
                0 => None,
                index => Some(cx.pool.class_name_at(index)?),
            };
            for other in &entries {
                if entry.inner_class_index == other.inner_class_index
                    && entry.outer_class_index == other.outer_class_index
                {
                    return Err(class_format_error!("Duplicate entry in InnerClasses attribute"));
                }
                // One class may be reachable through several pool indices.
                let same_name = other.inner_class_index != 0
                    && inner_class_name.map_or(false, |name| {
                        cx.pool
                            .class_name_at(other.inner_class_index)
                            .map_or(false, |other_name| other_name == name)
                    });
                if entry.inner_class_index == other.inner_class_index || same_name {
                    duplicate_inner_class = true;
                }
            }

            entries.push(entry);
        }

        if duplicate_inner_class {
            log::warn!(
                "Duplicate inner_class_info_index (class names) in InnerClasses attribute, in class {}",
                cx.name
            );
            return Ok(Vec::new());
        }
        if checks::has_inner_class_cycles(&entries, cx.pool) {
            log::warn!("Cycle detected in InnerClasses attribute, in class {}", cx.name);
            return Ok(Vec::new());
        }

        Ok(entries)
    }

    fn parse_inner_class_entry(&mut self, cx: &ClassContext) -> Result<InnerClassEntry> {
        let inner_class_index = self.stream.read_u16()?;
        let outer_class_index = self.stream.read_u16()?;
        let inner_name_index = self.stream.read_u16()?;
        let mut access_flags = AccessFlags::from_u16(self.stream.read_u16()?);

        if access_flags.is_interface() && cx.major_version() < ClassVersion::JAVA_6 {
            access_flags |= AccessFlags::ABSTRACT;
        }

        if inner_class_index != 0 || self.options.java_version.java9_or_later() {
            cx.pool.validate_constant_at(inner_class_index, Tag::Class)?;
        }
        if outer_class_index != 0 {
            cx.pool.validate_constant_at(outer_class_index, Tag::Class)?;
        }
        // Only the tag is checked: some build tools emit an empty simple name.
        if inner_name_index != 0 {
            cx.pool.validate_constant_at(inner_name_index, Tag::Utf8)?;
        }

        Ok(InnerClassEntry {
            inner_class_index,
            outer_class_index,
            inner_name_index,
            access_flags,
        })
    }

    fn parse_bootstrap_methods(&mut self, cx: &ClassContext) -> Result<Vec<BootstrapMethod>> {
        let num_bootstrap_methods = self.stream.read_u16()?;
        if let Some(max_index) = cx.max_bootstrap_method_index {
            if max_index >= num_bootstrap_methods {
                return Err(class_format_error!(
                    "Invalid bootstrapMethod index: {}, actual bootstrap methods size: {}",
                    max_index,
                    num_bootstrap_methods
                ));
            }
        }

        let mut bootstrap_methods = Vec::with_capacity(num_bootstrap_methods as usize);
        for _ in 0..num_bootstrap_methods {
            let method_ref = self.stream.read_u16()?;
            if method_ref == 0 {
                return Err(class_format_error!("Invalid bootstrapMethodRefIndex: 0"));
            }
            if method_ref as usize >= cx.pool.len() {
                return Err(class_format_error!(
                    "Invalid bootstrapMethodRefIndex: out of bounds."
                ));
            }
            if cx.pool.tag_at(method_ref) != Tag::MethodHandle {
                return Err(class_format_error!(
                    "Invalid bootstrapMethodRefIndex: not a CONSTANT_MethodHandle_info structure."
                ));
            }

            let num_bootstrap_arguments = self.stream.read_u16()?;
            let mut arguments = Vec::with_capacity(num_bootstrap_arguments as usize);
            for _ in 0..num_bootstrap_arguments {
                let index = self.stream.read_u16()?;
                if !cx.pool.tag_at(index).is_loadable() {
                    return Err(class_format_error!(
                        "Invalid constant pool constant for BootstrapMethods attribute: {} is not loadable",
                        cx.pool.tag_at(index)
                    ));
                }
                arguments.push(index);
            }

            bootstrap_methods.push(BootstrapMethod {
                method_ref,
                arguments,
            });
        }

        log::debug!("Read {} bootstrap methods", bootstrap_methods.len());
        Ok(bootstrap_methods)
    }

    /// A `u2` count followed by that many `CONSTANT_Class` indices.
    fn parse_class_list(&mut self, cx: &ClassContext) -> Result<Vec<u16>> {
        let number_of_classes = self.stream.read_u16()?;
        let mut classes = Vec::with_capacity(number_of_classes as usize);
        for _ in 0..number_of_classes {
            let index = self.stream.read_u16()?;
            cx.pool.validate_constant_at(index, Tag::Class)?;
            classes.push(index);
        }
        Ok(classes)
    }

    fn parse_record(&mut self, cx: &ClassContext) -> Result<Vec<RecordComponent>> {
        let components_count = self.stream.read_u16()?;
        let mut components = Vec::with_capacity(components_count as usize);

        for _ in 0..components_count {
            let name = cx.pool.utf8_at(self.stream.read_u16()?)?.clone();
            let descriptor = cx.pool.utf8_at(self.stream.read_u16()?)?.clone();
            if self.options.validate {
                symbols::field_descriptor_kind(&descriptor, false).map_err(symbol_error)?;
            }

            let attributes_count = self.stream.read_u16()?;
            let mut attributes = Vec::with_capacity(attributes_count as usize);
            let mut common = CommonAttributeParser::new(InfoType::Record);
            for _ in 0..attributes_count {
                let (attribute_name, size, start) = self.read_attribute_header(cx.pool)?;
                let attribute =
                    match self.parse_common_attribute(&mut common, cx, &attribute_name, size)? {
                        Some(attribute) => attribute,
                        None => self.read_raw_attribute(attribute_name.clone(), size)?,
                    };
                self.check_attribute_length(&attribute_name, size, start)?;
                attributes.push(attribute);
            }

            components.push(RecordComponent {
                name,
                descriptor,
                attributes: Attributes(attributes),
            });
        }

        Ok(components)
    }
}

fn both_nest_attributes() -> crate::ClassFileError {
    class_format_error!("Classfile cannot have both a nest members and a nest host attribute.")
}
