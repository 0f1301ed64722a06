use classcheck_symbols::Symbol;

use super::{annotations::AnnotationLocation, ClassContext, Parser};
use crate::{
    attributes::{names, Attribute, RawAttribute},
    AccessFlags, Result,
};

bitflags::bitflags! {
    /// Attributes that may appear on more than one kind of structure.
    pub(super) struct CommonAttributes: u8 {
        const RUNTIME_VISIBLE_ANNOTATIONS = 0b0000_0001;
        const RUNTIME_INVISIBLE_ANNOTATIONS = 0b0000_0010;
        const RUNTIME_VISIBLE_TYPE_ANNOTATIONS = 0b0000_0100;
        const RUNTIME_INVISIBLE_TYPE_ANNOTATIONS = 0b0000_1000;
        const RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS = 0b0001_0000;
        const RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS = 0b0010_0000;
        const ANNOTATION_DEFAULT = 0b0100_0000;
        const SIGNATURE = 0b1000_0000;
    }
}

impl CommonAttributes {
    fn from_name(name: &str) -> Option<CommonAttributes> {
        Some(match name {
            names::RUNTIME_VISIBLE_ANNOTATIONS => CommonAttributes::RUNTIME_VISIBLE_ANNOTATIONS,
            names::RUNTIME_INVISIBLE_ANNOTATIONS => CommonAttributes::RUNTIME_INVISIBLE_ANNOTATIONS,
            names::RUNTIME_VISIBLE_TYPE_ANNOTATIONS => {
                CommonAttributes::RUNTIME_VISIBLE_TYPE_ANNOTATIONS
            }
            names::RUNTIME_INVISIBLE_TYPE_ANNOTATIONS => {
                CommonAttributes::RUNTIME_INVISIBLE_TYPE_ANNOTATIONS
            }
            names::RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS => {
                CommonAttributes::RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS
            }
            names::RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS => {
                CommonAttributes::RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS
            }
            names::ANNOTATION_DEFAULT => CommonAttributes::ANNOTATION_DEFAULT,
            names::SIGNATURE => CommonAttributes::SIGNATURE,
            _ => return None,
        })
    }
}

/// The structure an attribute list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum InfoType {
    Class,
    Method,
    Field,
    Code,
    Record,
}

impl InfoType {
    fn supported(self) -> CommonAttributes {
        let annotations = CommonAttributes::RUNTIME_VISIBLE_ANNOTATIONS
            | CommonAttributes::RUNTIME_INVISIBLE_ANNOTATIONS
            | CommonAttributes::RUNTIME_VISIBLE_TYPE_ANNOTATIONS
            | CommonAttributes::RUNTIME_INVISIBLE_TYPE_ANNOTATIONS
            | CommonAttributes::SIGNATURE;

        match self {
            InfoType::Class | InfoType::Field | InfoType::Record => annotations,
            InfoType::Method => CommonAttributes::all(),
            InfoType::Code => {
                CommonAttributes::RUNTIME_VISIBLE_TYPE_ANNOTATIONS
                    | CommonAttributes::RUNTIME_INVISIBLE_TYPE_ANNOTATIONS
                    | CommonAttributes::SIGNATURE
            }
        }
    }
}

/// Tracks the common attributes already seen in one attribute list.
pub(super) struct CommonAttributeParser {
    info_type: InfoType,
    seen: CommonAttributes,
}

impl CommonAttributeParser {
    pub fn new(info_type: InfoType) -> Self {
        Self {
            info_type,
            seen: CommonAttributes::empty(),
        }
    }

    fn mark_seen(&mut self, attribute: CommonAttributes, name: &str) -> Result<()> {
        if self.seen.contains(attribute) {
            return Err(class_format_error!("Duplicate {} attribute", name));
        }
        self.seen |= attribute;
        Ok(())
    }
}

impl<'a> Parser<'a> {
    /// Parses `name` if it is a common attribute supported by `common`'s structure, otherwise
    /// leaves the stream untouched and returns `None`.
    pub(super) fn parse_common_attribute(
        &mut self,
        common: &mut CommonAttributeParser,
        cx: &ClassContext,
        name: &Symbol,
        size: usize,
    ) -> Result<Option<Attribute>> {
        let attribute = match CommonAttributes::from_name(name) {
            Some(attribute) if common.info_type.supported().contains(attribute) => attribute,
            _ => return Ok(None),
        };

        if attribute == CommonAttributes::SIGNATURE {
            if self.options.java_version.java9_or_later() {
                common.mark_seen(attribute, name)?;
            } else {
                common.seen |= attribute;
            }
            if size != 2 {
                return Err(class_format_error!(
                    "Invalid attribute_length value for signature attribute: {} != 2",
                    size
                ));
            }
            let signature_index = self.stream.read_u16()?;
            cx.pool.utf8_at(signature_index)?;
            return Ok(Some(Attribute::Signature { signature_index }));
        }

        common.mark_seen(attribute, name)?;
        self.read_raw_attribute(name.clone(), size).map(Some)
    }

    /// Reads a `RuntimeVisibleAnnotations` attribute, returning it together with the access
    /// bits derived from VM-internal annotations.
    pub(super) fn parse_runtime_visible_annotations(
        &mut self,
        common: &mut CommonAttributeParser,
        cx: &ClassContext,
        name: &Symbol,
        size: usize,
        location: AnnotationLocation,
    ) -> Result<(Attribute, AccessFlags)> {
        common.mark_seen(CommonAttributes::RUNTIME_VISIBLE_ANNOTATIONS, name)?;

        let info = self.stream.read_bytes(size)?;
        let flags = if self.options.scan_vm_annotations() {
            super::annotations::vm_annotation_flags(info, cx.pool, location)?
        } else {
            AccessFlags::empty()
        };

        let attribute = Attribute::Raw(RawAttribute {
            name: name.clone(),
            info: info.to_vec(),
        });
        Ok((attribute, flags))
    }
}
