use crate::{stream::ClassfileStream, AccessFlags, ConstantPool, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum AnnotationLocation {
    Method,
    Field,
    Class,
}

/// Scans the contents of a `RuntimeVisibleAnnotations` attribute for annotations the VM gives
/// a meaning to.
pub(super) fn vm_annotation_flags(
    info: &[u8],
    pool: &ConstantPool,
    location: AnnotationLocation,
) -> Result<AccessFlags> {
    let mut stream = ClassfileStream::new(info);
    let mut flags = AccessFlags::empty();

    let num_annotations = stream.read_u16()?;
    for _ in 0..num_annotations {
        let type_index = parse_annotation(&mut stream)?;
        let annotation_type = pool.utf8_at(type_index)?;
        flags |= match location {
            AnnotationLocation::Method => method_annotation_flag(annotation_type),
            AnnotationLocation::Field => field_annotation_flag(annotation_type),
            AnnotationLocation::Class => class_annotation_flag(annotation_type),
        };
    }

    Ok(flags)
}

fn method_annotation_flag(annotation_type: &str) -> AccessFlags {
    match annotation_type {
        "Ljava/lang/invoke/LambdaForm$Compiled;" => AccessFlags::LAMBDA_FORM_COMPILED,
        "Ljava/lang/invoke/LambdaForm$Hidden;" | "Ljdk/internal/vm/annotation/Hidden;" => {
            AccessFlags::HIDDEN
        }
        "Lsun/reflect/CallerSensitive;" | "Ljdk/internal/reflect/CallerSensitive;" => {
            AccessFlags::CALLER_SENSITIVE
        }
        "Ljava/lang/invoke/ForceInline;" | "Ljdk/internal/vm/annotation/ForceInline;" => {
            AccessFlags::FORCE_INLINE
        }
        "Ljava/lang/invoke/DontInline;" | "Ljdk/internal/vm/annotation/DontInline;" => {
            AccessFlags::DONT_INLINE
        }
        "Ljdk/internal/misc/ScopedMemoryAccess$Scoped;" => AccessFlags::SCOPED,
        _ => AccessFlags::empty(),
    }
}

fn field_annotation_flag(annotation_type: &str) -> AccessFlags {
    match annotation_type {
        "Ljdk/internal/vm/annotation/Stable;" => AccessFlags::STABLE,
        _ => AccessFlags::empty(),
    }
}

fn class_annotation_flag(annotation_type: &str) -> AccessFlags {
    match annotation_type {
        "Ljdk/internal/ValueBased;" => AccessFlags::VALUE_BASED,
        _ => AccessFlags::empty(),
    }
}

/// Element values still to be skipped at one nesting level.
enum Pending {
    /// Values of an array element value.
    Values(u16),
    /// Name and value pairs of an annotation.
    Pairs(u16),
}

/// Skips one `annotation` structure and returns its `type_index`.
///
/// Nested levels are kept on the heap, so crafted nesting cannot exhaust the thread stack.
fn parse_annotation(stream: &mut ClassfileStream) -> Result<u16> {
    let type_index = stream.read_u16()?;
    let mut pending = vec![Pending::Pairs(stream.read_u16()?)];

    while let Some(level) = pending.last_mut() {
        match level {
            Pending::Values(0) | Pending::Pairs(0) => {
                pending.pop();
                continue;
            }
            Pending::Values(remaining) => *remaining -= 1,
            Pending::Pairs(remaining) => {
                *remaining -= 1;
                let _element_name_index = stream.read_u16()?;
            }
        }
        if let Some(nested) = skip_element_value(stream)? {
            pending.push(nested);
        }
    }

    Ok(type_index)
}

/// Skips the fixed part of one `element_value` and returns the level it opens, if any.
fn skip_element_value(stream: &mut ClassfileStream) -> Result<Option<Pending>> {
    let tag = stream.read_u8()?;
    match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => {
            let _const_value_index = stream.read_u16()?;
        }
        b'e' => {
            let _type_name_index = stream.read_u16()?;
            let _const_name_index = stream.read_u16()?;
        }
        b'c' => {
            let _class_info_index = stream.read_u16()?;
        }
        b'@' => {
            let _type_index = stream.read_u16()?;
            return Ok(Some(Pending::Pairs(stream.read_u16()?)));
        }
        b'[' => return Ok(Some(Pending::Values(stream.read_u16()?))),
        _ => {
            return Err(class_format_error!(
                "Invalid annotation tag: {}",
                tag as char
            ))
        }
    }
    Ok(None)
}
