use crate::{names, Result, SymbolError};

const MAX_ARRAY_DIMENSIONS: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JavaKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Float,
    Long,
    Double,
    Object,
    Void,
}

impl JavaKind {
    pub fn from_primitive_char(c: u8) -> Option<JavaKind> {
        Some(match c {
            b'Z' => JavaKind::Boolean,
            b'B' => JavaKind::Byte,
            b'C' => JavaKind::Char,
            b'S' => JavaKind::Short,
            b'I' => JavaKind::Int,
            b'F' => JavaKind::Float,
            b'J' => JavaKind::Long,
            b'D' => JavaKind::Double,
            b'V' => JavaKind::Void,
            _ => return None,
        })
    }

    /// Kinds that live on the operand stack as an `int`.
    pub fn is_stack_int(self) -> bool {
        matches!(
            self,
            JavaKind::Boolean | JavaKind::Byte | JavaKind::Char | JavaKind::Short | JavaKind::Int
        )
    }

    pub fn is_primitive(self) -> bool {
        !matches!(self, JavaKind::Object)
    }

    pub fn slot_count(self) -> usize {
        match self {
            JavaKind::Long | JavaKind::Double => 2,
            JavaKind::Void => 0,
            _ => 1,
        }
    }
}

/// Parses the field type starting at `start`, returning its kind and the index just past it.
fn parse_field_type(bytes: &[u8], start: usize) -> Option<(JavaKind, usize)> {
    let mut i = start;
    while bytes.get(i) == Some(&b'[') {
        i += 1;
    }
    let dimensions = i - start;
    if dimensions > MAX_ARRAY_DIMENSIONS {
        return None;
    }

    let (kind, end) = match *bytes.get(i)? {
        b'L' => {
            let len = bytes[i + 1..].iter().position(|b| *b == b';')?;
            let class_name = std::str::from_utf8(&bytes[i + 1..i + 1 + len]).ok()?;
            if class_name.is_empty() || !class_name.split('/').all(names::is_valid_unqualified_name)
            {
                return None;
            }
            (JavaKind::Object, i + len + 2)
        }
        b'V' => return None,
        c => (JavaKind::from_primitive_char(c)?, i + 1),
    };

    if dimensions > 0 {
        Some((JavaKind::Object, end))
    } else {
        Some((kind, end))
    }
}

/// Validates a field descriptor and returns the kind it denotes.
pub fn field_descriptor_kind(descriptor: &str, allow_void: bool) -> Result<JavaKind> {
    if descriptor == "V" {
        return if allow_void {
            Ok(JavaKind::Void)
        } else {
            Err(invalid("field", descriptor))
        };
    }

    match parse_field_type(descriptor.as_bytes(), 0) {
        Some((kind, end)) if end == descriptor.len() => Ok(kind),
        _ => Err(invalid("field", descriptor)),
    }
}

/// Validates a method descriptor and returns the number of local slots its parameters occupy.
/// The receiver of instance methods is not included.
pub fn method_descriptor_slots(descriptor: &str) -> Result<usize> {
    let bytes = descriptor.as_bytes();
    if bytes.first() != Some(&b'(') {
        return Err(invalid("method", descriptor));
    }

    let mut slots = 0;
    let mut i = 1;
    loop {
        match bytes.get(i) {
            Some(b')') => break,
            Some(_) => {
                let (kind, end) =
                    parse_field_type(bytes, i).ok_or_else(|| invalid("method", descriptor))?;
                slots += kind.slot_count();
                i = end;
            }
            None => return Err(invalid("method", descriptor)),
        }
    }

    let return_type = &descriptor[i + 1..];
    field_descriptor_kind(return_type, true).map_err(|_| invalid("method", descriptor))?;

    Ok(slots)
}

pub fn returns_void(descriptor: &str) -> bool {
    descriptor.ends_with(")V")
}

pub fn is_array_type(descriptor: &str) -> bool {
    descriptor.starts_with('[')
}

fn invalid(what: &'static str, descriptor: &str) -> SymbolError {
    SymbolError::InvalidDescriptor {
        what,
        descriptor: descriptor.to_owned(),
    }
}

#[cfg(test)]
mod field_descriptor_tests {
    use super::*;

    #[test]
    fn it_should_parse_primitive_descriptors() {
        assert_eq!(Ok(JavaKind::Int), field_descriptor_kind("I", false));
        assert_eq!(Ok(JavaKind::Long), field_descriptor_kind("J", false));
        assert_eq!(Ok(JavaKind::Boolean), field_descriptor_kind("Z", false));
    }

    #[test]
    fn it_should_treat_arrays_and_classes_as_objects() {
        assert_eq!(
            Ok(JavaKind::Object),
            field_descriptor_kind("Ljava/lang/String;", false)
        );
        assert_eq!(Ok(JavaKind::Object), field_descriptor_kind("[J", false));
    }

    #[test]
    fn it_should_only_accept_void_when_allowed() {
        assert!(field_descriptor_kind("V", false).is_err());
        assert_eq!(Ok(JavaKind::Void), field_descriptor_kind("V", true));
        assert!(field_descriptor_kind("[V", true).is_err());
    }

    #[test]
    fn it_should_reject_trailing_characters() {
        assert!(field_descriptor_kind("II", false).is_err());
        assert!(field_descriptor_kind("Ljava/lang/String;I", false).is_err());
        assert!(field_descriptor_kind("Ljava/lang/String", false).is_err());
        assert!(field_descriptor_kind("L;", false).is_err());
    }

    #[test]
    fn it_should_limit_array_dimensions() {
        let ok = format!("{}I", "[".repeat(255));
        let too_deep = format!("{}I", "[".repeat(256));

        assert!(field_descriptor_kind(&ok, false).is_ok());
        assert!(field_descriptor_kind(&too_deep, false).is_err());
    }
}
