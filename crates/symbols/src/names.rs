use crate::{descriptor, Result, SymbolError};

const ILLEGAL_UNQUALIFIED: &[char] = &['.', ';', '[', '/'];

/// JVMS §4.2.2: non-empty and free of `.`, `;`, `[` and `/`.
pub fn is_valid_unqualified_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(ILLEGAL_UNQUALIFIED)
}

/// Unqualified names that additionally may not contain `<` or `>`, except for the two
/// initializer names.
pub fn is_valid_method_name(name: &str) -> bool {
    if name == "<init>" || name == "<clinit>" {
        return true;
    }
    is_valid_unqualified_name(name) && !name.contains(&['<', '>'][..])
}

/// Binary names in internal form (`java/lang/Object`) or array descriptors (`[Ljava/lang/Object;`).
pub fn is_valid_class_name(name: &str) -> bool {
    if name.starts_with('[') {
        return descriptor::field_descriptor_kind(name, false).is_ok();
    }
    !name.is_empty() && name.split('/').all(is_valid_unqualified_name)
}

pub fn validate_field_name(name: &str) -> Result<()> {
    check(is_valid_unqualified_name(name), "field", name)
}

pub fn validate_method_name(name: &str) -> Result<()> {
    check(is_valid_method_name(name), "method", name)
}

pub fn validate_class_name(name: &str) -> Result<()> {
    check(is_valid_class_name(name), "class", name)
}

fn check(valid: bool, what: &'static str, name: &str) -> Result<()> {
    if valid {
        Ok(())
    } else {
        Err(SymbolError::InvalidName {
            what,
            name: name.to_owned(),
        })
    }
}
