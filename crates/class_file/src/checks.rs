//! Format rules that do not need the byte stream: version acceptance, flag legality and the
//! `InnerClasses` outer-class graph.

use classcheck_symbols::Symbol;

use crate::{
    attributes::InnerClassEntry, class_file::ClassVersion, options::JavaVersion, AccessFlags,
    ClassFileError, ConstantPool, Result,
};

/// Accepts `major.minor` if the rule set of the target runtime allows it.
pub fn verify_version(
    java_version: JavaVersion,
    preview_enabled: bool,
    major: u16,
    minor: u16,
) -> Result<()> {
    let max_major = java_version.class_file_version();
    let supported = if java_version.java8_or_earlier() {
        legacy_version_supported(max_major, major, minor)
    } else if java_version.java11_or_earlier() {
        mid_version_supported(max_major, major, minor)
    } else {
        modern_version_supported(max_major, major, minor, preview_enabled)
    };

    if supported {
        Ok(())
    } else {
        Err(ClassFileError::UnsupportedVersion { major, minor })
    }
}

fn legacy_version_supported(max_major: u16, major: u16, minor: u16) -> bool {
    (major == max_major && minor <= ClassVersion::MAX_SUPPORTED_MINOR)
        || (major >= ClassVersion::MIN_SUPPORTED_MAJOR && major < max_major)
}

fn mid_version_supported(max_major: u16, major: u16, minor: u16) -> bool {
    (major == max_major
        && (minor <= ClassVersion::MAX_SUPPORTED_MINOR || minor == ClassVersion::PREVIEW_MINOR))
        || (major < max_major && major > ClassVersion::MIN_SUPPORTED_MAJOR && minor == 0)
        || major == ClassVersion::MIN_SUPPORTED_MAJOR
}

fn modern_version_supported(max_major: u16, major: u16, minor: u16, preview_enabled: bool) -> bool {
    (major >= ClassVersion::JAVA_12 && major <= max_major && minor == 0)
        || (major >= ClassVersion::MIN_SUPPORTED_MAJOR && major < ClassVersion::JAVA_12)
        || (major == max_major && minor == ClassVersion::PREVIEW_MINOR && preview_enabled)
}

pub fn verify_class_flags(flags: AccessFlags, major_version: u16) -> Result<()> {
    let is_interface = flags.is_interface();
    let is_abstract = flags.is_abstract();
    let major_gte_5 = major_version >= ClassVersion::JAVA_5;

    let invalid = (is_abstract && flags.is_final())
        || (is_interface && !is_abstract)
        || (is_interface
            && major_gte_5
            && flags.intersects(AccessFlags::SUPER | AccessFlags::ENUM))
        || (!is_interface && major_gte_5 && flags.contains(AccessFlags::ANNOTATION));

    if invalid {
        return Err(class_format_error!(
            "Invalid class flags 0x{:x}",
            flags.bits()
        ));
    }
    Ok(())
}

pub fn verify_field_flags(name: &str, flags: AccessFlags, is_interface: bool) -> Result<()> {
    let valid = if is_interface {
        flags - AccessFlags::SYNTHETIC
            == AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL
    } else {
        flags.at_most_one_of(AccessFlags::VISIBILITY)
            && !flags.contains(AccessFlags::FINAL | AccessFlags::VOLATILE)
    };

    if !valid {
        return Err(class_format_error!(
            "{}: invalid field flags 0x{:x}",
            name,
            flags.bits()
        ));
    }
    Ok(())
}

/// Method flag rules of JVMS §4.6. `<clinit>` flags are ignored apart from `ACC_STRICT`.
pub fn verify_method_flags(
    flags: AccessFlags,
    is_interface: bool,
    is_init: bool,
    is_clinit: bool,
    major_version: u16,
) -> Result<()> {
    if is_clinit {
        return Ok(());
    }

    let mut valid = true;
    if flags.is_abstract() {
        valid &= !flags.intersects(
            AccessFlags::PRIVATE | AccessFlags::STATIC | AccessFlags::FINAL | AccessFlags::NATIVE,
        );
        if major_version >= ClassVersion::JAVA_5 {
            valid &= !flags.intersects(AccessFlags::SYNCHRONIZED | AccessFlags::STRICT);
        }
    }

    if valid {
        if !is_interface {
            valid &= flags.at_most_one_of(AccessFlags::VISIBILITY);
        } else {
            valid &= !flags.intersects(
                AccessFlags::PROTECTED
                    | AccessFlags::FINAL
                    | AccessFlags::SYNCHRONIZED
                    | AccessFlags::NATIVE,
            );
            if major_version < ClassVersion::JAVA_8 {
                valid &= flags.contains(AccessFlags::PUBLIC | AccessFlags::ABSTRACT)
                    && !flags.contains(AccessFlags::PRIVATE);
            } else {
                let public_or_private = flags & (AccessFlags::PUBLIC | AccessFlags::PRIVATE);
                valid &= public_or_private.bits().count_ones() == 1;
            }
        }
    }

    if valid && is_init {
        let allowed = AccessFlags::VISIBILITY
            | AccessFlags::VARARGS
            | AccessFlags::STRICT
            | AccessFlags::SYNTHETIC;
        valid &= (flags & AccessFlags::RECOGNIZED_METHOD_MODIFIERS - allowed).is_empty();
    }

    if !valid {
        return Err(class_format_error!(
            "Invalid method flags 0x{:x}",
            flags.bits()
        ));
    }
    Ok(())
}

/// Position of the entry whose inner class is named `inner_class_name`. Entries are compared by
/// name since one class may be referenced through several pool indices.
pub fn find_inner_class_index_entry(
    entries: &[InnerClassEntry],
    pool: &ConstantPool,
    inner_class_name: &Symbol,
) -> Option<usize> {
    entries.iter().position(|entry| {
        entry.inner_class_index != 0
            && pool
                .class_name_at(entry.inner_class_index)
                .map_or(false, |name| name == inner_class_name)
    })
}

/// Follows every outer-class chain, colouring visited entries with the number of the walk that
/// reached them first. Meeting the current colour again means a cycle.
pub fn has_inner_class_cycles(entries: &[InnerClassEntry], pool: &ConstantPool) -> bool {
    let mut cur_mark = 0;
    let mut mark = vec![0usize; entries.len()];

    for i in 0..entries.len() {
        if mark[i] != 0 {
            continue;
        }
        cur_mark += 1;
        mark[i] = cur_mark;

        let mut outer = entries[i].outer_class_index;
        while outer != 0 {
            let Ok(outer_name) = pool.class_name_at(outer) else {
                break;
            };
            let Some(index) = find_inner_class_index_entry(entries, pool, outer_name) else {
                break;
            };
            if mark[index] == cur_mark {
                return true;
            }
            if mark[index] != 0 {
                break;
            }
            mark[index] = cur_mark;
            outer = entries[index].outer_class_index;
        }
    }

    false
}
