use std::{borrow::Borrow, fmt, ops::Deref, sync::Arc};

use dashmap::DashMap;

use crate::{Result, SymbolError};

/// An interned string.
///
/// Symbols handed out by the same [`SymbolTable`] share their backing storage, so cloning one is
/// a reference count bump. Equality and hashing are by content.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if both symbols point at the same interned storage.
    pub fn ptr_eq(&self, other: &Symbol) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Symbol {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deduplicating symbol store. Safe to share between threads parsing different classes.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: DashMap<Arc<str>, ()>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, s: &str) -> Symbol {
        if let Some(existing) = self.symbols.get(s) {
            return Symbol(existing.key().clone());
        }

        let interned = self.symbols.entry(Arc::from(s)).or_insert(()).key().clone();
        Symbol(interned)
    }

    /// Decodes a modified UTF-8 byte sequence (JVMS §4.4.7) and interns the result.
    pub fn intern_modified_utf8(&self, bytes: &[u8]) -> Result<Symbol> {
        let decoded =
            cesu8::from_java_cesu8(bytes).map_err(|_| SymbolError::InvalidModifiedUtf8)?;

        Ok(self.intern(&decoded))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Whether `bytes` is well-formed modified UTF-8 (JVMS §4.4.7).
///
/// This is looser than [`SymbolTable::intern_modified_utf8`]: a surrogate half without its
/// partner is legal in a class file but has no `str` form.
pub fn is_modified_utf8(bytes: &[u8]) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        let width = match bytes[i] {
            0x01..=0x7f => 1,
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            _ => return false,
        };
        match bytes.get(i + 1..i + width) {
            Some(tail) if tail.iter().all(|b| b & 0xc0 == 0x80) => i += width,
            _ => return false,
        }
    }
    true
}
