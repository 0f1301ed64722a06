use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("Invalid modified UTF-8 sequence")]
    InvalidModifiedUtf8,
    #[error("Invalid {what} name: {name}")]
    InvalidName { what: &'static str, name: String },
    #[error("Invalid {what} descriptor: {descriptor}")]
    InvalidDescriptor {
        what: &'static str,
        descriptor: String,
    },
}
