use thiserror::Error;

/// Raised by [`crate::Parser::set_language`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("incompatible language version {found}, expected {expected}")]
pub struct LanguageError {
    pub found: u32,
    pub expected: u32,
}

/// Raised by [`crate::Parser::parse`]. Malformed input is not an error; it is
/// reported through `ERROR`/`MISSING` nodes in the returned tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no language assigned to parser")]
    NoLanguage,

    #[error("input of {size} bytes exceeds limit of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Language(#[from] LanguageError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
