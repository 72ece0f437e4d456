use alloc::string::String;

use thiserror::Error;

/// Errors surfaced by pattern compilation and by the parser.
///
/// Parse errors are sticky: once one is recorded, every subsequent feed
/// returns it until the parser is closed. Pattern errors surface
/// synchronously from subscription registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("invalid state")]
    InvalidState,
    #[error("invalid path pattern: {0}")]
    InvalidPattern(String),
    #[error("unclosed string")]
    UnclosedString,
    #[error("unclosed number")]
    UnclosedNumber,
    #[error("mismatched brace")]
    MismatchedBrace,
    #[error("mismatched bracket")]
    MismatchedBracket,
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),
}
