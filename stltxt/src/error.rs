//! Error types for the script parser.

use std::fmt;

/// Errors that can occur while parsing a token stream.
///
/// Every variant means the source could not be made sense of structurally; the
/// caller is expected to skip that source and keep the rest of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Input ended inside an assignment or an open block.
    UnexpectedEof {
        /// Position in the token stream where EOF was encountered.
        position: usize,
    },
    /// Encountered an unexpected token.
    UnexpectedToken {
        /// Position in the token stream.
        position: usize,
        /// The token that was found.
        token: String,
        /// What was expected instead.
        expected: String,
    },
    /// A brace or operator in key position.
    InvalidKey {
        /// Position in the token stream.
        position: usize,
        /// What was found in key position.
        found: String,
    },
    /// A stray closing brace at top level left tokens unparsed.
    UnconsumedTokens {
        /// Position where unconsumed tokens start.
        position: usize,
        /// Number of tokens remaining.
        remaining: usize,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedEof { position } => {
                write!(f, "Unexpected end of input at position {}", position)
            }
            ParseError::UnexpectedToken {
                position,
                token,
                expected,
            } => {
                write!(
                    f,
                    "Unexpected token '{}' at position {}, expected {}",
                    token, position, expected
                )
            }
            ParseError::InvalidKey { position, found } => {
                write!(
                    f,
                    "Invalid key '{}' at position {} (must be a plain token)",
                    found, position
                )
            }
            ParseError::UnconsumedTokens {
                position,
                remaining,
            } => {
                write!(
                    f,
                    "Parsing incomplete: {} unconsumed tokens starting at position {}",
                    remaining, position
                )
            }
        }
    }
}

impl std::error::Error for ParseError {}
