//! A parser library for Stellaris script files.
//!
//! This library provides a tokenizer, a recursive-descent parser and a serializer
//! for the game's `common/` definition format, which is loosely based on braces
//! `{}` and `key = value` assignments. Parsing is a pure function of the token
//! sequence, so independent files can be parsed in parallel and concatenated.

mod de;
mod decode;
mod error;
mod node;
mod parser;
mod ser;
mod tokenizer;

pub use de::{Deserializer, Error as DeError, from_node};
pub use decode::decode;
pub use error::ParseError;
pub use node::{Descendants, Node, Operator, ROOT_KEY, Value};
pub use parser::{parse, parse_document};
pub use ser::{serialize, serialize_document};
pub use tokenizer::{Token, lex, tokenize};

/// Opening brace token.
pub const BLOCK_BEGIN: &str = "{";
/// Closing brace token.
pub const BLOCK_END: &str = "}";
