//! Recursive-descent parser from tokens to a node list.
//!
//! Grammar, resolved with at most two tokens of lookahead past an opening brace:
//!
//! ```text
//! block       := entry* ( '}' | EOF at top level )
//! entry       := KEY OP VALUE              scalar
//!              | KEY OP '{' '}'            empty block
//!              | KEY OP '{' TOKEN* '}'     set, when the 2nd interior token is not an operator
//!              | KEY OP '{' block          named block
//! ```

use std::collections::BTreeSet;

use crate::error::ParseError;
use crate::node::{Node, Value};
use crate::tokenizer::{Token, lex};

/// Tokenizes and parses one source.
pub fn parse_document(text: &str) -> Result<Vec<Node>, ParseError> {
    let tokens = lex(text);
    Parser { tokens: &tokens, pos: 0 }.block(0)
}

/// Parses a stream of plain tokens into its top-level entries.
///
/// Every token is taken as unquoted. An empty stream yields an empty list.
/// Running out of tokens inside a block is an error; nothing is silently
/// truncated.
pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Node>, ParseError> {
    let tokens: Vec<Token> = tokens.iter().map(|t| Token::bare(t.as_ref())).collect();
    Parser { tokens: &tokens, pos: 0 }.block(0)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    fn next_token(&mut self) -> Result<&'a Token, ParseError> {
        let token = self.peek(0).ok_or(ParseError::UnexpectedEof { position: self.pos })?;
        self.pos += 1;
        Ok(token)
    }

    fn block(&mut self, depth: usize) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        loop {
            let Some(token) = self.peek(0) else {
                if depth == 0 {
                    return Ok(nodes);
                }
                return Err(ParseError::UnexpectedEof { position: self.pos });
            };

            if token.is_block_end() {
                if depth == 0 {
                    return Err(ParseError::UnconsumedTokens {
                        position: self.pos,
                        remaining: self.tokens.len() - self.pos,
                    });
                }
                self.pos += 1;
                return Ok(nodes);
            }

            nodes.push(self.entry(depth)?);
        }
    }

    fn entry(&mut self, depth: usize) -> Result<Node, ParseError> {
        let key_pos = self.pos;
        let key = self.next_token()?;
        if key.is_structural() {
            return Err(ParseError::InvalidKey {
                position: key_pos,
                found: key.text.clone(),
            });
        }

        let op_pos = self.pos;
        let op_token = self.next_token()?;
        let op = op_token.operator().ok_or_else(|| ParseError::UnexpectedToken {
            position: op_pos,
            token: op_token.text.clone(),
            expected: "an operator".to_string(),
        })?;

        let value_pos = self.pos;
        let value = self.next_token()?;
        if !value.is_block_begin() {
            if value.is_structural() {
                return Err(ParseError::UnexpectedToken {
                    position: value_pos,
                    token: value.text.clone(),
                    expected: "a value".to_string(),
                });
            }
            return Ok(Node {
                key: key.text.clone(),
                op,
                value: Value::Scalar(value.text.clone()),
            });
        }

        let first = self.peek(0).ok_or(ParseError::UnexpectedEof { position: self.pos })?;
        let value = if first.is_block_end() {
            self.pos += 1;
            Value::Children(Vec::new())
        } else if self.peek(1).is_some_and(|t| t.operator().is_some()) {
            Value::Children(self.block(depth + 1)?)
        } else {
            Value::Set(self.set()?)
        };

        Ok(Node {
            key: key.text.clone(),
            op,
            value,
        })
    }

    fn set(&mut self) -> Result<BTreeSet<String>, ParseError> {
        let mut items = BTreeSet::new();
        loop {
            let pos = self.pos;
            let token = self.next_token()?;
            if token.is_block_end() {
                return Ok(items);
            }
            if token.is_structural() {
                return Err(ParseError::UnexpectedToken {
                    position: pos,
                    token: token.text.clone(),
                    expected: "a set item or '}'".to_string(),
                });
            }
            items.insert(token.text.clone());
        }
    }
}
