//! Splits raw script text into atomic tokens.

use crate::node::Operator;
use crate::{BLOCK_BEGIN, BLOCK_END};

/// Start of a line comment.
pub const COMMENT: char = '#';

/// One token, remembering whether it was written in double quotes.
///
/// A quoted `"="` or `"}"` is plain text, never structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub quoted: bool,
}

impl Token {
    pub fn bare(text: impl Into<String>) -> Token {
        Token {
            text: text.into(),
            quoted: false,
        }
    }

    /// The operator this token spells, unless it was quoted.
    pub fn operator(&self) -> Option<Operator> {
        if self.quoted {
            None
        } else {
            Operator::from_token(&self.text)
        }
    }

    pub fn is_block_begin(&self) -> bool {
        !self.quoted && self.text == BLOCK_BEGIN
    }

    pub fn is_block_end(&self) -> bool {
        !self.quoted && self.text == BLOCK_END
    }

    /// Braces and operators.
    pub fn is_structural(&self) -> bool {
        self.is_block_begin() || self.is_block_end() || self.operator().is_some()
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Tokenizes script text into plain strings.
///
/// Comments are stripped per line, braces and the operators `=`, `!=`, `<=`,
/// `>=`, `<`, `>` become standalone tokens, and whitespace separates tokens
/// except inside double quotes. Quote characters are not part of the emitted
/// token; runs of whitespace inside quotes collapse to one space.
pub fn tokenize(text: &str) -> Vec<String> {
    lex(text).into_iter().map(|t| t.text).collect()
}

/// Same as [`tokenize`], keeping the quoted flag of every token.
pub fn lex(text: &str) -> Vec<Token> {
    let mut stripped = String::with_capacity(text.len());
    for line in text.lines() {
        stripped.push_str(strip_comment(line));
        stripped.push('\n');
    }

    let mut tokens = Vec::new();
    let mut current = Pending::default();
    let mut in_quotes = false;
    let mut last_was_space = false;
    let mut chars = stripped.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => in_quotes = false,
                c if c.is_whitespace() => {
                    if !last_was_space {
                        current.text.push(' ');
                        last_was_space = true;
                    }
                }
                c => {
                    current.text.push(c);
                    last_was_space = false;
                }
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                current.started = true;
                current.quoted = true;
                last_was_space = false;
            }
            c if c.is_whitespace() => current.flush(&mut tokens),
            '{' | '}' => {
                current.flush(&mut tokens);
                tokens.push(Token::bare(c));
            }
            '=' => {
                current.flush(&mut tokens);
                tokens.push(Token::bare("="));
            }
            '!' | '<' | '>' => {
                if chars.peek() == Some(&'=') {
                    chars.next();
                    current.flush(&mut tokens);
                    tokens.push(Token::bare(format!("{}=", c)));
                } else if c == '!' {
                    current.text.push(c);
                    current.started = true;
                } else {
                    current.flush(&mut tokens);
                    tokens.push(Token::bare(c));
                }
            }
            c => {
                current.text.push(c);
                current.started = true;
            }
        }
    }
    current.flush(&mut tokens);

    tokens
}

/// The token being accumulated. `started` is set even for an empty quoted string.
#[derive(Default)]
struct Pending {
    text: String,
    started: bool,
    quoted: bool,
}

impl Pending {
    fn flush(&mut self, tokens: &mut Vec<Token>) {
        if self.started {
            tokens.push(Token {
                text: std::mem::take(&mut self.text),
                quoted: self.quoted,
            });
            self.started = false;
            self.quoted = false;
        }
    }
}

/// Removes a trailing `#` comment from one line.
///
/// A `#` before the first quote always starts a comment. Otherwise only the
/// last `#` counts, and only if it comes after the last quote; a `#` between
/// quotes is kept.
fn strip_comment(line: &str) -> &str {
    let Some(first_hash) = line.find(COMMENT) else {
        return line;
    };

    match line.find('"') {
        None => &line[..first_hash],
        Some(first_quote) if first_hash < first_quote => &line[..first_hash],
        Some(_) => {
            let last_hash = line.rfind(COMMENT).unwrap_or(first_hash);
            let last_quote = line.rfind('"').unwrap_or(0);
            if last_hash > last_quote {
                &line[..last_hash]
            } else {
                line
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t\n").is_empty());
        assert!(tokenize("# only a comment\n").is_empty());
    }

    #[test]
    fn test_operators_are_padded() {
        assert_eq!(
            tokenize("a=b c>=1 d!=e f<2 g>3{x}"),
            vec![
                "a", "=", "b", "c", ">=", "1", "d", "!=", "e", "f", "<", "2", "g", ">", "3", "{",
                "x", "}"
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(tokenize("a = b # trailing\n#full line\nc = d"), vec!["a", "=", "b", "c", "=", "d"]);
        // `#` inside quotes survives, a later one after the quotes does not
        assert_eq!(tokenize(r##"name = "x#y" # note"##), vec!["name", "=", "x#y"]);
        assert_eq!(tokenize(r##"name = "x#y""##), vec!["name", "=", "x#y"]);
    }

    #[test]
    fn test_quotes_are_elided_and_keep_spaces() {
        assert_eq!(
            tokenize(r#"desc = "a   long {name}" k = """#),
            vec!["desc", "=", "a long {name}", "k", "=", ""]
        );
    }

    #[test]
    fn test_quoted_structure_is_text() {
        let tokens = lex(r#"name = "=" close = "}" plain = }"#);
        assert_eq!(tokens[2], Token { text: "=".into(), quoted: true });
        assert!(!tokens[2].is_structural());
        assert_eq!(tokens[5].text, "}");
        assert!(!tokens[5].is_block_end());
        assert!(tokens[8].is_block_end());
        assert_eq!(tokens[1].operator(), Some(Operator::Eq));
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("a = b"), "a = b");
        assert_eq!(strip_comment("# x"), "");
        assert_eq!(strip_comment("a # x \"q\""), "a ");
        assert_eq!(strip_comment("a = \"#\""), "a = \"#\"");
    }
}
