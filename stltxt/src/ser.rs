//! Writes node trees back to script text.
//!
//! The output re-parses to an equal tree. Comments and original whitespace are
//! not preserved.

use std::borrow::Cow;

use crate::node::{Node, Value};

const INDENT: &str = "\t";

/// Serializes a single node, including its own key.
pub fn serialize(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, 0, &mut out);
    out
}

/// Serializes a list of top-level entries, as found in one source file.
pub fn serialize_document(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, 0, &mut out);
    }
    out
}

fn write_node(node: &Node, level: usize, out: &mut String) {
    indent(level, out);
    out.push_str(&quote(&node.key));
    out.push(' ');
    out.push_str(node.op.as_str());
    out.push(' ');

    match &node.value {
        Value::Scalar(text) => {
            out.push_str(&quote(text));
            out.push('\n');
        }
        Value::Set(items) => {
            out.push_str("{\n");
            for item in items {
                indent(level + 1, out);
                out.push_str(&quote(item));
                out.push('\n');
            }
            indent(level, out);
            out.push_str("}\n");
        }
        Value::Children(children) if children.is_empty() => {
            out.push_str("{ }\n");
        }
        Value::Children(children) => {
            out.push_str("{\n");
            for child in children {
                write_node(child, level + 1, out);
            }
            indent(level, out);
            out.push_str("}\n");
        }
    }
}

fn indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

/// Quotes a token that would not survive tokenization on its own.
fn quote(text: &str) -> Cow<'_, str> {
    let needs_quotes = text.is_empty()
        || text
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '=' | '<' | '>' | '!' | '#'));
    if needs_quotes {
        Cow::Owned(format!("\"{}\"", text))
    } else {
        Cow::Borrowed(text)
    }
}
