//! The generic node tree produced by the parser.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key of the synthetic node that owns the top-level entries of all parsed sources.
pub const ROOT_KEY: &str = "root";

/// The operator binding a key to its value.
///
/// Almost everything in game files uses `=`; comparisons only show up inside
/// trigger blocks (`num_pops > 5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl Operator {
    pub fn from_token(token: &str) -> Option<Operator> {
        match token {
            "=" => Some(Operator::Eq),
            "!=" => Some(Operator::NotEq),
            "<" => Some(Operator::Lt),
            "<=" => Some(Operator::LtEq),
            ">" => Some(Operator::Gt),
            ">=" => Some(Operator::GtEq),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
        }
    }
}

/// The value of a node. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// `key = text`
    Scalar(String),
    /// `key = { a b c }`
    Set(BTreeSet<String>),
    /// `key = { child = ... }`, possibly empty (`key = { }`).
    Children(Vec<Node>),
}

/// A node in the parse tree.
///
/// Nodes own their children; there is no parent pointer. Queries that need
/// ancestry use [`Node::find_path`] / [`Node::paths`], which return the chain
/// from the queried node down to the match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub key: String,
    #[serde(default)]
    pub op: Operator,
    pub value: Value,
}

impl Node {
    pub fn scalar(key: impl Into<String>, text: impl Into<String>) -> Node {
        Node {
            key: key.into(),
            op: Operator::Eq,
            value: Value::Scalar(text.into()),
        }
    }

    pub fn set<I, S>(key: impl Into<String>, items: I) -> Node
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Node {
            key: key.into(),
            op: Operator::Eq,
            value: Value::Set(items.into_iter().map(Into::into).collect()),
        }
    }

    pub fn block(key: impl Into<String>, children: Vec<Node>) -> Node {
        Node {
            key: key.into(),
            op: Operator::Eq,
            value: Value::Children(children),
        }
    }

    /// Wraps the top-level entries of one or more sources under the synthetic root.
    pub fn root(children: Vec<Node>) -> Node {
        Node::block(ROOT_KEY, children)
    }

    /// The scalar text, if this is a `key = text` node.
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The items, if this is a `key = { a b c }` node.
    pub fn set_items(&self) -> Option<&BTreeSet<String>> {
        match &self.value {
            Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Child nodes; empty for scalars and sets.
    pub fn children(&self) -> &[Node] {
        match &self.value {
            Value::Children(children) => children,
            _ => &[],
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self.value, Value::Children(_))
    }

    /// First direct child with the given key.
    pub fn child(&self, key: &str) -> Option<&Node> {
        self.children().iter().find(|c| c.key == key)
    }

    pub fn children_with_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children().iter().filter(move |c| c.key == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.child(key).is_some()
    }

    /// True if a direct child reads `key = text`.
    pub fn contains_pair(&self, key: &str, text: &str) -> bool {
        self.children_with_key(key).any(|c| c.text() == Some(text))
    }

    /// Whether this node itself reads `key = text`.
    pub fn is_pair(&self, key: &str, text: &str) -> bool {
        self.key == key && self.text() == Some(text)
    }

    /// Breadth-first iteration over all descendants, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            queue: self.children().iter().collect(),
        }
    }

    /// Depth-first search for the first descendant matching `predicate`.
    ///
    /// Returns the chain `[self, .., match]`, so callers can inspect the ancestors
    /// of the match.
    pub fn find_path<F>(&self, predicate: F) -> Option<Vec<&Node>>
    where
        F: Fn(&Node) -> bool,
    {
        let mut path = vec![self];
        if find_path_inner(self, &predicate, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    /// Every descendant matching `predicate`, each with its chain from `self`.
    pub fn paths<F>(&self, predicate: F) -> Vec<Vec<&Node>>
    where
        F: Fn(&Node) -> bool,
    {
        let mut found = Vec::new();
        let mut path = vec![self];
        collect_paths(self, &predicate, &mut path, &mut found);
        found
    }

    /// Counts the total number of nodes in this subtree (inclusive).
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(|c| c.node_count()).sum::<usize>()
    }
}

fn find_path_inner<'a, F>(node: &'a Node, predicate: &F, path: &mut Vec<&'a Node>) -> bool
where
    F: Fn(&Node) -> bool,
{
    for child in node.children() {
        path.push(child);
        if predicate(child) || find_path_inner(child, predicate, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn collect_paths<'a, F>(
    node: &'a Node,
    predicate: &F,
    path: &mut Vec<&'a Node>,
    found: &mut Vec<Vec<&'a Node>>,
) where
    F: Fn(&Node) -> bool,
{
    for child in node.children() {
        path.push(child);
        if predicate(child) {
            found.push(path.clone());
        }
        collect_paths(child, predicate, path, found);
        path.pop();
    }
}

/// Breadth-first descendant iterator, see [`Node::descendants`].
pub struct Descendants<'a> {
    queue: VecDeque<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let next = self.queue.pop_front()?;
        self.queue.extend(next.children());
        Some(next)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::serialize(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::block(
            "civic_x",
            vec![
                Node::block(
                    "playable",
                    vec![Node::block("NOT", vec![Node::scalar("always", "no")])],
                ),
                Node::scalar("cost", "1"),
                Node::set("tags", ["a", "b"]),
            ],
        )
    }

    #[test]
    fn test_child_lookup() {
        let node = sample();
        assert_eq!(node.child("cost").and_then(Node::text), Some("1"));
        assert!(node.contains_pair("cost", "1"));
        assert!(!node.contains_pair("cost", "2"));
        assert!(node.child("missing").is_none());
        assert_eq!(node.child("tags").and_then(Node::set_items).map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_descendants_are_breadth_first() {
        let node = sample();
        let keys: Vec<_> = node.descendants().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["playable", "cost", "tags", "NOT", "always"]);
    }

    #[test]
    fn test_find_path_reports_ancestors() {
        let node = sample();
        let path = node.find_path(|n| n.is_pair("always", "no")).unwrap();
        let keys: Vec<_> = path.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["civic_x", "playable", "NOT", "always"]);
        assert!(node.find_path(|n| n.key == "nope").is_none());
    }

    #[test]
    fn test_node_count() {
        assert_eq!(sample().node_count(), 6);
    }
}
