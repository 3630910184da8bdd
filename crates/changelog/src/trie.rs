//! Change trie: command name, then each key parameter, down to a leaf
//! holding the command's value parameter.
//!
//! Children are kept in an [`IndexMap`], so every level iterates in
//! first-insertion order. Overwriting a leaf replaces its value in place and
//! never moves it.

use indexmap::IndexMap;

use crate::error::{ChangeLogError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrieNode {
    Leaf(String),
    Branch(IndexMap<String, TrieNode>),
}

impl Default for TrieNode {
    fn default() -> Self {
        TrieNode::Branch(IndexMap::new())
    }
}

impl TrieNode {
    /// Fold `name params...` into the trie, keyed on the first
    /// `match_arity` parameters. `params` must hold exactly the key plus one
    /// value.
    pub fn merge(&mut self, name: &str, params: &[String], match_arity: usize) -> Result<()> {
        if params.len() != match_arity + 1 {
            return Err(ChangeLogError::KeyArity {
                command: name.to_string(),
                expected: match_arity + 1,
                got: params.len(),
            });
        }
        let (value, key) = params
            .split_last()
            .ok_or_else(|| ChangeLogError::KeyArity {
                command: name.to_string(),
                expected: match_arity + 1,
                got: 0,
            })?;

        let mut node = self;
        for segment in std::iter::once(name).chain(key.iter().map(String::as_str)) {
            let children = node.children_mut();
            node = children.entry(segment.to_string()).or_default();
        }
        // Replaced in place: the entry keeps its position in the parent.
        *node = TrieNode::Leaf(value.clone());
        Ok(())
    }

    /// Children of a branch. A leaf reached by a deeper path is turned into a
    /// branch; that only happens if one command is recorded with two
    /// different arities.
    fn children_mut(&mut self) -> &mut IndexMap<String, TrieNode> {
        if let TrieNode::Leaf(_) = self {
            *self = TrieNode::default();
        }
        match self {
            TrieNode::Branch(children) => children,
            TrieNode::Leaf(_) => unreachable!("leaf replaced by branch above"),
        }
    }

    /// Depth-first linearization: one token list per leaf.
    pub fn flatten(&self) -> Vec<Vec<String>> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        self.flatten_into(&mut prefix, &mut out);
        out
    }

    fn flatten_into(&self, prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
        match self {
            TrieNode::Leaf(value) => {
                let mut tokens = prefix.clone();
                tokens.push(value.clone());
                out.push(tokens);
            }
            TrieNode::Branch(children) => {
                for (segment, child) in children {
                    prefix.push(segment.clone());
                    child.flatten_into(prefix, out);
                    prefix.pop();
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TrieNode::Branch(children) if children.is_empty())
    }
}
