//! Longest-prefix matcher over a fixed set of `(token, payload)` pairs.
//!
//! Used to recognize symbolic operators ("+", "-", "//", "^", …) out of a
//! character stream: given the remaining input, a `PrefixTree` returns the
//! *longest* registered token that prefixes it, plus the unconsumed
//! remainder. Build is eager at construction time (the registry that owns
//! a tree is itself built lazily, once, by its caller); queries allocate
//! nothing.
//!
//! Separate trees are kept for prefix-position and infix-position
//! operators by the caller, so that e.g. `-` resolves to unary negation
//! when it cannot follow a value and to subtraction when it can.

use std::collections::HashMap;

#[derive(Debug, Default)]
struct Node<T> {
    children: HashMap<char, Node<T>>,
    payload: Option<T>,
}

impl<T> Node<T> {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            payload: None,
        }
    }
}

/// A trie keyed on `char`, storing a payload `T` at the terminal node of
/// each registered token string.
#[derive(Debug)]
pub struct PrefixTree<T> {
    root: Node<T>,
}

impl<T: Clone> PrefixTree<T> {
    pub fn new() -> Self {
        Self { root: Node::new() }
    }

    /// Register `token` with the given `payload`. Last registration for a
    /// given token string wins.
    pub fn insert(&mut self, token: &str, payload: T) {
        let mut node = &mut self.root;
        for ch in token.chars() {
            node = node.children.entry(ch).or_insert_with(Node::new);
        }
        node.payload = Some(payload);
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (&'static str, T)>) -> Self {
        let mut tree = Self::new();
        for (token, payload) in entries {
            tree.insert(token, payload);
        }
        tree
    }

    /// Find the longest registered token that prefixes `input`, returning
    /// its payload and byte length. Returns `None` if no registered token
    /// prefixes `input` at all.
    pub fn longest_match(&self, input: &str) -> Option<(T, usize)> {
        let mut node = &self.root;
        let mut best: Option<(T, usize)> = None;
        let mut consumed = 0usize;

        for ch in input.chars() {
            match node.children.get(&ch) {
                Some(next) => {
                    node = next;
                    consumed += ch.len_utf8();
                    if let Some(payload) = &node.payload {
                        best = Some((payload.clone(), consumed));
                    }
                }
                None => break,
            }
        }

        best
    }
}

impl<T: Clone> Default for PrefixTree<T> {
    fn default() -> Self {
        Self::new()
    }
}
