use std::cmp::Ordering;

use serde::Deserialize;

/// What to do when a clue with identical text is inserted again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Insert into the right subtree; repeats show up in the listing.
    #[default]
    Keep,
    /// Ignore the repeat.
    Discard,
}

#[derive(Debug)]
pub struct ClueNode {
    pub text: String,
    pub left: Option<Box<ClueNode>>,
    pub right: Option<Box<ClueNode>>,
}

impl ClueNode {
    fn new(text: String) -> Self {
        Self {
            text,
            left: None,
            right: None,
        }
    }
}

/// Binary search tree of collected clues, ordered by byte-wise string
/// comparison. Everything smaller goes left, everything else goes right.
#[derive(Debug, Default)]
pub struct ClueIndex {
    root: Option<Box<ClueNode>>,
    len: usize,
    policy: DuplicatePolicy,
}

impl ClueIndex {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            root: None,
            len: 0,
            policy,
        }
    }

    /// Insert a clue. Empty text is ignored. Returns whether a node was added.
    pub fn insert(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let before = self.len;
        self.root = Self::insert_node(self.root.take(), text, self.policy, &mut self.len);
        self.len > before
    }

    fn insert_node(
        node: Option<Box<ClueNode>>,
        text: &str,
        policy: DuplicatePolicy,
        len: &mut usize,
    ) -> Option<Box<ClueNode>> {
        match node {
            None => {
                *len += 1;
                Some(Box::new(ClueNode::new(text.to_string())))
            }
            Some(mut n) => {
                match (text.cmp(&n.text), policy) {
                    (Ordering::Less, _) => {
                        n.left = Self::insert_node(n.left.take(), text, policy, len)
                    }
                    (Ordering::Equal, DuplicatePolicy::Discard) => {}
                    _ => n.right = Self::insert_node(n.right.take(), text, policy, len),
                }
                Some(n)
            }
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        let mut current = &self.root;
        while let Some(n) = current {
            match text.cmp(&n.text) {
                Ordering::Less => current = &n.left,
                Ordering::Greater => current = &n.right,
                Ordering::Equal => return true,
            }
        }
        false
    }

    pub fn root(&self) -> Option<&ClueNode> {
        self.root.as_deref()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clue texts in ascending order.
    pub fn in_order(&self) -> Vec<&str> {
        let mut result = Vec::with_capacity(self.len);
        Self::in_order_traverse(&self.root, &mut result);
        result
    }

    fn in_order_traverse<'a>(node: &'a Option<Box<ClueNode>>, result: &mut Vec<&'a str>) {
        if let Some(n) = node {
            Self::in_order_traverse(&n.left, result);
            result.push(&n.text);
            Self::in_order_traverse(&n.right, result);
        }
    }
}
