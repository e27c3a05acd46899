//! Hierarchy sorting.
//!
//! Endpoints are placed in a tree with one node per mask segment and emitted
//! depth first, children before the node itself. Within a node, static
//! segments come before variable ones; statics sort lexicographically with
//! the empty segment last, variables sort lexicographically among
//! themselves. Endpoints sitting on the same node are ordered by their verb
//! key (`"GET"` < `"GET, POST"` < `"POST"`), then by insertion order.
//!
//! ```text
//!   /users/export        emitted 1st
//!   /users/{id}/items    emitted 2nd
//!   /users/{id}          emitted 3rd
//!   /users               emitted 4th
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use meridian_core::path::segments;
use meridian_router::is_variable_segment;

#[derive(Debug)]
struct Node<T> {
    children: HashMap<String, Node<T>>,
    entries: BTreeMap<String, Vec<T>>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            entries: BTreeMap::new(),
        }
    }
}

impl<T> Node<T> {
    fn emit(self, out: &mut Vec<T>) {
        let mut children: Vec<(String, Node<T>)> = self.children.into_iter().collect();
        children.sort_by(|(a, _), (b, _)| compare_segments(a, b));
        for (_, child) in children {
            child.emit(out);
        }
        for (_, items) in self.entries {
            out.extend(items);
        }
    }
}

/// Orders two sibling segments.
#[must_use]
pub fn compare_segments(a: &str, b: &str) -> Ordering {
    segment_rank(a)
        .cmp(&segment_rank(b))
        .then_with(|| a.cmp(b))
}

fn segment_rank(segment: &str) -> u8 {
    if is_variable_segment(segment) {
        2
    } else if segment.is_empty() {
        1
    } else {
        0
    }
}

/// Sorts items into hierarchy order.
///
/// `mask` returns an item's normalized mask and `verb_key` its sorted,
/// comma-joined verb list.
pub fn sort_hierarchy<T, M, V>(items: Vec<T>, mask: M, verb_key: V) -> Vec<T>
where
    M: Fn(&T) -> &str,
    V: Fn(&T) -> String,
{
    let total = items.len();
    let mut root = Node::default();

    for item in items {
        let mut node = &mut root;
        for segment in segments(mask(&item)) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.entries.entry(verb_key(&item)).or_default().push(item);
    }

    let mut out = Vec::with_capacity(total);
    root.emit(&mut out);
    out
}
