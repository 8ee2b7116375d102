// =====================================================================
// File: payload.rs
//
// Description:
//   A single buffered operation (Put or Del) against one key. Payloads
//   live in a per-tree arena and are linked into sorted, singly-linked
//   chains by `PayloadId`; a container owns one such chain.
// =====================================================================

use std::cmp::Ordering;

use crate::comparator::Comparator;

/// Index into a tree's payload arena.
pub type PayloadId = usize;

/// What a payload represents: a live write, or a tombstone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Put,
    Del,
}

/// One buffered key operation.
#[derive(Debug)]
pub struct Payload<K, V> {
    pub key: K,
    pub value: Option<V>,
    pub op: Op,
    pub next: Option<PayloadId>,
}

impl<K, V> Payload<K, V> {
    pub fn new_put(key: K, value: V) -> Self {
        Self { key, value: Some(value), op: Op::Put, next: None }
    }

    pub fn new_del(key: K) -> Self {
        Self { key, value: None, op: Op::Del, next: None }
    }
}

/// Result of searching a sorted payload chain for `key`.
pub(crate) enum ChainSearch {
    /// `key` is already present at `PayloadId`, with its predecessor in
    /// the chain (`None` if it is the head).
    Equal(PayloadId, Option<PayloadId>),
    /// `key` is absent; holds the greatest-key payload strictly less
    /// than `key`, if any (`None` means `key` would become the new head).
    Predecessor(Option<PayloadId>),
}

/// Walk the chain rooted at `head` looking for `key`, using `cmp` as the
/// total order. See §4.1: returns either the equal payload or the
/// predecessor insertion point.
///
/// `limit` bounds the walk to at most `limit` payloads — the container's
/// own `payload_count` — rather than relying on `next == None` to mark
/// the end. A node-split root container shares its head `PayloadId` with
/// the child it routes to (see tree.rs), so that shared payload's `next`
/// points on into the child's own chain; `limit` keeps a root-level
/// lookup from wandering across that boundary.
pub(crate) fn search_chain<K, V, C>(
    arena: &slab::Slab<Payload<K, V>>,
    head: Option<PayloadId>,
    limit: usize,
    key: &K,
    cmp: &C,
) -> ChainSearch
where
    C: Comparator<K>,
{
    let mut prev: Option<PayloadId> = None;
    let mut cur = head;
    let mut remaining = limit;
    while let Some(id) = cur {
        if remaining == 0 {
            break;
        }
        remaining -= 1;
        let node = &arena[id];
        match cmp.compare(&node.key, key) {
            Ordering::Equal => return ChainSearch::Equal(id, prev),
            Ordering::Less => {
                prev = Some(id);
                cur = node.next;
            }
            Ordering::Greater => break,
        }
    }
    ChainSearch::Predecessor(prev)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(a: &i32, b: &i32) -> Ordering {
        a.cmp(b)
    }

    #[test]
    fn search_chain_finds_equal() {
        let mut arena = slab::Slab::new();
        let a = arena.insert(Payload::new_put(1, "a"));
        let b = arena.insert(Payload::new_put(3, "b"));
        arena[a].next = Some(b);

        match search_chain(&arena, Some(a), 2, &3, &cmp) {
            ChainSearch::Equal(id, prev) => {
                assert_eq!(id, b);
                assert_eq!(prev, Some(a));
            }
            ChainSearch::Predecessor(_) => panic!("expected equal"),
        }
    }

    #[test]
    fn search_chain_finds_predecessor() {
        let mut arena = slab::Slab::new();
        let a = arena.insert(Payload::new_put(1, "a"));
        let b = arena.insert(Payload::new_put(5, "b"));
        arena[a].next = Some(b);

        match search_chain(&arena, Some(a), 2, &3, &cmp) {
            ChainSearch::Predecessor(Some(id)) => assert_eq!(id, a),
            other => panic!("expected predecessor, got {:?}", matches!(other, ChainSearch::Equal(..))),
        }
    }

    #[test]
    fn search_chain_respects_limit() {
        // Two payloads linked, but a limit of 1 must not see the second.
        let mut arena = slab::Slab::new();
        let a = arena.insert(Payload::new_put(1, "a"));
        let b = arena.insert(Payload::new_put(3, "b"));
        arena[a].next = Some(b);

        match search_chain(&arena, Some(a), 1, &3, &cmp) {
            ChainSearch::Predecessor(Some(id)) => assert_eq!(id, a),
            other => panic!("expected bounded predecessor, got {:?}", matches!(other, ChainSearch::Equal(..))),
        }
    }
}
