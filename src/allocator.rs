//! Node identifier allocation.
//!
//! Ids are `{prefix}_{n}` where the prefix comes from [NodeKind::id_prefix] and `n` is a per-kind
//! counter that starts at 0 and only ever increases for the lifetime of the allocator. Because
//! counters never decrease, an id freed by deleting its node is never handed out again, so an
//! existing `{{input_3}}` reference cannot silently re-attach to a newer node.

use crate::properties::{NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    counters: BTreeMap<NodeKind, u64>,
}

impl IdAllocator {
    pub fn new() -> IdAllocator {
        IdAllocator::default()
    }

    /// Allocate the next id for `kind`.
    ///
    /// `is_taken` is consulted for every candidate; counter values whose id is already present in
    /// the node set (for example a node inserted with an explicit id) are skipped, so the returned
    /// id is unique across the whole node set at allocation time.
    pub fn next_id<F>(&mut self, kind: NodeKind, mut is_taken: F) -> NodeId
    where
        F: FnMut(&NodeId) -> bool,
    {
        let counter = self.counters.entry(kind).or_insert(0);
        loop {
            let candidate = NodeId::new(format!("{}_{}", kind.id_prefix(), *counter));
            *counter += 1;
            if !is_taken(&candidate) {
                tracing::trace!("[IdAllocator] allocated {candidate}");
                return candidate;
            }
            tracing::debug!("[IdAllocator] skipping taken id {candidate}");
        }
    }

    /// Advance the counter of the kind whose prefix `id` carries past the number in `id`, so that
    /// `id` is never handed out. Ids that do not follow the `{prefix}_{n}` scheme are ignored.
    ///
    /// Used when restoring a saved pipeline, where ids of deleted nodes may still be referenced
    /// by template text.
    pub fn observe(&mut self, id: &str) {
        let Some((prefix, number)) = id.rsplit_once('_') else {
            return;
        };
        let Ok(number) = number.parse::<u64>() else {
            return;
        };
        let Some(kind) = NodeKind::all()
            .iter()
            .find(|kind| kind.id_prefix() == prefix)
        else {
            return;
        };
        let counter = self.counters.entry(*kind).or_insert(0);
        if *counter <= number {
            *counter = number.saturating_add(1);
            tracing::trace!("[IdAllocator] {kind} counter advanced to {counter} by {id}");
        }
    }

    /// Peek at the counter value the next allocation for `kind` will start from.
    pub fn counter(&self, kind: NodeKind) -> u64 {
        self.counters.get(&kind).copied().unwrap_or(0)
    }
}
