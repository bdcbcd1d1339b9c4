// Path: crates/api/src/state/overlay.rs

//! A copy-on-write state overlay used to project ledger state forward.

use crate::state::{StateAccess, StateKVPair, StateScanIter};
use epochstake_types::error::StateError;
use std::cmp::Ordering;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::iter::{Fuse, Peekable};
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::sync::Arc;

/// A batch of key-value pairs to be inserted or updated in the state.
pub type StateInserts = Vec<(Vec<u8>, Vec<u8>)>;

/// A batch of keys to be deleted from the state.
pub type StateDeletes = Vec<Vec<u8>>;

/// A complete set of state changes (inserts/updates and deletes).
pub type StateChangeSet = (StateInserts, StateDeletes);

/// The smallest key strictly greater than every key starting with `prefix`.
/// Returns None if the prefix is empty or all 0xFF bytes.
fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let last_incrementable = prefix.iter().rposition(|b| *b != 0xFF)?;
    let mut ub = prefix.get(..=last_incrementable)?.to_vec();
    if let Some(byte) = ub.last_mut() {
        *byte += 1;
    }
    Some(ub)
}

/// Merges a sorted base scan with the overlay's sorted writes. Overlay entries
/// shadow base entries with the same key; tombstones hide them.
struct MergedScan<'a> {
    base: Peekable<Fuse<StateScanIter<'a>>>,
    writes: Peekable<btree_map::Range<'a, Vec<u8>, Option<Vec<u8>>>>,
}

impl<'a> MergedScan<'a> {
    fn next_write(&mut self) -> Option<Option<StateKVPair>> {
        let (key, value) = self.writes.next()?;
        Some(
            value
                .as_ref()
                .map(|v| (Arc::from(key.as_slice()), Arc::from(v.as_slice()))),
        )
    }
}

impl<'a> Iterator for MergedScan<'a> {
    type Item = Result<StateKVPair, StateError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let order = match (self.base.peek(), self.writes.peek()) {
                (Some(Err(_)), _) => return self.base.next(),
                (Some(Ok((bk, _))), Some((wk, _))) => {
                    let bk: &[u8] = bk;
                    bk.cmp(wk.as_slice())
                }
                (Some(Ok(_)), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => return None,
            };

            if order == Ordering::Less {
                return self.base.next();
            }
            if order == Ordering::Equal {
                // The overlay entry shadows the base entry.
                self.base.next();
            }
            if let Some(Some(pair)) = self.next_write() {
                return Some(Ok(pair));
            }
            // Tombstone: keep scanning.
        }
    }
}

/// An in-memory, copy-on-write overlay for any `StateAccess`.
///
/// Reads consult the overlay's own writes first and fall through to `base`.
/// Writes never reach `base`; they are either discarded with the overlay or
/// extracted with [`StateOverlay::into_ordered_batch`] and applied explicitly.
pub struct StateOverlay<'a> {
    base: &'a dyn StateAccess,
    // BTreeMap keeps commit order and merged scans deterministic.
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a> StateOverlay<'a> {
    /// Creates a new, empty overlay on top of a base state accessor.
    pub fn new(base: &'a dyn StateAccess) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
        }
    }

    /// Returns true if nothing has been written to the overlay.
    pub fn is_clean(&self) -> bool {
        self.writes.is_empty()
    }

    /// Consumes the overlay and returns its writes in key order.
    pub fn into_ordered_batch(self) -> StateChangeSet {
        let mut inserts = Vec::new();
        let mut deletes = Vec::new();
        for (key, value) in self.writes {
            match value {
                Some(value) => inserts.push((key, value)),
                None => deletes.push(key),
            }
        }
        (inserts, deletes)
    }
}

impl<'a> StateAccess for StateOverlay<'a> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        match self.writes.get(key) {
            Some(value) => Ok(value.clone()),
            None => self.base.get(key),
        }
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.writes.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        for key in deletes {
            self.delete(key)?;
        }
        for (key, value) in inserts {
            self.insert(key, value)?;
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let base = self.base.prefix_scan(prefix)?.fuse().peekable();
        let end = match prefix_upper_bound(prefix) {
            Some(ub) => Excluded(ub),
            None => Unbounded,
        };
        let writes = self
            .writes
            .range((Included(prefix.to_vec()), end))
            .peekable();
        Ok(Box::new(MergedScan { base, writes }))
    }
}
