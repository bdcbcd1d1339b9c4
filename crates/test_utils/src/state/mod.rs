//! In-memory ledger for tests

use epochstake_api::state::{StateAccess, StateScanIter};
use epochstake_types::error::StateError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A `BTreeMap`-backed [`StateAccess`] implementation.
///
/// Prefix scans are naturally key-ordered, which the epoch queue depends on.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryState {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of stored keys under `prefix`
    pub fn count_prefix(&self, prefix: &[u8]) -> usize {
        self.data.keys().filter(|k| k.starts_with(prefix)).count()
    }
}

impl StateAccess for MemoryState {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.data.get(key).cloned())
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.data.remove(key);
        Ok(())
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        for key in deletes {
            self.data.remove(key);
        }
        for (key, value) in inserts {
            self.data.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let results: Vec<_> = self
            .data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| Ok((Arc::from(k.as_slice()), Arc::from(v.as_slice()))))
            .collect();
        Ok(Box::new(results.into_iter()))
    }
}

/// A [`MemoryState`] whose batch commits fail once a budget is spent.
///
/// Single writes always succeed; the `n+1`th `batch_apply` and every one after
/// it return [`StateError::Backend`] without touching the data.
#[derive(Debug, Clone)]
pub struct FaultyState {
    inner: MemoryState,
    batches_left: usize,
}

impl FaultyState {
    /// Wrap `inner`, allowing `batches` successful batch commits
    pub fn new(inner: MemoryState, batches: usize) -> Self {
        Self {
            inner,
            batches_left: batches,
        }
    }

    /// The wrapped state, with every write that succeeded
    pub fn into_inner(self) -> MemoryState {
        self.inner
    }
}

impl StateAccess for FaultyState {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        self.inner.get(key)
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.inner.insert(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.inner.delete(key)
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        if self.batches_left == 0 {
            return Err(StateError::Backend("batch commit refused".into()));
        }
        self.batches_left -= 1;
        self.inner.batch_apply(inserts, deletes)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        self.inner.prefix_scan(prefix)
    }
}
