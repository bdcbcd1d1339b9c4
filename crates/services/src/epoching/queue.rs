// Path: crates/services/src/epoching/queue.rs
//! An append-only, per-epoch action queue stored in the ledger.

use epochstake_api::state::{get_decoded, put_encoded, StateAccess};
use epochstake_types::app::QueuedAction;
use epochstake_types::codec;
use epochstake_types::error::StateError;
use epochstake_types::keys::{epoch_action_key, epoch_queue_prefix, EPOCH_NEXT_ACTION_ID_KEY};
use parity_scale_codec::{Decode, Encode};
use std::marker::PhantomData;

/// Queues SCALE-encoded actions under an epoch number.
///
/// Every push draws the next id from a single global counter, and keys are
/// `epoch ‖ id` in big-endian, so a prefix scan of one epoch replays its
/// actions in insertion order. Epochs never interfere with each other.
#[derive(Debug)]
pub struct EpochQueue<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for EpochQueue<T> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for EpochQueue<T> {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl<T: Encode + Decode> EpochQueue<T> {
    /// Creates a queue handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `action` under `epoch` and returns its action id.
    pub fn push(
        &self,
        state: &mut dyn StateAccess,
        epoch: u64,
        action: &T,
    ) -> Result<u64, StateError> {
        let id = get_decoded::<u64>(state, EPOCH_NEXT_ACTION_ID_KEY)?.unwrap_or(0);
        let next = id
            .checked_add(1)
            .ok_or_else(|| StateError::InvalidValue("epoch action id overflow".into()))?;
        put_encoded(state, &epoch_action_key(epoch, id), action)?;
        put_encoded(state, EPOCH_NEXT_ACTION_ID_KEY, &next)?;
        Ok(id)
    }

    /// Every action queued under `epoch`, oldest first.
    pub fn pending(
        &self,
        state: &dyn StateAccess,
        epoch: u64,
    ) -> Result<Vec<QueuedAction<T>>, StateError> {
        let prefix = epoch_queue_prefix(epoch);
        let mut out = Vec::new();
        for item in state.prefix_scan(&prefix)? {
            let (key, value) = item?;
            let action_id = key
                .get(prefix.len()..)
                .and_then(|rest| <[u8; 8]>::try_from(rest).ok())
                .map(u64::from_be_bytes)
                .ok_or_else(|| {
                    StateError::Decode(format!("malformed epoch queue key of length {}", key.len()))
                })?;
            let action = codec::from_bytes_canonical(&value).map_err(StateError::Decode)?;
            out.push(QueuedAction {
                epoch,
                action_id,
                action,
            });
        }
        Ok(out)
    }

    /// The number of actions queued under `epoch`.
    pub fn len(&self, state: &dyn StateAccess, epoch: u64) -> Result<usize, StateError> {
        let mut count = 0;
        for item in state.prefix_scan(&epoch_queue_prefix(epoch))? {
            item?;
            count += 1;
        }
        Ok(count)
    }

    /// Returns true if nothing is queued under `epoch`.
    pub fn is_empty(&self, state: &dyn StateAccess, epoch: u64) -> Result<bool, StateError> {
        Ok(self.len(state, epoch)? == 0)
    }

    /// Deletes one queued action.
    pub fn remove(
        &self,
        state: &mut dyn StateAccess,
        queued: &QueuedAction<T>,
    ) -> Result<(), StateError> {
        state.delete(&epoch_action_key(queued.epoch, queued.action_id))
    }
}
