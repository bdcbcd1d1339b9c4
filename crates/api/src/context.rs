// Path: crates/api/src/context.rs
//! The per-call execution context and its forward projections.

use crate::state::{StateAccess, StateChangeSet, StateOverlay};
use epochstake_types::app::{BlockHeader, ConsensusParams, StakingEvent};

/// Collects the events emitted during one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventManager {
    events: Vec<StakingEvent>,
}

impl EventManager {
    /// Records one event.
    pub fn emit(&mut self, event: StakingEvent) {
        self.events.push(event);
    }

    /// Records several events in order.
    pub fn emit_all(&mut self, events: impl IntoIterator<Item = StakingEvent>) {
        self.events.extend(events);
    }

    /// The events recorded so far.
    pub fn events(&self) -> &[StakingEvent] {
        &self.events
    }

    /// Removes and returns every recorded event.
    pub fn take(&mut self) -> Vec<StakingEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Provides the ledger and block information to a single staking call.
///
/// The context exclusively borrows the ledger for the duration of the call.
/// Handlers never retain it past their own execution.
pub struct Context<'a> {
    state: &'a mut dyn StateAccess,
    header: BlockHeader,
    consensus_params: Option<ConsensusParams>,
    events: EventManager,
}

impl<'a> Context<'a> {
    /// Creates a context over `state` for the block described by `header`.
    pub fn new(state: &'a mut dyn StateAccess, header: BlockHeader) -> Self {
        Self {
            state,
            header,
            consensus_params: None,
            events: EventManager::default(),
        }
    }

    /// Sets the consensus parameters in effect for the block.
    pub fn with_consensus_params(mut self, params: ConsensusParams) -> Self {
        self.consensus_params = Some(params);
        self
    }

    /// Read access to the ledger.
    pub fn state(&self) -> &dyn StateAccess {
        &*self.state
    }

    /// Write access to the ledger.
    pub fn state_mut(&mut self) -> &mut dyn StateAccess {
        &mut *self.state
    }

    /// The current block height.
    pub fn block_height(&self) -> u64 {
        self.header.height
    }

    /// The current block time in UNIX seconds.
    pub fn block_time(&self) -> u64 {
        self.header.time
    }

    /// The consensus parameters, if the host supplied any.
    pub fn consensus_params(&self) -> Option<&ConsensusParams> {
        self.consensus_params.as_ref()
    }

    /// Records an event.
    pub fn emit(&mut self, event: StakingEvent) {
        self.events.emit(event);
    }

    /// Records several events in order.
    pub fn emit_events(&mut self, events: impl IntoIterator<Item = StakingEvent>) {
        self.events.emit_all(events);
    }

    /// The events recorded so far.
    pub fn events(&self) -> &[StakingEvent] {
        self.events.events()
    }

    /// Removes and returns every recorded event.
    pub fn take_events(&mut self) -> Vec<StakingEvent> {
        self.events.take()
    }

    /// Branches an isolated, copy-on-write projection of this context.
    ///
    /// The projection reads through to the current ledger but none of its
    /// writes reach it. Dropping the projection discards them; committing is
    /// an explicit `batch_apply` of [`CacheContext::into_change_set`].
    pub fn cache_context(&self) -> CacheContext<'_> {
        CacheContext {
            overlay: StateOverlay::new(&*self.state),
            header: self.header,
            consensus_params: self.consensus_params.clone(),
        }
    }
}

/// A discardable projection of a [`Context`].
pub struct CacheContext<'a> {
    overlay: StateOverlay<'a>,
    header: BlockHeader,
    consensus_params: Option<ConsensusParams>,
}

impl<'a> CacheContext<'a> {
    /// Moves the projection to another block height.
    pub fn with_block_height(mut self, height: u64) -> Self {
        self.header.height = height;
        self
    }

    /// Moves the projection to another block time.
    pub fn with_block_time(mut self, time: u64) -> Self {
        self.header.time = time;
        self
    }

    /// A context that executes against the projection. Events it records stay
    /// with the returned context.
    pub fn context(&mut self) -> Context<'_> {
        let mut ctx = Context::new(&mut self.overlay, self.header);
        ctx.consensus_params = self.consensus_params.clone();
        ctx
    }

    /// Consumes the projection and returns its writes for an explicit commit.
    pub fn into_change_set(self) -> StateChangeSet {
        self.overlay.into_ordered_batch()
    }
}
