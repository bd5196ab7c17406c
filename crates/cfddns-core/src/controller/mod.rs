//! Sync controller
//!
//! The SyncController runs one cycle per call:
//! - Resolve the current public address via AddressResolver
//! - Compare it with the last applied address from StateStore
//! - On change, write it to the DNS record via RecordUpdater
//! - After a confirmed update, persist it to StateStore
//!
//! ## Architecture
//!
//! ```text
//!                       ┌────────────────┐
//!                       │ SyncController │
//!                       └────────────────┘
//!                                │
//!        ┌───────────────────────┼───────────────────────┐
//!        │                       │                       │
//!        ▼                       ▼                       ▼
//! ┌─────────────────┐   ┌────────────────┐   ┌──────────────────┐
//! │ AddressResolver │   │   StateStore   │   │  RecordUpdater   │
//! │ (read current)  │   │ (read / write) │   │ (write on change)│
//! └─────────────────┘   └────────────────┘   └──────────────────┘
//! ```
//!
//! ## Cycle Phases
//!
//! ```text
//! Idle → Resolving → Comparing → NoChange ─────────────────→ Idle
//!            │           │    └→ Updating → Persisting ────→ Idle
//!            │           │          │           │
//!            └───────────┴──────────┴───────────┴→ Failed → Idle
//! ```
//!
//! The state store is written only in `Persisting`, which is entered only
//! after the updater confirmed the change. Nothing is retried; the next
//! scheduled cycle picks up where this one failed.

use crate::address::Address;
use crate::error::Error;
use crate::traits::{AddressResolver, RecordReference, RecordUpdater, StateStore};
use thiserror::Error as ThisError;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

/// Phases of a sync cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CyclePhase {
    /// Between cycles
    Idle,
    /// Waiting for the address resolver
    Resolving,
    /// Reading and comparing the last applied address
    Comparing,
    /// Current address equals the last applied one
    NoChange,
    /// Waiting for the record updater
    Updating,
    /// Writing the applied address to the state store
    Persisting,
    /// The cycle stopped on an error
    Failed,
}

/// Events emitted by the SyncController
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The cycle moved from one phase to the next
    PhaseChanged { from: CyclePhase, to: CyclePhase },
}

/// Successful cycle results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Resolved address equals the last applied one; nothing was written
    Unchanged { address: Address },

    /// The record was updated and the new address recorded
    Updated {
        /// Last applied address before this cycle (`None` on first run)
        previous: Option<Address>,
        /// Address now in the record and the state store
        current: Address,
    },
}

impl SyncOutcome {
    /// The address the record holds after this cycle
    pub fn address(&self) -> &Address {
        match self {
            SyncOutcome::Unchanged { address } => address,
            SyncOutcome::Updated { current, .. } => current,
        }
    }
}

/// Failed cycle results
#[derive(ThisError, Debug)]
pub enum SyncError {
    /// The current address could not be determined; nothing was touched
    #[error("Could not resolve current address: {0}")]
    Resolution(#[source] Error),

    /// The last applied address could not be read; the record was not touched
    #[error("Could not read last applied address: {0}")]
    StateRead(#[source] Error),

    /// The provider did not confirm the update; the state store was not written
    #[error("Could not update record to {address}: {source}")]
    Update {
        address: Address,
        #[source]
        source: Error,
    },

    /// The record was updated but the state store write failed
    ///
    /// The next cycle sees stale or absent state and re-applies the same
    /// address, which reconciles the two.
    #[error("Record updated to {address}, but the state store was not written: {source}")]
    Persistence {
        address: Address,
        #[source]
        source: Error,
    },
}

impl SyncError {
    /// True when the DNS record already holds the new address
    pub fn is_remote_applied(&self) -> bool {
        matches!(self, SyncError::Persistence { .. })
    }
}

/// Sync controller
///
/// Owns its collaborators and the record reference for its whole lifetime.
/// `run_cycle` takes `&self` and awaits every collaborator call in sequence;
/// callers must not run two cycles against the same state store at once.
pub struct SyncController {
    /// Address resolver for the current public address
    resolver: Box<dyn AddressResolver>,

    /// Record updater for the DNS provider
    updater: Box<dyn RecordUpdater>,

    /// State store for the last applied address
    state_store: Box<dyn StateStore>,

    /// The record to keep in sync
    record: RecordReference,

    /// Event sender for external monitoring
    event_tx: Option<mpsc::Sender<SyncEvent>>,
}

impl SyncController {
    /// Create a new sync controller
    ///
    /// # Parameters
    ///
    /// - `resolver`: Address resolver implementation
    /// - `updater`: Record updater implementation
    /// - `state_store`: State store implementation
    /// - `record`: The record to keep in sync
    pub fn new(
        resolver: Box<dyn AddressResolver>,
        updater: Box<dyn RecordUpdater>,
        state_store: Box<dyn StateStore>,
        record: RecordReference,
    ) -> Self {
        Self {
            resolver,
            updater,
            state_store,
            record,
            event_tx: None,
        }
    }

    /// Receive a [`SyncEvent`] for every phase transition
    ///
    /// Events are dropped (with a warning) while the channel is full, so a
    /// slow consumer never stalls a cycle. Calling this again replaces the
    /// previous subscriber.
    pub fn subscribe(&mut self, capacity: usize) -> mpsc::Receiver<SyncEvent> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.event_tx = Some(tx);
        rx
    }

    /// The record this controller updates
    pub fn record(&self) -> &RecordReference {
        &self.record
    }

    /// Run one resolve → compare → update → persist cycle
    ///
    /// # Returns
    ///
    /// - `Ok(SyncOutcome::Unchanged)`: No update was needed
    /// - `Ok(SyncOutcome::Updated)`: Record updated and state persisted
    /// - `Err(SyncError)`: The step that failed; see [`SyncError`] for what
    ///   was and was not touched
    pub async fn run_cycle(&self) -> Result<SyncOutcome, SyncError> {
        let mut phase = CyclePhase::Idle;

        self.transition(&mut phase, CyclePhase::Resolving);
        let current = match self.resolver.resolve_current_address().await {
            Ok(address) => address,
            Err(e) => {
                error!("Failed to resolve current address via {}: {}", self.resolver.resolver_name(), e);
                self.fail(&mut phase);
                return Err(SyncError::Resolution(e));
            }
        };
        debug!("Current address from {}: {}", self.resolver.resolver_name(), current);

        self.transition(&mut phase, CyclePhase::Comparing);
        let previous = match self.state_store.read_last_address().await {
            Ok(previous) => previous,
            Err(e) => {
                error!("Failed to read last applied address from {}: {}", self.state_store.describe(), e);
                self.fail(&mut phase);
                return Err(SyncError::StateRead(e));
            }
        };

        if previous.as_ref() == Some(&current) {
            self.transition(&mut phase, CyclePhase::NoChange);
            info!("IP address has not changed: {}", current);
            self.transition(&mut phase, CyclePhase::Idle);
            return Ok(SyncOutcome::Unchanged { address: current });
        }

        match &previous {
            Some(previous) => info!("IP address changed from {} to {}", previous, current),
            None => info!(
                "No previous address in {}, applying {}",
                self.state_store.describe(),
                current
            ),
        }

        self.transition(&mut phase, CyclePhase::Updating);
        if let Err(e) = self.updater.apply_address(&self.record, &current).await {
            error!("Failed to update {} via {}: {}", self.record, self.updater.provider_name(), e);
            self.fail(&mut phase);
            return Err(SyncError::Update {
                address: current,
                source: e,
            });
        }
        info!("Record {} updated successfully: {}", self.record.name, current);

        self.transition(&mut phase, CyclePhase::Persisting);
        if let Err(e) = self.state_store.write_last_address(&current).await {
            warn!(
                "Record {} now points to {}, but {} was not updated: {}. The next cycle will apply it again.",
                self.record.name,
                current,
                self.state_store.describe(),
                e
            );
            self.fail(&mut phase);
            return Err(SyncError::Persistence {
                address: current,
                source: e,
            });
        }

        self.transition(&mut phase, CyclePhase::Idle);
        Ok(SyncOutcome::Updated { previous, current })
    }

    /// Move to `Failed`, then back to `Idle`
    fn fail(&self, phase: &mut CyclePhase) {
        self.transition(phase, CyclePhase::Failed);
        self.transition(phase, CyclePhase::Idle);
    }

    fn transition(&self, phase: &mut CyclePhase, to: CyclePhase) {
        debug!("Cycle phase: {:?} -> {:?}", phase, to);
        self.emit_event(SyncEvent::PhaseChanged { from: *phase, to });
        *phase = to;
    }

    /// Emit a controller event
    fn emit_event(&self, event: SyncEvent) {
        let Some(tx) = &self.event_tx else {
            return;
        };

        match tx.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing the subscriber capacity.");
            }
        }
    }
}
