//! Core traits for cfddns
//!
//! This module defines the collaborator interfaces of the sync cycle.
//!
//! - [`AddressResolver`]: Look up the current public address
//! - [`RecordUpdater`]: Write an address into a provider's record
//! - [`StateStore`]: Persist the last applied address

pub mod address_resolver;
pub mod record_updater;
pub mod state_store;

pub use address_resolver::AddressResolver;
pub use record_updater::{RecordReference, RecordUpdater};
pub use state_store::StateStore;
