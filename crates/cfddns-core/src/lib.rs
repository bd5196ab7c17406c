// # cfddns-core
//
// Core library for keeping a DNS address record on the host's public IP.
//
// ## Architecture Overview
//
// One sync cycle resolves the current public address, compares it with the
// last address that was confirmed applied, and only on change pushes the new
// value to the DNS provider and records it locally:
//
// - **AddressResolver**: Trait for looking up the current public address
// - **RecordUpdater**: Trait for writing an address into a provider's record
// - **StateStore**: Trait for persisting the last applied address
// - **SyncController**: Runs one resolve → compare → update → persist cycle
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Cycle logic is separate from HTTP and disk I/O
// 2. **Library-First**: The cycle can be embedded and driven by any scheduler
// 3. **Store Follows Remote**: The state store is written only after the
//    provider confirmed the update

pub mod address;
pub mod config;
pub mod controller;
pub mod error;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use address::Address;
pub use config::{ProviderConfig, RecordConfig, RecordType, ResolverConfig, ResponseFormat, SyncConfig};
pub use controller::{CyclePhase, SyncController, SyncError, SyncEvent, SyncOutcome};
pub use error::{Error, Result};
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{AddressResolver, RecordReference, RecordUpdater, StateStore};
