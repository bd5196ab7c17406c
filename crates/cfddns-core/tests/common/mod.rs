//! Test doubles and common utilities for sync cycle contract tests
//!
//! Every double counts its calls so tests can assert not only on results
//! but on which collaborators were (not) touched. Clones share counters.

#![allow(dead_code)]

use cfddns_core::error::{Error, Result};
use cfddns_core::traits::{AddressResolver, RecordReference, RecordUpdater, StateStore};
use cfddns_core::{Address, MemoryStateStore, SyncController};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A resolver that replays a script of results, one per call
#[derive(Clone, Default)]
pub struct ScriptedResolver {
    script: Arc<Mutex<VecDeque<std::result::Result<Address, String>>>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedResolver {
    /// Resolver that returns `address` once
    pub fn returning(address: &str) -> Self {
        let resolver = Self::default();
        resolver.push_ok(address);
        resolver
    }

    /// Resolver that fails once with `message`
    pub fn failing(message: &str) -> Self {
        let resolver = Self::default();
        resolver.push_err(message);
        resolver
    }

    /// Queue a successful resolution
    pub fn push_ok(&self, address: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(Address::from(address)));
    }

    /// Queue a failed resolution
    pub fn push_err(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Get the number of times resolve_current_address() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AddressResolver for ScriptedResolver {
    async fn resolve_current_address(&self) -> Result<Address> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(address)) => Ok(address),
            Some(Err(message)) => Err(Error::resolution(message)),
            None => Err(Error::resolution("resolver script exhausted")),
        }
    }

    fn resolver_name(&self) -> &'static str {
        "scripted"
    }
}

/// An updater that records every call and can be told to fail
#[derive(Clone, Default)]
pub struct RecordingUpdater {
    applied: Arc<Mutex<Vec<(RecordReference, Address)>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl RecordingUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updater whose calls fail with `message`
    pub fn failing(message: &str) -> Self {
        let updater = Self::default();
        updater.set_failure(Some(message));
        updater
    }

    /// Make subsequent calls fail (`Some`) or succeed (`None`)
    pub fn set_failure(&self, message: Option<&str>) {
        *self.failure.lock().unwrap() = message.map(str::to_string);
    }

    /// Get the number of times apply_address() was called
    pub fn call_count(&self) -> usize {
        self.applied.lock().unwrap().len()
    }

    /// Addresses passed to apply_address(), in call order
    pub fn applied_addresses(&self) -> Vec<String> {
        self.applied
            .lock()
            .unwrap()
            .iter()
            .map(|(_, address)| address.to_string())
            .collect()
    }

    /// Records passed to apply_address(), in call order
    pub fn applied_records(&self) -> Vec<RecordReference> {
        self.applied
            .lock()
            .unwrap()
            .iter()
            .map(|(record, _)| record.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl RecordUpdater for RecordingUpdater {
    async fn apply_address(&self, record: &RecordReference, address: &Address) -> Result<()> {
        self.applied
            .lock()
            .unwrap()
            .push((record.clone(), address.clone()));

        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(Error::update_failed("recording", message.clone())),
            None => Ok(()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// A memory-backed state store that counts calls and can be told to fail
#[derive(Clone, Default)]
pub struct CountingStateStore {
    inner: MemoryStateStore,
    read_count: Arc<AtomicUsize>,
    write_count: Arc<AtomicUsize>,
    fail_reads: Arc<Mutex<bool>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl CountingStateStore {
    /// Store with no prior state
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store already holding `address`
    pub fn with_address(address: &str) -> Self {
        Self {
            inner: MemoryStateStore::with_address(address),
            ..Self::default()
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    /// Get the number of times read_last_address() was called
    pub fn read_count(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }

    /// Get the number of times write_last_address() was called
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Stored value as a plain string
    pub async fn stored(&self) -> Option<String> {
        self.inner.snapshot().await.map(Address::into_inner)
    }
}

#[async_trait::async_trait]
impl StateStore for CountingStateStore {
    async fn read_last_address(&self) -> Result<Option<Address>> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        if *self.fail_reads.lock().unwrap() {
            return Err(Error::state_store("permission denied"));
        }
        self.inner.read_last_address().await
    }

    async fn write_last_address(&self, address: &Address) -> Result<()> {
        self.write_count.fetch_add(1, Ordering::SeqCst);
        if *self.fail_writes.lock().unwrap() {
            return Err(Error::state_store("no space left on device"));
        }
        self.inner.write_last_address(address).await
    }

    fn describe(&self) -> String {
        "counting".to_string()
    }
}

/// The record every contract test syncs
pub fn test_record() -> RecordReference {
    RecordReference::new("zone-123", "record-456", "*.example.com")
}

/// Build a controller around clones of the given doubles
pub fn controller(
    resolver: &ScriptedResolver,
    updater: &RecordingUpdater,
    store: &CountingStateStore,
) -> SyncController {
    SyncController::new(
        Box::new(resolver.clone()),
        Box::new(updater.clone()),
        Box::new(store.clone()),
        test_record(),
    )
}
