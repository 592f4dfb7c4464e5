//! Persistence seam for the correction ledger.

use crate::state::LedgerEntry;
use medscribe_core::{MedscribeError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Durable append-only storage for ledger entries.
///
/// The reconciler never performs its own durable storage; this trait is the
/// boundary to the persistence collaborator. Atomicity per record is that
/// collaborator's responsibility.
pub trait RecordStore {
    /// Append one ledger entry for a record.
    ///
    /// # Errors
    /// Returns an error when the underlying storage rejects the write. The
    /// reconciler reports this as a non-fatal [`crate::LedgerWrite::Failed`].
    fn append_ledger(&self, record_id: &str, entry: &LedgerEntry) -> Result<()>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn append_ledger(&self, record_id: &str, entry: &LedgerEntry) -> Result<()> {
        (**self).append_ledger(record_id, entry)
    }
}

/// In-memory store for tests and single-process use.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, Vec<LedgerEntry>>>,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, for exercising the degraded path.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Ledger entries stored for a record.
    #[must_use = "returns the stored ledger entries"]
    pub fn ledger(&self, record_id: &str) -> Vec<LedgerEntry> {
        self.entries
            .lock()
            .expect("ledger lock poisoned")
            .get(record_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl RecordStore for InMemoryStore {
    fn append_ledger(&self, record_id: &str, entry: &LedgerEntry) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MedscribeError::Storage(
                "in-memory store configured to fail".to_string(),
            ));
        }
        self.entries
            .lock()
            .expect("ledger lock poisoned")
            .entry(record_id.to_string())
            .or_default()
            .push(entry.clone());
        Ok(())
    }
}
