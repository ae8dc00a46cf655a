//! Buffers that record their own release, for checking engine ownership.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;

use super::filter::Filter;

#[derive(Default)]
pub(crate) struct Ledger {
    next_id: AtomicU32,
    log: Mutex<Vec<String>>,
    released: Mutex<Vec<u32>>,
}

impl Ledger {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn buffer(self: &Arc<Self>, value: i64) -> Tracked {
        Tracked {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            value,
            ledger: Arc::clone(self),
        }
    }

    pub(crate) fn record(&self, entry: String) {
        self.log.lock().push(entry);
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub(crate) fn released(&self) -> Vec<u32> {
        self.released.lock().clone()
    }

    /// Number of buffers handed out so far.
    pub(crate) fn next_id(&self) -> usize {
        self.next_id.load(Ordering::SeqCst) as usize
    }
}

#[derive(Debug)]
pub(crate) struct Tracked {
    pub(crate) id: u32,
    pub(crate) value: i64,
    ledger: Arc<Ledger>,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.ledger.record(format!("release:{}", self.id));
        self.ledger.released.lock().push(self.id);
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger").finish_non_exhaustive()
    }
}

pub(crate) struct AddOne {
    ledger: Arc<Ledger>,
}

impl AddOne {
    pub(crate) fn new(ledger: &Arc<Ledger>) -> Self {
        Self {
            ledger: Arc::clone(ledger),
        }
    }
}

impl Filter<Tracked> for AddOne {
    fn apply(&self, image: &Tracked) -> anyhow::Result<Tracked> {
        Ok(self.ledger.buffer(image.value + 1))
    }
}

pub(crate) struct Fail;

impl Filter<Tracked> for Fail {
    fn apply(&self, image: &Tracked) -> anyhow::Result<Tracked> {
        anyhow::bail!("stage refused buffer {}", image.id)
    }
}
