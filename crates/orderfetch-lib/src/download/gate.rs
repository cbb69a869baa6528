use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Bounds how many fetches may run at once.
///
/// Waiters are admitted in the order they asked, since the underlying tokio
/// semaphore is fair. Every admission is counted so the batch can report the
/// highest concurrency it actually reached.
#[derive(Debug)]
pub struct AdmissionGate {
    limit: usize,
    semaphore: Arc<Semaphore>,
    gauge: Arc<InFlightGauge>,
}

#[derive(Debug, Default)]
struct InFlightGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

/// Held for as long as a task occupies a slot.
#[derive(Debug)]
pub struct Admission {
    _permit: OwnedSemaphorePermit,
    gauge: Arc<InFlightGauge>,
}

impl AdmissionGate {
    /// Limits above [`Semaphore::MAX_PERMITS`] are clamped to it.
    pub fn new(limit: usize) -> Self {
        let limit = limit.min(Semaphore::MAX_PERMITS);
        Self {
            limit,
            semaphore: Arc::new(Semaphore::new(limit)),
            gauge: Arc::new(InFlightGauge::default()),
        }
    }

    /// Suspends until a slot is free.
    pub async fn admit(&self) -> Result<Admission, AcquireError> {
        let permit = self.semaphore.clone().acquire_owned().await?;
        let now = self.gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.gauge.peak.fetch_max(now, Ordering::SeqCst);
        Ok(Admission {
            _permit: permit,
            gauge: self.gauge.clone(),
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn in_flight(&self) -> usize {
        self.gauge.current.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.gauge.peak.load(Ordering::SeqCst)
    }
}

impl Drop for Admission {
    fn drop(&mut self) {
        // Runs before `_permit` is released: the gauge never exceeds the limit.
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
    }
}
