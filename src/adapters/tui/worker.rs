use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use tokio::sync::mpsc;
use tracing::{debug, error};

struct Completion<K, T> {
    slot: K,
    generation: u64,
    outcome: Option<T>,
}

/// Runs data-access futures on the tokio runtime and hands their results back
/// to the UI loop through [`TaskRunner::drain`].
///
/// Each call to [`TaskRunner::run`] bumps the generation of its slot, so a
/// result that arrives after a newer request for the same slot is dropped.
pub(crate) struct TaskRunner<K, T> {
    tx: mpsc::UnboundedSender<Completion<K, T>>,
    rx: mpsc::UnboundedReceiver<Completion<K, T>>,
    generations: HashMap<K, u64>,
    pending: HashMap<K, u64>,
    failed: Vec<K>,
    in_flight: usize,
}

impl<K, T> TaskRunner<K, T>
where
    K: Copy + Eq + Hash + Debug + Send + 'static,
    T: Send + 'static,
{
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            generations: HashMap::new(),
            pending: HashMap::new(),
            failed: Vec::new(),
            in_flight: 0,
        }
    }

    fn next_generation(&mut self, slot: K) -> u64 {
        let entry = self.generations.entry(slot).or_insert(0);
        *entry += 1;
        *entry
    }

    pub(crate) fn run<F>(&mut self, slot: K, operation: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let generation = self.next_generation(slot);
        self.pending.insert(slot, generation);
        self.in_flight += 1;
        debug!("Dispatching task for {:?} (generation {})", slot, generation);

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = match tokio::spawn(operation).await {
                Ok(value) => Some(value),
                Err(e) => {
                    error!("Background task for {:?} failed: {}", slot, e);
                    None
                }
            };
            if tx
                .send(Completion {
                    slot,
                    generation,
                    outcome,
                })
                .is_err()
            {
                debug!("Task result for {:?} arrived after the UI shut down", slot);
            }
        });
    }

    /// Collects finished tasks whose result is still current for their slot.
    pub(crate) fn drain(&mut self) -> Vec<(K, T)> {
        let mut ready = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            let latest = self.generations.get(&completion.slot).copied();
            if latest != Some(completion.generation) {
                debug!(
                    "Dropping stale result for {:?} (generation {}, latest {:?})",
                    completion.slot, completion.generation, latest
                );
                continue;
            }
            self.pending.remove(&completion.slot);
            match completion.outcome {
                Some(outcome) => ready.push((completion.slot, outcome)),
                None => self.failed.push(completion.slot),
            }
        }
        ready
    }

    /// Slots whose current task ended without a result (it panicked or was
    /// aborted). Each slot is reported once.
    pub(crate) fn take_failed(&mut self) -> Vec<K> {
        std::mem::take(&mut self.failed)
    }

    /// Supersedes whatever is in flight for `slot`; its result will be
    /// dropped when it arrives.
    pub(crate) fn cancel(&mut self, slot: K) {
        if self.pending.remove(&slot).is_some() {
            let generation = self.next_generation(slot);
            debug!("Cancelled task for {:?} (now generation {})", slot, generation);
        }
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.in_flight > 0
    }

    pub(crate) fn is_pending(&self, slot: K) -> bool {
        self.pending.contains_key(&slot)
    }
}
