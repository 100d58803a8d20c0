use super::{Observer, TreeUpdate, UpdateSink};
use crate::error::StreamError;
use crate::search::lock;
use crossbeam_channel::{Receiver, select};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Lossy, paced delivery of search updates.
///
/// Workers overwrite a single pending slot; a delivery thread forwards whatever is
/// pending once per tick. When the search ends the last pending update is flushed.
/// After the sink fails once, the pacer closes and rejects further updates.
#[derive(Debug, Default)]
pub struct Pacer {
    latest: Mutex<Option<TreeUpdate>>,
    closed: AtomicBool,
    delivered: AtomicU64,
}

impl Pacer {
    /// Runs `body` with a pacer that delivers to `sink` every `interval`. The delivery
    /// thread is joined, and the final update flushed, before this returns.
    pub fn run<R>(
        interval: Duration,
        sink: &mut dyn UpdateSink,
        body: impl FnOnce(&Pacer) -> R,
    ) -> R {
        let pacer = Pacer::default();
        let (stop, stopped) = crossbeam_channel::bounded::<()>(0);
        thread::scope(|scope| {
            let shared = &pacer;
            scope.spawn(move || shared.deliver_loop(interval, sink, stopped));
            let result = body(&pacer);
            drop(stop);
            result
        })
    }

    /// Number of updates the sink accepted.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn deliver_loop(&self, interval: Duration, sink: &mut dyn UpdateSink, stopped: Receiver<()>) {
        let ticker = crossbeam_channel::tick(interval);
        loop {
            select! {
                recv(ticker) -> _ => {
                    if !self.flush(sink) {
                        return;
                    }
                }
                recv(stopped) -> _ => {
                    self.flush(sink);
                    return;
                }
            }
        }
    }

    /// Delivers the pending update, if any. Returns false once the sink has failed.
    fn flush(&self, sink: &mut dyn UpdateSink) -> bool {
        if self.is_closed() {
            return false;
        }
        let Some(update) = lock(&self.latest).take() else {
            return true;
        };
        match sink.deliver(&update) {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(err) => {
                debug!(error = %err, "update sink failed, closing pacer");
                self.closed.store(true, Ordering::Release);
                false
            }
        }
    }
}

impl Observer for Pacer {
    fn observe(&self, update: TreeUpdate) -> Result<(), StreamError> {
        if self.is_closed() {
            return Err(StreamError::Closed);
        }
        *lock(&self.latest) = Some(update);
        Ok(())
    }
}
