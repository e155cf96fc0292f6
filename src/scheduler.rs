//! The cooperative multi-context scheduler (spec §4.3): one background
//! worker that advances a delta-encoded timer list and drains a bounded
//! processing queue, shared by every context's auto-heartbeat.
//!
//! The original core's "poll sockets, advance timers, drain queue"
//! worker loop collapses here to two of those three responsibilities —
//! socket readiness is `tokio`'s reactor's job once a transaction is
//! already in flight as its own task (see `fsm.rs`'s module doc). What
//! this scheduler still owns, literally, is timer expiry (heartbeats)
//! and a capacity-bounded processing queue whose overflow is an error
//! the caller can retry, exactly as spec §5 describes.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use pn_timer::TimerList;

/// Matches the original core's processing-queue capacity.
pub const QUEUE_CAPACITY: usize = 1024;

/// The poll/tick interval the background worker runs at.
const TICK: Duration = Duration::from_millis(100);

type TimerId = u64;
type Callback = Arc<dyn Fn() + Send + Sync>;

struct Inner {
    timers: TimerList<TimerId>,
    callbacks: std::collections::HashMap<TimerId, Callback>,
    queue: VecDeque<TimerId>,
    next_id: TimerId,
    last_tick: Instant,
}

/// The process-wide scheduler singleton (spec §4.3: "there is **one**
/// worker per process").
pub struct Scheduler {
    inner: Mutex<Inner>,
    wake: mpsc::UnboundedSender<()>,
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler processing queue is at capacity ({QUEUE_CAPACITY}); retry later")]
    QueueFull,
}

static GLOBAL: OnceLock<Arc<Scheduler>> = OnceLock::new();

impl Scheduler {
    /// Access the process-wide scheduler, starting its background
    /// worker task on first use.
    pub fn global() -> Arc<Scheduler> {
        GLOBAL
            .get_or_init(|| {
                let (wake_tx, wake_rx) = mpsc::unbounded_channel();
                let scheduler = Arc::new(Scheduler {
                    inner: Mutex::new(Inner {
                        timers: TimerList::new(),
                        callbacks: std::collections::HashMap::new(),
                        queue: VecDeque::new(),
                        next_id: 0,
                        last_tick: Instant::now(),
                    }),
                    wake: wake_tx,
                });
                scheduler.clone().spawn_worker(wake_rx);
                scheduler
            })
            .clone()
    }

    fn spawn_worker(self: Arc<Self>, mut wake_rx: mpsc::UnboundedReceiver<()>) {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(TICK) => {}
                    _ = wake_rx.recv() => {}
                }
                self.tick();
            }
        });
    }

    /// One worker-loop iteration: advance the timer list by the elapsed
    /// wall-clock delta, enqueue expired timers, then drain the queue by
    /// invoking (and clearing) each callback.
    fn tick(&self) {
        let to_run: Vec<Callback> = {
            let mut inner = self.inner.lock().expect("scheduler mutex poisoned");
            let now = Instant::now();
            let elapsed = now.duration_since(inner.last_tick).as_millis().max(1) as i64;
            inner.last_tick = now;

            for id in inner.timers.advance(elapsed) {
                if !inner.queue.contains(&id) && inner.queue.len() < QUEUE_CAPACITY {
                    inner.queue.push_back(id);
                }
            }

            let mut callbacks = Vec::new();
            while let Some(id) = inner.queue.pop_front() {
                if let Some(cb) = inner.callbacks.get(&id) {
                    callbacks.push(cb.clone());
                }
            }
            callbacks
        };

        for cb in to_run {
            tokio::spawn(async move { cb() });
        }
    }

    /// Register a recurring timer that fires `callback` every `period`
    /// until `cancel_timer` is called. Returns the timer's id.
    pub fn register(&self, period: Duration, callback: Callback) -> TimerId {
        let mut inner = self.inner.lock().expect("scheduler mutex poisoned");
        let id = inner.next_id;
        inner.next_id += 1;
        inner.callbacks.insert(id, callback);
        inner.timers.add(id, period.as_millis().max(1) as i64);
        drop(inner);
        let _ = self.wake.send(());
        id
    }

    /// Re-arm an existing timer for another `period` from now.
    pub fn rearm(&self, id: TimerId, period: Duration) {
        let mut inner = self.inner.lock().expect("scheduler mutex poisoned");
        if inner.callbacks.contains_key(&id) {
            inner.timers.add(id, period.as_millis().max(1) as i64);
        }
    }

    pub fn cancel_timer(&self, id: TimerId) {
        let mut inner = self.inner.lock().expect("scheduler mutex poisoned");
        inner.timers.remove(&id);
        inner.callbacks.remove(&id);
    }

    /// Directly enqueue `id` for immediate processing on the next tick,
    /// as `cancel(ctx)` does internally to wake the worker promptly.
    /// Returns an error if the queue is at capacity (spec §5).
    pub fn enqueue_now(&self, id: TimerId) -> Result<(), SchedulerError> {
        let mut inner = self.inner.lock().expect("scheduler mutex poisoned");
        if inner.queue.len() >= QUEUE_CAPACITY {
            return Err(SchedulerError::QueueFull);
        }
        if !inner.queue.contains(&id) {
            inner.queue.push_back(id);
        }
        drop(inner);
        let _ = self.wake.send(());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn registered_timer_fires_callback() {
        let scheduler = Arc::new(Scheduler {
            inner: Mutex::new(Inner {
                timers: TimerList::new(),
                callbacks: std::collections::HashMap::new(),
                queue: VecDeque::new(),
                next_id: 0,
                last_tick: Instant::now(),
            }),
            wake: mpsc::unbounded_channel().0,
        });

        let fired = Arc::new(AtomicUsize::new(0));
        let fired2 = fired.clone();
        let id = scheduler.register(Duration::from_millis(1), Arc::new(move || {
            fired2.fetch_add(1, Ordering::SeqCst);
        }));

        tokio::time::sleep(Duration::from_millis(5)).await;
        scheduler.tick();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(fired.load(Ordering::SeqCst) >= 1);
        scheduler.cancel_timer(id);
    }

    #[test]
    fn enqueue_now_respects_capacity() {
        let scheduler = Scheduler {
            inner: Mutex::new(Inner {
                timers: TimerList::new(),
                callbacks: std::collections::HashMap::new(),
                queue: (0..QUEUE_CAPACITY as u64).collect(),
                next_id: QUEUE_CAPACITY as u64,
                last_tick: Instant::now(),
            }),
            wake: mpsc::unbounded_channel().0,
        };
        assert!(matches!(
            scheduler.enqueue_now(99_999),
            Err(SchedulerError::QueueFull)
        ));
    }

    #[test]
    fn enqueue_now_deduplicates() {
        let scheduler = Scheduler {
            inner: Mutex::new(Inner {
                timers: TimerList::new(),
                callbacks: std::collections::HashMap::new(),
                queue: VecDeque::new(),
                next_id: 0,
                last_tick: Instant::now(),
            }),
            wake: mpsc::unbounded_channel().0,
        };
        scheduler.enqueue_now(1).unwrap();
        scheduler.enqueue_now(1).unwrap();
        assert_eq!(scheduler.inner.lock().unwrap().queue.len(), 1);
    }
}
