use crossbeam::channel::{self, select};
use log::{trace, warn};
use std::collections::HashSet;
use std::fmt;
use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

/// A recurring task. Returning `ControlFlow::Break` unregisters it.
pub type Task = Box<dyn FnMut() -> ControlFlow<()> + Send + 'static>;

pub trait Scheduler: Send + Sync {
    /// Runs `task` every `interval` until it breaks or the returned timer is
    /// cancelled. The first run happens one interval after registration.
    fn every(&self, interval: Duration, task: Task) -> Timer;
}

/// Scoped handle to a recurring task. Dropping it cancels the task.
pub struct Timer {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Timer {
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Timer {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancels the task. Once this returns the task will not run again.
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Runs every task on a thread of its own, paced by a crossbeam tick channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl ThreadScheduler {
    pub fn new() -> Self {
        ThreadScheduler
    }
}

impl Scheduler for ThreadScheduler {
    fn every(&self, interval: Duration, mut task: Task) -> Timer {
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);

        let handle = thread::spawn(move || {
            let ticks = channel::tick(interval);
            loop {
                select! {
                    // A message or a disconnect both mean stop.
                    recv(stop_rx) -> _ => break,
                    recv(ticks) -> _ => {
                        if task().is_break() {
                            break;
                        }
                    }
                }
            }
            trace!("Timer thread exiting");
        });

        Timer::new(move || {
            drop(stop_tx);
            // A task that drops the last owner of its own timer must not join itself.
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                warn!("Timer thread panicked before it was cancelled");
            }
        })
    }
}

/// Runs registered tasks only when [`ManualScheduler::tick`] is called.
///
/// Useful for deterministic tests and for hosts that already own a frame loop.
/// Intervals are recorded but not enforced.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

#[derive(Default)]
struct ManualState {
    next_id: u64,
    tasks: Vec<ManualTask>,
    // Ids cancelled while their task was checked out by `tick`.
    cancelled: HashSet<u64>,
}

struct ManualTask {
    id: u64,
    interval: Duration,
    task: Task,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every registered task once and returns how many ran.
    ///
    /// A task that panics is unregistered, like a [`ThreadScheduler`] task
    /// whose thread died; the others keep running.
    pub fn tick(&self) -> usize {
        // Tasks run without the lock held so they may cancel or register timers.
        let mut batch = std::mem::take(&mut self.lock().tasks);
        let ran = batch.len();

        batch.retain_mut(|entry| {
            match panic::catch_unwind(AssertUnwindSafe(|| (entry.task)())) {
                Ok(flow) => flow.is_continue(),
                Err(_) => {
                    warn!("Manual timer task {} panicked and was unregistered", entry.id);
                    false
                }
            }
        });

        let mut state = self.lock();
        let cancelled = std::mem::take(&mut state.cancelled);
        batch.retain(|entry| !cancelled.contains(&entry.id));
        batch.append(&mut state.tasks);
        state.tasks = batch;
        ran
    }

    /// Runs `count` rounds of [`ManualScheduler::tick`].
    pub fn advance(&self, count: usize) {
        for _ in 0..count {
            self.tick();
        }
    }

    /// Number of registered tasks.
    pub fn pending(&self) -> usize {
        self.lock().tasks.len()
    }

    /// Intervals of the registered tasks, in registration order.
    pub fn intervals(&self) -> Vec<Duration> {
        self.lock().tasks.iter().map(|entry| entry.interval).collect()
    }

    fn cancel(&self, id: u64) {
        let mut state = self.lock();
        let before = state.tasks.len();
        state.tasks.retain(|entry| entry.id != id);
        if state.tasks.len() == before {
            state.cancelled.insert(id);
        }
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, interval: Duration, task: Task) -> Timer {
        let id = {
            let mut state = self.lock();
            let id = state.next_id;
            state.next_id += 1;
            state.tasks.push(ManualTask { id, interval, task });
            id
        };

        let scheduler = self.clone();
        Timer::new(move || scheduler.cancel(id))
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(counter: &Arc<AtomicUsize>) -> Task {
        let counter = counter.clone();
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
    }

    #[test]
    fn test_thread_scheduler_runs_until_cancelled() {
        let scheduler = ThreadScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let timer = scheduler.every(Duration::from_millis(5), counting_task(&counter));

        // Give the thread a moment to execute
        thread::sleep(Duration::from_millis(60));
        timer.cancel();

        let after_cancel = counter.load(Ordering::SeqCst);
        assert!(after_cancel > 0);

        thread::sleep(Duration::from_millis(30));
        assert_eq!(counter.load(Ordering::SeqCst), after_cancel);
    }

    #[test]
    fn test_thread_scheduler_dropping_timer_stops_task() {
        let scheduler = ThreadScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        drop(scheduler.every(Duration::from_millis(5), counting_task(&counter)));

        let after_drop = counter.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(counter.load(Ordering::SeqCst), after_drop);
    }

    #[test]
    fn test_manual_scheduler_only_runs_on_tick() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let _timer = scheduler.every(Duration::from_millis(80), counting_task(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        scheduler.advance(3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.intervals(), vec![Duration::from_millis(80)]);
    }

    #[test]
    fn test_manual_scheduler_drops_breaking_and_cancelled_tasks() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let _once = scheduler.every(Duration::ZERO, Box::new(|| ControlFlow::Break(())));
        let timer = scheduler.every(Duration::ZERO, counting_task(&counter));
        assert_eq!(scheduler.pending(), 2);

        assert_eq!(scheduler.tick(), 2);
        assert_eq!(scheduler.pending(), 1);

        timer.cancel();
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.tick(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_manual_scheduler_keeps_healthy_tasks_when_one_panics() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let _broken = scheduler.every(Duration::ZERO, Box::new(|| panic!("render failed")));
        let _healthy = scheduler.every(Duration::ZERO, counting_task(&counter));

        assert_eq!(scheduler.tick(), 2);
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(2);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
