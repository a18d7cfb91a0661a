//! Work Scheduler

use crate::pbrt::*;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

/// Shared state guarded by the scheduler's lock.
struct GateState<T> {
    /// Units not yet handed out.
    queue: VecDeque<T>,

    /// Units finished so far.
    done: usize,

    /// Workers currently inside a unit, parked or not.
    active: usize,

    /// Workers inside a unit that are waiting at a checkpoint.
    parked: usize,

    /// Workers that have not exited yet.
    workers: usize,

    /// Set while the caller wants a quiescent snapshot.
    paused: bool,
}

impl<T> GateState<T> {
    fn complete(&self) -> bool {
        self.queue.is_empty() && self.active == 0
    }

    fn finished(&self) -> bool {
        self.complete() || self.workers == 0
    }
}

/// A FIFO of work units consumed by a fixed pool of worker threads, with a
/// cooperative pause gate. While paused no unit is handed out and the
/// caller waits until every worker is between units (or parked at a
/// checkpoint) before reading shared output.
pub struct Scheduler<T> {
    state: Mutex<GateState<T>>,
    cond: Condvar,
    total: usize,
}

/// Keeps the active/worker counters right even if a work function panics.
struct UnitGuard<'a, T>(&'a Scheduler<T>);

impl<'a, T> Drop for UnitGuard<'a, T> {
    fn drop(&mut self) {
        self.0.finish_unit();
    }
}

struct WorkerGuard<'a, T>(&'a Scheduler<T>);

impl<'a, T> Drop for WorkerGuard<'a, T> {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        state.workers -= 1;
        self.0.cond.notify_all();
    }
}

impl<T> Scheduler<T> {
    /// Create a new scheduler holding the given work units.
    ///
    /// * `units` - Units in the order they should be handed out.
    pub fn new<I: IntoIterator<Item = T>>(units: I) -> Self {
        let queue: VecDeque<T> = units.into_iter().collect();
        let total = queue.len();
        Self {
            state: Mutex::new(GateState {
                queue,
                done: 0,
                active: 0,
                parked: 0,
                workers: 0,
                paused: false,
            }),
            cond: Condvar::new(),
            total,
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the total number of units.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns the fraction of units finished in [0, 1].
    pub fn progress(&self) -> Float {
        if self.total == 0 {
            1.0
        } else {
            self.lock().done as Float / self.total as Float
        }
    }

    /// Returns true when the queue is empty and no worker is inside a unit.
    pub fn complete(&self) -> bool {
        self.lock().complete()
    }

    /// Take the next unit, blocking while the scheduler is paused. Returns
    /// `None` once the queue is exhausted. Every returned unit must be
    /// matched by a call to `finish_unit()`.
    pub fn next_unit(&self) -> Option<T> {
        let mut state = self.lock();
        while state.paused {
            state = self.cond.wait(state).unwrap_or_else(|e| e.into_inner());
        }
        let unit = state.queue.pop_front()?;
        state.active += 1;
        Some(unit)
    }

    /// Mark the unit taken by the calling worker as finished.
    pub fn finish_unit(&self) {
        let mut state = self.lock();
        state.active -= 1;
        state.done += 1;
        self.cond.notify_all();
    }

    /// Called by workers inside long units at points where their partial
    /// output is consistent. Blocks for the duration of a pause.
    pub fn checkpoint(&self) {
        let mut state = self.lock();
        if !state.paused {
            return;
        }
        state.parked += 1;
        self.cond.notify_all();
        while state.paused {
            state = self.cond.wait(state).unwrap_or_else(|e| e.into_inner());
        }
        state.parked -= 1;
    }

    /// Stop handing out units and wait until every worker inside a unit is
    /// parked at a checkpoint.
    pub fn pause(&self) {
        let mut state = self.lock();
        state.paused = true;
        while state.active > state.parked {
            state = self.cond.wait(state).unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Let workers continue after a `pause()`.
    pub fn resume(&self) {
        let mut state = self.lock();
        state.paused = false;
        self.cond.notify_all();
    }
}

impl<T: Send> Scheduler<T> {
    /// Process every unit on `n_threads` workers and block until done.
    ///
    /// Each worker creates its state once with `init` and reuses it for all
    /// units it processes. Roughly every `interval` the calling thread pauses
    /// the workers, calls `display` with the current progress and resumes
    /// them. `display` is called one last time with the final progress after
    /// all workers have exited.
    ///
    /// * `n_threads` - Number of worker threads.
    /// * `init`      - Creates per-worker state given the worker index.
    /// * `work`      - Processes one unit.
    /// * `display`   - Called on the calling thread while workers are paused.
    /// * `interval`  - Time between `display` calls.
    pub fn run<S, I, W, D>(
        &self,
        n_threads: usize,
        init: I,
        work: W,
        mut display: D,
        interval: Duration,
    ) where
        I: Fn(usize) -> S + Sync,
        W: Fn(&mut S, T, &Self) + Sync,
        D: FnMut(Float),
    {
        let n_threads = n_threads.max(1);
        self.lock().workers = n_threads;
        debug!("Scheduling {} units on {} threads", self.total, n_threads);

        thread::scope(|scope| {
            for worker in 0..n_threads {
                let init = &init;
                let work = &work;
                scope.spawn(move || {
                    let _worker = WorkerGuard(self);
                    let mut state = init(worker);
                    while let Some(unit) = self.next_unit() {
                        let _unit = UnitGuard(self);
                        work(&mut state, unit, self);
                    }
                });
            }

            let mut deadline = Instant::now() + interval;
            let mut state = self.lock();
            while !state.finished() {
                let now = Instant::now();
                if now < deadline {
                    state = self
                        .cond
                        .wait_timeout(state, deadline - now)
                        .map(|(s, _)| s)
                        .unwrap_or_else(|e| e.into_inner().0);
                    continue;
                }
                drop(state);

                self.pause();
                display(self.progress());
                self.resume();

                deadline = Instant::now() + interval;
                state = self.lock();
            }
        });

        display(self.progress());
    }
}
