//! C6: a base contract for stoppable work (§4.6).
//!
//! Concrete algorithms (Knuth-Bendix, Todd-Coxeter, ...) are written as
//! cooperative workers that poll for cancellation rather than inheriting
//! from a shared base type. The control-state half (`RunnerControl`,
//! polled via `stopped()`) is factored out from the "closed set of task
//! kinds" half: an algorithm implements `RunnerAlgorithm` and is wrapped
//! in a `Runner<T>`, which is what `Race` (C7) actually drives through the
//! `RunnerHandle` facade.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

/// The mutable control state a running algorithm polls. Shared (via
/// `Arc`) between the worker thread executing `run()` and whatever thread
/// calls `kill()` (typically `Race`).
#[derive(Debug)]
pub struct RunnerControl {
    started: AtomicBool,
    finished: AtomicBool,
    dead: AtomicBool,
    stopped_by_predicate: AtomicBool,
    deadline: RwLock<Option<Instant>>,
    predicate: RwLock<Option<std::sync::Arc<dyn Fn() -> bool + Send + Sync>>>,
    report_interval: Duration,
    last_report: Mutex<Instant>,
}

impl Default for RunnerControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunnerControl {
    pub fn new() -> Self {
        RunnerControl {
            started: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            dead: AtomicBool::new(false),
            stopped_by_predicate: AtomicBool::new(false),
            deadline: RwLock::new(None),
            predicate: RwLock::new(None),
            report_interval: Duration::from_millis(250),
            last_report: Mutex::new(Instant::now()),
        }
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    pub(crate) fn mark_started(&self) {
        self.started.store(true, Ordering::SeqCst);
        *self.last_report.lock().unwrap() = Instant::now();
    }

    pub(crate) fn set_deadline(&self, d: Option<Duration>) {
        *self.deadline.write().unwrap() = d.map(|d| Instant::now() + d);
    }

    pub(crate) fn set_predicate(
        &self,
        p: Option<std::sync::Arc<dyn Fn() -> bool + Send + Sync>>,
    ) {
        *self.predicate.write().unwrap() = p;
        self.stopped_by_predicate.store(false, Ordering::SeqCst);
    }

    /// Atomically marks the runner dead; it may be left in an invalid
    /// state after this (§4.6 "the runner may be left in an invalid
    /// state after kill").
    pub fn kill(&self) {
        self.dead.store(true, Ordering::SeqCst);
    }

    pub fn dead(&self) -> bool {
        self.dead.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Must only be called by the algorithm owning this control while it
    /// holds exclusive access (i.e. from inside its own `run_body`); must
    /// not be set while already stopped.
    pub fn set_finished(&self, v: bool) {
        self.finished.store(v, Ordering::SeqCst);
    }

    pub fn timed_out(&self) -> bool {
        match *self.deadline.read().unwrap() {
            Some(d) => Instant::now() >= d,
            None => false,
        }
    }

    pub fn stopped_by_predicate(&self) -> bool {
        self.stopped_by_predicate.load(Ordering::SeqCst)
    }

    /// `stopped() = timed_out() ∨ finished() ∨ dead() ∨ stopped_by_predicate`.
    pub fn stopped(&self) -> bool {
        if self.finished() || self.dead() || self.timed_out() {
            return true;
        }
        if let Some(p) = self.predicate.read().unwrap().as_ref() {
            if p() {
                self.stopped_by_predicate.store(true, Ordering::SeqCst);
                return true;
            }
        }
        false
    }

    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Returns true if at least `report_interval` has elapsed since the
    /// last time this returned true.
    pub fn report(&self) -> bool {
        let mut last = self.last_report.lock().unwrap();
        if last.elapsed() >= self.report_interval {
            *last = Instant::now();
            true
        } else {
            false
        }
    }
}

/// A concrete algorithm pollable by a `Runner`. `run_body` must poll
/// `ctl.stopped()` at least once per outer-loop iteration (§5: "each
/// new coset in Todd–Coxeter, each new rule in Knuth–Bendix, each new
/// orbit point in OrbitEngine") and call `ctl.set_finished(true)` just
/// before returning on successful completion.
pub trait RunnerAlgorithm: Send {
    fn run_body(&mut self, ctl: &RunnerControl);
}

/// Type-erased facade `Race` drives every task kind through (Design Notes
/// §9 "tagged variant with a uniform run/stopped? facade").
pub trait RunnerHandle: Send + Sync + Any {
    fn run(&self);
    fn run_for(&self, d: Duration);
    fn run_until(&self, predicate: std::sync::Arc<dyn Fn() -> bool + Send + Sync>);
    fn kill(&self);
    fn finished(&self) -> bool;
    fn dead(&self) -> bool;
    fn stopped(&self) -> bool;
    fn timed_out(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
}

/// Wraps a `RunnerAlgorithm` with its `RunnerControl`. The algorithm is
/// held behind a `Mutex` purely as the ownership mechanism that lets
/// `RunnerHandle::run` take `&self` (so `Race` can hold `Arc<dyn
/// RunnerHandle>`); exactly one thread ever locks it; per §5 this is
/// not a general-purpose concurrent data structure.
pub struct Runner<T: RunnerAlgorithm> {
    control: RunnerControl,
    algo: Mutex<T>,
}

impl<T: RunnerAlgorithm> Runner<T> {
    pub fn new(algo: T) -> Self {
        Runner {
            control: RunnerControl::new(),
            algo: Mutex::new(algo),
        }
    }

    pub fn control(&self) -> &RunnerControl {
        &self.control
    }

    /// Runs to exhaustion of `with_result`'s closure once the algorithm
    /// has stopped (whether by finishing, timeout, kill, or predicate).
    pub fn with_algorithm<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.algo.lock().unwrap();
        f(&guard)
    }
}

impl<T: RunnerAlgorithm + Send + Sync + 'static> RunnerHandle for Runner<T> {
    fn run(&self) {
        if self.control.dead() {
            return;
        }
        self.control.mark_started();
        self.control.set_deadline(None);
        let mut guard = self.algo.lock().unwrap();
        guard.run_body(&self.control);
    }

    fn run_for(&self, d: Duration) {
        if self.control.dead() {
            return;
        }
        self.control.mark_started();
        self.control.set_deadline(Some(d));
        {
            let mut guard = self.algo.lock().unwrap();
            guard.run_body(&self.control);
        }
        self.control.set_deadline(None);
    }

    fn run_until(&self, predicate: std::sync::Arc<dyn Fn() -> bool + Send + Sync>) {
        if self.control.dead() {
            return;
        }
        self.control.mark_started();
        self.control.set_predicate(Some(predicate));
        {
            let mut guard = self.algo.lock().unwrap();
            guard.run_body(&self.control);
        }
        self.control.set_predicate(None);
    }

    fn kill(&self) {
        self.control.kill();
    }

    fn finished(&self) -> bool {
        self.control.finished()
    }

    fn dead(&self) -> bool {
        self.control.dead()
    }

    fn stopped(&self) -> bool {
        self.control.stopped()
    }

    fn timed_out(&self) -> bool {
        self.control.timed_out()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        n: u32,
        target: u32,
    }

    impl RunnerAlgorithm for Counter {
        fn run_body(&mut self, ctl: &RunnerControl) {
            while self.n < self.target {
                if ctl.stopped() {
                    return;
                }
                self.n += 1;
            }
            ctl.set_finished(true);
        }
    }

    #[test]
    fn runs_to_completion() {
        let r = Runner::new(Counter { n: 0, target: 10 });
        RunnerHandle::run(&r);
        assert!(r.finished());
        assert_eq!(r.with_algorithm(|c| c.n), 10);
    }

    #[test]
    fn kill_stops_it() {
        struct Spinner;
        impl RunnerAlgorithm for Spinner {
            fn run_body(&mut self, ctl: &RunnerControl) {
                loop {
                    if ctl.stopped() {
                        return;
                    }
                }
            }
        }
        let r = Runner::new(Spinner);
        r.kill();
        RunnerHandle::run(&r);
        assert!(r.dead());
        assert!(!r.finished());
    }

    #[test]
    fn run_for_times_out() {
        struct Forever;
        impl RunnerAlgorithm for Forever {
            fn run_body(&mut self, ctl: &RunnerControl) {
                loop {
                    if ctl.stopped() {
                        return;
                    }
                }
            }
        }
        let r = Runner::new(Forever);
        // Bounded only by the 10ms deadline: if timeout enforcement were
        // broken this test would hang instead of failing cleanly.
        r.run_for(Duration::from_millis(10));
        assert!(!r.finished());
        assert!(!r.dead());
    }
}
