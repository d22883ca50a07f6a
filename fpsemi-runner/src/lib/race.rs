//! C7: run several runners concurrently and keep whichever finishes first
//! (§4.7).
//!
//! One OS thread per runner, not a thread pool: these are long-running
//! CPU-bound algorithms, not short tasks.
//! The first runner to report `finished()` wins; every other runner is
//! sent `kill()` and its thread is joined before `run`/`run_for`/
//! `run_until` return.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::runner::{Runner, RunnerAlgorithm, RunnerHandle};

/// A set of runners competing to produce the same answer by different
/// methods (e.g. Todd–Coxeter via HLT vs. Felsch). Single-runner races
/// run synchronously on the calling thread; races don't need a second
/// thread to know who won.
#[derive(Default)]
pub struct Race {
    runners: Vec<Arc<dyn RunnerHandle>>,
    winner: Mutex<Option<usize>>,
}

impl Race {
    pub fn new() -> Self {
        Race {
            runners: Vec::new(),
            winner: Mutex::new(None),
        }
    }

    pub fn add(&mut self, runner: Arc<dyn RunnerHandle>) {
        self.runners.push(runner);
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn run(&self) {
        self.drive(|r| r.run());
    }

    pub fn run_for(&self, d: Duration) {
        self.drive(move |r| r.run_for(d));
    }

    pub fn run_until(&self, predicate: Arc<dyn Fn() -> bool + Send + Sync>) {
        self.drive(move |r| r.run_until(predicate.clone()));
    }

    /// Runs to completion (via `run`) and returns the winning runner, if
    /// any finished (every runner may have been killed externally before
    /// ever starting).
    pub fn winner(&self) -> Option<Arc<dyn RunnerHandle>> {
        self.run();
        self.winner
            .lock()
            .unwrap()
            .map(|i| self.runners[i].clone())
    }

    /// Finds the (sole, by construction) runner of algorithm type `T`,
    /// for reading back its result after the race. Downcasts through the
    /// `RunnerHandle` trait object, matching Design Notes §9's "tagged
    /// variant with a uniform facade".
    pub fn find_of_type<T: RunnerAlgorithm + 'static>(&self) -> Option<&Runner<T>> {
        self.runners
            .iter()
            .find_map(|r| r.as_any().downcast_ref::<Runner<T>>())
    }

    fn drive(&self, start: impl Fn(&Arc<dyn RunnerHandle>) + Send + Sync + 'static) {
        if self.runners.is_empty() {
            return;
        }
        if self.runners.len() == 1 {
            start(&self.runners[0]);
            if self.runners[0].finished() {
                *self.winner.lock().unwrap() = Some(0);
            }
            return;
        }

        let start = Arc::new(start);
        let (tx, rx) = mpsc::channel::<usize>();
        let mut handles = Vec::with_capacity(self.runners.len());
        for (i, runner) in self.runners.iter().enumerate() {
            let runner = runner.clone();
            let tx = tx.clone();
            let start = start.clone();
            handles.push(std::thread::spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(|| start(&runner)));
                if let Err(_) = result {
                    log::warn!("runner {i} panicked; treating it as lost");
                    return;
                }
                if runner.finished() {
                    // Receiver may already be gone if another runner won
                    // and the main thread moved on to killing/joining.
                    let _ = tx.send(i);
                }
            }));
        }
        drop(tx);

        let first = rx.recv().ok();
        if let Some(i) = first {
            *self.winner.lock().unwrap() = Some(i);
            for (j, runner) in self.runners.iter().enumerate() {
                if j != i {
                    runner.kill();
                }
            }
        }
        for h in handles {
            let _ = h.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RunnerControl;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FastCounter(Arc<AtomicU32>);
    impl RunnerAlgorithm for FastCounter {
        fn run_body(&mut self, ctl: &RunnerControl) {
            self.0.fetch_add(1, Ordering::SeqCst);
            ctl.set_finished(true);
        }
    }

    struct SlowSpinner;
    impl RunnerAlgorithm for SlowSpinner {
        fn run_body(&mut self, ctl: &RunnerControl) {
            loop {
                if ctl.stopped() {
                    return;
                }
                std::thread::yield_now();
            }
        }
    }

    #[test]
    fn fastest_runner_wins_and_kills_the_rest() {
        let hits = Arc::new(AtomicU32::new(0));
        let mut race = Race::new();
        race.add(Arc::new(Runner::new(FastCounter(hits.clone()))));
        race.add(Arc::new(Runner::new(SlowSpinner)));
        let winner = race.winner().expect("one runner should finish");
        assert!(winner.finished());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn single_runner_race_runs_synchronously() {
        let hits = Arc::new(AtomicU32::new(0));
        let mut race = Race::new();
        race.add(Arc::new(Runner::new(FastCounter(hits.clone()))));
        race.run();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn find_of_type_downcasts_back_to_the_concrete_runner() {
        let mut race = Race::new();
        let hits = Arc::new(AtomicU32::new(0));
        race.add(Arc::new(Runner::new(FastCounter(hits))));
        race.run();
        let found = race.find_of_type::<FastCounter>();
        assert!(found.is_some());
        assert!(race.find_of_type::<SlowSpinner>().is_none());
    }
}
