//! In-process communicator with one thread per rank.

use std::{
    any::Any,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
};

use itertools::Itertools;

use super::Collectives;

type Slot = Option<Box<dyn Any + Send>>;

struct State {
    slots: Vec<Slot>,
    arrived: usize,
    generation: usize,
    // Rank whose closure panicked first.
    aborted: Option<usize>,
}

struct Shared {
    size: usize,
    state: Mutex<State>,
    wakeup: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until every rank has arrived.
    ///
    /// Panics if another rank panicked, so that no rank waits forever.
    fn wait(&self) {
        let mut state = self.lock();
        if let Some(rank) = state.aborted {
            drop(state);
            panic!("rank {} panicked", rank);
        }

        state.arrived += 1;
        if state.arrived == self.size {
            state.arrived = 0;
            state.generation += 1;
            self.wakeup.notify_all();
            return;
        }

        let generation = state.generation;
        while state.generation == generation && state.aborted.is_none() {
            state = self
                .wakeup
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if state.generation == generation {
            let rank = state.aborted;
            drop(state);
            panic!("rank {:?} panicked", rank);
        }
    }

    fn abort(&self, rank: usize) {
        let mut state = self.lock();
        state.aborted.get_or_insert(rank);
        self.wakeup.notify_all();
    }
}

/// Marks the communicator as aborted when a rank unwinds.
struct AbortOnPanic {
    rank: usize,
    shared: Arc<Shared>,
}

impl Drop for AbortOnPanic {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.shared.abort(self.rank);
        }
    }
}

/// A communicator whose ranks are threads of the current process.
///
/// Collectives are implemented with a shared slot table: every rank deposits its
/// contribution, waits for all ranks, reads all slots and waits again before the
/// slots can be reused. If one rank panics, the ranks waiting in a collective
/// panic as well and [ThreadComm::run] re-raises the first panic.
pub struct ThreadComm {
    rank: usize,
    size: usize,
    shared: Arc<Shared>,
}

impl ThreadComm {
    /// Run `f` on `size` ranks and return the results in rank order.
    pub fn run<F, R>(size: usize, f: F) -> Vec<R>
    where
        F: Fn(&ThreadComm) -> R + Sync,
        R: Send,
    {
        assert!(size > 0, "a communicator needs at least one rank");

        let shared = Arc::new(Shared {
            size,
            state: Mutex::new(State {
                slots: (0..size).map(|_| None).collect(),
                arrived: 0,
                generation: 0,
                aborted: None,
            }),
            wakeup: Condvar::new(),
        });

        let results = std::thread::scope(|scope| {
            let handles = (0..size)
                .map(|rank| {
                    let comm = ThreadComm {
                        rank,
                        size,
                        shared: Arc::clone(&shared),
                    };
                    let f = &f;
                    scope.spawn(move || {
                        let _guard = AbortOnPanic {
                            rank,
                            shared: Arc::clone(&comm.shared),
                        };
                        f(&comm)
                    })
                })
                .collect_vec();

            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect_vec()
        });

        let first = shared.lock().aborted;

        let mut panics = Vec::new();
        let mut values = Vec::with_capacity(size);
        for (rank, result) in results.into_iter().enumerate() {
            match result {
                Ok(value) => values.push(value),
                Err(payload) => panics.push((rank, payload)),
            }
        }

        if !panics.is_empty() {
            let index = panics
                .iter()
                .position(|&(rank, _)| Some(rank) == first)
                .unwrap_or(0);
            std::panic::resume_unwind(panics.swap_remove(index).1);
        }

        values
    }

    /// Every rank contributes `value` and receives all contributions in rank order.
    fn exchange<T: Clone + Send + 'static>(&self, value: T) -> Vec<T> {
        self.shared.lock().slots[self.rank] = Some(Box::new(value));

        self.shared.wait();

        let gathered = self
            .shared
            .lock()
            .slots
            .iter()
            .map(|slot| {
                slot.as_ref()
                    .and_then(|boxed| boxed.downcast_ref::<T>())
                    .cloned()
                    .expect("ranks entered different collectives")
            })
            .collect_vec();

        // Nobody may overwrite a slot before everybody has read it.
        self.shared.wait();

        gathered
    }
}

impl Collectives for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn all_gather_count(&self, value: usize) -> Vec<usize> {
        self.exchange(value)
    }

    fn all_gather_varcount_f64(&self, local: &[f64], counts: &[usize]) -> Vec<f64> {
        debug_assert_eq!(counts[self.rank], local.len());
        let gathered = self.exchange(local.to_vec());
        debug_assert!(gathered.iter().map(Vec::len).eq(counts.iter().copied()));
        gathered.concat()
    }

    fn all_gather_varcount_usize(&self, local: &[usize], counts: &[usize]) -> Vec<usize> {
        debug_assert_eq!(counts[self.rank], local.len());
        let gathered = self.exchange(local.to_vec());
        debug_assert!(gathered.iter().map(Vec::len).eq(counts.iter().copied()));
        gathered.concat()
    }

    fn all_reduce_sum(&self, value: u64) -> u64 {
        self.exchange(value).into_iter().sum()
    }

    fn all_reduce_and(&self, value: bool) -> bool {
        self.exchange(value).into_iter().all(|v| v)
    }
}
