//! Rayon-based batch execution with deterministic seeding.
//!
//! Work of `total` items is cut into batches of `batch_size`. Every batch
//! receives its own [`CudRng`], seeded from the parent handle in batch order
//! before the parallel section starts. Batch results come back in batch
//! order, so the outcome only depends on the parent seed.

mod control;

pub use control::SimulationControl;

use cud_core::rng::CudRng;
use rayon::prelude::*;

/// Batch size for Monte Carlo work.
pub const DEFAULT_BATCH_SIZE: usize = 1_000;

/// Split of `total` items into fixed-size batches.
///
/// # Examples
/// ```
/// use cud_risk::parallel::BatchPlan;
///
/// let plan = BatchPlan::new(2_500, 1_000);
/// assert_eq!(plan.n_batches(), 3);
/// assert_eq!(plan.sizes().collect::<Vec<_>>(), vec![1_000, 1_000, 500]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchPlan {
    total: usize,
    batch_size: usize,
}

impl BatchPlan {
    /// Creates a plan. A zero batch size is treated as one.
    pub fn new(total: usize, batch_size: usize) -> Self {
        Self {
            total,
            batch_size: batch_size.max(1),
        }
    }

    /// Total number of items.
    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of batches.
    #[inline]
    pub fn n_batches(&self) -> usize {
        self.total.div_ceil(self.batch_size)
    }

    /// Size of each batch, in order. Only the last one may be short.
    pub fn sizes(&self) -> impl Iterator<Item = usize> {
        let (total, batch_size) = (self.total, self.batch_size);
        (0..self.n_batches()).map(move |i| batch_size.min(total - i * batch_size))
    }
}

/// Runs `worker` over every batch of `plan` in parallel.
///
/// `worker` receives the batch size and a generator private to the batch.
/// Batches that start after `control` reports a stop are not run; the
/// returned vector holds the completed batches only, in batch order.
pub fn run_seeded_batches<R, F>(
    plan: &BatchPlan,
    rng: &mut CudRng,
    control: &SimulationControl,
    worker: F,
) -> Vec<R>
where
    R: Send,
    F: Fn(usize, &mut CudRng) -> R + Sync + Send,
{
    let jobs: Vec<(usize, u64)> = plan.sizes().map(|size| (size, rng.next_seed())).collect();

    jobs.into_par_iter()
        .filter_map(|(size, seed)| {
            if control.should_stop() {
                return None;
            }
            let mut batch_rng = CudRng::from_seed(seed);
            Some(worker(size, &mut batch_rng))
        })
        .collect()
}
