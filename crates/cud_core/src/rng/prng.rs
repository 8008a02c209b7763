//! Seeded pseudo-random source wrapping `rand::rngs::StdRng`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, StandardNormal};

use crate::types::AnalyticsError;

/// Explicit random-source handle.
///
/// # Examples
///
/// ```rust
/// use cud_core::rng::CudRng;
///
/// let mut a = CudRng::from_seed(7);
/// let mut b = CudRng::from_seed(7);
/// assert_eq!(a.gen_normal(), b.gen_normal());
/// assert_eq!(a.seed(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct CudRng {
    inner: StdRng,
    seed: u64,
}

impl CudRng {
    /// Creates a new handle initialised with the given seed.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Returns the seed used for initialisation.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in [0, 1).
    #[inline]
    pub fn gen_uniform(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Standard normal variate (Ziggurat via `rand_distr::StandardNormal`).
    #[inline]
    pub fn gen_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Fills the buffer with uniform values in [0, 1).
    #[inline]
    pub fn fill_uniform(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = self.inner.gen();
        }
    }

    /// Fills the buffer with standard normal variates.
    #[inline]
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.inner);
        }
    }

    /// Draws `count` values from Normal(`mean`, `std_dev`).
    ///
    /// # Errors
    /// `AnalyticsError::InvalidParameter` if `std_dev` is negative or not
    /// finite.
    ///
    /// ```rust
    /// use cud_core::rng::CudRng;
    ///
    /// let mut rng = CudRng::from_seed(1);
    /// let sample = rng.sample_normal(100.0, 0.0, 3).unwrap();
    /// assert_eq!(sample, vec![100.0, 100.0, 100.0]);
    /// assert!(rng.sample_normal(0.0, -1.0, 3).is_err());
    /// ```
    pub fn sample_normal(
        &mut self,
        mean: f64,
        std_dev: f64,
        count: usize,
    ) -> Result<Vec<f64>, AnalyticsError> {
        let dist = Normal::new(mean, std_dev).map_err(|_| {
            AnalyticsError::invalid_parameter("std_dev", std_dev, "must be finite and non-negative")
        })?;
        Ok((0..count).map(|_| dist.sample(&mut self.inner)).collect())
    }

    /// Draws a fresh 64-bit seed for a child generator.
    #[inline]
    pub fn next_seed(&mut self) -> u64 {
        self.inner.gen()
    }

    /// Child handle seeded from this one. Advances the parent.
    #[inline]
    pub fn fork(&mut self) -> Self {
        Self::from_seed(self.next_seed())
    }
}
