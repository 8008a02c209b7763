//! # Random Number Generation
//!
//! Every stochastic computation in the workspace draws from an explicit
//! [`CudRng`] handle passed in by the caller. Nothing reads global state, so
//! two runs started from the same seed produce identical output.
//!
//! Parallel work receives child seeds drawn sequentially from the parent
//! handle with [`CudRng::next_seed`] before any thread starts, which keeps
//! results independent of thread scheduling.
//!
//! ```rust
//! use cud_core::rng::CudRng;
//!
//! let mut rng = CudRng::from_seed(12345);
//! let shock = rng.gen_normal();
//!
//! let mut buffer = vec![0.0; 1000];
//! rng.fill_normal(&mut buffer);
//!
//! let mut child = rng.fork();
//! let _ = child.gen_uniform();
//! # let _ = shock;
//! ```

mod prng;

pub use prng::CudRng;
