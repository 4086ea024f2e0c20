//! `bandidos`: multi-armed bandit problem simulation with per-step reward caching.
//!
//! A [`Problem`] owns a fixed set of arms and a step cursor. Within a step each
//! arm is sampled **at most once**: the first [`Problem::sample`] of an arm draws
//! and caches its reward, every later call in the same step returns the cached
//! value. [`Problem::advance_step`] fills in any arm nobody sampled, records the
//! step, and clears the cache. Several policies can therefore be evaluated
//! against the identical realization of the same problem.
//!
//! **Arms** implement [`Arm`] (sampling plus declared optional capabilities:
//! density traces and a step-start hook) and [`ArmVariant`] (two-phase
//! construction from an [`ArmContext`] and a variant-specific config). Each arm
//! receives its own seed, so problems are reproducible end to end.
//!
//! **Built-ins:**
//! - (feature `stochastic`, default) [`NormalArm`]: stationary normal rewards.
//! - [`Ucb1`] and (feature `stochastic`) [`EpsilonGreedy`] policies.
//! - [`run_policies`]: side-by-side evaluation with cumulative reward and regret.
//!
//! **Non-goals:**
//! - No plotting. [`Problem::density_traces`] hands labelled `(xs, ys)` pairs to
//!   whatever renders them.
//! - No multi-run orchestration and no persistence (enable `serde` and store
//!   [`StepRecord`]s yourself).
//! - Not thread-safe by design: one caller drives one problem.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "stochastic")]
//! # fn main() -> bandidos::Result<()> {
//! use bandidos::{NormalArm, NormalArmConfig, Problem};
//!
//! let mut p = Problem::new(50)?;
//! p.add_arm::<NormalArm>(NormalArmConfig::new(15.0, 0.2))?;
//! p.add_arm::<NormalArm>(NormalArmConfig::default())?;
//!
//! let r = p.sample(0)?;
//! assert_eq!(p.sample(0)?, r); // cached for this step
//! p.advance_step()?;
//! assert_eq!(p.history()[0].rewards[0], r);
//! assert_eq!(p.density_traces(0)?.len(), 2);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "stochastic"))]
//! # fn main() {}
//! ```

/// Epsilon used for floating-point tie-breaking in policy scoring.
const TIEBREAK_EPS: f64 = 1e-12;

mod error;
pub use error::*;

mod arm;
pub use arm::*;

mod stable_hash;
pub use stable_hash::*;

mod problem;
pub use problem::*;

#[cfg(feature = "stochastic")]
mod normal;
#[cfg(feature = "stochastic")]
pub use normal::*;

mod policy;
pub use policy::*;

mod harness;
pub use harness::*;

pub const BANDIDOS_VERSION: &str = env!("CARGO_PKG_VERSION");
