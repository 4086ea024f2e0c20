//! The arm contract: what a reward-generating unit must (and may) provide.
//!
//! An arm is built in two phases through [`ArmVariant::build`]: the problem
//! hands it an [`ArmContext`] (horizon, index, seed) plus a variant-specific
//! config, and gets back a fully initialized instance. Optional capabilities
//! are declared explicitly through [`Arm::capabilities`] rather than detected.
//!
//! ```compile_fail
//! // Only concrete `ArmVariant` types can be registered with a problem.
//! let mut p = bandidos::Problem::new(3).unwrap();
//! p.add_arm::<String>(());
//! ```

use std::any::Any;
use std::fmt;

use crate::{Error, Result};

/// Total number of steps a problem (and each of its arms) expects. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u64", into = "u64"))]
pub struct Horizon(u64);

impl Horizon {
    /// Validate a step count. Zero is rejected.
    pub fn new(steps: u64) -> Result<Self> {
        if steps == 0 {
            return Err(Error::InvalidArgument(
                "horizon must be a positive integer, got 0".to_string(),
            ));
        }
        Ok(Self(steps))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for Horizon {
    type Error = Error;

    fn try_from(steps: u64) -> Result<Self> {
        Self::new(steps)
    }
}

impl TryFrom<i64> for Horizon {
    type Error = Error;

    fn try_from(steps: i64) -> Result<Self> {
        if steps <= 0 {
            return Err(Error::InvalidArgument(format!(
                "horizon must be a positive integer, got {steps}"
            )));
        }
        Self::new(steps as u64)
    }
}

impl From<Horizon> for u64 {
    fn from(h: Horizon) -> u64 {
        h.0
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw value returned by [`Arm::sample`], before the problem coerces it to `f64`.
#[derive(Debug, Clone, PartialEq)]
pub enum Reward {
    Float(f64),
    Int(i64),
    /// Text is accepted if it parses as a float (surrounding whitespace ignored).
    Text(String),
}

impl Reward {
    /// Coerce to `f64`. Infinities and NaN are valid floats and pass through.
    ///
    /// Returns a short description of the offending value on failure, for
    /// inclusion in [`Error::TypeMismatch`].
    pub fn to_f64(&self) -> std::result::Result<f64, String> {
        match self {
            Reward::Float(x) => Ok(*x),
            Reward::Int(i) => Ok(*i as f64),
            Reward::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("text {s:?}")),
        }
    }
}

impl From<f64> for Reward {
    fn from(x: f64) -> Self {
        Reward::Float(x)
    }
}

impl From<f32> for Reward {
    fn from(x: f32) -> Self {
        Reward::Float(f64::from(x))
    }
}

impl From<i64> for Reward {
    fn from(i: i64) -> Self {
        Reward::Int(i)
    }
}

impl From<i32> for Reward {
    fn from(i: i32) -> Self {
        Reward::Int(i64::from(i))
    }
}

impl From<&str> for Reward {
    fn from(s: &str) -> Self {
        Reward::Text(s.to_string())
    }
}

impl From<String> for Reward {
    fn from(s: String) -> Self {
        Reward::Text(s)
    }
}

/// Density description of an arm's reward distribution at one step.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Density {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Density {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self { xs, ys }
    }

    /// Check the pair shape: `xs` and `ys` have equal lengths.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.xs.len() != self.ys.len() {
            return Err(format!(
                "density xs and ys differ in length ({} vs {})",
                self.xs.len(),
                self.ys.len()
            ));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

/// Optional capabilities an arm declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// The arm answers [`Arm::density`] with `Some`.
    pub density: bool,
    /// The arm wants [`Arm::on_step_start`] at every new step.
    pub step_hook: bool,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities {
        density: false,
        step_hook: false,
    };

    pub fn with_density(mut self) -> Self {
        self.density = true;
        self
    }

    pub fn with_step_hook(mut self) -> Self {
        self.step_hook = true;
        self
    }
}

/// What a problem hands an arm at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmContext {
    pub horizon: Horizon,
    /// Position the arm will occupy in the problem.
    pub index: usize,
    /// Seed for the arm's private random source.
    pub seed: u64,
}

impl ArmContext {
    /// Context for an arm built outside a problem (index 0).
    pub fn new(horizon: Horizon, seed: u64) -> Self {
        Self {
            horizon,
            index: 0,
            seed,
        }
    }
}

/// Upcast helper so problems can hand back concrete arm types.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A reward-generating unit sampled at most once per step.
pub trait Arm: AsAny + 'static {
    /// Steps this arm was built for. Never changes after construction.
    fn horizon(&self) -> Horizon;

    /// Draw the reward for `step`.
    fn sample(&mut self, step: usize) -> Reward;

    /// Declared optional capabilities. Re-read on every query, so an arm may
    /// change its answer over its lifetime.
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    /// Density for `step`. Arms declaring [`Capabilities::density`] must return `Some`.
    fn density(&self, _step: usize) -> Option<Density> {
        None
    }

    /// Called when a new step begins, if [`Capabilities::step_hook`] is declared.
    fn on_step_start(&mut self, _step: usize) {}

    fn has_density(&self) -> bool {
        self.capabilities().density
    }

    fn has_step_hook(&self) -> bool {
        self.capabilities().step_hook
    }
}

/// A concrete arm type that can be built from a horizon and its own config.
pub trait ArmVariant: Arm + Sized {
    type Config;

    /// Fully initialize an arm. Config validation failures are `InvalidArgument`.
    fn build(ctx: ArmContext, cfg: Self::Config) -> Result<Self>;
}
