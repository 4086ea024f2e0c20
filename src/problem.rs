//! Step-indexed bandit problem: owns the arms, the step cursor, the per-step
//! reward/density cache, and the history of completed steps.
//!
//! The cache is what lets several policies be evaluated against the *same*
//! realization: within one step each arm is sampled at most once, and every
//! later `sample` of that arm returns the cached value.
//!
//! Lifecycle:
//! - [`StepState::NotStarted`]: arms may be added.
//! - The first [`Problem::sample`] or [`Problem::advance_step`] moves the cursor
//!   to step 0 and freezes the arm set.
//! - Each `advance_step` fills in unsampled arms, appends a [`StepRecord`], clears
//!   the cache, and moves to the next step. There is no terminal state.

use tracing::{debug, trace};
use uuid::Uuid;

use crate::{arm_seed, Arm, ArmContext, ArmVariant, Density, Error, Horizon, Result};

/// Configuration for a [`Problem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProblemConfig {
    /// Number of steps the problem expects (must be > 0).
    pub horizon: u64,
    /// Base seed; each arm gets a seed derived from this and its index.
    pub seed: u64,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            horizon: 100,
            seed: 0,
        }
    }
}

impl ProblemConfig {
    pub fn horizon(mut self, horizon: u64) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Position of the step cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepState {
    NotStarted,
    InProgress(usize),
}

/// Everything recorded for one completed step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepRecord {
    /// One reward per arm, indexed by arm position.
    pub rewards: Vec<f64>,
    /// Densities of arms with the density capability, in the order they were sampled.
    pub densities: Vec<(usize, Density)>,
}

impl StepRecord {
    /// Highest recorded reward and the arm that produced it (lowest index on ties).
    pub fn best(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &r) in self.rewards.iter().enumerate() {
            if best.map(|(_, b)| r > b).unwrap_or(true) {
                best = Some((i, r));
            }
        }
        best
    }
}

/// One arm's density at one step, labelled for a rendering collaborator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DensityTrace {
    pub label: String,
    pub arm: usize,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

/// A multi-armed bandit problem with per-step sample caching.
pub struct Problem {
    id: Uuid,
    cfg: ProblemConfig,
    horizon: Horizon,
    arms: Vec<Box<dyn Arm>>,
    state: StepState,
    // Aligned to `arms`; `None` = not yet sampled this step.
    current_rewards: Vec<Option<f64>>,
    current_densities: Vec<(usize, Density)>,
    history: Vec<StepRecord>,
}

impl std::fmt::Debug for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Problem")
            .field("id", &self.id)
            .field("horizon", &self.horizon)
            .field("arms", &self.arms.len())
            .field("state", &self.state)
            .field("completed_steps", &self.history.len())
            .finish()
    }
}

impl Problem {
    /// Create a problem with `horizon` steps and the default seed.
    pub fn new(horizon: u64) -> Result<Self> {
        Self::with_config(ProblemConfig::default().horizon(horizon))
    }

    /// Create a problem from a full config. Fails if the horizon is zero.
    pub fn with_config(cfg: ProblemConfig) -> Result<Self> {
        let horizon = Horizon::new(cfg.horizon)?;
        let id = Uuid::new_v4();
        debug!(%id, %horizon, seed = cfg.seed, "created bandit problem");
        Ok(Self {
            id,
            cfg,
            horizon,
            arms: Vec::new(),
            state: StepState::NotStarted,
            current_rewards: Vec::new(),
            current_densities: Vec::new(),
            history: Vec::new(),
        })
    }

    /// Identifier for record keeping.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> ProblemConfig {
        self.cfg
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn num_arms(&self) -> usize {
        self.arms.len()
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    /// The in-progress step, or `None` before the problem started.
    pub fn current_step(&self) -> Option<usize> {
        match self.state {
            StepState::NotStarted => None,
            StepState::InProgress(step) => Some(step),
        }
    }

    pub fn arm(&self, index: usize) -> Option<&dyn Arm> {
        self.arms.get(index).map(|a| a.as_ref())
    }

    /// The arm at `index` as its concrete type, if it is an `A`.
    pub fn arm_as<A: Arm>(&self, index: usize) -> Option<&A> {
        self.arm(index)?.as_any().downcast_ref::<A>()
    }

    /// Build an `A` with this problem's horizon and append it.
    ///
    /// Fails with `InvalidState` once the problem has started, and propagates
    /// any error from [`ArmVariant::build`] without registering the arm.
    pub fn add_arm<A: ArmVariant>(&mut self, cfg: A::Config) -> Result<&A> {
        if let StepState::InProgress(step) = self.state {
            return Err(Error::InvalidState(format!(
                "arms cannot be added after the problem started (current step {step})"
            )));
        }
        let index = self.arms.len();
        let ctx = ArmContext {
            horizon: self.horizon,
            index,
            seed: arm_seed(self.cfg.seed, index),
        };
        let arm = A::build(ctx, cfg)?;
        check_horizon(&arm, index, self.horizon)?;
        self.arms.push(Box::new(arm));
        self.current_rewards.push(None);
        debug!(id = %self.id, arm = index, kind = std::any::type_name::<A>(), "registered arm");

        self.arm_as::<A>(index).ok_or_else(|| Error::ContractViolation {
            arm: index,
            reason: "registered arm has an unexpected type".to_string(),
        })
    }

    /// Reward of `arm` in the in-progress step, if it was sampled already.
    pub fn cached_reward(&self, arm: usize) -> Option<f64> {
        self.current_rewards.get(arm).copied().flatten()
    }

    /// Sample `arm` for the current step, at most once per step.
    ///
    /// Repeated calls within one step return the cached value. Starts the
    /// problem (step 0) if it has not started yet.
    pub fn sample(&mut self, arm: usize) -> Result<f64> {
        if arm >= self.arms.len() {
            return Err(Error::InvalidArgument(format!(
                "arm index {arm} out of range for {} arm(s)",
                self.arms.len()
            )));
        }
        self.ensure_started();
        if let Some(r) = self.cached_reward(arm) {
            return Ok(r);
        }
        self.sample_fresh(arm)
    }

    /// Complete the current step and move to the next one.
    ///
    /// Every arm not sampled during the step is sampled now, so the appended
    /// [`StepRecord`] always holds exactly one reward per arm.
    pub fn advance_step(&mut self) -> Result<()> {
        self.ensure_started();
        let step = self.step_index();

        for arm in 0..self.arms.len() {
            if self.current_rewards[arm].is_none() {
                self.sample_fresh(arm)?;
            }
        }

        let rewards = self
            .current_rewards
            .iter()
            .enumerate()
            .map(|(arm, r)| {
                r.ok_or_else(|| Error::InvalidState(format!("arm {arm} has no reward for step {step}")))
            })
            .collect::<Result<Vec<f64>>>()?;
        let densities = std::mem::take(&mut self.current_densities);
        self.history.push(StepRecord { rewards, densities });
        self.current_rewards.iter_mut().for_each(|r| *r = None);

        let next = step + 1;
        self.state = StepState::InProgress(next);
        if next as u64 == self.horizon.get() {
            debug!(id = %self.id, horizon = %self.horizon, "reached configured horizon");
        }
        debug!(id = %self.id, completed = step, next, "advanced step");
        self.begin_step(next);
        Ok(())
    }

    /// Number of completed steps (equal to `history().len()`).
    pub fn completed_steps(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    /// Labelled density traces for a completed `step`.
    ///
    /// One trace per arm that recorded a density that step, in sampling order.
    pub fn density_traces(&self, step: usize) -> Result<Vec<DensityTrace>> {
        let Some(current) = self.current_step() else {
            return Err(Error::InvalidState(
                "density traces need a started problem; call sample or advance_step first"
                    .to_string(),
            ));
        };
        if step >= current {
            return Err(Error::InvalidState(format!(
                "step {step} is not complete (current step {current})"
            )));
        }
        let record = self.history.get(step).ok_or_else(|| {
            Error::InvalidState(format!("no history recorded for step {step}"))
        })?;
        Ok(record
            .densities
            .iter()
            .map(|(arm, d)| DensityTrace {
                label: format!("Arm: {arm}"),
                arm: *arm,
                xs: d.xs.clone(),
                ys: d.ys.clone(),
            })
            .collect())
    }

    fn step_index(&self) -> usize {
        self.current_step().unwrap_or(0)
    }

    fn ensure_started(&mut self) {
        if self.state == StepState::NotStarted {
            self.state = StepState::InProgress(0);
            debug!(id = %self.id, arms = self.arms.len(), "problem started; arm set frozen");
            self.begin_step(0);
        }
    }

    fn begin_step(&mut self, step: usize) {
        for arm in self.arms.iter_mut() {
            if arm.has_step_hook() {
                arm.on_step_start(step);
            }
        }
    }

    // The only place an arm's `sample`/`density` is invoked. Everything is
    // validated before the cache is touched.
    fn sample_fresh(&mut self, index: usize) -> Result<f64> {
        let step = self.step_index();
        let arm = &mut self.arms[index];
        check_horizon(arm.as_ref(), index, self.horizon)?;

        let raw = arm.sample(step);
        let reward = raw
            .to_f64()
            .map_err(|found| Error::TypeMismatch { arm: index, found })?;

        let density = if arm.has_density() {
            let d = arm.density(step).ok_or_else(|| Error::ContractViolation {
                arm: index,
                reason: "declares the density capability but returned no density".to_string(),
            })?;
            d.validate()
                .map_err(|reason| Error::ContractViolation { arm: index, reason })?;
            Some(d)
        } else {
            None
        };

        trace!(id = %self.id, step, arm = index, reward, "sampled arm");
        self.current_rewards[index] = Some(reward);
        if let Some(d) = density {
            self.current_densities.push((index, d));
        }
        Ok(reward)
    }
}

// An arm's horizon is fixed at build time; re-checked on every fresh sample.
fn check_horizon<A: Arm + ?Sized>(arm: &A, index: usize, expected: Horizon) -> Result<()> {
    let reported = arm.horizon();
    if reported != expected {
        return Err(Error::ContractViolation {
            arm: index,
            reason: format!("arm reports horizon {reported} but was built for {expected}"),
        });
    }
    Ok(())
}
