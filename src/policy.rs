//! Arm-selection policies that can be evaluated against a [`Problem`][crate::Problem].
//!
//! Policies see arms only by index and learn from the scalar reward the
//! problem returns. Because the problem caches each arm's reward per step,
//! several policies run side by side observe the same realization.

#[cfg(feature = "stochastic")]
use rand::rngs::StdRng;
#[cfg(feature = "stochastic")]
use rand::{Rng, SeedableRng};

use crate::TIEBREAK_EPS;

/// Common interface for stateful bandit policies.
///
/// # Example
///
/// ```rust
/// use bandidos::{BanditPolicy, Ucb1};
///
/// fn play<P: BanditPolicy>(policy: &mut P, n_arms: usize) {
///     if let Some(arm) = policy.select(n_arms) {
///         policy.update(arm, 1.0);
///     }
/// }
///
/// let mut ucb = Ucb1::default();
/// play(&mut ucb, 3);
/// ```
pub trait BanditPolicy {
    /// Short label used in evaluation reports.
    fn name(&self) -> &str;

    /// Pick an arm index in `0..n_arms`. Returns `None` only if `n_arms == 0`.
    fn select(&mut self, n_arms: usize) -> Option<usize>;

    /// Record the reward observed for `arm`.
    fn update(&mut self, arm: usize, reward: f64);
}

/// Running per-arm reward statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmStats {
    pub pulls: u64,
    pub reward_sum: f64,
}

impl ArmStats {
    pub fn mean(&self) -> f64 {
        if self.pulls == 0 {
            0.0
        } else {
            self.reward_sum / self.pulls as f64
        }
    }
}

fn ensure_len(stats: &mut Vec<ArmStats>, n_arms: usize) {
    if stats.len() < n_arms {
        stats.resize(n_arms, ArmStats::default());
    }
}

/// First arm (by index) that was never pulled.
fn first_unpulled(stats: &[ArmStats], n_arms: usize) -> Option<usize> {
    (0..n_arms).find(|&i| stats[i].pulls == 0)
}

/// Index of the max score; ties go to the lower index.
fn argmax_by<F: Fn(usize) -> f64>(n_arms: usize, score: F) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for i in 0..n_arms {
        let s = score(i);
        match best {
            Some((_, b)) if s <= b + TIEBREAK_EPS => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

/// Configuration for [`Ucb1`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ucb1Config {
    /// Multiplier on the confidence bonus `sqrt(2 ln t / n)`.
    pub exploration: f64,
}

impl Default for Ucb1Config {
    fn default() -> Self {
        Self { exploration: 1.0 }
    }
}

/// Deterministic UCB1.
///
/// Policy:
/// - Explore: the first arm (index order) with no pulls.
/// - Otherwise: argmax of `mean + c * sqrt(2 ln t / n)`, lower index on ties.
#[derive(Debug, Clone, Default)]
pub struct Ucb1 {
    cfg: Ucb1Config,
    stats: Vec<ArmStats>,
    total_pulls: u64,
}

impl Ucb1 {
    pub fn new(cfg: Ucb1Config) -> Self {
        Self {
            cfg,
            stats: Vec::new(),
            total_pulls: 0,
        }
    }

    pub fn stats(&self) -> &[ArmStats] {
        &self.stats
    }
}

impl BanditPolicy for Ucb1 {
    fn name(&self) -> &str {
        "ucb1"
    }

    fn select(&mut self, n_arms: usize) -> Option<usize> {
        if n_arms == 0 {
            return None;
        }
        ensure_len(&mut self.stats, n_arms);
        if let Some(i) = first_unpulled(&self.stats, n_arms) {
            return Some(i);
        }
        let ln_t = (self.total_pulls.max(1) as f64).ln();
        let c = self.cfg.exploration.max(0.0);
        let stats = &self.stats;
        argmax_by(n_arms, |i| {
            let s = stats[i];
            s.mean() + c * (2.0 * ln_t / s.pulls as f64).sqrt()
        })
    }

    fn update(&mut self, arm: usize, reward: f64) {
        ensure_len(&mut self.stats, arm + 1);
        let s = &mut self.stats[arm];
        s.pulls = s.pulls.saturating_add(1);
        s.reward_sum += reward;
        self.total_pulls = self.total_pulls.saturating_add(1);
    }
}

/// Configuration for [`EpsilonGreedy`].
#[cfg(feature = "stochastic")]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpsilonGreedyConfig {
    /// Probability of a uniformly random pull, clamped to `[0, 1]`.
    pub epsilon: f64,
    pub seed: u64,
}

#[cfg(feature = "stochastic")]
impl Default for EpsilonGreedyConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.1,
            seed: 0,
        }
    }
}

/// Seedable epsilon-greedy.
///
/// Policy:
/// - Explore: the first arm (index order) with no pulls.
/// - With probability `epsilon`: a uniformly random arm.
/// - Otherwise: the best empirical mean, lower index on ties.
#[cfg(feature = "stochastic")]
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    cfg: EpsilonGreedyConfig,
    stats: Vec<ArmStats>,
    rng: StdRng,
}

#[cfg(feature = "stochastic")]
impl EpsilonGreedy {
    pub fn new(cfg: EpsilonGreedyConfig) -> Self {
        Self {
            cfg,
            stats: Vec::new(),
            rng: StdRng::seed_from_u64(cfg.seed),
        }
    }

    pub fn stats(&self) -> &[ArmStats] {
        &self.stats
    }
}

#[cfg(feature = "stochastic")]
impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self::new(EpsilonGreedyConfig::default())
    }
}

#[cfg(feature = "stochastic")]
impl BanditPolicy for EpsilonGreedy {
    fn name(&self) -> &str {
        "epsilon-greedy"
    }

    fn select(&mut self, n_arms: usize) -> Option<usize> {
        if n_arms == 0 {
            return None;
        }
        ensure_len(&mut self.stats, n_arms);
        if let Some(i) = first_unpulled(&self.stats, n_arms) {
            return Some(i);
        }
        let eps = if self.cfg.epsilon.is_finite() {
            self.cfg.epsilon.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if self.rng.gen::<f64>() < eps {
            return Some(self.rng.gen_range(0..n_arms));
        }
        let stats = &self.stats;
        argmax_by(n_arms, |i| stats[i].mean())
    }

    fn update(&mut self, arm: usize, reward: f64) {
        ensure_len(&mut self.stats, arm + 1);
        let s = &mut self.stats[arm];
        s.pulls = s.pulls.saturating_add(1);
        s.reward_sum += reward;
    }
}
