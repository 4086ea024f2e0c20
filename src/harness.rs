//! Side-by-side policy evaluation on a single problem.
//!
//! Every policy picks an arm each step and is paid from the problem's
//! per-step cache, so all policies face the identical realization. Regret is
//! measured against the best reward *recorded* for that step, which exists for
//! every arm because `advance_step` fills in unsampled arms.

use tracing::debug;

use crate::{BanditPolicy, Error, Problem, Result};

/// What one policy did over an evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolicyRun {
    pub name: String,
    /// Arm chosen at each step.
    pub choices: Vec<usize>,
    /// Reward received at each step.
    pub rewards: Vec<f64>,
    /// Running sum of `rewards`.
    pub cumulative_reward: Vec<f64>,
    /// Running sum of `best recorded reward - received reward`.
    pub cumulative_regret: Vec<f64>,
}

impl PolicyRun {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn total_reward(&self) -> f64 {
        self.cumulative_reward.last().copied().unwrap_or(0.0)
    }

    pub fn total_regret(&self) -> f64 {
        self.cumulative_regret.last().copied().unwrap_or(0.0)
    }
}

/// Run `policies` against `problem` for `steps` steps.
///
/// The problem continues from wherever its cursor is; each iteration ends with
/// one `advance_step`. Fails with `InvalidState` if the problem has no arms,
/// and propagates any arm error.
pub fn run_policies(
    problem: &mut Problem,
    policies: &mut [&mut dyn BanditPolicy],
    steps: usize,
) -> Result<Vec<PolicyRun>> {
    let n_arms = problem.num_arms();
    if n_arms == 0 {
        return Err(Error::InvalidState(
            "cannot evaluate policies on a problem with no arms".to_string(),
        ));
    }

    let mut runs: Vec<PolicyRun> = policies.iter().map(|p| PolicyRun::new(p.name())).collect();

    for _ in 0..steps {
        let mut picked: Vec<(usize, f64)> = Vec::with_capacity(policies.len());
        for policy in policies.iter_mut() {
            let arm = policy.select(n_arms).ok_or_else(|| {
                Error::InvalidState(format!("policy {} selected no arm", policy.name()))
            })?;
            if arm >= n_arms {
                return Err(Error::InvalidArgument(format!(
                    "policy {} selected arm {arm} of {n_arms}",
                    policy.name()
                )));
            }
            let reward = problem.sample(arm)?;
            policy.update(arm, reward);
            picked.push((arm, reward));
        }

        problem.advance_step()?;
        let best = problem
            .history()
            .last()
            .and_then(|r| r.best())
            .map(|(_, b)| b)
            .ok_or_else(|| Error::InvalidState("step record missing after advance".to_string()))?;

        for (run, (arm, reward)) in runs.iter_mut().zip(picked) {
            let prev_reward = run.total_reward();
            let prev_regret = run.total_regret();
            run.choices.push(arm);
            run.rewards.push(reward);
            run.cumulative_reward.push(prev_reward + reward);
            run.cumulative_regret.push(prev_regret + (best - reward));
        }
    }

    for run in &runs {
        debug!(
            problem = %problem.id(),
            policy = %run.name,
            steps,
            total_reward = run.total_reward(),
            total_regret = run.total_regret(),
            "policy evaluation finished"
        );
    }
    Ok(runs)
}
