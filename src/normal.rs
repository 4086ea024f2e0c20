//! Stationary normal-distribution arm.
//!
//! Samples come from the arm's own seeded `StdRng`, so a problem built with
//! the same seed produces the same realizations.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use statrs::distribution::{Continuous, ContinuousCDF, Normal as NormalDensity};

use crate::{Arm, ArmContext, ArmVariant, Capabilities, Density, Error, Horizon, Result, Reward};

/// Points in the precomputed density trace.
const DENSITY_POINTS: usize = 100;

/// Configuration for [`NormalArm`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalArmConfig {
    pub mean: f64,
    /// Standard deviation (must be > 0).
    pub sd: f64,
}

impl Default for NormalArmConfig {
    fn default() -> Self {
        Self { mean: 0.0, sd: 1.0 }
    }
}

impl NormalArmConfig {
    pub fn new(mean: f64, sd: f64) -> Self {
        Self { mean, sd }
    }

    pub fn mean(mut self, mean: f64) -> Self {
        self.mean = mean;
        self
    }

    pub fn sd(mut self, sd: f64) -> Self {
        self.sd = sd;
        self
    }
}

/// Arm whose rewards are `Normal(mean, sd)` at every step.
#[derive(Debug, Clone)]
pub struct NormalArm {
    horizon: Horizon,
    cfg: NormalArmConfig,
    dist: Normal<f64>,
    pdf: NormalDensity,
    rng: StdRng,
    // Stationary, so the trace is computed once at build time.
    density: Density,
}

impl NormalArm {
    pub fn mean(&self) -> f64 {
        self.cfg.mean
    }

    pub fn sd(&self) -> f64 {
        self.cfg.sd
    }

    /// Normal probability density at `x`.
    pub fn pdf_at(&self, x: f64) -> f64 {
        self.pdf.pdf(x)
    }
}

impl ArmVariant for NormalArm {
    type Config = NormalArmConfig;

    fn build(ctx: ArmContext, cfg: NormalArmConfig) -> Result<Self> {
        if !cfg.mean.is_finite() {
            return Err(Error::InvalidArgument(format!(
                "normal arm mean must be finite, got {}",
                cfg.mean
            )));
        }
        if !(cfg.sd.is_finite() && cfg.sd > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "normal arm standard deviation must be finite and > 0, got {}",
                cfg.sd
            )));
        }
        let dist = Normal::new(cfg.mean, cfg.sd)
            .map_err(|e| Error::InvalidArgument(format!("normal arm: {e}")))?;
        let pdf = NormalDensity::new(cfg.mean, cfg.sd)
            .map_err(|e| Error::InvalidArgument(format!("normal arm density: {e}")))?;

        // 100 points between the 1st and 99th percentile.
        let lo = pdf.inverse_cdf(0.01);
        let hi = pdf.inverse_cdf(0.99);
        let dx = (hi - lo) / (DENSITY_POINTS - 1) as f64;
        let xs: Vec<f64> = (0..DENSITY_POINTS).map(|i| lo + dx * i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| pdf.pdf(x)).collect();

        Ok(Self {
            horizon: ctx.horizon,
            cfg,
            dist,
            pdf,
            rng: StdRng::seed_from_u64(ctx.seed),
            density: Density::new(xs, ys),
        })
    }
}

impl Arm for NormalArm {
    fn horizon(&self) -> Horizon {
        self.horizon
    }

    fn sample(&mut self, _step: usize) -> Reward {
        Reward::Float(self.dist.sample(&mut self.rng))
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default().with_density()
    }

    fn density(&self, _step: usize) -> Option<Density> {
        Some(self.density.clone())
    }
}
