//! Normal arms, two policies, one shared realization.
//!
//! Builds a problem with three normal arms, evaluates UCB1 and epsilon-greedy
//! side by side (both are paid from the same per-step cache), and prints the
//! step-0 density traces a plotting tool would consume.
//!
//! Run with:
//!   RUST_LOG=bandidos=debug cargo run --example normal_arms

use bandidos::{
    run_policies, BanditPolicy, EpsilonGreedy, EpsilonGreedyConfig, NormalArm, NormalArmConfig,
    Problem, ProblemConfig, Ucb1,
};
use tracing_subscriber::EnvFilter;

fn main() -> bandidos::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let horizon = 200;
    let mut problem = Problem::with_config(ProblemConfig::default().horizon(horizon).seed(7))?;
    for (mean, sd) in [(0.0, 1.0), (0.5, 1.0), (1.0, 2.0)] {
        problem.add_arm::<NormalArm>(NormalArmConfig::new(mean, sd))?;
    }

    let mut ucb = Ucb1::default();
    let mut eps = EpsilonGreedy::new(EpsilonGreedyConfig {
        epsilon: 0.1,
        seed: 1,
    });
    let mut policies: [&mut dyn BanditPolicy; 2] = [&mut ucb, &mut eps];
    let runs = run_policies(&mut problem, &mut policies, horizon as usize)?;

    println!("problem {} ({} steps, {} arms)", problem.id(), problem.completed_steps(), problem.num_arms());
    for run in &runs {
        let mut pulls = vec![0usize; problem.num_arms()];
        for &a in &run.choices {
            pulls[a] += 1;
        }
        println!(
            "  {:15} reward={:9.2}  regret={:9.2}  pulls={:?}",
            run.name,
            run.total_reward(),
            run.total_regret(),
            pulls
        );
    }

    println!("density traces at step 0:");
    for trace in problem.density_traces(0)? {
        let (peak_x, peak_y) = trace
            .xs
            .iter()
            .zip(&trace.ys)
            .fold((f64::NAN, f64::NEG_INFINITY), |acc, (&x, &y)| if y > acc.1 { (x, y) } else { acc });
        println!(
            "  {:8} points={:3}  x=[{:.2}, {:.2}]  peak=({peak_x:.2}, {peak_y:.3})",
            trace.label,
            trace.xs.len(),
            trace.xs.first().copied().unwrap_or(f64::NAN),
            trace.xs.last().copied().unwrap_or(f64::NAN),
        );
    }
    Ok(())
}
