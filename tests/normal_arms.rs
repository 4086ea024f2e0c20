//! `NormalArm` wired through a `Problem`, plus policy evaluation on top.
#![cfg(feature = "stochastic")]

use bandidos::{
    run_policies, Arm, BanditPolicy, EpsilonGreedy, EpsilonGreedyConfig, NormalArm, NormalArmConfig,
    Problem, ProblemConfig, Ucb1,
};

fn two_arm_problem(seed: u64) -> Problem {
    let mut p = Problem::with_config(ProblemConfig::default().horizon(30).seed(seed)).unwrap();
    p.add_arm::<NormalArm>(NormalArmConfig::default()).unwrap();
    p.add_arm::<NormalArm>(NormalArmConfig::new(3.0, 0.5)).unwrap();
    p
}

#[test]
fn normal_density_trace_matches_pdf() {
    let mut p = Problem::new(10).unwrap();
    p.add_arm::<NormalArm>(NormalArmConfig::default()).unwrap();
    p.advance_step().unwrap();

    let traces = p.density_traces(0).unwrap();
    assert_eq!(traces.len(), 1);
    let arm = p.arm_as::<NormalArm>(0).unwrap();
    for (x, y) in traces[0].xs.iter().zip(&traces[0].ys) {
        assert!((arm.pdf_at(*x) - y).abs() < 1e-12);
    }
}

#[test]
fn added_arm_keeps_its_parameters() {
    let mut p = Problem::new(50).unwrap();
    let a = p.add_arm::<NormalArm>(NormalArmConfig::new(15.0, 0.2)).unwrap();
    assert_eq!(a.mean(), 15.0);
    assert_eq!(a.sd(), 0.2);
    assert_eq!(a.horizon().get(), 50);
}

#[test]
fn seeded_problems_replay_identically() {
    let run = |seed| {
        let mut p = two_arm_problem(seed);
        for _ in 0..10 {
            p.advance_step().unwrap();
        }
        p.history().to_vec()
    };
    assert_eq!(run(5), run(5));
    assert_ne!(run(5), run(6));
}

#[test]
fn policies_share_one_realization() {
    let mut p = two_arm_problem(9);
    let mut a = Ucb1::default();
    let mut b = EpsilonGreedy::new(EpsilonGreedyConfig {
        epsilon: 0.2,
        seed: 3,
    });
    let mut policies: [&mut dyn BanditPolicy; 2] = [&mut a, &mut b];
    let runs = run_policies(&mut p, &mut policies, 30).unwrap();

    assert_eq!(runs.len(), 2);
    assert_eq!(p.completed_steps(), 30);
    for run in &runs {
        for (step, (&arm, &reward)) in run.choices.iter().zip(&run.rewards).enumerate() {
            assert_eq!(p.history()[step].rewards[arm], reward);
        }
        assert!(run.total_regret() >= 0.0);
    }
}
