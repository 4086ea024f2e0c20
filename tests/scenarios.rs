//! End-to-end lifecycle scenarios for `Problem`.

use std::cell::RefCell;
use std::rc::Rc;

use bandidos::{
    Arm, ArmContext, ArmVariant, Capabilities, Density, Error, Horizon, Problem, ProblemConfig,
    Reward, StepState,
};

/// Always returns 4.
struct MockArm {
    horizon: Horizon,
}

impl Arm for MockArm {
    fn horizon(&self) -> Horizon {
        self.horizon
    }
    fn sample(&mut self, _step: usize) -> Reward {
        4.into()
    }
}

impl ArmVariant for MockArm {
    type Config = ();
    fn build(ctx: ArmContext, _: ()) -> bandidos::Result<Self> {
        Ok(Self {
            horizon: ctx.horizon,
        })
    }
}

/// Mean drifts by `drift` at every step start; density reflects the current mean.
struct DriftingArm {
    horizon: Horizon,
    mean: f64,
    drift: f64,
    log: Rc<RefCell<Vec<usize>>>,
}

impl Arm for DriftingArm {
    fn horizon(&self) -> Horizon {
        self.horizon
    }
    fn sample(&mut self, _step: usize) -> Reward {
        self.mean.into()
    }
    fn capabilities(&self) -> Capabilities {
        Capabilities::default().with_density().with_step_hook()
    }
    fn density(&self, _step: usize) -> Option<Density> {
        Some(Density::new(vec![self.mean], vec![1.0]))
    }
    fn on_step_start(&mut self, step: usize) {
        self.log.borrow_mut().push(step);
        if step > 0 {
            self.mean += self.drift;
        }
    }
}

impl ArmVariant for DriftingArm {
    type Config = (f64, f64, Rc<RefCell<Vec<usize>>>);
    fn build(ctx: ArmContext, (mean, drift, log): Self::Config) -> bandidos::Result<Self> {
        Ok(Self {
            horizon: ctx.horizon,
            mean,
            drift,
            log,
        })
    }
}

/// Records the seed it was built with.
struct SeedEcho {
    horizon: Horizon,
    seed: u64,
    index: usize,
}

impl Arm for SeedEcho {
    fn horizon(&self) -> Horizon {
        self.horizon
    }
    fn sample(&mut self, step: usize) -> Reward {
        Reward::Float((self.seed % 1_000) as f64 + step as f64)
    }
}

impl ArmVariant for SeedEcho {
    type Config = ();
    fn build(ctx: ArmContext, _: ()) -> bandidos::Result<Self> {
        Ok(Self {
            horizon: ctx.horizon,
            seed: ctx.seed,
            index: ctx.index,
        })
    }
}

/// Rejects its config.
struct Picky;

impl Arm for Picky {
    fn horizon(&self) -> Horizon {
        Horizon::new(1).unwrap()
    }
    fn sample(&mut self, _step: usize) -> Reward {
        0.into()
    }
}

impl ArmVariant for Picky {
    type Config = i64;
    fn build(_ctx: ArmContext, n: i64) -> bandidos::Result<Self> {
        Err(Error::InvalidArgument(format!("picky arm refuses {n}")))
    }
}

#[test]
fn mock_arm_returns_four_for_whole_step() {
    let mut p = Problem::new(10).unwrap();
    let a = p.add_arm::<MockArm>(()).unwrap();
    assert_eq!(a.horizon().get(), 10);
    for _ in 0..5 {
        assert_eq!(p.sample(0).unwrap(), 4.0);
    }
}

#[test]
fn construction_validation() {
    assert!(matches!(Problem::new(0), Err(Error::InvalidArgument(_))));
    assert!(matches!(
        Horizon::try_from(-1i64),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        Problem::with_config(ProblemConfig::default().horizon(0)),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn problems_get_distinct_ids() {
    let a = Problem::new(3).unwrap();
    let b = Problem::new(3).unwrap();
    assert_ne!(a.id(), b.id());
}

#[test]
fn failed_build_registers_nothing() {
    let mut p = Problem::new(3).unwrap();
    assert!(matches!(
        p.add_arm::<Picky>(7),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(p.num_arms(), 0);
    assert_eq!(p.state(), StepState::NotStarted);
}

#[test]
fn lifecycle_transitions() {
    let mut p = Problem::new(3).unwrap();
    assert_eq!(p.state(), StepState::NotStarted);
    assert_eq!(p.current_step(), None);
    p.add_arm::<MockArm>(()).unwrap();

    p.sample(0).unwrap();
    assert_eq!(p.state(), StepState::InProgress(0));
    assert_eq!(p.completed_steps(), 0);

    p.advance_step().unwrap();
    assert_eq!(p.state(), StepState::InProgress(1));
    assert_eq!(p.completed_steps(), 1);
    assert_eq!(p.history().len(), 1);
}

#[test]
fn step_hook_runs_at_every_step_start() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut p = Problem::new(5).unwrap();
    p.add_arm::<DriftingArm>((1.0, 0.5, log.clone())).unwrap();
    assert!(log.borrow().is_empty(), "no hook before start");

    assert_eq!(p.sample(0).unwrap(), 1.0);
    assert_eq!(*log.borrow(), vec![0]);

    p.advance_step().unwrap();
    assert_eq!(*log.borrow(), vec![0, 1]);
    assert_eq!(p.sample(0).unwrap(), 1.5);

    p.advance_step().unwrap();
    p.advance_step().unwrap();
    assert_eq!(*log.borrow(), vec![0, 1, 2, 3]);
    let rewards: Vec<f64> = p.history().iter().map(|r| r.rewards[0]).collect();
    assert_eq!(rewards, vec![1.0, 1.5, 2.0]);
}

#[test]
fn density_traces_for_every_completed_step() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut p = Problem::new(5).unwrap();
    p.add_arm::<DriftingArm>((0.0, 1.0, log.clone())).unwrap();
    p.add_arm::<MockArm>(()).unwrap();
    for _ in 0..3 {
        p.advance_step().unwrap();
    }
    for step in 0..3 {
        let traces = p.density_traces(step).unwrap();
        assert_eq!(traces.len(), 1, "only the arm with a density contributes");
        assert_eq!(traces[0].arm, 0);
        assert_eq!(traces[0].label, "Arm: 0");
        assert_eq!(traces[0].xs, vec![step as f64]);
    }
    assert!(matches!(p.density_traces(3), Err(Error::InvalidState(_))));
}

#[test]
fn density_traces_before_any_step_is_invalid_state() {
    let p = Problem::new(10).unwrap();
    assert!(matches!(p.density_traces(0), Err(Error::InvalidState(_))));
}

#[test]
fn arms_are_retrievable_by_index_and_type() {
    let mut p = Problem::new(4).unwrap();
    p.add_arm::<MockArm>(()).unwrap();
    p.add_arm::<SeedEcho>(()).unwrap();

    assert!(p.arm(0).is_some());
    assert!(p.arm(2).is_none());
    assert!(p.arm_as::<MockArm>(0).is_some());
    assert!(p.arm_as::<SeedEcho>(0).is_none());
    assert_eq!(p.arm_as::<SeedEcho>(1).unwrap().index, 1);
}

#[test]
fn same_seed_same_realization() {
    let build = |seed: u64| {
        let mut p = Problem::with_config(ProblemConfig::default().horizon(4).seed(seed)).unwrap();
        for _ in 0..3 {
            p.add_arm::<SeedEcho>(()).unwrap();
        }
        for _ in 0..4 {
            p.advance_step().unwrap();
        }
        p.history().to_vec()
    };
    assert_eq!(build(11), build(11));
    assert_ne!(build(11), build(12));
}

#[test]
fn arms_get_distinct_seeds() {
    let mut p = Problem::new(4).unwrap();
    let seeds: Vec<u64> = (0..4)
        .map(|_| p.add_arm::<SeedEcho>(()).unwrap().seed)
        .collect();
    let mut uniq = seeds.clone();
    uniq.sort_unstable();
    uniq.dedup();
    assert_eq!(uniq.len(), 4);
}
