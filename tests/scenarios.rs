//! End-to-end check scenarios driven through the public API.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use healthcheck::adapters::sim::{ManualClock, SequentialIdGenerator, SimParams, SimulatedMotor};
use healthcheck::builder::{Builder, SubsystemDecl};
use healthcheck::node::{CaseState, Node};
use healthcheck::ports::{DeviceHandle, MotorController};
use healthcheck::runner::run_to_completion;
use healthcheck::spec::CheckDecl;

const TICK: u64 = 20_000;

/// Encoder driven by the test.
struct ScriptedEncoder {
    id: i32,
    position: AtomicI64,
    outputs: Mutex<Vec<f64>>,
}

impl ScriptedEncoder {
    fn new(id: i32) -> Arc<Self> {
        Arc::new(Self { id, position: AtomicI64::new(0), outputs: Mutex::new(Vec::new()) })
    }

    fn move_by(&self, ticks: i64) {
        self.position.fetch_add(ticks, Ordering::SeqCst);
    }
}

impl MotorController for ScriptedEncoder {
    fn device_id(&self) -> i32 {
        self.id
    }
    fn set_percent_output(&self, output: f64) {
        self.outputs.lock().unwrap().push(output);
    }
    fn position(&self) -> i64 {
        self.position.load(Ordering::SeqCst)
    }
    fn velocity(&self) -> f64 {
        0.0
    }
    fn output_voltage(&self) -> f64 {
        0.0
    }
    fn supply_current(&self) -> f64 {
        0.0
    }
    fn stator_current(&self) -> f64 {
        0.0
    }
}

fn builder(clock: &Arc<ManualClock>) -> Builder {
    Builder::new(clock.clone(), Arc::new(SequentialIdGenerator::new("case")))
}

fn sim_motor(id: i32, clock: &Arc<ManualClock>) -> DeviceHandle {
    Arc::new(SimulatedMotor::new(id, SimParams::default(), clock.clone()))
}

fn tick(root: &mut Node, clock: &ManualClock) {
    clock.advance_micros(TICK);
    root.execute();
}

#[test]
fn timed_outputs_run_for_just_over_their_duration() {
    let clock = Arc::new(ManualClock::new());
    let decl = SubsystemDecl::new("intake").device(
        "roller",
        0,
        sim_motor(20, &clock),
        CheckDecl::timed(vec![0.5, -0.5], 1.0),
    );
    let mut root = builder(&clock).build(&[decl]).unwrap();
    {
        let cases = root.cases();
        assert_eq!(cases.len(), 2);
        assert!(!cases[0].is_reversing());
        assert!(cases[1].is_reversing());
    }

    run_to_completion(&mut root, || clock.advance_micros(TICK), Some(10_000)).unwrap();

    for case in root.cases() {
        assert_eq!(case.state(), CaseState::Stopping);
        let samples = case.samples();
        // Sampled every running tick; the exit tick is the first strictly past one second.
        assert_eq!(samples.len(), 51);
        let last = samples[samples.len() - 1].timestamp - case.running_at();
        let before_last = samples[samples.len() - 2].timestamp - case.running_at();
        assert_eq!(last, 1_000_000 + TICK);
        assert_eq!(before_last, 1_000_000);
    }
}

#[test]
fn position_case_exits_on_the_tick_travel_reaches_the_target() {
    let clock = Arc::new(ManualClock::new());
    let encoder = ScriptedEncoder::new(7);
    let decl = SubsystemDecl::new("drive").device(
        "azimuth",
        0,
        encoder.clone(),
        CheckDecl::position(vec![0.25, -0.25], 20_000),
    );
    let mut root = builder(&clock).build(&[decl]).unwrap();
    root.initialize();

    // Climb down the tree to the first case, then Initializing -> Starting -> Running.
    while root.cases()[0].state() != CaseState::Running {
        tick(&mut root, &clock);
    }

    for _ in 0..4 {
        encoder.move_by(4_000);
        tick(&mut root, &clock);
        assert_eq!(root.cases()[0].state(), CaseState::Running);
    }
    assert_eq!(root.cases()[0].samples().len(), 4);

    encoder.move_by(4_001);
    tick(&mut root, &clock);
    assert!(root.cases()[0].is_finished());
    // Not sampled on the exit tick.
    assert_eq!(root.cases()[0].samples().len(), 4);
    assert_eq!(encoder.outputs.lock().unwrap().as_slice(), &[0.0, 0.25, 0.0]);
}

#[test]
fn position_case_does_not_exit_one_tick_short() {
    let clock = Arc::new(ManualClock::new());
    let encoder = ScriptedEncoder::new(7);
    let decl = SubsystemDecl::new("drive").device(
        "azimuth",
        0,
        encoder.clone(),
        CheckDecl::position(vec![0.25, -0.25], 20_000),
    );
    let mut root = builder(&clock).build(&[decl]).unwrap();
    root.initialize();
    while root.cases()[0].state() != CaseState::Running {
        tick(&mut root, &clock);
    }

    encoder.move_by(-19_999);
    tick(&mut root, &clock);
    assert_eq!(root.cases()[0].state(), CaseState::Running);
    assert_eq!(root.cases()[0].samples().len(), 1);

    encoder.move_by(-2);
    tick(&mut root, &clock);
    assert!(root.cases()[0].is_finished());
    assert!(!root.cases()[0].timed_out());
}

#[test]
fn follower_of_missing_leader_is_dropped_without_a_case() {
    let clock = Arc::new(ManualClock::new());
    let decl = SubsystemDecl::new("intake")
        .device("roller", 0, sim_motor(20, &clock), CheckDecl::timed(vec![0.5], 0.1))
        .device("helper", 1, sim_motor(21, &clock), CheckDecl::follow(0));
    let root = builder(&clock).build(&[decl]).unwrap();

    let cases = root.cases();
    assert_eq!(cases.len(), 1);
    assert!(cases.iter().all(|c| c.device_id() != 21 && c.followers().is_empty()));
}

#[test]
fn followers_sample_exactly_as_often_as_their_leader() {
    let clock = Arc::new(ManualClock::new());
    let decl = SubsystemDecl::new("intake")
        .device("helper", 0, sim_motor(21, &clock), CheckDecl::follow(20))
        .device("roller", 1, sim_motor(20, &clock), CheckDecl::timed(vec![0.5, -0.5], 0.3));
    let mut root = builder(&clock).build(&[decl]).unwrap();
    let ticks = run_to_completion(&mut root, || clock.advance_micros(TICK), Some(10_000)).unwrap();
    assert!(ticks > 0);

    for case in root.cases() {
        assert!(!case.samples().is_empty());
        assert_eq!(case.followers()[0].samples().len(), case.samples().len());
        // An undriven follower never moves.
        assert!(case.followers()[0].samples().iter().all(|s| s.position == 0));
    }
}

#[test]
fn empty_subsystem_is_finished_right_after_initialize() {
    let clock = Arc::new(ManualClock::new());
    let mut root = builder(&clock).build(&[SubsystemDecl::new("climber")]).unwrap();
    root.initialize();

    let Node::Composite(robot) = &root else { panic!("root must be a composite") };
    assert!(robot.children()[0].is_finished());

    // The robot finishes on its first tick.
    tick(&mut root, &clock);
    assert!(root.is_finished());
}

#[test]
fn timed_and_position_on_one_field_fails_the_build() {
    let clock = Arc::new(ManualClock::new());
    let checks = CheckDecl {
        position: CheckDecl::position(vec![0.5], 100).position,
        ..CheckDecl::timed(vec![0.5], 1.0)
    };
    let decl = SubsystemDecl::new("shooter").device("flywheel", 0, sim_motor(30, &clock), checks);
    assert!(builder(&clock).build(&[decl]).is_err());
}
