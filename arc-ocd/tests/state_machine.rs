use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use arc_ocd::{
    architecture::arc::{
        register_cache::RegisterCache,
        registers::{RegisterId, AUX_DEBUG, AUX_PC},
    },
    ArcCore, ArcDebugSequence, ArcJtagAccess, Error, ExamineOutcome, FailOn, FakeProbe,
    PollOutcome, ProbeOperation, ResetConfig, Target, TargetConfig, TargetEvent, TargetInterface,
    TargetState,
};
use pretty_assertions::assert_eq;
use test_case::test_case;

/// Counts debug entries, and otherwise behaves like the default sequence.
#[derive(Debug, Default)]
struct CountingSequence {
    entries: AtomicUsize,
}

impl ArcDebugSequence for CountingSequence {
    fn debug_entry(
        &self,
        interface: &mut dyn ArcJtagAccess,
        register_cache: &mut RegisterCache,
    ) -> Result<(), Error> {
        self.entries.fetch_add(1, Ordering::SeqCst);
        let pc = interface.read_aux_reg(AUX_PC)?;
        register_cache.store(RegisterId::Aux(AUX_PC), pc);
        Ok(())
    }
}

fn config(yaml: &str) -> TargetConfig {
    TargetConfig::from_yaml_str(yaml).expect("Failed to parse target description.")
}

fn record_events(target: &mut Target) -> Arc<Mutex<Vec<TargetEvent>>> {
    let events = Arc::new(Mutex::new(vec![]));
    let sink = events.clone();
    target.register_event_callback(move |event| sink.lock().unwrap().push(event));
    events
}

/// Examines a target the same way the host does after attaching.
fn examined_target(probe: &mut FakeProbe, config: &TargetConfig) -> Target {
    let mut target = Target::from_config(config);

    let mut core = config
        .architecture
        .create_target(probe, config)
        .expect("Failed to create target.");
    core.init_target(&mut target).unwrap();
    core.examine(&mut target).unwrap();

    target
}

#[test]
fn bring_up_and_halt_on_poll() {
    let config = config("name: arc700\n");
    let mut probe = FakeProbe::new();

    let mut target = examined_target(&mut probe, &config);
    assert_eq!(target.state(), TargetState::Reset);
    assert!(target.was_examined());

    let events = record_events(&mut target);
    let sequence = Arc::new(CountingSequence::default());
    let mut core = ArcCore::create_with_sequence(&mut probe, &config, sequence.clone()).unwrap();
    core.init_target(&mut target).unwrap();

    assert_eq!(
        core.poll(&mut target).unwrap(),
        PollOutcome::Halted(TargetEvent::Halted)
    );
    assert_eq!(core.poll(&mut target).unwrap(), PollOutcome::Unchanged);

    assert_eq!(target.state(), TargetState::Halted);
    assert_eq!(*events.lock().unwrap(), vec![TargetEvent::Halted]);
    assert_eq!(sequence.entries.load(Ordering::SeqCst), 1);
}

#[test]
fn examine_is_idempotent() {
    let config = config("{}");
    let mut probe = FakeProbe::new();

    let mut target = examined_target(&mut probe, &config);
    let state = target.state();
    probe.clear_operations();

    let mut core = config.architecture.create_target(&mut probe, &config).unwrap();
    assert_eq!(
        core.examine(&mut target).unwrap(),
        ExamineOutcome::AlreadyExamined
    );
    drop(core);

    assert_eq!(target.state(), state);
    assert!(probe.aux_writes().is_empty());
    assert_eq!(probe.count(|op| *op == ProbeOperation::Startup), 1);
}

#[test]
fn examine_failure_leaves_target_unexamined() {
    let config = config("{}");
    let mut probe = FakeProbe::new();
    probe.fail_once(FailOn::Status);
    let mut target = Target::from_config(&config);

    let mut core = config.architecture.create_target(&mut probe, &config).unwrap();
    let error = core.examine(&mut target).unwrap_err();

    assert!(matches!(error, Error::Probe(_)));
    assert!(!target.was_examined());

    // The next attempt starts over.
    assert_eq!(
        core.examine(&mut target).unwrap(),
        ExamineOutcome::Halted
    );
    assert!(target.was_examined());
}

#[test_case("{}", vec![]; "no reset lines")]
#[test_case("reset: { has_srst: true }", vec![(false, true)]; "srst only")]
#[test_case("reset: { has_srst: true, srst_pulls_trst: true }", vec![(true, true)]; "srst pulls trst")]
#[test_case("reset: { has_srst: true, srst_no_gating: true }", vec![(false, true)]; "srst without gating")]
#[test_case("reset: { has_srst: true, srst_pulls_trst: true, srst_no_gating: true }", vec![(true, true)]; "all flags")]
fn reset_line_sequencing(yaml: &str, expected: Vec<(bool, bool)>) {
    let config = config(yaml);
    let mut probe = FakeProbe::new();
    let mut target = Target::from_config(&config);

    let mut core = config.architecture.create_target(&mut probe, &config).unwrap();
    core.assert_reset(&mut target).unwrap();
    assert_eq!(target.state(), TargetState::Reset);
    drop(core);

    assert_eq!(probe.reset_lines(), expected);
}

#[test]
fn reset_cycle_invalidates_cache_once() {
    let config = config("reset: { has_srst: true }\n");
    let mut probe = FakeProbe::halted();
    let mut target = Target::from_config(&config);

    let mut core = ArcCore::create(&mut probe, &config).unwrap();
    core.init_target(&mut target).unwrap();
    let generation = core.register_cache().generation();

    core.assert_reset(&mut target).unwrap();
    core.deassert_reset(&mut target).unwrap();

    assert_eq!(core.register_cache().generation(), generation + 1);
    assert_eq!(target.state(), TargetState::Reset);

    // The halt after reset is observed by the next poll.
    assert_eq!(
        core.poll(&mut target).unwrap(),
        PollOutcome::Halted(TargetEvent::Halted)
    );
    drop(core);

    assert_eq!(probe.reset_lines(), vec![(false, true), (false, false)]);
}

#[test]
fn reset_halt_failure_is_reported_after_invalidation() {
    let config = config("reset_halt: true\ntiming: { halt_timeout_ms: 0 }\n");
    let mut probe = FakeProbe::new();
    probe.fail_once(FailOn::WriteAux(AUX_DEBUG));
    let mut target = Target::from_config(&config);

    let mut core = ArcCore::create(&mut probe, &config).unwrap();
    core.init_target(&mut target).unwrap();
    let generation = core.register_cache().generation();

    assert!(core.assert_reset(&mut target).is_err());

    assert_eq!(target.state(), TargetState::Reset);
    assert_eq!(core.register_cache().generation(), generation + 1);
}

#[test]
fn reset_line_failure_still_enters_reset() {
    let config = config("reset: { has_srst: true, srst_no_gating: true }\nreset_halt: true\n");
    let mut probe = FakeProbe::new();
    probe.fail_once(FailOn::ResetLines);
    let mut target = Target::from_config(&config);

    let mut core = ArcCore::create(&mut probe, &config).unwrap();
    core.init_target(&mut target).unwrap();
    let generation = core.register_cache().generation();

    let error = core.assert_reset(&mut target).unwrap_err();

    assert!(error.as_probe_error().is_some());
    assert_eq!(target.state(), TargetState::Reset);
    assert_eq!(core.register_cache().generation(), generation + 1);
    drop(core);

    assert!(probe.aux_writes().is_empty());
    assert!(probe.is_running());
}

#[test]
fn reset_halt_stops_the_core() {
    let config = config("reset_halt: true\n");
    let mut probe = FakeProbe::new();
    let mut target = Target::from_config(&config);

    let mut core = config.architecture.create_target(&mut probe, &config).unwrap();
    core.assert_reset(&mut target).unwrap();
    drop(core);

    assert!(!probe.is_running());
}

#[test]
fn external_resume_is_recorded_without_event() {
    let config = config("{}");
    let mut probe = FakeProbe::halted();
    let mut target = examined_target(&mut probe, &config);
    let events = record_events(&mut target);

    let mut core = config.architecture.create_target(&mut probe, &config).unwrap();
    core.poll(&mut target).unwrap();
    drop(core);

    probe.set_running(true);

    let mut core = config.architecture.create_target(&mut probe, &config).unwrap();
    assert_eq!(
        core.poll(&mut target).unwrap(),
        PollOutcome::ResumedExternally
    );
    assert_eq!(target.state(), TargetState::Running);
    assert_eq!(*events.lock().unwrap(), vec![TargetEvent::Halted]);
}

#[test]
fn debug_execution_round_trip() {
    let config = config("{}");
    let mut probe = FakeProbe::new();
    let mut target = examined_target(&mut probe, &config);
    let events = record_events(&mut target);

    let mut core = config.architecture.create_target(&mut probe, &config).unwrap();
    core.poll(&mut target).unwrap();

    core.resume(&mut target, true).unwrap();
    assert_eq!(target.state(), TargetState::DebugRunning);

    core.halt(&mut target).unwrap();
    assert_eq!(
        core.poll(&mut target).unwrap(),
        PollOutcome::Halted(TargetEvent::DebugHalted)
    );

    core.resume(&mut target, false).unwrap();
    assert_eq!(target.state(), TargetState::Running);

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            TargetEvent::Halted,
            TargetEvent::DebugResumed,
            TargetEvent::DebugHalted,
            TargetEvent::Resumed,
        ]
    );
}

#[test]
fn running_core_with_default_reset_config() {
    let config = TargetConfig {
        reset: ResetConfig::default(),
        ..config("timing: { force_halt_settle_ms: 0 }\n")
    };
    let mut probe = FakeProbe::new().ignore_force_halt();
    let mut target = Target::from_config(&config);

    let mut core = config.architecture.create_target(&mut probe, &config).unwrap();
    assert_eq!(
        core.examine(&mut target).unwrap(),
        ExamineOutcome::StillRunning
    );
    assert_eq!(target.state(), TargetState::Running);
    assert_eq!(core.poll(&mut target).unwrap(), PollOutcome::Unchanged);
}
