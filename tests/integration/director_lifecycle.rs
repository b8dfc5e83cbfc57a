//! Director lifecycle tests: bring-up, full cycles and single-agent runs.

use std::sync::Arc;

use director::config::Config;
use director::{Director, Error, Phase, UnitError};

use crate::fixtures::{
    director_with, one_phase_table, quiet_config, two_unit_cycle_table, two_unit_cycle_units,
    Mark, MockUnit, Script, Timeline,
};

/// Test: one unit failing to initialize
/// Given three units where the fastest fails bring-up
/// When the director initializes
/// Then every unit is attempted and bring-up still succeeds
#[tokio::test]
async fn test_initialize_tolerates_unit_failure() {
    let bad = Arc::new(MockUnit::new("bad").init_fails());
    let slow = Arc::new(MockUnit::new("slow").delay_ms(30));
    let helper = Arc::new(MockUnit::new("helper").delay_ms(10));

    let table = one_phase_table(Phase::Design, &[("slow", "x")]);
    let mut director = director_with(table, &[("bad", bad.clone()), ("slow", slow.clone())]);
    director.register_helper("helper", helper.clone());

    let report = director.initialize().await.unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].name, "bad");
    assert_eq!(bad.init_calls(), 1);
    assert_eq!(slow.init_calls(), 1);
    assert_eq!(helper.init_calls(), 1);
}

/// Test: a unit that failed bring-up stays registered
/// and its tasks fail the normal way
#[tokio::test]
async fn test_failed_unit_remains_schedulable() {
    let broken = Arc::new(
        MockUnit::new("broken")
            .init_fails()
            .op("work", Script::Fail("not initialized")),
    );
    let table = one_phase_table(Phase::Design, &[("broken", "work")]);
    let mut director = director_with(table, &[("broken", broken.clone())]);

    director.initialize().await.unwrap();
    let report = director.run_phase(Phase::Design).await.unwrap();

    assert_eq!(broken.calls("work"), 1);
    assert_eq!(report.progress, 0.0);
    assert_eq!(report.failures[0].error, UnitError::failed("not initialized"));
}

/// Test: bring-up with nothing registered is a precondition failure
#[tokio::test]
async fn test_initialize_requires_units() {
    let mut director = Director::new(quiet_config());
    assert!(matches!(director.initialize().await, Err(Error::NoUnits)));
}

/// Test: full cycle
/// Given units covering all five phases
/// When the cycle runs
/// Then phases run in order and each finishes before the next starts
#[tokio::test]
async fn test_cycle_runs_phases_strictly_in_order() {
    let timeline = Timeline::new();
    let (a, b) = two_unit_cycle_units(&timeline);
    let mut director = director_with(two_unit_cycle_table(), &[("a", a), ("b", b)]);
    director.initialize().await.unwrap();

    let report = director.run_cycle().await.unwrap();

    let order: Vec<Phase> = report.phases.iter().map(|p| p.phase).collect();
    assert_eq!(order, Phase::ALL.to_vec());
    assert_eq!(report.total_tasks(), 10);
    assert_eq!(report.successful_tasks(), 10);

    for pair in Phase::ALL.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        let last_end = [format!("{}_a", current), format!("{}_b", current)]
            .iter()
            .map(|op| timeline.index_of(op, Mark::End).unwrap())
            .max()
            .unwrap();
        let first_start = [format!("{}_a", next), format!("{}_b", next)]
            .iter()
            .map(|op| timeline.index_of(op, Mark::Start).unwrap())
            .min()
            .unwrap();
        assert!(
            last_end < first_start,
            "{} started before {} finished",
            next,
            current
        );
    }

    let snapshot = director.snapshot();
    assert_eq!(snapshot.phase_progress.len(), 5);
    assert!(snapshot.phase_progress.values().all(|p| *p == 100.0));
    assert_eq!(snapshot.agent_status["a"].tasks_completed, 5);
    assert_eq!(snapshot.agent_status["b"].tasks_completed, 5);
    assert_eq!(director.history().len(), 5);
}

/// Test: tasks within a phase overlap
/// Given two tasks in one phase
/// Then the second starts before the first finishes
#[tokio::test]
async fn test_phase_tasks_run_concurrently() {
    let timeline = Timeline::new();
    let (a, b) = two_unit_cycle_units(&timeline);
    let mut director = director_with(two_unit_cycle_table(), &[("a", a), ("b", b)]);

    director.run_phase(Phase::Design).await.unwrap();

    let a_start = timeline.index_of("design_a", Mark::Start).unwrap();
    let b_start = timeline.index_of("design_b", Mark::Start).unwrap();
    let a_end = timeline.index_of("design_a", Mark::End).unwrap();
    let b_end = timeline.index_of("design_b", Mark::End).unwrap();
    assert!(a_start < a_end && b_start < a_end, "tasks did not overlap");
    // `a` is faster, so it completes first even though both launched together.
    assert!(a_end < b_end);
}

/// Test: wall-clock time of a phase is that of its slowest task
#[tokio::test(start_paused = true)]
async fn test_phase_duration_is_bounded_by_slowest_task() {
    let units: Vec<(String, Arc<MockUnit>)> = (0..4)
        .map(|i| {
            let name = format!("u{}", i);
            let unit = Arc::new(MockUnit::new(&name).delay_ms(100).op("work", Script::Succeed(0.5)));
            (name, unit)
        })
        .collect();
    let tasks: Vec<(&str, &str)> = units.iter().map(|(n, _)| (n.as_str(), "work")).collect();
    let agents: Vec<(&str, Arc<MockUnit>)> = units.iter().map(|(n, u)| (n.as_str(), u.clone())).collect();
    let mut director = director_with(one_phase_table(Phase::Creation, &tasks), &agents);

    let start = tokio::time::Instant::now();
    let report = director.run_phase(Phase::Creation).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(report.successful(), 4);
    assert!(
        elapsed.as_millis() < 200,
        "4 x 100ms tasks took {:?}; they should overlap",
        elapsed
    );
}

/// Test: cycle keeps going after a phase that fully fails
#[tokio::test]
async fn test_cycle_continues_after_failed_phase() {
    let timeline = Timeline::new();
    let mut a = MockUnit::new("a").timeline(&timeline);
    let mut b = MockUnit::new("b").timeline(&timeline);
    for phase in Phase::ALL {
        let (sa, sb) = if phase == Phase::Creation {
            (Script::Fail("no assets"), Script::Panic)
        } else {
            (Script::Succeed(0.9), Script::Succeed(0.9))
        };
        a = a.op(&format!("{}_a", phase), sa);
        b = b.op(&format!("{}_b", phase), sb);
    }
    let mut director = director_with(
        two_unit_cycle_table(),
        &[("a", Arc::new(a)), ("b", Arc::new(b))],
    );

    let report = director.run_cycle().await.unwrap();

    assert_eq!(report.phases.len(), 5);
    assert_eq!(report.phases[1].progress, 0.0);
    assert_eq!(report.phases[4].progress, 100.0);
    assert!(timeline.index_of("integration_b", Mark::End).is_some());
    assert_eq!(director.snapshot().total_tasks_completed, 8);
}

/// Test: a cycle over a table missing a phase stops with a configuration error
#[tokio::test]
async fn test_cycle_with_incomplete_table_fails() {
    let a = Arc::new(MockUnit::new("a").op("x", Script::Succeed(1.0)));
    let mut director = director_with(one_phase_table(Phase::Design, &[("a", "x")]), &[("a", a)]);

    let err = director.run_cycle().await.unwrap_err();

    assert!(matches!(err, Error::EmptyPhase(Phase::Creation)));
    // Design ran before the gap was reached.
    assert_eq!(director.snapshot().phase_progress[&Phase::Design], 100.0);
}

/// Test: counters only ever grow across cycles
#[tokio::test]
async fn test_tasks_completed_is_monotonic() {
    let timeline = Timeline::new();
    let (a, b) = two_unit_cycle_units(&timeline);
    let mut director = director_with(two_unit_cycle_table(), &[("a", a), ("b", b)]);

    let mut previous = 0;
    for _ in 0..3 {
        director.run_cycle().await.unwrap();
        let total = director.snapshot().total_tasks_completed;
        assert!(total > previous);
        previous = total;
    }
    assert_eq!(previous, 30);
    assert_eq!(director.snapshot().phase_progress.len(), 5);
}

/// Test: running a single unknown agent
/// Then UnknownUnit is returned and status is unchanged
#[tokio::test]
async fn test_run_single_unknown_unit() {
    let a = Arc::new(MockUnit::new("a").op("x", Script::Succeed(1.0)).primary("x"));
    let mut director = director_with(one_phase_table(Phase::Design, &[("a", "x")]), &[("a", a.clone())]);
    let before = director.snapshot();

    let err = director.run_single_unit("nonexistent").await.unwrap_err();

    assert!(matches!(err, Error::UnknownUnit(ref n) if n == "nonexistent"));
    assert_eq!(director.snapshot(), before);
    assert_eq!(a.total_calls(), 0);
}

/// Test: running a single agent bypasses phases
#[tokio::test]
async fn test_run_single_unit_updates_status_not_progress() {
    let a = Arc::new(MockUnit::new("a").op("x", Script::Succeed(0.77)).primary("x"));
    let mut director = director_with(one_phase_table(Phase::Design, &[("a", "x")]), &[("a", a.clone())]);

    let outcome = director.run_single_unit("a").await.unwrap();

    assert!(outcome.is_ok());
    assert_eq!(a.calls("x"), 1);
    let snapshot = director.snapshot();
    assert_eq!(snapshot.agent_status["a"].tasks_completed, 1);
    assert_eq!(snapshot.agent_status["a"].performance, 0.77);
    assert!(snapshot.phase_progress.is_empty());
}

/// Test: a failing single-agent run is reported as a value
#[tokio::test]
async fn test_run_single_unit_failure_is_captured() {
    let a = Arc::new(MockUnit::new("a").op("x", Script::Fail("offline")).primary("x"));
    let mut director = director_with(one_phase_table(Phase::Design, &[("a", "x")]), &[("a", a)]);

    let outcome = director.run_single_unit("a").await.unwrap();

    assert_eq!(outcome.unwrap_err(), UnitError::failed("offline"));
    assert_eq!(director.snapshot().total_tasks_completed, 0);
}

/// Test: two directors in one process share nothing
#[tokio::test]
async fn test_directors_are_independent() {
    let timeline = Timeline::new();
    let (a1, b1) = two_unit_cycle_units(&timeline);
    let (a2, b2) = two_unit_cycle_units(&timeline);
    let mut first = director_with(two_unit_cycle_table(), &[("a", a1), ("b", b1)]);
    let second = director_with(two_unit_cycle_table(), &[("a", a2), ("b", b2)]);

    first.run_phase(Phase::Design).await.unwrap();

    assert_eq!(first.snapshot().total_tasks_completed, 2);
    assert_eq!(second.snapshot().total_tasks_completed, 0);
    assert!(second.snapshot().phase_progress.is_empty());
}

/// Test: the built-in units run the standard cycle end to end
#[tokio::test]
async fn test_stock_cycle() {
    let mut director = Director::with_stock_units(quiet_config());
    let init = director.initialize().await.unwrap();
    assert!(init.all_ok());
    assert_eq!(init.total(), 8);

    let report = director.run_cycle().await.unwrap();

    assert_eq!(report.total_tasks(), 18);
    assert_eq!(report.successful_tasks(), 18);
    let snapshot = director.snapshot();
    // Only agent records from design, creation and level_design count.
    assert_eq!(snapshot.total_tasks_completed, 11);
    assert_eq!(snapshot.agent_status["character_creator"].tasks_completed, 3);
    // Creation tasks finish in any order; the last one wins.
    let performance = snapshot.agent_status["character_creator"].performance;
    assert!(performance == 0.98 || performance == 0.92);
    assert_eq!(snapshot.active_agents, 0);
}

/// Test: configured failures show up in the stock cycle
#[tokio::test]
async fn test_stock_cycle_with_configured_failures() {
    let mut config: Config = quiet_config();
    config.units.fail_operations = vec![
        "task_manager.run_test_suite".to_string(),
        "mission_planner.initialize".to_string(),
    ];
    let mut director = Director::with_stock_units(config);

    let init = director.initialize().await.unwrap();
    assert_eq!(init.failed.len(), 1);
    assert_eq!(init.failed[0].name, "mission_planner");

    director.run_cycle().await.unwrap();

    let progress = director.snapshot().phase_progress[&Phase::Integration];
    assert!((progress - 66.67).abs() < 0.01);
    assert_eq!(director.snapshot().phase_progress[&Phase::Design], 100.0);
}
