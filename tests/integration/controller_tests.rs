//! Integration tests for the full Controller cycle: sampling → debounce →
//! interlock → indicators → telemetry.

use reservoir::app::service::Controller;
use reservoir::config::ControllerConfig;
use reservoir::safety::{Hazard, PumpDecision};
use reservoir::sensors::{ChannelId, EdgeEvent};
use reservoir::telemetry::Topic;

use crate::mock_hw::{MockBoard, RecordingChannel, Sources, at, run_span};

/// Drive the critical float active at t=100; it commits at t=200.
fn trip_critical(ctl: &mut Controller<'_>, board: &mut MockBoard, ch: &mut RecordingChannel) {
    run_span(ctl, board, ch, 0, 100);
    board.set(ChannelId::ReservoirCritical, true);
    run_span(ctl, board, ch, 100, 210);
}

#[test]
fn first_tick_publishes_all_six_quantities() {
    let src = Sources::new();
    let config = ControllerConfig::default();
    let mut ctl = Controller::new(&config, src.edge_sources());
    let mut board = MockBoard::idle();
    let mut ch = RecordingChannel::new();

    let report = ctl.tick(at(0), &mut board, &mut ch);

    assert_eq!(report.telemetry.published.len(), 6);
    for topic in Topic::ALL {
        assert_eq!(ch.values(topic).len(), 1, "{topic} published once");
    }
    assert_eq!(report.telemetry.value_of(Topic::PumpOverride), Some(1));
    assert_eq!(report.telemetry.value_of(Topic::PipeOverflow), Some(0));
    assert_eq!(report.decision, PumpDecision::Allowed);
    assert!(!ctl.dirty().any());

    // Every indicator is written once at start-up.
    assert_eq!(board.leds.len(), 4);
    assert_eq!(board.led(ChannelId::PumpOverride), Some(true));
}

#[test]
fn flows_publish_once_per_window() {
    let src = Sources::new();
    let config = ControllerConfig::default();
    let mut ctl = Controller::new(&config, src.edge_sources());
    let mut board = MockBoard::idle();
    let mut ch = RecordingChannel::new();

    ctl.tick(at(0), &mut board, &mut ch);
    for _ in 0..900 {
        src.inflow.on_edge();
    }
    for _ in 0..450 {
        src.return_flow.on_edge();
    }

    run_span(&mut ctl, &mut board, &mut ch, 10, 30_000);
    assert_eq!(ch.values(Topic::InflowRate), vec![0]);
    assert_eq!(ch.values(Topic::ReturnFlowRate), vec![0]);

    let report = ctl.tick(at(30_000), &mut board, &mut ch);
    assert_eq!(report.telemetry.value_of(Topic::InflowRate), Some(2));
    assert_eq!(report.telemetry.value_of(Topic::ReturnFlowRate), Some(1));
    assert!((ctl.state().inflow_total_litres - 2.0).abs() < 1e-3);
    assert_eq!(src.inflow.pending(), 0);

    // Quiet window still publishes zero.
    run_span(&mut ctl, &mut board, &mut ch, 30_010, 60_000);
    let report = ctl.tick(at(60_000), &mut board, &mut ch);
    assert_eq!(report.telemetry.value_of(Topic::InflowRate), Some(0));
    assert!((ctl.state().inflow_total_litres - 2.0).abs() < 1e-3);
}

#[test]
fn pump_switch_edge_emits_exactly_once() {
    let src = Sources::new();
    let mut config = ControllerConfig::default();
    config.initial_levels.pump_override = false;
    let mut ctl = Controller::new(&config, src.edge_sources());
    let mut board = MockBoard::new([false, false, false, false]);
    let mut ch = RecordingChannel::new();

    run_span(&mut ctl, &mut board, &mut ch, 0, 200);
    board.set(ChannelId::PumpOverride, true);
    let reports = run_span(&mut ctl, &mut board, &mut ch, 200, 600);

    let pump_edges: Vec<(usize, EdgeEvent)> = reports
        .iter()
        .enumerate()
        .flat_map(|(i, r)| r.edges.iter().map(move |e| (i, *e)))
        .collect();
    assert_eq!(
        pump_edges,
        vec![(
            10,
            EdgeEvent {
                channel: ChannelId::PumpOverride,
                level: true,
            }
        )]
    );
    assert!(ctl.state().pump_enabled);
    assert_eq!(board.led(ChannelId::PumpOverride), Some(true));
}

#[test]
fn switch_bounce_shorter_than_window_never_commits() {
    let src = Sources::new();
    let config = ControllerConfig::default();
    let mut ctl = Controller::new(&config, src.edge_sources());
    let mut board = MockBoard::idle();
    let mut ch = RecordingChannel::new();

    ctl.tick(at(0), &mut board, &mut ch);
    let mut level = false;
    for t in (10..1_000).step_by(50) {
        level = !level;
        board.set(ChannelId::ReservoirWarning, level);
        let report = ctl.tick(at(t), &mut board, &mut ch);
        assert!(report.edges.is_empty(), "edge at {t}");
    }
    assert!(!ctl.stable_level(ChannelId::ReservoirWarning));
    assert!(!ctl.dirty().is_set(ChannelId::ReservoirWarning));
}

#[test]
fn critical_forces_pump_off_and_publishes_on_event_tick() {
    let src = Sources::new();
    let config = ControllerConfig::default();
    let mut ctl = Controller::new(&config, src.edge_sources());
    let mut board = MockBoard::idle();
    let mut ch = RecordingChannel::new();

    run_span(&mut ctl, &mut board, &mut ch, 0, 100);
    board.set(ChannelId::ReservoirCritical, true);
    run_span(&mut ctl, &mut board, &mut ch, 100, 200);
    assert!(ctl.state().pump_enabled, "still settling before t=200");

    let report = ctl.tick(at(200), &mut board, &mut ch);
    assert_eq!(
        report.edges.as_slice(),
        &[EdgeEvent {
            channel: ChannelId::ReservoirCritical,
            level: true,
        }]
    );
    assert_eq!(
        report.decision,
        PumpDecision::Forced {
            hazards: Hazard::ReservoirCritical.mask(),
        }
    );
    assert!(!ctl.state().pump_enabled);
    assert!(ctl.dirty().is_set(ChannelId::PumpOverride));
    assert!(ctl.dirty().is_set(ChannelId::ReservoirCritical));
    assert_eq!(ctl.interlock().trips(), 1);
    assert_eq!(board.led(ChannelId::PumpOverride), Some(false));
    assert_eq!(board.led(ChannelId::ReservoirCritical), Some(true));

    // Nothing goes out before the next event tick.
    run_span(&mut ctl, &mut board, &mut ch, 210, 5_000);
    assert_eq!(ch.values(Topic::PumpOverride), vec![1]);

    let report = ctl.tick(at(5_000), &mut board, &mut ch);
    assert_eq!(report.telemetry.published.len(), 2);
    assert_eq!(report.telemetry.value_of(Topic::PumpOverride), Some(0));
    assert_eq!(report.telemetry.value_of(Topic::ReservoirCritical), Some(1));
    assert!(!ctl.dirty().any());
}

#[test]
fn pump_not_restored_when_hazard_clears() {
    let src = Sources::new();
    let config = ControllerConfig::default();
    let mut ctl = Controller::new(&config, src.edge_sources());
    let mut board = MockBoard::idle();
    let mut ch = RecordingChannel::new();

    trip_critical(&mut ctl, &mut board, &mut ch);
    assert!(!ctl.state().pump_enabled);

    board.set(ChannelId::ReservoirCritical, false);
    let reports = run_span(&mut ctl, &mut board, &mut ch, 300, 2_000);
    assert!(reports.iter().any(|r| r
        .edges
        .contains(&EdgeEvent {
            channel: ChannelId::ReservoirCritical,
            level: false,
        })));
    assert_eq!(reports.last().map(|r| r.decision), Some(PumpDecision::Allowed));

    // Override switch held closed the whole time: still off.
    assert!(board.levels.get(ChannelId::PumpOverride));
    assert!(!ctl.state().pump_enabled);
    assert_eq!(ctl.interlock().trips(), 1);

    // Operator cycles the switch: off, then on.
    board.set(ChannelId::PumpOverride, false);
    run_span(&mut ctl, &mut board, &mut ch, 2_000, 2_200);
    assert!(!ctl.state().pump_enabled);
    board.set(ChannelId::PumpOverride, true);
    run_span(&mut ctl, &mut board, &mut ch, 2_200, 2_400);

    assert!(ctl.state().pump_enabled);
    assert!(ctl.dirty().is_set(ChannelId::PumpOverride));
    assert_eq!(board.led(ChannelId::PumpOverride), Some(true));
}

#[test]
fn hazard_present_at_start_up_is_enforced_on_first_tick() {
    let src = Sources::new();
    let mut config = ControllerConfig::default();
    config.initial_levels.pipe_overflow = true;
    let mut ctl = Controller::new(&config, src.edge_sources());
    let mut board = MockBoard::new([true, false, false, true]);
    let mut ch = RecordingChannel::new();

    let report = ctl.tick(at(0), &mut board, &mut ch);

    assert_eq!(
        report.decision,
        PumpDecision::Forced {
            hazards: Hazard::PipeOverflow.mask(),
        }
    );
    assert_eq!(report.telemetry.value_of(Topic::PumpOverride), Some(0));
    assert_eq!(report.telemetry.value_of(Topic::PipeOverflow), Some(1));
    assert_eq!(board.led(ChannelId::PumpOverride), Some(false));
    assert_eq!(board.led(ChannelId::PipeOverflow), Some(true));

    // Held switch never re-enables while the hazard stands.
    run_span(&mut ctl, &mut board, &mut ch, 10, 10_000);
    assert!(!ctl.state().pump_enabled);
    assert_eq!(ctl.interlock().trips(), 1);
}

#[test]
fn steady_inputs_leave_state_clean() {
    let src = Sources::new();
    let config = ControllerConfig::default();
    let mut ctl = Controller::new(&config, src.edge_sources());
    let mut board = MockBoard::idle();
    let mut ch = RecordingChannel::new();

    let reports = run_span(&mut ctl, &mut board, &mut ch, 0, 20_000);

    assert!(reports.iter().all(|r| r.edges.is_empty()));
    assert!(!ctl.dirty().any());
    assert_eq!(board.leds.len(), 4);
    // Only the initial sync went out.
    assert_eq!(ch.attempts.len(), 6);
    assert_eq!(ctl.cycle_count(), 2_000);
}
