//! Reservoir controller — host simulator entry point.
//!
//! Runs the control core against simulated switch lines, simulated
//! flowmeter pulses, and the log-backed telemetry channel.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  stdin reader thread                                     │
//! │    "pump-override 0"        ──▶ INBOUND_COMMANDS queue   │
//! │    "switch pipe-overflow 1" ──▶ SIM_SWITCHES + latch     │
//! │    "pulse inflow 450"       ──▶ flowmeter ISR handler    │
//! │                                                          │
//! │  control loop (10 ms)                                    │
//! │    Controller::tick(SimBoard, LogChannel)                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `reservoir-sim [config.json]`
#![deny(unused_must_use)]

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use embassy_time::Instant;
use log::{info, warn};

use reservoir::adapters::log_sink::{self, INBOUND_COMMANDS, LogChannel};
use reservoir::app::ports::{IndicatorPort, SensorPort};
use reservoir::app::service::{Controller, EdgeSources};
use reservoir::config::{ControllerConfig, InitialLevels};
use reservoir::sensors::flow::{
    INFLOW_PULSES, RETURN_PULSES, inflow_isr_handler, return_isr_handler,
};
use reservoir::sensors::latch::{SWITCH_LATCHES, switch_isr_handler};
use reservoir::sensors::{ChannelId, SwitchLevels};
use reservoir::telemetry::Topic;

/// Control loop period.
const CYCLE_MS: u64 = 10;

static SIM_SWITCHES: [AtomicBool; ChannelId::COUNT] =
    [const { AtomicBool::new(false) }; ChannelId::COUNT];

/// Move a simulated switch, raising its edge latch like the GPIO ISR would.
fn sim_set(channel: ChannelId, level: bool) {
    let prev = SIM_SWITCHES[channel.index()].swap(level, Ordering::Relaxed);
    if prev != level {
        switch_isr_handler(channel);
        info!("SIM | {} line -> {}", channel, u8::from(level));
    }
}

/// Replay `count` flowmeter edges through the ISR handler.
fn sim_pulses(meter: &str, count: u32) -> bool {
    let handler: fn() = match meter {
        "inflow" => inflow_isr_handler,
        "return" => return_isr_handler,
        _ => return false,
    };
    for _ in 0..count {
        handler();
    }
    true
}

fn seed_switches(levels: &InitialLevels) {
    for ch in ChannelId::ALL {
        SIM_SWITCHES[ch.index()].store(levels.level(ch), Ordering::Relaxed);
    }
}

/// Simulated board: switch lines from `SIM_SWITCHES`, indicators to the log.
struct SimBoard;

impl SensorPort for SimBoard {
    fn read_switches(&mut self) -> SwitchLevels {
        let mut levels = SwitchLevels::default();
        for ch in ChannelId::ALL {
            levels.set(ch, SIM_SWITCHES[ch.index()].load(Ordering::Relaxed));
        }
        levels
    }
}

impl IndicatorPort for SimBoard {
    fn set_indicator(&mut self, channel: ChannelId, on: bool) {
        info!("LED | {} {}", channel, if on { "ON" } else { "OFF" });
    }
}

fn spawn_stdin_reader() {
    std::thread::spawn(|| {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let mut words = line.split_whitespace();
            match (words.next(), words.next(), words.next()) {
                (Some("switch"), Some(name), Some(level)) => {
                    match (Topic::parse(name).and_then(Topic::channel), level) {
                        (Some(ch), "0" | "1") => sim_set(ch, level == "1"),
                        _ => warn!("SIM | usage: switch <channel> <0|1>"),
                    }
                }
                (Some("pulse"), Some(meter), Some(count)) => {
                    let ok = count.parse::<u32>().is_ok_and(|n| sim_pulses(meter, n));
                    if !ok {
                        warn!("SIM | usage: pulse <inflow|return> <count>");
                    }
                }
                (Some(topic), Some(payload), None) => {
                    log_sink::submit(&INBOUND_COMMANDS, topic, payload);
                }
                (None, _, _) => {}
                _ => warn!("SIM | unrecognised line '{}'", line),
            }
        }
    });
}

fn load_config() -> Result<ControllerConfig> {
    let Some(path) = std::env::args().nth(1) else {
        info!("Config: defaults");
        return Ok(ControllerConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config = ControllerConfig::from_json(&text).with_context(|| format!("loading {path}"))?;
    info!("Config loaded from {}", path);
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("reservoir-sim v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    seed_switches(&config.initial_levels);
    spawn_stdin_reader();

    let mut controller = Controller::new(
        &config,
        EdgeSources {
            inflow: &INFLOW_PULSES,
            return_flow: &RETURN_PULSES,
            switches: &SWITCH_LATCHES,
        },
    );
    let mut board = SimBoard;
    let mut channel = LogChannel::new(&INBOUND_COMMANDS);

    info!("Controller ready. Entering control loop.");

    loop {
        controller.tick(Instant::now(), &mut board, &mut channel);
        std::thread::sleep(StdDuration::from_millis(CYCLE_MS));
    }
}
