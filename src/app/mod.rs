//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the control-cycle orchestration for the reservoir
//! controller: switch debouncing, the pump interlock, telemetry scheduling,
//! and remote override handling.  All interaction with hardware and the
//! network happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod commands;
pub mod ports;
pub mod service;
