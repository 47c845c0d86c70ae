//! Hydroponic reservoir controller library.
//!
//! Exposes the control core (debounce, pulse counting, interlock, telemetry
//! scheduling, remote overrides) and its adapters for integration testing
//! and for the host simulator binary.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod safety;
pub mod sensors;
pub mod state;
pub mod telemetry;
