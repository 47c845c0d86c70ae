//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements        | Connects to                   |
//! |------------|-------------------|-------------------------------|
//! | `hardware` | SensorPort        | `embedded-hal` input pins     |
//! |            | IndicatorPort     | `embedded-hal` output pins    |
//! | `log_sink` | TelemetryChannel  | Logger out, bounded queue in  |

pub mod hardware;
pub mod log_sink;
