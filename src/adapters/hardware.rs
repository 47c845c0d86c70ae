//! Hardware adapter — bridges GPIO pins to the domain port traits.
//!
//! Generic over `embedded-hal` 1.0 digital pins, so the same adapter serves
//! any HAL whose pins can be type-erased to one input and one output type.
//! This is the only module that touches pin levels; polarity is resolved
//! here so the core only ever sees "active" / "inactive".

use embedded_hal::digital::{InputPin, OutputPin, PinState};
use log::warn;

use crate::app::ports::{IndicatorPort, SensorPort};
use crate::sensors::{ChannelId, SwitchLevels};

/// One switch line with its wiring polarity.
pub struct SwitchInput<P> {
    pin: P,
    active_low: bool,
    /// Level returned when a read fails.
    last: bool,
}

impl<P: InputPin> SwitchInput<P> {
    /// Switch that drives the line HIGH when active.
    pub fn active_high(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
            last: false,
        }
    }

    /// Switch to ground with a pull-up: LOW when active.
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
            last: false,
        }
    }

    fn read(&mut self, channel: ChannelId) -> bool {
        match self.pin.is_high() {
            Ok(high) => self.last = high != self.active_low,
            Err(e) => warn!("GPIO read failed on {}: {:?}, holding {}", channel, e, self.last),
        }
        self.last
    }
}

/// Switch inputs and indicator outputs behind [`SensorPort`] and
/// [`IndicatorPort`].  Arrays are in [`ChannelId::ALL`] order.
pub struct HardwareAdapter<P, O> {
    switches: [SwitchInput<P>; ChannelId::COUNT],
    indicators: [O; ChannelId::COUNT],
}

impl<P: InputPin, O: OutputPin> HardwareAdapter<P, O> {
    pub fn new(
        switches: [SwitchInput<P>; ChannelId::COUNT],
        indicators: [O; ChannelId::COUNT],
    ) -> Self {
        Self {
            switches,
            indicators,
        }
    }

    pub fn indicators(&self) -> &[O; ChannelId::COUNT] {
        &self.indicators
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P: InputPin, O: OutputPin> SensorPort for HardwareAdapter<P, O> {
    fn read_switches(&mut self) -> SwitchLevels {
        let mut levels = SwitchLevels::default();
        for ch in ChannelId::ALL {
            levels.set(ch, self.switches[ch.index()].read(ch));
        }
        levels
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<P: InputPin, O: OutputPin> IndicatorPort for HardwareAdapter<P, O> {
    fn set_indicator(&mut self, channel: ChannelId, on: bool) {
        if let Err(e) = self.indicators[channel.index()].set_state(PinState::from(on)) {
            warn!("GPIO write failed on {} indicator: {:?}", channel, e);
        }
    }
}
