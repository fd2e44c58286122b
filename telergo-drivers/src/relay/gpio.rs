//! GPIO relay pair actuator
//!
//! Drives the two relay coils through GPIO pins (directly or via a
//! transistor/SSR stage). Both outputs are forced to the released state
//! at construction.

use telergo_core::traits::{RelayActuator, RelayChannel};

use crate::pin::OutputPin;

/// Two-channel relay actuator over GPIO.
///
/// The pins can be configured as active-high (default) or active-low.
pub struct GpioRelayPair<P> {
    primary: P,
    auxiliary: P,
    /// If false, energized = pin LOW
    active_high: bool,
}

impl<P: OutputPin> GpioRelayPair<P> {
    /// Create a relay pair actuator and release both outputs.
    ///
    /// # Arguments
    /// - `primary`: pin driving the load relay
    /// - `auxiliary`: pin driving the auxiliary relay
    /// - `active_high`: if false, a coil is energized when its pin is LOW
    pub fn new(primary: P, auxiliary: P, active_high: bool) -> Self {
        let mut pair = Self {
            primary,
            auxiliary,
            active_high,
        };
        pair.set_output(RelayChannel::Primary, false);
        pair.set_output(RelayChannel::Auxiliary, false);
        pair
    }

    /// Create a relay pair with active-high outputs
    pub fn new_active_high(primary: P, auxiliary: P) -> Self {
        Self::new(primary, auxiliary, true)
    }

    /// Create a relay pair with active-low outputs
    pub fn new_active_low(primary: P, auxiliary: P) -> Self {
        Self::new(primary, auxiliary, false)
    }

    fn drive(pin: &mut P, energized: bool, active_high: bool) {
        if energized == active_high {
            pin.set_high();
        } else {
            pin.set_low();
        }
    }
}

impl<P: OutputPin> RelayActuator for GpioRelayPair<P> {
    fn set_output(&mut self, channel: RelayChannel, energized: bool) {
        let active_high = self.active_high;
        let pin = match channel {
            RelayChannel::Primary => &mut self.primary,
            RelayChannel::Auxiliary => &mut self.auxiliary,
        };
        Self::drive(pin, energized, active_high);
    }
}
