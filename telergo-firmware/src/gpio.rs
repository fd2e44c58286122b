//! Pin adapter between embassy-rp GPIO and the driver pin trait

use embassy_rp::gpio::Output;
use telergo_drivers::pin::OutputPin;

/// embassy-rp output pin wrapped for the telergo-drivers traits.
pub struct RpPin(pub Output<'static>);

impl OutputPin for RpPin {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}
