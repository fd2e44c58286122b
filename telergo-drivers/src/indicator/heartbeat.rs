//! Heartbeat LED indicator
//!
//! A two-state blinker that shows the firmware is alive. Polled like the
//! core machines: call `run()` frequently with the current timestamp and
//! the LED flips whenever the active interval has elapsed. On and off
//! times are independent, so the duty cycle can encode status (short
//! blip while healthy, symmetric blink while attention is needed).

use telergo_core::clock::Millis;

use crate::pin::OutputPin;

/// Polled LED blinker with independent on and off times.
pub struct Heartbeat<P> {
    pin: P,
    on_ms: u32,
    off_ms: u32,
    /// Current LED state
    lit: bool,
    /// When the LED last changed
    last_edge: Millis,
}

impl<P: OutputPin> Heartbeat<P> {
    /// Symmetric blinker: equal time on and off.
    pub fn new(pin: P, interval_ms: u32) -> Self {
        Self::with_times(pin, interval_ms, interval_ms)
    }

    /// Blinker with independent on and off times.
    pub fn with_times(pin: P, on_ms: u32, off_ms: u32) -> Self {
        Self {
            pin,
            on_ms,
            off_ms,
            lit: true,
            last_edge: Millis::new(0),
        }
    }

    /// Light the LED and start timing. Call once before polling.
    pub fn begin(&mut self, now: Millis) {
        self.lit = true;
        self.pin.set_high();
        self.last_edge = now;
    }

    /// Change the blink pattern. The new times also apply to the
    /// interval already in progress.
    pub fn set_interval(&mut self, on_ms: u32, off_ms: u32) {
        self.on_ms = on_ms;
        self.off_ms = off_ms;
    }

    /// Advance the blinker, flipping the LED if its interval elapsed.
    pub fn run(&mut self, now: Millis) {
        let interval = if self.lit { self.on_ms } else { self.off_ms };
        if now.has_elapsed(self.last_edge, interval) {
            self.lit = !self.lit;
            self.last_edge = now;
            if self.lit {
                self.pin.set_high();
            } else {
                self.pin.set_low();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockPin {
        high: bool,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    fn heartbeat(on_ms: u32, off_ms: u32) -> Heartbeat<MockPin> {
        let mut hb = Heartbeat::with_times(MockPin { high: false }, on_ms, off_ms);
        hb.begin(Millis::new(0));
        hb
    }

    #[test]
    fn test_starts_lit() {
        let hb = heartbeat(100, 100);
        assert!(hb.pin.is_set_high());
    }

    #[test]
    fn test_symmetric_blink_edges() {
        let mut hb = heartbeat(100, 100);

        hb.run(Millis::new(99));
        assert!(hb.pin.is_set_high());

        hb.run(Millis::new(100));
        assert!(!hb.pin.is_set_high());

        hb.run(Millis::new(199));
        assert!(!hb.pin.is_set_high());

        hb.run(Millis::new(200));
        assert!(hb.pin.is_set_high());
    }

    #[test]
    fn test_asymmetric_duty_cycle() {
        let mut hb = heartbeat(50, 950);

        hb.run(Millis::new(50));
        assert!(!hb.pin.is_set_high());

        // Off period is the long one
        hb.run(Millis::new(999));
        assert!(!hb.pin.is_set_high());

        hb.run(Millis::new(1000));
        assert!(hb.pin.is_set_high());
    }

    #[test]
    fn test_set_interval_shortens_current_period() {
        let mut hb = heartbeat(100, 100);

        hb.set_interval(10, 10);
        hb.run(Millis::new(10));
        assert!(!hb.pin.is_set_high());
        hb.run(Millis::new(20));
        assert!(hb.pin.is_set_high());
    }

    #[test]
    fn test_blink_across_counter_wrap() {
        let mut hb = heartbeat(100, 100);
        let start = Millis::new(u32::MAX - 50);
        hb.begin(start);

        hb.run(start.offset(99));
        assert!(hb.pin.is_set_high());
        hb.run(start.offset(100));
        assert!(!hb.pin.is_set_high());
    }
}
