//! Relay switch task
//!
//! Polls the relay interlock every millisecond, feeds it commands decoded
//! from the broker, and announces every completed transition.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Instant, Ticker};

use telergo_core::clock::Millis;
use telergo_core::relay::RelayInterlock;
use telergo_drivers::relay::GpioRelayPair;

use crate::channels::{SWITCH_CMD, SWITCH_STATE};
use crate::command::SwitchCommand;
use crate::config;
use crate::gpio::RpPin;

#[embassy_executor::task]
pub async fn switch_task(primary: Output<'static>, auxiliary: Output<'static>) {
    info!("Switch task started");

    let pair = GpioRelayPair::new_active_high(RpPin(primary), RpPin(auxiliary));
    let mut interlock = RelayInterlock::new(pair, config::DWELL_MS);
    interlock.begin();

    let started = Instant::now();
    let mut was_idle = true;
    let mut ticker = Ticker::every(Duration::from_millis(1));

    loop {
        // Check for a new command (non-blocking)
        if let Some(cmd) = SWITCH_CMD.try_take() {
            debug!("Switch command: {:?}", cmd);
            match cmd {
                SwitchCommand::On => interlock.set(true),
                SwitchCommand::Off => interlock.set(false),
                SwitchCommand::Toggle => {
                    interlock.toggle();
                }
                SwitchCommand::Query => SWITCH_STATE.signal(interlock.is_closed()),
            }
        }

        let now = Millis::new(started.elapsed().as_millis() as u32);
        interlock.run(now);

        // Announce each completed transition
        let idle = interlock.is_idle();
        if idle && !was_idle {
            info!(
                "Switch {}",
                if interlock.is_closed() { "closed" } else { "open" }
            );
            SWITCH_STATE.signal(interlock.is_closed());
        }
        was_idle = idle;

        ticker.next().await;
    }
}
