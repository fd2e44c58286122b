//! Heartbeat LED task

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Instant, Ticker};

use telergo_core::clock::Millis;
use telergo_drivers::indicator::Heartbeat;

use crate::config;
use crate::gpio::RpPin;

#[embassy_executor::task]
pub async fn heartbeat_task(led: Output<'static>) {
    info!("Heartbeat task started");

    let mut heartbeat = Heartbeat::with_times(
        RpPin(led),
        config::HEARTBEAT_ON_MS,
        config::HEARTBEAT_OFF_MS,
    );
    let started = Instant::now();
    heartbeat.begin(Millis::new(0));

    let mut ticker = Ticker::every(Duration::from_millis(10));
    loop {
        let now = Millis::new(started.elapsed().as_millis() as u32);
        heartbeat.run(now);
        ticker.next().await;
    }
}
