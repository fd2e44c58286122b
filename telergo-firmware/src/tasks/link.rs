//! Broker link task
//!
//! Polls the connection manager, decodes inbound broker messages into
//! switch commands, and publishes the switch state after every completed
//! transition.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use telergo_core::clock::Millis;
use telergo_core::link::BrokerLink;

use crate::channels::{INBOUND, SWITCH_CMD, SWITCH_STATE};
use crate::command::SwitchCommand;
use crate::config;
use crate::session::{ChannelSession, DefmtDiag, SysRestart};

/// Link poll interval; well under the retry interval and fast enough to
/// drain inbound commands promptly.
const POLL_INTERVAL_MS: u64 = 20;

#[embassy_executor::task]
pub async fn link_task() {
    info!("Link task started");

    let mut link = BrokerLink::new(ChannelSession::new(), SysRestart, DefmtDiag);
    link.begin(config::link_config());
    link.set_connected_hook(announce_state);

    let started = Instant::now();
    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));

    loop {
        let now = Millis::new(started.elapsed().as_millis() as u32);
        link.run(now);

        while let Ok(payload) = INBOUND.try_receive() {
            match SwitchCommand::parse(payload.as_str()) {
                Some(cmd) => SWITCH_CMD.signal(cmd),
                None => warn!("Unknown command: {}", payload.as_str()),
            }
        }

        if let Some(closed) = SWITCH_STATE.try_take() {
            link.publish(if closed { "closed" } else { "open" });
        }

        ticker.next().await;
    }
}

/// Connected hook: have the switch task report its state so the broker
/// sees it after every (re)connect.
fn announce_state() {
    SWITCH_CMD.signal(SwitchCommand::Query);
}
