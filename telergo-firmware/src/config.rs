//! Compile-time device configuration
//!
//! The switch has no runtime configuration surface; these constants are
//! the whole of it.

use telergo_core::config::{clipped, LinkConfig};
use telergo_core::relay::DEFAULT_DWELL_MS;

/// Wi-Fi network name
pub const WIFI_SSID: &str = "changeme";
/// Wi-Fi passphrase
pub const WIFI_PASSWORD: &str = "changeme";

/// Broker host name or address
pub const BROKER_HOST: &str = "broker.local";
/// Broker TCP port
pub const BROKER_PORT: u16 = 1883;
/// Topic switch state is published to
pub const STATE_TOPIC: &str = "telergo/switch/state";
/// Client identifier; commands arrive on this topic
pub const CLIENT_ID: &str = "telergo-switch";

/// Dwell between the two relay edges (ms)
pub const DWELL_MS: u32 = DEFAULT_DWELL_MS;
/// Fixed wait between broker connect attempts (ms)
pub const RETRY_INTERVAL_MS: u32 = 10_000;
/// Failed attempts beyond this count restart the device
pub const MAX_RETRIES: u8 = 10;
/// Diagnostic drain time before the fail-safe restart (ms)
pub const RESTART_GRACE_MS: u32 = 5_000;

/// Heartbeat blip: short flash, long pause
pub const HEARTBEAT_ON_MS: u32 = 50;
pub const HEARTBEAT_OFF_MS: u32 = 950;

/// Broker link configuration assembled from the constants above.
pub fn link_config() -> LinkConfig {
    LinkConfig {
        broker: clipped(BROKER_HOST),
        port: BROKER_PORT,
        topic: clipped(STATE_TOPIC),
        client_id: clipped(CLIENT_ID),
        retry_interval_ms: RETRY_INTERVAL_MS,
        max_retries: MAX_RETRIES,
        restart_grace_ms: RESTART_GRACE_MS,
    }
}
