//! Broker command decoding

/// Commands accepted on the device's own topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum SwitchCommand {
    /// Close the switch
    On,
    /// Open the switch
    Off,
    /// Flip the switch
    Toggle,
    /// Report the current state without changing it
    Query,
}

impl SwitchCommand {
    /// Decode a broker payload; unknown payloads yield `None`.
    pub fn parse(payload: &str) -> Option<Self> {
        match payload.trim() {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            "toggle" => Some(Self::Toggle),
            "query" => Some(Self::Query),
            _ => None,
        }
    }
}
