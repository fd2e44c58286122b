//! Link lifecycle events

/// Status events reported while the link machine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Session established and subscribed.
    Connected,
    /// A connect attempt failed; `code` is the transport's diagnostic code.
    ConnectFailed { code: i8 },
    /// The next attempt runs after the fixed retry interval.
    RetryScheduled { delay_ms: u32 },
    /// The retry ceiling was exceeded; the device is about to restart.
    RetriesExhausted,
    /// An established session dropped; reconnecting.
    ConnectionLost,
    /// Result of draining the outbound slot.
    Publish { ok: bool },
}

/// Sink for link status events.
///
/// An optional collaborator, not required for correctness: the unit type
/// is the null sink.
pub trait DiagSink {
    /// Receive one status event.
    fn report(&mut self, event: LinkEvent);
}

impl DiagSink for () {
    fn report(&mut self, _event: LinkEvent) {}
}
