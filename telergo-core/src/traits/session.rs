//! Broker session trait
//!
//! The link machine is composed with an injected session rather than
//! derived from a transport implementation, so the lifecycle logic stays
//! independent of any particular client library and can be tested against
//! a fake.

/// A publish/subscribe session with the message broker.
///
/// The capability is assumed to sit on a reliable request/response
/// transport; framing, TLS and the broker wire protocol are its problem,
/// not the caller's. A `connect` attempt may take time; the link machine
/// only issues one when it has decided to (re)establish the session.
pub trait Session {
    /// Attempt to establish a session with the broker at `broker:port`,
    /// identifying as `client_id`. Returns `false` on failure;
    /// [`state_code`](Session::state_code) then reports why.
    fn connect(&mut self, broker: &str, port: u16, client_id: &str) -> bool;

    /// Subscribe to `topic`. Only called on an established session.
    fn subscribe(&mut self, topic: &str);

    /// Publish `payload` to `topic`. Returns `false` if the transport
    /// rejected the message; the caller does not retry.
    fn publish(&mut self, topic: &str, payload: &str) -> bool;

    /// Whether the session is currently established.
    fn connected(&mut self) -> bool;

    /// Service the transport's internal work (keep-alives, inbound
    /// messages). Called on every poll while the session is up.
    fn poll(&mut self);

    /// Transport-specific diagnostic code for the most recent failure.
    fn state_code(&self) -> i8;
}
