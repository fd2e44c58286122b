//! Platform system services

/// Fail-safe device restart.
///
/// Invoked only when the link machine has exhausted its reconnection
/// budget; a restart is the recovery of last resort for a persistently
/// stuck network stack.
pub trait RestartControl {
    /// Restart the device after waiting `grace_ms`, long enough for queued
    /// diagnostic output to drain. On hardware this does not return.
    fn restart(&mut self, grace_ms: u32);
}
