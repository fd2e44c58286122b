//! Broker link state machine
//!
//! Owns the session lifecycle: one connect attempt at a time, a fixed
//! (not exponential) wait between attempts, a bounded retry budget whose
//! exhaustion hands control to the fail-safe restart capability, and a
//! single-slot outbound buffer drained whenever the session is idle.
//!
//! `run()` does at most one step per call and never blocks; every failure
//! becomes a state transition or a [`LinkEvent`], never a panic.

use crate::clock::Millis;
use crate::config::LinkConfig;
use crate::link::events::{DiagSink, LinkEvent};
use crate::traits::{RestartControl, Session};
use heapless::String;

/// Maximum outbound payload length
pub const MAX_PAYLOAD_LEN: usize = 128;

/// Outbound message payload
pub type Payload = String<MAX_PAYLOAD_LEN>;

/// Link phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    /// Attempt a connection on the next run
    Connect,
    /// Waiting out the fixed interval before the next attempt
    RetryWait,
    /// Session up, nothing to send
    Idle,
    /// Session up, outbound slot being drained
    Publish,
}

/// Broker connection manager.
///
/// Composed from injected capabilities: the session it operates, the
/// restart control it escalates to, and a diagnostic sink. It owns none
/// of the transport machinery itself.
pub struct BrokerLink<S, R, D> {
    session: S,
    restart: R,
    diag: D,
    config: LinkConfig,
    phase: Phase,
    /// Failed attempts since the last successful connect
    retry_count: u8,
    /// When the last attempt failed
    last_attempt: Millis,
    /// Single-slot outbound buffer; a new publish overwrites it
    outbound: Option<Payload>,
    /// Invoked once per successful connection, after the subscribe step
    on_connected: Option<fn()>,
}

impl<S, R, D> BrokerLink<S, R, D>
where
    S: Session,
    R: RestartControl,
    D: DiagSink,
{
    /// Create a link machine over the given capabilities.
    pub fn new(session: S, restart: R, diag: D) -> Self {
        Self {
            session,
            restart,
            diag,
            config: LinkConfig::default(),
            phase: Phase::Connect,
            retry_count: 0,
            last_attempt: Millis::new(0),
            outbound: None,
            on_connected: None,
        }
    }

    /// Store the broker configuration. No connection is attempted here;
    /// the first `run()` does that.
    pub fn begin(&mut self, config: LinkConfig) {
        self.config = config;
    }

    /// Queue `message` for publication to the configured topic.
    ///
    /// Returns immediately. The slot holds one message: a newer publish
    /// overwrites an unsent older one, and delivery is at-most-once. A
    /// message queued while the connection is down is sent only once the
    /// session is idle again. Payloads longer than [`MAX_PAYLOAD_LEN`]
    /// are clipped.
    pub fn publish(&mut self, message: &str) {
        self.outbound = Some(crate::config::clipped(message));
    }

    /// Register a hook invoked once per successful connection, after the
    /// subscribe step and before any pending publish is drained. Any
    /// state the hook reaches for is the caller's to own.
    pub fn set_connected_hook(&mut self, hook: fn()) {
        self.on_connected = Some(hook);
    }

    /// Failed attempts since the last successful connect.
    pub fn retry_count(&self) -> u8 {
        self.retry_count
    }

    /// Advance the machine by at most one step. Returns whether the
    /// session is currently usable.
    pub fn run(&mut self, now: Millis) -> bool {
        match self.phase {
            Phase::Connect => self.attempt_connect(now),
            Phase::RetryWait => {
                if now.has_elapsed(self.last_attempt, self.config.retry_interval_ms) {
                    self.phase = Phase::Connect;
                }
            }
            Phase::Idle => {
                if self.session.connected() {
                    self.session.poll();
                    if self.outbound.is_some() {
                        self.phase = Phase::Publish;
                    }
                } else {
                    self.diag.report(LinkEvent::ConnectionLost);
                    // Same underlying instability: the retry budget
                    // carries over, it is not reset here.
                    self.phase = Phase::Connect;
                }
            }
            Phase::Publish => {
                if let Some(payload) = self.outbound.take() {
                    let ok = self
                        .session
                        .publish(self.config.topic.as_str(), payload.as_str());
                    self.diag.report(LinkEvent::Publish { ok });
                }
                self.session.poll();
                self.phase = Phase::Idle;
            }
        }
        matches!(self.phase, Phase::Idle | Phase::Publish)
    }

    fn attempt_connect(&mut self, now: Millis) {
        let connected = self.session.connect(
            self.config.broker.as_str(),
            self.config.port,
            self.config.client_id.as_str(),
        );

        if connected {
            self.retry_count = 0;
            self.diag.report(LinkEvent::Connected);
            // Commands for this device arrive on its own identifier
            self.session.subscribe(self.config.client_id.as_str());
            if let Some(hook) = self.on_connected {
                hook();
            }
            self.phase = Phase::Idle;
        } else {
            self.diag.report(LinkEvent::ConnectFailed {
                code: self.session.state_code(),
            });
            self.retry_count = self.retry_count.saturating_add(1);
            if self.retry_count > self.config.max_retries {
                self.diag.report(LinkEvent::RetriesExhausted);
                self.restart.restart(self.config.restart_grace_ms);
                // On hardware the restart does not return. Test doubles
                // do; from here the machine just schedules another wait.
            } else {
                self.diag.report(LinkEvent::RetryScheduled {
                    delay_ms: self.config.retry_interval_ms,
                });
            }
            self.last_attempt = now;
            self.phase = Phase::RetryWait;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::clipped;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use heapless::Vec;

    struct FakeSession {
        /// Scripted outcome per connect attempt; the last entry repeats
        script: Vec<bool, 16>,
        attempts: usize,
        connected: bool,
        publish_ok: bool,
        code: i8,
        subscribes: Vec<String<64>, 4>,
        publishes: Vec<(String<64>, Payload), 8>,
        polls: usize,
    }

    impl FakeSession {
        fn scripted(script: &[bool]) -> Self {
            let mut s = Vec::new();
            for &ok in script {
                let _ = s.push(ok);
            }
            Self {
                script: s,
                attempts: 0,
                connected: false,
                publish_ok: true,
                code: -2,
                subscribes: Vec::new(),
                publishes: Vec::new(),
                polls: 0,
            }
        }
    }

    impl Session for FakeSession {
        fn connect(&mut self, _broker: &str, _port: u16, _client_id: &str) -> bool {
            let index = self.attempts.min(self.script.len() - 1);
            self.attempts += 1;
            self.connected = self.script[index];
            self.connected
        }

        fn subscribe(&mut self, topic: &str) {
            let _ = self.subscribes.push(clipped(topic));
        }

        fn publish(&mut self, topic: &str, payload: &str) -> bool {
            let _ = self.publishes.push((clipped(topic), clipped(payload)));
            self.publish_ok
        }

        fn connected(&mut self) -> bool {
            self.connected
        }

        fn poll(&mut self) {
            self.polls += 1;
        }

        fn state_code(&self) -> i8 {
            self.code
        }
    }

    #[derive(Default)]
    struct FakeRestart {
        calls: usize,
        grace_ms: u32,
    }

    impl RestartControl for FakeRestart {
        fn restart(&mut self, grace_ms: u32) {
            self.calls += 1;
            self.grace_ms = grace_ms;
        }
    }

    #[derive(Default)]
    struct EventLog {
        events: Vec<LinkEvent, 64>,
    }

    impl DiagSink for EventLog {
        fn report(&mut self, event: LinkEvent) {
            let _ = self.events.push(event);
        }
    }

    type TestLink = BrokerLink<FakeSession, FakeRestart, EventLog>;

    fn config() -> LinkConfig {
        LinkConfig {
            broker: clipped("broker.local"),
            topic: clipped("switch/state"),
            client_id: clipped("switch-1"),
            retry_interval_ms: 10_000,
            max_retries: 3,
            ..LinkConfig::default()
        }
    }

    fn link(script: &[bool]) -> TestLink {
        let mut link = BrokerLink::new(
            FakeSession::scripted(script),
            FakeRestart::default(),
            EventLog::default(),
        );
        link.begin(config());
        link
    }

    #[test]
    fn test_connect_success_subscribes_own_topic() {
        let mut link = link(&[true]);

        assert!(link.run(Millis::new(0)));
        assert_eq!(link.session.attempts, 1);
        assert_eq!(link.session.subscribes[0].as_str(), "switch-1");
        assert_eq!(link.retry_count(), 0);
        assert_eq!(link.diag.events[0], LinkEvent::Connected);
    }

    #[test]
    fn test_connect_failure_waits_out_fixed_interval() {
        let mut link = link(&[false, true]);

        assert!(!link.run(Millis::new(0)));
        assert_eq!(link.retry_count(), 1);
        assert_eq!(
            link.diag.events[0],
            LinkEvent::ConnectFailed { code: -2 }
        );
        assert_eq!(
            link.diag.events[1],
            LinkEvent::RetryScheduled { delay_ms: 10_000 }
        );

        // No new attempt until the interval has fully elapsed
        assert!(!link.run(Millis::new(5_000)));
        assert!(!link.run(Millis::new(9_999)));
        assert_eq!(link.session.attempts, 1);

        // Interval over: one run re-arms, the next attempts and succeeds
        assert!(!link.run(Millis::new(10_000)));
        assert!(link.run(Millis::new(10_001)));
        assert_eq!(link.session.attempts, 2);
        assert_eq!(link.retry_count(), 0);
    }

    #[test]
    fn test_retry_exhaustion_invokes_restart() {
        // max_retries = 3: the restart fires on the fourth failure
        let mut link = link(&[false]);
        let mut now = Millis::new(0);

        for _ in 0..200 {
            link.run(now);
            now = now.offset(1_000);
            if link.restart.calls > 0 {
                break;
            }
        }

        assert_eq!(link.session.attempts, 4);
        assert_eq!(link.restart.calls, 1);
        assert_eq!(link.restart.grace_ms, 5_000);
        assert!(link
            .diag
            .events
            .contains(&LinkEvent::RetriesExhausted));
    }

    #[test]
    fn test_no_restart_below_ceiling() {
        // Three failures, then success: the budget is never exceeded
        let mut link = link(&[false, false, false, true]);
        let mut now = Millis::new(0);

        for _ in 0..100 {
            link.run(now);
            now = now.offset(1_000);
        }

        assert_eq!(link.restart.calls, 0);
        assert_eq!(link.retry_count(), 0);
    }

    #[test]
    fn test_retry_count_strictly_increases_until_success() {
        let mut link = link(&[false, false, true]);
        let mut now = Millis::new(0);
        let mut seen = Vec::<u8, 16>::new();

        for _ in 0..100 {
            link.run(now);
            now = now.offset(1_000);
            if seen.last() != Some(&link.retry_count()) {
                let _ = seen.push(link.retry_count());
            }
        }

        assert_eq!(seen.as_slice(), &[1, 2, 0]);
    }

    #[test]
    fn test_disconnect_reconnects_without_resetting_budget() {
        let mut link = link(&[true, false]);

        assert!(link.run(Millis::new(0)));

        // Session drops while idle
        link.session.connected = false;
        assert!(!link.run(Millis::new(100)));
        assert!(link.diag.events.contains(&LinkEvent::ConnectionLost));

        // Next attempt fails: the budget resumes from its prior value
        link.run(Millis::new(101));
        assert_eq!(link.retry_count(), 1);
    }

    #[test]
    fn test_publish_drains_latest_message_once() {
        let mut link = link(&[true]);
        link.run(Millis::new(0));

        link.publish("first");
        link.publish("second");

        link.run(Millis::new(1)); // Idle: notices the pending slot
        link.run(Millis::new(2)); // Publish: drains it

        assert_eq!(link.session.publishes.len(), 1);
        let (topic, payload) = &link.session.publishes[0];
        assert_eq!(topic.as_str(), "switch/state");
        assert_eq!(payload.as_str(), "second");
        assert!(link.diag.events.contains(&LinkEvent::Publish { ok: true }));
    }

    #[test]
    fn test_publish_failure_reported_and_dropped() {
        let mut link = link(&[true]);
        link.session.publish_ok = false;
        link.run(Millis::new(0));

        link.publish("lost");
        link.run(Millis::new(1));
        link.run(Millis::new(2));

        assert!(link
            .diag
            .events
            .contains(&LinkEvent::Publish { ok: false }));

        // At-most-once: nothing is re-sent afterwards
        for t in 3..20 {
            link.run(Millis::new(t));
        }
        assert_eq!(link.session.publishes.len(), 1);
    }

    #[test]
    fn test_publish_while_down_is_deferred() {
        let mut link = link(&[false, true]);

        link.run(Millis::new(0));
        link.publish("queued");

        // Still waiting: nothing reaches the session
        link.run(Millis::new(1_000));
        assert!(link.session.publishes.is_empty());

        // Reconnect, then the slot drains
        link.run(Millis::new(10_000));
        link.run(Millis::new(10_001));
        link.run(Millis::new(10_002));
        link.run(Millis::new(10_003));
        assert_eq!(link.session.publishes.len(), 1);
        assert_eq!(link.session.publishes[0].1.as_str(), "queued");
    }

    #[test]
    fn test_usable_only_while_connected() {
        let mut link = link(&[false, true]);

        assert!(!link.run(Millis::new(0)));
        assert!(!link.run(Millis::new(5_000)));
        link.run(Millis::new(10_000));
        assert!(link.run(Millis::new(10_001)));
    }

    #[test]
    fn test_poll_serviced_while_idle() {
        let mut link = link(&[true]);
        link.run(Millis::new(0));

        for t in 1..=5 {
            link.run(Millis::new(t));
        }
        assert_eq!(link.session.polls, 5);
    }

    static HOOK_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn count_hook() {
        HOOK_CALLS.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    fn test_connected_hook_fires_once_per_connection() {
        let mut link = link(&[true]);
        link.set_connected_hook(count_hook);

        link.run(Millis::new(0));
        assert_eq!(HOOK_CALLS.load(Ordering::Relaxed), 1);

        // Idle polling must not re-fire it
        for t in 1..10 {
            link.run(Millis::new(t));
        }
        assert_eq!(HOOK_CALLS.load(Ordering::Relaxed), 1);

        // A reconnect fires it again
        link.session.connected = false;
        link.run(Millis::new(10));
        link.run(Millis::new(11));
        assert_eq!(HOOK_CALLS.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_long_payload_is_clipped() {
        let mut link = link(&[true]);
        link.run(Millis::new(0));

        let mut long = String::<200>::new();
        for _ in 0..200 {
            let _ = long.push('x');
        }
        link.publish(long.as_str());
        link.run(Millis::new(1));
        link.run(Millis::new(2));

        assert_eq!(link.session.publishes[0].1.len(), MAX_PAYLOAD_LEN);
    }

    #[test]
    fn test_retry_wait_across_counter_wrap() {
        let mut link = link(&[false, true]);
        let start = Millis::new(u32::MAX - 4_000);

        link.run(start);
        assert_eq!(link.session.attempts, 1);

        // 10s interval straddling the wrap boundary
        link.run(start.offset(9_999));
        assert_eq!(link.session.attempts, 1);
        link.run(start.offset(10_000));
        link.run(start.offset(10_001));
        assert_eq!(link.session.attempts, 2);
    }
}
