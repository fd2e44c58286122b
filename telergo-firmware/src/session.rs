//! Platform capabilities for the broker link
//!
//! `ChannelSession` adapts the transport worker (`tasks::net`) to the
//! synchronous `Session` capability: each operation is forwarded over a
//! request/reply channel pair and the calling task blocks until the
//! worker replies. The worker and the network runners live on the
//! interrupt executor, which preempts the thread executor this runs on,
//! so the exchange always makes progress.

use defmt::*;
use embassy_futures::block_on;
use embassy_time::{block_for, Duration};
use heapless::String;

use telergo_core::config::{clipped, MAX_CLIENT_ID_LEN, MAX_HOST_LEN, MAX_TOPIC_LEN};
use telergo_core::link::{DiagSink, LinkEvent, Payload};
use telergo_core::traits::{RestartControl, Session};

use crate::channels::{NET_REPLY, NET_REQUEST};

/// Session operation forwarded to the transport worker.
pub enum NetRequest {
    Connect {
        host: String<MAX_HOST_LEN>,
        port: u16,
        client_id: String<MAX_CLIENT_ID_LEN>,
    },
    Subscribe {
        topic: String<MAX_TOPIC_LEN>,
    },
    Publish {
        topic: String<MAX_TOPIC_LEN>,
        payload: Payload,
    },
    Poll,
    Status,
}

/// Worker reply to one request.
pub enum NetReply {
    Connect { ok: bool, code: i8 },
    Subscribed,
    Publish { ok: bool },
    Polled,
    Status { connected: bool },
}

/// Session capability served by the transport worker.
pub struct ChannelSession {
    last_code: i8,
}

impl ChannelSession {
    pub const fn new() -> Self {
        Self { last_code: 0 }
    }

    fn exchange(&self, request: NetRequest) -> NetReply {
        block_on(async {
            NET_REQUEST.send(request).await;
            NET_REPLY.receive().await
        })
    }
}

impl Session for ChannelSession {
    fn connect(&mut self, broker: &str, port: u16, client_id: &str) -> bool {
        let reply = self.exchange(NetRequest::Connect {
            host: clipped(broker),
            port,
            client_id: clipped(client_id),
        });
        match reply {
            NetReply::Connect { ok, code } => {
                self.last_code = code;
                ok
            }
            _ => false,
        }
    }

    fn subscribe(&mut self, topic: &str) {
        let _ = self.exchange(NetRequest::Subscribe {
            topic: clipped(topic),
        });
    }

    fn publish(&mut self, topic: &str, payload: &str) -> bool {
        matches!(
            self.exchange(NetRequest::Publish {
                topic: clipped(topic),
                payload: clipped(payload),
            }),
            NetReply::Publish { ok: true }
        )
    }

    fn connected(&mut self) -> bool {
        matches!(
            self.exchange(NetRequest::Status),
            NetReply::Status { connected: true }
        )
    }

    fn poll(&mut self) {
        let _ = self.exchange(NetRequest::Poll);
    }

    fn state_code(&self) -> i8 {
        self.last_code
    }
}

/// Diagnostic sink rendering link events through defmt.
pub struct DefmtDiag;

impl DiagSink for DefmtDiag {
    fn report(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Connected => info!("Connected to broker"),
            LinkEvent::ConnectFailed { code } => warn!("Broker connect failed, rc={}", code),
            LinkEvent::RetryScheduled { delay_ms } => info!("Retry in {} ms", delay_ms),
            LinkEvent::RetriesExhausted => error!("Too many retries, restarting"),
            LinkEvent::ConnectionLost => warn!("Lost connection to broker"),
            LinkEvent::Publish { ok: true } => debug!("Publish ok"),
            LinkEvent::Publish { ok: false } => warn!("Publish failed"),
        }
    }
}

/// Fail-safe restart through the Cortex-M system reset.
pub struct SysRestart;

impl RestartControl for SysRestart {
    fn restart(&mut self, grace_ms: u32) {
        block_for(Duration::from_millis(grace_ms as u64));
        cortex_m::peripheral::SCB::sys_reset();
    }
}
