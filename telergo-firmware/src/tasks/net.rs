//! Wi-Fi and MQTT transport worker
//!
//! Owns the TCP socket and the MQTT client, one connection at a time,
//! and serves session requests from the control tasks. Runs on the
//! interrupt executor together with the network runners, so it keeps
//! making progress while a control task blocks on a reply.

use core::net::Ipv4Addr;

use cyw43_pio::PioSpi;
use defmt::*;
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpAddress, IpEndpoint, Stack};
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_time::{with_timeout, Duration, Instant};
use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::utils::rng_generator::CountingRng;

use telergo_core::config::clipped;

use crate::channels::{INBOUND, NET_REPLY, NET_REQUEST};
use crate::session::{NetReply, NetRequest};

/// Diagnostic codes reported through `Session::state_code`
const CODE_DNS_FAILED: i8 = -4;
const CODE_TCP_FAILED: i8 = -2;
const CODE_MQTT_REFUSED: i8 = -1;

/// How long one poll request may wait for an inbound packet
const RECEIVE_BUDGET: Duration = Duration::from_millis(2);

/// Keep-alive ping cadence while the session is up
const PING_INTERVAL: Duration = Duration::from_secs(30);

#[embassy_executor::task]
pub async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
pub async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

#[embassy_executor::task]
pub async fn transport_task(stack: Stack<'static>) {
    info!("Transport task started");

    let mut pending: Option<NetRequest> = None;

    loop {
        // Wait for a connect request; everything else fails fast while
        // there is no session.
        let (host, port, client_id) = loop {
            let request = match pending.take() {
                Some(request) => request,
                None => NET_REQUEST.receive().await,
            };
            match request {
                NetRequest::Connect {
                    host,
                    port,
                    client_id,
                } => break (host, port, client_id),
                NetRequest::Subscribe { .. } => NET_REPLY.send(NetReply::Subscribed).await,
                NetRequest::Publish { .. } => {
                    NET_REPLY.send(NetReply::Publish { ok: false }).await
                }
                NetRequest::Poll => NET_REPLY.send(NetReply::Polled).await,
                NetRequest::Status => {
                    NET_REPLY.send(NetReply::Status { connected: false }).await
                }
            }
        };

        let endpoint = match resolve(stack, host.as_str(), port).await {
            Some(endpoint) => endpoint,
            None => {
                warn!("DNS lookup failed for {}", host.as_str());
                NET_REPLY
                    .send(NetReply::Connect {
                        ok: false,
                        code: CODE_DNS_FAILED,
                    })
                    .await;
                continue;
            }
        };

        let mut rx_buffer = [0u8; 1024];
        let mut tx_buffer = [0u8; 1024];
        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(30)));

        if let Err(e) = socket.connect(endpoint).await {
            warn!("TCP connect failed: {:?}", e);
            NET_REPLY
                .send(NetReply::Connect {
                    ok: false,
                    code: CODE_TCP_FAILED,
                })
                .await;
            continue;
        }

        let mut config = ClientConfig::new(MqttVersion::MQTTv5, CountingRng(20000));
        config.add_client_id(client_id.as_str());
        config.add_max_subscribe_qos(QualityOfService::QoS0);
        config.max_packet_size = 1024;
        let mut write_buffer = [0u8; 512];
        let mut recv_buffer = [0u8; 512];
        let mut client = MqttClient::<_, 5, _>::new(
            socket,
            &mut write_buffer,
            512,
            &mut recv_buffer,
            512,
            config,
        );

        if let Err(e) = client.connect_to_broker().await {
            warn!("MQTT connect refused: {:?}", Debug2Format(&e));
            NET_REPLY
                .send(NetReply::Connect {
                    ok: false,
                    code: CODE_MQTT_REFUSED,
                })
                .await;
            continue;
        }
        NET_REPLY.send(NetReply::Connect { ok: true, code: 0 }).await;

        // Serve this session until it drops or a reconnect is requested.
        let mut alive = true;
        let mut last_ping = Instant::now();
        while alive {
            match NET_REQUEST.receive().await {
                request @ NetRequest::Connect { .. } => {
                    // The link machine wants a fresh session; tear this
                    // one down and reconnect.
                    pending = Some(request);
                    break;
                }
                NetRequest::Subscribe { topic } => {
                    if let Err(e) = client.subscribe_to_topic(topic.as_str()).await {
                        warn!("Subscribe failed: {:?}", Debug2Format(&e));
                        alive = false;
                    }
                    NET_REPLY.send(NetReply::Subscribed).await;
                }
                NetRequest::Publish { topic, payload } => {
                    let result = client
                        .send_message(
                            topic.as_str(),
                            payload.as_bytes(),
                            QualityOfService::QoS0,
                            false,
                        )
                        .await;
                    if let Err(e) = &result {
                        warn!("Publish failed: {:?}", Debug2Format(e));
                    }
                    NET_REPLY
                        .send(NetReply::Publish {
                            ok: result.is_ok(),
                        })
                        .await;
                }
                NetRequest::Poll => {
                    match with_timeout(RECEIVE_BUDGET, client.receive_message()).await {
                        Ok(Ok((_topic, payload))) => {
                            if let Ok(text) = core::str::from_utf8(payload) {
                                if INBOUND.try_send(clipped(text)).is_err() {
                                    warn!("Inbound queue full, message dropped");
                                }
                            }
                        }
                        Ok(Err(e)) => {
                            warn!("Receive failed: {:?}", Debug2Format(&e));
                            alive = false;
                        }
                        Err(_) => {} // nothing pending within the budget
                    }
                    if alive && last_ping.elapsed() >= PING_INTERVAL {
                        if client.send_ping().await.is_err() {
                            alive = false;
                        }
                        last_ping = Instant::now();
                    }
                    NET_REPLY.send(NetReply::Polled).await;
                }
                NetRequest::Status => {
                    NET_REPLY.send(NetReply::Status { connected: alive }).await;
                }
            }
        }
        // Client and socket drop here; the outer loop then waits for the
        // link machine's next connect request.
    }
}

/// Resolve a broker host, accepting a literal IPv4 address without a DNS
/// round trip.
async fn resolve(stack: Stack<'static>, host: &str, port: u16) -> Option<IpEndpoint> {
    if let Ok(addr) = host.parse::<Ipv4Addr>() {
        return Some(IpEndpoint::new(IpAddress::Ipv4(addr), port));
    }
    let addrs = stack.dns_query(host, DnsQueryType::A).await.ok()?;
    addrs.first().map(|&addr| IpEndpoint::new(addr, port))
}
