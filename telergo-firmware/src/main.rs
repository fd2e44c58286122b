//! Telergo - Remote Switch Firmware
//!
//! Main firmware binary for the Raspberry Pi Pico W remote switch: two
//! interlocked relays sequenced with a dwell delay, driven over MQTT.
//!
//! Named after the Greek "telergos" meaning "working at a distance".

#![no_std]
#![no_main]

use cyw43_pio::PioSpi;
use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_net::StackResources;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

mod channels;
mod command;
mod config;
mod gpio;
mod session;
mod tasks;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

// Radio firmware blobs from the embassy-rs cyw43-firmware distribution;
// copy them next to the crate before flashing.
static FW: &[u8] = include_bytes!("../cyw43-firmware/43439A0.bin");
static CLM: &[u8] = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

// Static cells for radio and network state (must live forever)
static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();

/// High-priority executor for the network runners and transport worker
static EXEC_NET: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXEC_NET.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Telergo firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Pico W radio over PIO SPI
    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        cyw43_pio::DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, FW).await;

    // The network side runs at interrupt priority so the transport
    // worker keeps serving while a control task blocks on a reply
    interrupt::SWI_IRQ_1.set_priority(Priority::P3);
    let net_spawner = EXEC_NET.start(interrupt::SWI_IRQ_1);
    unwrap!(net_spawner.spawn(tasks::cyw43_task(runner)));

    control.init(CLM).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    // DHCP; the seed only has to differ between this device's sockets
    let net_config = embassy_net::Config::dhcpv4(Default::default());
    let seed = 0x7268_1f83_94c2_a6d1;
    let (stack, net_runner) = embassy_net::new(
        net_device,
        net_config,
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );
    unwrap!(net_spawner.spawn(tasks::net_task(net_runner)));

    loop {
        match control
            .join_wpa2(config::WIFI_SSID, config::WIFI_PASSWORD)
            .await
        {
            Ok(()) => break,
            Err(err) => warn!("Wi-Fi join failed, status={}", err.status),
        }
    }
    info!("Wi-Fi joined");

    stack.wait_config_up().await;
    info!("Network up");

    unwrap!(net_spawner.spawn(tasks::transport_task(stack)));

    // Control side stays on the thread executor
    let primary = Output::new(p.PIN_14, Level::Low);
    let auxiliary = Output::new(p.PIN_15, Level::Low);
    unwrap!(spawner.spawn(tasks::switch_task(primary, auxiliary)));

    let led = Output::new(p.PIN_16, Level::Low);
    unwrap!(spawner.spawn(tasks::heartbeat_task(led)));

    unwrap!(spawner.spawn(tasks::link_task()));
}
