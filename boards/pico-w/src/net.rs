//! CYW43439 wifi bring-up
//!
//! The radio hangs off PIO0 as a SPI device. Its runner and the network
//! stack runner each get their own task; `bring_up` hands back the stack
//! handle plus the control handle used for joining and the onboard LED.

#![deny(unsafe_code)]

use cyw43::{Control, JoinOptions};
use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::{info, unwrap, warn, Debug2Format};
use embassy_executor::Spawner;
use embassy_net::{Config, Stack, StackResources};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIN_23, PIN_24, PIN_25, PIN_29, PIO0};
use embassy_rp::pio::Pio;
use embassy_rp::Peri;
use embassy_time::{with_timeout, Duration, Timer};
use static_cell::StaticCell;

use crate::Irqs;

/// Association attempts before the boot sequence gives up, one per second.
const JOIN_ATTEMPTS: u32 = 15;

const DHCP_WAIT: Duration = Duration::from_secs(30);

pub struct WifiPeripherals {
    pub pwr: Peri<'static, PIN_23>,
    pub cs: Peri<'static, PIN_25>,
    pub pio: Peri<'static, PIO0>,
    pub dio: Peri<'static, PIN_24>,
    pub clk: Peri<'static, PIN_29>,
    pub dma: Peri<'static, DMA_CH0>,
}

#[embassy_executor::task]
async fn wifi_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

pub async fn bring_up(spawner: Spawner, p: WifiPeripherals) -> (Stack<'static>, Control<'static>) {
    let fw = cyw43_firmware::CYW43_43439A0;
    let clm = cyw43_firmware::CYW43_43439A0_CLM;

    let pwr = Output::new(p.pwr, Level::Low);
    let cs = Output::new(p.cs, Level::High);
    let mut pio = Pio::new(p.pio, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.dio,
        p.clk,
        p.dma,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    unwrap!(spawner.spawn(wifi_task(runner)));

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    static RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        net_device,
        Config::dhcpv4(Default::default()),
        RESOURCES.init(StackResources::new()),
        0x7b41_9c03_e5d2_66af_u64,
    );
    unwrap!(spawner.spawn(net_task(runner)));

    (stack, control)
}

/// Associates with the configured network.
pub async fn join_with_retry(control: &mut Control<'static>, ssid: &str, password: &str) -> bool {
    for attempt in 1..=JOIN_ATTEMPTS {
        match control
            .join(ssid, JoinOptions::new(password.as_bytes()))
            .await
        {
            Ok(()) => {
                info!("wifi associated with {} (attempt {})", ssid, attempt);
                return true;
            }
            Err(err) => {
                warn!("wifi join attempt {} failed: status={}", attempt, err.status);
                Timer::after_secs(1).await;
            }
        }
    }
    false
}

/// Waits for a DHCP lease, bounded so a dead network cannot wedge boot.
pub async fn wait_for_config(stack: Stack<'static>) -> bool {
    match with_timeout(DHCP_WAIT, stack.wait_config_up()).await {
        Ok(()) => {
            if let Some(config) = stack.config_v4() {
                info!(
                    "dhcp lease: ip={} gateway={}",
                    config.address,
                    Debug2Format(&config.gateway)
                );
            }
            true
        }
        Err(_) => {
            warn!("no dhcp lease within {}s", DHCP_WAIT.as_secs());
            false
        }
    }
}
