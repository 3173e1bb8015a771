//! Two-display NTP wall clock for the Raspberry Pi Pico W.

#![deny(unsafe_code)]
#![no_main]
#![no_std]

use defmt::{info, Debug2Format};
use defmt_rtt as _; // global logger
use panic_probe as _;

use duoclock_core::{ClockApp, DisplayPresenter, StatusCode};
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Flex, Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, PIO0};
use embassy_time::{Duration, Instant, Ticker, Timer};

mod config;
mod ds3231;
mod dst;
mod logging;
mod net;
mod sntp;
mod tm1637;

use ds3231::Ds3231;
use dst::DstSwitch;
use net::WifiPeripherals;
use sntp::SntpClient;
use tm1637::Tm1637;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let p = embassy_rp::init(Default::default());
    logging::init();

    let config = config::load();
    // The CLM blob fixes the regulatory domain; the setting is informational
    info!("duoclock starting, wifi country hint {}", config.wifi_country);

    // Displays first, so the boot code shows while the radio negotiates
    let clock_display = Tm1637::new(Output::new(p.PIN_19, Level::High), Flex::new(p.PIN_18));
    let date_display = Tm1637::new(Output::new(p.PIN_21, Level::High), Flex::new(p.PIN_20));
    let mut presenter = DisplayPresenter::new(clock_display, date_display);
    let _ = presenter.set_brightness(config.brightness);
    let _ = presenter.show_status(StatusCode::Booting);

    let i2c = I2c::new_async(p.I2C0, p.PIN_17, p.PIN_16, Irqs, i2c::Config::default());
    let backup = Ds3231::new(i2c);
    let dst = DstSwitch::new(Input::new(p.PIN_22, Pull::Up));

    let wifi = WifiPeripherals {
        pwr: p.PIN_23,
        cs: p.PIN_25,
        pio: p.PIO0,
        dio: p.PIN_24,
        clk: p.PIN_29,
        dma: p.DMA_CH0,
    };
    let (stack, mut control) = net::bring_up(spawner, wifi).await;

    // Boot blink on the radio LED
    control.gpio_set(0, true).await;
    Timer::after_millis(250).await;
    control.gpio_set(0, false).await;

    let service = SntpClient::new(stack, config.ntp_server);
    let mut app = ClockApp::new(config.timezone, presenter, service, backup, dst);

    if net::join_with_retry(&mut control, config.wifi_ssid, config.wifi_password).await
        && net::wait_for_config(stack).await
    {
        let _ = app.presenter_mut().show_status(StatusCode::WifiUp);
        control.gpio_set(0, true).await;
        app.network_ready();
        Timer::after_secs(1).await;
    } else {
        // Keep going; the tick loop falls back to the battery clock
        let _ = app.presenter_mut().show_status(StatusCode::WifiFailed);
        Timer::after_secs(5).await;
    }

    let mut ticker = Ticker::every(Duration::from_secs(1));
    loop {
        let report = app.tick(Instant::now().as_secs()).await;
        if let Some(outcome) = report.sync_outcome {
            info!("sync attempt finished: {}", Debug2Format(&outcome));
        }
        ticker.next().await;
    }
}
