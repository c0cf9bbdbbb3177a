//! Echorange - Ultrasonic Ranging Firmware
//!
//! Main firmware binary for RP2040 boards driving an HC-SR04 style
//! ultrasonic sensor and a 128x32 SSD1306 OLED.
//!
//! Task layout:
//! - edge capture on an interrupt-priority executor (echo pin timestamps)
//! - trigger, echo processing and display on the thread-mode executor

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::I2C1;
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

use echorange_core::ranging::{DisplaySync, EchoProcessor, RangeTrigger};
use echorange_drivers::display::Ssd1306;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    I2C1_IRQ => i2c::InterruptHandler<I2C1>;
});

/// Heartbeat interval in seconds
const HEARTBEAT_SECS: u64 = 10;

/// OLED I2C bus frequency
const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Executor for edge capture, preempts all thread-mode tasks
static EXECUTOR_EDGE: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_EDGE.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Echorange firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();
    let (channels, capture) = channels::init();

    // Sensor pins are board-specific (trigger=GPIO17, echo=GPIO16)
    let trigger_pin = Output::new(p.PIN_17, Level::Low);
    let echo_pin = Input::new(p.PIN_16, Pull::None);

    // Setup I2C1 for the OLED (SDA=GPIO2, SCL=GPIO3)
    let i2c_config = {
        let mut cfg = i2c::Config::default();
        cfg.frequency = I2C_FREQUENCY_HZ;
        cfg
    };
    let i2c = I2c::new_async(p.I2C1, p.PIN_3, p.PIN_2, Irqs, i2c_config);

    let mut oled = Ssd1306::new(i2c);
    match oled.init().await {
        Ok(()) => info!("OLED initialized"),
        // Keep going: the display task reports every failed frame
        Err(e) => error!("Failed to initialize OLED: {:?}", e),
    }

    // Edge capture runs at interrupt priority
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let edge_spawner = EXECUTOR_EDGE.start(interrupt::SWI_IRQ_1);
    edge_spawner
        .spawn(tasks::edge_capture_task(echo_pin, capture))
        .unwrap();

    let trigger = RangeTrigger::new(trigger_pin, &channels.ready, config.trigger);
    let processor = EchoProcessor::new(
        channels.edges.receiver(),
        channels.samples.sender(),
        config.echo,
    );
    let screen = DisplaySync::new(
        &channels.ready,
        channels.samples.receiver(),
        oled,
        config.display,
    );

    // Spawn tasks
    spawner.spawn(tasks::echo_task(processor)).unwrap();
    spawner.spawn(tasks::display_task(screen)).unwrap();
    spawner.spawn(tasks::trigger_task(trigger)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(HEARTBEAT_SECS).await;
        debug!("Heartbeat: {} edges dropped", capture.dropped());
    }
}
