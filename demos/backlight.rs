//! Steps the Core S3 backlight rail from off to full and back.

#![no_std]
#![no_main]

use defmt::info;
use embassy_executor::Spawner;
use embassy_time::{
    Duration,
    Timer,
};
use esp_backtrace as _;
use esp_hal::{
    delay::Delay,
    timer::timg::TimerGroup,
};
use esp_println as _;
#[allow(clippy::wildcard_imports)]
use m5stack_bsp::*;

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

#[embassy_executor::task]
async fn backlight_task(board: &'static mut CoreS3<'static>) {
    info!("Backlight task started");

    let steps = (0..=100).step_by(20).chain((0..100).step_by(20).rev());
    loop {
        for percent in steps.clone() {
            match board.set_display_brightness(percent) {
                Ok(()) => info!("Backlight: {}%", percent),
                Err(e) => info!("Backlight error: {}", e),
            }
            Timer::after(Duration::from_millis(500)).await;
        }
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = m5stack_bsp::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let bus = mk_static!(CoreS3I2cBus, I2cBus::new(resources.i2c.into()));
    let board = mk_static!(CoreS3<'static>, CoreS3::new(bus, Delay::new()));
    board.init().unwrap();

    spawner.must_spawn(backlight_task(board));

    loop {
        Timer::after(Duration::from_secs(600)).await;
    }
}
