//! Brings the Core S3 up, draws on the panel and logs the microphone peak.

#![no_std]
#![no_main]

use defmt::{
    error,
    info,
};
use embassy_executor::Spawner;
use embassy_time::{
    Duration,
    Timer,
};
use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        iso_8859_1::FONT_10X20,
    },
    pixelcolor::Rgb565,
    prelude::*,
    text::Text,
};
use esp_backtrace as _;
use esp_hal::{
    delay::Delay,
    dma::DmaDescriptor,
    timer::timg::TimerGroup,
};
use esp_println as _;
#[allow(clippy::wildcard_imports)]
use m5stack_bsp::*;
use m5stack_bsp::device::es7210::{
    self,
    Es7210,
};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

#[embassy_executor::task]
async fn mic_task(mic: &'static mut Microphone<'static>) {
    info!("Microphone task started");

    let mut buf = [0i16; 1024];
    loop {
        match mic.rx.read_words(&mut buf) {
            Ok(()) => {
                let peak = buf.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
                info!("Peak amplitude: {}", peak);
            }
            Err(e) => {
                info!("Read error: {}", e);
            }
        }

        Timer::after(Duration::from_millis(100)).await;
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
    if let Err(e) = board.init() {
        error!("Bring-up failed: {}", e);
    }
    board.set_display_brightness(80).ok();

    let mut display: Display<'static> = resources.display.try_into().unwrap();
    display.clear(Rgb565::BLACK).unwrap();
    let style = MonoTextStyle::new(&FONT_10X20, Rgb565::WHITE);
    Text::new("M5Stack Core S3", Point::new(80, 110), style)
        .draw(&mut display)
        .unwrap();

    match bus.device() {
        Ok(i2c) => {
            if let Ok(adc) = Es7210::open(i2c, es7210::DEFAULT_ADDR, false, 0b0011, board.delay()) {
                // kept powered for the rest of the run
                core::mem::forget(adc);
            }
        }
        Err(e) => error!("No I2C bus: {}", e),
    }

    let descriptors = mk_static!([DmaDescriptor; 8], [DmaDescriptor::EMPTY; 8]);
    let mic = mk_static!(
        Microphone<'static>,
        Microphone::new(resources.mic, DEFAULT_SAMPLE_RATE, descriptors).unwrap()
    );
    spawner.must_spawn(mic_task(mic));

    loop {
        if let (Ok(level), Ok(charging)) = (board.battery_level(), board.is_charging()) {
            info!("Battery {}%{}", level, if charging { " (charging)" } else { "" });
        }
        Timer::after(Duration::from_secs(30)).await;
    }
}
