//! Core S3 hardware constants.

use crate::{
    device::aw9523::Port,
    i2c::I2cBusConfig,
};

pub const LCD_H_RES: u16 = 320;
pub const LCD_V_RES: u16 = 240;

/// Internal bus: AXP2101, AW9523, touch, camera, IMU.
pub const I2C_BUS: I2cBusConfig = I2cBusConfig {
    port: 0,
    sda: 12,
    scl: 11,
    frequency_hz: 400_000,
    glitch_ignore_cnt: 7,
    intr_priority: 0,
    trans_queue_depth: 0,
    internal_pullup: true,
    allow_power_down: false,
};

/// ALDO1 1.8 V, ALDO2..ALDO4 3.3 V, then every rail except CPUSLDO on.
pub const PMIC_INIT: &[(u8, u8)] = &[
    (0x92, 13),
    (0x93, 28),
    (0x94, 28),
    (0x95, 28),
    (0x90, 0b1011_1111),
];

/// Outputs: P0.0 touch reset, P0.1 bus out enable, P0.2 AW88298 reset,
/// P1.0 camera reset, P1.1 LCD reset, P1.7 boost enable.
pub const EXPANDER_INIT: &[(u8, u8)] = &[
    (0x02, 0b0000_0111),
    (0x03, 0b1000_0011),
    (0x04, 0b0001_1000),
    (0x05, 0b0000_1100),
    (0x11, 0b0001_0000),
    (0x12, 0xff),
    (0x13, 0xff),
];

pub const LCD_RESET: (Port, u8) = (Port::P1, 1);
pub const LCD_RESET_LOW_MS: u32 = 20;
pub const LCD_RESET_RELEASE_MS: u32 = 120;

/// DLDO1 feeds the LCD backlight.
pub const BACKLIGHT_MIN_MV: u16 = 2500;
pub const BACKLIGHT_MAX_MV: u16 = 3300;

/// SPI display lines, for the `esp32s3` firmware glue.
pub const LCD_SPI_FREQ_MHZ: u32 = 40;
