//! # m5stack-bsp
//!
//! Board support for M5Stack ESP32-class boards.
//!
//! Sequences peripheral bring-up in the order and with the settling delays
//! the hardware needs, then hands typed accessors to the application:
//! - **Tab5** (ESP32-P4): IO expanders, LEDC backlight, DSI PHY LDO,
//!   720×1280 ILI9881C over MIPI-DSI, GT911 touch, ES8388/ES7210 audio,
//!   GUI port
//! - **Core S3** (ESP32-S3): AXP2101 rails, AW9523 expander, backlight
//!
//! SoC peripherals are reached through the small traits in [`hal`]; chips on
//! I2C use `embedded-hal` directly. With the `esp32s3` feature the crate
//! provides the `esp-hal` side for the Core S3.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let peripherals = m5stack_bsp::init();
//! let resources = m5stack_bsp::split_resources!(peripherals);
//!
//! let bus = mk_static!(CoreS3I2cBus, I2cBus::new(resources.i2c.into()));
//! let mut board = CoreS3::new(bus, Delay::new());
//! board.init()?;
//! board.set_display_brightness(60)?;
//! ```

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod audio;
pub mod board;
pub mod device;
pub mod display;
pub mod error;
pub mod gui;
pub mod hal;
pub mod i2c;
pub mod i2s;
pub mod ldo;
pub mod ledc;
pub mod resource;
pub mod touch;

#[cfg(feature = "esp32s3")]
mod esp32s3;

#[cfg(test)]
mod mock;

pub use board::{
    core_s3::M5StackCoreS3,
    tab5::{
        M5StackTab5,
        Tab5Drivers,
        Tab5Platform,
    },
};
pub use error::{
    Error,
    HalError,
    Result,
};
#[cfg(feature = "esp32s3")]
pub use esp32s3::*;
pub use i2c::I2cBus;

#[cfg(feature = "esp32s3")]
#[doc(hidden)]
pub use static_cell as __static_cell;

/// Moves a value into a `static` and hands back `&'static mut` to it.
///
/// Panics if the same call site runs twice.
#[cfg(feature = "esp32s3")]
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static CELL: $crate::__static_cell::StaticCell<$t> = $crate::__static_cell::StaticCell::new();
        CELL.init($val)
    }};
}
