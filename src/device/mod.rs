//! Register-level drivers for the chips on the boards' shared I2C bus.
//!
//! Each driver owns a [`Register`](crate::i2c::Register) transport over any
//! `embedded_hal::i2c::I2c`, so it works equally on an
//! [`I2cDevice`](crate::i2c::I2cDevice) or a plain HAL bus.

pub mod aw9523;
pub mod axp2101;
pub mod es7210;
pub mod es8388;
pub mod gt911;
pub mod ili9881c;
pub mod ip5306;
pub mod pi4ioe5v6408;

/// Direction of an expander pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input,
    Output,
}
