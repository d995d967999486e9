//! M5Stack Core S3 (ESP32-S3) power and IO bring-up.
//!
//! The panel itself is an ILI9342C on SPI, driven through `mipidsi` (see
//! the `esp32s3` module). This board only has to power it, pulse its reset
//! line through the AW9523 and run the backlight rail.

pub mod config;

use embedded_hal::{
    delay::DelayNs,
    i2c::I2c,
};

use crate::{
    Error,
    device::{
        aw9523::{
            self,
            Aw9523,
        },
        axp2101::{
            self,
            Axp2101,
            Ldo,
        },
    },
    hal::Driver,
    i2c::{
        I2cBus,
        I2cBusConfig,
        I2cDevice,
    },
};

const BACKLIGHT_RAIL: Ldo = Ldo::Dldo1;
const BACKLIGHT_STEP_MV: u16 = 100;

/// Backlight rail voltage for `percent`, `None` when the rail should be off.
fn backlight_mv(percent: i32) -> Option<u16> {
    let percent = percent.clamp(0, 100) as u32;
    if percent == 0 {
        return None;
    }
    let span = u32::from(config::BACKLIGHT_MAX_MV - config::BACKLIGHT_MIN_MV);
    let mv = config::BACKLIGHT_MIN_MV + (span * percent / 100) as u16;
    Some(mv - mv % BACKLIGHT_STEP_MV)
}

pub struct M5StackCoreS3<'a, D: Driver, Dl> {
    i2c: &'a I2cBus<D>,
    pmic: Axp2101<I2cDevice<'a, D>>,
    io_expander: Aw9523<I2cDevice<'a, D>>,
    delay: Dl,
}

impl<'a, D, Dl> M5StackCoreS3<'a, D, Dl>
where
    D: Driver<Config = I2cBusConfig>,
    D::Handle: I2c,
    Dl: DelayNs,
{
    pub const fn new(i2c: &'a I2cBus<D>, delay: Dl) -> Self {
        Self {
            i2c,
            pmic: Axp2101::new(),
            io_expander: Aw9523::new(),
            delay,
        }
    }

    /// Bus, PMIC rails, expander and LCD reset, in that order.
    ///
    /// Stops at the first failing step; [`deinit`](Self::deinit) releases
    /// whatever came up.
    pub fn init(&mut self) -> Result<(), Error> {
        let bus = self.i2c;
        bus.init(&config::I2C_BUS)?;
        bus.scan()?;

        self.pmic
            .init(bus.device()?, axp2101::DEFAULT_ADDR)
            .inspect_err(|e| error!("[M5StackCoreS3] PMIC failed: {}", e.name()))?;
        self.pmic.apply(config::PMIC_INIT)?;

        self.io_expander
            .init(bus.device()?, aw9523::DEFAULT_ADDR)
            .inspect_err(|e| error!("[M5StackCoreS3] IO expander failed: {}", e.name()))?;
        self.io_expander.apply(config::EXPANDER_INIT)?;

        self.reset_lcd()?;
        info!("[M5StackCoreS3] bring-up done");
        Ok(())
    }

    /// Pulses the LCD reset line on the expander.
    pub fn reset_lcd(&mut self) -> Result<(), Error> {
        let (port, pin) = config::LCD_RESET;
        self.io_expander.set_level(port, pin, false)?;
        self.delay.delay_ms(config::LCD_RESET_LOW_MS);
        self.io_expander.set_level(port, pin, true)?;
        self.delay.delay_ms(config::LCD_RESET_RELEASE_MS);
        Ok(())
    }

    /// `percent` is clamped to 0..=100; 0 switches the rail off.
    pub fn set_display_brightness(&mut self, percent: i32) -> Result<(), Error> {
        match backlight_mv(percent) {
            None => self.pmic.set_ldo_enabled(BACKLIGHT_RAIL, false)?,
            Some(mv) => {
                self.pmic.set_ldo_voltage(BACKLIGHT_RAIL, mv)?;
                self.pmic.set_ldo_enabled(BACKLIGHT_RAIL, true)?;
            }
        }
        debug!("[M5StackCoreS3] brightness {}", percent);
        Ok(())
    }

    pub fn set_display_backlight(&mut self, on: bool) -> Result<(), Error> {
        self.set_display_brightness(if on { 100 } else { 0 })
    }

    pub fn battery_level(&mut self) -> Result<u8, Error> {
        self.pmic.battery_level()
    }

    pub fn is_charging(&mut self) -> Result<bool, Error> {
        self.pmic.is_charging()
    }

    pub fn deinit(&mut self) -> Result<(), Error> {
        self.io_expander.deinit();
        self.pmic.deinit();
        self.i2c.deinit()
    }

    pub const fn i2c_bus(&self) -> &'a I2cBus<D> {
        self.i2c
    }

    pub fn pmic(&mut self) -> &mut Axp2101<I2cDevice<'a, D>> {
        &mut self.pmic
    }

    pub fn io_expander(&mut self) -> &mut Aw9523<I2cDevice<'a, D>> {
        &mut self.io_expander
    }

    pub fn delay(&mut self) -> &mut Dl {
        &mut self.delay
    }
}
