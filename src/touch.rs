//! I2C touch panel wrapper.

use embedded_hal::i2c::I2c;

use crate::{
    Error,
    device::gt911::{
        Gt911,
        MAX_POINTS,
        RawPoint,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cTouchConfig {
    pub address: u8,
    pub scl_speed_hz: u32,
    pub x_max: u16,
    pub y_max: u16,
    pub reset_gpio: Option<u8>,
    pub interrupt_gpio: Option<u8>,
    pub reset_active_high: bool,
    pub interrupt_active_high: bool,
    pub swap_xy: bool,
    pub mirror_x: bool,
    pub mirror_y: bool,
}

/// A contact in panel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    pub track_id: u8,
    pub x: u16,
    pub y: u16,
    pub strength: u16,
}

pub type TouchPoints = heapless::Vec<TouchPoint, MAX_POINTS>;

pub struct I2cTouch<I> {
    chip: Option<Gt911<I>>,
    config: Option<I2cTouchConfig>,
}

impl<I: I2c> Default for I2cTouch<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: I2c> I2cTouch<I> {
    pub const fn new() -> Self {
        Self {
            chip: None,
            config: None,
        }
    }

    pub fn init(&mut self, i2c: I, config: &I2cTouchConfig) -> Result<(), Error> {
        if self.chip.is_some() {
            warn!("[I2cTouch] already initialized, deinitializing first");
            self.deinit();
        }
        let mut chip = Gt911::new(i2c, config.address);
        let id = chip.product_id().inspect_err(|e| {
            error!(
                "[I2cTouch] no controller at {:#x}: {}",
                config.address,
                e.name()
            );
        })?;
        info!(
            "[I2cTouch] GT{}{}{} at {:#x}",
            id[0] as char, id[1] as char, id[2] as char, config.address
        );
        self.chip = Some(chip);
        self.config = Some(*config);
        Ok(())
    }

    pub fn deinit(&mut self) {
        if self.chip.take().is_some() {
            info!("[I2cTouch] deinitialized");
        }
        self.config = None;
    }

    pub const fn is_initialized(&self) -> bool {
        self.chip.is_some()
    }

    pub const fn config(&self) -> Option<&I2cTouchConfig> {
        self.config.as_ref()
    }

    /// Current contacts, mirrored and swapped as configured.
    pub fn read_points(&mut self) -> Result<TouchPoints, Error> {
        let (Some(chip), Some(config)) = (self.chip.as_mut(), self.config.as_ref()) else {
            error!("[I2cTouch] not initialized");
            return Err(Error::InvalidState);
        };

        let mut raw = [RawPoint::default(); MAX_POINTS];
        let count = chip.read_points(&mut raw)?;

        Ok(raw[..count]
            .iter()
            .map(|p| transform(config, p))
            .collect())
    }
}

fn transform(config: &I2cTouchConfig, p: &RawPoint) -> TouchPoint {
    let mut x = p.x;
    let mut y = p.y;
    if config.mirror_x {
        x = config.x_max.saturating_sub(x);
    }
    if config.mirror_y {
        y = config.y_max.saturating_sub(y);
    }
    if config.swap_xy {
        core::mem::swap(&mut x, &mut y);
    }
    TouchPoint {
        track_id: p.track_id,
        x,
        y,
        strength: p.size,
    }
}
