//! LEDC PWM timer and channel, used for backlight dimming.

use crate::{
    Error,
    hal::{
        Driver,
        PwmChannel,
        PwmTimer,
    },
    resource::Resource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedMode {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    Auto,
    Apb,
    RcFast,
    Xtal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedcTimerConfig {
    pub speed_mode: SpeedMode,
    /// Duty resolution in bits; the duty range is `0..=2^bits - 1`.
    pub duty_resolution_bits: u8,
    pub timer: u8,
    pub freq_hz: u32,
    pub clock: ClockSource,
}

/// Widest duty resolution the LEDC timers support.
pub const MAX_DUTY_RESOLUTION_BITS: u8 = 20;

impl LedcTimerConfig {
    /// Saturates at `u32::MAX` for resolutions of 32 bits or more.
    pub const fn max_duty(&self) -> u32 {
        match 1u32.checked_shl(self.duty_resolution_bits as u32) {
            Some(v) => v - 1,
            None => u32::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedcChannelConfig {
    pub gpio: u8,
    pub speed_mode: SpeedMode,
    pub channel: u8,
    pub interrupt: bool,
    pub timer: u8,
    pub duty: u32,
    pub hpoint: u32,
}

/// Maps a brightness percentage onto a PWM duty value.
///
/// `percent` is clamped to `0..=100` first.
pub fn brightness_to_duty(percent: i32, max_duty: u32) -> u32 {
    let percent = percent.clamp(0, 100) as u64;
    (u64::from(max_duty) * percent / 100) as u32
}

/// An LEDC timer.
pub struct LedcTimer<D: Driver> {
    res: Resource<D>,
    config: Option<LedcTimerConfig>,
}

impl<D> LedcTimer<D>
where
    D: Driver<Config = LedcTimerConfig>,
    D::Handle: PwmTimer,
{
    pub const fn new(driver: D) -> Self {
        Self {
            res: Resource::new("LedcTimer", driver),
            config: None,
        }
    }

    pub fn init(&mut self, config: &LedcTimerConfig) -> Result<(), Error> {
        if !(1..=MAX_DUTY_RESOLUTION_BITS).contains(&config.duty_resolution_bits) {
            error!(
                "[LedcTimer] unsupported duty resolution: {} bits",
                config.duty_resolution_bits
            );
            return Err(Error::InvalidArgument);
        }
        self.res.init(config)?;
        self.config = Some(*config);
        info!(
            "[LedcTimer] timer {} @ {} Hz, {}-bit",
            config.timer, config.freq_hz, config.duty_resolution_bits
        );
        Ok(())
    }

    /// Deconfigures the timer. Safe to call when not initialized.
    pub fn deinit(&mut self) -> Result<(), Error> {
        self.config = None;
        self.res.deinit()
    }

    pub const fn is_initialized(&self) -> bool {
        self.res.is_initialized()
    }

    pub const fn config(&self) -> Option<&LedcTimerConfig> {
        self.config.as_ref()
    }

    /// Largest duty value of the configured resolution.
    pub fn max_duty(&self) -> Result<u32, Error> {
        self.config
            .as_ref()
            .map(LedcTimerConfig::max_duty)
            .ok_or(Error::InvalidState)
    }

    pub fn pause(&mut self) -> Result<(), Error> {
        self.res.with("pause", |t| t.pause())?;
        debug!("[LedcTimer] paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), Error> {
        self.res.with("resume", |t| t.resume())?;
        debug!("[LedcTimer] resumed");
        Ok(())
    }

    pub fn set_frequency(&mut self, freq_hz: u32) -> Result<(), Error> {
        self.res
            .with("set_frequency", |t| t.set_frequency(freq_hz))?;
        if let Some(config) = self.config.as_mut() {
            config.freq_hz = freq_hz;
        }
        debug!("[LedcTimer] frequency set to {} Hz", freq_hz);
        Ok(())
    }
}

/// An LEDC output channel bound to a timer.
pub struct LedcChannel<D: Driver> {
    res: Resource<D>,
}

impl<D> LedcChannel<D>
where
    D: Driver<Config = LedcChannelConfig>,
    D::Handle: PwmChannel,
{
    pub const fn new(driver: D) -> Self {
        Self {
            res: Resource::new("LedcChannel", driver),
        }
    }

    /// Configures the channel. `timer` must already be initialized.
    pub fn init<T>(&mut self, timer: &LedcTimer<T>, config: &LedcChannelConfig) -> Result<(), Error>
    where
        T: Driver<Config = LedcTimerConfig>,
        T::Handle: PwmTimer,
    {
        if !timer.is_initialized() {
            error!("[LedcChannel] timer {} not initialized", config.timer);
            return Err(Error::InvalidState);
        }
        self.res.init(config)?;
        info!(
            "[LedcChannel] channel {} on gpio {}",
            config.channel, config.gpio
        );
        Ok(())
    }

    /// Stops the output (idle low) and releases the channel.
    ///
    /// The channel is released even when stopping fails; the first error is
    /// returned.
    pub fn deinit(&mut self) -> Result<(), Error> {
        let stopped = if self.res.is_initialized() {
            self.stop(false)
        } else {
            Ok(())
        };
        let released = self.res.deinit();
        stopped.and(released)
    }

    pub const fn is_initialized(&self) -> bool {
        self.res.is_initialized()
    }

    pub fn set_duty(&mut self, duty: u32) -> Result<(), Error> {
        self.res.with("set_duty", |c| c.set_duty(duty))
    }

    pub fn update_duty(&mut self) -> Result<(), Error> {
        self.res.with("update_duty", |c| c.update_duty())
    }

    pub fn set_duty_and_update(&mut self, duty: u32) -> Result<(), Error> {
        self.set_duty(duty)?;
        self.update_duty()
    }

    pub fn stop(&mut self, idle_level: bool) -> Result<(), Error> {
        self.res.with("stop", |c| c.stop(idle_level))?;
        debug!("[LedcChannel] stopped");
        Ok(())
    }
}
