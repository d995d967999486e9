//! I2S port carrying the audio codec sample streams.

use crate::{
    Error,
    hal::{
        Driver,
        I2sChannels,
    },
    resource::Resource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    Master,
    Slave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2sBusConfig {
    pub port: u8,
    pub role: Role,
    pub dma_desc_num: u8,
    pub dma_frame_num: u16,
    pub auto_clear_after_cb: bool,
    pub auto_clear_before_cb: bool,
    pub intr_priority: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotMode {
    Mono,
    Stereo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotMask {
    Left,
    Right,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2sClockConfig {
    pub sample_rate_hz: u32,
    pub mclk_multiple: u16,
    pub bclk_div: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2sSlotConfig {
    pub data_bits: u8,
    /// `None` lets the driver match the slot width to `data_bits`.
    pub slot_bits: Option<u8>,
    pub mode: SlotMode,
    pub mask: SlotMask,
    pub ws_width: u8,
    pub ws_pol: bool,
    pub bit_shift: bool,
    pub msb_right: bool,
    pub left_align: bool,
    pub big_endian: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2sGpioConfig {
    pub mclk: u8,
    pub bclk: u8,
    pub ws: u8,
    pub dout: u8,
    pub din: u8,
    pub invert_mclk: bool,
    pub invert_bclk: bool,
    pub invert_ws: bool,
}

/// Standard (Philips) mode channel configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2sStdConfig {
    pub clock: I2sClockConfig,
    pub slot: I2sSlotConfig,
    pub gpio: I2sGpioConfig,
}

pub struct I2sBus<D: Driver> {
    res: Resource<D>,
    config: Option<I2sBusConfig>,
    tx_enabled: bool,
    rx_enabled: bool,
}

impl<D> I2sBus<D>
where
    D: Driver<Config = I2sBusConfig>,
    D::Handle: I2sChannels,
{
    pub const fn new(driver: D) -> Self {
        Self {
            res: Resource::new("I2sBus", driver),
            config: None,
            tx_enabled: false,
            rx_enabled: false,
        }
    }

    /// Opens the port. A port that is already open is shut down first.
    pub fn init(&mut self, config: &I2sBusConfig) -> Result<(), Error> {
        if self.is_initialized() {
            warn!("[I2sBus] already initialized, deinitializing first");
            self.deinit()?;
        }
        self.res.init(config)?;
        self.config = Some(*config);
        info!(
            "[I2sBus] port {}, {} x {} frame DMA",
            config.port, config.dma_desc_num, config.dma_frame_num
        );
        Ok(())
    }

    /// Disables any running channel, then closes the port.
    ///
    /// The port is closed even when a channel fails to stop; the first error
    /// is returned.
    pub fn deinit(&mut self) -> Result<(), Error> {
        let tx = if self.tx_enabled { self.disable_tx() } else { Ok(()) };
        let rx = if self.rx_enabled { self.disable_rx() } else { Ok(()) };
        self.tx_enabled = false;
        self.rx_enabled = false;
        self.config = None;
        let closed = self.res.deinit();
        tx.and(rx).and(closed)
    }

    pub const fn is_initialized(&self) -> bool {
        self.res.is_initialized()
    }

    /// Both directions are enabled.
    pub const fn is_streaming(&self) -> bool {
        self.tx_enabled && self.rx_enabled
    }

    pub const fn config(&self) -> Option<&I2sBusConfig> {
        self.config.as_ref()
    }

    pub const fn handle(&self) -> Option<&D::Handle> {
        self.res.handle()
    }

    pub fn configure_tx(&mut self, config: &I2sStdConfig) -> Result<(), Error> {
        self.res.with("configure_tx", |h| h.configure_tx(config))?;
        info!("[I2sBus] tx configured @ {} Hz", config.clock.sample_rate_hz);
        Ok(())
    }

    pub fn configure_rx(&mut self, config: &I2sStdConfig) -> Result<(), Error> {
        self.res.with("configure_rx", |h| h.configure_rx(config))?;
        info!("[I2sBus] rx configured @ {} Hz", config.clock.sample_rate_hz);
        Ok(())
    }

    pub fn enable_tx(&mut self) -> Result<(), Error> {
        self.res.with("enable_tx", I2sChannels::enable_tx)?;
        self.tx_enabled = true;
        Ok(())
    }

    pub fn enable_rx(&mut self) -> Result<(), Error> {
        self.res.with("enable_rx", I2sChannels::enable_rx)?;
        self.rx_enabled = true;
        Ok(())
    }

    pub fn disable_tx(&mut self) -> Result<(), Error> {
        self.res.with("disable_tx", I2sChannels::disable_tx)?;
        self.tx_enabled = false;
        Ok(())
    }

    pub fn disable_rx(&mut self) -> Result<(), Error> {
        self.res.with("disable_rx", I2sChannels::disable_rx)?;
        self.rx_enabled = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        HalError,
        board::tab5::config,
        mock::{
            FakeDriver,
            Journal,
        },
    };

    #[test]
    fn streaming_needs_both_directions() {
        let journal = Journal::default();
        let mut i2s = I2sBus::new(FakeDriver::new("i2s", &journal));

        assert_eq!(i2s.enable_tx(), Err(Error::InvalidState));
        i2s.init(&config::I2S_BUS).unwrap();
        i2s.configure_tx(&config::I2S_STD).unwrap();
        i2s.configure_rx(&config::I2S_STD).unwrap();
        i2s.enable_tx().unwrap();
        assert!(!i2s.is_streaming());
        i2s.enable_rx().unwrap();
        assert!(i2s.is_streaming());
    }

    #[test]
    fn deinit_disables_running_channels() {
        let journal = Journal::default();
        let mut i2s = I2sBus::new(FakeDriver::new("i2s", &journal));
        i2s.init(&config::I2S_BUS).unwrap();
        i2s.enable_tx().unwrap();
        journal.clear();

        i2s.deinit().unwrap();
        i2s.deinit().unwrap();

        assert_eq!(journal.events(), ["i2s.disable_tx", "i2s.close 1"]);
        assert!(!i2s.is_streaming());
    }

    #[test]
    fn reinit_stops_channels_before_reopening() {
        let journal = Journal::default();
        let mut i2s = I2sBus::new(FakeDriver::new("i2s", &journal));
        i2s.init(&config::I2S_BUS).unwrap();
        i2s.enable_tx().unwrap();
        i2s.enable_rx().unwrap();
        journal.clear();

        i2s.init(&config::I2S_BUS).unwrap();

        assert_eq!(
            journal.events(),
            ["i2s.disable_tx", "i2s.disable_rx", "i2s.close 1", "i2s.open"]
        );
        assert!(!i2s.is_streaming());
        assert_eq!(i2s.handle().map(|h| h.id), Some(2));
        assert_eq!(i2s.res.driver().live(), 1);
    }

    #[test]
    fn port_is_closed_even_if_disable_fails() {
        let journal = Journal::default();
        let mut i2s = I2sBus::new(FakeDriver::new("i2s", &journal));
        i2s.init(&config::I2S_BUS).unwrap();
        i2s.enable_tx().unwrap();
        i2s.enable_rx().unwrap();
        i2s.res.driver().fail_ops(Some(HalError::Timeout));
        journal.clear();

        assert_eq!(i2s.deinit(), Err(Error::Hal(HalError::Timeout)));
        assert!(!i2s.is_initialized());
        assert!(!i2s.is_streaming());
        assert!(i2s.config().is_none());
        assert_eq!(i2s.res.driver().live(), 0);
        assert_eq!(i2s.deinit(), Ok(()));
        assert_eq!(
            journal.events(),
            ["i2s.disable_tx", "i2s.disable_rx", "i2s.close 1"]
        );
    }
}
