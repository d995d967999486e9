//! Seams to the vendor hardware layer.
//!
//! Everything the board code needs from the SoC vendor's SDK is expressed
//! here as a small trait. On the ESP32-S3 the crate implements them on top
//! of `esp-hal` (see the `esp32s3` module); other targets plug in their own
//! vendor layer. Chips hanging off I2C do not go through these seams: they
//! use `embedded_hal::i2c::I2c` directly.

use crate::HalError;

/// A vendor primitive that hands out a resource handle for a configuration.
///
/// `open` and `close` map one-to-one to the SDK's acquire/release pair
/// (`i2c_new_master_bus`/`i2c_del_master_bus`, `esp_ldo_acquire_channel`/
/// `esp_ldo_release_channel`, ...).
pub trait Driver {
    type Config;
    type Handle;

    fn open(&mut self, config: &Self::Config) -> Result<Self::Handle, HalError>;

    fn close(&mut self, handle: Self::Handle) -> Result<(), HalError> {
        drop(handle);
        Ok(())
    }
}

/// Operations on a configured LEDC timer.
pub trait PwmTimer {
    fn pause(&mut self) -> Result<(), HalError>;
    fn resume(&mut self) -> Result<(), HalError>;
    fn set_frequency(&mut self, freq_hz: u32) -> Result<(), HalError>;
}

/// Operations on a configured LEDC channel.
pub trait PwmChannel {
    /// Latches a new duty value; it takes effect on [`update_duty`](Self::update_duty).
    fn set_duty(&mut self, duty: u32) -> Result<(), HalError>;
    fn update_duty(&mut self) -> Result<(), HalError>;
    fn stop(&mut self, idle_level: bool) -> Result<(), HalError>;
}

/// An acquired on-chip LDO channel.
pub trait LdoChannel {
    fn adjust_voltage(&mut self, voltage_mv: u16) -> Result<(), HalError>;
}

/// TX/RX channel control of an opened I2S port.
pub trait I2sChannels {
    fn configure_tx(&mut self, config: &crate::i2s::I2sStdConfig) -> Result<(), HalError>;
    fn configure_rx(&mut self, config: &crate::i2s::I2sStdConfig) -> Result<(), HalError>;
    fn enable_tx(&mut self) -> Result<(), HalError>;
    fn enable_rx(&mut self) -> Result<(), HalError>;
    fn disable_tx(&mut self) -> Result<(), HalError>;
    fn disable_rx(&mut self) -> Result<(), HalError>;
}

/// Command channel to a display controller (DBI over DSI, or SPI).
pub trait PanelIo {
    /// Sends `cmd` followed by `params`.
    fn tx_param(&mut self, cmd: u8, params: &[u8]) -> Result<(), HalError>;
}

/// Creates the two panel endpoints living on a DSI bus.
pub trait PanelHost {
    /// Handle of the DSI bus the endpoints are created on.
    type Bus;
    /// Command channel (DBI).
    type Io: PanelIo;
    /// Pixel stream panel (DPI) the GUI draws into.
    type Dpi;

    fn new_dbi_io(
        &mut self,
        bus: &Self::Bus,
        config: &crate::display::DbiIoConfig,
    ) -> Result<Self::Io, HalError>;

    fn new_dpi_panel(
        &mut self,
        bus: &Self::Bus,
        config: &crate::display::DpiPanelConfig,
    ) -> Result<Self::Dpi, HalError>;

    fn del_dpi_panel(&mut self, dpi: Self::Dpi) -> Result<(), HalError> {
        drop(dpi);
        Ok(())
    }

    fn del_dbi_io(&mut self, io: Self::Io) -> Result<(), HalError> {
        drop(io);
        Ok(())
    }
}

/// The external GUI library that owns the render loop.
///
/// `D` and `T` are whatever display and touch types the board hands over;
/// the backend keeps what it needs from them (vendor handles are plain
/// pointers on ESP-IDF).
pub trait GuiBackend<D, T> {
    fn start(&mut self, config: &crate::gui::GuiPortConfig) -> Result<(), HalError>;
    fn stop(&mut self) -> Result<(), HalError>;
    fn add_display(
        &mut self,
        display: &D,
        config: &crate::gui::GuiDisplayConfig,
    ) -> Result<(), HalError>;
    fn add_touch(&mut self, touch: &T, config: &crate::gui::GuiTouchConfig) -> Result<(), HalError>;
}
