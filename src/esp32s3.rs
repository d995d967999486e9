//! `esp-hal` glue for the Core S3.
//!
//! Pin map, clock setup and the SoC-side drivers: the I2C master behind
//! [`I2cDriver`], the ILI9342C panel on SPI and the I2S input fed by the
//! ES7210.

use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    Async,
    Blocking,
    assign_resources,
    clock::CpuClock,
    delay::Delay,
    dma::{
        DmaDescriptor,
        DmaRxBuf,
        DmaTxBuf,
    },
    dma_buffers,
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    i2c::master::I2c,
    i2s::master::{
        Channels,
        Config as I2sConfig,
        DataFormat,
        I2s,
        I2sRx,
    },
    spi::master::{
        Spi,
        SpiDmaBus,
    },
    time::Rate,
};

use crate::{
    Error,
    HalError,
    board::core_s3::{
        M5StackCoreS3,
        config,
    },
    hal::Driver,
    i2c::{
        I2cBus,
        I2cBusConfig,
    },
};

assign_resources! {
    pub Resources<'d> {
        i2c: I2cResources<'d> {
            sda: GPIO12,
            scl: GPIO11,
            i2c: I2C0,
        },
        display: DisplayResources<'d> {
            dc: GPIO35,
            cs: GPIO3,
            sck: GPIO36,
            mosi: GPIO37,
            spi: SPI2,
            dma: DMA_CH0,
        },
        mic: MicResources<'d> {
            mclk: GPIO0,
            bclk: GPIO34,
            ws: GPIO33,
            din: GPIO14,
            i2s: I2S0,
            dma: DMA_CH1,
        },
    }
}

/// Brings the chip up at 240 MHz and returns the raw peripheral set.
///
/// Call this once at the top of `main`, then split the Core S3 pins with
/// [`split_resources!`].
#[must_use]
pub fn init() -> esp_hal::peripherals::Peripherals {
    esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::_240MHz))
}

/// The internal I2C port as a [`Driver`].
///
/// The pins move into the first handle, so the port can be opened once per
/// boot; a second `open` fails with [`HalError::InvalidState`].
pub struct I2cDriver<'d> {
    res: Option<I2cResources<'d>>,
}

impl<'d> From<I2cResources<'d>> for I2cDriver<'d> {
    fn from(res: I2cResources<'d>) -> Self {
        Self { res: Some(res) }
    }
}

impl<'d> Driver for I2cDriver<'d> {
    type Config = I2cBusConfig;
    type Handle = I2c<'d, Blocking>;

    fn open(&mut self, config: &I2cBusConfig) -> Result<Self::Handle, HalError> {
        let res = self.res.take().ok_or(HalError::InvalidState)?;
        let i2c_config = esp_hal::i2c::master::Config::default()
            .with_frequency(Rate::from_hz(config.frequency_hz));
        let i2c = I2c::new(res.i2c, i2c_config)
            .map_err(|_| HalError::InvalidArgument)?
            .with_sda(res.sda)
            .with_scl(res.scl);
        Ok(i2c)
    }
}

/// The Core S3 board on its `esp-hal` drivers.
pub type CoreS3<'a> = M5StackCoreS3<'a, I2cDriver<'static>, Delay>;

/// The internal I2C bus, not yet opened.
pub type CoreS3I2cBus = I2cBus<I2cDriver<'static>>;

type SpiInterface<'a> = mipidsi::interface::SpiInterface<
    'a,
    ExclusiveDevice<SpiDmaBus<'a, Async>, Output<'a>, Delay>,
    Output<'a>,
>;

/// The ILI9342C panel, ready to draw on with `embedded-graphics`.
///
/// Its reset line sits on the AW9523, so build it only after
/// [`M5StackCoreS3::init`] has pulsed that line.
pub type Display<'a> = mipidsi::Display<SpiInterface<'a>, mipidsi::models::ILI9342CRgb565>;

const DISPLAY_BUFFER: usize = 32000;

impl<'a> TryFrom<DisplayResources<'a>> for Display<'a> {
    type Error = Error;

    fn try_from(res: DisplayResources<'a>) -> Result<Self, Error> {
        let (rx_buffer, rx_descriptors, tx_buffer, tx_descriptors) = dma_buffers!(DISPLAY_BUFFER);
        let dma_rx_buf = DmaRxBuf::new(rx_descriptors, rx_buffer)
            .map_err(|_| Error::HandleCreation("display dma"))?;
        let dma_tx_buf = DmaTxBuf::new(tx_descriptors, tx_buffer)
            .map_err(|_| Error::HandleCreation("display dma"))?;

        let mut delay = Delay::new();
        let dc = Output::new(res.dc, Level::Low, OutputConfig::default());

        let spi = Spi::new(
            res.spi,
            esp_hal::spi::master::Config::default()
                .with_frequency(Rate::from_mhz(config::LCD_SPI_FREQ_MHZ)),
        )
        .map_err(|_| Error::Hal(HalError::InvalidArgument))?
        .with_sck(res.sck)
        .with_mosi(res.mosi)
        .with_dma(res.dma)
        .with_buffers(dma_rx_buf, dma_tx_buf)
        .into_async();

        let cs = Output::new(res.cs, Level::High, OutputConfig::default());
        let spi_device =
            ExclusiveDevice::new(spi, cs, delay).map_err(|_| Error::HandleCreation("display spi"))?;

        let buffer = crate::mk_static!([u8; DISPLAY_BUFFER], [0_u8; DISPLAY_BUFFER]);
        let di = mipidsi::interface::SpiInterface::new(spi_device, dc, buffer);

        let display = mipidsi::Builder::new(mipidsi::models::ILI9342CRgb565, di)
            .display_size(config::LCD_H_RES, config::LCD_V_RES)
            .invert_colors(mipidsi::options::ColorInversion::Inverted)
            .color_order(mipidsi::options::ColorOrder::Bgr)
            .init(&mut delay)
            .map_err(|_| {
                error!("[Display] ILI9342C init failed");
                Error::HandleCreation("display")
            })?;
        info!(
            "[Display] ILI9342C {}x{} ready",
            config::LCD_H_RES,
            config::LCD_V_RES
        );
        Ok(display)
    }
}

/// Default capture rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// I2S input from the ES7210, ready for DMA reads.
///
/// The ES7210 itself is configured over I2C with
/// [`Es7210`](crate::device::es7210::Es7210).
pub struct Microphone<'a> {
    pub rx: I2sRx<'a, Blocking>,
}

impl<'a> Microphone<'a> {
    /// `descriptors` must live for the program, use [`mk_static!`](crate::mk_static).
    pub fn new(
        res: MicResources<'a>,
        sample_rate: u32,
        descriptors: &'static mut [DmaDescriptor],
    ) -> Result<Self, Error> {
        let i2s = I2s::new(
            res.i2s,
            res.dma,
            I2sConfig::new_tdm_philips()
                .with_sample_rate(Rate::from_hz(sample_rate))
                .with_data_format(DataFormat::Data16Channel16)
                .with_channels(Channels::MONO),
        )
        .map_err(|_| Error::Hal(HalError::InvalidArgument))?
        .with_mclk(res.mclk);

        let rx = i2s
            .i2s_rx
            .with_bclk(res.bclk)
            .with_ws(res.ws)
            .with_din(res.din)
            .build(descriptors);

        info!("[Microphone] I2S input @ {} Hz", sample_rate);
        Ok(Self { rx })
    }
}
