//! M5Stack Tab5 (ESP32-P4) bring-up.
//!
//! The Tab5's SoC peripherals (LEDC, LDO, DSI, I2S) are reached through the
//! vendor seams in [`crate::hal`]; the application supplies them as a
//! [`Tab5Platform`]. Chips on the shared I2C bus are driven directly.

pub mod config;

use embedded_hal::{
    delay::DelayNs,
    i2c::I2c,
};

use crate::{
    Error,
    audio::AudioCodec,
    device::{
        Direction,
        pi4ioe5v6408::{
            self,
            OutputMode,
            Pi4ioe5v6408,
        },
    },
    display::{
        DsiBus,
        DsiBusConfig,
        DsiDisplay,
    },
    gui::GuiPort,
    hal::{
        Driver,
        GuiBackend,
        I2sChannels,
        LdoChannel,
        PanelHost,
        PwmChannel,
        PwmTimer,
    },
    i2c::{
        I2cBus,
        I2cBusConfig,
        I2cDevice,
    },
    i2s::{
        I2sBus,
        I2sBusConfig,
    },
    ldo::{
        LdoChannelConfig,
        LdoRegulator,
    },
    ledc::{
        LedcChannel,
        LedcChannelConfig,
        LedcTimer,
        LedcTimerConfig,
        brightness_to_duty,
    },
    touch::I2cTouch,
};

/// Vendor-layer types backing a Tab5.
pub trait Tab5Platform {
    type I2c: Driver<Config = I2cBusConfig, Handle: I2c>;
    type LedcTimer: Driver<Config = LedcTimerConfig, Handle: PwmTimer>;
    type LedcChannel: Driver<Config = LedcChannelConfig, Handle: PwmChannel>;
    type Ldo: Driver<Config = LdoChannelConfig, Handle: LdoChannel>;
    type PanelHost: PanelHost;
    type DsiBus: Driver<Config = DsiBusConfig, Handle = <Self::PanelHost as PanelHost>::Bus>;
    type I2s: Driver<Config = I2sBusConfig, Handle: I2sChannels>;
    type Gui;
    type Delay: DelayNs;
}

/// The drivers a [`M5StackTab5`] is built from.
pub struct Tab5Drivers<P: Tab5Platform> {
    pub ledc_timer: P::LedcTimer,
    pub ledc_channel: P::LedcChannel,
    pub dsi_phy_ldo: P::Ldo,
    pub dsi_bus: P::DsiBus,
    pub panel_host: P::PanelHost,
    pub i2s: P::I2s,
    pub gui: P::Gui,
    pub delay: P::Delay,
}

type Dev<'a, P> = I2cDevice<'a, <P as Tab5Platform>::I2c>;

/// Touch type handed to the GUI backend.
pub type Tab5Touch<'a, P> = I2cTouch<Dev<'a, P>>;
/// Display type handed to the GUI backend.
pub type Tab5Display<P> = DsiDisplay<<P as Tab5Platform>::PanelHost>;

pub struct M5StackTab5<'a, P: Tab5Platform> {
    i2c: &'a I2cBus<P::I2c>,
    io_expander0: Pi4ioe5v6408<Dev<'a, P>>,
    io_expander1: Pi4ioe5v6408<Dev<'a, P>>,
    ledc_timer: LedcTimer<P::LedcTimer>,
    ledc_channel: LedcChannel<P::LedcChannel>,
    dsi_phy_ldo: LdoRegulator<P::Ldo>,
    dsi_bus: DsiBus<P::DsiBus>,
    display: Tab5Display<P>,
    touch: Tab5Touch<'a, P>,
    i2s: I2sBus<P::I2s>,
    audio: AudioCodec<Dev<'a, P>>,
    gui: GuiPort<P::Gui>,
    delay: P::Delay,
}

/// Logs which bring-up step failed and passes the result through.
fn step<T>(name: &'static str, result: Result<T, Error>) -> Result<T, Error> {
    result.inspect_err(|e| error!("[M5StackTab5] {} failed: {}", name, e.name()))
}

/// A [`step`] that first takes a device on the shared bus.
fn device_step<'b, D, T>(
    name: &'static str,
    bus: &'b I2cBus<D>,
    op: impl FnOnce(I2cDevice<'b, D>) -> Result<T, Error>,
) -> Result<T, Error>
where
    D: Driver<Config = I2cBusConfig>,
    D::Handle: I2c,
{
    step(name, bus.device().and_then(op))
}

impl<'a, P> M5StackTab5<'a, P>
where
    P: Tab5Platform,
    P::Gui: GuiBackend<Tab5Display<P>, Tab5Touch<'a, P>>,
{
    /// `i2c` is opened by [`init`](Self::init); it may be shared with
    /// application devices afterwards.
    pub fn new(i2c: &'a I2cBus<P::I2c>, drivers: Tab5Drivers<P>) -> Self {
        Self {
            i2c,
            io_expander0: Pi4ioe5v6408::new("IoExpander0"),
            io_expander1: Pi4ioe5v6408::new("IoExpander1"),
            ledc_timer: LedcTimer::new(drivers.ledc_timer),
            ledc_channel: LedcChannel::new(drivers.ledc_channel),
            dsi_phy_ldo: LdoRegulator::new(drivers.dsi_phy_ldo),
            dsi_bus: DsiBus::new(drivers.dsi_bus),
            display: DsiDisplay::new(drivers.panel_host),
            touch: I2cTouch::new(),
            i2s: I2sBus::new(drivers.i2s),
            audio: AudioCodec::new(),
            gui: GuiPort::new(drivers.gui),
            delay: drivers.delay,
        }
    }

    /// Runs the full bring-up sequence.
    ///
    /// Stops at the first failing step. Steps that already succeeded stay
    /// up; call [`deinit`](Self::deinit) to release them.
    pub fn init(&mut self) -> Result<(), Error> {
        let bus = self.i2c;
        info!("[M5StackTab5] bring-up start");

        step("I2C bus", bus.init(&config::I2C_BUS))?;
        step("I2C scan", bus.scan())?;

        device_step("IO expander 0", bus, |d| {
            self.io_expander0.init(d, pi4ioe5v6408::ADDR_LOW)
        })?;
        device_step("IO expander 1", bus, |d| {
            self.io_expander1.init(d, pi4ioe5v6408::ADDR_HIGH)
        })?;
        step("IO expander pins", self.enable_power_rails())?;

        step("LEDC timer", self.ledc_timer.init(&config::LEDC_TIMER))?;
        step(
            "LEDC channel",
            self.ledc_channel
                .init(&self.ledc_timer, &config::LEDC_CHANNEL),
        )?;

        step("DSI PHY LDO", self.dsi_phy_ldo.init(&config::DSI_PHY_LDO))?;
        self.delay.delay_ms(config::DSI_PHY_SETTLE_MS);

        step("DSI bus", self.dsi_bus.init(&config::DSI_BUS))?;
        step(
            "DSI display",
            self.display.init(
                &self.dsi_bus,
                &config::DSI_DISPLAY,
                &config::PANEL_VENDOR,
                &mut self.delay,
            ),
        )?;
        step("invert color", self.display.invert_color(false))?;

        device_step("touch", bus, |d| self.touch.init(d, &config::TOUCH))?;

        step("I2S bus", self.i2s.init(&config::I2S_BUS))?;
        step("I2S TX", self.i2s.configure_tx(&config::I2S_STD))?;
        step("I2S RX", self.i2s.configure_rx(&config::I2S_STD))?;
        step("I2S TX enable", self.i2s.enable_tx())?;
        step("I2S RX enable", self.i2s.enable_rx())?;

        step("audio codec", self.audio.init(&self.i2s))?;
        device_step("speaker", bus, |d| {
            self.audio
                .add_speaker(d, &config::SPEAKER_CODEC, &mut self.delay)
        })?;
        device_step("microphone", bus, |d| {
            self.audio
                .add_microphone(d, &config::MICROPHONE_CODEC, &mut self.delay)
        })?;

        step(
            "GUI port",
            self.gui
                .init::<Tab5Display<P>, Tab5Touch<'a, P>>(&config::GUI_PORT),
        )?;
        step(
            "GUI display",
            self.gui
                .add_display::<_, Tab5Touch<'a, P>>(&self.display, &config::GUI_DISPLAY),
        )?;
        step(
            "GUI touch",
            self.gui
                .add_touch::<Tab5Display<P>, _>(&self.touch, &config::GUI_TOUCH),
        )?;

        step("backlight", self.set_display_brightness(100))?;
        info!("[M5StackTab5] bring-up done");
        Ok(())
    }

    /// LCD, touch and speaker supplies on expander 0, USB and Wi-Fi on 1.
    fn enable_power_rails(&mut self) -> Result<(), Error> {
        let exp0 = &mut self.io_expander0;
        exp0.set_direction(config::EXP0_LCD_EN, Direction::Output)?;
        exp0.set_level(config::EXP0_LCD_EN, true)?;
        exp0.set_output_mode(config::EXP0_LCD_EN, OutputMode::PushPull)?;
        self.delay.delay_ms(config::LCD_POWER_SETTLE_MS);

        for pin in [config::EXP0_TOUCH_EN, config::EXP0_SPEAKER_EN] {
            self.io_expander0.set_direction(pin, Direction::Output)?;
            self.io_expander0.set_level(pin, true)?;
        }
        for pin in [config::EXP1_USB_EN, config::EXP1_WIFI_EN] {
            self.io_expander1.set_direction(pin, Direction::Output)?;
            self.io_expander1.set_level(pin, true)?;
        }
        Ok(())
    }

    /// Releases everything [`init`](Self::init) acquired, last step first.
    ///
    /// Every wrapper is released even if one fails; the first error is
    /// returned. Calling it again is a no-op.
    pub fn deinit(&mut self) -> Result<(), Error> {
        let results = [
            self.gui.deinit::<Tab5Display<P>, Tab5Touch<'a, P>>(),
            self.audio.deinit(),
            self.i2s.deinit(),
            {
                self.touch.deinit();
                Ok(())
            },
            self.display.deinit(),
            self.dsi_bus.deinit(),
            self.dsi_phy_ldo.deinit(),
            self.ledc_channel.deinit(),
            self.ledc_timer.deinit(),
            {
                self.io_expander1.deinit();
                self.io_expander0.deinit();
                Ok(())
            },
            self.i2c.deinit(),
        ];
        results.into_iter().collect::<Result<(), Error>>()
    }

    /// Backlight PWM, `percent` clamped to 0..=100.
    pub fn set_display_brightness(&mut self, percent: i32) -> Result<(), Error> {
        let duty = brightness_to_duty(percent, self.ledc_timer.max_duty()?);
        self.ledc_channel.set_duty_and_update(duty)?;
        debug!("[M5StackTab5] brightness {} -> duty {}", percent, duty);
        Ok(())
    }

    pub fn set_display_backlight(&mut self, on: bool) -> Result<(), Error> {
        self.set_display_brightness(if on { 100 } else { 0 })
    }

    /// Switches the LCD supply (LCD_EN on expander 0).
    pub fn set_display_power(&mut self, on: bool) -> Result<(), Error> {
        self.io_expander0.set_level(config::EXP0_LCD_EN, on)
    }

    pub const fn i2c_bus(&self) -> &'a I2cBus<P::I2c> {
        self.i2c
    }

    pub fn io_expander0(&mut self) -> &mut Pi4ioe5v6408<Dev<'a, P>> {
        &mut self.io_expander0
    }

    pub fn io_expander1(&mut self) -> &mut Pi4ioe5v6408<Dev<'a, P>> {
        &mut self.io_expander1
    }

    pub fn ledc_timer(&mut self) -> &mut LedcTimer<P::LedcTimer> {
        &mut self.ledc_timer
    }

    pub fn ledc_channel(&mut self) -> &mut LedcChannel<P::LedcChannel> {
        &mut self.ledc_channel
    }

    pub fn dsi_phy_ldo(&mut self) -> &mut LdoRegulator<P::Ldo> {
        &mut self.dsi_phy_ldo
    }

    pub fn dsi_bus(&mut self) -> &mut DsiBus<P::DsiBus> {
        &mut self.dsi_bus
    }

    pub fn display(&mut self) -> &mut Tab5Display<P> {
        &mut self.display
    }

    pub fn touch(&mut self) -> &mut Tab5Touch<'a, P> {
        &mut self.touch
    }

    pub fn i2s_bus(&mut self) -> &mut I2sBus<P::I2s> {
        &mut self.i2s
    }

    pub fn audio_codec(&mut self) -> &mut AudioCodec<Dev<'a, P>> {
        &mut self.audio
    }

    pub fn gui_port(&mut self) -> &mut GuiPort<P::Gui> {
        &mut self.gui
    }
}
