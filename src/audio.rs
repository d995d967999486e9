//! Speaker and microphone codecs behind one I2S port.
//!
//! The codecs are controlled over I2C and stream over the I2S port, which
//! must be open before any codec is added.

use embedded_hal::{
    delay::DelayNs,
    i2c::I2c,
};

use crate::{
    Error,
    device::{
        es7210::Es7210,
        es8388::Es8388,
    },
    hal::{
        Driver,
        I2sChannels,
    },
    i2s::{
        I2sBus,
        I2sBusConfig,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecChip {
    /// DAC driving the speaker amplifier.
    Es8388,
    /// ADC for the microphone array.
    Es7210 {
        /// Enabled microphones, bit 0 = MIC1.
        mics: u8,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CodecConfig {
    pub chip: CodecChip,
    pub address: u8,
    /// Codec generates the I2S clocks.
    pub master_mode: bool,
}

/// A codec that finished its setup sequence.
pub enum CodecHandle<I> {
    Es8388(Es8388<I>),
    Es7210(Es7210<I>),
}

impl<I: I2c> CodecHandle<I> {
    fn close(self) -> Result<(), Error> {
        match self {
            Self::Es8388(c) => c.close(),
            Self::Es7210(c) => c.close(),
        }
    }
}

/// Runs the chip's setup sequence and returns the ready codec.
pub fn create_codec<I: I2c>(
    i2c: I,
    config: &CodecConfig,
    delay: &mut impl DelayNs,
) -> Result<CodecHandle<I>, Error> {
    let handle = match config.chip {
        CodecChip::Es8388 => {
            Es8388::open(i2c, config.address, config.master_mode).map(CodecHandle::Es8388)
        }
        CodecChip::Es7210 { mics } => {
            Es7210::open(i2c, config.address, config.master_mode, mics, delay)
                .map(CodecHandle::Es7210)
        }
    };
    handle.inspect_err(|e| {
        error!(
            "[AudioCodec] codec at {:#x} failed to start: {}",
            config.address,
            e.name()
        );
    })
}

pub struct AudioCodec<I> {
    i2s: Option<I2sBusConfig>,
    speaker: Option<Es8388<I>>,
    microphone: Option<Es7210<I>>,
}

impl<I: I2c> Default for AudioCodec<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: I2c> AudioCodec<I> {
    pub const fn new() -> Self {
        Self {
            i2s: None,
            speaker: None,
            microphone: None,
        }
    }

    /// Binds the codec pair to an open I2S port.
    pub fn init<D>(&mut self, i2s: &I2sBus<D>) -> Result<(), Error>
    where
        D: Driver<Config = I2sBusConfig>,
        D::Handle: I2sChannels,
    {
        if self.i2s.is_some() {
            warn!("[AudioCodec] already initialized, deinitializing first");
            self.deinit()?;
        }
        let Some(config) = i2s.config() else {
            error!("[AudioCodec] I2S port not initialized");
            return Err(Error::InvalidState);
        };
        self.i2s = Some(*config);
        info!("[AudioCodec] bound to I2S port {}", config.port);
        Ok(())
    }

    /// Closes both codecs. Both are released even if one fails.
    pub fn deinit(&mut self) -> Result<(), Error> {
        self.i2s = None;
        let spk = self.speaker.take().map_or(Ok(()), Es8388::close);
        let mic = self.microphone.take().map_or(Ok(()), Es7210::close);
        spk.and(mic)
    }

    pub const fn is_initialized(&self) -> bool {
        self.i2s.is_some()
    }

    fn check_bound(&self) -> Result<(), Error> {
        if self.i2s.is_none() {
            error!("[AudioCodec] not initialized");
            return Err(Error::InvalidState);
        }
        Ok(())
    }

    /// Creates the output codec on `i2c`.
    pub fn add_speaker(
        &mut self,
        i2c: I,
        config: &CodecConfig,
        delay: &mut impl DelayNs,
    ) -> Result<(), Error> {
        self.check_bound()?;
        match create_codec(i2c, config, delay)? {
            CodecHandle::Es8388(codec) => {
                if let Some(old) = self.speaker.replace(codec) {
                    old.close()?;
                }
                info!("[AudioCodec] speaker codec at {:#x}", config.address);
                Ok(())
            }
            other => {
                error!("[AudioCodec] codec at {:#x} has no output path", config.address);
                other.close()?;
                Err(Error::HandleCreation("speaker"))
            }
        }
    }

    /// Creates the input codec on `i2c`.
    pub fn add_microphone(
        &mut self,
        i2c: I,
        config: &CodecConfig,
        delay: &mut impl DelayNs,
    ) -> Result<(), Error> {
        self.check_bound()?;
        match create_codec(i2c, config, delay)? {
            CodecHandle::Es7210(codec) => {
                if let Some(old) = self.microphone.replace(codec) {
                    old.close()?;
                }
                info!("[AudioCodec] microphone codec at {:#x}", config.address);
                Ok(())
            }
            other => {
                error!("[AudioCodec] codec at {:#x} has no input path", config.address);
                other.close()?;
                Err(Error::HandleCreation("microphone"))
            }
        }
    }

    pub const fn has_speaker(&self) -> bool {
        self.speaker.is_some()
    }

    pub const fn has_microphone(&self) -> bool {
        self.microphone.is_some()
    }

    fn speaker(&mut self) -> Result<&mut Es8388<I>, Error> {
        self.speaker.as_mut().ok_or_else(|| {
            error!("[AudioCodec] no speaker codec");
            Error::InvalidState
        })
    }

    fn microphone(&mut self) -> Result<&mut Es7210<I>, Error> {
        self.microphone.as_mut().ok_or_else(|| {
            error!("[AudioCodec] no microphone codec");
            Error::InvalidState
        })
    }

    /// `percent` is clamped to 0..=100.
    pub fn set_speaker_volume(&mut self, percent: i32) -> Result<(), Error> {
        let percent = percent.clamp(0, 100) as u8;
        self.speaker()?.set_volume(percent)?;
        debug!("[AudioCodec] speaker volume {}%", percent);
        Ok(())
    }

    pub fn speaker_volume(&mut self) -> Result<u8, Error> {
        Ok(self.speaker()?.volume())
    }

    pub fn set_speaker_mute(&mut self, mute: bool) -> Result<(), Error> {
        self.speaker()?.set_mute(mute)
    }

    pub fn is_speaker_muted(&mut self) -> Result<bool, Error> {
        self.speaker()?.is_muted()
    }

    /// Microphone PGA gain in dB: 0..=42 in 3 dB steps.
    pub fn set_microphone_gain(&mut self, db: u8) -> Result<(), Error> {
        self.microphone()?.set_gain(db)?;
        debug!("[AudioCodec] microphone gain {} dB", db);
        Ok(())
    }

    pub fn microphone_gain(&mut self) -> Result<u8, Error> {
        self.microphone()?.gain()
    }

    pub fn set_microphone_mute(&mut self, mute: bool) -> Result<(), Error> {
        self.microphone()?.set_mute(mute)
    }

    pub fn is_microphone_muted(&mut self) -> Result<bool, Error> {
        self.microphone()?.is_muted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        board::tab5::config,
        mock::{
            FakeDelay,
            FakeDriver,
            FakeI2c,
            Journal,
        },
    };

    fn open_i2s(journal: &Journal) -> I2sBus<FakeDriver<I2sBusConfig>> {
        let mut i2s = I2sBus::new(FakeDriver::new("i2s", journal));
        i2s.init(&config::I2S_BUS).unwrap();
        i2s
    }

    fn codec_bus(journal: &Journal) -> FakeI2c {
        let i2c = FakeI2c::new(journal);
        i2c.add_device(config::SPEAKER_CODEC.address);
        i2c.add_device(config::MICROPHONE_CODEC.address);
        i2c
    }

    #[test]
    fn codecs_need_a_bound_i2s_port() {
        let journal = Journal::default();
        let i2c = codec_bus(&journal);
        let mut delay = FakeDelay::new(&journal);
        let mut audio = AudioCodec::new();

        let r = audio.add_speaker(i2c.clone(), &config::SPEAKER_CODEC, &mut delay);
        assert_eq!(r, Err(Error::InvalidState));

        let closed: I2sBus<FakeDriver<I2sBusConfig>> =
            I2sBus::new(FakeDriver::new("i2s", &journal));
        assert_eq!(
            audio.init(&closed),
            Err(Error::InvalidState)
        );
        assert!(journal.events().is_empty());
    }

    #[test]
    fn speaker_and_microphone_controls() {
        let journal = Journal::default();
        let i2s = open_i2s(&journal);
        let i2c = codec_bus(&journal);
        let mut delay = FakeDelay::new(&journal);
        let mut audio = AudioCodec::new();
        audio.init(&i2s).unwrap();
        audio
            .add_speaker(i2c.clone(), &config::SPEAKER_CODEC, &mut delay)
            .unwrap();
        audio
            .add_microphone(i2c.clone(), &config::MICROPHONE_CODEC, &mut delay)
            .unwrap();

        audio.set_speaker_volume(140).unwrap();
        assert_eq!(audio.speaker_volume(), Ok(100));
        audio.set_speaker_volume(-5).unwrap();
        assert_eq!(audio.speaker_volume(), Ok(0));

        audio.set_speaker_mute(true).unwrap();
        assert_eq!(audio.is_speaker_muted(), Ok(true));

        audio.set_microphone_gain(24).unwrap();
        assert_eq!(audio.microphone_gain(), Ok(24));
        audio.set_microphone_mute(true).unwrap();
        assert_eq!(audio.is_microphone_muted(), Ok(true));
    }

    #[test]
    fn wrong_codec_for_the_role_is_rejected() {
        let journal = Journal::default();
        let i2s = open_i2s(&journal);
        let i2c = codec_bus(&journal);
        let mut delay = FakeDelay::new(&journal);
        let mut audio = AudioCodec::new();
        audio.init(&i2s).unwrap();

        let r = audio.add_speaker(i2c, &config::MICROPHONE_CODEC, &mut delay);

        assert_eq!(r, Err(Error::HandleCreation("speaker")));
        assert!(!audio.has_speaker());
    }

    #[test]
    fn missing_codec_propagates_the_bus_error() {
        let journal = Journal::default();
        let i2s = open_i2s(&journal);
        let mut delay = FakeDelay::new(&journal);
        let mut audio = AudioCodec::new();
        audio.init(&i2s).unwrap();

        let r = audio.add_microphone(FakeI2c::new(&journal), &config::MICROPHONE_CODEC, &mut delay);

        assert!(matches!(r, Err(Error::I2c(_))));
        assert_eq!(audio.microphone_gain(), Err(Error::InvalidState));
    }

    #[test]
    fn deinit_powers_codecs_down() {
        let journal = Journal::default();
        let i2s = open_i2s(&journal);
        let i2c = codec_bus(&journal);
        let mut delay = FakeDelay::new(&journal);
        let mut audio = AudioCodec::new();
        audio.init(&i2s).unwrap();
        audio
            .add_speaker(i2c.clone(), &config::SPEAKER_CODEC, &mut delay)
            .unwrap();

        audio.deinit().unwrap();
        audio.deinit().unwrap();

        assert_eq!(i2c.reg(config::SPEAKER_CODEC.address, 0x02), 0xff);
        assert!(!audio.is_initialized());
        assert_eq!(audio.speaker_volume(), Err(Error::InvalidState));
    }
}
