//! On-chip LDO regulator channels.

use crate::{
    Error,
    hal::{
        Driver,
        LdoChannel,
    },
    resource::Resource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LdoChannelConfig {
    pub channel: u8,
    pub voltage_mv: u16,
    /// Whether the voltage may be changed after acquisition.
    pub adjustable: bool,
    pub owned_by_hw: bool,
}

pub struct LdoRegulator<D: Driver> {
    res: Resource<D>,
    config: Option<LdoChannelConfig>,
}

impl<D> LdoRegulator<D>
where
    D: Driver<Config = LdoChannelConfig>,
    D::Handle: LdoChannel,
{
    pub const fn new(driver: D) -> Self {
        Self {
            res: Resource::new("Ldo", driver),
            config: None,
        }
    }

    pub fn init(&mut self, config: &LdoChannelConfig) -> Result<(), Error> {
        self.res.init(config)?;
        self.config = Some(*config);
        info!(
            "[Ldo] channel {} acquired ({} mV)",
            config.channel, config.voltage_mv
        );
        Ok(())
    }

    pub fn deinit(&mut self) -> Result<(), Error> {
        self.config = None;
        self.res.deinit()
    }

    pub const fn is_initialized(&self) -> bool {
        self.res.is_initialized()
    }

    pub fn voltage_mv(&self) -> Option<u16> {
        self.config.map(|c| c.voltage_mv)
    }

    pub fn adjust_voltage(&mut self, voltage_mv: u16) -> Result<(), Error> {
        self.res
            .with("adjust_voltage", |ch| ch.adjust_voltage(voltage_mv))?;
        if let Some(config) = self.config.as_mut() {
            config.voltage_mv = voltage_mv;
        }
        info!("[Ldo] voltage adjusted to {} mV", voltage_mv);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        HalError,
        mock::{
            FakeDriver,
            Journal,
        },
    };

    const DSI_PHY: LdoChannelConfig = LdoChannelConfig {
        channel: 3,
        voltage_mv: 2500,
        adjustable: true,
        owned_by_hw: false,
    };

    #[test]
    fn adjust_requires_an_acquired_channel() {
        let journal = Journal::default();
        let mut ldo = LdoRegulator::new(FakeDriver::new("ldo", &journal));

        assert_eq!(ldo.adjust_voltage(1800), Err(Error::InvalidState));
        ldo.init(&DSI_PHY).unwrap();
        ldo.adjust_voltage(1800).unwrap();

        assert_eq!(ldo.voltage_mv(), Some(1800));
        assert_eq!(journal.events(), ["ldo.open", "ldo.adjust_voltage 1800"]);
    }

    #[test]
    fn vendor_errors_are_propagated() {
        let journal = Journal::default();
        let mut ldo = LdoRegulator::new(FakeDriver::failing(
            "ldo",
            &journal,
            HalError::InvalidArgument,
        ));

        assert_eq!(
            ldo.init(&DSI_PHY),
            Err(Error::Hal(HalError::InvalidArgument))
        );
        assert!(!ldo.is_initialized());
        assert_eq!(ldo.deinit(), Ok(()));
    }
}
