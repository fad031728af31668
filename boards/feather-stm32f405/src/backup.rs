//! Calibration storage in an RTC backup register
//!
//! The backup domain survives resets and, with VBAT fitted, power loss.
//! The boot path reads the register back before trusting HSI.

use defmt::debug;
use embassy_stm32::pac::RTC;
use embassy_stm32::peripherals;
use hal_abstractions::PersistenceSink;

/// Backup registers on the STM32F405 (RTC_BKP0R..RTC_BKP19R)
pub const BACKUP_REGISTERS: usize = 20;

pub struct BackupRegister {
    _rtc: embassy_stm32::Peri<'static, peripherals::RTC>,
    index: usize,
}

impl BackupRegister {
    /// Claim backup register `index`.
    ///
    /// Backup domain access is enabled by the LSE bring-up in `init`.
    pub fn new(rtc: embassy_stm32::Peri<'static, peripherals::RTC>, index: u16) -> Self {
        let index = usize::from(index);
        assert!(index < BACKUP_REGISTERS, "no such backup register");
        Self { _rtc: rtc, index }
    }

    /// Value left by a previous calibration, if any
    pub fn load(&self) -> Option<u8> {
        match RTC.bkpr(self.index).read().bkp() {
            0 => None,
            raw => u8::try_from(raw).ok(),
        }
    }
}

impl PersistenceSink for BackupRegister {
    fn store(&mut self, value: u8) {
        let register = RTC.bkpr(self.index);
        if register.read().bkp() == u32::from(value) {
            debug!("BKP{}R already holds {}", self.index, value);
            return;
        }
        register.write(|w| w.set_bkp(u32::from(value)));
    }
}
