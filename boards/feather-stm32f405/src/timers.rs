//! Counter pair for the measurement
//!
//! TIM3 counts the HSI-derived bus clock. TIM2 counts LSE edges on its ETR
//! input: LSE leaves on MCO1 (PA8) and comes back on TIM2_ETR (PA15) through
//! a jumper wire. TIM2's enable is TIM3's trigger (TRGO -> ITR1), so
//! releasing TIM2 starts both counters on the same bus edge.

use defmt::info;
use embassy_stm32::pac::gpio::vals::Moder;
use embassy_stm32::pac::rcc::vals::{Mco1sel, Mcopre};
use embassy_stm32::pac::timer::vals::{Etps, Mms, Sms, Ts};
use embassy_stm32::pac::{GPIOA, RCC, TIM2, TIM3};
use embassy_stm32::peripherals;
use hal_abstractions::{CounterGate, ReferenceCounter, SubjectCounter};
use osccal_core::harness::REFERENCE_PRESET;

/// LSE ticks in one measurement window
///
/// 16 MHz over 128 ticks is 62500 bus clocks, below TIM3's 65536 wrap.
pub const REFERENCE_MODULUS: u32 = 128;

/// TIM2 auto-reload value
///
/// TIM2 raises UIF on the tick that wraps it, with no extra latency. From
/// the preset of 1 it counts up to ARR and wraps, so a reload of
/// `REFERENCE_MODULUS` gives a full window.
const REFERENCE_RELOAD: u32 = REFERENCE_MODULUS;

const _: () = assert!(REFERENCE_RELOAD + 1 - REFERENCE_PRESET == REFERENCE_MODULUS);

const MCO1_PIN: usize = 8;
const TIM2_ETR_PIN: usize = 15;
const AF_MCO: u8 = 0;
const AF_TIM2: u8 = 1;

type Tim2 = embassy_stm32::Peri<'static, peripherals::TIM2>;
type Tim3 = embassy_stm32::Peri<'static, peripherals::TIM3>;
type PinPA8 = embassy_stm32::Peri<'static, peripherals::PA8>;
type PinPA15 = embassy_stm32::Peri<'static, peripherals::PA15>;

pub struct MeasurementPeripherals {
    pub tim2: Tim2,
    pub tim3: Tim3,
    pub mco: PinPA8,
    pub etr: PinPA15,
}

/// TIM3, free-running from the bus clock once triggered
pub struct SubjectTimer {
    _tim: Tim3,
}

/// TIM2, clocked by LSE through ETR
pub struct ReferenceTimer {
    _tim: Tim2,
    _mco: PinPA8,
    _etr: PinPA15,
}

/// TIM2's counter enable, seen by TIM3 as its trigger
pub struct TriggerGate {
    _private: (),
}

/// Route LSE to TIM2 and chain TIM3 behind it. Both counters stay stopped.
pub fn configure(p: MeasurementPeripherals) -> (SubjectTimer, ReferenceTimer, TriggerGate) {
    RCC.ahb1enr().modify(|w| w.set_gpioaen(true));
    RCC.apb1enr().modify(|w| {
        w.set_tim2en(true);
        w.set_tim3en(true);
    });

    RCC.cfgr().modify(|w| {
        w.set_mco1sel(Mco1sel::LSE);
        w.set_mco1pre(Mcopre::DIV1);
    });

    GPIOA.moder().modify(|w| {
        w.set_moder(MCO1_PIN, Moder::ALTERNATE);
        w.set_moder(TIM2_ETR_PIN, Moder::ALTERNATE);
    });
    GPIOA.afr(MCO1_PIN / 8).modify(|w| w.set_afr(MCO1_PIN % 8, AF_MCO));
    GPIOA.afr(TIM2_ETR_PIN / 8).modify(|w| w.set_afr(TIM2_ETR_PIN % 8, AF_TIM2));

    TIM2.cr1().modify(|w| w.set_cen(false));
    TIM2.smcr().modify(|w| {
        w.set_etps(Etps::DIV1);
        w.set_ece(true);
    });
    TIM2.arr().write(|w| w.set_arr(REFERENCE_RELOAD));
    TIM2.cr2().modify(|w| w.set_mms(Mms::ENABLE));

    TIM3.cr1().modify(|w| w.set_cen(false));
    TIM3.arr().write(|w| w.set_arr(u16::MAX));
    TIM3.smcr().modify(|w| {
        w.set_ts(Ts::ITR1);
        w.set_sms(Sms::TRIGGER_MODE);
    });

    info!("LSE on MCO1/PA8, TIM2_ETR on PA15, TIM3 triggered by TIM2");

    (
        SubjectTimer { _tim: p.tim3 },
        ReferenceTimer {
            _tim: p.tim2,
            _mco: p.mco,
            _etr: p.etr,
        },
        TriggerGate { _private: () },
    )
}

impl SubjectCounter for SubjectTimer {
    const MODULUS: u64 = 1 << 16;

    fn reset(&mut self, count: u32) {
        TIM3.cnt().write(|w| w.set_cnt(count as u16));
    }

    fn start(&mut self) {
        TIM3.cr1().modify(|w| w.set_cen(true));
    }

    fn stop(&mut self) {
        TIM3.cr1().modify(|w| w.set_cen(false));
    }

    fn read(&self) -> u32 {
        u32::from(TIM3.cnt().read().cnt())
    }

    fn overflowed(&self) -> bool {
        TIM3.sr().read().uif()
    }

    fn clear_overflow(&mut self) {
        TIM3.sr().modify(|w| w.set_uif(false));
    }
}

impl ReferenceCounter for ReferenceTimer {
    fn reset(&mut self, count: u32) {
        TIM2.cnt().write(|w| w.set_cnt(count));
    }

    fn overflowed(&self) -> bool {
        TIM2.sr().read().uif()
    }

    fn clear_overflow(&mut self) {
        TIM2.sr().modify(|w| w.set_uif(false));
    }

    fn stop(&mut self) {
        TIM2.cr1().modify(|w| w.set_cen(false));
    }
}

impl CounterGate for TriggerGate {
    fn hold(&mut self) {
        TIM2.cr1().modify(|w| w.set_cen(false));
        TIM3.cr1().modify(|w| w.set_cen(false));
    }

    fn release(&mut self) {
        TIM2.cr1().modify(|w| w.set_cen(true));
    }
}
