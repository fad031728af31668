#![deny(unsafe_code)]
#![deny(warnings)]
#![no_main]
#![no_std]

use defmt_rtt as _; // global logger
use panic_probe as _;
use rtic::app;
use rtic_monotonics::stm32::prelude::*;

mod backup;
mod config;
mod hsi;
mod timers;

stm32_tim5_monotonic!(Mono, 1_000_000);

#[app(device = embassy_stm32, peripherals = true, dispatchers = [USART1])]
mod app {
    use super::*;
    use defmt::info;
    use embassy_stm32::rcc::{
        AHBPrescaler, APBPrescaler, LsConfig, LseConfig, LseDrive, LseMode, RtcClockSource,
        Sysclk,
    };
    use embassy_stm32::time::Hertz;
    use hal_abstractions::CalibratableOscillator;
    use osccal_core::{run_calibration, DualCounterHarness, LogDiagnostics, SampleEvaluator, Spin};

    use backup::BackupRegister;
    use config::{CALIBRATION, CRYSTAL_SETTLE_MS, HSI_FREQUENCY_HZ, LSE_FREQUENCY_HZ};
    use hsi::HsiTrim;
    use timers::{MeasurementPeripherals, ReferenceTimer, SubjectTimer, TriggerGate};

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        oscillator: HsiTrim,
        subject: SubjectTimer,
        reference: ReferenceTimer,
        gate: TriggerGate,
        storage: BackupRegister,
    }

    #[init]
    fn init(_cx: init::Context) -> (Shared, Local) {
        info!("Oscillator calibration starting...");

        // HSI straight to SYSCLK: the bus clock is the oscillator being trimmed
        let mut config = embassy_stm32::Config::default();
        config.rcc.hsi = true;
        config.rcc.hse = None;
        config.rcc.pll = None;
        config.rcc.sys = Sysclk::HSI;
        config.rcc.ahb_pre = AHBPrescaler::DIV1; // 16 MHz
        config.rcc.apb1_pre = APBPrescaler::DIV1; // 16 MHz, timers x1
        config.rcc.apb2_pre = APBPrescaler::DIV1; // 16 MHz

        config.rcc.ls = LsConfig {
            rtc: RtcClockSource::LSE,
            lsi: false,
            lse: Some(LseConfig {
                frequency: Hertz(LSE_FREQUENCY_HZ),
                mode: LseMode::Oscillator(LseDrive::MediumHigh),
            }),
        };

        let p = embassy_stm32::init(config);
        info!("SYSCLK=HSI ({} Hz), LSE enabled", HSI_FREQUENCY_HZ);

        // APB1 prescaler is 1, so TIM5 runs at the bus clock
        Mono::start(HSI_FREQUENCY_HZ);

        let oscillator = HsiTrim::new();
        info!(
            "HSITRIM={} HSICAL={}",
            oscillator.current(),
            oscillator.factory_calibration()
        );

        let storage = BackupRegister::new(p.RTC, CALIBRATION.storage_address);
        match storage.load() {
            Some(previous) => info!("Previous calibration value {}", previous),
            None => info!("No stored calibration value"),
        }

        let (subject, reference, gate) = timers::configure(MeasurementPeripherals {
            tim2: p.TIM2,
            tim3: p.TIM3,
            mco: p.PA8,
            etr: p.PA15,
        });

        calibrate::spawn().ok();

        (
            Shared {},
            Local {
                oscillator,
                subject,
                reference,
                gate,
                storage,
            },
        )
    }

    /// Wait for LSE to settle, then calibrate HSI once.
    #[task(priority = 1, local = [oscillator, subject, reference, gate, storage])]
    async fn calibrate(cx: calibrate::Context) {
        info!("Waiting {} ms for LSE to settle", CRYSTAL_SETTLE_MS);
        Mono::delay(CRYSTAL_SETTLE_MS.millis()).await;

        let harness = DualCounterHarness::new(
            &mut *cx.local.subject,
            &mut *cx.local.reference,
            &mut *cx.local.gate,
            Spin,
        );
        let evaluator = SampleEvaluator::new(&mut *cx.local.oscillator, harness, &CALIBRATION)
            .with_diagnostics(LogDiagnostics);

        match run_calibration(evaluator, CALIBRATION.layout, cx.local.storage) {
            Ok(value) => info!("HSITRIM calibrated to {}", value),
            Err(never) => match never {},
        }
    }

    /// RTIC idle task - WFI sleep mode when no tasks active
    #[idle]
    fn idle(_cx: idle::Context) -> ! {
        loop {
            cortex_m::asm::wfi();
        }
    }
}
