//! fmtuner firmware - nRF52840 + rotary encoder + SSD1306 + TEA5767.
//!
//! Two executors:
//! - `EXECUTOR_HIGH` (interrupt executor on EGU1_SWI1) runs the encoder
//!   and button edge tasks. They preempt everything below and never
//!   block or allocate.
//! - `EXECUTOR_LOW` (thread executor) runs the tuner control loop and the
//!   poll-killer watcher cooperatively.
//!
//! The two sides only meet in the shared `HmiContext`.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::{info, unwrap, warn};
use embassy_executor::{Executor, InterruptExecutor};
use embassy_futures::select::select;
use embassy_nrf::gpio::{Input, Pull};
use embassy_nrf::interrupt;
use embassy_nrf::interrupt::{InterruptExt, Priority};
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_time::{Instant, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use fmtuner::config::{
    BOOT_SCREEN_MS, BUTTON_IRQ_ENABLED, BUTTON_REARM_MS, EVENT_QUEUE_DEPTH, FM_DEFAULT,
    INACTIVITY_THRESHOLD_MS, POLL_INTERVAL_MS, RADIO_SETTLE_MS, TUNER_TICK_MS,
};
use fmtuner::radio::Tea5767;
use fmtuner::ui::buttons::Button;
use fmtuner::ui::display::TunerPanel;
use fmtuner::ui::encoder::QuadratureEncoder;
use fmtuner::{Clock, HmiContext, TuningMode, Tuner, Watcher};

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
    SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1 => twim::InterruptHandler<peripherals::TWISPI1>;
});

/// Millisecond clock backed by the RTC1 time driver.
struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

type Hmi = HmiContext<EmbassyClock, EVENT_QUEUE_DEPTH>;
type OledBus = Twim<'static, peripherals::TWISPI0>;
type RadioBus = Twim<'static, peripherals::TWISPI1>;

static HMI: StaticCell<Hmi> = StaticCell::new();
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn EGU1_SWI1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[entry]
fn main() -> ! {
    let p = embassy_nrf::init(Default::default());
    info!("fmtuner: starting");

    let hmi: &'static Hmi = HMI.init(HmiContext::new(
        EmbassyClock,
        INACTIVITY_THRESHOLD_MS,
        POLL_INTERVAL_MS,
    ));

    // ── Input pins ─────────────────────────────────────────────────
    let clk = Input::new(p.P0_03, Pull::Up);
    let dt = Input::new(p.P0_04, Pull::Up);
    let button = Button::new(Input::new(p.P0_28, Pull::Up), BUTTON_REARM_MS);

    // ── I²C buses ──────────────────────────────────────────────────
    let oled_bus = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let radio_bus = Twim::new(p.TWISPI1, Irqs, p.P0_30, p.P0_31, twim::Config::default());

    // ── Interrupt-context tasks ────────────────────────────────────
    interrupt::EGU1_SWI1.set_priority(Priority::P6);
    let high = EXECUTOR_HIGH.start(interrupt::EGU1_SWI1);
    unwrap!(high.spawn(encoder_task(clk, dt, hmi)));

    let fallback = if BUTTON_IRQ_ENABLED {
        unwrap!(high.spawn(button_task(button, hmi)));
        None
    } else {
        info!("Button: no edge interrupt, watcher will poll it");
        Some(button)
    };

    // ── Cooperative tasks ──────────────────────────────────────────
    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(move |spawner| {
        unwrap!(spawner.spawn(tuner_task(hmi, oled_bus, radio_bus)));
        unwrap!(spawner.spawn(watcher_task(hmi, fallback)));
    })
}

/// Encoder edge task: one FSM step per pin change on CLK or DT.
#[embassy_executor::task]
async fn encoder_task(mut clk: Input<'static>, mut dt: Input<'static>, hmi: &'static Hmi) -> ! {
    let mut encoder = QuadratureEncoder::new(&hmi.encoder);

    loop {
        select(clk.wait_for_any_edge(), dt.wait_for_any_edge()).await;
        if encoder.update(clk.is_high(), dt.is_high()) {
            hmi.encoder_moved();
        }
    }
}

/// Button edge task: toggles coarse/fine once per press.
#[embassy_executor::task]
async fn button_task(mut button: Button<Input<'static>>, hmi: &'static Hmi) -> ! {
    loop {
        button.pin_mut().wait_for_any_edge().await;
        if button.was_pressed(hmi.activity.now_ms()) {
            let coarse = hmi.press();
            info!("Button: {} mode", TuningMode::from_coarse(coarse).label());
        }
    }
}

/// Control loop: boot screen, then one tick per event or per `TUNER_TICK_MS`.
#[embassy_executor::task]
async fn tuner_task(hmi: &'static Hmi, oled_bus: OledBus, radio_bus: RadioBus) -> ! {
    let mut radio = Tea5767::new(radio_bus);
    if let Err(e) = radio.set_muted(true) {
        warn!("Radio: mute failed: {:?}", e);
    }
    if let Err(e) = radio.set_frequency(FM_DEFAULT) {
        warn!("Radio: initial tune failed: {:?}", e);
    }
    Timer::after_millis(RADIO_SETTLE_MS).await;
    let radio_ok = match radio.ensure_ready() {
        Ok(status) => {
            info!("Radio: locked, stereo {} level {}", status.stereo, status.signal_level);
            true
        }
        Err(e) => {
            warn!("Radio: not ready: {:?}", e);
            false
        }
    };

    let mut panel = TunerPanel::new(oled_bus);
    if let Err(e) = panel.init() {
        warn!("Display: init failed, will retry: {:?}", e);
    }

    if let Err(e) = panel.draw_boot_status(radio_ok) {
        warn!("Display: boot screen failed: {:?}", e);
    }
    Timer::after_millis(BOOT_SCREEN_MS).await;

    let mut tuner = Tuner::new(hmi.encoder.read());
    tuner.start(&mut radio, &mut panel);
    if let Err(e) = radio.set_muted(false) {
        warn!("Radio: unmute failed: {:?}", e);
    }

    loop {
        let deadline = Timer::after_millis(TUNER_TICK_MS);
        if let Some(event) = hmi.events.dequeue_or(deadline).await {
            tuner.apply_event(event);
        }
        tuner.tick(hmi, &mut radio, &mut panel);
    }
}

/// Poll killer: fallback polling while active, long sleeps while idle.
#[embassy_executor::task]
async fn watcher_task(hmi: &'static Hmi, fallback: Option<Button<Input<'static>>>) -> ! {
    let mut watcher = Watcher::new(hmi, fallback);

    loop {
        let sleep_ms = watcher.poll();
        Timer::after_millis(sleep_ms as u64).await;
    }
}
