//! Integration tests for fmtuner host-testable logic.
//!
//! Drives the encoder FSM, button path, watcher and tuner together the
//! way the firmware tasks do, with a hand-driven clock.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin};
use fmtuner::config::{
    ACTIVE_POLL_INTERVAL_MS, BUTTON_REARM_MS, EVENT_QUEUE_DEPTH, FM_MAX_TENTHS, FM_MIN_TENTHS,
    INACTIVITY_THRESHOLD_MS, POLL_INTERVAL_MS,
};
use fmtuner::ui::buttons::Button;
use fmtuner::ui::encoder::QuadratureEncoder;
use fmtuner::{
    Error, FrequencyDisplay, HmiContext, ManualClock, RadioControl, Tuner, TuningMode, Watcher,
};

type Hmi<'a> = HmiContext<&'a ManualClock, EVENT_QUEUE_DEPTH>;

#[derive(Default)]
struct Radio {
    tuned: Vec<u16>,
}

impl RadioControl for Radio {
    fn set_frequency(&mut self, mhz: f32) -> Result<(), Error> {
        self.tuned.push((mhz * 10.0).round() as u16);
        Ok(())
    }
}

#[derive(Default)]
struct Screen {
    frames: Vec<(u16, TuningMode)>,
    idle_frames: u32,
}

impl FrequencyDisplay for Screen {
    fn draw(&mut self, mhz: f32, mode: TuningMode) -> Result<(), Error> {
        self.frames.push(((mhz * 10.0).round() as u16, mode));
        Ok(())
    }

    fn draw_idle_indicator(&mut self) -> Result<(), Error> {
        self.idle_frames += 1;
        Ok(())
    }
}

/// Active-low pin whose level the test sets directly.
struct TestPin {
    low: bool,
}

impl ErrorType for TestPin {
    type Error = Infallible;
}

impl InputPin for TestPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.low)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.low)
    }
}

/// Feed full detents through the encoder FSM, as the edge task would.
fn turn(encoder: &mut QuadratureEncoder<'_>, hmi: &Hmi<'_>, detents: i32) {
    let cw = [(false, true), (false, false), (true, false), (true, true)];
    let ccw = [(true, false), (false, false), (false, true), (true, true)];
    let seq = if detents >= 0 { cw } else { ccw };

    for _ in 0..detents.unsigned_abs() {
        for (clk, dt) in seq {
            if encoder.update(clk, dt) {
                hmi.encoder_moved();
            }
        }
    }
}

fn set_level(watcher: &mut Watcher<'_, &ManualClock, TestPin, EVENT_QUEUE_DEPTH>, low: bool) {
    if let Some(button) = watcher.fallback_mut() {
        button.pin_mut().low = low;
    }
}

#[test]
fn turn_press_turn_tunes_in_both_modes() {
    let clock = ManualClock::new(0);
    let hmi: Hmi<'_> = HmiContext::new(&clock, INACTIVITY_THRESHOLD_MS, POLL_INTERVAL_MS);
    let mut encoder = QuadratureEncoder::new(&hmi.encoder);
    let (mut radio, mut screen) = (Radio::default(), Screen::default());

    let mut tuner = Tuner::new(hmi.encoder.read());
    tuner.start(&mut radio, &mut screen);

    // 3 fine detents up: 100.0 -> 100.3
    turn(&mut encoder, &hmi, 3);
    clock.advance(100);
    tuner.tick(&hmi, &mut radio, &mut screen);

    // Press, then 2 coarse detents down: 100.3 -> 98.3
    hmi.press();
    turn(&mut encoder, &hmi, -2);
    clock.advance(100);
    tuner.tick(&hmi, &mut radio, &mut screen);

    assert_eq!(radio.tuned, vec![1000, 1003, 983]);
    assert_eq!(screen.frames.last(), Some(&(983, TuningMode::Coarse)));
    assert_eq!(tuner.state().frequency_tenths, 983);
}

#[test]
fn spinning_far_past_the_band_saturates() {
    let clock = ManualClock::new(0);
    let hmi: Hmi<'_> = HmiContext::new(&clock, INACTIVITY_THRESHOLD_MS, POLL_INTERVAL_MS);
    let mut encoder = QuadratureEncoder::new(&hmi.encoder);
    let (mut radio, mut screen) = (Radio::default(), Screen::default());
    let mut tuner = Tuner::new(hmi.encoder.read());
    tuner.start(&mut radio, &mut screen);

    hmi.press();
    turn(&mut encoder, &hmi, -40);
    tuner.tick(&hmi, &mut radio, &mut screen);
    assert_eq!(tuner.state().frequency_tenths, FM_MIN_TENTHS);

    // Every frequency that reached the radio stayed inside the band.
    turn(&mut encoder, &hmi, 40);
    tuner.tick(&hmi, &mut radio, &mut screen);
    assert_eq!(tuner.state().frequency_tenths, FM_MAX_TENTHS);
    assert!(radio
        .tuned
        .iter()
        .all(|f| (FM_MIN_TENTHS..=FM_MAX_TENTHS).contains(f)));
}

#[test]
fn idle_then_encoder_wakes_everything() {
    let clock = ManualClock::new(0);
    let hmi: Hmi<'_> = HmiContext::new(&clock, INACTIVITY_THRESHOLD_MS, POLL_INTERVAL_MS);
    let mut encoder = QuadratureEncoder::new(&hmi.encoder);
    let mut watcher: Watcher<'_, _, TestPin, EVENT_QUEUE_DEPTH> = Watcher::new(&hmi, None);
    let (mut radio, mut screen) = (Radio::default(), Screen::default());
    let mut tuner = Tuner::new(hmi.encoder.read());
    tuner.start(&mut radio, &mut screen);

    // Exactly at the threshold: still active.
    clock.advance(INACTIVITY_THRESHOLD_MS);
    assert_eq!(watcher.poll(), ACTIVE_POLL_INTERVAL_MS);
    assert!(hmi.activity.polling_active());

    clock.advance(1);
    assert_eq!(watcher.poll(), POLL_INTERVAL_MS);
    assert!(!hmi.activity.polling_active());
    assert!(tuner.tick(&hmi, &mut radio, &mut screen).idle);
    assert_eq!(screen.idle_frames, 1);

    // Further idle passes keep sleeping long.
    clock.advance(POLL_INTERVAL_MS);
    assert_eq!(watcher.poll(), POLL_INTERVAL_MS);

    turn(&mut encoder, &hmi, 1);
    assert!(hmi.activity.polling_active());
    assert_eq!(watcher.poll(), ACTIVE_POLL_INTERVAL_MS);

    let report = tuner.tick(&hmi, &mut radio, &mut screen);
    assert!(!report.idle);
    assert!(report.redrawn && report.retuned);
    assert_eq!(tuner.state().frequency_tenths, 1001);
}

#[test]
fn fallback_button_polling_feeds_the_tuner() {
    let clock = ManualClock::new(0);
    let hmi: Hmi<'_> = HmiContext::new(&clock, INACTIVITY_THRESHOLD_MS, POLL_INTERVAL_MS);
    let button = Button::new(TestPin { low: false }, BUTTON_REARM_MS);
    let mut watcher = Watcher::new(&hmi, Some(button));
    let (mut radio, mut screen) = (Radio::default(), Screen::default());
    let mut tuner = Tuner::new(hmi.encoder.read());
    tuner.start(&mut radio, &mut screen);

    set_level(&mut watcher, true);
    clock.advance(ACTIVE_POLL_INTERVAL_MS);
    watcher.poll();
    // Held across another pass: no second press.
    clock.advance(ACTIVE_POLL_INTERVAL_MS);
    watcher.poll();

    assert_eq!(hmi.events.len(), 2);
    tuner.tick(&hmi, &mut radio, &mut screen);
    assert!(tuner.state().coarse_mode);
    assert_eq!(screen.frames.last().map(|f| f.1), Some(TuningMode::Coarse));

    // Release and press again: back to fine.
    set_level(&mut watcher, false);
    clock.advance(ACTIVE_POLL_INTERVAL_MS);
    watcher.poll();
    set_level(&mut watcher, true);
    clock.advance(ACTIVE_POLL_INTERVAL_MS);
    watcher.poll();

    tuner.tick(&hmi, &mut radio, &mut screen);
    assert!(!tuner.state().coarse_mode);
    assert_eq!(screen.frames.last().map(|f| f.1), Some(TuningMode::Fine));
}

#[test]
fn saturated_queue_drops_but_tuner_keeps_running() {
    let clock = ManualClock::new(0);
    let hmi: Hmi<'_> = HmiContext::new(&clock, INACTIVITY_THRESHOLD_MS, POLL_INTERVAL_MS);
    let (mut radio, mut screen) = (Radio::default(), Screen::default());
    let mut tuner = Tuner::new(hmi.encoder.read());
    tuner.start(&mut radio, &mut screen);

    // One more press than the queue holds: the last toggle is lost.
    for _ in 0..=EVENT_QUEUE_DEPTH {
        hmi.press();
    }
    assert_eq!(hmi.events.dropped(), 1);

    tuner.tick(&hmi, &mut radio, &mut screen);
    assert!(hmi.events.is_empty());
    // Eight toggles applied from fine: back to fine, while the flag says
    // coarse after nine. The next press resynchronises both.
    assert!(!tuner.state().coarse_mode);
    assert!(hmi.coarse());
    hmi.press();
    tuner.tick(&hmi, &mut radio, &mut screen);
    assert_eq!(tuner.state().coarse_mode, hmi.coarse());
}
