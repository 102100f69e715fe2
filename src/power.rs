//! Idle tracking - the "poll killer".
//!
//! Implements:
//! - Activity timestamp shared by every input path (ISR-safe)
//! - Idle detection for the screen dimmer
//! - Background watcher that polls while active and backs off while idle
//!
//! `mark_activity()` is two atomic stores and can be called from any
//! interrupt. The watcher's "go idle" check runs inside a short critical
//! section so it can never overwrite a wake-up that raced with it.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embedded_hal::digital::InputPin;

use crate::context::HmiContext;
use crate::power_logic;
use crate::ui::buttons::Button;

#[cfg(feature = "defmt")]
use defmt::{debug, info};

// Stub macros when defmt is not available
#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}

/// Monotonic millisecond clock. Wraps after ~49 days; all arithmetic on
/// it is wrapping.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Clock driven by hand, for host tests and simulation.
pub struct ManualClock {
    now: AtomicU32,
}

impl ManualClock {
    pub const fn new(start_ms: u32) -> Self {
        Self {
            now: AtomicU32::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: u32) {
        self.now.store(now_ms, Ordering::Relaxed);
    }

    pub fn advance(&self, ms: u32) {
        let now = self.now.load(Ordering::Relaxed);
        self.now.store(now.wrapping_add(ms), Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.load(Ordering::Relaxed)
    }
}

impl<C: Clock> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Last-activity timestamp plus the polling flag.
pub struct ActivityTracker<C> {
    clock: C,
    last_activity_ms: AtomicU32,
    polling_active: AtomicBool,
    inactivity_threshold_ms: u32,
    poll_interval_ms: u32,
}

impl<C: Clock> ActivityTracker<C> {
    /// Create a tracker that starts active, as if input had just happened.
    pub fn new(clock: C, inactivity_threshold_ms: u32, poll_interval_ms: u32) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            last_activity_ms: AtomicU32::new(now),
            polling_active: AtomicBool::new(true),
            inactivity_threshold_ms,
            poll_interval_ms,
        }
    }

    /// Record user activity and force polling back on.
    ///
    /// Lock-free, O(1), safe from interrupt context. Returns `true` if
    /// this call woke the tracker from idle polling.
    pub fn mark_activity(&self) -> bool {
        self.last_activity_ms
            .store(self.clock.now_ms(), Ordering::Release);
        !self.polling_active.swap(true, Ordering::AcqRel)
    }

    /// Milliseconds since the last recorded activity.
    pub fn idle_ms(&self) -> u32 {
        power_logic::elapsed_ms(
            self.clock.now_ms(),
            self.last_activity_ms.load(Ordering::Acquire),
        )
    }

    /// `true` once the inactivity threshold has been exceeded.
    pub fn is_idle(&self) -> bool {
        power_logic::is_idle(self.idle_ms(), self.inactivity_threshold_ms)
    }

    pub fn polling_active(&self) -> bool {
        self.polling_active.load(Ordering::Acquire)
    }

    /// Switch polling off if the device has been idle past the threshold.
    ///
    /// Returns `true` on the active -> idle transition.
    pub fn suspend_if_idle(&self) -> bool {
        critical_section::with(|_| {
            if self.polling_active.load(Ordering::Acquire) && self.is_idle() {
                self.polling_active.store(false, Ordering::Release);
                true
            } else {
                false
            }
        })
    }

    pub fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }

    pub fn inactivity_threshold_ms(&self) -> u32 {
        self.inactivity_threshold_ms
    }

    pub fn poll_interval_ms(&self) -> u32 {
        self.poll_interval_ms
    }
}

/// Background watcher task body.
///
/// Holds an optional fallback button for boards where the encoder
/// button has no edge interrupt.
pub struct Watcher<'a, C, P, const N: usize> {
    hmi: &'a HmiContext<C, N>,
    fallback: Option<Button<P>>,
}

impl<'a, C: Clock, P: InputPin, const N: usize> Watcher<'a, C, P, N> {
    pub fn new(hmi: &'a HmiContext<C, N>, fallback: Option<Button<P>>) -> Self {
        if fallback.is_some() {
            info!("Poll killer: starting with fallback button polling");
        } else {
            info!("Poll killer: starting");
        }
        Self { hmi, fallback }
    }

    /// One watcher pass. Returns how long to sleep before the next one.
    pub fn poll(&mut self) -> u32 {
        let tracker = &self.hmi.activity;

        if tracker.polling_active() {
            if let Some(button) = self.fallback.as_mut() {
                if button.was_pressed(tracker.now_ms()) {
                    debug!("Poll killer: button event detected");
                    self.hmi.polled_press();
                }
            }

            if tracker.suspend_if_idle() {
                info!("Poll killer: idle, suspending polls");
            }
        }

        power_logic::watcher_sleep_ms(tracker.polling_active(), tracker.poll_interval_ms())
    }

    pub fn fallback_mut(&mut self) -> Option<&mut Button<P>> {
        self.fallback.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ACTIVE_POLL_INTERVAL_MS, INACTIVITY_THRESHOLD_MS, POLL_INTERVAL_MS};

    fn tracker(clock: &ManualClock) -> ActivityTracker<&ManualClock> {
        ActivityTracker::new(clock, INACTIVITY_THRESHOLD_MS, POLL_INTERVAL_MS)
    }

    #[test]
    fn starts_active() {
        let clock = ManualClock::new(0);
        let t = tracker(&clock);
        assert!(t.polling_active());
        assert!(!t.is_idle());
    }

    #[test]
    fn idle_only_after_threshold_is_exceeded() {
        let clock = ManualClock::new(1_000);
        let t = tracker(&clock);

        clock.advance(INACTIVITY_THRESHOLD_MS);
        assert!(!t.is_idle());
        assert!(!t.suspend_if_idle());
        assert!(t.polling_active());

        clock.advance(1);
        assert!(t.is_idle());
        assert!(t.suspend_if_idle());
        assert!(!t.polling_active());
        // Only the transition reports.
        assert!(!t.suspend_if_idle());
    }

    #[test]
    fn mark_activity_wakes_immediately() {
        let clock = ManualClock::new(0);
        let t = tracker(&clock);

        clock.advance(INACTIVITY_THRESHOLD_MS + 10);
        t.suspend_if_idle();
        assert!(t.is_idle());

        assert!(t.mark_activity());
        assert!(!t.is_idle());
        assert!(t.polling_active());
        assert!(!t.mark_activity());
    }

    #[test]
    fn survives_clock_wraparound() {
        let clock = ManualClock::new(u32::MAX - 100);
        let t = tracker(&clock);

        clock.advance(200);
        assert_eq!(t.idle_ms(), 200);
        assert!(!t.is_idle());
    }

    struct LevelPin(bool);

    impl embedded_hal::digital::ErrorType for LevelPin {
        type Error = core::convert::Infallible;
    }

    impl InputPin for LevelPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0)
        }
    }

    type Hmi<'a> = HmiContext<&'a ManualClock, 4>;

    #[test]
    fn watcher_backs_off_once_idle() {
        let clock = ManualClock::new(0);
        let hmi: Hmi<'_> = HmiContext::new(&clock, INACTIVITY_THRESHOLD_MS, POLL_INTERVAL_MS);
        let mut watcher: Watcher<'_, _, LevelPin, 4> = Watcher::new(&hmi, None);

        assert_eq!(watcher.poll(), ACTIVE_POLL_INTERVAL_MS);
        clock.advance(INACTIVITY_THRESHOLD_MS + 1);
        assert_eq!(watcher.poll(), POLL_INTERVAL_MS);
        assert!(!hmi.activity.polling_active());

        hmi.encoder_moved();
        assert_eq!(watcher.poll(), ACTIVE_POLL_INTERVAL_MS);
    }

    #[test]
    fn watcher_polls_fallback_button_only_while_active() {
        let clock = ManualClock::new(0);
        let hmi: Hmi<'_> = HmiContext::new(&clock, INACTIVITY_THRESHOLD_MS, POLL_INTERVAL_MS);
        let button = Button::new(LevelPin(false), 30);
        let mut watcher = Watcher::new(&hmi, Some(button));

        clock.advance(INACTIVITY_THRESHOLD_MS + 1);
        watcher.poll();
        assert!(!hmi.activity.polling_active());

        // Held while suspended: nothing is sampled.
        if let Some(b) = watcher.fallback_mut() {
            b.pin_mut().0 = true;
        }
        watcher.poll();
        assert!(hmi.events.is_empty());

        // Encoder wakes the watcher; the held button is now seen once.
        hmi.encoder_moved();
        watcher.poll();
        watcher.poll();
        assert_eq!(hmi.events.len(), 2);
        assert!(hmi.coarse());
    }
}
