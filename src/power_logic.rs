use crate::config::ACTIVE_POLL_INTERVAL_MS;

/// Milliseconds between two wrapping millisecond timestamps.
pub fn elapsed_ms(now_ms: u32, since_ms: u32) -> u32 {
    now_ms.wrapping_sub(since_ms)
}

/// Decide whether the device counts as idle.
///
/// Idle only once the threshold is strictly exceeded.
pub fn is_idle(idle_ms: u32, inactivity_threshold_ms: u32) -> bool {
    idle_ms > inactivity_threshold_ms
}

/// Watcher sleep between passes: short while polling, `poll_interval_ms`
/// while idle.
pub fn watcher_sleep_ms(polling_active: bool, poll_interval_ms: u32) -> u32 {
    if polling_active {
        ACTIVE_POLL_INTERVAL_MS.min(poll_interval_ms)
    } else {
        poll_interval_ms
    }
}
