//! Interrupt -> task event bridge.
//!
//! A fixed-capacity FIFO between the pin-change interrupts (and the
//! watcher) and the cooperative tuner loop. Backed by an Embassy channel
//! over a critical-section mutex, so the storage is pre-sized and
//! `enqueue()` is safe from any interrupt priority.
//!
//! Saturation policy: when the queue is full the newest event is dropped
//! and counted. Liveness of the ISR beats completeness of the UI stream.

use core::future::Future;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

/// Discrete input events consumed by the tuner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PendingEvent {
    /// Coarse/fine flag flipped by the encoder button; carries the new value.
    CoarseToggle(bool),
    /// Button press seen by the watcher's fallback polling.
    EncoderButton(bool),
}

/// Multi-producer / single-consumer event FIFO.
pub struct EventBridge<const N: usize> {
    channel: Channel<CriticalSectionRawMutex, PendingEvent, N>,
    dropped: AtomicU32,
}

impl<const N: usize> EventBridge<N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue an event without suspending. Callable from interrupt context.
    ///
    /// Returns `false` if the queue was full and the event was dropped.
    pub fn enqueue(&self, event: PendingEvent) -> bool {
        match self.channel.try_send(event) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Wait for the next event.
    pub async fn dequeue(&self) -> PendingEvent {
        self.channel.receive().await
    }

    /// Wait for the next event or until `deadline` completes, whichever
    /// comes first.
    pub async fn dequeue_or<F: Future>(&self, deadline: F) -> Option<PendingEvent> {
        match select(self.channel.receive(), deadline).await {
            Either::First(event) => Some(event),
            Either::Second(_) => None,
        }
    }

    /// Take one event if any is queued.
    pub fn try_dequeue(&self) -> Option<PendingEvent> {
        self.channel.try_receive().ok()
    }

    /// Take everything currently queued, oldest first, without suspending.
    pub fn drain_nonblocking(&self) -> Vec<PendingEvent, N> {
        let mut out = Vec::new();
        while !out.is_full() {
            match self.channel.try_receive() {
                Ok(event) => {
                    // Capacity checked above.
                    let _ = out.push(event);
                }
                Err(_) => break,
            }
        }
        out
    }

    /// Number of events lost to saturation since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl<const N: usize> Default for EventBridge<N> {
    fn default() -> Self {
        Self::new()
    }
}
