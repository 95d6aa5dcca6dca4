//! Tick scheduling.
//!
//! The player never waits; it asks a `Timer` to call it back later.
//! `TimerQueue` is the in-process implementation: a virtual clock plus a
//! queue of pending ticks sorted by fire time.

use alloc::vec::Vec;
use mb_ir::TrackId;

/// A callback the player can ask for. Each tick is its own handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tick {
    /// Advance every track's section (coarsest)
    Arrangement,
    /// Advance every track's phrase
    Measure,
    /// Emit a track's next note
    Note(TrackId),
}

/// Scheduling service used by the player.
pub trait Timer {
    /// Current clock time (ms).
    fn now(&self) -> f64;

    /// Fire `tick` after `delay_ms`. A tick that is already pending is
    /// moved to the new time.
    fn schedule(&mut self, delay_ms: f64, tick: Tick);

    /// Drop `tick` if it is pending.
    fn cancel(&mut self, tick: Tick);

    /// Drop every pending tick.
    fn cancel_all(&mut self);
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    fire_at: f64,
    tick: Tick,
}

/// A priority queue of ticks ordered by absolute fire time.
///
/// Ticks due at the same time fire in submission order, so a zero-delay
/// tick runs after everything already due at the current time and before
/// anything due later.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    pending: Vec<Pending>,
    now: f64,
}

impl TimerQueue {
    /// Create an empty queue with the clock at zero.
    pub fn new() -> Self {
        Self { pending: Vec::new(), now: 0.0 }
    }

    /// Fire time of the next pending tick.
    pub fn peek_time(&self) -> Option<f64> {
        self.pending.first().map(|p| p.fire_at)
    }

    /// Remove the next tick and advance the clock to its fire time.
    pub fn pop(&mut self) -> Option<(f64, Tick)> {
        if self.pending.is_empty() {
            return None;
        }
        let next = self.pending.remove(0);
        if next.fire_at > self.now {
            self.now = next.fire_at;
        }
        Some((next.fire_at, next.tick))
    }

    /// Returns true if `tick` is waiting to fire.
    pub fn is_pending(&self, tick: Tick) -> bool {
        self.pending.iter().any(|p| p.tick == tick)
    }

    /// Returns true if nothing is waiting to fire.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of pending ticks.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Clear everything and rewind the clock to zero.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.now = 0.0;
    }
}

impl Timer for TimerQueue {
    fn now(&self) -> f64 {
        self.now
    }

    fn schedule(&mut self, delay_ms: f64, tick: Tick) {
        self.cancel(tick);
        let delay = if delay_ms > 0.0 { delay_ms } else { 0.0 };
        let fire_at = self.now + delay;
        // Insert after every entry due at or before `fire_at`
        let pos = self.pending.partition_point(|p| p.fire_at <= fire_at);
        self.pending.insert(pos, Pending { fire_at, tick });
    }

    fn cancel(&mut self, tick: Tick) {
        self.pending.retain(|p| p.tick != tick);
    }

    fn cancel_all(&mut self) {
        self.pending.clear();
    }
}
