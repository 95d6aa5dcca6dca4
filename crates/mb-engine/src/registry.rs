//! Per-track repetition hold registers.

use mb_ir::{TrackId, TrackMap};

/// Hold registers for every track.
///
/// A hold register remembers the largest phrase repeat budget seen since it
/// was last cleared, so a phrase's budget can be restored after its section
/// has cycled. Only the phrase-advance and hold-reload operations touch it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackRegistry {
    holds: TrackMap<i32>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold(&self, track: TrackId) -> i32 {
        *self.holds.get(track)
    }

    pub fn set_hold(&mut self, track: TrackId, value: i32) {
        self.holds.set(track, value);
    }

    /// Raise the register to `value` if it is larger.
    pub fn raise(&mut self, track: TrackId, value: i32) {
        let hold = self.holds.get_mut(track);
        if value > *hold {
            *hold = value;
        }
    }

    /// Zero every register (start of a new arrangement).
    pub fn reset(&mut self) {
        self.holds = TrackMap::default();
    }
}
