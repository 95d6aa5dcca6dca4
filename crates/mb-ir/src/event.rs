//! Events emitted by playback.

use crate::track::TrackId;

/// One note emitted by a track's note tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteEvent {
    /// Playback clock time when the note starts (ms)
    pub at_ms: f64,
    /// Track that emitted the note
    pub track: TrackId,
    /// MIDI pitch, or `None` for a rest
    pub pitch: Option<u8>,
    /// How long the note lasts (ms)
    pub duration_ms: f64,
}

impl NoteEvent {
    pub const fn is_rest(&self) -> bool {
        self.pitch.is_none()
    }
}
