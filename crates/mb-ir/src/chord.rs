//! Chord progressions.

/// Chords per progression.
pub const CHORDS_PER_PROGRESSION: usize = 4;

/// Pitches per chord.
pub const VOICES_PER_CHORD: usize = 4;

/// One chord: four MIDI pitches, root first.
pub type Chord = [u8; VOICES_PER_CHORD];

/// A four-chord progression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChordTable {
    pub chords: [Chord; CHORDS_PER_PROGRESSION],
}

impl ChordTable {
    pub const fn new(chords: [Chord; CHORDS_PER_PROGRESSION]) -> Self {
        Self { chords }
    }

    /// Chord `index`, wrapping around the progression.
    pub fn chord(&self, index: usize) -> Chord {
        self.chords[index % CHORDS_PER_PROGRESSION]
    }

    /// Pitch of 1-based `voice` in chord `index`. Voices outside 1..=4 are
    /// clamped into range.
    pub fn voice(&self, index: usize, voice: usize) -> u8 {
        let v = voice.clamp(1, VOICES_PER_CHORD) - 1;
        self.chord(index)[v]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ChordTable {
        ChordTable::new([
            [45, 48, 52, 57],
            [41, 45, 48, 53],
            [48, 52, 55, 60],
            [43, 47, 50, 55],
        ])
    }

    #[test]
    fn chord_wraps() {
        assert_eq!(table().chord(4), table().chord(0));
    }

    #[test]
    fn voice_is_one_based() {
        assert_eq!(table().voice(2, 1), 48);
        assert_eq!(table().voice(2, 4), 60);
    }

    #[test]
    fn voice_out_of_range_clamps() {
        assert_eq!(table().voice(0, 0), 45);
        assert_eq!(table().voice(0, 9), 57);
    }
}
