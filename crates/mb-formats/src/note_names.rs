//! Note name → MIDI pitch lookup.

use std::collections::HashMap;

const SHARP_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
const FLAT_NAMES: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];

/// Lowest pitch in the built-in table (A0).
pub const LOWEST_PITCH: u8 = 21;
/// Highest pitch in the built-in table (C8).
pub const HIGHEST_PITCH: u8 = 108;

/// What a name in a pattern file resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteName {
    Pitch(u8),
    Rest,
}

/// Name table used by the pattern parser. Names are case-sensitive.
#[derive(Clone, Debug)]
pub struct NoteNames {
    table: HashMap<String, NoteName>,
}

impl NoteNames {
    /// Piano-range names (`A0`..`C8`, sharps and flats, `C4` = 60) plus `rest`.
    pub fn standard() -> Self {
        let mut table = HashMap::new();
        for pitch in LOWEST_PITCH..=HIGHEST_PITCH {
            let octave = pitch as i32 / 12 - 1;
            let semitone = (pitch % 12) as usize;
            table.insert(format!("{}{}", SHARP_NAMES[semitone], octave), NoteName::Pitch(pitch));
            table.insert(format!("{}{}", FLAT_NAMES[semitone], octave), NoteName::Pitch(pitch));
        }
        table.insert("rest".to_string(), NoteName::Rest);
        Self { table }
    }

    /// Add or replace a name, e.g. a drum alias.
    pub fn insert(&mut self, name: &str, value: NoteName) {
        self.table.insert(name.to_string(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<NoteName> {
        self.table.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for NoteNames {
    fn default() -> Self {
        Self::standard()
    }
}
