//! Notes and note sequences.

use alloc::vec::Vec;

use crate::musical_time::MusicalTime;

/// A single event in a note sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Note {
    /// Sound a MIDI pitch for `length`
    Pitched { pitch: u8, length: MusicalTime },
    /// Silence for `length`
    Rest { length: MusicalTime },
    /// End of sequence
    End,
}

impl Note {
    pub const fn pitched(pitch: u8, length: MusicalTime) -> Self {
        Note::Pitched { pitch, length }
    }

    pub const fn rest(length: MusicalTime) -> Self {
        Note::Rest { length }
    }

    /// Length of the note (zero for `End`).
    pub const fn length(self) -> MusicalTime {
        match self {
            Note::Pitched { length, .. } | Note::Rest { length } => length,
            Note::End => MusicalTime::zero(),
        }
    }

    /// MIDI pitch, if this note sounds.
    pub const fn pitch(self) -> Option<u8> {
        match self {
            Note::Pitched { pitch, .. } => Some(pitch),
            _ => None,
        }
    }

    pub const fn is_end(self) -> bool {
        matches!(self, Note::End)
    }
}

/// An ordered, finite run of notes. Insertion order is playback order.
///
/// The `End` sentinel is implicit: reading past the last note yields
/// `Note::End`, and pushing `End` is a no-op.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteSequence {
    notes: Vec<Note>,
}

impl NoteSequence {
    pub fn new() -> Self {
        Self { notes: Vec::new() }
    }

    pub fn from_notes(notes: impl IntoIterator<Item = Note>) -> Self {
        let mut seq = Self::new();
        for note in notes {
            seq.push(note);
        }
        seq
    }

    pub fn push(&mut self, note: Note) {
        if !note.is_end() {
            self.notes.push(note);
        }
    }

    /// Note at `index`, or `Note::End` past the last note.
    pub fn get(&self, index: usize) -> Note {
        self.notes.get(index).copied().unwrap_or(Note::End)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> + '_ {
        self.notes.iter()
    }

    /// Sum of all note lengths.
    pub fn total_length(&self) -> MusicalTime {
        self.notes
            .iter()
            .fold(MusicalTime::zero(), |acc, n| acc + n.length())
    }

    /// Start position of every pitched note, in order.
    ///
    /// Rests advance the position but never produce an onset.
    pub fn onsets(&self) -> Vec<MusicalTime> {
        let mut onsets = Vec::new();
        let mut pos = MusicalTime::zero();
        for note in &self.notes {
            if note.pitch().is_some() {
                onsets.push(pos);
            }
            pos += note.length();
        }
        onsets
    }
}
