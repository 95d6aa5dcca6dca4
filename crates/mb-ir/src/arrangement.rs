//! Section → Phrase → Note structure for one playback session.
//!
//! Phrases and sections live in slot-map arenas and link to each other by
//! key. Each track owns one section chain; each section owns one phrase
//! chain. The structure is built once per session and afterwards only the
//! repeat budgets change.

use alloc::vec::Vec;
use arrayvec::ArrayString;
use slotmap::SlotMap;

use crate::note::NoteSequence;
use crate::track::{TrackId, TrackMap};

slotmap::new_key_type! {
    /// Key for a phrase in an `Arrangement`.
    pub struct PhraseKey;
    /// Key for a section in an `Arrangement`.
    pub struct SectionKey;
}

/// One measure of notes plus how many more times it should play.
#[derive(Clone, Debug)]
pub struct Phrase {
    /// Diagnostic label (pattern file name or generator mode)
    pub label: ArrayString<32>,
    pub notes: NoteSequence,
    /// Remaining plays. Only ever compared against `< 1`, so it may go
    /// negative on the last phrase of a chain.
    pub repeat_budget: i32,
    pub next: Option<PhraseKey>,
}

/// A chain of phrases repeated as a unit.
#[derive(Clone, Debug)]
pub struct Section {
    pub label: ArrayString<32>,
    /// First phrase of the chain (`None` for an empty section)
    pub head: Option<PhraseKey>,
    pub repeat_budget: i32,
    pub next: Option<SectionKey>,
}

/// The full built structure for one playback session.
#[derive(Clone, Debug, Default)]
pub struct Arrangement {
    phrases: SlotMap<PhraseKey, Phrase>,
    sections: SlotMap<SectionKey, Section>,
    heads: TrackMap<Option<SectionKey>>,
}

impl Arrangement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new empty section to `track`'s chain.
    pub fn add_section(&mut self, track: TrackId, label: &str, repeats: i32) -> SectionKey {
        let key = self.sections.insert(Section {
            label: make_label(label),
            head: None,
            repeat_budget: repeats,
            next: None,
        });

        match self.sections_of(track).last().copied() {
            Some(tail) => self.sections[tail].next = Some(key),
            None => self.heads.set(track, Some(key)),
        }
        key
    }

    /// Append a phrase to the end of `section`'s chain.
    ///
    /// # Panics
    /// Panics if `section` does not belong to this arrangement.
    pub fn add_phrase(
        &mut self,
        section: SectionKey,
        label: &str,
        notes: NoteSequence,
        repeats: i32,
    ) -> PhraseKey {
        let key = self.phrases.insert(Phrase {
            label: make_label(label),
            notes,
            repeat_budget: repeats,
            next: None,
        });

        match self.phrases_of(section).last().copied() {
            Some(tail) => self.phrases[tail].next = Some(key),
            None => self.sections[section].head = Some(key),
        }
        key
    }

    /// First section of a track, if the track has any.
    pub fn track_head(&self, track: TrackId) -> Option<SectionKey> {
        *self.heads.get(track)
    }

    pub fn phrase(&self, key: PhraseKey) -> Option<&Phrase> {
        self.phrases.get(key)
    }

    pub fn phrase_mut(&mut self, key: PhraseKey) -> Option<&mut Phrase> {
        self.phrases.get_mut(key)
    }

    pub fn section(&self, key: SectionKey) -> Option<&Section> {
        self.sections.get(key)
    }

    pub fn section_mut(&mut self, key: SectionKey) -> Option<&mut Section> {
        self.sections.get_mut(key)
    }

    /// Keys of `track`'s sections in chain order.
    pub fn sections_of(&self, track: TrackId) -> Vec<SectionKey> {
        let mut keys = Vec::new();
        let mut cur = self.track_head(track);
        while let Some(key) = cur {
            keys.push(key);
            cur = self.sections.get(key).and_then(|s| s.next);
        }
        keys
    }

    /// Keys of `section`'s phrases in chain order.
    pub fn phrases_of(&self, section: SectionKey) -> Vec<PhraseKey> {
        let mut keys = Vec::new();
        let mut cur = self.sections.get(section).and_then(|s| s.head);
        while let Some(key) = cur {
            keys.push(key);
            cur = self.phrases.get(key).and_then(|p| p.next);
        }
        keys
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

/// Truncate a label to fit, respecting char boundaries.
fn make_label(label: &str) -> ArrayString<32> {
    let mut out = ArrayString::new();
    for c in label.chars() {
        if out.try_push(c).is_err() {
            break;
        }
    }
    out
}
