//! Core data model for musicbox.
//!
//! Defines notes, note sequences, the section/phrase arrangement arena and
//! track identities. Pattern parsers and generators produce these types,
//! and the playback engine walks them.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod arrangement;
mod chord;
mod event;
mod musical_time;
mod note;
mod track;

pub use arrangement::{Arrangement, Phrase, PhraseKey, Section, SectionKey};
pub use chord::{Chord, ChordTable, CHORDS_PER_PROGRESSION, VOICES_PER_CHORD};
pub use event::NoteEvent;
pub use musical_time::{MusicalTime, BEATS_PER_MEASURE, MAX_LENGTH_BEATS, MEASURE, SUB_BEAT_UNIT};
pub use note::{Note, NoteSequence};
pub use track::{TrackId, TrackMap, UnknownTrack};
