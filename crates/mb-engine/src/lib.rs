//! Generation and playback engine for musicbox.
//!
//! Walks an `Arrangement` on a tick timer, emitting `NoteEvent`s, and
//! generates backbeat-following parts for the pitched tracks.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod generator;
mod player;
mod registry;
pub mod scheduler;
mod timer;

pub use generator::{generate, Harmony, MELODY_SCALE};
pub use player::{tempo_to_beat_ms, EventSink, PlaybackSettings, Player, TrackCursor};
pub use registry::TrackRegistry;
pub use scheduler::{advance_phrase, advance_section, reload_hold};
pub use timer::{Tick, Timer, TimerQueue};
