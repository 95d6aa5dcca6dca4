//! Arrangement playback.
//!
//! The player walks every track through its section → phrase → note chains
//! on three nested timescales, each driven by a `Tick` delivered by a
//! `Timer`:
//!
//! - `Arrangement`: once per cycle, advance every track's section and park
//!   its phrase cursor at the section head.
//! - `Measure`: once per measure, advance every track's phrase and start its
//!   note chain. The last measure of a cycle reloads the hold registers and
//!   queues the next `Arrangement` tick.
//! - `Note(track)`: emit the track's current note and schedule the next one.
//!
//! Handlers run to completion and never block.

use alloc::vec::Vec;
use mb_ir::{
    Arrangement, NoteEvent, PhraseKey, SectionKey, TrackId, TrackMap, BEATS_PER_MEASURE,
};
use tracing::{debug, info, trace};

use crate::registry::TrackRegistry;
use crate::scheduler::{advance_phrase, advance_section, reload_hold};
use crate::timer::{Tick, Timer, TimerQueue};

/// Receiver for emitted notes.
pub trait EventSink {
    fn emit(&mut self, event: NoteEvent);
}

impl EventSink for Vec<NoteEvent> {
    fn emit(&mut self, event: NoteEvent) {
        self.push(event);
    }
}

/// Milliseconds per beat at `bpm` beats per minute.
pub fn tempo_to_beat_ms(bpm: u32) -> f64 {
    60_000.0 / bpm as f64
}

/// Timing and length of a playback session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackSettings {
    /// Beat length (ms)
    pub beat_ms: f64,
    /// Arrangement cycles to play before halting
    pub runs: u32,
    /// Measures per arrangement cycle (at least 1)
    pub measures_per_cycle: u32,
}

impl PlaybackSettings {
    pub fn new(beat_ms: f64, runs: u32, measures_per_cycle: u32) -> Self {
        Self {
            beat_ms,
            runs,
            measures_per_cycle: measures_per_cycle.max(1),
        }
    }

    pub fn from_bpm(bpm: u32, runs: u32, measures_per_cycle: u32) -> Self {
        Self::new(tempo_to_beat_ms(bpm), runs, measures_per_cycle)
    }

    pub fn measure_ms(&self) -> f64 {
        self.beat_ms * BEATS_PER_MEASURE as f64
    }

    pub fn cycle_ms(&self) -> f64 {
        self.measure_ms() * self.measures_per_cycle as f64
    }

    /// Length of the whole session (ms).
    pub fn total_ms(&self) -> f64 {
        self.cycle_ms() * self.runs as f64
    }
}

/// Where a track currently is in its chains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackCursor {
    pub section: SectionKey,
    /// `None` while the section has no phrases
    pub phrase: Option<PhraseKey>,
    /// Index of the next note to emit
    pub note: usize,
}

/// Plays one arrangement.
pub struct Player {
    arrangement: Arrangement,
    registry: TrackRegistry,
    cursors: TrackMap<Option<TrackCursor>>,
    settings: PlaybackSettings,
    runs_remaining: u32,
    measure_in_cycle: u32,
    playing: bool,
}

impl Player {
    pub fn new(arrangement: Arrangement, settings: PlaybackSettings) -> Self {
        Self {
            arrangement,
            registry: TrackRegistry::new(),
            cursors: TrackMap::default(),
            settings,
            runs_remaining: 0,
            measure_in_cycle: 0,
            playing: false,
        }
    }

    pub fn arrangement(&self) -> &Arrangement {
        &self.arrangement
    }

    pub fn registry(&self) -> &TrackRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    pub fn cursor(&self, track: TrackId) -> Option<TrackCursor> {
        *self.cursors.get(track)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn runs_remaining(&self) -> u32 {
        self.runs_remaining
    }

    /// Change the beat length. Ticks already scheduled keep their times;
    /// every delay computed afterwards uses the new length. A cycle always
    /// plays all of its measures, so the following Arrangement tick moves
    /// with the tempo.
    pub fn set_beat_ms(&mut self, beat_ms: f64) {
        self.settings.beat_ms = beat_ms;
    }

    /// Start playback from the top.
    ///
    /// Every pending tick is dropped first, so nothing scheduled by an
    /// earlier session can touch the fresh state.
    pub fn start<T: Timer + ?Sized>(&mut self, timer: &mut T) {
        timer.cancel_all();
        self.registry.reset();
        for track in TrackId::ALL {
            let cursor = self.arrangement.track_head(track).map(|section| TrackCursor {
                section,
                phrase: None,
                note: 0,
            });
            self.cursors.set(track, cursor);
        }
        self.runs_remaining = self.settings.runs;
        self.measure_in_cycle = 0;
        self.playing = true;

        info!(
            runs = self.settings.runs,
            measures = self.settings.measures_per_cycle,
            beat_ms = self.settings.beat_ms,
            "playback started"
        );
        timer.schedule(0.0, Tick::Arrangement);
    }

    /// Stop playback and drop every pending tick.
    pub fn stop<T: Timer + ?Sized>(&mut self, timer: &mut T) {
        timer.cancel_all();
        if self.playing {
            info!("playback stopped");
        }
        self.playing = false;
    }

    /// Dispatch a fired tick.
    pub fn handle<T, S>(&mut self, tick: Tick, timer: &mut T, sink: &mut S)
    where
        T: Timer + ?Sized,
        S: EventSink + ?Sized,
    {
        if !self.playing {
            return;
        }
        match tick {
            Tick::Arrangement => self.arrangement_tick(timer),
            Tick::Measure => self.measure_tick(timer),
            Tick::Note(track) => self.note_tick(track, timer, sink),
        }
    }

    /// Drain `timer` offline until playback halts or the clock would pass
    /// `limit_ms`. Returns the number of ticks handled.
    pub fn run<S: EventSink + ?Sized>(
        &mut self,
        timer: &mut TimerQueue,
        sink: &mut S,
        limit_ms: Option<f64>,
    ) -> usize {
        let mut handled = 0;
        while let Some(at) = timer.peek_time() {
            if limit_ms.is_some_and(|limit| at > limit) {
                break;
            }
            let Some((_, tick)) = timer.pop() else { break };
            self.handle(tick, timer, sink);
            handled += 1;
        }
        handled
    }

    fn arrangement_tick<T: Timer + ?Sized>(&mut self, timer: &mut T) {
        if self.runs_remaining == 0 {
            self.playing = false;
            info!("arrangement finished");
            return;
        }
        info!(run = self.settings.runs - self.runs_remaining + 1, "arrangement cycle");
        self.runs_remaining -= 1;

        for track in TrackId::ALL {
            let Some(cursor) = *self.cursors.get(track) else {
                continue;
            };
            let section = advance_section(&mut self.arrangement, cursor.section);
            let head = self.arrangement.section(section).and_then(|s| s.head);
            self.cursors.set(track, Some(TrackCursor { section, phrase: head, note: 0 }));
        }

        self.measure_in_cycle = 0;
        timer.schedule(0.0, Tick::Measure);
    }

    fn measure_tick<T: Timer + ?Sized>(&mut self, timer: &mut T) {
        self.measure_in_cycle += 1;
        let last = self.measure_in_cycle >= self.settings.measures_per_cycle;
        debug!(measure = self.measure_in_cycle, last, "measure");

        for track in TrackId::ALL {
            let Some(mut cursor) = *self.cursors.get(track) else {
                continue;
            };
            let Some(current) = cursor.phrase else {
                trace!(%track, "section has no phrases");
                continue;
            };

            let phrase = advance_phrase(&mut self.arrangement, current, track, &mut self.registry);
            if last {
                reload_hold(&mut self.arrangement, phrase, track, &self.registry);
            }
            cursor.phrase = Some(phrase);
            cursor.note = 0;
            self.cursors.set(track, Some(cursor));
            timer.schedule(0.0, Tick::Note(track));
        }

        // The next cycle starts one measure after the last one, at whatever
        // tempo is current then.
        let next = if last { Tick::Arrangement } else { Tick::Measure };
        timer.schedule(self.settings.measure_ms(), next);
    }

    fn note_tick<T, S>(&mut self, track: TrackId, timer: &mut T, sink: &mut S)
    where
        T: Timer + ?Sized,
        S: EventSink + ?Sized,
    {
        let Some(cursor) = self.cursors.get_mut(track).as_mut() else {
            return;
        };
        let Some(phrase) = cursor.phrase.and_then(|key| self.arrangement.phrase(key)) else {
            return;
        };

        let note = phrase.notes.get(cursor.note);
        if note.is_end() {
            trace!(%track, phrase = %phrase.label, "phrase has no notes");
            return;
        }

        let duration_ms = note.length().to_millis(self.settings.beat_ms);
        trace!(%track, pitch = ?note.pitch(), duration_ms, "note");
        sink.emit(NoteEvent {
            at_ms: timer.now(),
            track,
            pitch: note.pitch(),
            duration_ms,
        });

        if !phrase.notes.get(cursor.note + 1).is_end() {
            timer.schedule(duration_ms, Tick::Note(track));
            cursor.note += 1;
        }
    }
}
