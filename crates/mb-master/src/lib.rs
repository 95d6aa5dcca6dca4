//! Headless controller for musicbox.
//!
//! Owns the arrangement config and manages playback: `start` rebuilds the
//! whole arrangement from its files and plays it on a realtime thread,
//! `render_events` plays it offline.

mod build;
pub mod config;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use mb_engine::{tempo_to_beat_ms, EventSink, PlaybackSettings, Player, TimerQueue};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use tracing::{info, warn};

// Re-export common types so callers don't need mb-ir/mb-engine directly.
pub use build::build_arrangement;
pub use config::ArrangementConfig;
pub use mb_formats::{FormatError, NoteNames};
pub use mb_ir::{Arrangement, NoteEvent, TrackId};

/// Events buffered between the playback thread and the caller.
const EVENT_CAPACITY: usize = 1024;

/// Longest single sleep on the playback thread, so stop stays responsive.
const MAX_SLEEP: Duration = Duration::from_millis(5);

/// Error type for the controller.
#[derive(Debug, thiserror::Error)]
pub enum MasterError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid arrangement config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("tempo must be at least 1 BPM")]
    InvalidTempo,
}

/// Headless controller: owns a config and manages playback.
pub struct Controller {
    config: ArrangementConfig,
    names: NoteNames,
    playback: Option<PlaybackHandle>,
}

struct PlaybackHandle {
    stop_signal: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    /// Beat length as `f64` bits, read by the playback thread every tick
    beat_ms: Arc<AtomicU64>,
    events: HeapCons<NoteEvent>,
    thread: Option<JoinHandle<()>>,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            config: ArrangementConfig::default(),
            names: NoteNames::standard(),
            playback: None,
        }
    }

    pub fn with_config(config: ArrangementConfig) -> Result<Self, MasterError> {
        if config.tempo == 0 {
            return Err(MasterError::InvalidTempo);
        }
        Ok(Self {
            config,
            names: NoteNames::standard(),
            playback: None,
        })
    }

    // --- Configuration ---

    pub fn config(&self) -> &ArrangementConfig {
        &self.config
    }

    /// Set the tempo. A running arrangement picks it up on its next tick.
    pub fn set_tempo(&mut self, bpm: u32) -> Result<(), MasterError> {
        if bpm == 0 {
            return Err(MasterError::InvalidTempo);
        }
        self.config.tempo = bpm;
        if let Some(pb) = &self.playback {
            pb.beat_ms.store(tempo_to_beat_ms(bpm).to_bits(), Ordering::Relaxed);
        }
        Ok(())
    }

    /// Set the seed used by the next `start` or render.
    pub fn set_seed(&mut self, seed: u64) {
        self.config.seed = seed;
    }

    pub fn set_runs(&mut self, runs: u32) {
        self.config.runs = runs;
    }

    pub fn set_patterns_dir(&mut self, dir: impl Into<PathBuf>) {
        self.config.patterns_dir = dir.into();
    }

    pub fn settings(&self) -> PlaybackSettings {
        PlaybackSettings::from_bpm(self.config.tempo, self.config.runs, self.config.measures_per_cycle)
    }

    /// Build a fresh arrangement from the config, seeded from scratch.
    pub fn build_arrangement(&self) -> Arrangement {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        build::build_arrangement(&self.config, &self.names, &mut rng)
    }

    // --- Real-time playback ---

    /// Rebuild the arrangement and play it from the top, replacing any
    /// running playback.
    pub fn start(&mut self) {
        self.stop();

        let player = Player::new(self.build_arrangement(), self.settings());
        let (producer, events) = HeapRb::<NoteEvent>::new(EVENT_CAPACITY).split();
        let stop_signal = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let beat_ms = Arc::new(AtomicU64::new(self.settings().beat_ms.to_bits()));

        let stop = stop_signal.clone();
        let done = finished.clone();
        let beat = beat_ms.clone();

        let thread = std::thread::spawn(move || {
            playback_thread(player, producer, stop, done, beat);
        });

        self.playback = Some(PlaybackHandle {
            stop_signal,
            finished,
            beat_ms,
            events,
            thread: Some(thread),
        });
    }

    pub fn stop(&mut self) {
        if let Some(mut pb) = self.playback.take() {
            pb.stop_signal.store(true, Ordering::Relaxed);
            if let Some(handle) = pb.thread.take() {
                let _ = handle.join();
            }
        }
    }

    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::Relaxed))
    }

    pub fn is_finished(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| p.finished.load(Ordering::Relaxed))
    }

    /// Take every event emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<NoteEvent> {
        let mut out = Vec::new();
        if let Some(pb) = self.playback.as_mut() {
            while let Some(event) = pb.events.try_pop() {
                out.push(event);
            }
        }
        out
    }

    // --- Offline rendering ---

    /// Build and play the arrangement on a virtual clock, returning every
    /// event in emission order.
    pub fn render_events(&self) -> Vec<NoteEvent> {
        let mut player = Player::new(self.build_arrangement(), self.settings());
        let mut timer = TimerQueue::new();
        let mut events = Vec::new();
        player.start(&mut timer);
        player.run(&mut timer, &mut events, None);
        events
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Pushes events into the ring, dropping them when the caller falls behind.
struct RingSink {
    producer: HeapProd<NoteEvent>,
    dropped: usize,
}

impl EventSink for RingSink {
    fn emit(&mut self, event: NoteEvent) {
        if self.producer.try_push(event).is_err() {
            self.dropped += 1;
        }
    }
}

fn playback_thread(
    mut player: Player,
    producer: HeapProd<NoteEvent>,
    stop_signal: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    beat_ms: Arc<AtomicU64>,
) {
    let mut timer = TimerQueue::new();
    let mut sink = RingSink { producer, dropped: 0 };
    let started = Instant::now();
    player.start(&mut timer);

    while player.is_playing() && !stop_signal.load(Ordering::Relaxed) {
        let Some(fire_at) = timer.peek_time() else {
            break;
        };
        let due = started + Duration::from_secs_f64(fire_at / 1000.0);
        let now = Instant::now();
        if due > now {
            std::thread::sleep((due - now).min(MAX_SLEEP));
            continue;
        }

        player.set_beat_ms(f64::from_bits(beat_ms.load(Ordering::Relaxed)));
        if let Some((_, tick)) = timer.pop() {
            player.handle(tick, &mut timer, &mut sink);
        }
    }

    player.stop(&mut timer);
    if sink.dropped > 0 {
        warn!(dropped = sink.dropped, "event buffer overflowed");
    }
    info!("playback thread done");
    finished.store(true, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tempo_rejected() {
        let mut ctrl = Controller::new();
        assert!(matches!(ctrl.set_tempo(0), Err(MasterError::InvalidTempo)));
        assert_eq!(ctrl.config().tempo, 120);

        ctrl.set_tempo(90).unwrap();
        assert_eq!(ctrl.settings().beat_ms, 60_000.0 / 90.0);
    }

    #[test]
    fn zero_tempo_config_rejected() {
        let config = ArrangementConfig { tempo: 0, ..ArrangementConfig::default() };
        assert!(matches!(Controller::with_config(config), Err(MasterError::InvalidTempo)));
    }

    #[test]
    fn idle_controller() {
        let mut ctrl = Controller::new();
        assert!(!ctrl.is_playing());
        assert!(!ctrl.is_finished());
        assert!(ctrl.drain_events().is_empty());
        ctrl.stop();
    }

    #[test]
    fn zero_runs_render_nothing() {
        let mut ctrl = Controller::new();
        ctrl.set_patterns_dir("/nonexistent");
        ctrl.set_runs(0);
        assert!(ctrl.render_events().is_empty());
    }
}
