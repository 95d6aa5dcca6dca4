//! Arrangement construction from a config.
//!
//! Tracks are built in config order, so a generated phrase can only follow
//! a track planned before it. Nothing here fails: unreadable files and bad
//! plans are logged and leave an empty phrase behind.

use mb_engine::{generate, Harmony};
use mb_formats::{load_chords, load_pattern, NoteNames};
use mb_ir::{Arrangement, ChordTable, NoteSequence, TrackId};
use rand::Rng;
use tracing::{debug, warn};

use crate::config::{ArrangementConfig, GenerateMode, PhraseSource};

/// Build every planned track into a fresh arrangement.
pub fn build_arrangement<R: Rng + ?Sized>(
    config: &ArrangementConfig,
    names: &NoteNames,
    rng: &mut R,
) -> Arrangement {
    let chords = if needs_chords(config) {
        load_progression(config, rng)
    } else {
        ChordTable::default()
    };

    let mut arrangement = Arrangement::new();
    for plan in &config.tracks {
        for (index, section_plan) in plan.sections.iter().enumerate() {
            let section_label = section_plan
                .label
                .clone()
                .unwrap_or_else(|| format!("{} {}", plan.track, index + 1));
            let section = arrangement.add_section(plan.track, &section_label, section_plan.repeats);

            for (n, phrase_plan) in section_plan.phrases.iter().enumerate() {
                let (label, notes) = match phrase_plan.source() {
                    Some(PhraseSource::Pattern(file)) => {
                        let notes = load_or_empty(config, &file, names, rng);
                        (file, notes)
                    }
                    Some(PhraseSource::Generate { mode, follow, chord, voice }) => {
                        let reference = follow
                            .map(|track| reference_notes(&arrangement, track, index))
                            .unwrap_or_default();
                        let harmony = match mode {
                            GenerateMode::Melody => Harmony::Melody { scale: &config.scale },
                            GenerateMode::Bass => Harmony::Bass { chord: chords.chord(chord) },
                            GenerateMode::Piano => Harmony::Piano {
                                chord: chords.chord(chord),
                                voice,
                            },
                        };
                        let notes = generate(&reference, &harmony, rng);
                        (format!("{} {}", mode.name(), n + 1), notes)
                    }
                    None => {
                        warn!(
                            track = %plan.track,
                            section = %section_label,
                            "phrase has neither a pattern nor a generator"
                        );
                        (String::from("empty"), NoteSequence::new())
                    }
                };

                debug!(track = %plan.track, phrase = %label, notes = notes.len(), "built phrase");
                arrangement.add_phrase(section, &label, notes, phrase_plan.repeats);
            }
        }
    }

    arrangement
}

fn needs_chords(config: &ArrangementConfig) -> bool {
    config
        .tracks
        .iter()
        .flat_map(|plan| &plan.sections)
        .flat_map(|section| &section.phrases)
        .any(|phrase| {
            matches!(
                phrase.source(),
                Some(PhraseSource::Generate {
                    mode: GenerateMode::Bass | GenerateMode::Piano,
                    ..
                })
            )
        })
}

fn load_progression<R: Rng + ?Sized>(config: &ArrangementConfig, rng: &mut R) -> ChordTable {
    match load_chords(&config.pattern_path(&config.chords), rng) {
        Ok(table) => table,
        Err(e) => {
            warn!(error = %e, "no chord progression; bass and piano fall back to pitch 0");
            ChordTable::default()
        }
    }
}

fn load_or_empty<R: Rng + ?Sized>(
    config: &ArrangementConfig,
    file: &str,
    names: &NoteNames,
    rng: &mut R,
) -> NoteSequence {
    match load_pattern(&config.pattern_path(file), names, rng) {
        Ok(notes) => notes,
        Err(e) => {
            warn!(error = %e, "pattern left empty");
            NoteSequence::new()
        }
    }
}

/// Notes of the first phrase of `track`'s section at `index`, or of its
/// first section when it has fewer sections.
fn reference_notes(arrangement: &Arrangement, track: TrackId, index: usize) -> NoteSequence {
    let sections = arrangement.sections_of(track);
    let notes = sections
        .get(index)
        .or_else(|| sections.first())
        .and_then(|&section| arrangement.phrases_of(section).first().copied())
        .and_then(|phrase| arrangement.phrase(phrase))
        .map(|phrase| phrase.notes.clone());

    notes.unwrap_or_else(|| {
        warn!(%track, "nothing to follow; generating against the measure only");
        NoteSequence::new()
    })
}
