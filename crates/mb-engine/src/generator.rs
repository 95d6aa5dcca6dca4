//! Backbeat-following note generation.
//!
//! A generated part spans exactly one measure. Its rhythm follows a
//! reference sequence (usually a drum part): every pitched note of the
//! reference marks an onset, and no generated note is allowed to sound
//! across one. Notes that start on an onset get the "on the beat" pitch
//! treatment for their mode.

use alloc::vec::Vec;
use mb_ir::{Chord, MusicalTime, Note, NoteSequence, MEASURE, VOICES_PER_CHORD};
use rand::Rng;

/// Default melody scale (A natural minor from A3).
pub const MELODY_SCALE: [u8; 7] = [57, 59, 60, 62, 64, 65, 67];

/// Longest random draw, in quarter beats (4 beats).
const MAX_QUARTERS: u64 = 16;

/// Harmonic material and pitch rules for one generated part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Harmony<'a> {
    /// Random scale degree; an octave up when on the beat
    Melody { scale: &'a [u8] },
    /// Chord root on the beat, a random upper chord tone off it
    Bass { chord: Chord },
    /// One fixed chord voice (1-based) held for the rest of the measure
    Piano { chord: Chord, voice: usize },
}

/// Generate one measure that follows `reference`'s onsets.
///
/// Each step draws a length of 1..=16 quarter beats, then a scale degree
/// (melody and bass only), and truncates the length so the note ends at
/// the next onset or the measure end. A reference with no pitched notes
/// constrains nothing but the measure end.
pub fn generate<R: Rng + ?Sized>(
    reference: &NoteSequence,
    harmony: &Harmony<'_>,
    rng: &mut R,
) -> NoteSequence {
    let onsets = reference.onsets();
    let mut seq = NoteSequence::new();
    let mut pos = MusicalTime::zero();

    while pos < MEASURE {
        let on_beat = is_on_backbeat(pos, &onsets);

        let drawn = match harmony {
            Harmony::Piano { .. } => MEASURE - pos,
            _ => MusicalTime::from_quarters(rng.gen_range(1..=MAX_QUARTERS)),
        };
        let pitch = pick_pitch(harmony, on_beat, rng);
        let length = clamp_to_backbeat(pos, drawn, &onsets);

        seq.push(match pitch {
            Some(pitch) => Note::pitched(pitch, length),
            None => Note::rest(length),
        });
        pos += length;
    }

    seq
}

/// Returns true if `pos` is exactly one of `onsets`.
pub fn is_on_backbeat(pos: MusicalTime, onsets: &[MusicalTime]) -> bool {
    onsets.contains(&pos)
}

/// Truncate `length` so a note starting at `pos` ends no later than the
/// first onset after `pos`, or the measure end if there is none.
pub fn clamp_to_backbeat(pos: MusicalTime, length: MusicalTime, onsets: &[MusicalTime]) -> MusicalTime {
    let boundary = onsets
        .iter()
        .copied()
        .find(|&o| o > pos && o < MEASURE)
        .unwrap_or(MEASURE);

    if pos + length > boundary {
        boundary - pos
    } else {
        length
    }
}

fn pick_pitch<R: Rng + ?Sized>(harmony: &Harmony<'_>, on_beat: bool, rng: &mut R) -> Option<u8> {
    match *harmony {
        Harmony::Melody { scale } => {
            if scale.is_empty() {
                return None;
            }
            let degree = scale[rng.gen_range(0..scale.len())];
            Some(if on_beat { degree.saturating_add(12) } else { degree })
        }
        Harmony::Bass { chord } => {
            let upper = chord[rng.gen_range(1..VOICES_PER_CHORD)];
            Some(if on_beat { chord[0] } else { upper })
        }
        Harmony::Piano { chord, voice } => Some(chord[voice.clamp(1, VOICES_PER_CHORD) - 1]),
    }
}

/// Start and end of every note in `seq`.
pub fn note_spans(seq: &NoteSequence) -> Vec<(MusicalTime, MusicalTime)> {
    let mut spans = Vec::with_capacity(seq.len());
    let mut pos = MusicalTime::zero();
    for note in seq.iter() {
        let end = pos + note.length();
        spans.push((pos, end));
        pos = end;
    }
    spans
}
