//! Pattern file parser.
//!
//! Format: whitespace-separated tokens, one candidate pattern per line.
//! A note name (or `rest`) is followed by its length in beats:
//!
//! ```text
//! C2 1 rest 0.5 C2 0.5 C2 2
//! C2 1.5 C2 0.5 rest 2
//! ```

use std::fs;
use std::path::Path;

use mb_ir::{MusicalTime, Note, NoteSequence};
use rand::Rng;
use tracing::{debug, warn};

use crate::line_sample::pick_line;
use crate::note_names::{NoteName, NoteNames};
use crate::FormatError;

/// Load a pattern file and return one randomly chosen line as a sequence.
pub fn load_pattern<R: Rng + ?Sized>(
    path: impl AsRef<Path>,
    names: &NoteNames,
    rng: &mut R,
) -> Result<NoteSequence, FormatError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let seq = parse_pattern(&text, names, rng);
    debug!(file = %path.display(), notes = seq.len(), "loaded pattern");
    Ok(seq)
}

/// Pick one line of `text` at random and parse it.
///
/// Text with no lines yields an empty sequence.
pub fn parse_pattern<R: Rng + ?Sized>(text: &str, names: &NoteNames, rng: &mut R) -> NoteSequence {
    pick_line(text, rng)
        .map(|line| parse_pattern_line(line, names))
        .unwrap_or_default()
}

/// Parse a single pattern line.
///
/// Tokens that are neither names nor usable lengths are dropped, as are
/// lengths with no preceding name and names with no following length.
pub fn parse_pattern_line(line: &str, names: &NoteNames) -> NoteSequence {
    let mut seq = NoteSequence::new();
    let mut pending: Option<(NoteName, &str)> = None;

    for token in line.split_whitespace() {
        if let Some(name) = names.lookup(token) {
            if let Some((_, prev)) = pending.replace((name, token)) {
                warn!(token = prev, "note has no length, dropped");
            }
            continue;
        }

        let Some(length) = token.parse::<f32>().ok().and_then(MusicalTime::from_beats_f32) else {
            warn!(token, "unrecognised token, dropped");
            continue;
        };

        match pending.take() {
            Some((NoteName::Pitch(pitch), _)) => seq.push(Note::pitched(pitch, length)),
            Some((NoteName::Rest, _)) => seq.push(Note::rest(length)),
            None => warn!(token, "length has no note, dropped"),
        }
    }

    if let Some((_, prev)) = pending {
        warn!(token = prev, "note has no length, dropped");
    }

    seq
}
