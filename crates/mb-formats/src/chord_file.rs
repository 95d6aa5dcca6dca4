//! Chord progression file parser.
//!
//! Format: one progression per line, four comma-separated chords, each
//! chord four space-separated MIDI pitches:
//!
//! ```text
//! 45 48 52 57, 41 45 48 53, 48 52 55 60, 43 47 50 55
//! ```

use std::fs;
use std::path::Path;

use mb_ir::{ChordTable, CHORDS_PER_PROGRESSION, VOICES_PER_CHORD};
use rand::Rng;
use tracing::{debug, warn};

use crate::line_sample::pick_line;
use crate::FormatError;

/// Load a chord file and return one randomly chosen progression.
pub fn load_chords<R: Rng + ?Sized>(
    path: impl AsRef<Path>,
    rng: &mut R,
) -> Result<ChordTable, FormatError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_chords(&text, rng).ok_or_else(|| FormatError::Empty {
        path: path.to_path_buf(),
    })?;
    debug!(file = %path.display(), ?table, "loaded chords");
    Ok(table)
}

/// Pick one line of `text` at random and parse it as a progression.
pub fn parse_chords<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Option<ChordTable> {
    pick_line(text, rng).map(parse_chord_line)
}

/// Parse a single progression line.
///
/// Missing or unparseable pitches stay 0; extra chords and pitches are
/// ignored. Both cases are reported.
pub fn parse_chord_line(line: &str) -> ChordTable {
    let mut table = ChordTable::default();

    for (i, field) in line.split(',').enumerate() {
        if i >= CHORDS_PER_PROGRESSION {
            warn!(field, "extra chord ignored");
            continue;
        }
        for (j, token) in field.split_whitespace().enumerate() {
            if j >= VOICES_PER_CHORD {
                warn!(token, chord = i, "extra pitch ignored");
                continue;
            }
            match token.parse::<u8>() {
                Ok(pitch) => table.chords[i][j] = pitch,
                Err(_) => warn!(token, chord = i, "bad pitch, left at 0"),
            }
        }
    }

    table
}
