//! Text format parsers for musicbox.
//!
//! Pattern files hold one candidate pattern per line; chord files hold one
//! four-chord progression per line. Each load picks one line at random, so
//! a file is a pool of alternatives rather than a single pattern.

mod chord_file;
mod line_sample;
mod note_names;
mod pattern_file;

pub use chord_file::{load_chords, parse_chord_line, parse_chords};
pub use line_sample::{pick_line, sample_line_index};
pub use note_names::{NoteName, NoteNames};
pub use pattern_file::{load_pattern, parse_pattern, parse_pattern_line};

use std::path::PathBuf;

/// Error type for pattern and chord file loading.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The file could not be opened or read
    #[error("could not open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file has no lines to choose from
    #[error("{path} has no lines")]
    Empty { path: PathBuf },
}
