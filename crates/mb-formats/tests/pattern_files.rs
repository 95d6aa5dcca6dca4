//! Integration tests for the pattern and chord parsers against the
//! shipped pattern library.

use mb_formats::{load_chords, load_pattern, parse_pattern_line, FormatError, NoteNames};
use mb_ir::{Note, NoteSequence, MEASURE};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

const PATTERN_FILES: [&str; 5] = ["kick.txt", "snare.txt", "ghost.txt", "hat.txt", "hat2.txt"];

fn patterns_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../patterns")
}

fn read_fixture(name: &str) -> String {
    let path = patterns_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

#[test]
fn every_pattern_line_fills_one_measure() {
    let names = NoteNames::standard();
    for file in PATTERN_FILES {
        for (i, line) in read_fixture(file).lines().enumerate() {
            let seq = parse_pattern_line(line, &names);
            assert!(!seq.is_empty(), "{} line {} parsed empty", file, i + 1);
            assert_eq!(seq.total_length(), MEASURE, "{} line {} length", file, i + 1);
        }
    }
}

#[test]
fn every_pattern_token_is_used() {
    let names = NoteNames::standard();
    for file in PATTERN_FILES {
        for (i, line) in read_fixture(file).lines().enumerate() {
            let tokens = line.split_whitespace().count();
            let seq = parse_pattern_line(line, &names);
            assert_eq!(seq.len() * 2, tokens, "{} line {} dropped tokens", file, i + 1);
        }
    }
}

#[test]
fn load_pattern_picks_a_line_from_the_file() {
    let names = NoteNames::standard();
    let text = read_fixture("kick.txt");
    let variants: Vec<NoteSequence> = text.lines().map(|l| parse_pattern_line(l, &names)).collect();

    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..20 {
        let seq = load_pattern(patterns_dir().join("kick.txt"), &names, &mut rng).unwrap();
        assert!(variants.contains(&seq));
    }
}

#[test]
fn load_pattern_is_deterministic_under_seed() {
    let names = NoteNames::standard();
    let path = patterns_dir().join("hat.txt");
    let a = load_pattern(&path, &names, &mut StdRng::seed_from_u64(1234)).unwrap();
    let b = load_pattern(&path, &names, &mut StdRng::seed_from_u64(1234)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn missing_pattern_file_reports_io_error() {
    let mut rng = StdRng::seed_from_u64(0);
    let err = load_pattern(patterns_dir().join("nope.txt"), &NoteNames::standard(), &mut rng)
        .unwrap_err();
    assert!(matches!(err, FormatError::Io { .. }));
    assert!(err.to_string().contains("nope.txt"));
}

#[test]
fn single_variant_file_always_returns_it() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "D4 1.0").unwrap();

    let mut rng = StdRng::seed_from_u64(8);
    let seq = load_pattern(file.path(), &NoteNames::standard(), &mut rng).unwrap();
    assert_eq!(seq.len(), 1);
    assert_eq!(seq.get(0).pitch(), Some(62));
    assert_eq!(seq.get(1), Note::End);
}

#[test]
fn shipped_chords_have_four_full_chords() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..10 {
        let table = load_chords(patterns_dir().join("chords.txt"), &mut rng).unwrap();
        for chord in table.chords {
            assert!(chord.iter().all(|&p| p > 0), "chord {:?} has a zero pitch", chord);
            assert!(chord.windows(2).all(|w| w[0] < w[1]), "chord {:?} not ascending", chord);
        }
    }
}

#[test]
fn empty_chord_file_is_an_error() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let err = load_chords(file.path(), &mut rng).unwrap_err();
    assert!(matches!(err, FormatError::Empty { .. }));
}
