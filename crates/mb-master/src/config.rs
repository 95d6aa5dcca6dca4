//! Arrangement configuration.
//!
//! An arrangement is described per track: a list of sections, each holding
//! phrases that come either from a pattern file or from the generator.
//!
//! ```toml
//! tempo = 120
//! seed = 7
//!
//! [[track]]
//! track = "kick"
//! [[track.section]]
//! repeats = 1
//! [[track.section.phrase]]
//! pattern = "kick.txt"
//! repeats = 4
//!
//! [[track]]
//! track = "bass"
//! [[track.section]]
//! [[track.section.phrase]]
//! generate = "bass"
//! follow = "kick"
//! chord = 0
//! ```

use std::path::{Path, PathBuf};

use mb_engine::MELODY_SCALE;
use mb_ir::TrackId;
use serde::{Deserialize, Serialize};

use crate::MasterError;

/// Which generator a generated phrase uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerateMode {
    Melody,
    Bass,
    Piano,
}

impl GenerateMode {
    pub fn name(self) -> &'static str {
        match self {
            GenerateMode::Melody => "melody",
            GenerateMode::Bass => "bass",
            GenerateMode::Piano => "piano",
        }
    }
}

/// Where a phrase's notes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhraseSource {
    /// A pattern file in the patterns directory
    Pattern(String),
    /// A generated measure
    Generate {
        mode: GenerateMode,
        /// Track whose onsets the part follows
        follow: Option<TrackId>,
        /// Progression index (0-3)
        chord: usize,
        /// Piano voice (1-4)
        voice: usize,
    },
}

/// One phrase of a section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhrasePlan {
    #[serde(default = "default_repeats")]
    pub repeats: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate: Option<GenerateMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow: Option<TrackId>,
    #[serde(default)]
    pub chord: usize,
    #[serde(default = "default_voice")]
    pub voice: usize,
}

impl PhrasePlan {
    pub fn pattern(file: &str, repeats: i32) -> Self {
        Self {
            repeats,
            pattern: Some(file.to_string()),
            generate: None,
            follow: None,
            chord: 0,
            voice: default_voice(),
        }
    }

    pub fn generated(mode: GenerateMode, follow: Option<TrackId>, repeats: i32) -> Self {
        Self {
            repeats,
            pattern: None,
            generate: Some(mode),
            follow,
            chord: 0,
            voice: default_voice(),
        }
    }

    pub fn with_chord(mut self, chord: usize) -> Self {
        self.chord = chord;
        self
    }

    pub fn with_voice(mut self, voice: usize) -> Self {
        self.voice = voice;
        self
    }

    /// The phrase's note source. A pattern file takes precedence over a
    /// generator; `None` if neither is given.
    pub fn source(&self) -> Option<PhraseSource> {
        if let Some(file) = &self.pattern {
            return Some(PhraseSource::Pattern(file.clone()));
        }
        self.generate.map(|mode| PhraseSource::Generate {
            mode,
            follow: self.follow,
            chord: self.chord,
            voice: self.voice,
        })
    }
}

/// One section of a track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_repeats")]
    pub repeats: i32,
    #[serde(default, rename = "phrase")]
    pub phrases: Vec<PhrasePlan>,
}

impl SectionPlan {
    pub fn new(repeats: i32, phrases: Vec<PhrasePlan>) -> Self {
        Self { label: None, repeats, phrases }
    }
}

/// The sections of one track, in play order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPlan {
    pub track: TrackId,
    #[serde(default, rename = "section")]
    pub sections: Vec<SectionPlan>,
}

impl TrackPlan {
    /// A track with a single section.
    pub fn single(track: TrackId, phrases: Vec<PhrasePlan>) -> Self {
        Self {
            track,
            sections: vec![SectionPlan::new(1, phrases)],
        }
    }
}

/// Everything needed to build and play an arrangement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrangementConfig {
    /// Beats per minute
    pub tempo: u32,
    /// Random seed for file selection and generation
    pub seed: u64,
    /// Arrangement cycles per session
    pub runs: u32,
    pub measures_per_cycle: u32,
    /// Directory holding pattern and chord files
    pub patterns_dir: PathBuf,
    /// Chord progression file, relative to `patterns_dir`
    pub chords: String,
    /// Melody scale as MIDI pitches
    pub scale: Vec<u8>,
    /// Track plans, built in order
    #[serde(rename = "track")]
    pub tracks: Vec<TrackPlan>,
}

impl ArrangementConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, MasterError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, MasterError> {
        let text = std::fs::read_to_string(path).map_err(|source| MasterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Resolve a file name against the patterns directory.
    pub fn pattern_path(&self, file: &str) -> PathBuf {
        self.patterns_dir.join(file)
    }

    pub fn plan(&self, track: TrackId) -> Option<&TrackPlan> {
        self.tracks.iter().find(|plan| plan.track == track)
    }
}

impl Default for ArrangementConfig {
    /// The stock layout: drums from pattern files, bass following the kick
    /// through the progression, melody following the snare and the piano
    /// sustaining one chord voice per measure.
    fn default() -> Self {
        let bass = (0..4)
            .map(|chord| {
                PhrasePlan::generated(GenerateMode::Bass, Some(TrackId::Kick), 1).with_chord(chord)
            })
            .collect();
        let piano = (0..4)
            .map(|chord| {
                PhrasePlan::generated(GenerateMode::Piano, None, 1)
                    .with_chord(chord)
                    .with_voice(3)
            })
            .collect();

        Self {
            tempo: 120,
            seed: 0,
            runs: 4,
            measures_per_cycle: 4,
            patterns_dir: PathBuf::from("patterns"),
            chords: "chords.txt".to_string(),
            scale: MELODY_SCALE.to_vec(),
            tracks: vec![
                TrackPlan::single(
                    TrackId::Hat,
                    vec![PhrasePlan::pattern("hat.txt", 2), PhrasePlan::pattern("hat2.txt", 2)],
                ),
                TrackPlan::single(TrackId::Ghost, vec![PhrasePlan::pattern("ghost.txt", 4)]),
                TrackPlan::single(TrackId::Snare, vec![PhrasePlan::pattern("snare.txt", 4)]),
                TrackPlan::single(TrackId::Kick, vec![PhrasePlan::pattern("kick.txt", 4)]),
                TrackPlan::single(TrackId::Bass, bass),
                TrackPlan::single(
                    TrackId::Melody,
                    vec![PhrasePlan::generated(GenerateMode::Melody, Some(TrackId::Snare), 4)],
                ),
                TrackPlan::single(TrackId::Piano, piano),
            ],
        }
    }
}

fn default_repeats() -> i32 {
    1
}

fn default_voice() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let config = ArrangementConfig::default();
        assert_eq!(config.tempo, 120);
        assert_eq!(config.runs, 4);
        assert_eq!(config.measures_per_cycle, 4);
        assert_eq!(config.tracks.len(), TrackId::COUNT);

        let hat = config.plan(TrackId::Hat).unwrap();
        let files: Vec<_> = hat.sections[0]
            .phrases
            .iter()
            .map(|p| (p.pattern.as_deref().unwrap(), p.repeats))
            .collect();
        assert_eq!(files, [("hat.txt", 2), ("hat2.txt", 2)]);

        let bass = &config.plan(TrackId::Bass).unwrap().sections[0].phrases;
        assert_eq!(bass.len(), 4);
        for (i, phrase) in bass.iter().enumerate() {
            assert_eq!(
                phrase.source(),
                Some(PhraseSource::Generate {
                    mode: GenerateMode::Bass,
                    follow: Some(TrackId::Kick),
                    chord: i,
                    voice: 1,
                })
            );
            assert_eq!(phrase.repeats, 1);
        }
    }

    #[test]
    fn parse_minimal() {
        let config = ArrangementConfig::from_toml_str("tempo = 90\nseed = 3\n").unwrap();
        assert_eq!(config.tempo, 90);
        assert_eq!(config.seed, 3);
        // Unspecified fields keep the stock layout
        assert_eq!(config.tracks, ArrangementConfig::default().tracks);
    }

    #[test]
    fn parse_tracks() {
        let text = r#"
            patterns_dir = "loops"
            runs = 2

            [[track]]
            track = "kick"
            [[track.section]]
            label = "intro"
            repeats = 2
            [[track.section.phrase]]
            pattern = "kick.txt"
            repeats = 4

            [[track]]
            track = "melody"
            [[track.section]]
            [[track.section.phrase]]
            generate = "melody"
            follow = "kick"
        "#;
        let config = ArrangementConfig::from_toml_str(text).unwrap();
        assert_eq!(config.runs, 2);
        assert_eq!(config.pattern_path("kick.txt"), Path::new("loops").join("kick.txt"));
        assert_eq!(config.tracks.len(), 2);

        let kick = config.plan(TrackId::Kick).unwrap();
        assert_eq!(kick.sections[0].label.as_deref(), Some("intro"));
        assert_eq!(kick.sections[0].repeats, 2);
        assert_eq!(
            kick.sections[0].phrases[0].source(),
            Some(PhraseSource::Pattern("kick.txt".into()))
        );

        let melody = config.plan(TrackId::Melody).unwrap();
        let phrase = &melody.sections[0].phrases[0];
        assert_eq!(melody.sections[0].repeats, 1);
        assert_eq!(phrase.repeats, 1);
        assert_eq!(phrase.follow, Some(TrackId::Kick));
        assert_eq!(phrase.generate, Some(GenerateMode::Melody));
    }

    #[test]
    fn unknown_track_is_an_error() {
        let text = "[[track]]\ntrack = \"cowbell\"\n";
        assert!(matches!(
            ArrangementConfig::from_toml_str(text),
            Err(MasterError::Config(_))
        ));
    }

    #[test]
    fn phrase_without_source() {
        let plan = PhrasePlan {
            repeats: 1,
            pattern: None,
            generate: None,
            follow: None,
            chord: 0,
            voice: 1,
        };
        assert_eq!(plan.source(), None);
    }

    #[test]
    fn toml_roundtrip_of_default() {
        let config = ArrangementConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(ArrangementConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn load_missing_file() {
        let err = ArrangementConfig::load(Path::new("/nonexistent/musicbox.toml")).unwrap_err();
        assert!(matches!(err, MasterError::Io { .. }));
    }
}
