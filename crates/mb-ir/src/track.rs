//! Track identities and per-track storage.

use core::fmt;
use core::str::FromStr;

/// One musical part of the arrangement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TrackId {
    Piano,
    Bass,
    Melody,
    Hat,
    Ghost,
    Snare,
    Kick,
}

impl TrackId {
    pub const COUNT: usize = 7;

    /// All tracks in output order.
    pub const ALL: [TrackId; Self::COUNT] = [
        TrackId::Piano,
        TrackId::Bass,
        TrackId::Melody,
        TrackId::Hat,
        TrackId::Ghost,
        TrackId::Snare,
        TrackId::Kick,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            TrackId::Piano => "piano",
            TrackId::Bass => "bass",
            TrackId::Melody => "melody",
            TrackId::Hat => "hat",
            TrackId::Ghost => "ghost",
            TrackId::Snare => "snare",
            TrackId::Kick => "kick",
        }
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Error returned when a track name is not recognised.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownTrack;

impl fmt::Display for UnknownTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown track name")
    }
}

impl FromStr for TrackId {
    type Err = UnknownTrack;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackId::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownTrack)
    }
}

/// A fixed map with one slot per `TrackId`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackMap<T> {
    slots: [T; TrackId::COUNT],
}

impl<T> TrackMap<T> {
    pub fn from_fn(mut f: impl FnMut(TrackId) -> T) -> Self {
        Self {
            slots: TrackId::ALL.map(&mut f),
        }
    }

    pub fn get(&self, track: TrackId) -> &T {
        &self.slots[track.index()]
    }

    pub fn get_mut(&mut self, track: TrackId) -> &mut T {
        &mut self.slots[track.index()]
    }

    pub fn set(&mut self, track: TrackId, value: T) {
        self.slots[track.index()] = value;
    }

    /// Iterate `(track, value)` pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (TrackId, &T)> + '_ {
        TrackId::ALL.into_iter().zip(self.slots.iter())
    }
}
