//! Beat-based time representation.
//!
//! `MusicalTime` is used both for positions inside a measure and for note
//! lengths. Arithmetic is exact, so onset comparisons and measure closure
//! never depend on float rounding.

use core::ops::{Add, AddAssign, Sub};

/// Subdivisions per beat. LCM(1..16) = 720720, so any 1/n-beat grid
/// with n in 1..=16 lands on whole sub-beats.
pub const SUB_BEAT_UNIT: u32 = 720_720;

/// Beats per measure.
pub const BEATS_PER_MEASURE: u64 = 4;

/// Longest length `from_beats_f32` accepts, in beats.
pub const MAX_LENGTH_BEATS: f32 = u32::MAX as f32;

/// One full measure (4 beats).
pub const MEASURE: MusicalTime = MusicalTime::from_beats(BEATS_PER_MEASURE);

/// A position or length in musical time (beats + fractional sub-beat).
///
/// Ordering: beat is primary, sub_beat is secondary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MusicalTime {
    /// Whole beats
    pub beat: u64,
    /// Fraction of a beat: 0..SUB_BEAT_UNIT
    pub sub_beat: u32,
}

impl MusicalTime {
    /// The zero position (measure start).
    pub const fn zero() -> Self {
        Self { beat: 0, sub_beat: 0 }
    }

    /// Create a time at an exact beat boundary.
    pub const fn from_beats(beat: u64) -> Self {
        Self { beat, sub_beat: 0 }
    }

    /// Create a time from a count of quarter beats.
    pub const fn from_quarters(quarters: u64) -> Self {
        Self::from_sub_beats(quarters * (SUB_BEAT_UNIT as u64 / 4))
    }

    /// Create a time from a raw sub-beat count.
    pub const fn from_sub_beats(total: u64) -> Self {
        Self {
            beat: total / SUB_BEAT_UNIT as u64,
            sub_beat: (total % SUB_BEAT_UNIT as u64) as u32,
        }
    }

    /// Convert a floating-point beat count, rounded to the nearest sub-beat.
    ///
    /// Returns `None` for values that are not finite, do not round to a
    /// positive length, or exceed `MAX_LENGTH_BEATS`.
    pub fn from_beats_f32(beats: f32) -> Option<Self> {
        if !beats.is_finite() || beats <= 0.0 || beats > MAX_LENGTH_BEATS {
            return None;
        }
        let total = libm::round(beats as f64 * SUB_BEAT_UNIT as f64);
        if total < 1.0 {
            return None;
        }
        Some(Self::from_sub_beats(total as u64))
    }

    /// Total sub-beats from zero.
    pub const fn as_sub_beats(self) -> u64 {
        self.beat * SUB_BEAT_UNIT as u64 + self.sub_beat as u64
    }

    /// Beats as a float (display and millisecond conversion only).
    pub fn as_beats_f64(self) -> f64 {
        self.beat as f64 + self.sub_beat as f64 / SUB_BEAT_UNIT as f64
    }

    /// Wall-clock length at `beat_ms` milliseconds per beat.
    pub fn to_millis(self, beat_ms: f64) -> f64 {
        self.as_beats_f64() * beat_ms
    }

    pub const fn is_zero(self) -> bool {
        self.beat == 0 && self.sub_beat == 0
    }
}

impl PartialOrd for MusicalTime {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MusicalTime {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.beat.cmp(&other.beat).then(self.sub_beat.cmp(&other.sub_beat))
    }
}

/// Saturates at the largest representable time.
impl Add for MusicalTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_sub_beats(self.as_sub_beats().saturating_add(rhs.as_sub_beats()))
    }
}

impl AddAssign for MusicalTime {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Saturates at zero.
impl Sub for MusicalTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::from_sub_beats(self.as_sub_beats().saturating_sub(rhs.as_sub_beats()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_default() {
        assert_eq!(MusicalTime::zero(), MusicalTime::default());
    }

    #[test]
    fn from_beats_sets_sub_beat_zero() {
        let t = MusicalTime::from_beats(5);
        assert_eq!(t.beat, 5);
        assert_eq!(t.sub_beat, 0);
    }

    #[test]
    fn ordering() {
        let t0 = MusicalTime::zero();
        let t1 = MusicalTime::from_beats(1);
        let t_half = MusicalTime { beat: 0, sub_beat: SUB_BEAT_UNIT / 2 };
        assert!(t0 < t_half);
        assert!(t_half < t1);
    }

    #[test]
    fn quarters_add_up_to_measure() {
        let mut t = MusicalTime::zero();
        for _ in 0..16 {
            t += MusicalTime::from_quarters(1);
        }
        assert_eq!(t, MEASURE);
    }

    #[test]
    fn from_beats_f32_is_exact_for_common_lengths() {
        assert_eq!(MusicalTime::from_beats_f32(0.25), Some(MusicalTime::from_quarters(1)));
        assert_eq!(MusicalTime::from_beats_f32(1.5), Some(MusicalTime::from_quarters(6)));
        assert_eq!(MusicalTime::from_beats_f32(4.0), Some(MEASURE));
    }

    #[test]
    fn from_beats_f32_rejects_non_positive() {
        assert_eq!(MusicalTime::from_beats_f32(0.0), None);
        assert_eq!(MusicalTime::from_beats_f32(-1.0), None);
        assert_eq!(MusicalTime::from_beats_f32(f32::NAN), None);
        assert_eq!(MusicalTime::from_beats_f32(f32::INFINITY), None);
    }

    #[test]
    fn from_beats_f32_rejects_huge_lengths() {
        assert_eq!(MusicalTime::from_beats_f32(1e20), None);
        assert_eq!(MusicalTime::from_beats_f32(f32::MAX), None);
        assert_eq!(MusicalTime::from_beats_f32(1e9), Some(MusicalTime::from_beats(1_000_000_000)));
    }

    #[test]
    fn add_saturates() {
        let huge = MusicalTime::from_sub_beats(u64::MAX);
        assert_eq!(huge + MusicalTime::from_beats(1), huge);
    }

    #[test]
    fn sub_saturates() {
        let one = MusicalTime::from_beats(1);
        let two = MusicalTime::from_beats(2);
        assert_eq!(two - one, one);
        assert_eq!(one - two, MusicalTime::zero());
    }

    #[test]
    fn add_carries_into_beats() {
        let t = MusicalTime::from_quarters(3) + MusicalTime::from_quarters(2);
        assert_eq!(t.beat, 1);
        assert_eq!(t.sub_beat, SUB_BEAT_UNIT / 4);
    }

    #[test]
    fn to_millis_scales_by_beat_length() {
        let t = MusicalTime::from_quarters(6);
        assert!((t.to_millis(500.0) - 750.0).abs() < 1e-9);
    }

    #[test]
    fn sub_beat_unit_divisibility() {
        for n in 1..=16 {
            assert_eq!(SUB_BEAT_UNIT % n, 0, "SUB_BEAT_UNIT not divisible by {}", n);
        }
    }
}
