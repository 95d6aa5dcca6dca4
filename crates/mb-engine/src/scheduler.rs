//! Section and phrase advancement.
//!
//! These walk the arrangement's chains forward, spending repeat budgets as
//! they go. The player calls them once per arrangement tick (sections) and
//! once per measure tick (phrases). Phrase chains never wrap on their own:
//! the player re-enters a chain by resetting its cursor to the section head,
//! and `reload_hold` restores the budget of the phrase that was parked at
//! the end of the previous pass.

use mb_ir::{Arrangement, PhraseKey, SectionKey, TrackId};
use tracing::debug;

use crate::registry::TrackRegistry;

/// Advance a track's section cursor by one arrangement cycle.
///
/// Moves to the next section once the current one has no budget left,
/// then spends one repeat of whichever section is current. A section with
/// no successor keeps decrementing; its budget is only compared `< 1`.
pub fn advance_section(arrangement: &mut Arrangement, current: SectionKey) -> SectionKey {
    let Some(section) = arrangement.section(current) else {
        return current;
    };

    let mut key = current;
    if section.repeat_budget < 1 {
        if let Some(next) = section.next {
            key = next;
        }
    }

    if let Some(section) = arrangement.section_mut(key) {
        section.repeat_budget -= 1;
        if key != current {
            debug!(section = %section.label, budget = section.repeat_budget, "next section");
        }
    }
    key
}

/// Advance a track's phrase cursor by one measure.
///
/// When the current phrase is spent and has a successor, its budget is
/// restored from the track's hold register, the cursor moves on and the
/// register is cleared. The register is then raised to the current
/// phrase's budget before one repeat is spent.
pub fn advance_phrase(
    arrangement: &mut Arrangement,
    current: PhraseKey,
    track: TrackId,
    registry: &mut TrackRegistry,
) -> PhraseKey {
    let mut key = current;

    if let Some(phrase) = arrangement.phrase_mut(current) {
        if phrase.repeat_budget < 1 {
            if let Some(next) = phrase.next {
                phrase.repeat_budget = registry.hold(track);
                key = next;
                registry.set_hold(track, 0);
            }
        }
    }

    if let Some(phrase) = arrangement.phrase_mut(key) {
        registry.raise(track, phrase.repeat_budget);
        phrase.repeat_budget -= 1;
        if key != current {
            debug!(%track, phrase = %phrase.label, budget = phrase.repeat_budget, "next phrase");
        }
    }
    key
}

/// Restore `phrase`'s budget from the track's hold register.
///
/// Called on the last measure before a section transition so the next pass
/// through the same chain replays with its original counts.
pub fn reload_hold(
    arrangement: &mut Arrangement,
    phrase: PhraseKey,
    track: TrackId,
    registry: &TrackRegistry,
) {
    if let Some(p) = arrangement.phrase_mut(phrase) {
        p.repeat_budget = registry.hold(track);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use mb_ir::{MusicalTime, Note, NoteSequence};

    fn notes() -> NoteSequence {
        NoteSequence::from_notes([Note::pitched(42, MusicalTime::from_beats(4))])
    }

    /// One section holding phrases with the given budgets.
    fn chain(track: TrackId, budgets: &[i32]) -> (Arrangement, SectionKey, Vec<PhraseKey>) {
        let mut arr = Arrangement::new();
        let section = arr.add_section(track, "s", 1);
        let keys = budgets
            .iter()
            .map(|&b| arr.add_phrase(section, "p", notes(), b))
            .collect();
        (arr, section, keys)
    }

    fn budget(arr: &Arrangement, key: PhraseKey) -> i32 {
        arr.phrase(key).unwrap().repeat_budget
    }

    #[test]
    fn phrases_visited_in_chain_order_budget_times_each() {
        let track = TrackId::Hat;
        let (mut arr, section, keys) = chain(track, &[2, 1, 3]);
        let mut reg = TrackRegistry::new();

        let mut cur = arr.section(section).unwrap().head.unwrap();
        let mut visited = Vec::new();
        for _ in 0..6 {
            cur = advance_phrase(&mut arr, cur, track, &mut reg);
            visited.push(cur);
        }

        let expected = [keys[0], keys[0], keys[1], keys[2], keys[2], keys[2]];
        assert_eq!(visited, expected);
    }

    #[test]
    fn hold_tracks_largest_budget_since_clear() {
        let track = TrackId::Bass;
        let (mut arr, _, keys) = chain(track, &[1, 3]);
        let mut reg = TrackRegistry::new();

        let cur = advance_phrase(&mut arr, keys[0], track, &mut reg);
        assert_eq!(cur, keys[0]);
        assert_eq!(reg.hold(track), 1);

        let cur = advance_phrase(&mut arr, cur, track, &mut reg);
        assert_eq!(cur, keys[1]);
        // Leaving phrase 0 restored its budget and cleared the register
        assert_eq!(budget(&arr, keys[0]), 1);
        assert_eq!(reg.hold(track), 3);
        assert_eq!(budget(&arr, keys[1]), 2);
    }

    #[test]
    fn reload_hold_sets_budget_to_register() {
        let track = TrackId::Melody;
        let (mut arr, _, keys) = chain(track, &[4]);
        let mut reg = TrackRegistry::new();

        let mut cur = keys[0];
        for _ in 0..4 {
            cur = advance_phrase(&mut arr, cur, track, &mut reg);
        }
        assert_eq!(budget(&arr, cur), 0);

        reload_hold(&mut arr, cur, track, &reg);
        assert_eq!(budget(&arr, cur), reg.hold(track));
        assert_eq!(budget(&arr, cur), 4);
    }

    #[test]
    fn chain_replays_identically_after_reload() {
        let track = TrackId::Hat;
        let (mut arr, section, keys) = chain(track, &[2, 2]);
        let mut reg = TrackRegistry::new();
        let head = arr.section(section).unwrap().head.unwrap();

        let mut passes = Vec::new();
        for _ in 0..3 {
            let mut cur = head;
            let mut pass = Vec::new();
            for measure in 0..4 {
                cur = advance_phrase(&mut arr, cur, track, &mut reg);
                pass.push(cur);
                if measure == 3 {
                    reload_hold(&mut arr, cur, track, &reg);
                }
            }
            passes.push(pass);
        }

        let expected = alloc::vec![keys[0], keys[0], keys[1], keys[1]];
        for pass in passes {
            assert_eq!(pass, expected);
        }
        assert_eq!(budget(&arr, keys[0]), 2);
        assert_eq!(budget(&arr, keys[1]), 2);
    }

    #[test]
    fn single_phrase_budget_drifts_negative() {
        let track = TrackId::Kick;
        let (mut arr, _, keys) = chain(track, &[1]);
        let mut reg = TrackRegistry::new();

        let mut cur = keys[0];
        for _ in 0..3 {
            cur = advance_phrase(&mut arr, cur, track, &mut reg);
            assert_eq!(cur, keys[0]);
        }
        assert_eq!(budget(&arr, keys[0]), -2);
    }

    #[test]
    fn spent_budget_never_read_negative_when_successor_exists() {
        let track = TrackId::Snare;
        let (mut arr, _, keys) = chain(track, &[1, 1, 1, 1]);
        let mut reg = TrackRegistry::new();

        let mut cur = keys[0];
        for _ in 0..4 {
            let before = budget(&arr, cur);
            let next = advance_phrase(&mut arr, cur, track, &mut reg);
            if next != cur {
                assert!(before < 1);
            } else {
                assert!(before >= 1);
            }
            cur = next;
        }
        assert_eq!(cur, keys[3]);
    }

    #[test]
    fn sections_advance_when_spent() {
        let mut arr = Arrangement::new();
        let a = arr.add_section(TrackId::Piano, "a", 2);
        let b = arr.add_section(TrackId::Piano, "b", 1);

        let mut cur = a;
        let mut visited = Vec::new();
        for _ in 0..4 {
            cur = advance_section(&mut arr, cur);
            visited.push(cur);
        }
        assert_eq!(visited, [a, a, b, b]);
        // Last section keeps decrementing past zero
        assert_eq!(arr.section(b).unwrap().repeat_budget, -1);
    }

    #[test]
    fn section_with_zero_budget_moves_immediately() {
        let mut arr = Arrangement::new();
        let a = arr.add_section(TrackId::Ghost, "intro", 0);
        let b = arr.add_section(TrackId::Ghost, "groove", 3);
        assert_eq!(advance_section(&mut arr, a), b);
        assert_eq!(arr.section(b).unwrap().repeat_budget, 2);
    }
}
