//! Random line selection.

use rand::Rng;

/// Draw a 1-based line number uniformly from `1..=line_count`.
///
/// Returns `None` when there are no lines to choose from.
pub fn sample_line_index<R: Rng + ?Sized>(line_count: usize, rng: &mut R) -> Option<usize> {
    if line_count == 0 {
        return None;
    }
    Some(rng.gen_range(1..=line_count))
}

/// Pick one line of `text` at random.
pub fn pick_line<'a, R: Rng + ?Sized>(text: &'a str, rng: &mut R) -> Option<&'a str> {
    let index = sample_line_index(text.lines().count(), rng)?;
    text.lines().nth(index - 1)
}
