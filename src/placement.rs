use rand::seq::index;
use rand::Rng;
use std::collections::BTreeSet;

/// Picks `count` distinct linear indices in `0..area`, never including `excluded`.
///
/// The excluded index is removed from the candidate pool before sampling, so a
/// single draw suffices no matter how dense the board is. When the excluded
/// index leaves fewer than `count` candidates the count shrinks to fit.
pub fn choose_mine_positions<R: Rng + ?Sized>(
    rng: &mut R,
    area: usize,
    count: usize,
    excluded: Option<usize>,
) -> BTreeSet<usize> {
    let excluded = excluded.filter(|&safe| safe < area);
    let candidates = if excluded.is_some() { area - 1 } else { area };

    let amount = count.min(candidates);
    if amount < count {
        log::warn!(
            "Requested {} mines but only {} cells are available, placing {}",
            count,
            candidates,
            amount
        );
    }

    index::sample(rng, candidates, amount)
        .into_iter()
        .map(|i| match excluded {
            Some(safe) if i >= safe => i + 1,
            _ => i,
        })
        .collect()
}
