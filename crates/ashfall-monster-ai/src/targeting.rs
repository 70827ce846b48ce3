//! Aggro target selection.

use ashfall_core::types::Position;

/// Pick the nearest candidate within `range` of `from`.
///
/// Only a strictly closer candidate replaces the current best, so on ties the
/// first candidate in slice order wins. Callers sort candidates by net id to
/// make that order stable.
pub fn select_nearest<T: Copy>(
    from: &Position,
    range: f32,
    candidates: &[(T, Position)],
) -> Option<(T, Position)> {
    let range_sq = range * range;
    let mut best: Option<(T, Position, f32)> = None;

    for &(id, pos) in candidates {
        let d2 = from.distance_sq_to(&pos);
        if d2 > range_sq {
            continue;
        }
        match best {
            Some((_, _, best_d2)) if d2 >= best_d2 => {}
            _ => best = Some((id, pos, d2)),
        }
    }

    best.map(|(id, pos, _)| (id, pos))
}
