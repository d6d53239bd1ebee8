//! Dense display-order planning for ranked collections.
//!
//! Creations and services carry a `sort_order` that must stay exactly
//! `{1..N}` after every insert, re-rank, or delete. The planning here is
//! pure: it takes the current `(id, sort_order)` slots and returns the full
//! desired assignment, which the database layer applies in one transaction.

use thiserror::Error;

/// Provisional rank given to freshly inserted rows so that creation and
/// re-ranking share one resequencing path. A plain resequence leaves the
/// new row last; a targeted resequence moves it to the requested rank.
pub const SENTINEL_RANK: i32 = i32::MAX;

/// Current position of one row in a ranked collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankSlot {
    pub id: i32,
    pub sort_order: i32,
}

/// Desired rank for one row after resequencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub id: i32,
    pub rank: i32,
}

/// The requested target row is not part of the collection. Callers treat
/// this as a logic error (404), never as something to paper over.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("target id {0} is not in the collection")]
pub struct TargetMissing(pub i32);

fn by_current_order(slots: &mut [RankSlot]) {
    // Ties on sort_order break by ascending id.
    slots.sort_by_key(|s| (s.sort_order, s.id));
}

fn assign(ordered: &[RankSlot]) -> Vec<Assignment> {
    ordered
        .iter()
        .enumerate()
        .map(|(idx, slot)| Assignment {
            id: slot.id,
            rank: idx as i32 + 1,
        })
        .collect()
}

/// Plain cleanup: keep the current relative order, reassign ranks 1..N.
/// Idempotent; used after deletions or when no target rank is requested.
pub fn plan(mut slots: Vec<RankSlot>) -> Vec<Assignment> {
    by_current_order(&mut slots);
    assign(&slots)
}

/// Place `target_id` at `target_rank` (1-based), then reassign 1..N.
///
/// The target is removed before computing its insertion point so it never
/// counts among the rows used to locate its own destination. Out-of-range
/// ranks are clamped, never rejected.
pub fn plan_with_target(
    mut slots: Vec<RankSlot>,
    target_id: i32,
    target_rank: i32,
) -> Result<Vec<Assignment>, TargetMissing> {
    by_current_order(&mut slots);

    let pos = slots
        .iter()
        .position(|s| s.id == target_id)
        .ok_or(TargetMissing(target_id))?;
    let target = slots.remove(pos);

    let index = (target_rank as i64 - 1).clamp(0, slots.len() as i64) as usize;
    slots.insert(index, target);

    Ok(assign(&slots))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(pairs: &[(i32, i32)]) -> Vec<RankSlot> {
        pairs
            .iter()
            .map(|&(id, sort_order)| RankSlot { id, sort_order })
            .collect()
    }

    fn ranks(assignments: &[Assignment]) -> Vec<(i32, i32)> {
        assignments.iter().map(|a| (a.id, a.rank)).collect()
    }

    #[test]
    fn plain_resequence_is_dense() {
        // Gaps and duplicates collapse to exactly {1..N}.
        let out = plan(slots(&[(10, 4), (11, 4), (12, 9), (13, 1)]));
        assert_eq!(ranks(&out), vec![(13, 1), (10, 2), (11, 3), (12, 4)]);
    }

    #[test]
    fn plain_resequence_is_idempotent() {
        let first = plan(slots(&[(1, 3), (2, 7), (3, 7)]));
        let second = plan(
            first
                .iter()
                .map(|a| RankSlot {
                    id: a.id,
                    sort_order: a.rank,
                })
                .collect(),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn empty_collection_resequences_to_nothing() {
        assert!(plan(Vec::new()).is_empty());
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let out = plan(slots(&[(9, 1), (3, 1), (5, 1)]));
        assert_eq!(ranks(&out), vec![(3, 1), (5, 2), (9, 3)]);
    }

    #[test]
    fn move_last_to_front() {
        // [A:1, B:2, C:3], move C to rank 1 => [C:1, A:2, B:3].
        let out = plan_with_target(slots(&[(1, 1), (2, 2), (3, 3)]), 3, 1).unwrap();
        assert_eq!(ranks(&out), vec![(3, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn delete_then_resequence_closes_the_gap() {
        // [A:1, B:2, C:3] with B gone => [A:1, C:2].
        let out = plan(slots(&[(1, 1), (3, 3)]));
        assert_eq!(ranks(&out), vec![(1, 1), (3, 2)]);
    }

    #[test]
    fn rank_zero_and_negative_clamp_to_front() {
        let base = slots(&[(1, 1), (2, 2), (3, 3)]);
        let out = plan_with_target(base.clone(), 2, 0).unwrap();
        assert_eq!(ranks(&out), vec![(2, 1), (1, 2), (3, 3)]);

        let out = plan_with_target(base, 2, -5).unwrap();
        assert_eq!(ranks(&out), vec![(2, 1), (1, 2), (3, 3)]);
    }

    #[test]
    fn oversized_rank_clamps_to_back() {
        let out = plan_with_target(slots(&[(1, 1), (2, 2), (3, 3)]), 1, 99).unwrap();
        assert_eq!(ranks(&out), vec![(2, 1), (3, 2), (1, 3)]);
    }

    #[test]
    fn target_does_not_count_itself_when_placed() {
        // Moving the first of four items to rank 4 must land it last, not
        // second-to-last: the insertion point is computed over the other
        // three rows only.
        let out = plan_with_target(slots(&[(1, 1), (2, 2), (3, 3), (4, 4)]), 1, 4).unwrap();
        assert_eq!(ranks(&out), vec![(2, 1), (3, 2), (4, 3), (1, 4)]);
    }

    #[test]
    fn sentinel_rank_lands_new_rows_last_on_plain_resequence() {
        let out = plan(slots(&[(1, 1), (2, 2), (7, SENTINEL_RANK)]));
        assert_eq!(ranks(&out), vec![(1, 1), (2, 2), (7, 3)]);
    }

    #[test]
    fn sentinel_rank_row_honors_target_rank() {
        let out =
            plan_with_target(slots(&[(1, 1), (2, 2), (7, SENTINEL_RANK)]), 7, 1).unwrap();
        assert_eq!(ranks(&out), vec![(7, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn missing_target_is_rejected() {
        let err = plan_with_target(slots(&[(1, 1), (2, 2)]), 42, 1).unwrap_err();
        assert_eq!(err, TargetMissing(42));
    }

    #[test]
    fn density_holds_across_random_shapes() {
        for n in 0..8 {
            let input: Vec<RankSlot> = (0..n)
                .map(|i| RankSlot {
                    id: i * 3 + 1,
                    sort_order: (i * 7) % 5,
                })
                .collect();
            let out = plan(input);
            let mut got: Vec<i32> = out.iter().map(|a| a.rank).collect();
            got.sort_unstable();
            assert_eq!(got, (1..=n).collect::<Vec<i32>>());
        }
    }
}
