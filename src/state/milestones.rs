//! Milestone percentage allocator.
//!
//! Keeps the milestone list summing to exactly 100 after every mutation,
//! using integer arithmetic only. Add/remove spread the total evenly;
//! updating one milestone pins it and redistributes the rest proportionally
//! to their prior weights with largest-remainder rounding.

use crate::state::Milestone;
use crate::tools::types::ActionError;

pub const MIN_MILESTONES: usize = 1;
pub const MAX_MILESTONES: usize = 10;
pub const TOTAL_PERCENT: u32 = 100;

/// Divide 100 evenly across all entries. The integer-division remainder is
/// handed out one unit per entry starting from the lowest index, so no two
/// entries differ by more than one point.
pub fn rebalance_even(milestones: &mut [Milestone]) {
    let count = milestones.len() as u32;
    debug_assert!(count >= 1);
    let base = TOTAL_PERCENT / count;
    let remainder = (TOTAL_PERCENT % count) as usize;
    for (i, m) in milestones.iter_mut().enumerate() {
        m.percentage = base + u32::from(i < remainder);
    }
    debug_assert!(invariants_hold(milestones));
}

/// Pin `milestones[index]` to exactly `percentage` and redistribute
/// `100 - percentage` over the remaining entries proportionally to their
/// prior percentages.
///
/// Rounding is largest-fractional-remainder: floor every share, then assign
/// the leftover units one at a time to the entries with the largest
/// remainder, ties broken by lowest index. No entry may end below 1; when
/// the pinned value leaves fewer than `count - 1` units to distribute, the
/// operation fails and the list is left untouched.
///
/// Callers must have validated `index` and `percentage` (1..=100) already.
pub fn pin_update(
    milestones: &mut [Milestone],
    index: usize,
    percentage: u32,
) -> Result<(), ActionError> {
    debug_assert!(index < milestones.len());
    debug_assert!((1..=TOTAL_PERCENT).contains(&percentage));

    let others: Vec<usize> = (0..milestones.len()).filter(|&i| i != index).collect();

    if others.is_empty() {
        if percentage != TOTAL_PERCENT {
            return Err(ActionError::milestone_allocation(
                "A single milestone must hold 100%",
            ));
        }
        milestones[index].percentage = percentage;
        return Ok(());
    }

    let rest = TOTAL_PERCENT - percentage;
    if (rest as usize) < others.len() {
        return Err(ActionError::milestone_allocation(format!(
            "Setting milestone {} to {}% leaves only {}% for the other {} milestones (each needs at least 1%)",
            index + 1,
            percentage,
            rest,
            others.len()
        )));
    }

    // Largest-remainder apportionment over prior weights.
    let weights: Vec<u64> = others
        .iter()
        .map(|&i| u64::from(milestones[i].percentage))
        .collect();
    let total_weight: u64 = weights.iter().sum();
    debug_assert!(total_weight > 0);

    let mut shares: Vec<u64> = Vec::with_capacity(others.len());
    let mut remainders: Vec<(u64, usize)> = Vec::with_capacity(others.len());
    for (pos, &w) in weights.iter().enumerate() {
        let numerator = u64::from(rest) * w;
        shares.push(numerator / total_weight);
        remainders.push((numerator % total_weight, pos));
    }

    let assigned: u64 = shares.iter().sum();
    let mut leftover = u64::from(rest) - assigned;

    // Stable sort keeps the lowest index first among equal remainders.
    remainders.sort_by(|a, b| b.0.cmp(&a.0));
    for &(_, pos) in &remainders {
        if leftover == 0 {
            break;
        }
        shares[pos] += 1;
        leftover -= 1;
    }

    // A proportional share can still floor to zero; shift single units down
    // from the largest shares. Terminates because sum(shares) >= count.
    while let Some(zero_pos) = shares.iter().position(|&s| s == 0) {
        let max_pos = shares
            .iter()
            .enumerate()
            .max_by_key(|&(_, &s)| s)
            .map(|(p, _)| p)
            .unwrap_or(zero_pos);
        debug_assert!(shares[max_pos] > 1);
        shares[max_pos] -= 1;
        shares[zero_pos] += 1;
    }

    milestones[index].percentage = percentage;
    for (pos, &i) in others.iter().enumerate() {
        milestones[i].percentage = shares[pos] as u32;
    }

    debug_assert!(invariants_hold(milestones));
    Ok(())
}

pub fn total(milestones: &[Milestone]) -> u32 {
    milestones.iter().map(|m| m.percentage).sum()
}

/// Sum is exactly 100, every entry >= 1, count within bounds.
pub fn invariants_hold(milestones: &[Milestone]) -> bool {
    (MIN_MILESTONES..=MAX_MILESTONES).contains(&milestones.len())
        && milestones.iter().all(|m| m.percentage >= 1)
        && total(milestones) == TOTAL_PERCENT
}
