//! Split calculator: divides an expense total into per-member owed shares.
//!
//! Pure and deterministic. Shares are computed once, at expense-recording
//! time, and stored on the expense; nothing downstream ever recomputes them.

use crate::amount::Amount;
use crate::error::{LedgerError, Result};
use crate::model::{MemberId, Shares, SplitPolicy};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Computes each eligible member's owed share of `amount` under `policy`.
///
/// Shares accumulate additively when a policy names the same member more
/// than once, so entry order can never affect the final sums.
///
/// # Errors
///
/// - [`LedgerError::EmptyMemberSet`] for an `Equal` split over no members
/// - [`LedgerError::InvalidMember`] when an entry names a non-eligible member
/// - [`LedgerError::ImbalancedSplit`] when exact amounts miss the total or
///   percentages miss 100, beyond the 0.01 tolerance
pub fn compute_shares(
    eligible: &BTreeSet<MemberId>,
    amount: Amount,
    policy: &SplitPolicy,
) -> Result<Shares> {
    match policy {
        SplitPolicy::Equal => equal_shares(eligible, amount),
        SplitPolicy::Exact { entries } => exact_shares(eligible, amount, entries),
        SplitPolicy::Percentage { entries } => percentage_shares(eligible, amount, entries),
    }
}

/// Even division across all eligible members.
///
/// Uses true division: shares are not pre-rounded, so they sum back to the
/// total within tolerance regardless of member count.
fn equal_shares(eligible: &BTreeSet<MemberId>, amount: Amount) -> Result<Shares> {
    if eligible.is_empty() {
        return Err(LedgerError::EmptyMemberSet);
    }

    let per_head = amount.divide_among(eligible.len());
    Ok(eligible
        .iter()
        .map(|member| (member.clone(), per_head))
        .collect())
}

/// Explicit per-member amounts, validated against the expense total.
fn exact_shares(
    eligible: &BTreeSet<MemberId>,
    amount: Amount,
    entries: &[(MemberId, Amount)],
) -> Result<Shares> {
    let mut shares = Shares::new();
    let mut sum = Amount::ZERO;

    for (member, entry_amount) in entries {
        if !eligible.contains(member) {
            return Err(LedgerError::InvalidMember {
                member: member.to_string(),
            });
        }
        *shares.entry(member.clone()).or_insert(Amount::ZERO) += *entry_amount;
        sum += *entry_amount;
    }

    if !(sum - amount).is_negligible() {
        return Err(LedgerError::ImbalancedSplit {
            policy: "exact",
            actual: sum.to_string(),
            expected: amount.to_string(),
        });
    }

    Ok(shares)
}

/// Explicit per-member percentages, validated to sum to 100.
fn percentage_shares(
    eligible: &BTreeSet<MemberId>,
    amount: Amount,
    entries: &[(MemberId, Decimal)],
) -> Result<Shares> {
    let mut shares = Shares::new();
    let mut percent_sum = Decimal::ZERO;

    for (member, percent) in entries {
        if !eligible.contains(member) {
            return Err(LedgerError::InvalidMember {
                member: member.to_string(),
            });
        }
        percent_sum += percent;
        *shares.entry(member.clone()).or_insert(Amount::ZERO) += amount.percent_of(*percent);
    }

    if (percent_sum - Decimal::ONE_HUNDRED).abs() > Amount::tolerance() {
        return Err(LedgerError::ImbalancedSplit {
            policy: "percentage",
            actual: percent_sum.to_string(),
            expected: "100".to_string(),
        });
    }

    Ok(shares)
}
