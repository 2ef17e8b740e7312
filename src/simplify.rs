//! Settlement simplifier: collapses net balances into a short list of
//! point-to-point transfers that make everyone even.
//!
//! Greedy largest-magnitude matching. Not globally minimal in every
//! topology (the true minimum transfer set is NP-hard), but the accepted
//! practical reduction, made fully deterministic by a member-id tie-break.

use crate::amount::Amount;
use crate::error::{LedgerError, Result};
use crate::model::{MemberId, NetBalances, Transfer};

/// Reduces a balance map to directed transfers that zero every balance.
///
/// Members within 0.01 of zero are treated as already settled and produce
/// no transfers. Output ordering is deterministic: creditors are matched
/// from largest balance down, debtors from most negative up, equal
/// magnitudes broken by member identifier ascending.
///
/// Emitted amounts are rounded to 2 decimal places; the working balances
/// are reduced by the unrounded amount so rounding drift cannot compound.
///
/// # Errors
///
/// [`LedgerError::UnbalancedInput`] if the input did not net to zero within
/// tolerance, which leaves one side with an unmatched residual. Given
/// aggregator output this is unreachable; it is surfaced rather than
/// silently under-settling.
pub fn simplify(balances: &NetBalances) -> Result<Vec<Transfer>> {
    let mut creditors: Vec<(MemberId, Amount)> = Vec::new();
    let mut debtors: Vec<(MemberId, Amount)> = Vec::new();

    for (member, balance) in balances {
        if balance.is_negligible() {
            continue;
        }
        if balance.is_positive() {
            creditors.push((member.clone(), *balance));
        } else {
            debtors.push((member.clone(), *balance));
        }
    }

    // Largest creditor first, most negative debtor first; ties on
    // magnitude fall back to member id so identical input always yields
    // identical output.
    creditors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    debtors.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let mut transfers = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < creditors.len() && j < debtors.len() {
        let credit = creditors[i].1;
        let debt = debtors[j].1;
        let settle = credit.min(-debt);

        transfers.push(Transfer {
            from: debtors[j].0.clone(),
            to: creditors[i].0.clone(),
            amount: settle.round2(),
        });

        creditors[i].1 -= settle;
        debtors[j].1 += settle;

        if creditors[i].1.is_negligible() {
            i += 1;
        }
        if debtors[j].1.is_negligible() {
            j += 1;
        }
    }

    // Either list exhausting with the other still owing means the input
    // never summed to zero.
    for (member, residual) in creditors[i..].iter().chain(debtors[j..].iter()) {
        if !residual.is_negligible() {
            return Err(LedgerError::UnbalancedInput {
                member: member.to_string(),
                residual: residual.to_string(),
            });
        }
    }

    Ok(transfers)
}
