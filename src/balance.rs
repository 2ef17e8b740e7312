//! Balance aggregator: folds expense and settlement histories into
//! per-member net balances.
//!
//! A pure fold over two histories. Adjustments are additive only, so the
//! result is independent of the order records are supplied in.

use crate::amount::Amount;
use crate::error::{LedgerError, Result};
use crate::model::{Expense, MemberId, NetBalances, Settlement};
use std::collections::BTreeSet;

/// Computes every member's signed net balance from full histories.
///
/// Every member starts at zero; members with no transactions stay there.
/// Per expense, the payer is credited the full amount and each member in
/// the stored `shares` map is debited their share (the payer can be both).
/// Per settlement, `from` is credited and `to` debited.
///
/// The returned balances sum to zero within tolerance for any consistent
/// input.
///
/// # Errors
///
/// [`LedgerError::UnknownMember`] if any record references a member outside
/// `members`. Upstream membership management should already guarantee this
/// never fires.
pub fn compute_net_balances(
    members: &BTreeSet<MemberId>,
    expenses: &[Expense],
    settlements: &[Settlement],
) -> Result<NetBalances> {
    let mut balances: NetBalances = members
        .iter()
        .map(|member| (member.clone(), Amount::ZERO))
        .collect();

    for expense in expenses {
        credit(&mut balances, &expense.payer, expense.amount)?;
        for (member, share) in &expense.shares {
            credit(&mut balances, member, -*share)?;
        }
    }

    for settlement in settlements {
        credit(&mut balances, &settlement.from, settlement.amount)?;
        credit(&mut balances, &settlement.to, -settlement.amount)?;
    }

    Ok(balances)
}

/// Adds `delta` to a member's running balance.
///
/// Additive only: never reassigns, so earlier adjustments to the same
/// member are preserved.
fn credit(balances: &mut NetBalances, member: &MemberId, delta: Amount) -> Result<()> {
    match balances.get_mut(member) {
        Some(balance) => {
            *balance += delta;
            Ok(())
        }
        None => Err(LedgerError::UnknownMember {
            member: member.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupId, Shares, SplitPolicy};
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn members(ids: &[&str]) -> BTreeSet<MemberId> {
        ids.iter().map(|id| MemberId::from(*id)).collect()
    }

    fn shares(entries: &[(&str, &str)]) -> Shares {
        entries
            .iter()
            .map(|(id, a)| (MemberId::from(*id), amt(a)))
            .collect()
    }

    fn expense(payer: &str, amount: &str, share_entries: &[(&str, &str)]) -> Expense {
        Expense::record(
            GroupId::from("trip"),
            MemberId::from(payer),
            amt(amount),
            SplitPolicy::Equal,
            shares(share_entries),
        )
    }

    fn settlement(from: &str, to: &str, amount: &str) -> Settlement {
        Settlement::record(
            GroupId::from("trip"),
            MemberId::from(from),
            MemberId::from(to),
            amt(amount),
        )
    }

    fn assert_conserved(balances: &NetBalances) {
        let sum: Amount = balances.values().sum();
        assert!(sum.is_negligible(), "balances sum to {sum}, expected ~0");
    }

    #[test]
    fn test_single_expense_equal_split() {
        let group = members(&["alice", "bob", "carol"]);
        let expenses = [expense(
            "alice",
            "30.00",
            &[("alice", "10.00"), ("bob", "10.00"), ("carol", "10.00")],
        )];

        let balances = compute_net_balances(&group, &expenses, &[]).unwrap();

        assert_eq!(balances[&MemberId::from("alice")], amt("20.00"));
        assert_eq!(balances[&MemberId::from("bob")], amt("-10.00"));
        assert_eq!(balances[&MemberId::from("carol")], amt("-10.00"));
        assert_conserved(&balances);
    }

    #[test]
    fn test_payer_excluded_from_own_split() {
        // "I paid for the others, not myself": the payer's net is the full
        // amount, since they owe no share of it.
        let group = members(&["alice", "bob", "carol"]);
        let expenses = [expense(
            "alice",
            "30.00",
            &[("bob", "15.00"), ("carol", "15.00")],
        )];

        let balances = compute_net_balances(&group, &expenses, &[]).unwrap();

        assert_eq!(balances[&MemberId::from("alice")], amt("30.00"));
        assert_eq!(balances[&MemberId::from("bob")], amt("-15.00"));
        assert_eq!(balances[&MemberId::from("carol")], amt("-15.00"));
        assert_conserved(&balances);
    }

    #[test]
    fn test_settlement_reduces_debt() {
        let group = members(&["alice", "bob"]);
        let expenses = [expense(
            "alice",
            "40.00",
            &[("alice", "20.00"), ("bob", "20.00")],
        )];
        let settlements = [settlement("bob", "alice", "20.00")];

        let balances = compute_net_balances(&group, &expenses, &settlements).unwrap();

        assert!(balances[&MemberId::from("alice")].is_negligible());
        assert!(balances[&MemberId::from("bob")].is_negligible());
    }

    #[test]
    fn test_idle_member_stays_at_zero() {
        let group = members(&["alice", "bob", "dora"]);
        let expenses = [expense(
            "alice",
            "10.00",
            &[("alice", "5.00"), ("bob", "5.00")],
        )];

        let balances = compute_net_balances(&group, &expenses, &[]).unwrap();

        assert_eq!(balances[&MemberId::from("dora")], Amount::ZERO);
        assert_conserved(&balances);
    }

    #[test]
    fn test_order_independence() {
        let group = members(&["alice", "bob", "carol"]);
        let e1 = expense(
            "alice",
            "30.00",
            &[("alice", "10.00"), ("bob", "10.00"), ("carol", "10.00")],
        );
        let e2 = expense("bob", "12.00", &[("alice", "6.00"), ("carol", "6.00")]);
        let s1 = settlement("carol", "alice", "7.50");

        let forward =
            compute_net_balances(&group, &[e1.clone(), e2.clone()], &[s1.clone()]).unwrap();
        let reversed = compute_net_balances(&group, &[e2, e1], &[s1]).unwrap();

        assert_eq!(forward, reversed);
        assert_conserved(&forward);
    }

    #[test]
    fn test_unknown_payer_rejected() {
        let group = members(&["alice", "bob"]);
        let expenses = [expense("mallory", "10.00", &[("alice", "10.00")])];

        let result = compute_net_balances(&group, &expenses, &[]);
        assert!(matches!(
            result,
            Err(LedgerError::UnknownMember { member }) if member == "mallory"
        ));
    }

    #[test]
    fn test_unknown_share_member_rejected() {
        let group = members(&["alice", "bob"]);
        let expenses = [expense("alice", "10.00", &[("eve", "10.00")])];

        let result = compute_net_balances(&group, &expenses, &[]);
        assert!(matches!(result, Err(LedgerError::UnknownMember { .. })));
    }

    #[test]
    fn test_unknown_settlement_party_rejected() {
        let group = members(&["alice", "bob"]);
        let settlements = [settlement("alice", "eve", "5.00")];

        let result = compute_net_balances(&group, &[], &settlements);
        assert!(matches!(result, Err(LedgerError::UnknownMember { .. })));
    }

    #[test]
    fn test_conservation_over_mixed_history() {
        let group = members(&["alice", "bob", "carol", "dora"]);
        let expenses = [
            expense(
                "alice",
                "100.00",
                &[
                    ("alice", "25.00"),
                    ("bob", "25.00"),
                    ("carol", "25.00"),
                    ("dora", "25.00"),
                ],
            ),
            expense("bob", "33.00", &[("carol", "16.50"), ("dora", "16.50")]),
            expense("carol", "7.77", &[("alice", "7.77")]),
        ];
        let settlements = [
            settlement("dora", "alice", "20.00"),
            settlement("carol", "bob", "10.00"),
        ];

        let balances = compute_net_balances(&group, &expenses, &settlements).unwrap();
        assert_conserved(&balances);
    }
}
