//! In-memory ledger store.
//!
//! Persistence technology is out of scope for the core; this is the
//! stand-in collaborator used by the CLI harness and the test suite.
//! Shares are materialized through the split calculator when an expense is
//! recorded, never on read.

use crate::amount::Amount;
use crate::error::{LedgerError, Result};
use crate::model::{Expense, GroupId, MemberId, Settlement, SplitPolicy};
use crate::service::LedgerStore;
use crate::split::compute_shares;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

#[derive(Debug, Default)]
struct GroupLedger {
    members: BTreeSet<MemberId>,
    expenses: Vec<Expense>,
    settlements: Vec<Settlement>,
}

/// HashMap-backed store implementing the [`LedgerStore`] port.
#[derive(Debug, Default)]
pub struct MemoryStore {
    groups: HashMap<GroupId, GroupLedger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Creates an empty group if it does not exist yet.
    pub fn create_group(&mut self, group: &GroupId) {
        self.groups.entry(group.clone()).or_default();
    }

    /// Adds a member to a group, creating the group on first use.
    pub fn add_member(&mut self, group: &GroupId, member: MemberId) {
        self.groups
            .entry(group.clone())
            .or_default()
            .members
            .insert(member);
    }

    /// Records an expense, computing and storing its shares.
    ///
    /// The full group membership is the eligible set for the split.
    /// Validation failures leave the store untouched.
    pub fn record_expense(
        &mut self,
        group: &GroupId,
        payer: MemberId,
        amount: Amount,
        policy: SplitPolicy,
    ) -> Result<Uuid> {
        if !amount.is_positive() {
            return Err(LedgerError::NonPositiveAmount {
                amount: amount.to_string(),
            });
        }

        let ledger = self
            .groups
            .get_mut(group)
            .ok_or_else(|| LedgerError::GroupNotFound {
                group: group.to_string(),
            })?;

        if !ledger.members.contains(&payer) {
            return Err(LedgerError::UnknownMember {
                member: payer.to_string(),
            });
        }

        let shares = compute_shares(&ledger.members, amount, &policy)?;
        let expense = Expense::record(group.clone(), payer, amount, policy, shares);
        let id = expense.id;
        ledger.expenses.push(expense);
        Ok(id)
    }

    /// Records a settlement between two group members.
    pub fn record_settlement(
        &mut self,
        group: &GroupId,
        from: MemberId,
        to: MemberId,
        amount: Amount,
    ) -> Result<Uuid> {
        if !amount.is_positive() {
            return Err(LedgerError::NonPositiveAmount {
                amount: amount.to_string(),
            });
        }

        let ledger = self
            .groups
            .get_mut(group)
            .ok_or_else(|| LedgerError::GroupNotFound {
                group: group.to_string(),
            })?;

        for party in [&from, &to] {
            if !ledger.members.contains(party) {
                return Err(LedgerError::UnknownMember {
                    member: party.to_string(),
                });
            }
        }

        let settlement = Settlement::record(group.clone(), from, to, amount);
        let id = settlement.id;
        ledger.settlements.push(settlement);
        Ok(id)
    }
}

impl LedgerStore for MemoryStore {
    fn members(&self, group: &GroupId) -> Option<BTreeSet<MemberId>> {
        self.groups.get(group).map(|g| g.members.clone())
    }

    fn expenses(&self, group: &GroupId) -> Vec<Expense> {
        self.groups
            .get(group)
            .map(|g| g.expenses.clone())
            .unwrap_or_default()
    }

    fn settlements(&self, group: &GroupId) -> Vec<Settlement> {
        self.groups
            .get(group)
            .map(|g| g.settlements.clone())
            .unwrap_or_default()
    }
}
