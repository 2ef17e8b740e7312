//! Ledger service: composes the aggregator and simplifier over snapshots
//! fetched from external collaborators.
//!
//! The collaborators are ports. Storage must hand back a consistent
//! snapshot per call (an expense and its shares read as a unit); given
//! that, every query is an independent pure computation and needs no
//! coordination.

use crate::amount::Amount;
use crate::balance::compute_net_balances;
use crate::error::{LedgerError, Result};
use crate::model::{Expense, GroupId, MemberId, NetBalances, Settlement, Transfer, UserProfile};
use crate::simplify::simplify;
use std::collections::{BTreeSet, HashMap};

/// Read access to a group's membership and transaction histories.
///
/// Each method returns a complete snapshot for one group; `members`
/// returns `None` for a group that does not exist.
pub trait LedgerStore {
    fn members(&self, group: &GroupId) -> Option<BTreeSet<MemberId>>;
    fn expenses(&self, group: &GroupId) -> Vec<Expense>;
    fn settlements(&self, group: &GroupId) -> Vec<Settlement>;
}

/// Display metadata lookup, used only for presentation enrichment.
pub trait UserDirectory {
    fn profile(&self, member: &MemberId) -> Option<UserProfile>;
}

impl UserDirectory for HashMap<MemberId, UserProfile> {
    fn profile(&self, member: &MemberId) -> Option<UserProfile> {
        self.get(member).cloned()
    }
}

impl<S: LedgerStore + ?Sized> LedgerStore for &S {
    fn members(&self, group: &GroupId) -> Option<BTreeSet<MemberId>> {
        (**self).members(group)
    }

    fn expenses(&self, group: &GroupId) -> Vec<Expense> {
        (**self).expenses(group)
    }

    fn settlements(&self, group: &GroupId) -> Vec<Settlement> {
        (**self).settlements(group)
    }
}

impl<D: UserDirectory + ?Sized> UserDirectory for &D {
    fn profile(&self, member: &MemberId) -> Option<UserProfile> {
        (**self).profile(member)
    }
}

/// One member's enriched position in a balance report.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberSummary {
    pub member: MemberId,

    /// Directory display name, or the raw member id when unknown.
    pub display_name: String,

    /// Directory handle, or empty when unknown.
    pub handle: String,

    /// Net balance rounded to 2 decimal places for presentation.
    pub net: Amount,
}

/// Full balance answer for one group.
#[derive(Debug, Clone)]
pub struct GroupBalanceReport {
    /// Raw per-member net balances.
    pub net_balances: NetBalances,

    /// Suggested transfers that zero the balances out.
    pub transfers: Vec<Transfer>,

    /// Per-member detail in member-id order.
    pub members: Vec<MemberSummary>,
}

/// Orchestration over the core computations. Read-only.
pub struct LedgerService<S, D> {
    store: S,
    directory: D,
}

impl<S: LedgerStore, D: UserDirectory> LedgerService<S, D> {
    pub fn new(store: S, directory: D) -> Self {
        LedgerService { store, directory }
    }

    /// Computes a group's net balances and suggested settlement transfers.
    ///
    /// # Errors
    ///
    /// [`LedgerError::GroupNotFound`] if the group does not exist upstream;
    /// otherwise whatever the aggregator or simplifier reject.
    pub fn group_balances(&self, group: &GroupId) -> Result<GroupBalanceReport> {
        let members = self
            .store
            .members(group)
            .ok_or_else(|| LedgerError::GroupNotFound {
                group: group.to_string(),
            })?;
        let expenses = self.store.expenses(group);
        let settlements = self.store.settlements(group);

        let net_balances = compute_net_balances(&members, &expenses, &settlements)?;
        let transfers = simplify(&net_balances)?;

        let members = net_balances
            .iter()
            .map(|(member, net)| {
                let profile = self.directory.profile(member);
                let (display_name, handle) = match profile {
                    Some(p) => (p.display_name, p.handle),
                    None => (member.to_string(), String::new()),
                };
                MemberSummary {
                    member: member.clone(),
                    display_name,
                    handle,
                    net: net.round2(),
                }
            })
            .collect();

        Ok(GroupBalanceReport {
            net_balances,
            transfers,
            members,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SplitPolicy;
    use crate::store::MemoryStore;
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn sample_store() -> MemoryStore {
        let group = GroupId::from("trip");
        let mut store = MemoryStore::new();
        store.add_member(&group, MemberId::from("alice"));
        store.add_member(&group, MemberId::from("bob"));
        store
            .record_expense(
                &group,
                MemberId::from("alice"),
                amt("30.00"),
                SplitPolicy::Equal,
            )
            .unwrap();
        store
    }

    fn sample_directory() -> HashMap<MemberId, UserProfile> {
        [(
            MemberId::from("alice"),
            UserProfile {
                display_name: "Alice Smith".to_string(),
                handle: "@alice".to_string(),
            },
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_group_balances_composes_core() {
        let service = LedgerService::new(sample_store(), sample_directory());
        let report = service.group_balances(&GroupId::from("trip")).unwrap();

        assert_eq!(report.net_balances[&MemberId::from("alice")], amt("15.00"));
        assert_eq!(report.net_balances[&MemberId::from("bob")], amt("-15.00"));
        assert_eq!(report.transfers.len(), 1);
        assert_eq!(report.transfers[0].from, MemberId::from("bob"));
        assert_eq!(report.transfers[0].amount, amt("15.00"));
    }

    #[test]
    fn test_member_detail_enrichment_with_fallback() {
        let service = LedgerService::new(sample_store(), sample_directory());
        let report = service.group_balances(&GroupId::from("trip")).unwrap();

        let alice = &report.members[0];
        assert_eq!(alice.display_name, "Alice Smith");
        assert_eq!(alice.handle, "@alice");
        assert_eq!(alice.net, amt("15.00"));

        // bob has no directory entry: raw id, empty handle.
        let bob = &report.members[1];
        assert_eq!(bob.display_name, "bob");
        assert_eq!(bob.handle, "");
    }

    #[test]
    fn test_missing_group_propagates_not_found() {
        let directory: HashMap<MemberId, UserProfile> = HashMap::new();
        let service = LedgerService::new(MemoryStore::new(), directory);
        let result = service.group_balances(&GroupId::from("nowhere"));

        assert!(matches!(
            result,
            Err(LedgerError::GroupNotFound { group }) if group == "nowhere"
        ));
    }
}
