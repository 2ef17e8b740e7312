//! Domain records: members, split policies, expenses, settlements, transfers.

use crate::amount::Amount;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Opaque member identifier, unique within a group's membership set.
///
/// Ordering on the identifier string is the stable secondary sort key used
/// wherever deterministic output is required (simplifier tie-breaks, report
/// rows).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        MemberId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        MemberId(s.to_string())
    }
}

/// Opaque group identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        GroupId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        GroupId(s.to_string())
    }
}

/// Rule determining how an expense's total divides among members.
///
/// `Exact` and `Percentage` entries may name the same member more than
/// once; shares accumulate additively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SplitPolicy {
    /// Even division across all eligible members.
    Equal,

    /// Explicit per-member amounts; must sum to the expense total.
    Exact { entries: Vec<(MemberId, Amount)> },

    /// Explicit per-member percentages; must sum to 100.
    Percentage { entries: Vec<(MemberId, Decimal)> },
}

impl SplitPolicy {
    /// Short policy name used in error messages and logs.
    pub fn name(&self) -> &'static str {
        match self {
            SplitPolicy::Equal => "equal",
            SplitPolicy::Exact { .. } => "exact",
            SplitPolicy::Percentage { .. } => "percentage",
        }
    }
}

/// Per-member owed shares, keyed by member for deterministic iteration.
pub type Shares = BTreeMap<MemberId, Amount>;

/// Per-member signed net position, derived and never stored.
///
/// Positive means the member is owed money, negative means the member owes.
/// Sums to zero (within tolerance) across a group for any consistent
/// history.
pub type NetBalances = BTreeMap<MemberId, Amount>;

/// An immutable recorded expense.
///
/// `shares` is materialized by the split calculator when the expense is
/// recorded and is never recomputed: later policy or membership changes
/// must not alter historical shares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique expense ID
    pub id: Uuid,

    /// Group this expense belongs to
    pub group_id: GroupId,

    /// Total amount paid, strictly positive
    pub amount: Amount,

    /// Member who paid the full amount up front
    pub payer: MemberId,

    /// Split policy the shares were derived from
    pub policy: SplitPolicy,

    /// Materialized per-member owed shares
    pub shares: Shares,

    /// Recording timestamp
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Records a new expense with a fresh ID and the current timestamp.
    pub fn record(
        group_id: GroupId,
        payer: MemberId,
        amount: Amount,
        policy: SplitPolicy,
        shares: Shares,
    ) -> Self {
        Expense {
            id: Uuid::new_v4(),
            group_id,
            amount,
            payer,
            policy,
            shares,
            created_at: Utc::now(),
        }
    }
}

/// An immutable recorded real-world payment between two members.
///
/// Reduces what `from` owes `to`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    /// Unique settlement ID
    pub id: Uuid,

    /// Group this settlement belongs to
    pub group_id: GroupId,

    /// Member who paid
    pub from: MemberId,

    /// Member who was paid
    pub to: MemberId,

    /// Amount paid, strictly positive
    pub amount: Amount,

    /// Recording timestamp
    pub created_at: DateTime<Utc>,
}

impl Settlement {
    /// Records a new settlement with a fresh ID and the current timestamp.
    pub fn record(group_id: GroupId, from: MemberId, to: MemberId, amount: Amount) -> Self {
        Settlement {
            id: Uuid::new_v4(),
            group_id,
            from,
            to,
            amount,
            created_at: Utc::now(),
        }
    }
}

/// A suggested point-to-point payment produced by the simplifier.
///
/// Transient: derived from net balances, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transfer {
    /// Member who should pay
    pub from: MemberId,

    /// Member who should receive
    pub to: MemberId,

    /// Amount, rounded to 2 decimal places, strictly positive
    pub amount: Amount,
}

/// Display metadata for a member, supplied by the external user directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub display_name: String,
    pub handle: String,
}
