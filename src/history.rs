//! History file records: the CSV row model and textual split-policy syntax
//! used by the CLI harness.
//!
//! Three row kinds share one generic column layout:
//!
//! ```csv
//! kind,arg1,arg2,arg3
//! member,alice,Alice Smith,@alice
//! expense,alice,30.00,equal
//! expense,bob,40.00,exact:alice=25;bob=15
//! settlement,bob,alice,10.00
//! ```

use crate::amount::Amount;
use crate::error::{LedgerError, Result};
use crate::model::{MemberId, SplitPolicy, UserProfile};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

/// Raw history row as read from CSV.
///
/// Trailing columns are optional; kinds are matched case-insensitively
/// after trimming.
#[derive(Debug, Deserialize)]
pub struct HistoryRecord {
    /// Row kind: member, expense, settlement
    pub kind: String,

    #[serde(default)]
    pub arg1: Option<String>,

    #[serde(default)]
    pub arg2: Option<String>,

    #[serde(default)]
    pub arg3: Option<String>,
}

/// A parsed and validated history row.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEvent {
    /// Declares a group member, optionally with directory metadata.
    Member {
        id: MemberId,
        profile: Option<UserProfile>,
    },

    /// An expense paid by one member, to be split per the policy.
    Expense {
        payer: MemberId,
        amount: Amount,
        policy: SplitPolicy,
    },

    /// A real-world payment from one member to another.
    Settlement {
        from: MemberId,
        to: MemberId,
        amount: Amount,
    },
}

impl HistoryRecord {
    /// Parses the raw row into a typed event.
    pub fn parse(&self) -> Result<HistoryEvent> {
        let kind = self.kind.trim().to_lowercase();

        match kind.as_str() {
            "member" => {
                let id = MemberId::new(self.required(&self.arg1, "member id")?);
                let profile = match self.arg2.as_deref().map(str::trim) {
                    Some(name) if !name.is_empty() => Some(UserProfile {
                        display_name: name.to_string(),
                        handle: self
                            .arg3
                            .as_deref()
                            .map(|h| h.trim().to_string())
                            .unwrap_or_default(),
                    }),
                    _ => None,
                };
                Ok(HistoryEvent::Member { id, profile })
            }
            "expense" => {
                let payer = MemberId::new(self.required(&self.arg1, "payer")?);
                let amount = parse_amount(&self.required(&self.arg2, "amount")?)?;
                let policy = parse_policy(&self.required(&self.arg3, "split policy")?)?;
                Ok(HistoryEvent::Expense {
                    payer,
                    amount,
                    policy,
                })
            }
            "settlement" => {
                let from = MemberId::new(self.required(&self.arg1, "payer")?);
                let to = MemberId::new(self.required(&self.arg2, "recipient")?);
                let amount = parse_amount(&self.required(&self.arg3, "amount")?)?;
                if from == to {
                    return Err(LedgerError::InvalidRecord {
                        message: format!("settlement from '{from}' to itself"),
                    });
                }
                Ok(HistoryEvent::Settlement { from, to, amount })
            }
            other => Err(LedgerError::InvalidRecord {
                message: format!("unknown record kind '{other}'"),
            }),
        }
    }

    fn required(&self, field: &Option<String>, name: &str) -> Result<String> {
        match field.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(LedgerError::InvalidRecord {
                message: format!("missing {name}"),
            }),
        }
    }
}

/// Parses a strictly positive monetary amount.
fn parse_amount(s: &str) -> Result<Amount> {
    let amount = Amount::from_str(s).map_err(|e| LedgerError::InvalidRecord {
        message: format!("bad amount '{s}': {e}"),
    })?;
    if !amount.is_positive() {
        return Err(LedgerError::NonPositiveAmount {
            amount: amount.to_string(),
        });
    }
    Ok(amount)
}

/// Parses the textual split-policy syntax.
///
/// `equal`, `exact:<id>=<amount>[;...]`, or `percent:<id>=<pct>[;...]`.
/// This is the one place an unknown policy tag can exist, so
/// [`LedgerError::UnsupportedSplitType`] is produced here.
pub fn parse_policy(s: &str) -> Result<SplitPolicy> {
    let raw = s.trim();
    let (tag, rest) = match raw.split_once(':') {
        Some((tag, rest)) => (tag.trim(), Some(rest)),
        None => (raw, None),
    };

    match tag.to_lowercase().as_str() {
        "equal" => Ok(SplitPolicy::Equal),
        "exact" => {
            let entries = parse_entries(rest.unwrap_or(""), |v| {
                Amount::from_str(v).map_err(|e| e.to_string())
            })?;
            Ok(SplitPolicy::Exact { entries })
        }
        "percent" | "percentage" => {
            let entries = parse_entries(rest.unwrap_or(""), |v| {
                Decimal::from_str(v.trim()).map_err(|e| e.to_string())
            })?;
            Ok(SplitPolicy::Percentage { entries })
        }
        other => Err(LedgerError::UnsupportedSplitType {
            tag: other.to_string(),
        }),
    }
}

/// Parses `<id>=<value>` pairs separated by semicolons.
fn parse_entries<T, F>(s: &str, parse_value: F) -> Result<Vec<(MemberId, T)>>
where
    F: Fn(&str) -> std::result::Result<T, String>,
{
    let mut entries = Vec::new();

    for pair in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (id, value) = pair.split_once('=').ok_or_else(|| LedgerError::InvalidRecord {
            message: format!("bad split entry '{pair}', expected <member>=<value>"),
        })?;
        let id = id.trim();
        if id.is_empty() {
            return Err(LedgerError::InvalidRecord {
                message: format!("bad split entry '{pair}', empty member id"),
            });
        }
        let value = parse_value(value).map_err(|e| LedgerError::InvalidRecord {
            message: format!("bad split entry '{pair}': {e}"),
        })?;
        entries.push((MemberId::new(id), value));
    }

    if entries.is_empty() {
        return Err(LedgerError::InvalidRecord {
            message: "split policy has no entries".to_string(),
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str, args: &[&str]) -> HistoryRecord {
        let mut iter = args.iter().map(|s| s.to_string());
        HistoryRecord {
            kind: kind.to_string(),
            arg1: iter.next(),
            arg2: iter.next(),
            arg3: iter.next(),
        }
    }

    #[test]
    fn test_parse_member_with_profile() {
        let event = record("member", &["alice", "Alice Smith", "@alice"])
            .parse()
            .unwrap();

        assert_eq!(
            event,
            HistoryEvent::Member {
                id: MemberId::from("alice"),
                profile: Some(UserProfile {
                    display_name: "Alice Smith".to_string(),
                    handle: "@alice".to_string(),
                }),
            }
        );
    }

    #[test]
    fn test_parse_member_bare() {
        let event = record("member", &["bob"]).parse().unwrap();
        assert_eq!(
            event,
            HistoryEvent::Member {
                id: MemberId::from("bob"),
                profile: None,
            }
        );

        // Empty trailing columns behave the same as absent ones.
        let event = record("member", &["bob", "", ""]).parse().unwrap();
        assert!(matches!(event, HistoryEvent::Member { profile: None, .. }));
    }

    #[test]
    fn test_parse_expense_equal() {
        let event = record("expense", &["alice", "30.00", "equal"])
            .parse()
            .unwrap();

        match event {
            HistoryEvent::Expense {
                payer,
                amount,
                policy,
            } => {
                assert_eq!(payer, MemberId::from("alice"));
                assert_eq!(amount.to_string(), "30.00");
                assert_eq!(policy, SplitPolicy::Equal);
            }
            other => panic!("expected expense, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_exact_policy_entries() {
        let policy = parse_policy("exact:alice=25.00; bob=15.00").unwrap();
        assert_eq!(
            policy,
            SplitPolicy::Exact {
                entries: vec![
                    (MemberId::from("alice"), Amount::from_str("25.00").unwrap()),
                    (MemberId::from("bob"), Amount::from_str("15.00").unwrap()),
                ],
            }
        );
    }

    #[test]
    fn test_parse_percent_policy_entries() {
        let policy = parse_policy("percent:alice=50;bob=50").unwrap();
        match policy {
            SplitPolicy::Percentage { entries } => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].1, Decimal::from(50));
            }
            other => panic!("expected percentage, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_settlement() {
        let event = record("settlement", &["bob", "alice", "10.00"])
            .parse()
            .unwrap();

        assert_eq!(
            event,
            HistoryEvent::Settlement {
                from: MemberId::from("bob"),
                to: MemberId::from("alice"),
                amount: Amount::from_str("10.00").unwrap(),
            }
        );
    }

    #[test]
    fn test_parse_handles_whitespace_and_case() {
        let event = record("  Expense  ", &[" alice ", " 30.00 ", " EQUAL "])
            .parse()
            .unwrap();
        assert!(matches!(event, HistoryEvent::Expense { .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let result = record("refund", &["alice", "5.00"]).parse();
        assert!(matches!(result, Err(LedgerError::InvalidRecord { .. })));
    }

    #[test]
    fn test_parse_rejects_unknown_policy_tag() {
        let result = parse_policy("byweight:alice=2");
        assert!(matches!(
            result,
            Err(LedgerError::UnsupportedSplitType { tag }) if tag == "byweight"
        ));
    }

    #[test]
    fn test_parse_rejects_non_positive_amount() {
        let result = record("expense", &["alice", "-3.00", "equal"]).parse();
        assert!(matches!(result, Err(LedgerError::NonPositiveAmount { .. })));

        let result = record("expense", &["alice", "0", "equal"]).parse();
        assert!(matches!(result, Err(LedgerError::NonPositiveAmount { .. })));
    }

    #[test]
    fn test_parse_rejects_self_settlement() {
        let result = record("settlement", &["alice", "alice", "5.00"]).parse();
        assert!(matches!(result, Err(LedgerError::InvalidRecord { .. })));
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let result = record("expense", &["alice"]).parse();
        assert!(matches!(result, Err(LedgerError::InvalidRecord { .. })));

        let result = record("member", &[]).parse();
        assert!(matches!(result, Err(LedgerError::InvalidRecord { .. })));
    }

    #[test]
    fn test_parse_rejects_malformed_entry() {
        let result = parse_policy("exact:alice25.00");
        assert!(matches!(result, Err(LedgerError::InvalidRecord { .. })));

        let result = parse_policy("exact:");
        assert!(matches!(result, Err(LedgerError::InvalidRecord { .. })));
    }
}
