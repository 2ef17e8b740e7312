//! # Expense Ledger
//!
//! Tracks shared group expenses and computes who owes whom: a stream of
//! recorded expenses (with configurable split policies) and manual
//! settlements folds into per-member net balances, which reduce to a short
//! deterministic list of suggested transfers that make everyone even.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: `rust_decimal` internally, rounded to 2
//!   decimal places only at output boundaries
//! - **Pure core**: split calculation, balance aggregation, and settlement
//!   simplification are side-effect-free functions over full snapshots
//! - **Strict invariants**: net balances always sum to ~zero; simplifier
//!   residuals surface as errors instead of being dropped
//! - **Deterministic output**: ties broken by member identifier
//!
//! ## Example
//!
//! ```no_run
//! use expense_ledger::LedgerEngine;
//! use std::io::Cursor;
//!
//! let csv = "kind,arg1,arg2,arg3\nmember,alice,,\nmember,bob,,\nexpense,alice,30.00,equal\n";
//! let mut engine = LedgerEngine::new();
//! engine.process_csv(Cursor::new(csv)).unwrap();
//! engine.write_output(std::io::stdout()).unwrap();
//! ```

pub mod amount;
pub mod balance;
pub mod engine;
pub mod error;
pub mod history;
pub mod model;
pub mod service;
pub mod simplify;
pub mod split;
pub mod store;

pub use amount::Amount;
pub use balance::compute_net_balances;
pub use engine::LedgerEngine;
pub use error::{LedgerError, Result};
pub use model::{
    Expense, GroupId, MemberId, NetBalances, Settlement, Shares, SplitPolicy, Transfer,
    UserProfile,
};
pub use service::{GroupBalanceReport, LedgerService, LedgerStore, MemberSummary, UserDirectory};
pub use simplify::simplify;
pub use split::compute_shares;
pub use store::MemoryStore;
