//! Error types for the ledger core and CLI surface.

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in the ledger core.
///
/// All core errors stem from bad input and are detected synchronously;
/// nothing here is transient or retryable. A failing expense or settlement
/// must never poison computation for other groups or subsequent calls.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A split entry references a member outside the eligible set
    #[error("split entry references non-member '{member}'")]
    InvalidMember { member: String },

    /// Exact amounts or percentages fail to sum to the expected total
    #[error("imbalanced {policy} split: entries sum to {actual}, expected {expected}")]
    ImbalancedSplit {
        policy: &'static str,
        actual: String,
        expected: String,
    },

    /// Unrecognized split policy tag in the textual history syntax
    #[error("unsupported split type '{tag}'")]
    UnsupportedSplitType { tag: String },

    /// An expense or settlement references a member absent from the group
    #[error("transaction references unknown member '{member}'")]
    UnknownMember { member: String },

    /// Simplifier input balances did not net to zero within tolerance
    #[error("balances do not net to zero: residual {residual} for '{member}'")]
    UnbalancedInput { member: String, residual: String },

    /// Equal split over an empty eligible member set
    #[error("cannot split an expense across zero members")]
    EmptyMemberSet,

    /// Expense or settlement amount is zero or negative
    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount { amount: String },

    /// The requested group does not exist upstream
    #[error("group '{group}' not found")]
    GroupNotFound { group: String },

    /// Malformed history row
    #[error("invalid history record: {message}")]
    InvalidRecord { message: String },

    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: expense-ledger <history.csv>")]
    MissingArgument,
}
