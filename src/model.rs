//! Core domain types for the wallet ledger.

use chrono::{DateTime, Utc};

use crate::Amount;

/// User identifier, unique and stable for the user's lifetime.
pub type UserId = u64;

/// Direction of a ledger entry relative to the wallet it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Funds flowing into the wallet.
    Credit,
    /// Funds flowing out of the wallet.
    Debit,
}

/// Settlement status of a ledger entry.
///
/// Entries are only ever recorded once their balance effect has committed,
/// and the reward milestone count is defined over completed debits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryStatus {
    #[default]
    Completed,
}

/// One immutable ledger entry: a single directional balance change.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    /// Magnitude of the change, always positive.
    pub amount: Amount,
    pub direction: Direction,
    /// Human-readable description shown in transaction history.
    pub message: String,
    pub status: EntryStatus,
    /// Assigned when the entry is appended.
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(amount: Amount, direction: Direction, message: impl Into<String>) -> Self {
        Self {
            amount,
            direction,
            message: message.into(),
            status: EntryStatus::Completed,
            timestamp: Utc::now(),
        }
    }
}

/// Registered user as seen by the transfer core.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub bank_name: Option<String>,
    /// Wallet alias in `phone@bank` form, unique when present.
    pub paythm_id: Option<String>,
}

/// Registration input; the directory assigns the id and derives the alias.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub bank_name: Option<String>,
}

/// Mock external bank account used as the funding source for "add money".
#[derive(Debug, Clone)]
pub struct BankAccount {
    pub bank_name: String,
    /// Masked display form, e.g. "**** 4532".
    pub account_number: String,
    pub balance: Amount,
    pub primary: bool,
}

/// A mutating wallet operation, as fed to [`Engine::run`](crate::Engine::run).
#[derive(Debug, Clone)]
pub enum Operation {
    /// Move money from the user's mock bank account into the wallet.
    Fund { user: UserId, amount: Amount },
    /// Peer transfer; the receiver is resolved from the identifier string.
    Transfer {
        user: UserId,
        to: String,
        amount: Amount,
    },
    /// Debit-only send to an external UPI address.
    TransferUpi {
        user: UserId,
        address: String,
        amount: Amount,
    },
    /// Debit-only send to external bank account details.
    TransferBank {
        user: UserId,
        recipient: String,
        account_number: String,
        amount: Amount,
    },
}
