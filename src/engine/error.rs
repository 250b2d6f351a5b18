//! Error types for wallet operations.

use thiserror::Error;

use crate::Amount;
use crate::directory::DirectoryError;
use crate::ledger::LedgerError;
use crate::model::UserId;

/// Top-level error returned by [`Engine::apply`](super::Engine::apply).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("funding failed: {0}")]
    Funding(#[from] FundingError),

    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("{0}")]
    Directory(#[from] DirectoryError),

    #[error("user {0} not found")]
    UserNotFound(UserId),
}

/// Error during a peer transfer or one of its debit-only variants.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("amount must be positive, got {0}")]
    InvalidAmount(Amount),

    #[error("sender {0} not found")]
    SenderNotFound(UserId),

    #[error("no user matches receiver identifier '{0}'")]
    ReceiverNotFound(String),

    #[error("user {0} cannot send money to themselves")]
    SelfTransfer(UserId),

    #[error("insufficient balance for user {user}: available {available}, requested {requested}")]
    InsufficientBalance {
        user: UserId,
        available: Amount,
        requested: Amount,
    },
}

/// Error while adding money from the mock bank account.
#[derive(Debug, Error)]
pub enum FundingError {
    #[error("amount must be positive, got {0}")]
    InvalidAmount(Amount),

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("insufficient bank balance: available {available}, requested {requested}")]
    InsufficientBankBalance {
        available: Amount,
        requested: Amount,
    },
}
