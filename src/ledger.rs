//! Ledger store: wallet balances and their append-only entry logs.
//!
//! Every balance change in the system funnels through [`Ledger::apply`],
//! which commits a whole set of mutations and their entries atomically or
//! not at all. Wallet cells are individually locked so operations touching
//! disjoint wallets proceed independently, while mutations on the same
//! wallet serialize.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use thiserror::Error;

use crate::Amount;
use crate::model::{Direction, EntryStatus, LedgerEntry, UserId};

/// Error from ledger primitives.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("wallet for user {0} not found")]
    WalletNotFound(UserId),

    #[error("wallet for user {0} already exists")]
    WalletExists(UserId),

    #[error("insufficient balance for user {user}: available {available}, requested {requested}")]
    InsufficientBalance {
        user: UserId,
        available: Amount,
        requested: Amount,
    },

    /// Concurrent-write conflict; the whole operation may be retried since
    /// nothing was applied.
    #[error("conflicting concurrent mutation")]
    Conflict,
}

/// One balance change to apply: a positive amount, a direction, and the
/// entry to append alongside it.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub user: UserId,
    pub amount: Amount,
    pub direction: Direction,
    pub message: String,
}

impl Mutation {
    pub fn credit(user: UserId, amount: Amount, message: impl Into<String>) -> Self {
        Self {
            user,
            amount,
            direction: Direction::Credit,
            message: message.into(),
        }
    }

    pub fn debit(user: UserId, amount: Amount, message: impl Into<String>) -> Self {
        Self {
            user,
            amount,
            direction: Direction::Debit,
            message: message.into(),
        }
    }
}

/// Post-commit observations captured while the wallet locks were still
/// held, so the reward policy reads its own write.
#[derive(Debug)]
pub struct Receipt {
    debit_counts: HashMap<UserId, u64>,
}

impl Receipt {
    /// Lifetime completed-debit count of the given wallet, as of the commit
    /// this receipt belongs to.
    pub fn debit_count(&self, user: UserId) -> u64 {
        self.debit_counts.get(&user).copied().unwrap_or(0)
    }
}

/// Per-wallet summary row for reporting.
#[derive(Debug, Clone)]
pub struct WalletSummary {
    pub user: UserId,
    pub balance: Amount,
    pub credits: u64,
    pub debits: u64,
}

#[derive(Debug, Default)]
struct WalletCell {
    balance: Amount,
    entries: Vec<LedgerEntry>,
}

impl WalletCell {
    fn completed_count(&self, direction: Direction) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.direction == direction && e.status == EntryStatus::Completed)
            .count() as u64
    }
}

/// The wallet store.
#[derive(Default)]
pub struct Ledger {
    wallets: RwLock<HashMap<UserId, Arc<Mutex<WalletCell>>>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty wallet for the user. Happens at registration, in the
    /// same boundary as the directory insert.
    pub fn open_wallet(&self, user: UserId) -> Result<(), LedgerError> {
        let mut wallets = self
            .wallets
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if wallets.contains_key(&user) {
            return Err(LedgerError::WalletExists(user));
        }
        wallets.insert(user, Arc::new(Mutex::new(WalletCell::default())));
        Ok(())
    }

    /// Apply a set of mutations and their entry appends as one atomic unit.
    ///
    /// Wallet locks are taken in ascending user-id order regardless of
    /// sender/receiver role, so two transfers touching the same pair of
    /// wallets can never deadlock. Validation runs against every affected
    /// wallet before anything is written; any failure leaves all wallets
    /// untouched.
    pub fn apply(&self, mutations: Vec<Mutation>) -> Result<Receipt, LedgerError> {
        // Group by wallet; BTreeMap gives the fixed ascending lock order.
        let mut grouped: BTreeMap<UserId, Vec<Mutation>> = BTreeMap::new();
        for m in mutations {
            grouped.entry(m.user).or_default().push(m);
        }

        let cells: Vec<(UserId, Arc<Mutex<WalletCell>>)> = {
            let wallets = self.wallets.read().map_err(|_| LedgerError::Conflict)?;
            grouped
                .keys()
                .map(|user| {
                    wallets
                        .get(user)
                        .cloned()
                        .map(|cell| (*user, cell))
                        .ok_or(LedgerError::WalletNotFound(*user))
                })
                .collect::<Result<_, _>>()?
        };

        let mut guards = Vec::with_capacity(cells.len());
        for (user, cell) in &cells {
            let guard = cell.lock().map_err(|_| LedgerError::Conflict)?;
            guards.push((*user, guard));
        }

        // Validate every wallet's running balance before touching any.
        for (user, guard) in &guards {
            let mut balance = guard.balance;
            for m in &grouped[user] {
                match m.direction {
                    Direction::Credit => balance += m.amount,
                    Direction::Debit => {
                        if balance < m.amount {
                            return Err(LedgerError::InsufficientBalance {
                                user: *user,
                                available: balance,
                                requested: m.amount,
                            });
                        }
                        balance -= m.amount;
                    }
                }
            }
        }

        // Commit, then read each wallet's debit count under the same locks.
        let mut debit_counts = HashMap::with_capacity(guards.len());
        for (user, guard) in &mut guards {
            for m in &grouped[user] {
                match m.direction {
                    Direction::Credit => guard.balance += m.amount,
                    Direction::Debit => guard.balance -= m.amount,
                }
                guard
                    .entries
                    .push(LedgerEntry::new(m.amount, m.direction, m.message.clone()));
            }
            debit_counts.insert(*user, guard.completed_count(Direction::Debit));
        }

        Ok(Receipt { debit_counts })
    }

    pub fn balance(&self, user: UserId) -> Result<Amount, LedgerError> {
        self.with_cell(user, |cell| cell.balance)
    }

    /// Full entry history of the user's wallet, oldest first.
    pub fn history(&self, user: UserId) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.with_cell(user, |cell| cell.entries.clone())
    }

    /// Lifetime count of completed entries in the given direction.
    pub fn completed_count(&self, user: UserId, direction: Direction) -> Result<u64, LedgerError> {
        self.with_cell(user, |cell| cell.completed_count(direction))
    }

    /// Summary of every wallet, sorted by user id.
    pub fn snapshot(&self) -> Vec<WalletSummary> {
        let wallets = self.wallets.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<WalletSummary> = wallets
            .iter()
            .map(|(user, cell)| {
                let cell = cell.lock().unwrap_or_else(PoisonError::into_inner);
                WalletSummary {
                    user: *user,
                    balance: cell.balance,
                    credits: cell.completed_count(Direction::Credit),
                    debits: cell.completed_count(Direction::Debit),
                }
            })
            .collect();
        rows.sort_by_key(|row| row.user);
        rows
    }

    fn with_cell<T>(&self, user: UserId, f: impl FnOnce(&WalletCell) -> T) -> Result<T, LedgerError> {
        let cell = {
            let wallets = self.wallets.read().map_err(|_| LedgerError::Conflict)?;
            wallets
                .get(&user)
                .cloned()
                .ok_or(LedgerError::WalletNotFound(user))?
        };
        let guard = cell.lock().map_err(|_| LedgerError::Conflict)?;
        Ok(f(&guard))
    }
}
