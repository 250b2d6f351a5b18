//! Wallet engine.
//!
//! The two mutating entry points — peer transfers and funding — both funnel
//! through the ledger's atomic mutation primitive, and every successful
//! debit feeds the milestone reward policy. Also drives an async stream of
//! operations, logging applied/skipped outcomes without stopping.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::Amount;
use crate::directory::Directory;
use crate::ledger::{Ledger, LedgerError, Mutation, WalletSummary};
use crate::model::{BankAccount, LedgerEntry, NewUser, Operation, UserId, UserProfile};

pub mod resolver;
pub use resolver::{IdentifierKind, classify, resolve};

mod error;
pub use error::{EngineError, FundingError, TransferError};

/// Mock bank accounts start with this balance.
const DEFAULT_BANK_BALANCE: Amount = Amount::from_scaled(5_000_000); // 50000.00
const DEFAULT_BANK_NAME: &str = "State Bank of India";

/// One-time cashback after the fifth completed debit.
const FIRST_FIVE_BONUS: Amount = Amount::from_scaled(5_000); // 50.00
/// Recurring bonus on every tenth completed debit thereafter.
const LOYALTY_BONUS: Amount = Amount::from_scaled(1_000); // 10.00

/// The wallet engine.
///
/// Owns the identity directory, the ledger, and the mock bank accounts
/// used as funding sources.
#[derive(Default)]
pub struct Engine {
    directory: Directory,
    ledger: Ledger,
    banks: Mutex<HashMap<UserId, BankAccount>>,
}

/// Public API
impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the engine over the given operation stream.
    pub async fn run(&self, mut stream: impl Stream<Item = Operation> + Unpin) {
        while let Some(op) = stream.next().await {
            // any error should not stop the engine, so we just ignore the application result
            let _ = self.apply(op);
        }
    }

    /// Register a user and open their wallet in the same boundary.
    pub fn register(&self, new: NewUser) -> Result<UserProfile, EngineError> {
        let profile = self.directory.register(new)?;
        self.ledger.open_wallet(profile.id)?;
        Ok(profile)
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Current wallet balance.
    pub fn balance(&self, user: UserId) -> Result<Amount, EngineError> {
        self.require_user(user)?;
        Ok(self.ledger.balance(user)?)
    }

    /// Full transaction history of the user's wallet, oldest first.
    pub fn history(&self, user: UserId) -> Result<Vec<LedgerEntry>, EngineError> {
        self.require_user(user)?;
        Ok(self.ledger.history(user)?)
    }

    /// Per-wallet summaries, sorted by user id.
    pub fn snapshot(&self) -> Vec<WalletSummary> {
        self.ledger.snapshot()
    }

    /// Peer transfer: resolve the receiver from the identifier, then move
    /// `amount` between the two wallets and append the mirrored entry pair
    /// as one atomic unit. Feeds the reward policy on success.
    pub fn transfer(
        &self,
        sender: UserId,
        identifier: &str,
        amount: Amount,
    ) -> Result<(), EngineError> {
        if !amount.is_positive() {
            return Err(TransferError::InvalidAmount(amount).into());
        }
        let sender_profile = self
            .directory
            .find_by_id(sender)
            .ok_or(TransferError::SenderNotFound(sender))?;
        let receiver = resolver::resolve(&self.directory, identifier)
            .ok_or_else(|| TransferError::ReceiverNotFound(identifier.to_string()))?;
        if receiver.id == sender {
            return Err(TransferError::SelfTransfer(sender).into());
        }

        let receipt = self
            .ledger
            .apply(vec![
                Mutation::debit(sender, amount, format!("Sent to {}", receiver.full_name)),
                Mutation::credit(
                    receiver.id,
                    amount,
                    format!("Received from {}", sender_profile.full_name),
                ),
            ])
            .map_err(Self::map_transfer_ledger)?;

        self.apply_rewards(sender, receipt.debit_count(sender))
    }

    /// Debit-only send to an external UPI address; no receiving wallet.
    pub fn transfer_upi(
        &self,
        sender: UserId,
        address: &str,
        amount: Amount,
    ) -> Result<(), EngineError> {
        self.debit_out(sender, amount, format!("Sent via UPI to {address}"))
    }

    /// Debit-only send to external bank account details.
    pub fn transfer_bank(
        &self,
        sender: UserId,
        recipient: &str,
        account_number: &str,
        amount: Amount,
    ) -> Result<(), EngineError> {
        self.debit_out(
            sender,
            amount,
            format!("Bank transfer to {recipient} (Acc: {account_number})"),
        )
    }

    /// Add money: debit the user's mock bank account and credit the wallet.
    /// Returns the new wallet balance. Never triggers rewards.
    pub fn fund(&self, user: UserId, amount: Amount) -> Result<Amount, EngineError> {
        if !amount.is_positive() {
            return Err(FundingError::InvalidAmount(amount).into());
        }
        let profile = self
            .directory
            .find_by_id(user)
            .ok_or(FundingError::UserNotFound(user))?;

        self.with_bank(&profile, |ledger, bank| {
            if bank.balance < amount {
                return Err(FundingError::InsufficientBankBalance {
                    available: bank.balance,
                    requested: amount,
                }
                .into());
            }
            // Credit the wallet before touching the bank balance: the
            // wallet-side append is the only step that can fail, and a
            // failure there must leave the bank unchanged.
            ledger.apply(vec![Mutation::credit(
                user,
                amount,
                format!("Added from {}", bank.bank_name),
            )])?;
            bank.balance -= amount;
            Ok(())
        })?;

        Ok(self.ledger.balance(user)?)
    }

    /// The user's primary mock bank account, created on first use.
    pub fn bank_details(&self, user: UserId) -> Result<BankAccount, EngineError> {
        let profile = self
            .directory
            .find_by_id(user)
            .ok_or(EngineError::UserNotFound(user))?;
        self.with_bank(&profile, |_, bank| Ok(bank.clone()))
    }

    /// Apply a single operation, logging the outcome.
    pub fn apply(&self, op: Operation) -> Result<(), EngineError> {
        match &op {
            Operation::Fund { user, amount } => {
                let result = self.fund(*user, *amount).map(|_| ());
                Self::log_result("fund", *user, *amount, &result);
                result?;
            }
            Operation::Transfer { user, to, amount } => {
                let result = self.transfer(*user, to, *amount);
                Self::log_result("transfer", *user, *amount, &result);
                result?;
            }
            Operation::TransferUpi {
                user,
                address,
                amount,
            } => {
                let result = self.transfer_upi(*user, address, *amount);
                Self::log_result("upi transfer", *user, *amount, &result);
                result?;
            }
            Operation::TransferBank {
                user,
                recipient,
                account_number,
                amount,
            } => {
                let result = self.transfer_bank(*user, recipient, account_number, *amount);
                Self::log_result("bank transfer", *user, *amount, &result);
                result?;
            }
        }
        Ok(())
    }
}

/// Private API
impl Engine {
    /// Small helper to log `apply` results
    fn log_result(op: &str, user: UserId, amount: Amount, result: &Result<(), EngineError>) {
        match result {
            Ok(()) => {
                info!(
                    user = %user,
                    amount = %amount,
                    "{op} applied"
                );
            }
            Err(e) => {
                info!(
                    user = %user,
                    amount = %amount,
                    reason = %e,
                    "{op} skipped"
                );
            }
        }
    }

    fn require_user(&self, user: UserId) -> Result<(), EngineError> {
        self.directory
            .find_by_id(user)
            .map(|_| ())
            .ok_or(EngineError::UserNotFound(user))
    }

    /// Shared mechanics of the UPI and bank-details send variants: a bare
    /// wallet debit with a descriptive message, followed by rewards.
    fn debit_out(&self, sender: UserId, amount: Amount, message: String) -> Result<(), EngineError> {
        if !amount.is_positive() {
            return Err(TransferError::InvalidAmount(amount).into());
        }
        self.directory
            .find_by_id(sender)
            .ok_or(TransferError::SenderNotFound(sender))?;

        let receipt = self
            .ledger
            .apply(vec![Mutation::debit(sender, amount, message)])
            .map_err(Self::map_transfer_ledger)?;

        self.apply_rewards(sender, receipt.debit_count(sender))
    }

    /// Locate or lazily create the user's primary bank account, sync its
    /// display name against the profile, and run `f` on it while the banks
    /// lock is held. At most one account ever exists per user.
    fn with_bank<T>(
        &self,
        profile: &UserProfile,
        f: impl FnOnce(&Ledger, &mut BankAccount) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut banks = self
            .banks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let bank = banks
            .entry(profile.id)
            .or_insert_with(|| Self::default_bank(profile));
        if let Some(name) = &profile.bank_name {
            if bank.bank_name != *name {
                bank.bank_name = name.clone();
            }
        }
        f(&self.ledger, bank)
    }

    fn default_bank(profile: &UserProfile) -> BankAccount {
        BankAccount {
            bank_name: profile
                .bank_name
                .clone()
                .unwrap_or_else(|| DEFAULT_BANK_NAME.to_string()),
            account_number: masked_account_number(profile.id),
            balance: DEFAULT_BANK_BALANCE,
            primary: true,
        }
    }

    /// Milestone rewards, computed from the post-commit lifetime debit
    /// count rather than a tracked counter: the 5th debit earns a one-time
    /// cashback, every 10th after that a smaller loyalty bonus. One-sided:
    /// only the debiting user is ever rewarded.
    fn apply_rewards(&self, user: UserId, debit_count: u64) -> Result<(), EngineError> {
        let (bonus, message) = if debit_count == 5 {
            (FIRST_FIVE_BONUS, "🎉 Cashback Reward! (First 5 Payments)")
        } else if debit_count > 5 && debit_count % 10 == 0 {
            (LOYALTY_BONUS, "🎁 Loyalty Bonus (Every 10 Payments)")
        } else {
            return Ok(());
        };
        self.ledger
            .apply(vec![Mutation::credit(user, bonus, message)])?;
        Ok(())
    }

    /// A failed debit inside `Ledger::apply` is an insufficient-balance
    /// result from the caller's point of view; everything else passes
    /// through unchanged.
    fn map_transfer_ledger(err: LedgerError) -> EngineError {
        match err {
            LedgerError::InsufficientBalance {
                user,
                available,
                requested,
            } => TransferError::InsufficientBalance {
                user,
                available,
                requested,
            }
            .into(),
            other => other.into(),
        }
    }
}

/// Deterministic masked display number, stable per user.
fn masked_account_number(user: UserId) -> String {
    format!("**** {}", 1000 + user.wrapping_mul(7919) % 9000)
}
