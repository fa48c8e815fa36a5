//! Native-value custody for a market's reserve.
//!
//! `collect` pulls a buyer's payment into the market's holdings; `pay_out`
//! pushes value from the holdings to a recipient. Either may fail, and a
//! failing `pay_out` must abort the whole trade.

use crate::transaction::Transactional;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscrowError {
    #[error("insufficient funds in {account}: have {have}, need {need}")]
    InsufficientFunds {
        account: String,
        have: u128,
        need: u128,
    },
    #[error("recipient {0} rejected the transfer")]
    RecipientRejected(String),
    #[error("escrow arithmetic overflow")]
    Overflow,
}

/// Value custody consumed by a market.
pub trait ValueEscrow: Transactional {
    /// Move `amount` from `payer` into the market holdings.
    fn collect(&mut self, payer: &str, amount: u128) -> Result<(), EscrowError>;

    /// Move `amount` from the market holdings to `recipient`.
    fn pay_out(&mut self, recipient: &str, amount: u128) -> Result<(), EscrowError>;

    /// Total value currently held for the market.
    fn held(&self) -> u128;
}

/// Wallet-backed escrow for tests and offline simulation.
///
/// Payers must be funded with [`InMemoryEscrow::fund`] before buying.
/// Recipients registered with [`InMemoryEscrow::reject_payouts_to`] refuse
/// every incoming payout, which is how a failing transfer is simulated.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEscrow {
    wallets: BTreeMap<String, u128>,
    held: u128,
    rejecting: BTreeSet<String>,
    /// Prior wallet balances touched while a checkpoint is open
    journal: Vec<(String, Option<u128>)>,
    open_checkpoints: usize,
}

impl InMemoryEscrow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an external wallet.
    pub fn fund(&mut self, account: &str, amount: u128) -> Result<(), EscrowError> {
        let credited = self
            .wallet_balance(account)
            .checked_add(amount)
            .ok_or(EscrowError::Overflow)?;
        self.set_wallet(account, credited);
        Ok(())
    }

    pub fn wallet_balance(&self, account: &str) -> u128 {
        self.wallets.get(account).copied().unwrap_or(0)
    }

    pub fn reject_payouts_to(&mut self, account: &str) {
        self.rejecting.insert(account.to_string());
    }

    pub fn accept_payouts_to(&mut self, account: &str) {
        self.rejecting.remove(account);
    }

    fn set_wallet(&mut self, account: &str, amount: u128) {
        if self.open_checkpoints > 0 {
            let prior = self.wallets.insert(account.to_string(), amount);
            self.journal.push((account.to_string(), prior));
        } else {
            self.wallets.insert(account.to_string(), amount);
        }
    }

    fn close_checkpoint(&mut self) {
        self.open_checkpoints = self.open_checkpoints.saturating_sub(1);
        if self.open_checkpoints == 0 {
            self.journal.clear();
        }
    }
}

impl ValueEscrow for InMemoryEscrow {
    fn collect(&mut self, payer: &str, amount: u128) -> Result<(), EscrowError> {
        let have = self.wallet_balance(payer);
        if have < amount {
            return Err(EscrowError::InsufficientFunds {
                account: payer.to_string(),
                have,
                need: amount,
            });
        }
        let held = self.held.checked_add(amount).ok_or(EscrowError::Overflow)?;
        self.set_wallet(payer, have - amount);
        self.held = held;
        Ok(())
    }

    fn pay_out(&mut self, recipient: &str, amount: u128) -> Result<(), EscrowError> {
        if self.rejecting.contains(recipient) {
            return Err(EscrowError::RecipientRejected(recipient.to_string()));
        }
        if self.held < amount {
            return Err(EscrowError::InsufficientFunds {
                account: "escrow".to_string(),
                have: self.held,
                need: amount,
            });
        }
        let credited = self
            .wallet_balance(recipient)
            .checked_add(amount)
            .ok_or(EscrowError::Overflow)?;
        self.set_wallet(recipient, credited);
        self.held -= amount;
        Ok(())
    }

    fn held(&self) -> u128 {
        self.held
    }
}

/// Journal position and held reserve at the time of the checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscrowCheckpoint {
    journal_len: usize,
    held: u128,
}

/// Checkpoints only cover balances; the rejecting set is test configuration.
impl Transactional for InMemoryEscrow {
    type Checkpoint = EscrowCheckpoint;

    fn checkpoint(&mut self) -> Self::Checkpoint {
        self.open_checkpoints += 1;
        EscrowCheckpoint {
            journal_len: self.journal.len(),
            held: self.held,
        }
    }

    fn rollback(&mut self, checkpoint: Self::Checkpoint) {
        while self.journal.len() > checkpoint.journal_len {
            let Some((account, prior)) = self.journal.pop() else {
                break;
            };
            match prior {
                Some(amount) => self.wallets.insert(account, amount),
                None => self.wallets.remove(&account),
            };
        }
        self.held = checkpoint.held;
        self.close_checkpoint();
    }

    fn commit(&mut self, _checkpoint: Self::Checkpoint) {
        self.close_checkpoint();
    }
}
