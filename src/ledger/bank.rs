use std::collections::HashMap;

use crate::errors::{SuretyError, SuretyResult};
use crate::ledger::{Address, Amount};

/// Custody accounts held by the contract itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vault {
    /// Premiums of every policy not yet paid out
    Escrow,
    /// Airline funding and oracle fees; pays the credit above premium at payout
    Reserve,
}

/// Native currency balances: external accounts plus the contract's vaults.
///
/// Every mutating method checks before it writes, so a failed transfer
/// leaves all balances untouched.
#[derive(Debug, Default, Clone)]
pub struct Bank {
    accounts: HashMap<Address, Amount>,
    escrow: Amount,
    reserve: Amount,
}

impl Bank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an external account from outside the ledger (genesis allocation / faucet)
    pub fn deposit(&mut self, account: Address, amount: Amount) -> SuretyResult<Amount> {
        let current = self.balance_of(&account);
        let updated = current.checked_add(amount).ok_or(SuretyError::AmountOverflow)?;
        self.accounts.insert(account, updated);
        Ok(updated)
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.accounts.get(account).copied().unwrap_or_default()
    }

    pub fn vault_balance(&self, vault: Vault) -> Amount {
        match vault {
            Vault::Escrow => self.escrow,
            Vault::Reserve => self.reserve,
        }
    }

    /// Fail with `InsufficientFunds` unless `account` can pay `amount`
    pub fn ensure_can_pay(&self, account: &Address, amount: Amount) -> SuretyResult<()> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(SuretyError::InsufficientFunds {
                required: amount,
                available,
            });
        }
        Ok(())
    }

    fn ensure_vault_covers(&self, vault: Vault, amount: Amount) -> SuretyResult<()> {
        let available = self.vault_balance(vault);
        if available < amount {
            return Err(SuretyError::InsufficientFunds {
                required: amount,
                available,
            });
        }
        Ok(())
    }

    fn vault_mut(&mut self, vault: Vault) -> &mut Amount {
        match vault {
            Vault::Escrow => &mut self.escrow,
            Vault::Reserve => &mut self.reserve,
        }
    }

    /// Move funds from an external account into contract custody
    pub fn collect(&mut self, from: &Address, amount: Amount, into: Vault) -> SuretyResult<()> {
        self.ensure_can_pay(from, amount)?;
        let credited = self
            .vault_balance(into)
            .checked_add(amount)
            .ok_or(SuretyError::AmountOverflow)?;
        let remaining = self.balance_of(from).saturating_sub(amount);

        self.accounts.insert(*from, remaining);
        *self.vault_mut(into) = credited;
        Ok(())
    }

    /// Move funds out of contract custody to an external account
    pub fn disburse(&mut self, from: Vault, to: &Address, amount: Amount) -> SuretyResult<()> {
        self.ensure_vault_covers(from, amount)?;
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(SuretyError::AmountOverflow)?;

        *self.vault_mut(from) = self.vault_balance(from).saturating_sub(amount);
        self.accounts.insert(*to, credited);
        Ok(())
    }

    /// Pay `to` out of several vaults in one transfer. Either every part
    /// moves or, on error, nothing does.
    pub fn disburse_split(&mut self, to: &Address, parts: &[(Vault, Amount)]) -> SuretyResult<()> {
        let mut escrow = self.escrow;
        let mut reserve = self.reserve;
        let mut total = Amount::ZERO;
        for (vault, amount) in parts {
            let balance = match vault {
                Vault::Escrow => &mut escrow,
                Vault::Reserve => &mut reserve,
            };
            if *balance < *amount {
                return Err(SuretyError::InsufficientFunds {
                    required: *amount,
                    available: *balance,
                });
            }
            *balance = balance.saturating_sub(*amount);
            total = total.checked_add(*amount).ok_or(SuretyError::AmountOverflow)?;
        }
        let credited = self
            .balance_of(to)
            .checked_add(total)
            .ok_or(SuretyError::AmountOverflow)?;

        self.escrow = escrow;
        self.reserve = reserve;
        self.accounts.insert(*to, credited);
        Ok(())
    }

    /// Fail with `AmountOverflow` if `account` could not receive `amount`
    pub fn ensure_can_receive(&self, account: &Address, amount: Amount) -> SuretyResult<()> {
        self.balance_of(account)
            .checked_add(amount)
            .map(|_| ())
            .ok_or(SuretyError::AmountOverflow)
    }

    /// Total currency in existence on this ledger
    pub fn total_supply(&self) -> Option<Amount> {
        self.accounts
            .values()
            .try_fold(self.escrow.checked_add(self.reserve)?, |acc, v| acc.checked_add(*v))
    }
}
