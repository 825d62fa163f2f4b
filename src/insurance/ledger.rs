use std::collections::HashMap;

use log::{debug, info};

use crate::airline::AirlineRegistry;
use crate::config::{RebuyPolicy, SuretyConfig};
use crate::errors::{SuretyError, SuretyResult};
use crate::insurance::policy::{CreditEntry, InsurancePolicy, PolicyKey, PolicyState};
use crate::ledger::{Address, Amount, Bank, Vault};

/// Credits computed for one (airline, flight) but not yet applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditPlan {
    pub airline: Address,
    pub flight: String,
    pub entries: Vec<CreditEntry>,
    /// Credit above premium; the reserve pays it when each credit is paid out
    pub uplift: Amount,
}

/// Passenger policies, credits and payouts.
///
/// Escrow invariant: the escrow vault holds exactly the premiums of `Active`
/// and `Credited` policies. The part of a credit above its premium is a claim
/// on the reserve, settled at payout.
#[derive(Debug)]
pub struct InsuranceLedger {
    policies: HashMap<PolicyKey, InsurancePolicy>,
    credits: HashMap<PolicyKey, Amount>,
    payouts: HashMap<PolicyKey, Amount>,
    /// Passengers per (airline, flight), in purchase order
    passengers: HashMap<(Address, String), Vec<Address>>,
    max_insurance: Amount,
    payout_numerator: u128,
    payout_denominator: u128,
    rebuy_policy: RebuyPolicy,
}

impl InsuranceLedger {
    pub fn new(config: &SuretyConfig) -> Self {
        Self {
            policies: HashMap::new(),
            credits: HashMap::new(),
            payouts: HashMap::new(),
            passengers: HashMap::new(),
            max_insurance: config.max_insurance_amount,
            payout_numerator: u128::from(config.payout_numerator),
            payout_denominator: u128::from(config.payout_denominator),
            rebuy_policy: config.rebuy_policy,
        }
    }

    pub fn max_insurance(&self) -> Amount {
        self.max_insurance
    }

    fn invalid_amount(&self, amount: Amount) -> SuretyError {
        SuretyError::InvalidAmount {
            amount,
            cap: self.max_insurance,
        }
    }

    /// Buy (or re-buy) insurance for `key`, paid by `caller` into escrow.
    /// Returns the insured amount now stored for the key.
    pub fn buy(
        &mut self,
        caller: &Address,
        key: PolicyKey,
        amount: Amount,
        airlines: &AirlineRegistry,
        bank: &mut Bank,
    ) -> SuretyResult<Amount> {
        if !airlines.is_registered(&key.airline) {
            return Err(SuretyError::NotRegistered(key.airline));
        }
        if !airlines.is_funded(&key.airline) {
            return Err(SuretyError::NotFunded(key.airline));
        }
        if amount.is_zero() || amount > self.max_insurance {
            return Err(self.invalid_amount(amount));
        }

        // (stored amount, premium to refund to its payer)
        let (insured, refund) = match self.policies.get(&key) {
            None => (amount, None),
            Some(policy) => match policy.state {
                PolicyState::PaidOut => (amount, None),
                PolicyState::Credited => return Err(SuretyError::CreditOutstanding(key.passenger)),
                PolicyState::Active => match self.rebuy_policy {
                    RebuyPolicy::Replace => (amount, Some((policy.payer, policy.insured_amount))),
                    RebuyPolicy::Accumulate => {
                        let total = policy
                            .insured_amount
                            .checked_add(amount)
                            .ok_or(SuretyError::AmountOverflow)?;
                        if total > self.max_insurance {
                            return Err(self.invalid_amount(total));
                        }
                        (total, None)
                    }
                },
            },
        };

        if let Some((payer, premium)) = &refund {
            bank.ensure_can_pay(caller, amount)?;
            let payer_balance = if payer == caller {
                bank.balance_of(payer).saturating_sub(amount)
            } else {
                bank.balance_of(payer)
            };
            payer_balance
                .checked_add(*premium)
                .ok_or(SuretyError::AmountOverflow)?;
        }

        bank.collect(caller, amount, Vault::Escrow)?;
        if let Some((payer, premium)) = refund {
            bank.disburse(Vault::Escrow, &payer, premium)?;
            debug!("Refunded replaced premium {} to {}", premium, payer);
        }

        let flight_passengers = self
            .passengers
            .entry((key.airline, key.flight.clone()))
            .or_default();
        if !flight_passengers.contains(&key.passenger) {
            flight_passengers.push(key.passenger);
        }

        info!(
            "Passenger {} insured for {} on flight {} of airline {}",
            key.passenger, insured, key.flight, key.airline
        );
        self.policies.insert(
            key,
            InsurancePolicy {
                insured_amount: insured,
                payer: *caller,
                state: PolicyState::Active,
            },
        );
        Ok(insured)
    }

    /// Work out the credits for every active policy on (airline, flight)
    /// without touching any state.
    pub fn plan_credit(&self, airline: &Address, flight: &str) -> SuretyResult<CreditPlan> {
        let mut entries = Vec::new();
        let mut uplift = Amount::ZERO;

        let passengers = self
            .passengers
            .get(&(*airline, flight.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default();
        for passenger in passengers {
            let key = PolicyKey::new(*airline, flight, *passenger);
            let Some(policy) = self.policies.get(&key) else {
                continue;
            };
            // Credited policies already hold premium * ratio; re-applying changes nothing
            if policy.state != PolicyState::Active || policy.insured_amount.is_zero() {
                continue;
            }
            let credit = self.credit_for(policy.insured_amount)?;
            let extra = credit.saturating_sub(policy.insured_amount);
            uplift = uplift.checked_add(extra).ok_or(SuretyError::AmountOverflow)?;
            entries.push(CreditEntry {
                passenger: *passenger,
                amount: credit,
            });
        }

        Ok(CreditPlan {
            airline: *airline,
            flight: flight.to_string(),
            entries,
            uplift,
        })
    }

    /// Credit owed for `premium`, never less than the premium itself
    fn credit_for(&self, premium: Amount) -> SuretyResult<Amount> {
        premium
            .checked_mul_ratio(self.payout_numerator, self.payout_denominator)
            .map(|credit| credit.max(premium))
            .ok_or(SuretyError::AmountOverflow)
    }

    /// Record a plan produced by `plan_credit` against the same state.
    /// No funds move until payout.
    pub fn apply_credit(&mut self, plan: CreditPlan) -> Vec<CreditEntry> {
        for entry in &plan.entries {
            let key = PolicyKey::new(plan.airline, &plan.flight, entry.passenger);
            if let Some(policy) = self.policies.get_mut(&key) {
                policy.state = PolicyState::Credited;
            }
            self.credits.insert(key, entry.amount);
        }

        if !plan.entries.is_empty() {
            info!(
                "Credited {} passengers on flight {} of airline {} ({} owed by the reserve)",
                plan.entries.len(),
                plan.flight,
                plan.airline,
                plan.uplift
            );
        }
        plan.entries
    }

    /// Credit every insured passenger of (airline, flight) with premium * ratio.
    /// Only an arithmetic overflow can fail this.
    pub fn credit(&mut self, airline: &Address, flight: &str) -> SuretyResult<Vec<CreditEntry>> {
        let plan = self.plan_credit(airline, flight)?;
        Ok(self.apply_credit(plan))
    }

    /// Pay the full credit for `key` to its passenger and clear it.
    ///
    /// The premium comes out of escrow and the rest out of the reserve;
    /// `InsufficientFunds` if the reserve is short, with nothing changed.
    pub fn payout(&mut self, key: &PolicyKey, bank: &mut Bank) -> SuretyResult<Amount> {
        let credit = self.credit_amount(key);
        if credit.is_zero() {
            return Err(SuretyError::NoCredit(key.passenger));
        }
        let paid = self
            .payout_amount(key)
            .checked_add(credit)
            .ok_or(SuretyError::AmountOverflow)?;
        let premium = self.insurance_amount(key).min(credit);

        bank.disburse_split(
            &key.passenger,
            &[
                (Vault::Escrow, premium),
                (Vault::Reserve, credit.saturating_sub(premium)),
            ],
        )?;

        self.credits.remove(key);
        self.payouts.insert(key.clone(), paid);
        if let Some(policy) = self.policies.get_mut(key) {
            policy.state = PolicyState::PaidOut;
        }
        info!("Paid {} to passenger {} for flight {}", credit, key.passenger, key.flight);
        Ok(credit)
    }

    /// Drop a policy and everything recorded for it. A premium still held
    /// in escrow (active or credited policy) goes back to its payer.
    pub fn reset_policy(&mut self, key: &PolicyKey, bank: &mut Bank) -> SuretyResult<Amount> {
        let refunded = match self.policies.get(key) {
            Some(policy) if policy.state != PolicyState::PaidOut => {
                bank.disburse(Vault::Escrow, &policy.payer, policy.insured_amount)?;
                policy.insured_amount
            }
            _ => Amount::ZERO,
        };

        self.policies.remove(key);
        self.credits.remove(key);
        self.payouts.remove(key);
        if let Some(passengers) = self.passengers.get_mut(&(key.airline, key.flight.clone())) {
            passengers.retain(|p| p != &key.passenger);
        }
        debug!("Reset policy of {} on flight {}", key.passenger, key.flight);
        Ok(refunded)
    }

    pub fn policy(&self, key: &PolicyKey) -> Option<&InsurancePolicy> {
        self.policies.get(key)
    }

    /// Insured amount currently on record, 0 if none
    pub fn insurance_amount(&self, key: &PolicyKey) -> Amount {
        self.policies
            .get(key)
            .map(|policy| policy.insured_amount)
            .unwrap_or_default()
    }

    pub fn credit_amount(&self, key: &PolicyKey) -> Amount {
        self.credits.get(key).copied().unwrap_or_default()
    }

    /// Total paid out so far for the key
    pub fn payout_amount(&self, key: &PolicyKey) -> Amount {
        self.payouts.get(key).copied().unwrap_or_default()
    }

    /// What escrow must hold according to the policy book
    pub fn escrow_held(&self) -> Option<Amount> {
        self.policies
            .values()
            .try_fold(Amount::ZERO, |total, policy| match policy.state {
                PolicyState::Active | PolicyState::Credited => total.checked_add(policy.insured_amount),
                PolicyState::PaidOut => Some(total),
            })
    }

    /// Credit above premium that the reserve still has to pay out
    pub fn uplift_owed(&self) -> Option<Amount> {
        self.credits.iter().try_fold(Amount::ZERO, |total, (key, credit)| {
            total.checked_add(credit.saturating_sub(self.insurance_amount(key)))
        })
    }

    /// Escrow matches the policy book
    pub fn is_solvent(&self, bank: &Bank) -> bool {
        self.escrow_held() == Some(bank.vault_balance(Vault::Escrow))
    }

    /// How far the reserve falls short of the outstanding uplift
    pub fn reserve_shortfall(&self, bank: &Bank) -> Option<Amount> {
        self.uplift_owed()
            .map(|owed| owed.saturating_sub(bank.vault_balance(Vault::Reserve)))
    }
}
