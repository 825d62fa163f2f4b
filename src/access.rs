use log::warn;

use crate::errors::{SuretyError, SuretyResult};
use crate::ledger::Address;

/// Operational switch for the whole ledger, administered by a single owner
#[derive(Debug, Clone)]
pub struct AccessGate {
    owner: Address,
    operational: bool,
}

impl AccessGate {
    /// Gates start operational
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            operational: true,
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn require_owner(&self, caller: &Address) -> SuretyResult<()> {
        if caller != &self.owner {
            return Err(SuretyError::Unauthorized(*caller));
        }
        Ok(())
    }

    pub fn require_operational(&self) -> SuretyResult<()> {
        if !self.operational {
            return Err(SuretyError::NotOperational);
        }
        Ok(())
    }

    /// Owner-only. Returns whether the flag actually changed.
    pub fn set_operating_status(&mut self, caller: &Address, operational: bool) -> SuretyResult<bool> {
        self.require_owner(caller)?;
        if self.operational == operational {
            return Ok(false);
        }
        self.operational = operational;
        if operational {
            warn!("Ledger resumed by {}", caller);
        } else {
            warn!("Ledger paused by {}", caller);
        }
        Ok(true)
    }
}
