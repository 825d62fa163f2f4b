// Ledger primitives shared by every FlightSurety component:
// identities, currency amounts, custody balances and the event stream.

pub mod address;
pub mod amount;
pub mod bank;
pub mod events;

pub use address::{Address, ParseAddressError, ADDRESS_LEN};
pub use amount::{Amount, ParseAmountError, BASE_UNITS_PER_COIN, DECIMALS};
pub use bank::{Bank, Vault};
pub use events::{EventBus, SuretyEvent};

#[cfg(test)]
mod tests;
