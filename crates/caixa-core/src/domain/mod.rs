//! Canonical records produced by the normalizer and the postal-code resolver.

mod address;
mod balance;
mod cep;
mod client;
pub mod date;
mod movement;
mod receivable;

pub use address::{AddressRecord, CepProviderId, ProviderAddress, ProviderTier};
pub use balance::BankBalance;
pub use cep::Cep;
pub use client::{Client, ClientDirectory};
pub use date::{Clock, DateRange, FixedClock, SystemClock};
pub use movement::{Movement, DEBIT_MARKER};
pub use receivable::{Receivable, ReceivableStatus};
