use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current balance of one bank account in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankBalance {
    pub bank_name: String,
    pub balance: Decimal,
}
