use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, Time};

use crate::domain::date::{serde_date_opt, serde_time_opt};

/// Character in an operation code that marks a debit.
pub const DEBIT_MARKER: char = '-';

/// One bank transaction.
///
/// Direction comes from [`Movement::operation_code`] only; `amount` is kept
/// as the feed provides it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    #[serde(with = "serde_date_opt")]
    pub occurred_on: Option<Date>,
    #[serde(with = "serde_time_opt")]
    pub occurred_time: Option<Time>,
    pub description: String,
    pub amount: Decimal,
    pub operation_code: String,
    pub bank_name: String,
}

impl Movement {
    pub fn is_debit(&self) -> bool {
        self.operation_code.contains(DEBIT_MARKER)
    }

    /// `amount` when this is an inflow, zero otherwise.
    pub fn inflow(&self) -> Decimal {
        if self.is_debit() {
            Decimal::ZERO
        } else {
            self.amount
        }
    }

    /// `amount` when this is an outflow, zero otherwise.
    pub fn outflow(&self) -> Decimal {
        if self.is_debit() {
            self.amount
        } else {
            Decimal::ZERO
        }
    }
}
