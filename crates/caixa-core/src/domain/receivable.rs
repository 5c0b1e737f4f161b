use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::date::serde_date_opt;
use crate::ValidationError;

/// Derived settlement state of a receivable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceivableStatus {
    Settled,
    Overdue,
    DueToday,
    Upcoming,
    NoDueDate,
}

impl ReceivableStatus {
    pub const ALL: [Self; 5] = [
        Self::Settled,
        Self::Overdue,
        Self::DueToday,
        Self::Upcoming,
        Self::NoDueDate,
    ];

    /// Payment date wins over everything; otherwise the due date is compared
    /// with `today`.
    pub fn derive(payment_date: Option<Date>, due_date: Option<Date>, today: Date) -> Self {
        if payment_date.is_some() {
            return Self::Settled;
        }
        match due_date {
            None => Self::NoDueDate,
            Some(due) if due < today => Self::Overdue,
            Some(due) if due == today => Self::DueToday,
            Some(_) => Self::Upcoming,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Settled => "settled",
            Self::Overdue => "overdue",
            Self::DueToday => "due_today",
            Self::Upcoming => "upcoming",
            Self::NoDueDate => "no_due_date",
        }
    }

    /// Portuguese display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Settled => "Pago",
            Self::Overdue => "Vencido",
            Self::DueToday => "Vence hoje",
            Self::Upcoming => "A vencer",
            Self::NoDueDate => "Sem vencimento",
        }
    }

    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Settled)
    }
}

impl Display for ReceivableStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceivableStatus {
    type Err = ValidationError;

    /// Accepts the snake_case names and the Portuguese labels, case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted || status.label().to_lowercase() == wanted)
            .ok_or_else(|| ValidationError::InvalidStatus {
                value: value.to_owned(),
            })
    }
}

/// One installment of a receivable title (boleto).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receivable {
    pub id: String,
    pub installment_number: String,
    pub number: String,
    pub client_id: String,
    pub client_name: String,
    pub project_code: String,
    #[serde(with = "serde_date_opt")]
    pub due_date: Option<Date>,
    #[serde(with = "serde_date_opt")]
    pub payment_date: Option<Date>,
    #[serde(with = "serde_date_opt")]
    pub credit_date: Option<Date>,
    /// Always non-negative.
    pub amount: Decimal,
    pub status: ReceivableStatus,
}
