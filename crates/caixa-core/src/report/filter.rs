use serde::{Deserialize, Serialize};

use crate::domain::{DateRange, Movement, Receivable, ReceivableStatus};

fn admits<T: PartialEq>(set: &[T], value: &T) -> bool {
    set.is_empty() || set.contains(value)
}

/// Date-range and bank-set filter for movements. Empty sets do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFilter {
    pub range: Option<DateRange>,
    pub banks: Vec<String>,
}

impl MovementFilter {
    pub fn matches(&self, movement: &Movement) -> bool {
        let in_range = self
            .range
            .map_or(true, |range| range.contains_opt(movement.occurred_on));
        in_range && admits(&self.banks, &movement.bank_name)
    }

    pub fn admits_bank(&self, bank_name: &str) -> bool {
        self.banks.is_empty() || self.banks.iter().any(|bank| bank == bank_name)
    }
}

/// Due-date range and status-set filter for receivables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivableFilter {
    pub range: Option<DateRange>,
    pub statuses: Vec<ReceivableStatus>,
}

impl ReceivableFilter {
    pub fn matches(&self, receivable: &Receivable) -> bool {
        let in_range = self
            .range
            .map_or(true, |range| range.contains_opt(receivable.due_date));
        in_range && admits(&self.statuses, &receivable.status)
    }
}

/// Splits a comma-separated list, dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}
