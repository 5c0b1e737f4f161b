use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{BankBalance, Movement};
use crate::money::{format_brl, sum_amounts};

/// Label of the synthetic total line in rendered balance tables.
pub const TOTAL_LABEL: &str = "Total";

/// Balances of the selected banks, sorted by name, with their total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceReport {
    pub rows: Vec<BankBalance>,
    pub total: Decimal,
}

impl BalanceReport {
    pub fn build(balances: &[BankBalance], banks: &[String]) -> Self {
        let mut rows = balances
            .iter()
            .filter(|balance| banks.is_empty() || banks.contains(&balance.bank_name))
            .cloned()
            .collect::<Vec<_>>();
        rows.sort_by(|left, right| left.bank_name.cmp(&right.bank_name));

        let total = sum_amounts(rows.iter().map(|row| row.balance));
        Self { rows, total }
    }

    /// `(bank, R$ amount)` pairs followed by the total line.
    pub fn formatted(&self) -> Vec<(String, String)> {
        self.rows
            .iter()
            .map(|row| (row.bank_name.clone(), format_brl(row.balance)))
            .chain(std::iter::once((
                TOTAL_LABEL.to_owned(),
                format_brl(self.total),
            )))
            .collect()
    }
}

/// Sorted union of bank names seen in movements and balances.
pub fn bank_options(movements: &[Movement], balances: &[BankBalance]) -> Vec<String> {
    movements
        .iter()
        .map(|movement| movement.bank_name.as_str())
        .chain(balances.iter().map(|balance| balance.bank_name.as_str()))
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(bank: &str, amount: i64) -> BankBalance {
        BankBalance {
            bank_name: bank.into(),
            balance: Decimal::from(amount),
        }
    }

    #[test]
    fn sorts_filters_and_totals() {
        let balances = vec![balance("Itau", 100), balance("Bradesco", 50), balance("Inter", 7)];

        let report = BalanceReport::build(&balances, &["Itau".into(), "Bradesco".into()]);

        assert_eq!(report.rows[0].bank_name, "Bradesco");
        assert_eq!(report.total, Decimal::from(150));
        assert_eq!(
            report.formatted().last(),
            Some(&("Total".to_owned(), "R$ 150,00".to_owned()))
        );
    }

    #[test]
    fn empty_selection_keeps_every_bank() {
        let report = BalanceReport::build(&[balance("Itau", 1)], &[]);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(BalanceReport::build(&[], &[]).total, Decimal::ZERO);
    }

    #[test]
    fn bank_options_are_a_sorted_union() {
        let movements = vec![Movement {
            occurred_on: None,
            occurred_time: None,
            description: String::new(),
            amount: Decimal::ZERO,
            operation_code: String::new(),
            bank_name: "Santander".into(),
        }];
        let options = bank_options(&movements, &[balance("Itau", 1), balance("Santander", 2)]);
        assert_eq!(options, vec!["Itau", "Santander"]);
    }
}
