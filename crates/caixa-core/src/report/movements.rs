use std::cmp::Ordering;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::domain::date::{format_br_date, serde_date_opt};
use crate::domain::Movement;
use crate::money::{format_brl, format_brl_or_blank};
use crate::report::MovementFilter;

/// Statement line: movements grouped by date and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementRow {
    #[serde(with = "serde_date_opt")]
    pub date: Option<Date>,
    pub description: String,
    pub inflow: Decimal,
    pub outflow: Decimal,
}

impl StatementRow {
    pub fn formatted(&self) -> FormattedStatementRow {
        FormattedStatementRow {
            date: self.date.map(format_br_date).unwrap_or_default(),
            description: self.description.clone(),
            inflow: format_brl_or_blank(self.inflow),
            outflow: format_brl_or_blank(self.outflow),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedStatementRow {
    pub date: String,
    pub description: String,
    pub inflow: String,
    pub outflow: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MovementKpis {
    pub total_inflow: Decimal,
    pub total_outflow: Decimal,
    pub net: Decimal,
}

impl MovementKpis {
    pub fn compute<'a>(movements: impl IntoIterator<Item = &'a Movement>) -> Self {
        let (total_inflow, total_outflow) = movements
            .into_iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(inflow, outflow), movement| {
                (
                    inflow.saturating_add(movement.inflow()),
                    outflow.saturating_add(movement.outflow()),
                )
            });
        Self {
            total_inflow,
            total_outflow,
            net: total_inflow.saturating_sub(total_outflow),
        }
    }

    pub fn formatted(&self) -> FormattedMovementKpis {
        FormattedMovementKpis {
            total_inflow: format_brl(self.total_inflow),
            total_outflow: format_brl(self.total_outflow),
            net: format_brl(self.net),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedMovementKpis {
    pub total_inflow: String,
    pub total_outflow: String,
    pub net: String,
}

/// Inflow and outflow totals of one bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankFlow {
    pub bank_name: String,
    pub inflow: Decimal,
    pub outflow: Decimal,
    pub net: Decimal,
}

/// Groups by (date, description), drops groups whose sums are both zero and
/// orders by date descending (undated rows last, ties by description).
pub fn statement_rows<'a>(movements: impl IntoIterator<Item = &'a Movement>) -> Vec<StatementRow> {
    let mut groups: BTreeMap<(Option<Date>, &str), (Decimal, Decimal)> = BTreeMap::new();
    for movement in movements {
        let sums = groups
            .entry((movement.occurred_on, movement.description.as_str()))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        sums.0 = sums.0.saturating_add(movement.inflow());
        sums.1 = sums.1.saturating_add(movement.outflow());
    }

    let mut rows = groups
        .into_iter()
        .filter(|(_, (inflow, outflow))| !inflow.is_zero() || !outflow.is_zero())
        .map(|((date, description), (inflow, outflow))| StatementRow {
            date,
            description: description.to_owned(),
            inflow,
            outflow,
        })
        .collect::<Vec<_>>();

    rows.sort_by(|left, right| {
        let by_date = match (left.date, right.date) {
            (Some(l), Some(r)) => r.cmp(&l),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_date.then_with(|| left.description.cmp(&right.description))
    });
    rows
}

/// Per-bank totals sorted by bank name.
pub fn bank_flows<'a>(movements: impl IntoIterator<Item = &'a Movement>) -> Vec<BankFlow> {
    let mut totals: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
    for movement in movements {
        let sums = totals
            .entry(movement.bank_name.as_str())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        sums.0 = sums.0.saturating_add(movement.inflow());
        sums.1 = sums.1.saturating_add(movement.outflow());
    }

    totals
        .into_iter()
        .map(|(bank_name, (inflow, outflow))| BankFlow {
            bank_name: bank_name.to_owned(),
            inflow,
            outflow,
            net: inflow.saturating_sub(outflow),
        })
        .collect()
}

/// Filtered movements with everything the statement view shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementReport {
    pub rows: Vec<Movement>,
    pub statement: Vec<StatementRow>,
    pub kpis: MovementKpis,
    pub bank_flows: Vec<BankFlow>,
}

impl MovementReport {
    pub fn build(movements: &[Movement], filter: &MovementFilter) -> Self {
        let rows = movements
            .iter()
            .filter(|movement| filter.matches(movement))
            .cloned()
            .collect::<Vec<_>>();

        Self {
            statement: statement_rows(&rows),
            kpis: MovementKpis::compute(&rows),
            bank_flows: bank_flows(&rows),
            rows,
        }
    }
}
