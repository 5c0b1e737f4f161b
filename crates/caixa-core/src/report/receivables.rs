use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::domain::date::{format_br_date, same_month};
use crate::domain::{Receivable, ReceivableStatus};
use crate::money::{format_brl, sum_amounts};
use crate::report::ReceivableFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReceivableKpis {
    pub total_open: Decimal,
    pub total_overdue: Decimal,
    /// Always taken from the unfiltered table.
    pub total_settled_this_month: Decimal,
}

impl ReceivableKpis {
    /// `filtered` drives the open and overdue totals; `all` the settled total.
    pub fn compute(filtered: &[Receivable], all: &[Receivable], today: Date) -> Self {
        let sum = |rows: &[Receivable], keep: &dyn Fn(&Receivable) -> bool| -> Decimal {
            sum_amounts(rows.iter().filter(|row| keep(row)).map(|row| row.amount))
        };

        Self {
            total_open: sum(filtered, &|row| row.status.is_open()),
            total_overdue: sum(filtered, &|row| row.status == ReceivableStatus::Overdue),
            total_settled_this_month: sum(all, &|row| {
                row.status == ReceivableStatus::Settled
                    && row.payment_date.is_some_and(|paid| same_month(paid, today))
            }),
        }
    }

    pub fn formatted(&self) -> FormattedReceivableKpis {
        FormattedReceivableKpis {
            total_open: format_brl(self.total_open),
            total_overdue: format_brl(self.total_overdue),
            total_settled_this_month: format_brl(self.total_settled_this_month),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedReceivableKpis {
    pub total_open: String,
    pub total_overdue: String,
    pub total_settled_this_month: String,
}

/// Count and amount of one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBucket {
    pub status: ReceivableStatus,
    pub label: &'static str,
    pub count: usize,
    pub amount: Decimal,
}

/// One bucket per status in [`ReceivableStatus::ALL`] order, empty ones included.
pub fn status_buckets(receivables: &[Receivable]) -> Vec<StatusBucket> {
    ReceivableStatus::ALL
        .into_iter()
        .map(|status| {
            let (count, amount) = receivables
                .iter()
                .filter(|row| row.status == status)
                .fold((0, Decimal::ZERO), |(count, amount), row| {
                    (count + 1, amount.saturating_add(row.amount))
                });
            StatusBucket {
                status,
                label: status.label(),
                count,
                amount,
            }
        })
        .collect()
}

/// Display form of a receivable row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedReceivable {
    pub id: String,
    pub client_name: String,
    pub installment_number: String,
    pub due_date: String,
    pub payment_date: String,
    pub amount: String,
    pub status: &'static str,
}

impl From<&Receivable> for FormattedReceivable {
    fn from(row: &Receivable) -> Self {
        Self {
            id: row.id.clone(),
            client_name: row.client_name.clone(),
            installment_number: row.installment_number.clone(),
            due_date: row.due_date.map(format_br_date).unwrap_or_default(),
            payment_date: row.payment_date.map(format_br_date).unwrap_or_default(),
            amount: format_brl(row.amount),
            status: row.status.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivableReport {
    pub rows: Vec<Receivable>,
    pub kpis: ReceivableKpis,
    pub buckets: Vec<StatusBucket>,
}

impl ReceivableReport {
    /// Rows are ordered by due date (undated last).
    pub fn build(receivables: &[Receivable], filter: &ReceivableFilter, today: Date) -> Self {
        let mut rows = receivables
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect::<Vec<_>>();
        rows.sort_by_key(|row| (row.due_date.is_none(), row.due_date));

        Self {
            kpis: ReceivableKpis::compute(&rows, receivables, today),
            buckets: status_buckets(&rows),
            rows,
        }
    }
}
