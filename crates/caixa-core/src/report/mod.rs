//! Filtering, grouping and KPI computation over normalized tables.

mod balances;
mod filter;
mod movements;
mod receivables;

pub use balances::{bank_options, BalanceReport, TOTAL_LABEL};
pub use filter::{split_list, MovementFilter, ReceivableFilter};
pub use movements::{
    bank_flows, statement_rows, BankFlow, FormattedMovementKpis, FormattedStatementRow,
    MovementKpis, MovementReport, StatementRow,
};
pub use receivables::{
    status_buckets, FormattedReceivable, FormattedReceivableKpis, ReceivableKpis,
    ReceivableReport, StatusBucket,
};
