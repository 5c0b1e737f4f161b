//! View-level operations shared by the CLI and the web API.
//!
//! Each operation fetches what its view needs and fails on its own; a
//! failing balances fetch never affects the receivables view.

use std::sync::Arc;

use serde::Serialize;
use time::Date;

use crate::domain::Clock;
use crate::finance::FinanceClient;
use crate::report::{
    bank_options, BalanceReport, MovementFilter, MovementReport, ReceivableFilter,
    ReceivableReport,
};
use crate::FetchError;

/// Receivables view plus non-fatal warnings (e.g. client names missing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivablesView {
    pub report: ReceivableReport,
    pub warnings: Vec<String>,
}

pub struct Dashboard {
    finance: FinanceClient,
    clock: Arc<dyn Clock>,
    movements_since: Date,
}

impl Dashboard {
    pub fn new(finance: FinanceClient, clock: Arc<dyn Clock>, movements_since: Date) -> Self {
        Self {
            finance,
            clock,
            movements_since,
        }
    }

    pub fn finance(&self) -> &FinanceClient {
        &self.finance
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    pub async fn movement_report(
        &self,
        filter: &MovementFilter,
    ) -> Result<MovementReport, FetchError> {
        let movements = self.finance.movements(self.movements_since).await?;
        Ok(MovementReport::build(&movements, filter))
    }

    pub async fn balance_report(&self, banks: &[String]) -> Result<BalanceReport, FetchError> {
        let balances = self.finance.balances().await?;
        Ok(BalanceReport::build(&balances, banks))
    }

    /// Banks seen in movements or balances.
    pub async fn bank_options(&self) -> Result<Vec<String>, FetchError> {
        let (movements, balances) = tokio::try_join!(
            self.finance.movements(self.movements_since),
            self.finance.balances()
        )?;
        Ok(bank_options(&movements, &balances))
    }

    pub async fn receivables_view(
        &self,
        filter: &ReceivableFilter,
    ) -> Result<ReceivablesView, FetchError> {
        let today = self.today();
        let snapshot = self.finance.receivables(today).await?;
        Ok(ReceivablesView {
            report: ReceivableReport::build(&snapshot.rows, filter, today),
            warnings: snapshot.warnings,
        })
    }
}
