use serde_json::json;

use crate::cli::BalanceArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Context};

pub async fn run(args: &BalanceArgs, context: &Context) -> Result<CommandResult, CliError> {
    let report = context.dashboard()?.balance_report(&args.banks).await?;
    let formatted = report.formatted();

    let table = Table::new(["Banco", "Saldo"])
        .with_rows(formatted.iter().map(|(bank, balance)| vec![bank.clone(), balance.clone()]));

    let data = json!({
        "rows": report.rows,
        "total": report.total,
        "formatted": formatted
            .iter()
            .map(|(bank_name, balance)| json!({ "bank_name": bank_name, "balance": balance }))
            .collect::<Vec<_>>(),
    });
    Ok(CommandResult::ok(data).with_table(table))
}
