use serde_json::json;

use caixa_core::{DateRange, MovementFilter};

use crate::cli::MovementArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Context};

pub async fn run(args: &MovementArgs, context: &Context) -> Result<CommandResult, CliError> {
    let filter = MovementFilter {
        range: DateRange::parse_bounds(args.from.as_deref(), args.to.as_deref())?,
        banks: args.banks.clone(),
    };
    let report = context.dashboard()?.movement_report(&filter).await?;

    let statement = report
        .statement
        .iter()
        .map(|row| row.formatted())
        .collect::<Vec<_>>();
    let kpis = report.kpis.formatted();

    let table = Table::new(["Data", "Descrição", "Entrada", "Saída"])
        .with_rows(statement.iter().map(|row| {
            vec![
                row.date.clone(),
                row.description.clone(),
                row.inflow.clone(),
                row.outflow.clone(),
            ]
        }))
        .with_summary("Entradas", &kpis.total_inflow)
        .with_summary("Saídas", &kpis.total_outflow)
        .with_summary("Saldo do período", &kpis.net);

    let data = json!({
        "rows": report.rows,
        "statement": report.statement,
        "statement_formatted": statement,
        "kpis": report.kpis,
        "kpis_formatted": kpis,
        "bank_flows": report.bank_flows,
    });
    Ok(CommandResult::ok(data).with_table(table))
}
