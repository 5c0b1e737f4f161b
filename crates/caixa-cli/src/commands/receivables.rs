use serde_json::json;

use caixa_core::report::FormattedReceivable;
use caixa_core::{format_brl, DateRange, ReceivableFilter, ReceivableStatus};

use crate::cli::ReceivableArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Context};

pub async fn run(args: &ReceivableArgs, context: &Context) -> Result<CommandResult, CliError> {
    let statuses = args
        .statuses
        .iter()
        .map(|raw| raw.parse::<ReceivableStatus>())
        .collect::<Result<Vec<_>, _>>()?;
    let filter = ReceivableFilter {
        range: DateRange::parse_bounds(args.from.as_deref(), args.to.as_deref())?,
        statuses,
    };

    let view = context.dashboard()?.receivables_view(&filter).await?;
    let report = view.report;
    let rows = report
        .rows
        .iter()
        .map(FormattedReceivable::from)
        .collect::<Vec<_>>();
    let kpis = report.kpis.formatted();

    let mut table = Table::new(["Cliente", "Parcela", "Vencimento", "Pagamento", "Valor", "Situação"])
        .with_rows(rows.iter().map(|row| {
            vec![
                row.client_name.clone(),
                row.installment_number.clone(),
                row.due_date.clone(),
                row.payment_date.clone(),
                row.amount.clone(),
                row.status.to_owned(),
            ]
        }))
        .with_summary("Em aberto", &kpis.total_open)
        .with_summary("Vencido", &kpis.total_overdue)
        .with_summary("Recebido no mês", &kpis.total_settled_this_month);
    for bucket in &report.buckets {
        table = table.with_summary(
            bucket.label,
            &format!("{} ({})", format_brl(bucket.amount), bucket.count),
        );
    }

    let data = json!({
        "rows": report.rows,
        "rows_formatted": rows,
        "kpis": report.kpis,
        "kpis_formatted": kpis,
        "buckets": report.buckets,
    });
    Ok(CommandResult::ok(data)
        .with_table(table)
        .with_warnings(view.warnings))
}
