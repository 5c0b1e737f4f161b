use serde_json::json;

use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Context};

pub async fn run(context: &Context) -> Result<CommandResult, CliError> {
    let banks = context.dashboard()?.bank_options().await?;
    let table = Table::new(["Banco"]).with_rows(banks.iter().map(|bank| vec![bank.clone()]));
    Ok(CommandResult::ok(json!({ "banks": banks })).with_table(table))
}
