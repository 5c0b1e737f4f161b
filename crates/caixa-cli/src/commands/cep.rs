use crate::cli::CepArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Context};

pub async fn run(args: &CepArgs, context: &Context) -> Result<CommandResult, CliError> {
    let address = context.resolver().resolve(&args.cep).await?;

    let table = Table::new(["Campo", "Valor"]).with_rows([
        vec![String::from("CEP"), address.cep.formatted()],
        vec![String::from("Logradouro"), address.street.clone()],
        vec![String::from("Bairro"), address.neighborhood.clone()],
        vec![String::from("Cidade"), address.city.clone()],
        vec![String::from("UF"), address.state.clone()],
        vec![String::from("Fonte"), address.provider.to_string()],
    ]);

    Ok(CommandResult::ok(serde_json::to_value(&address)?).with_table(table))
}
