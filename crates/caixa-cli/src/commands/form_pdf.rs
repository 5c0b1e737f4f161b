use std::fs;

use serde_json::json;
use tracing::info;

use caixa_core::pdf::registration_file_name;
use caixa_core::{render_registration_pdf, ExportedDocument, RegistrationForm};

use crate::cli::FormPdfArgs;
use crate::error::CliError;
use crate::output::Table;

use super::CommandResult;

pub fn run(args: &FormPdfArgs) -> Result<CommandResult, CliError> {
    let raw = fs::read_to_string(&args.input)?;
    let form: RegistrationForm = serde_json::from_str(&raw)?;

    let bytes = render_registration_pdf(&form);
    let document = ExportedDocument::pdf(registration_file_name(&form), &bytes);

    let mut table = Table::new(["Campo", "Valor"]).with_rows([
        vec![String::from("Arquivo"), document.file_name.clone()],
        vec![String::from("Bytes"), bytes.len().to_string()],
    ]);

    let mut data = json!({
        "file_name": document.file_name,
        "mime_type": document.mime_type,
        "bytes": bytes.len(),
    });

    if let Some(output) = &args.output {
        fs::write(output, &bytes)?;
        info!(path = %output.display(), bytes = bytes.len(), "registration PDF written");
        data["output"] = json!(output.display().to_string());
        table = table.with_rows([vec![String::from("Saída"), output.display().to_string()]]);
    }

    if args.base64 || args.output.is_none() {
        data["content_base64"] = json!(document.content_base64);
    }

    Ok(CommandResult::ok(data).with_table(table))
}
