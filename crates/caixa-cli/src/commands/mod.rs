mod balances;
mod banks;
mod cep;
mod form_pdf;
mod movements;
mod receivables;
mod serve;

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use caixa_core::{
    AppConfig, CacheMode, CacheStore, CepResolver, Dashboard, FinanceClient, HttpClient,
    ReqwestHttpClient, SystemClock,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::{Envelope, Table};

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub table: Option<Table>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            table: None,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.table = Some(table);
        self
    }
}

/// Configuration and transport shared by every command.
pub struct Context {
    config: AppConfig,
    transport: Arc<dyn HttpClient>,
}

impl Context {
    pub fn new(config: AppConfig, transport: Arc<dyn HttpClient>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Dashboard for one-shot commands; responses bypass the cache. Fails
    /// with a config error when no API token is set.
    pub fn dashboard(&self) -> Result<Dashboard, CliError> {
        let cache = CacheStore::new(self.config.api.cache_ttl);
        let finance = FinanceClient::from_config(&self.config, Arc::clone(&self.transport), cache)?
            .with_cache_mode(CacheMode::Bypass);
        Ok(Dashboard::new(
            finance,
            Arc::new(SystemClock),
            self.config.api.movements_since,
        ))
    }

    pub fn resolver(&self) -> CepResolver {
        CepResolver::from_order(
            Arc::clone(&self.transport),
            &self.config.cep.providers,
            self.config.cep.timeout_ms,
        )
    }

    pub fn transport(&self) -> Arc<dyn HttpClient> {
        Arc::clone(&self.transport)
    }
}

/// Runs a one-shot command; `None` for `serve`, which writes no envelope.
pub async fn run(cli: &Cli) -> Result<Option<(Envelope, Option<Table>)>, CliError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let context = Context::new(config, Arc::new(ReqwestHttpClient::new()));
    execute(&cli.command, &context).await
}

pub async fn execute(
    command: &Command,
    context: &Context,
) -> Result<Option<(Envelope, Option<Table>)>, CliError> {
    let started = Instant::now();

    let (name, result) = match command {
        Command::Cep(args) => ("cep", cep::run(args, context).await?),
        Command::Movements(args) => ("movements", movements::run(args, context).await?),
        Command::Balances(args) => ("balances", balances::run(args, context).await?),
        Command::Banks => ("banks", banks::run(context).await?),
        Command::Receivables(args) => ("receivables", receivables::run(args, context).await?),
        Command::FormPdf(args) => ("form-pdf", form_pdf::run(args)?),
        Command::Serve(args) => {
            serve::run(args, context).await?;
            return Ok(None);
        }
    };

    let envelope = Envelope {
        command: name,
        generated_at: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
        latency_ms: started.elapsed().as_millis() as u64,
        warnings: result.warnings,
        data: result.data,
    };
    Ok(Some((envelope, result.table)))
}
