use std::sync::Arc;

use caixa_core::SystemClock;
use caixa_web::AppState;

use crate::cli::ServeArgs;
use crate::error::CliError;

use super::Context;

pub async fn run(args: &ServeArgs, context: &Context) -> Result<(), CliError> {
    let state = AppState::from_config(
        context.config(),
        context.transport(),
        Arc::new(SystemClock),
        args.cache_mode(),
    );
    let static_dir = args
        .static_dir
        .as_ref()
        .map(|dir| dir.to_string_lossy().into_owned());

    caixa_web::serve(state, &args.host, args.port, static_dir.as_deref())
        .await
        .map_err(|error| CliError::Server(error.to_string()))
}
