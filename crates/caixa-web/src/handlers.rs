use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use caixa_core::report::{
    split_list, BankFlow, FormattedMovementKpis, FormattedReceivable, FormattedReceivableKpis,
    FormattedStatementRow, MovementKpis, ReceivableKpis, StatementRow, StatusBucket,
};
use caixa_core::{
    export_registration_pdf, AddressRecord, BankBalance, DateRange, ExportedDocument, Movement,
    MovementFilter, Receivable, ReceivableFilter, ReceivableStatus, RegistrationForm, SessionId,
};

use crate::{AppError, AppState};

type Shared = State<Arc<AppState>>;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ============================================================================
// Postal codes
// ============================================================================

pub async fn lookup_cep(
    State(state): Shared,
    Path(cep): Path<String>,
) -> Result<Json<AddressRecord>, AppError> {
    let address = state.resolver.resolve(&cep).await?;
    Ok(Json(address))
}

// ============================================================================
// Financial views
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct MovementQuery {
    from: Option<String>,
    to: Option<String>,
    /// Comma-separated bank names.
    banks: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MovementsResponse {
    rows: Vec<Movement>,
    statement: Vec<StatementRow>,
    statement_formatted: Vec<FormattedStatementRow>,
    kpis: MovementKpis,
    kpis_formatted: FormattedMovementKpis,
    bank_flows: Vec<BankFlow>,
}

pub async fn movements(
    State(state): Shared,
    Query(query): Query<MovementQuery>,
) -> Result<Json<MovementsResponse>, AppError> {
    let filter = MovementFilter {
        range: DateRange::parse_bounds(query.from.as_deref(), query.to.as_deref())?,
        banks: query.banks.as_deref().map(split_list).unwrap_or_default(),
    };

    let report = state.dashboard()?.movement_report(&filter).await?;
    Ok(Json(MovementsResponse {
        statement_formatted: report.statement.iter().map(StatementRow::formatted).collect(),
        kpis_formatted: report.kpis.formatted(),
        rows: report.rows,
        statement: report.statement,
        kpis: report.kpis,
        bank_flows: report.bank_flows,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct BalanceQuery {
    banks: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormattedBalance {
    bank_name: String,
    balance: String,
}

#[derive(Debug, Serialize)]
pub struct BalancesResponse {
    rows: Vec<BankBalance>,
    total: rust_decimal::Decimal,
    /// Bank lines followed by the total line.
    formatted: Vec<FormattedBalance>,
}

pub async fn balances(
    State(state): Shared,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<BalancesResponse>, AppError> {
    let banks = query.banks.as_deref().map(split_list).unwrap_or_default();
    let report = state.dashboard()?.balance_report(&banks).await?;

    let formatted = report
        .formatted()
        .into_iter()
        .map(|(bank_name, balance)| FormattedBalance { bank_name, balance })
        .collect();

    Ok(Json(BalancesResponse {
        rows: report.rows,
        total: report.total,
        formatted,
    }))
}

pub async fn banks(State(state): Shared) -> Result<Json<Value>, AppError> {
    let banks = state.dashboard()?.bank_options().await?;
    Ok(Json(json!({ "banks": banks })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReceivableQuery {
    from: Option<String>,
    to: Option<String>,
    /// Comma-separated status names or labels.
    statuses: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReceivablesResponse {
    rows: Vec<Receivable>,
    rows_formatted: Vec<FormattedReceivable>,
    kpis: ReceivableKpis,
    kpis_formatted: FormattedReceivableKpis,
    buckets: Vec<StatusBucket>,
    warnings: Vec<String>,
}

pub async fn receivables(
    State(state): Shared,
    Query(query): Query<ReceivableQuery>,
) -> Result<Json<ReceivablesResponse>, AppError> {
    let statuses = query
        .statuses
        .as_deref()
        .map(split_list)
        .unwrap_or_default()
        .iter()
        .map(|raw| raw.parse::<ReceivableStatus>())
        .collect::<Result<Vec<_>, _>>()?;
    let filter = ReceivableFilter {
        range: DateRange::parse_bounds(query.from.as_deref(), query.to.as_deref())?,
        statuses,
    };

    let view = state.dashboard()?.receivables_view(&filter).await?;
    let report = view.report;
    Ok(Json(ReceivablesResponse {
        rows_formatted: report.rows.iter().map(FormattedReceivable::from).collect(),
        kpis_formatted: report.kpis.formatted(),
        rows: report.rows,
        kpis: report.kpis,
        buckets: report.buckets,
        warnings: view.warnings,
    }))
}

// ============================================================================
// Registration form sessions
// ============================================================================

fn session_id(raw: &str) -> Result<SessionId, AppError> {
    raw.parse()
        .map_err(|_| AppError::bad_request("invalid session id"))
}

fn session_not_found() -> AppError {
    AppError::not_found("session not found")
}

pub async fn create_session(State(state): Shared) -> impl IntoResponse {
    state.sessions.purge_idle().await;
    let id = state.sessions.create().await;
    (
        StatusCode::CREATED,
        Json(json!({ "session_id": id.to_string() })),
    )
}

pub async fn delete_session(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(session_id(&id)?).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found())
    }
}

pub async fn get_form(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<RegistrationForm>, AppError> {
    state
        .sessions
        .get(session_id(&id)?)
        .await
        .map(Json)
        .ok_or_else(session_not_found)
}

pub async fn put_form(
    State(state): Shared,
    Path(id): Path<String>,
    Json(form): Json<RegistrationForm>,
) -> Result<Json<RegistrationForm>, AppError> {
    let id = session_id(&id)?;
    if !state.sessions.replace(id, form.clone()).await {
        return Err(session_not_found());
    }
    Ok(Json(form))
}

#[derive(Debug, Deserialize)]
pub struct AddressFill {
    cep: String,
}

/// Resolves the postal code and writes the address block into the form.
/// On failure the stored form is left untouched.
pub async fn fill_address(
    State(state): Shared,
    Path(id): Path<String>,
    Json(body): Json<AddressFill>,
) -> Result<Json<RegistrationForm>, AppError> {
    let id = session_id(&id)?;
    if state.sessions.get(id).await.is_none() {
        return Err(session_not_found());
    }

    let address = state.resolver.resolve(&body.cep).await?;
    state
        .sessions
        .update(id, |form| form.apply_address(&address))
        .await
        .map(Json)
        .ok_or_else(session_not_found)
}

pub async fn export_form(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<ExportedDocument>, AppError> {
    let form = state
        .sessions
        .get(session_id(&id)?)
        .await
        .ok_or_else(session_not_found)?;
    Ok(Json(export_registration_pdf(&form)))
}
