//! Typed mapping of raw API JSON into canonical records.
//!
//! Absent or unexpected fields never fail a table: text falls back to empty,
//! dates to `None` and amounts to zero (the row is kept so totals stay
//! defined).

mod mapping;

use rust_decimal::Decimal;
use serde_json::Value;
use time::Date;
use tracing::{debug, warn};

use crate::domain::date::parse_api_datetime;
use crate::domain::{
    BankBalance, Client, ClientDirectory, Movement, Receivable, ReceivableStatus,
};
use crate::money::parse_amount;

pub use mapping::{BalanceFields, ClientFields, FieldMapping, MovementFields, ReceivableFields};

/// Records of a raw collection: `{"itens": [...]}` or a bare array.
///
/// Anything else, `null` included, is an empty collection.
pub fn collection_items(raw: &Value) -> &[Value] {
    match raw {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("itens") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    }
}

/// Walks a dotted key path; `null` and blank strings count as absent.
fn path_value<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(record, |current, key| current.get(key))
        .filter(|value| match value {
            Value::Null => false,
            Value::String(text) => !text.trim().is_empty(),
            _ => true,
        })
}

/// First candidate path holding a present value.
pub fn lookup<'a>(record: &'a Value, candidates: &[String]) -> Option<&'a Value> {
    candidates
        .iter()
        .find_map(|path| path_value(record, path))
}

fn text(record: &Value, candidates: &[String]) -> String {
    match lookup(record, candidates) {
        Some(Value::String(value)) => value.trim().to_owned(),
        Some(Value::Number(value)) => value.to_string(),
        Some(Value::Bool(value)) => value.to_string(),
        _ => String::new(),
    }
}

fn date_time(record: &Value, candidates: &[String]) -> Option<(Date, Option<time::Time>)> {
    match lookup(record, candidates) {
        Some(Value::String(raw)) => parse_api_datetime(raw),
        _ => None,
    }
}

fn date(record: &Value, candidates: &[String]) -> Option<Date> {
    date_time(record, candidates).map(|(date, _)| date)
}

/// Amount with zero fallback; `coerced` counts the fallbacks.
fn amount(record: &Value, candidates: &[String], coerced: &mut usize) -> Decimal {
    match lookup(record, candidates).and_then(parse_amount) {
        Some(value) => value,
        None => {
            *coerced += 1;
            Decimal::ZERO
        }
    }
}

fn objects(raw: &Value) -> impl Iterator<Item = &Value> {
    collection_items(raw).iter().filter(|item| item.is_object())
}

fn report_coerced(table: &'static str, coerced: usize) {
    if coerced > 0 {
        warn!(table, rows = coerced, "amounts missing or not numeric, counted as zero");
    }
}

/// Applies a [`FieldMapping`] to raw collections.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    mapping: FieldMapping,
}

impl Normalizer {
    pub fn new(mapping: FieldMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    pub fn movements(&self, raw: &Value) -> Vec<Movement> {
        let fields = &self.mapping.movements;
        let mut coerced = 0;

        let movements = objects(raw)
            .map(|record| {
                let when = date_time(record, &fields.occurred_at);
                Movement {
                    occurred_on: when.map(|(date, _)| date),
                    occurred_time: when.and_then(|(_, time)| time),
                    description: text(record, &fields.description).to_uppercase(),
                    amount: amount(record, &fields.amount, &mut coerced),
                    operation_code: text(record, &fields.operation),
                    bank_name: text(record, &fields.bank),
                }
            })
            .collect::<Vec<_>>();

        report_coerced("movements", coerced);
        debug!(rows = movements.len(), "normalized movements");
        movements
    }

    /// One record per bank; duplicates are summed in first-seen order.
    pub fn balances(&self, raw: &Value) -> Vec<BankBalance> {
        let fields = &self.mapping.balances;
        let mut coerced = 0;
        let mut balances: Vec<BankBalance> = Vec::new();

        for record in objects(raw) {
            let bank_name = text(record, &fields.bank);
            let balance = amount(record, &fields.balance, &mut coerced);

            match balances.iter_mut().find(|entry| entry.bank_name == bank_name) {
                Some(entry) => {
                    debug!(bank = %bank_name, "merging duplicate bank balance");
                    entry.balance = entry.balance.saturating_add(balance);
                }
                None => balances.push(BankBalance { bank_name, balance }),
            }
        }

        report_coerced("balances", coerced);
        balances
    }

    pub fn clients(&self, raw: &Value) -> Vec<Client> {
        let fields = &self.mapping.clients;
        objects(raw)
            .map(|record| Client {
                id: text(record, &fields.id),
                name: text(record, &fields.name),
            })
            .collect()
    }

    /// Receivables with derived status; client names missing from the
    /// payload are filled from `directory` by client id.
    pub fn receivables(
        &self,
        raw: &Value,
        today: Date,
        directory: &ClientDirectory,
    ) -> Vec<Receivable> {
        let fields = &self.mapping.receivables;
        let mut coerced = 0;

        let receivables = objects(raw)
            .map(|record| {
                let client_id = text(record, &fields.client_id);
                let mut client_name = text(record, &fields.client_name);
                if client_name.is_empty() {
                    if let Some(name) = directory.name_of(&client_id) {
                        client_name = name.to_owned();
                    }
                }

                let due_date = date(record, &fields.due_date);
                let payment_date = date(record, &fields.payment_date);

                Receivable {
                    id: text(record, &fields.id),
                    installment_number: text(record, &fields.installment),
                    number: text(record, &fields.number),
                    client_id,
                    client_name,
                    project_code: text(record, &fields.project),
                    due_date,
                    payment_date,
                    credit_date: date(record, &fields.credit_date),
                    amount: amount(record, &fields.amount, &mut coerced).abs(),
                    status: ReceivableStatus::derive(payment_date, due_date, today),
                }
            })
            .collect::<Vec<_>>();

        report_coerced("receivables", coerced);
        debug!(rows = receivables.len(), "normalized receivables");
        receivables
    }
}
