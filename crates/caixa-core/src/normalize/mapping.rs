//! Per-endpoint field-name mapping tables.
//!
//! Every canonical field lists candidate key paths. Paths are dotted for
//! nested objects (`banco.nome`) and the first candidate holding a non-null
//! value wins, so revisions of the upstream API that rename or move a field
//! are a configuration change.

use serde::{Deserialize, Serialize};

fn paths(candidates: &[&str]) -> Vec<String> {
    candidates.iter().map(|path| (*path).to_owned()).collect()
}

/// Mapping tables for every normalized collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub movements: MovementFields,
    pub balances: BalanceFields,
    pub receivables: ReceivableFields,
    pub clients: ClientFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementFields {
    pub amount: Vec<String>,
    pub occurred_at: Vec<String>,
    pub description: Vec<String>,
    pub operation: Vec<String>,
    pub bank: Vec<String>,
}

impl Default for MovementFields {
    fn default() -> Self {
        Self {
            amount: paths(&["valor"]),
            occurred_at: paths(&["dataMovimento"]),
            description: paths(&["descricao"]),
            operation: paths(&["operacao"]),
            bank: paths(&["nomeBanco", "banco.nome"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceFields {
    pub bank: Vec<String>,
    pub balance: Vec<String>,
}

impl Default for BalanceFields {
    fn default() -> Self {
        Self {
            bank: paths(&["banco.nome", "nomeBanco"]),
            balance: paths(&["saldo"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceivableFields {
    pub id: Vec<String>,
    pub installment: Vec<String>,
    pub client_name: Vec<String>,
    pub client_id: Vec<String>,
    pub project: Vec<String>,
    pub number: Vec<String>,
    pub amount: Vec<String>,
    pub due_date: Vec<String>,
    pub payment_date: Vec<String>,
    pub credit_date: Vec<String>,
}

impl Default for ReceivableFields {
    fn default() -> Self {
        Self {
            id: paths(&["id"]),
            installment: paths(&["parcela", "numeroParcela"]),
            client_name: paths(&["cliente.nomeRazaoSocial", "nomeCliente"]),
            client_id: paths(&["idCliente", "cliente.id"]),
            project: paths(&["codigoProjeto"]),
            number: paths(&["numero"]),
            amount: paths(&["valorBruto", "valorParcela", "valorAReceberParcela"]),
            due_date: paths(&["dataVencimentoReal", "dataVencimentoNominal"]),
            payment_date: paths(&["dataBaixa"]),
            credit_date: paths(&["dataCredito"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientFields {
    pub id: Vec<String>,
    pub name: Vec<String>,
}

impl Default for ClientFields {
    fn default() -> Self {
        Self {
            id: paths(&["id"]),
            name: paths(&["nomeRazaoSocial"]),
        }
    }
}
