use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Customer record from the clients endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
}

/// Lookup of client names by id, used to fill receivables that arrive without
/// an embedded client name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientDirectory {
    names: HashMap<String, String>,
}

impl ClientDirectory {
    pub fn new(clients: &[Client]) -> Self {
        let names = clients
            .iter()
            .filter(|client| !client.id.is_empty() && !client.name.is_empty())
            .map(|client| (client.id.clone(), client.name.clone()))
            .collect();
        Self { names }
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
