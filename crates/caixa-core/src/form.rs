//! Registration form state and the per-session store that holds it.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::AddressRecord;

/// Idle time after which a session is dropped.
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

/// Cadastral data typed in by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub legal_name: String,
    pub trade_name: String,
    pub tax_id: String,
    pub state_registration: String,
    pub email: String,
    pub phone: String,
    pub postal_code: String,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub contact_name: String,
    pub notes: String,
}

impl RegistrationForm {
    /// Fills the address block from a resolved postal code. Number and
    /// complement are left as typed.
    pub fn apply_address(&mut self, address: &AddressRecord) {
        self.postal_code = address.cep.formatted();
        self.street = address.street.clone();
        self.neighborhood = address.neighborhood.clone();
        self.city = address.city.clone();
        self.state = address.state.clone();
    }

    /// Labelled fields in display order.
    pub fn labelled_fields(&self) -> [(&'static str, &str); 15] {
        [
            ("Razão social", self.legal_name.as_str()),
            ("Nome fantasia", self.trade_name.as_str()),
            ("CNPJ/CPF", self.tax_id.as_str()),
            ("Inscrição estadual", self.state_registration.as_str()),
            ("E-mail", self.email.as_str()),
            ("Telefone", self.phone.as_str()),
            ("CEP", self.postal_code.as_str()),
            ("Logradouro", self.street.as_str()),
            ("Número", self.number.as_str()),
            ("Complemento", self.complement.as_str()),
            ("Bairro", self.neighborhood.as_str()),
            ("Cidade", self.city.as_str()),
            ("UF", self.state.as_str()),
            ("Contato", self.contact_name.as_str()),
            ("Observações", self.notes.as_str()),
        ]
    }

    pub fn is_blank(&self) -> bool {
        self.labelled_fields()
            .iter()
            .all(|(_, value)| value.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self)
    }
}

#[derive(Debug)]
struct SessionEntry {
    form: RegistrationForm,
    last_seen: Instant,
}

/// In-memory form state keyed by session id.
///
/// Sessions idle for longer than the timeout read as absent and are removed
/// on the next access or by [`SessionStore::purge_idle`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_IDLE)
    }
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub async fn create(&self) -> SessionId {
        let id = SessionId::new();
        self.inner.write().await.insert(
            id,
            SessionEntry {
                form: RegistrationForm::default(),
                last_seen: Instant::now(),
            },
        );
        debug!(session = %id, "session created");
        id
    }

    /// Current form; refreshes the idle clock.
    pub async fn get(&self, id: SessionId) -> Option<RegistrationForm> {
        let mut sessions = self.inner.write().await;
        let entry = self.live_entry(&mut sessions, id)?;
        entry.last_seen = Instant::now();
        Some(entry.form.clone())
    }

    /// Replaces the form; `false` when the session does not exist.
    pub async fn replace(&self, id: SessionId, form: RegistrationForm) -> bool {
        self.update(id, |current| *current = form).await.is_some()
    }

    /// Edits the form in place and returns the result.
    pub async fn update<F>(&self, id: SessionId, edit: F) -> Option<RegistrationForm>
    where
        F: FnOnce(&mut RegistrationForm),
    {
        let mut sessions = self.inner.write().await;
        let entry = self.live_entry(&mut sessions, id)?;
        edit(&mut entry.form);
        entry.last_seen = Instant::now();
        Some(entry.form.clone())
    }

    pub async fn remove(&self, id: SessionId) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }

    /// Drops idle sessions, returning how many were removed.
    pub async fn purge_idle(&self) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        let timeout = self.idle_timeout;
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= timeout);
        let purged = before - sessions.len();
        if purged > 0 {
            debug!(purged, "idle sessions purged");
        }
        purged
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn live_entry<'a>(
        &self,
        sessions: &'a mut HashMap<SessionId, SessionEntry>,
        id: SessionId,
    ) -> Option<&'a mut SessionEntry> {
        let expired = sessions
            .get(&id)
            .is_some_and(|entry| entry.last_seen.elapsed() > self.idle_timeout);
        if expired {
            sessions.remove(&id);
            return None;
        }
        sessions.get_mut(&id)
    }
}
