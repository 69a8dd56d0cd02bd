use std::sync::{Arc, Mutex, PoisonError};

use ma_core::account::{AuthRecord, AuthUser};
use ma_core::ids::FlowSessionId;
use ma_core::tunnel::{FormTunnel, FormValue, FormVariables};

/// Flow-wide shared state handed to every section.
///
/// The registry, the form variables and the cached account sit behind one
/// lock each; no lock is held across an await.
#[derive(Clone)]
pub struct FlowContext {
    session_id: FlowSessionId,
    tunnel: Arc<Mutex<FormTunnel>>,
    account: Arc<Mutex<Option<AuthUser>>>,
}

impl FlowContext {
    pub fn new() -> Self {
        Self::with_session(FlowSessionId::new())
    }

    pub fn with_session(session_id: FlowSessionId) -> Self {
        Self {
            session_id,
            tunnel: Arc::new(Mutex::new(FormTunnel::new())),
            account: Arc::new(Mutex::new(None)),
        }
    }

    pub fn session_id(&self) -> &FlowSessionId {
        &self.session_id
    }

    /// Run `f` with exclusive access to the registry.
    pub fn with_tunnel<R>(&self, f: impl FnOnce(&mut FormTunnel) -> R) -> R {
        let mut guard = self.tunnel.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn get_value(&self, name: &str) -> String {
        self.with_tunnel(|tunnel| tunnel.get_value(name))
    }

    pub fn set_variable(&self, key: &str, value: impl Into<FormValue>) {
        let value = value.into();
        self.with_tunnel(|tunnel| tunnel.set_variable(key, value));
    }

    pub fn flag(&self, key: &str) -> bool {
        self.with_tunnel(|tunnel| tunnel.flag(key))
    }

    pub fn variables(&self) -> FormVariables {
        self.with_tunnel(|tunnel| tunnel.variables().clone())
    }

    pub fn restore_variables(&self, keys: &[&str], snapshot: &FormVariables) {
        self.with_tunnel(|tunnel| tunnel.restore_variables(keys, snapshot));
    }

    pub fn cached_user(&self) -> Option<AuthUser> {
        self.account
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn cached_record(&self) -> Option<AuthRecord> {
        self.cached_user().map(|user| user.auth_record)
    }

    pub fn set_cached_user(&self, user: Option<AuthUser>) {
        *self.account.lock().unwrap_or_else(PoisonError::into_inner) = user;
    }

    /// Drop registrations, variables and the cached account.
    pub fn teardown(&self) {
        self.with_tunnel(FormTunnel::clear);
        self.set_cached_user(None);
    }
}

impl Default for FlowContext {
    fn default() -> Self {
        Self::new()
    }
}
