//! In-memory identity provider implementation.
//!
//! Backs the interactive shell and the test suite. Accounts, federated links and
//! the current identity live in process memory and vanish with it.

use async_trait::async_trait;
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use super::{
    AuthError, Credential, ExternalProvider, ExternalSignInClient, IdentityChange, IdentityId, IdentityListener,
    IdentityProvider, ListenerId,
};
use crate::constants::{
    ERROR_CREDENTIAL_REJECTED, ERROR_EMAIL_IN_USE, ERROR_INVALID_EMAIL, ERROR_WEAK_PASSWORD, ERROR_WRONG_CREDENTIALS,
    MIN_PASSWORD_LENGTH,
};

const NETWORK_ERROR: &str =
    "A network error (such as timeout, interrupted connection or unreachable host) has occurred.";
const SESSION_EXPIRED: &str = "The user's credential is no longer valid. The user must sign in again.";

#[derive(Debug, Clone)]
struct Account {
    id: IdentityId,
    password: String,
}

/// In-memory password identity provider with federated credential support.
pub struct MemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    federated: Mutex<HashMap<(ExternalProvider, String), IdentityId>>,
    rejected_tokens: Mutex<HashSet<String>>,
    current: Mutex<Option<IdentityId>>,
    listeners: Mutex<HashMap<u64, IdentityListener>>,
    next_listener_id: AtomicU64,
    latency: Duration,
    offline: AtomicBool,
    fail_sign_out: AtomicBool,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            federated: Mutex::new(HashMap::new()),
            rejected_tokens: Mutex::new(HashSet::new()),
            current: Mutex::new(None),
            listeners: Mutex::new(HashMap::new()),
            next_listener_id: AtomicU64::new(1),
            latency: Duration::ZERO,
            offline: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
        }
    }

    /// Delay every credential operation by `latency` to mimic a network round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Pre-register an account without going through validation.
    pub fn with_account(self, email: &str, password: &str) -> Self {
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.insert(
                normalize_email(email),
                Account {
                    id: new_identity_id(),
                    password: password.to_string(),
                },
            );
        }
        self
    }

    /// Start with an already established identity, as if restored from a previous run.
    pub fn with_restored_identity(self, identity: IdentityId) -> Self {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(identity);
        }
        self
    }

    /// Simulate losing connectivity: every credential operation fails.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make `sign_out` report an error (the identity is still cleared).
    pub fn set_fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    /// Refuse credential exchanges for `token`.
    pub fn reject_token(&self, token: &str) {
        if let Ok(mut rejected) = self.rejected_tokens.lock() {
            rejected.insert(token.to_string());
        }
    }

    /// Drop the current identity out-of-band and tell the listeners why.
    pub fn expire_session(&self) {
        let expired = self.current.lock().ok().and_then(|mut current| current.take());
        if let Some(identity) = expired {
            info!("Identity {} expired", identity);
            self.notify(IdentityChange {
                identity: None,
                error: Some(SESSION_EXPIRED.to_string()),
            });
        }
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().map(|accounts| accounts.len()).unwrap_or(0)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|listeners| listeners.len()).unwrap_or(0)
    }

    async fn round_trip(&self) -> Result<(), AuthError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(AuthError::NetworkOrProviderFailure(NETWORK_ERROR.to_string()));
        }
        Ok(())
    }

    fn establish(&self, identity: IdentityId) -> IdentityId {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(identity.clone());
        }
        self.notify(IdentityChange::signed_in(identity.clone()));
        identity
    }

    fn notify(&self, change: IdentityChange) {
        // Listeners run outside the lock so they may call back into the provider.
        let listeners: Vec<IdentityListener> = match self.listeners.lock() {
            Ok(listeners) => listeners.values().cloned().collect(),
            Err(_) => return,
        };
        debug!("Notifying {} identity listeners", listeners.len());
        for listener in listeners {
            listener(change.clone());
        }
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    fn provider_name(&self) -> &str {
        "memory"
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityId, AuthError> {
        self.round_trip().await?;
        if !is_valid_email(email) {
            return Err(AuthError::InvalidCredential(ERROR_INVALID_EMAIL.to_string()));
        }

        let account = self
            .accounts
            .lock()
            .ok()
            .and_then(|accounts| accounts.get(&normalize_email(email)).cloned());

        match account {
            Some(account) if account.password == password => Ok(self.establish(account.id)),
            _ => Err(AuthError::InvalidCredential(ERROR_WRONG_CREDENTIALS.to_string())),
        }
    }

    async fn create_identity(&self, email: &str, password: &str) -> Result<IdentityId, AuthError> {
        self.round_trip().await?;
        if !is_valid_email(email) {
            return Err(AuthError::InvalidCredential(ERROR_INVALID_EMAIL.to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::InvalidCredential(ERROR_WEAK_PASSWORD.to_string()));
        }

        let id = {
            let mut accounts = self
                .accounts
                .lock()
                .map_err(|_| AuthError::NetworkOrProviderFailure("account table unavailable".to_string()))?;
            let key = normalize_email(email);
            if accounts.contains_key(&key) {
                return Err(AuthError::InvalidCredential(ERROR_EMAIL_IN_USE.to_string()));
            }
            let id = new_identity_id();
            accounts.insert(
                key,
                Account {
                    id: id.clone(),
                    password: password.to_string(),
                },
            );
            id
        };

        info!("Created identity {}", id);
        Ok(self.establish(id))
    }

    async fn sign_in_with_credential(&self, credential: Credential) -> Result<IdentityId, AuthError> {
        self.round_trip().await?;

        let token = credential.token().to_string();
        let rejected = self
            .rejected_tokens
            .lock()
            .map(|rejected| rejected.contains(&token))
            .unwrap_or(false);
        if token.trim().is_empty() || rejected {
            return Err(AuthError::InvalidCredential(ERROR_CREDENTIAL_REJECTED.to_string()));
        }

        let id = self
            .federated
            .lock()
            .map(|mut links| {
                links
                    .entry((credential.provider(), token))
                    .or_insert_with(new_identity_id)
                    .clone()
            })
            .map_err(|_| AuthError::NetworkOrProviderFailure("credential table unavailable".to_string()))?;

        Ok(self.establish(id))
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.current.lock().ok().and_then(|mut current| current.take());
        if previous.is_some() {
            self.notify(IdentityChange::signed_out());
        }
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::NetworkOrProviderFailure(NETWORK_ERROR.to_string()));
        }
        Ok(())
    }

    fn current_identity(&self) -> Option<IdentityId> {
        self.current.lock().ok().and_then(|current| current.clone())
    }

    fn subscribe(&self, listener: IdentityListener) -> ListenerId {
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.insert(id, listener);
        }
        ListenerId(id)
    }

    fn unsubscribe(&self, id: ListenerId) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.remove(&id.0);
        }
    }
}

/// In-memory federated sign-in client that only tracks revocations.
pub struct MemoryExternalClient {
    provider: ExternalProvider,
    sign_out_calls: AtomicUsize,
    fail_sign_out: AtomicBool,
}

impl MemoryExternalClient {
    pub fn new(provider: ExternalProvider) -> Self {
        Self {
            provider,
            sign_out_calls: AtomicUsize::new(0),
            fail_sign_out: AtomicBool::new(false),
        }
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }
}

impl ExternalSignInClient for MemoryExternalClient {
    fn provider(&self) -> ExternalProvider {
        self.provider
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::NetworkOrProviderFailure(format!(
                "{} sign-out failed",
                self.provider
            )));
        }
        Ok(())
    }
}

fn new_identity_id() -> IdentityId {
    IdentityId(Uuid::new_v4().to_string())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    }
}
