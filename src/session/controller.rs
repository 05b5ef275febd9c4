use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use super::operations::{OperationId, OperationKind, OperationManager, SessionEvent};
use super::state::{CompletionPolicy, SessionState};
use crate::auth::{
    AuthError, ExternalProvider, ExternalSignInClient, ExternalSignInResult, IdentityChange, ListenerId, Providers,
};
use crate::constants::{
    ERROR_EMPTY_CREDENTIALS, ERROR_FACEBOOK_EXCHANGE_FALLBACK, ERROR_FACEBOOK_LOGIN_CANCELLED,
    ERROR_FACEBOOK_LOGIN_FAILED, ERROR_FACEBOOK_LOGIN_MISSING, ERROR_GOOGLE_EXCHANGE_FALLBACK,
    ERROR_GOOGLE_SIGN_IN_CANCELLED, ERROR_GOOGLE_SIGN_IN_FAILED,
};
use crate::logger::Logger;

/// How long [`SessionController::settle`] waits on the channel before re-checking in-flight work.
const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Single source of truth for whether the user is authenticated.
///
/// Requests (`login`, `register`, `complete_external_sign_in`) return immediately with an
/// operation id. Their completions and the identity provider's listener notifications are
/// queued on a channel and only change the published state once the owner drains it with
/// [`process_pending_events`](Self::process_pending_events), [`next_event`](Self::next_event)
/// or [`settle`](Self::settle).
pub struct SessionController {
    providers: Providers,
    policy: CompletionPolicy,
    state: watch::Sender<SessionState>,
    operations: OperationManager,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    listener: Option<ListenerId>,
    // Completions with an id below this are stale under `LatestRequestWins`.
    request_barrier: OperationId,
    // Submitted operations whose completion has not been applied yet.
    awaiting: BTreeSet<OperationId>,
    // A discarded completion left the provider signed in.
    revoke_pending: bool,
    logger: Logger,
}

impl SessionController {
    /// Create a controller, subscribe to the identity provider and queue a notification
    /// for whatever identity the provider already holds (session restore).
    pub fn new(providers: Providers, policy: CompletionPolicy) -> Self {
        let (operations, events) = OperationManager::new();
        let (state, _) = watch::channel(SessionState::logged_out());

        info!("Using identity provider '{}'", providers.identity.provider_name());

        let sender = operations.event_sender();
        let listener = providers.identity.subscribe(Arc::new(move |change: IdentityChange| {
            let _ = sender.send(SessionEvent::IdentityChanged(change));
        }));

        let restored = providers.identity.current_identity();
        if let Some(identity) = &restored {
            info!("Identity provider reports existing identity {}", identity);
        }
        let _ = operations.event_sender().send(SessionEvent::IdentityChanged(IdentityChange {
            identity: restored,
            error: None,
        }));

        Self {
            providers,
            policy,
            state,
            operations,
            events,
            listener: Some(listener),
            request_barrier: 0,
            awaiting: BTreeSet::new(),
            revoke_pending: false,
            logger: Logger::new(),
        }
    }

    pub fn set_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }

    pub fn policy(&self) -> CompletionPolicy {
        self.policy
    }

    /// Snapshot of the current state.
    pub fn current_state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_logged_in
    }

    /// Observe every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Number of provider calls that have not reported back yet.
    pub fn in_flight(&mut self) -> usize {
        self.operations.cleanup_finished();
        self.operations.in_flight()
    }

    /// Sign in with email and password.
    ///
    /// Returns `None` when either field is empty; the error is recorded without
    /// contacting the provider.
    pub fn login(&mut self, email: &str, password: &str) -> Option<OperationId> {
        if email.trim().is_empty() || password.is_empty() {
            self.reject_request(OperationKind::Login);
            return None;
        }

        let identity = Arc::clone(&self.providers.identity);
        let (email, password) = (email.trim().to_string(), password.to_string());
        let id = self.submit(OperationKind::Login, async move { identity.sign_in(&email, &password).await });
        Some(id)
    }

    /// Create an account and sign in with it.
    pub fn register(&mut self, email: &str, password: &str) -> Option<OperationId> {
        if email.trim().is_empty() || password.is_empty() {
            self.reject_request(OperationKind::Register);
            return None;
        }

        let identity = Arc::clone(&self.providers.identity);
        let (email, password) = (email.trim().to_string(), password.to_string());
        let id = self.submit(OperationKind::Register, async move {
            identity.create_identity(&email, &password).await
        });
        Some(id)
    }

    /// Exchange the result of a federated sign-in flow for a session.
    ///
    /// Cancelled, failed or empty results never reach the identity provider: the error is
    /// recorded straight away, `is_logged_in` is left as it is and `None` is returned.
    pub fn complete_external_sign_in(&mut self, result: ExternalSignInResult) -> Option<OperationId> {
        let provider = result.provider;
        let credential = match result.into_credential() {
            Ok(credential) => credential,
            Err(error) => {
                let message = external_flow_message(provider, &error);
                self.logger
                    .log(format!("Session: {} sign-in flow did not produce a token: {}", provider, message));
                self.update_error_message(Some(message));
                return None;
            }
        };

        let identity = Arc::clone(&self.providers.identity);
        let id = self.submit(OperationKind::CredentialExchange(provider), async move {
            identity.sign_in_with_credential(credential).await
        });
        Some(id)
    }

    /// Revoke every provider session and go to logged-out.
    ///
    /// Provider sign-out errors are logged and otherwise ignored. In-flight requests keep
    /// running; what happens when they complete depends on the [`CompletionPolicy`].
    pub fn logout(&mut self) {
        self.logger.log("Session: Logging out of all providers".to_string());

        if let Err(e) = self.providers.identity.sign_out() {
            warn!("Identity provider sign-out failed: {}", e);
        }
        sign_out_quietly(self.providers.google.as_ref());
        sign_out_quietly(self.providers.facebook.as_ref());

        self.request_barrier = self.operations.peek_next_id();

        self.publish(SessionState::logged_out());
    }

    /// Replace the error message without touching the login status.
    pub fn update_error_message(&mut self, message: Option<String>) {
        let next = self.state.borrow().with_error(message);
        self.publish(next);
    }

    /// Apply every queued event without waiting. Returns how many were applied.
    pub fn process_pending_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next event and apply it, returning the resulting state.
    pub async fn next_event(&mut self) -> Option<SessionState> {
        let event = self.events.recv().await?;
        self.apply(event);
        Some(self.current_state())
    }

    /// Apply events until no provider call is outstanding and the queue is empty.
    pub async fn settle(&mut self) -> SessionState {
        loop {
            self.process_pending_events();
            self.operations.cleanup_finished();
            if self.operations.in_flight() == 0 {
                // A task may have finished between the drain and the cleanup.
                self.process_pending_events();
                // Every task has ended and its events are applied.
                self.awaiting.clear();
                self.revoke_discarded_identity();
                return self.current_state();
            }

            if let Ok(Some(event)) = tokio::time::timeout(SETTLE_POLL_INTERVAL, self.events.recv()).await {
                self.apply(event);
            }
        }
    }

    fn submit<Fut>(&mut self, kind: OperationKind, operation: Fut) -> OperationId
    where
        Fut: std::future::Future<Output = Result<crate::auth::IdentityId, AuthError>> + Send + 'static,
    {
        let id = self.operations.spawn(kind, operation);
        self.awaiting.insert(id);
        if self.policy == CompletionPolicy::LatestRequestWins {
            self.request_barrier = id;
        }
        self.logger
            .log(format!("Session: Started {} (operation {})", kind.description(), id));
        id
    }

    // The provider is never contacted, so the login status stays as it is.
    fn reject_request(&mut self, kind: OperationKind) {
        self.logger
            .log(format!("Session: {} rejected, missing email or password", kind.description()));
        self.update_error_message(Some(ERROR_EMPTY_CREDENTIALS.to_string()));
    }

    fn accepts(&self, id: OperationId) -> bool {
        match self.policy {
            CompletionPolicy::LastCompletionWins => true,
            CompletionPolicy::LatestRequestWins => id >= self.request_barrier,
        }
    }

    /// Whether a superseded operation may still sign the provider in.
    fn stale_in_flight(&self) -> bool {
        self.policy == CompletionPolicy::LatestRequestWins
            && self.awaiting.first().is_some_and(|oldest| *oldest < self.request_barrier)
    }

    /// Sign the provider out after a discarded success, once no newer request can still log in.
    fn revoke_discarded_identity(&mut self) {
        if !self.revoke_pending || !self.awaiting.is_empty() {
            return;
        }
        self.revoke_pending = false;
        if self.is_logged_in() {
            return;
        }

        self.logger
            .log("Session: Signing out identity left by a discarded sign-in".to_string());
        if let Err(e) = self.providers.identity.sign_out() {
            warn!("Identity provider sign-out failed: {}", e);
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Completed { id, kind, result } => {
                self.awaiting.remove(&id);
                let elapsed_ms = self
                    .operations
                    .finish(id)
                    .map(|operation| operation.started_at.elapsed().as_millis())
                    .unwrap_or_default();

                if !self.accepts(id) {
                    self.logger.log(format!(
                        "Session: Discarding stale {} result (operation {}, {} ms)",
                        kind.description(),
                        id,
                        elapsed_ms
                    ));
                    if result.is_ok() {
                        self.revoke_pending = true;
                    }
                    self.revoke_discarded_identity();
                    return;
                }

                match result {
                    Ok(identity) => {
                        self.logger.log(format!(
                            "Session: {} succeeded for identity {} (operation {}, {} ms)",
                            kind.description(),
                            identity,
                            id,
                            elapsed_ms
                        ));
                        self.publish(SessionState::logged_in());
                    }
                    Err(error) => {
                        let message = completion_failure_message(kind, &error);
                        self.logger.log(format!(
                            "Session: {} failed (operation {}, {} ms): {}",
                            kind.description(),
                            id,
                            elapsed_ms,
                            message
                        ));
                        self.publish(SessionState::failed(message));
                    }
                }
                self.revoke_discarded_identity();
            }
            SessionEvent::IdentityChanged(change) => {
                if change.identity.is_some() && self.stale_in_flight() {
                    // May come from the superseded operation; completions decide until it reports.
                    debug!("Ignoring sign-in notification while a superseded operation is pending");
                    return;
                }

                let current = self.current_state();
                let is_logged_in = change.identity.is_some();
                debug!(
                    "Identity change: logged_in {} -> {}, error {:?}",
                    current.is_logged_in, is_logged_in, change.error
                );

                let error_message = match change.error {
                    Some(error) => Some(error),
                    None if is_logged_in && !current.is_logged_in => None,
                    None => current.error_message,
                };
                self.publish(SessionState {
                    is_logged_in,
                    error_message,
                });
            }
        }
    }

    fn publish(&mut self, next: SessionState) {
        self.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            self.providers.identity.unsubscribe(listener);
        }
    }
}

fn sign_out_quietly(client: &dyn ExternalSignInClient) {
    if let Err(e) = client.sign_out() {
        warn!("{} sign-out failed: {}", client.provider(), e);
    }
}

/// Message for a federated flow that ended before a credential exchange.
fn external_flow_message(provider: ExternalProvider, error: &AuthError) -> String {
    match (provider, error) {
        (ExternalProvider::Google, AuthError::ExternalSignInCancelled(_)) => ERROR_GOOGLE_SIGN_IN_CANCELLED.to_string(),
        (ExternalProvider::Facebook, AuthError::ExternalSignInCancelled(_)) => {
            ERROR_FACEBOOK_LOGIN_CANCELLED.to_string()
        }
        (ExternalProvider::Google, AuthError::NetworkOrProviderFailure(reason)) => {
            format!("{}: {}", ERROR_GOOGLE_SIGN_IN_FAILED, reason)
        }
        (ExternalProvider::Facebook, AuthError::NetworkOrProviderFailure(reason)) => {
            format!("{}: {}", ERROR_FACEBOOK_LOGIN_FAILED, reason)
        }
        (ExternalProvider::Google, _) => ERROR_GOOGLE_SIGN_IN_FAILED.to_string(),
        (ExternalProvider::Facebook, _) => ERROR_FACEBOOK_LOGIN_MISSING.to_string(),
    }
}

/// Message for a provider call that came back with an error.
fn completion_failure_message(kind: OperationKind, error: &AuthError) -> String {
    let reason = error.to_string();
    if !reason.trim().is_empty() {
        return reason;
    }
    match kind {
        OperationKind::CredentialExchange(ExternalProvider::Facebook) => ERROR_FACEBOOK_EXCHANGE_FALLBACK.to_string(),
        _ => ERROR_GOOGLE_EXCHANGE_FALLBACK.to_string(),
    }
}
