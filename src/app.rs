//! Application session scope.
//!
//! An [`AppSession`] is built once per run and owns the session controller, the task
//! store and the current route. Everything that needs session or task state gets it
//! from here instead of from process-wide globals.

use std::sync::Arc;

use crate::auth::memory::{MemoryExternalClient, MemoryIdentityProvider};
use crate::auth::{ExternalProvider, Providers};
use crate::config::Config;
use crate::logger::Logger;
use crate::navigation::{resolve_route, Route};
use crate::session::{SessionController, SessionState};
use crate::tasks::TaskStore;

/// Handles to the in-memory providers behind an [`AppSession`], for driving them directly.
#[derive(Clone)]
pub struct MemoryProviders {
    pub identity: Arc<MemoryIdentityProvider>,
    pub google: Arc<MemoryExternalClient>,
    pub facebook: Arc<MemoryExternalClient>,
}

impl MemoryProviders {
    pub fn new(identity: MemoryIdentityProvider) -> Self {
        Self {
            identity: Arc::new(identity),
            google: Arc::new(MemoryExternalClient::new(ExternalProvider::Google)),
            facebook: Arc::new(MemoryExternalClient::new(ExternalProvider::Facebook)),
        }
    }

    pub fn providers(&self) -> Providers {
        Providers::new(self.identity.clone(), self.google.clone(), self.facebook.clone())
    }
}

pub struct AppSession {
    config: Config,
    session: SessionController,
    tasks: TaskStore,
    route: Route,
    logger: Logger,
}

impl AppSession {
    pub fn new(config: Config, providers: Providers, logger: Logger) -> Self {
        let mut session = SessionController::new(providers, config.session.completion_policy);
        session.set_logger(logger.clone());

        Self {
            config,
            session,
            tasks: TaskStore::new(),
            route: Route::default(),
            logger,
        }
    }

    /// Build a session backed by fresh in-memory providers configured from `config`.
    pub fn with_memory_providers(config: Config, logger: Logger) -> (Self, MemoryProviders) {
        let identity = MemoryIdentityProvider::new().with_latency(config.auth.simulated_latency());
        let memory = MemoryProviders::new(identity);
        let app = Self::new(config, memory.providers(), logger);
        (app, memory)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionController {
        &mut self.session
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskStore {
        &mut self.tasks
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Apply queued session events and move to the route matching the login status.
    pub fn refresh(&mut self) -> SessionState {
        self.session.process_pending_events();
        self.sync_route();
        self.session.current_state()
    }

    /// Wait for outstanding sign-in work, then update the route.
    pub async fn settle(&mut self) -> SessionState {
        let state = self.session.settle().await;
        self.sync_route();
        state
    }

    /// Move within the unauthenticated graph. Returns the route actually shown.
    pub fn navigate(&mut self, target: Route) -> Route {
        let requested = if target.is_authenticated() && !self.session.is_logged_in() {
            self.logger
                .log(format!("Navigation: '{}' requires a session, staying on '{}'", target, self.route));
            self.route
        } else {
            target
        };
        self.route = resolve_route(requested, self.session.is_logged_in());
        self.route
    }

    /// Log out and return to the auth screen. Tasks are kept for the rest of the run.
    pub fn logout(&mut self) {
        self.session.logout();
        self.sync_route();
    }

    fn sync_route(&mut self) {
        let next = resolve_route(self.route, self.session.is_logged_in());
        if next != self.route {
            self.logger
                .log(format!("Navigation: '{}' -> '{}'", self.route, next));
            self.route = next;
        }
    }
}
