use crate::auth::{AuthError, ExternalProvider, IdentityChange, IdentityId};
use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub type OperationId = u64;

/// Kind of provider round trip an operation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Login,
    Register,
    CredentialExchange(ExternalProvider),
}

impl OperationKind {
    pub fn description(&self) -> String {
        match self {
            OperationKind::Login => "Password login".to_string(),
            OperationKind::Register => "Account registration".to_string(),
            OperationKind::CredentialExchange(provider) => format!("{} credential exchange", provider),
        }
    }
}

/// Everything delivered back to the owner of the session state.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Completed {
        id: OperationId,
        kind: OperationKind,
        result: Result<IdentityId, AuthError>,
    },
    IdentityChanged(IdentityChange),
}

#[derive(Debug)]
pub struct PendingOperation {
    pub handle: JoinHandle<()>,
    pub started_at: Instant,
}

/// Runs provider calls on the tokio runtime and funnels their completions into one channel.
pub struct OperationManager {
    operations: HashMap<OperationId, PendingOperation>,
    next_operation_id: OperationId,
    event_sender: mpsc::UnboundedSender<SessionEvent>,
}

impl OperationManager {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();

        (
            Self {
                operations: HashMap::new(),
                next_operation_id: 1,
                event_sender: tx,
            },
            rx,
        )
    }

    /// Sender for out-of-band events such as identity listener notifications.
    pub fn event_sender(&self) -> mpsc::UnboundedSender<SessionEvent> {
        self.event_sender.clone()
    }

    /// Id the next spawned operation will get.
    pub fn peek_next_id(&self) -> OperationId {
        self.next_operation_id
    }

    /// Spawn a provider call. Must be called from within a tokio runtime.
    pub fn spawn<Fut>(&mut self, kind: OperationKind, operation: Fut) -> OperationId
    where
        Fut: Future<Output = Result<IdentityId, AuthError>> + Send + 'static,
    {
        let id = self.next_operation_id;
        self.next_operation_id += 1;

        let event_sender = self.event_sender.clone();
        let handle = tokio::spawn(async move {
            let result = operation.await;
            let _ = event_sender.send(SessionEvent::Completed { id, kind, result });
        });

        self.operations.insert(
            id,
            PendingOperation {
                handle,
                started_at: Instant::now(),
            },
        );
        id
    }

    /// Forget an operation whose completion has been received, returning its bookkeeping.
    pub fn finish(&mut self, id: OperationId) -> Option<PendingOperation> {
        self.operations.remove(&id)
    }

    /// Drop bookkeeping for operations whose task has ended, returning how many were removed.
    pub fn cleanup_finished(&mut self) -> usize {
        let before = self.operations.len();
        self.operations.retain(|_, operation| !operation.handle.is_finished());
        before - self.operations.len()
    }

    pub fn in_flight(&self) -> usize {
        self.operations.len()
    }

    /// Abort all running operations. Only used on teardown.
    pub fn cancel_all(&mut self) {
        for (_, operation) in self.operations.drain() {
            operation.handle.abort();
        }
    }
}

impl Drop for OperationManager {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
