//! Authentication session state machine.
//!
//! The [`SessionController`] reconciles password sign-in, account registration and the
//! Google/Facebook credential exchanges into a single observable [`SessionState`].
//! Provider calls run as background operations whose completions are applied by the
//! controller's owner in arrival order.

pub mod controller;
pub mod operations;
pub mod state;

pub use controller::SessionController;
pub use operations::{OperationId, OperationKind, SessionEvent};
pub use state::{CompletionPolicy, SessionState};
