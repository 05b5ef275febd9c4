//! Task list owned by an authenticated application session.

pub mod store;

pub use store::TaskStore;
