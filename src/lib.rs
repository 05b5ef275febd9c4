//! todolist - session and task list core for a to-do application
//!
//! This library keeps track of whether the user is signed in (email/password,
//! Google or Facebook) and holds the user's task list. Identity providers sit
//! behind traits so the same state machine runs against real SDK bindings or
//! the bundled in-memory provider.
//!
//! # Modules
//!
//! * [`app`] - Application session scope owning the controller and the task store
//! * [`auth`] - Identity provider traits, credentials and errors
//! * [`config`] - Application configuration management
//! * [`session`] - Authentication state machine
//! * [`tasks`] - In-memory task list
//! * [`shell`] - Interactive command shell used by the binary

/// Application session scope
pub mod app;

/// Identity provider abstraction and in-memory implementation
pub mod auth;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and user-facing messages
pub mod constants;

/// Logging utilities for debugging and error tracking
pub mod logger;

/// Route selection between the sign-in screens and the task list
pub mod navigation;

/// Authentication session controller
pub mod session;

/// Command shell for the interactive binary
pub mod shell;

/// Task list store
pub mod tasks;

pub use app::AppSession;
pub use session::{SessionController, SessionState};
pub use tasks::TaskStore;
