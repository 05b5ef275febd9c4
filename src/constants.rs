//! Constants used throughout the application
//!
//! This module centralizes user-facing messages, log text, and other constant
//! values to keep them consistent between the session controller and the shell.

// External sign-in messages
pub const ERROR_GOOGLE_SIGN_IN_FAILED: &str = "Google Sign-In failed";
pub const ERROR_GOOGLE_SIGN_IN_CANCELLED: &str = "Google Sign-In Cancelled";
pub const ERROR_FACEBOOK_LOGIN_FAILED: &str = "Facebook Login Failed";
pub const ERROR_FACEBOOK_LOGIN_CANCELLED: &str = "Facebook Login Cancelled";
pub const ERROR_FACEBOOK_LOGIN_MISSING: &str = "Facebook Login failed";

// Credential exchange fallbacks when the provider gives no reason
pub const ERROR_GOOGLE_EXCHANGE_FALLBACK: &str = "Authentication failed";
pub const ERROR_FACEBOOK_EXCHANGE_FALLBACK: &str = "Unknown error occurred";

// Validation messages
pub const ERROR_EMPTY_CREDENTIALS: &str = "Email and password must not be empty";
pub const ERROR_INVALID_EMAIL: &str = "The email address is badly formatted.";
pub const ERROR_WEAK_PASSWORD: &str = "The given password is invalid. [ Password should be at least 6 characters ]";
pub const ERROR_EMAIL_IN_USE: &str = "The email address is already in use by another account.";
pub const ERROR_WRONG_CREDENTIALS: &str = "The supplied auth credential is incorrect, malformed or has expired.";
pub const ERROR_CREDENTIAL_REJECTED: &str = "The supplied credential was rejected by the provider.";

// Shell messages
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";
pub const SUCCESS_TASK_ADDED: &str = "✅ Task added";
pub const SUCCESS_TASK_REMOVED: &str = "✅ Task removed";
pub const INFO_TASK_IGNORED: &str = "Blank task ignored";
pub const INFO_TASK_NOT_FOUND: &str = "Task not found";
pub const INFO_LOGIN_REQUIRED: &str = "Log in first to manage tasks";

/// Minimum password length accepted by the in-memory identity provider
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Upper bound for the simulated provider latency in milliseconds
pub const MAX_SIMULATED_LATENCY_MS: u64 = 10_000;

/// Number of in-memory log entries kept for the `logs` command
pub const LOG_BUFFER_CAPACITY: usize = 500;
