//! Line-oriented shell driving an [`AppSession`] against the in-memory providers.
//!
//! Each input line parses into a [`Command`]; [`execute`] runs it and returns the lines
//! to print. Sign-in commands wait for the provider round trip before reporting.

use crate::app::{AppSession, MemoryProviders};
use crate::auth::{ExternalProvider, ExternalSignInResult};
use crate::constants::{
    INFO_LOGIN_REQUIRED, INFO_TASK_IGNORED, INFO_TASK_NOT_FOUND, SUCCESS_TASK_ADDED, SUCCESS_TASK_REMOVED,
};
use crate::navigation::Route;
use crate::session::SessionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalCommand {
    Token(String),
    Cancel,
    Fail(String),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    Screen(Route),
    Login { email: String, password: String },
    Register { email: String, password: String },
    External { provider: ExternalProvider, command: ExternalCommand },
    Logout,
    Add(String),
    Remove(String),
    List,
    Expire,
    Offline(bool),
    Logs,
    Quit,
    None,
}

pub const HELP_TEXT: &str = "\
Commands:
  status                         show the session state as JSON
  screen auth|login|signup       move within the sign-in screens
  login <email> <password>       sign in with email and password
  register <email> <password>    create an account and sign in
  google <token>|cancel|missing|fail <reason>
  facebook <token>|cancel|missing|fail <reason>
  logout                         sign out of every provider
  add <text>                     add a task
  remove <text>                  remove the first task with this text
  list                           show the tasks
  expire                         expire the current identity at the provider
  offline on|off                 simulate losing the network
  logs                           show recent log entries
  quit";

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_lowercase().as_str() {
        "help" | "?" => Ok(Command::Help),
        "status" => Ok(Command::Status),
        "screen" => match rest {
            "auth" => Ok(Command::Screen(Route::Auth)),
            "login" => Ok(Command::Screen(Route::Login)),
            "signup" => Ok(Command::Screen(Route::Signup)),
            "todo" => Ok(Command::Screen(Route::Todo)),
            other => Err(format!("Unknown screen '{}'", other)),
        },
        "login" | "register" => {
            let mut parts = rest.split_whitespace();
            let (email, password) = match (parts.next(), parts.next(), parts.next()) {
                (Some(email), Some(password), None) => (email.to_string(), password.to_string()),
                _ => return Err(format!("Usage: {} <email> <password>", verb)),
            };
            if verb.eq_ignore_ascii_case("login") {
                Ok(Command::Login { email, password })
            } else {
                Ok(Command::Register { email, password })
            }
        }
        "google" => parse_external(ExternalProvider::Google, rest),
        "facebook" => parse_external(ExternalProvider::Facebook, rest),
        "logout" => Ok(Command::Logout),
        "add" => Ok(Command::Add(rest.to_string())),
        "remove" => Ok(Command::Remove(rest.to_string())),
        "list" | "ls" => Ok(Command::List),
        "expire" => Ok(Command::Expire),
        "offline" => match rest {
            "on" => Ok(Command::Offline(true)),
            "off" => Ok(Command::Offline(false)),
            _ => Err("Usage: offline on|off".to_string()),
        },
        "logs" => Ok(Command::Logs),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("Unknown command '{}'. Type 'help' for a list.", other)),
    }
}

fn parse_external(provider: ExternalProvider, rest: &str) -> Result<Command, String> {
    let command = match rest.split_once(char::is_whitespace) {
        Some(("fail", reason)) => ExternalCommand::Fail(reason.trim().to_string()),
        _ => match rest {
            "" => return Err(format!("Usage: {} <token>|cancel|missing|fail <reason>", provider)),
            "cancel" => ExternalCommand::Cancel,
            "missing" => ExternalCommand::Missing,
            "fail" => ExternalCommand::Fail("unknown error".to_string()),
            token => ExternalCommand::Token(token.to_string()),
        },
    };
    Ok(Command::External { provider, command })
}

/// Run a command and return the lines to print.
pub async fn execute(app: &mut AppSession, memory: &MemoryProviders, command: Command) -> Vec<String> {
    app.refresh();

    let mut output = Vec::new();
    match command {
        Command::None | Command::Quit => {}
        Command::Help => output.push(HELP_TEXT.to_string()),
        Command::Status => output.push(state_json(&app.session().current_state())),
        Command::Screen(route) => {
            let shown = app.navigate(route);
            output.push(format!("Screen: {}", shown));
        }
        Command::Login { email, password } => {
            if app.session_mut().login(&email, &password).is_some() {
                app.settle().await;
            }
            output.push(describe_session(app));
        }
        Command::Register { email, password } => {
            if app.session_mut().register(&email, &password).is_some() {
                app.settle().await;
            }
            output.push(describe_session(app));
        }
        Command::External { provider, command } => {
            let result = match command {
                ExternalCommand::Token(token) => ExternalSignInResult::token(provider, token),
                ExternalCommand::Cancel => ExternalSignInResult::cancelled(provider),
                ExternalCommand::Fail(reason) => ExternalSignInResult::failed(provider, reason),
                ExternalCommand::Missing => ExternalSignInResult::missing(provider),
            };
            if !external_enabled(app, provider) {
                output.push(format!("{} sign-in is disabled in the configuration", provider));
            } else {
                if app.session_mut().complete_external_sign_in(result).is_some() {
                    app.settle().await;
                } else {
                    app.refresh();
                }
                output.push(describe_session(app));
            }
        }
        Command::Logout => {
            app.logout();
            output.push(describe_session(app));
        }
        Command::Add(text) => {
            if app.route() != Route::Todo {
                output.push(INFO_LOGIN_REQUIRED.to_string());
            } else if app.tasks_mut().add_task(&text) {
                output.push(format!("{}: {}", SUCCESS_TASK_ADDED, text));
            } else {
                output.push(INFO_TASK_IGNORED.to_string());
            }
        }
        Command::Remove(text) => {
            if app.route() != Route::Todo {
                output.push(INFO_LOGIN_REQUIRED.to_string());
            } else if app.tasks_mut().remove_task(&text) {
                output.push(format!("{}: {}", SUCCESS_TASK_REMOVED, text));
            } else {
                output.push(INFO_TASK_NOT_FOUND.to_string());
            }
        }
        Command::List => {
            if app.route() != Route::Todo {
                output.push(INFO_LOGIN_REQUIRED.to_string());
            } else if app.tasks().is_empty() {
                output.push("No tasks".to_string());
            } else {
                output.extend(
                    app.tasks()
                        .list()
                        .iter()
                        .enumerate()
                        .map(|(index, task)| format!("{:>3}. {}", index + 1, task)),
                );
            }
        }
        Command::Expire => {
            memory.identity.expire_session();
            app.refresh();
            output.push(describe_session(app));
        }
        Command::Offline(offline) => {
            memory.identity.set_offline(offline);
            output.push(format!("Network {}", if offline { "offline" } else { "online" }));
        }
        Command::Logs => {
            let logs = app.logger().get_logs();
            if logs.is_empty() {
                output.push("No log entries".to_string());
            } else {
                output.extend(logs);
            }
        }
    }
    output
}

fn external_enabled(app: &AppSession, provider: ExternalProvider) -> bool {
    match provider {
        ExternalProvider::Google => app.config().auth.google_enabled,
        ExternalProvider::Facebook => app.config().auth.facebook_enabled,
    }
}

fn describe_session(app: &AppSession) -> String {
    let state = app.session().current_state();
    let status = if state.is_logged_in { "Logged in" } else { "Logged out" };
    match state.error_message {
        Some(error) => format!("{} [{}] ❌ {}", status, app.route(), error),
        None => format!("{} [{}]", status, app.route()),
    }
}

fn state_json(state: &SessionState) -> String {
    serde_json::to_string_pretty(state).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login() {
        assert_eq!(
            parse_command("login a@b.com pw123456"),
            Ok(Command::Login {
                email: "a@b.com".to_string(),
                password: "pw123456".to_string()
            })
        );
        assert!(parse_command("login a@b.com").is_err());
        assert!(parse_command("register a@b.com pw extra").is_err());
    }

    #[test]
    fn test_parse_external() {
        assert_eq!(
            parse_command("facebook cancel"),
            Ok(Command::External {
                provider: ExternalProvider::Facebook,
                command: ExternalCommand::Cancel
            })
        );
        assert_eq!(
            parse_command("google fail code 12501"),
            Ok(Command::External {
                provider: ExternalProvider::Google,
                command: ExternalCommand::Fail("code 12501".to_string())
            })
        );
        assert_eq!(
            parse_command("google tok-1"),
            Ok(Command::External {
                provider: ExternalProvider::Google,
                command: ExternalCommand::Token("tok-1".to_string())
            })
        );
        assert!(parse_command("google").is_err());
    }

    #[test]
    fn test_parse_tasks_keep_inner_text() {
        assert_eq!(parse_command("add Buy  milk"), Ok(Command::Add("Buy  milk".to_string())));
        assert_eq!(parse_command("add"), Ok(Command::Add(String::new())));
        assert_eq!(parse_command("remove Buy milk"), Ok(Command::Remove("Buy milk".to_string())));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_command("   "), Ok(Command::None));
        assert_eq!(parse_command("QUIT"), Ok(Command::Quit));
        assert_eq!(parse_command("offline on"), Ok(Command::Offline(true)));
        assert_eq!(parse_command("screen signup"), Ok(Command::Screen(Route::Signup)));
        assert!(parse_command("screen nowhere").is_err());
        assert!(parse_command("dance").is_err());
    }
}
