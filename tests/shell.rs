use todolist::app::{AppSession, MemoryProviders};
use todolist::config::Config;
use todolist::logger::Logger;
use todolist::navigation::Route;
use todolist::shell::{execute, parse_command};

async fn run(app: &mut AppSession, memory: &MemoryProviders, line: &str) -> Vec<String> {
    let command = parse_command(line).unwrap();
    execute(app, memory, command).await
}

fn new_app() -> (AppSession, MemoryProviders) {
    AppSession::with_memory_providers(Config::default(), Logger::new())
}

#[tokio::test]
async fn test_tasks_require_login() {
    let (mut app, memory) = new_app();
    let output = run(&mut app, &memory, "add Buy milk").await;
    assert_eq!(output, vec!["Log in first to manage tasks"]);
    assert!(app.tasks().is_empty());
}

#[tokio::test]
async fn test_register_add_list_remove() {
    let (mut app, memory) = new_app();

    let output = run(&mut app, &memory, "register a@b.com pw123456").await;
    assert_eq!(output, vec!["Logged in [todo]"]);

    run(&mut app, &memory, "add Buy milk").await;
    let output = run(&mut app, &memory, "add    ").await;
    assert_eq!(output, vec!["Blank task ignored"]);
    run(&mut app, &memory, "add Walk dog").await;

    let output = run(&mut app, &memory, "list").await;
    assert_eq!(output, vec!["  1. Buy milk", "  2. Walk dog"]);

    let output = run(&mut app, &memory, "remove Feed cat").await;
    assert_eq!(output, vec!["Task not found"]);
    run(&mut app, &memory, "remove Buy milk").await;
    assert_eq!(app.tasks().list(), ["Walk dog"]);
}

#[tokio::test]
async fn test_facebook_cancel_reports_error() {
    let (mut app, memory) = new_app();
    let output = run(&mut app, &memory, "facebook cancel").await;
    assert_eq!(output, vec!["Logged out [auth] ❌ Facebook Login Cancelled"]);
}

#[tokio::test]
async fn test_google_token_then_logout() {
    let (mut app, memory) = new_app();

    run(&mut app, &memory, "google some-id-token").await;
    assert_eq!(app.route(), Route::Todo);

    let output = run(&mut app, &memory, "logout").await;
    assert_eq!(output, vec!["Logged out [auth]"]);
    assert_eq!(memory.facebook.sign_out_calls(), 1);
}

#[tokio::test]
async fn test_disabled_provider_is_refused() {
    let mut config = Config::default();
    config.auth.google_enabled = false;
    let (mut app, memory) = AppSession::with_memory_providers(config, Logger::new());

    let output = run(&mut app, &memory, "google token").await;
    assert_eq!(output, vec!["Google sign-in is disabled in the configuration"]);
    assert!(!app.session().is_logged_in());
}

#[tokio::test]
async fn test_status_is_json() {
    let (mut app, memory) = new_app();
    run(&mut app, &memory, "login a@b.com wrongpass").await;

    let output = run(&mut app, &memory, "status").await;
    let value: serde_json::Value = serde_json::from_str(&output[0]).unwrap();
    assert_eq!(value["is_logged_in"], serde_json::Value::Bool(false));
    assert!(value["error_message"].is_string());
}

#[tokio::test]
async fn test_offline_and_expire() {
    let (mut app, memory) = new_app();

    run(&mut app, &memory, "offline on").await;
    let output = run(&mut app, &memory, "register a@b.com pw123456").await;
    assert!(output[0].starts_with("Logged out [auth] ❌"));

    run(&mut app, &memory, "offline off").await;
    run(&mut app, &memory, "register a@b.com pw123456").await;
    assert_eq!(app.route(), Route::Todo);

    let output = run(&mut app, &memory, "expire").await;
    assert!(output[0].starts_with("Logged out [auth] ❌"));
}
