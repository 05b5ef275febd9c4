use todolist::app::AppSession;
use todolist::auth::{ExternalProvider, ExternalSignInResult};
use todolist::config::Config;
use todolist::logger::Logger;
use todolist::navigation::Route;
use todolist::session::CompletionPolicy;

fn app() -> (AppSession, todolist::app::MemoryProviders) {
    AppSession::with_memory_providers(Config::default(), Logger::new())
}

#[tokio::test]
async fn test_starts_on_auth_screen() {
    let (mut app, _memory) = app();
    assert_eq!(app.route(), Route::Auth);

    let state = app.refresh();
    assert!(!state.is_logged_in);
    assert_eq!(app.route(), Route::Auth);
}

#[tokio::test]
async fn test_navigation_within_auth_graph() {
    let (mut app, _memory) = app();

    assert_eq!(app.navigate(Route::Login), Route::Login);
    assert_eq!(app.navigate(Route::Signup), Route::Signup);

    // The task list needs a session
    assert_eq!(app.navigate(Route::Todo), Route::Signup);
    assert_eq!(app.navigate(Route::Auth), Route::Auth);
}

#[tokio::test]
async fn test_register_moves_to_todo_and_logout_moves_back() {
    let (mut app, memory) = app();
    app.navigate(Route::Signup);

    app.session_mut().register("a@b.com", "pw123456");
    let state = app.settle().await;
    assert!(state.is_logged_in);
    assert_eq!(app.route(), Route::Todo);

    app.tasks_mut().add_task("Buy milk");
    app.logout();
    assert_eq!(app.route(), Route::Auth);
    assert!(!app.session().is_logged_in());
    assert_eq!(memory.google.sign_out_calls(), 1);

    // Tasks live as long as the application session, not the login
    assert_eq!(app.tasks().list(), ["Buy milk"]);
}

#[tokio::test]
async fn test_failed_login_stays_on_login_screen() {
    let (mut app, _memory) = app();
    app.navigate(Route::Login);

    app.session_mut().login("a@b.com", "pw123456");
    let state = app.settle().await;
    assert!(!state.is_logged_in);
    assert!(state.error_message.is_some());
    assert_eq!(app.route(), Route::Login);
}

#[tokio::test]
async fn test_expiry_returns_to_auth() {
    let (mut app, memory) = app();

    app.session_mut()
        .complete_external_sign_in(ExternalSignInResult::token(ExternalProvider::Google, "id-token"));
    app.settle().await;
    assert_eq!(app.route(), Route::Todo);

    memory.identity.expire_session();
    let state = app.refresh();
    assert!(!state.is_logged_in);
    assert_eq!(app.route(), Route::Auth);
}

#[tokio::test]
async fn test_policy_comes_from_config() {
    let mut config = Config::default();
    config.session.completion_policy = CompletionPolicy::LatestRequestWins;
    let (app, _memory) = AppSession::with_memory_providers(config, Logger::new());
    assert_eq!(app.session().policy(), CompletionPolicy::LatestRequestWins);
}

#[tokio::test]
async fn test_session_activity_is_logged() {
    let logger = Logger::new();
    let (mut app, _memory) = AppSession::with_memory_providers(Config::default(), logger.clone());

    app.session_mut().login("a@b.com", "wrong");
    app.settle().await;

    app.session_mut().register("a@b.com", "pw123456");
    app.settle().await;

    let logs = logger.get_logs();
    assert!(logs.iter().any(|entry| entry.contains("Password login failed")));
    // Completion entries carry the round-trip time
    assert!(logs
        .iter()
        .any(|entry| entry.contains("Account registration succeeded") && entry.contains(" ms)")));
}
