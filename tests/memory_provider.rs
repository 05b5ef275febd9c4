use std::sync::{Arc, Mutex};

use todolist::auth::memory::{MemoryExternalClient, MemoryIdentityProvider};
use todolist::auth::{
    AuthError, Credential, ExternalProvider, ExternalSignInClient, IdentityChange, IdentityProvider,
};

fn recording_listener(provider: &MemoryIdentityProvider) -> Arc<Mutex<Vec<IdentityChange>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    provider.subscribe(Arc::new(move |change: IdentityChange| {
        sink.lock().unwrap().push(change);
    }));
    seen
}

#[tokio::test]
async fn test_create_and_sign_in() {
    let provider = MemoryIdentityProvider::new();

    assert_eq!(provider.provider_name(), "memory");

    let created = provider.create_identity("User@Example.com", "secret1").await.unwrap();
    assert_eq!(provider.current_identity(), Some(created.clone()));

    provider.sign_out().unwrap();
    assert_eq!(provider.current_identity(), None);

    // Emails are matched case-insensitively
    let signed_in = provider.sign_in("user@example.com", "secret1").await.unwrap();
    assert_eq!(signed_in, created);
}

#[tokio::test]
async fn test_validation_errors() {
    let provider = MemoryIdentityProvider::new().with_account("a@b.com", "pw123456");

    assert!(matches!(
        provider.create_identity("a@b", "pw123456").await,
        Err(AuthError::InvalidCredential(_))
    ));
    assert!(matches!(
        provider.create_identity("c@d.com", "short").await,
        Err(AuthError::InvalidCredential(_))
    ));
    assert!(matches!(
        provider.create_identity("A@B.com", "pw123456").await,
        Err(AuthError::InvalidCredential(_))
    ));
    assert!(matches!(
        provider.sign_in("a@b.com", "nope").await,
        Err(AuthError::InvalidCredential(_))
    ));
    assert_eq!(provider.account_count(), 1);
    assert_eq!(provider.current_identity(), None);
}

#[tokio::test]
async fn test_offline_fails_with_network_error() {
    let provider = MemoryIdentityProvider::new().with_account("a@b.com", "pw123456");
    provider.set_offline(true);

    assert!(matches!(
        provider.sign_in("a@b.com", "pw123456").await,
        Err(AuthError::NetworkOrProviderFailure(_))
    ));
}

#[tokio::test]
async fn test_credentials_map_to_stable_identities() {
    let provider = MemoryIdentityProvider::new();

    let google = Credential::Google { id_token: "tok".to_string() };
    let facebook = Credential::Facebook { access_token: "tok".to_string() };

    let first = provider.sign_in_with_credential(google.clone()).await.unwrap();
    let again = provider.sign_in_with_credential(google).await.unwrap();
    let other = provider.sign_in_with_credential(facebook).await.unwrap();

    assert_eq!(first, again);
    assert_ne!(first, other);

    provider.reject_token("tok");
    assert!(provider
        .sign_in_with_credential(Credential::Google { id_token: "tok".to_string() })
        .await
        .is_err());
}

#[tokio::test]
async fn test_listeners_follow_identity() {
    let provider = MemoryIdentityProvider::new().with_account("a@b.com", "pw123456");
    let seen = recording_listener(&provider);

    let id = provider.sign_in("a@b.com", "pw123456").await.unwrap();
    provider.sign_out().unwrap();
    // Signing out twice notifies once
    provider.sign_out().unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(*seen, vec![IdentityChange::signed_in(id), IdentityChange::signed_out()]);
}

#[tokio::test]
async fn test_expiry_notifies_with_error() {
    let provider = MemoryIdentityProvider::new().with_account("a@b.com", "pw123456");
    provider.sign_in("a@b.com", "pw123456").await.unwrap();
    let seen = recording_listener(&provider);

    provider.expire_session();
    // Nothing to expire the second time
    provider.expire_session();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].identity, None);
    assert!(seen[0].error.is_some());
}

#[tokio::test]
async fn test_unsubscribe_stops_notifications() {
    let provider = MemoryIdentityProvider::new().with_account("a@b.com", "pw123456");
    let seen = Arc::new(Mutex::new(0usize));
    let sink = seen.clone();
    let id = provider.subscribe(Arc::new(move |_: IdentityChange| {
        *sink.lock().unwrap() += 1;
    }));

    provider.sign_in("a@b.com", "pw123456").await.unwrap();
    provider.unsubscribe(id);
    provider.sign_out().unwrap();

    assert_eq!(*seen.lock().unwrap(), 1);
    assert_eq!(provider.listener_count(), 0);
}

#[test]
fn test_external_client_counts_sign_outs() {
    let client = MemoryExternalClient::new(ExternalProvider::Facebook);
    assert_eq!(client.provider(), ExternalProvider::Facebook);

    assert!(client.sign_out().is_ok());
    client.set_fail_sign_out(true);
    assert!(client.sign_out().is_err());
    assert_eq!(client.sign_out_calls(), 2);
}
