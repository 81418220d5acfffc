use daymark_core::db::open_db_in_memory;
use daymark_core::repo::user_repo::count_users;
use daymark_core::{
    AuthService, ServiceError, SqliteUserRepository, StartOutcome, TokenSigner, TOKEN_TTL_MS,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> AuthService<SqliteUserRepository<'_>> {
    AuthService::new(SqliteUserRepository::new(conn), TokenSigner::new([3u8; 32]))
}

#[test]
fn first_start_registers_second_start_logs_in() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);

    let first = auth.start("a@b.com", "secret1").unwrap();
    assert!(first.is_new_user());
    assert!(matches!(first, StartOutcome::Registered(_)));

    let second = auth.start("a@b.com", "secret1").unwrap();
    assert!(!second.is_new_user());
    assert!(matches!(second, StartOutcome::LoggedIn(_)));

    assert_eq!(
        first.session().user.id,
        second.session().user.id,
        "both calls must resolve to the same account"
    );
    assert_eq!(count_users(&conn).unwrap(), 1);
}

#[test]
fn wrong_password_fails_generically_and_creates_nothing() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);

    auth.start("a@b.com", "secret1").unwrap();
    let err = auth.start("a@b.com", "wrong!!").unwrap_err();

    assert!(matches!(err, ServiceError::InvalidCredentials));
    assert_eq!(err.to_string(), "invalid credentials");
    assert_eq!(count_users(&conn).unwrap(), 1);
}

#[test]
fn email_is_normalized_before_lookup() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);

    let first = auth.start("  User@Example.COM ", "secret1").unwrap();
    assert_eq!(first.session().user.email, "user@example.com");

    let second = auth.start("user@example.com", "secret1").unwrap();
    assert!(!second.is_new_user());
    assert_eq!(count_users(&conn).unwrap(), 1);
}

#[test]
fn validation_failures_happen_before_store_access() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);

    let bad_email = auth.start("not-an-email", "secret1").unwrap_err();
    assert!(matches!(bad_email, ServiceError::Validation(_)));

    let short_password = auth.start("a@b.com", "short").unwrap_err();
    assert!(matches!(short_password, ServiceError::Validation(_)));

    assert_eq!(count_users(&conn).unwrap(), 0);
}

#[test]
fn issued_token_verifies_to_the_account_and_expires() {
    let conn = open_db_in_memory().unwrap();
    let signer = TokenSigner::new([3u8; 32]);
    let auth = AuthService::new(SqliteUserRepository::new(&conn), signer.clone());

    let outcome = auth.start("a@b.com", "secret1").unwrap();
    let session = outcome.session();

    let now = chrono::Utc::now().timestamp_millis();
    let owner = signer.verify(&session.token, now).unwrap();
    assert_eq!(owner, session.user.id);

    let err = signer
        .verify(&session.token, now + TOKEN_TTL_MS + 1)
        .unwrap_err();
    assert_eq!(err, daymark_core::TokenError::Expired);
}

#[test]
fn stored_hash_is_not_the_plaintext_password() {
    let conn = open_db_in_memory().unwrap();
    service(&conn).start("a@b.com", "secret1").unwrap();

    let stored: String = conn
        .query_row("SELECT password_hash FROM users;", [], |row| row.get(0))
        .unwrap();
    assert!(!stored.contains("secret1"));
}
