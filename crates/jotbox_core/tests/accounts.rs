use jotbox_core::db::open_db_in_memory;
use jotbox_core::{
    AccountService, NoteService, ServiceError, SqliteNoteRepository, SqliteUserRepository,
    UserRepository, ValidationError,
};

#[test]
fn register_then_verify_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteUserRepository::try_new(&conn).unwrap());

    let user = service.register("a@b.com", "secret1").unwrap();
    assert_eq!(user.email, "a@b.com");
    assert_ne!(user.password_hash, "secret1");

    let verified = service.verify("a@b.com", "secret1").unwrap().unwrap();
    assert_eq!(verified.id, user.id);
    assert!(service.verify("a@b.com", "secret2").unwrap().is_none());
}

#[test]
fn register_normalizes_email_before_storing_and_lookup() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteUserRepository::try_new(&conn).unwrap());

    let user = service.register("  Alice@Example.COM ", "secret1").unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert!(service
        .verify("ALICE@example.com", "secret1")
        .unwrap()
        .is_some());
}

#[test]
fn duplicate_email_is_a_conflict_regardless_of_case() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteUserRepository::try_new(&conn).unwrap());

    service.register("a@b.com", "secret1").unwrap();
    let err = service.register(" A@B.com", "another1").unwrap_err();
    match err {
        ServiceError::Conflict(message) => assert_eq!(message, "Email already registered"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_insert_maps_unique_violation_to_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    repo.insert_user("a@b.com", "hash").unwrap();
    let err = repo.insert_user("a@b.com", "hash").unwrap_err();
    assert!(matches!(err, jotbox_core::RepoError::Conflict(_)));
}

#[test]
fn register_rejects_malformed_email_and_short_password() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteUserRepository::try_new(&conn).unwrap());

    let err = service.register("not-an-email", "secret1").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::InvalidEmail)
    ));

    let err = service.register("a@b.com", "short").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::PasswordTooShort { min_chars: 6 })
    ));
    assert!(service.verify("a@b.com", "short").unwrap().is_none());
}

#[test]
fn verify_does_not_distinguish_unknown_email_from_wrong_password() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteUserRepository::try_new(&conn).unwrap());
    service.register("a@b.com", "secret1").unwrap();

    let unknown = service.verify("nobody@b.com", "secret1").unwrap();
    let wrong = service.verify("a@b.com", "wrong-password").unwrap();
    assert_eq!(unknown, wrong);
    assert!(unknown.is_none());
}

#[test]
fn verify_treats_corrupt_stored_hash_as_mismatch() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    repo.insert_user("a@b.com", "corrupt").unwrap();

    let service = AccountService::new(repo);
    assert!(service.verify("a@b.com", "corrupt").unwrap().is_none());
}

#[test]
fn deleting_account_cascades_to_notes() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = {
        let service = AccountService::new(SqliteUserRepository::try_new(&conn).unwrap());
        service.register("a@b.com", "secret1").unwrap().id
    };
    {
        let mut notes = NoteService::new(SqliteNoteRepository::try_new(&mut conn).unwrap());
        notes.create_note(user_id, "T1", "").unwrap();
        notes.create_note(user_id, "T2", "").unwrap();
    }

    let service = AccountService::new(SqliteUserRepository::try_new(&conn).unwrap());
    service.delete_account(user_id).unwrap();
    assert!(service.get_user(user_id).unwrap().is_none());

    let remaining: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM notes WHERE user_id = ?1;",
            [user_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(remaining, 0);

    assert!(matches!(
        service.delete_account(user_id).unwrap_err(),
        ServiceError::NotFound
    ));
}
