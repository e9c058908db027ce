use crate::auth::{Credentials, Registration};
use crate::error::GameError;

fn registration(email: &str, password: &str, confirm: &str) -> Registration {
    Registration {
        username: "grace".into(),
        email: email.into(),
        password: password.into(),
        confirm_password: confirm.into(),
    }
}

fn field_of(err: GameError) -> String {
    match err {
        GameError::InvalidField { field, .. } => field,
        other => panic!("expected a field error, got {:?}", other),
    }
}

#[test]
fn test_username_length_bounds() {
    let login = |name: &str| {
        Credentials::Account {
            username: name.into(),
            password: "secret1".into(),
        }
        .validate()
    };
    assert_eq!(field_of(login("a").unwrap_err()), "username");
    assert_eq!(field_of(login("   ").unwrap_err()), "username");
    assert_eq!(field_of(login("x".repeat(51).as_str()).unwrap_err()), "username");
    assert!(login("ab").is_ok());
    assert!(login("x".repeat(50).as_str()).is_ok());
}

#[test]
fn test_player_login_upper_cases_session_code() {
    let body = Credentials::Player {
        username: "ada".into(),
        session_code: " ab12cd ".into(),
    }
    .validate()
    .unwrap();
    assert_eq!(body.password, "");
    assert_eq!(body.session_code.as_deref(), Some("AB12CD"));

    let err = Credentials::Player {
        username: "ada".into(),
        session_code: "AB12".into(),
    }
    .validate()
    .unwrap_err();
    assert_eq!(field_of(err), "session_code");
}

#[test]
fn test_registration_checks_email_password_and_confirmation() {
    assert!(registration("grace@navy.mil", "cobol!", "cobol!").validate().is_ok());

    for email in ["grace", "grace@", "@navy.mil", "grace@navy", "gr ace@navy.mil", "a@b@c.d"] {
        let err = registration(email, "cobol!", "cobol!").validate().unwrap_err();
        assert_eq!(field_of(err), "email", "{}", email);
    }

    let err = registration("grace@navy.mil", "short", "short").validate().unwrap_err();
    assert_eq!(field_of(err), "password");

    let err = registration("grace@navy.mil", "cobol!", "cobol?").validate().unwrap_err();
    assert_eq!(err.to_string(), "Passwords do not match");
}

#[test]
fn test_registration_trims_username_and_email() {
    let body = Registration {
        username: "  grace ".into(),
        email: " grace@navy.mil ".into(),
        password: "cobol!".into(),
        confirm_password: "cobol!".into(),
    }
    .validate()
    .unwrap();
    assert_eq!(body.username, "grace");
    assert_eq!(body.email, "grace@navy.mil");
}
