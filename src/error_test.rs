use super::*;

fn backend_with(status: u16, message: &str, code: Option<&str>, field_errors: Vec<FieldError>) -> ApiError {
    ApiError::Backend { status, message: message.into(), code: code.map(str::to_owned), field_errors }
}

// =============================================================================
// kind
// =============================================================================

#[test]
fn transport_is_network() {
    assert_eq!(ApiError::Transport("connection refused".into()).kind(), ErrorKind::Network);
}

#[test]
fn missing_identifier_kind() {
    assert_eq!(ApiError::MissingIdentifier("current user id").kind(), ErrorKind::MissingIdentifier);
}

#[test]
fn structured_code_wins_over_message() {
    let err = backend_with(400, "Field name is required", Some("ACCESS_DENIED"), Vec::new());
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[test]
fn validation_code_is_not_treated_as_authorization() {
    let err = backend_with(400, "Email is required", Some("VALIDATION_ERROR"), Vec::new());
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn field_errors_mean_validation() {
    let fields = vec![FieldError { field: "email".into(), message: "must not be blank".into() }];
    assert_eq!(backend_with(400, "Validation failed", None, fields).kind(), ErrorKind::Validation);
}

#[test]
fn forbidden_status_is_authorization() {
    assert_eq!(backend_with(403, "nope", None, Vec::new()).kind(), ErrorKind::Authorization);
}

#[test]
fn message_fallback_only_without_code() {
    let legacy = backend_with(400, "Permission USER_WRITE missing", None, Vec::new());
    assert_eq!(legacy.kind(), ErrorKind::Authorization);

    let coded = backend_with(400, "Permission USER_WRITE missing", Some("CONFLICT"), Vec::new());
    assert_eq!(coded.kind(), ErrorKind::Backend);
}

#[test]
fn plain_server_error_is_backend() {
    assert_eq!(backend_with(500, "Internal Server Error", None, Vec::new()).kind(), ErrorKind::Backend);
}

// =============================================================================
// user_message
// =============================================================================

#[test]
fn user_message_concatenates_field_errors() {
    let fields = vec![
        FieldError { field: "email".into(), message: "must not be blank".into() },
        FieldError { field: "password".into(), message: "too short".into() },
    ];
    let err = backend_with(400, "Validation failed", None, fields);
    assert_eq!(err.user_message(), "email: must not be blank, password: too short");
}

#[test]
fn user_message_uses_backend_message() {
    let err = ApiError::backend(500, "Storage unavailable");
    assert_eq!(err.user_message(), "Storage unavailable");
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.code(), None);
}
