use super::*;

fn full_session() -> Session {
    Session {
        access_token: "access-1".into(),
        refresh_token: Some("refresh-1".into()),
        user_id: Some("42".into()),
    }
}

#[test]
fn cookie_policies() {
    assert!(ACCESS_TOKEN.http_only);
    assert!(REFRESH_TOKEN.http_only);
    assert!(!USER_ID.http_only);
    for spec in SESSION_COOKIES {
        assert_eq!(spec.max_age, Duration::from_secs(604_800));
    }
}

#[test]
fn save_then_load() {
    let store = MemoryCookieStore::new();
    full_session().save(&store);
    assert_eq!(Session::load(&store), Some(full_session()));
    assert_eq!(access_token(&store).as_deref(), Some("access-1"));
    assert_eq!(user_id(&store).as_deref(), Some("42"));
}

#[test]
fn load_requires_access_token() {
    let store = MemoryCookieStore::new();
    store.set(&USER_ID, "42");
    assert_eq!(Session::load(&store), None);
}

#[test]
fn empty_access_token_counts_as_absent() {
    let store = MemoryCookieStore::new();
    store.set(&ACCESS_TOKEN, "");
    assert_eq!(access_token(&store), None);
    assert_eq!(Session::load(&store), None);
}

#[test]
fn save_removes_fields_missing_from_new_session() {
    let store = MemoryCookieStore::with_session(&full_session());
    Session { access_token: "access-2".into(), refresh_token: None, user_id: None }.save(&store);
    assert_eq!(store.get("refreshToken"), None);
    assert_eq!(store.get("userId"), None);
    assert_eq!(store.get("accessToken").as_deref(), Some("access-2"));
}

#[test]
fn clear_removes_every_session_cookie() {
    let store = MemoryCookieStore::with_session(&full_session());
    Session::clear(&store);
    for spec in SESSION_COOKIES {
        assert_eq!(store.get(spec.name), None, "{} should be gone", spec.name);
    }
}

#[test]
fn expired_cookie_reads_as_absent() {
    let store = MemoryCookieStore::new();
    let short = CookieSpec { name: "accessToken", http_only: true, max_age: Duration::ZERO };
    store.set(&short, "gone");
    assert_eq!(store.get("accessToken"), None);
}
