use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing;
use serde_json::{Value, json};

use super::*;
use crate::notify::{Notice, NoticeLevel};
use crate::test_support::{HitCounter, context_for, drain_notices, signed_in_cookies, spawn_backend};

#[derive(Clone, Default)]
struct Hits {
    lists: HitCounter,
    details: HitCounter,
}

fn page_of(users: Value) -> Value {
    json!({
        "success": true,
        "data": {
            "content": users,
            "page": { "size": 10, "number": 0, "totalElements": 1, "totalPages": 1 }
        }
    })
}

fn backend(hits: &Hits) -> axum::Router {
    let list_hits = hits.lists.clone();
    let detail_hits = hits.details.clone();
    axum::Router::new()
        .route(
            "/api/admin/users",
            routing::get(move || {
                let hits = list_hits.clone();
                async move {
                    hits.hit();
                    Json(page_of(json!([{ "id": 42, "email": "ops@food.io", "fullName": "Ops Lead" }])))
                }
            }),
        )
        .route(
            "/api/admin/users/{id}",
            routing::get(move |Path(id): Path<i64>| {
                let hits = detail_hits.clone();
                async move {
                    hits.hit();
                    let version = hits.count();
                    Json(json!({ "success": true, "data": { "id": id, "email": "ops@food.io", "fullName": format!("Ops v{version}") } }))
                }
            })
            .put(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
                Json(json!({ "success": true, "data": { "id": id, "email": "ops@food.io", "firstName": body["firstName"] } }))
            })
            .delete(|| async {
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({ "success": false, "message": "Permission USER_DELETE required", "errorCode": "PERMISSION_DENIED" })),
                )
            }),
        )
}

#[tokio::test]
async fn identical_list_reads_issue_one_request() {
    let hits = Hits::default();
    let base = spawn_backend(backend(&hits)).await;
    let (ctx, _notices) = context_for(&base, signed_in_cookies());

    let params = ListParams::default().search("ops");
    let first = list(&ctx, &params).await;
    let second = list(&ctx, &params).await;
    assert_eq!(hits.lists.count(), 1);
    assert_eq!(first.data, second.data);
    assert_eq!(second.data.unwrap().content[0].display_name(), "Ops Lead");

    list(&ctx, &params.clone().page(1, 10)).await;
    assert_eq!(hits.lists.count(), 2);
}

#[tokio::test]
async fn updating_user_42_marks_detail_and_every_listing_stale() {
    let hits = Hits::default();
    let base = spawn_backend(backend(&hits)).await;
    let (ctx, mut notices) = context_for(&base, signed_in_cookies());

    let first_page = ListParams::default();
    let searched = ListParams::default().search("ops");
    assert_eq!(get(&ctx, 42).await.data.unwrap().display_name(), "Ops v1");
    list(&ctx, &first_page).await;
    list(&ctx, &searched).await;
    assert_eq!(hits.lists.count(), 2);
    ctx.cache.set_data(auth::current_admin_key(42), 0_u8);
    ctx.cache.set_data(auth::current_admin_key(7), 0_u8);

    let input = AdminUserInput { first_name: Some("Grace".into()), ..AdminUserInput::default() };
    let updated = update(&ctx, 42, &input).await.unwrap().unwrap();
    assert_eq!(updated.first_name.as_deref(), Some("Grace"));
    assert_eq!(drain_notices(&mut notices), vec![Notice::success("User updated")]);

    for key in [detail_key(42), list_key(&first_page), list_key(&searched), auth::current_admin_key(42)] {
        assert!(ctx.cache.status(&key).unwrap().invalidated, "{key} should be stale");
    }
    assert!(!ctx.cache.status(&auth::current_admin_key(7)).unwrap().invalidated);

    // The next read serves the old value and refetches behind it.
    let stale = get(&ctx, 42).await;
    assert!(stale.is_stale);
    assert_eq!(stale.data.unwrap().display_name(), "Ops v1");
    assert!(ctx.cache.await_in_flight(&detail_key(42)).await);
    assert_eq!(hits.details.count(), 2);
    assert_eq!(get(&ctx, 42).await.data.unwrap().display_name(), "Ops v2");

    list(&ctx, &first_page).await;
    assert!(ctx.cache.await_in_flight(&list_key(&first_page)).await);
    assert_eq!(hits.lists.count(), 3);
}

#[tokio::test]
async fn failed_delete_leaves_cache_untouched() {
    let hits = Hits::default();
    let base = spawn_backend(backend(&hits)).await;
    let (ctx, mut notices) = context_for(&base, signed_in_cookies());

    let params = ListParams::default();
    list(&ctx, &params).await;
    get(&ctx, 42).await;

    let err = delete(&ctx, 42).await.unwrap_err();
    assert_eq!(err.code(), Some("PERMISSION_DENIED"));

    assert!(!ctx.cache.status(&list_key(&params)).unwrap().invalidated);
    assert!(!ctx.cache.status(&detail_key(42)).unwrap().invalidated);
    list(&ctx, &params).await;
    assert_eq!(hits.lists.count(), 1);

    let raised = drain_notices(&mut notices);
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].level, NoticeLevel::Error);
    assert_eq!(raised[0].message, "Permission USER_DELETE required");
    assert!(raised[0].prominent);
}
