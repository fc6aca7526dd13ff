use axum::Json;
use axum::routing;
use serde_json::{Value, json};

use super::*;
use crate::test_support::{HitCounter, context_for, signed_in_cookies, spawn_backend};

fn backend(hits: &HitCounter) -> axum::Router {
    let hits = hits.clone();
    axum::Router::new().route(
        "/api/admin/preferences",
        routing::get(move || {
            let hits = hits.clone();
            async move {
                hits.hit();
                Json(json!({ "success": true, "data": { "currency": "USD", "timezone": "UTC", "theme": "dark" } }))
            }
        })
        .patch(|Json(patch): Json<Value>| async move {
            // Echo what was sent so the test can see exactly which fields went out.
            Json(json!({ "success": true, "data": patch }))
        }),
    )
}

#[tokio::test]
async fn patch_sends_only_set_fields_and_invalidates() {
    let hits = HitCounter::default();
    let base = spawn_backend(backend(&hits)).await;
    let (ctx, _notices) = context_for(&base, signed_in_cookies());

    let current = get(&ctx).await.into_result().unwrap();
    assert_eq!(current.currency.as_deref(), Some("USD"));
    assert_eq!(current.extra["theme"], "dark");

    let patch = PreferencesInput { timezone: Some("Europe/Paris".into()), ..PreferencesInput::default() };
    let echoed = update(&ctx, &patch).await.unwrap().unwrap();
    assert_eq!(echoed.timezone.as_deref(), Some("Europe/Paris"));
    assert!(echoed.currency.is_none());
    assert!(echoed.extra.is_empty());

    assert!(ctx.cache.status(&key()).unwrap().invalidated);
    get(&ctx).await;
    assert!(ctx.cache.await_in_flight(&key()).await);
    assert_eq!(hits.count(), 2);
}
