//! Shared helpers for tests that need a live backend.
//!
//! Backends are plain Axum routers served on an ephemeral localhost port, so
//! tests exercise the real `reqwest` stack end to end.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use tokio::sync::mpsc;

use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::config::ApiConfig;
use crate::context::DataContext;
use crate::notify::{ChannelNotifier, Notice};
use crate::session::{CookieStore, MemoryCookieStore, Session};

/// Serve `router` on `127.0.0.1:0` and return its base URL.
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("mock backend should bind");
    let addr = listener.local_addr().expect("mock backend address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("mock backend should serve");
    });
    format!("http://{addr}")
}

/// Cookie store holding a signed-in session for admin 42.
#[must_use]
pub fn signed_in_cookies() -> Arc<dyn CookieStore> {
    Arc::new(MemoryCookieStore::with_session(&Session {
        access_token: "token-abc".into(),
        refresh_token: Some("refresh-abc".into()),
        user_id: Some("42".into()),
    }))
}

#[must_use]
pub fn client_for(base_url: &str, cookies: Arc<dyn CookieStore>) -> ApiClient {
    let config = ApiConfig::new(base_url).expect("test base url");
    ApiClient::new(&config, cookies).expect("test client")
}

/// Context wired to `base_url` with a channel notifier for assertions.
#[must_use]
pub fn context_for(base_url: &str, cookies: Arc<dyn CookieStore>) -> (DataContext, mpsc::UnboundedReceiver<Notice>) {
    let (notifier, notices) = ChannelNotifier::channel();
    let ctx = DataContext::new(client_for(base_url, cookies), QueryCache::new(), Arc::new(notifier));
    (ctx, notices)
}

/// Counts requests reaching a mock route.
#[derive(Clone, Default)]
pub struct HitCounter(Arc<AtomicUsize>);

impl HitCounter {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Collect every notice raised so far.
pub fn drain_notices(rx: &mut mpsc::UnboundedReceiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}
