//! Orders. The dashboard only views them.

use std::time::Duration;

use super::{ListParams, TWO_MINUTES, list_request, read};
use crate::api::{ApiRequest, Page};
use crate::cache::{QueryKey, QueryResult};
use crate::context::DataContext;
use crate::models::Order;

pub const STALE_TIME: Duration = TWO_MINUTES;

const PATH: &str = "/api/admin/orders";

#[must_use]
pub fn list_key(params: &ListParams) -> QueryKey {
    QueryKey::new("orders").params(params.key_params())
}

#[must_use]
pub fn detail_key(id: i64) -> QueryKey {
    QueryKey::new("order").id(id)
}

pub async fn list(ctx: &DataContext, params: &ListParams) -> QueryResult<Page<Order>> {
    read(ctx, list_key(params), STALE_TIME, list_request(PATH, params), "Failed to load orders").await
}

pub async fn get(ctx: &DataContext, id: i64) -> QueryResult<Order> {
    read(ctx, detail_key(id), STALE_TIME, ApiRequest::get(format!("{PATH}/{id}")), "Failed to load order").await
}

#[cfg(test)]
#[path = "orders_test.rs"]
mod tests;
