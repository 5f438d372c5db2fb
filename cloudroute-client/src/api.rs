//! The route API contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Route, RoutePatch, RouteSpec};

/// Remote operations on routes.
#[async_trait]
pub trait RouteApi: Send + Sync {
    /// Create a route on a network item and return it as stored remotely.
    async fn create_route(&self, network_item_id: &str, spec: &RouteSpec) -> Result<Route>;

    /// Look up a route. `Ok(None)` means the route does not exist.
    async fn get_route_by_id(&self, id: &str) -> Result<Option<Route>>;

    /// Change description and value of an existing route.
    async fn update_route(&self, network_item_id: &str, patch: &RoutePatch) -> Result<()>;

    /// Delete a route owned by a network item.
    async fn delete_route(&self, network_item_id: &str, id: &str) -> Result<()>;
}

#[async_trait]
impl<T: RouteApi + ?Sized> RouteApi for Arc<T> {
    async fn create_route(&self, network_item_id: &str, spec: &RouteSpec) -> Result<Route> {
        (**self).create_route(network_item_id, spec).await
    }

    async fn get_route_by_id(&self, id: &str) -> Result<Option<Route>> {
        (**self).get_route_by_id(id).await
    }

    async fn update_route(&self, network_item_id: &str, patch: &RoutePatch) -> Result<()> {
        (**self).update_route(network_item_id, patch).await
    }

    async fn delete_route(&self, network_item_id: &str, id: &str) -> Result<()> {
        (**self).delete_route(network_item_id, id).await
    }
}
