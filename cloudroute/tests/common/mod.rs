//! Shared test utilities for route lifecycle tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use cloudroute::RouteConfig;
use cloudroute_client::{
    ClientError, Result, Route, RouteApi, RoutePatch, RouteSpec, RouteTarget, RouteType,
};

/// A call the mock received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create {
        network_item_id: String,
        spec: RouteSpec,
    },
    Get {
        id: String,
    },
    Update {
        network_item_id: String,
        patch: RoutePatch,
    },
    Delete {
        network_item_id: String,
        id: String,
    },
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    routes: HashMap<String, Route>,
    next_id: u32,
    fail_with: Option<String>,
    fail_creates_with: Option<String>,
    canonical_value: Option<String>,
}

/// In-memory [`RouteApi`] that records every call.
#[derive(Default)]
pub struct MockRouteApi {
    inner: Mutex<Inner>,
}

impl MockRouteApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with a 401 carrying `message`.
    pub fn fail_with(&self, message: &str) {
        self.inner.lock().unwrap().fail_with = Some(message.to_string());
    }

    /// Make every following create fail with a 400 carrying `message`.
    pub fn fail_creates_with(&self, message: &str) {
        self.inner.lock().unwrap().fail_creates_with = Some(message.to_string());
    }

    /// Make the next created route store `value` instead of the requested one.
    pub fn canonicalize_to(&self, value: &str) {
        self.inner.lock().unwrap().canonical_value = Some(value.to_string());
    }

    pub fn insert(&self, route: Route) {
        self.inner
            .lock()
            .unwrap()
            .routes
            .insert(route.id.clone(), route);
    }

    pub fn remove(&self, id: &str) {
        self.inner.lock().unwrap().routes.remove(id);
    }

    pub fn route(&self, id: &str) -> Option<Route> {
        self.inner.lock().unwrap().routes.get(id).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        match &inner.fail_with {
            Some(message) => Err(ClientError::Status {
                status: 401,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RouteApi for MockRouteApi {
    async fn create_route(&self, network_item_id: &str, spec: &RouteSpec) -> Result<Route> {
        self.record(Call::Create {
            network_item_id: network_item_id.to_string(),
            spec: spec.clone(),
        })?;

        let mut inner = self.inner.lock().unwrap();
        if let Some(message) = &inner.fail_creates_with {
            return Err(ClientError::Status {
                status: 400,
                message: message.clone(),
            });
        }
        inner.next_id += 1;
        let value = inner
            .canonical_value
            .take()
            .unwrap_or_else(|| spec.target.value().to_string());
        let route = Route {
            id: format!("r{}", inner.next_id),
            network_item_id: network_item_id.to_string(),
            description: spec.description.clone(),
            target: RouteTarget::new(spec.target.route_type(), value),
        };
        inner.routes.insert(route.id.clone(), route.clone());
        Ok(route)
    }

    async fn get_route_by_id(&self, id: &str) -> Result<Option<Route>> {
        self.record(Call::Get { id: id.to_string() })?;
        Ok(self.route(id))
    }

    async fn update_route(&self, network_item_id: &str, patch: &RoutePatch) -> Result<()> {
        self.record(Call::Update {
            network_item_id: network_item_id.to_string(),
            patch: patch.clone(),
        })?;

        let mut inner = self.inner.lock().unwrap();
        let route = inner
            .routes
            .get_mut(&patch.id)
            .ok_or_else(|| ClientError::Status {
                status: 404,
                message: "route not found".to_string(),
            })?;
        route.description = patch.description.clone();
        route.target = RouteTarget::new(route.target.route_type(), patch.value.clone());
        Ok(())
    }

    async fn delete_route(&self, network_item_id: &str, id: &str) -> Result<()> {
        self.record(Call::Delete {
            network_item_id: network_item_id.to_string(),
            id: id.to_string(),
        })?;

        self.inner
            .lock()
            .unwrap()
            .routes
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ClientError::Status {
                status: 404,
                message: "route not found".to_string(),
            })
    }
}

pub fn config(route_type: RouteType, value: &str) -> RouteConfig {
    RouteConfig {
        route_type,
        value: value.to_string(),
        network_item_id: "net1".to_string(),
        description: cloudroute::DEFAULT_DESCRIPTION.to_string(),
    }
}
