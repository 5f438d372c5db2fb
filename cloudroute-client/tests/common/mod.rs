//! In-process mock of the management API for client integration tests.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use cloudroute_client::{ClientConfig, HttpRouteClient};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::RwLock;

pub const CLIENT_ID: &str = "test-id";
pub const CLIENT_SECRET: &str = "test-secret";

/// A request the mock received, for assertions.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct Inner {
    pub routes: HashMap<String, Value>,
    pub tokens: HashSet<String>,
    pub tokens_issued: u32,
    pub next_id: u32,
    pub requests: Vec<Recorded>,
    pub omit_created_value: bool,
}

pub type MockState = Arc<RwLock<Inner>>;

/// Mock API server bound to an ephemeral port.
pub struct MockApi {
    pub addr: SocketAddr,
    pub state: MockState,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl MockApi {
    pub async fn spawn() -> Self {
        let state: MockState = Arc::new(RwLock::new(Inner::default()));

        let router = Router::new()
            .route("/api/beta/oauth/token", post(issue_token))
            .route("/api/beta/networks/{network_id}/routes", post(create_route))
            .route(
                "/api/beta/networks/{network_id}/routes/{id}",
                put(update_route).delete(delete_route),
            )
            .route("/api/beta/routes/{id}", get(get_route))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> HttpRouteClient {
        self.client_with(CLIENT_ID, CLIENT_SECRET)
    }

    pub fn client_with(&self, id: &str, secret: &str) -> HttpRouteClient {
        HttpRouteClient::new(ClientConfig {
            base_url: self.base_url(),
            client_id: id.to_string(),
            client_secret: secret.to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    /// Insert a route directly, bypassing the API.
    pub async fn seed(&self, id: &str, route: Value) {
        self.state
            .write()
            .await
            .routes
            .insert(id.to_string(), route);
    }

    /// Answer creates without the `subnet`/`domain` field.
    pub async fn omit_created_value(&self) {
        self.state.write().await.omit_created_value = true;
    }

    /// Invalidate every issued token.
    pub async fn revoke_tokens(&self) {
        self.state.write().await.tokens.clear();
    }

    pub async fn requests(&self) -> Vec<Recorded> {
        self.state.read().await.requests.clone()
    }

    pub async fn tokens_issued(&self) -> u32 {
        self.state.read().await.tokens_issued
    }

    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

fn authorized(inner: &Inner, headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|t| inner.tokens.contains(t))
}

async fn issue_token(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut inner = state.write().await;
    let valid = params.get("grant_type").map(String::as_str) == Some("client_credentials")
        && params.get("client_id").map(String::as_str) == Some(CLIENT_ID)
        && params.get("client_secret").map(String::as_str) == Some(CLIENT_SECRET);
    if !valid {
        return (StatusCode::UNAUTHORIZED, "invalid client credentials").into_response();
    }

    inner.tokens_issued += 1;
    let token = format!("token-{}", inner.tokens_issued);
    inner.tokens.insert(token.clone());
    Json(json!({ "access_token": token, "token_type": "bearer" })).into_response()
}

async fn create_route(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(network_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = state.write().await;
    inner.requests.push(Recorded {
        method: "POST",
        path: format!("/networks/{}/routes", network_id),
        body: Some(body.clone()),
    });
    if !authorized(&inner, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let route_type = body["type"].as_str().unwrap_or_default().to_string();
    let value = body["value"].as_str().unwrap_or_default().to_string();
    if value.is_empty() {
        return (StatusCode::BAD_REQUEST, "value is required").into_response();
    }

    inner.next_id += 1;
    let id = format!("r{}", inner.next_id);
    let (subnet, domain) = if route_type == "DOMAIN" {
        (String::new(), value)
    } else {
        (value, String::new())
    };
    let route = json!({
        "id": id,
        "type": route_type,
        "subnet": subnet,
        "domain": domain,
        "description": body["description"],
        "networkItemId": network_id,
    });
    inner.routes.insert(id, route.clone());
    if inner.omit_created_value {
        let mut route = route;
        if let Some(fields) = route.as_object_mut() {
            fields.remove("subnet");
            fields.remove("domain");
        }
        return Json(route).into_response();
    }
    Json(route).into_response()
}

async fn get_route(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut inner = state.write().await;
    inner.requests.push(Recorded {
        method: "GET",
        path: format!("/routes/{}", id),
        body: None,
    });
    if !authorized(&inner, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match inner.routes.get(&id) {
        Some(route) => Json(route.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "route not found").into_response(),
    }
}

async fn update_route(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path((network_id, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = state.write().await;
    inner.requests.push(Recorded {
        method: "PUT",
        path: format!("/networks/{}/routes/{}", network_id, id),
        body: Some(body.clone()),
    });
    if !authorized(&inner, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let Some(route) = inner.routes.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, "route not found").into_response();
    };
    route["description"] = body["description"].clone();
    let field = if route["type"] == "DOMAIN" {
        "domain"
    } else {
        "subnet"
    };
    route[field] = body["value"].clone();
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_route(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path((network_id, id)): Path<(String, String)>,
) -> Response {
    let mut inner = state.write().await;
    inner.requests.push(Recorded {
        method: "DELETE",
        path: format!("/networks/{}/routes/{}", network_id, id),
        body: None,
    });
    if !authorized(&inner, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match inner.routes.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => (StatusCode::NOT_FOUND, "route not found").into_response(),
    }
}
