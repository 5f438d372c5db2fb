//! HTTP implementation of [`RouteApi`] against the management API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::RouteApi;
use crate::error::{ClientError, Result};
use crate::model::{Route, RoutePatch, RouteSpec, RouteTarget, RouteType};

/// Connection settings for [`HttpRouteClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the management API, e.g. `https://acme.api.example.com`.
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Route API client authenticating with OAuth client credentials.
///
/// The bearer token is fetched on first use and kept until the API answers
/// 401, after which the next call fetches a new one.
pub struct HttpRouteClient {
    http: reqwest::Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
    token: RwLock<Option<String>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
struct CreateRouteBody<'a> {
    #[serde(rename = "type")]
    route_type: RouteType,
    value: &'a str,
    description: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteWire {
    id: String,
    #[serde(rename = "type")]
    route_type: RouteType,
    #[serde(default)]
    subnet: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    network_item_id: Option<String>,
}

impl RouteWire {
    fn into_route(self, network_item_id: Option<&str>) -> Result<Route> {
        self.into_route_with(network_item_id, None)
    }

    /// Decode a route. When the selected field is missing, `fallback` is used
    /// instead of failing; the create path passes the requested value so an
    /// accepted route is never reported as lost.
    fn into_route_with(
        self,
        network_item_id: Option<&str>,
        fallback: Option<&str>,
    ) -> Result<Route> {
        let field = match self.route_type {
            RouteType::Domain => "domain",
            _ => "subnet",
        };
        let selected = match self.route_type {
            RouteType::Ipv4 | RouteType::Ipv6 => self.subnet,
            RouteType::Domain => self.domain,
        };
        let value = match (selected.filter(|v| !v.is_empty()), fallback) {
            (Some(value), _) => value,
            (None, Some(fallback)) => {
                warn!(
                    "Route {} returned without {}, keeping requested value {}",
                    self.id, field, fallback
                );
                fallback.to_string()
            }
            (None, None) => {
                return Err(ClientError::Decode(format!(
                    "route {} of type {} carries no {}",
                    self.id, self.route_type, field
                )));
            }
        };

        Ok(Route {
            network_item_id: self
                .network_item_id
                .filter(|n| !n.is_empty())
                .or_else(|| network_item_id.map(str::to_string))
                .unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            target: RouteTarget::new(self.route_type, value),
            id: self.id,
        })
    }
}

impl HttpRouteClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| ClientError::Config(format!("base URL '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "base URL '{}' cannot carry a path",
                config.base_url
            )));
        }
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(ClientError::Config(
                "client id and client secret are required".to_string(),
            ));
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url,
            client_id: config.client_id,
            client_secret: config.client_secret,
            token: RwLock::new(None),
        })
    }

    /// Build `{base}/api/beta/{segments...}` with each segment escaped.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["api", "beta"])
                .extend(segments);
        }
        url
    }

    /// Return the cached bearer token, fetching one if needed.
    async fn token(&self) -> Result<String> {
        {
            let token = self.token.read().await;
            if let Some(token) = token.as_ref() {
                return Ok(token.clone());
            }
        }

        let mut token = self.token.write().await;
        if let Some(token) = token.as_ref() {
            return Ok(token.clone());
        }

        let fresh = self.fetch_token().await?;
        *token = Some(fresh.clone());
        Ok(fresh)
    }

    async fn fetch_token(&self) -> Result<String> {
        let url = self.endpoint(&["oauth", "token"]);
        debug!(url = %url, "Requesting access token");

        let response = self
            .http
            .post(url)
            .query(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Auth(status_message(status, &body)));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Send an authenticated request and return the raw response.
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.token().await?;
        let response = request.bearer_auth(token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            *self.token.write().await = None;
        }
        Ok(response)
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            message: status_message(status, &body),
        })
    }
}

/// Response body if present, otherwise the lowercase reason phrase.
fn status_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_lowercase()
    } else {
        body.to_string()
    }
}

#[async_trait]
impl RouteApi for HttpRouteClient {
    async fn create_route(&self, network_item_id: &str, spec: &RouteSpec) -> Result<Route> {
        let url = self.endpoint(&["networks", network_item_id, "routes"]);
        debug!(url = %url, network_item_id, "Creating route");

        let body = CreateRouteBody {
            route_type: spec.target.route_type(),
            value: spec.target.value(),
            description: &spec.description,
        };
        let response = self.execute(self.http.post(url).json(&body)).await?;
        let wire: RouteWire = Self::check_status(response).await?.json().await?;
        wire.into_route_with(Some(network_item_id), Some(spec.target.value()))
    }

    async fn get_route_by_id(&self, id: &str) -> Result<Option<Route>> {
        let url = self.endpoint(&["routes", id]);
        debug!(url = %url, "Fetching route");

        let response = self.execute(self.http.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let wire: RouteWire = Self::check_status(response).await?.json().await?;
        wire.into_route(None).map(Some)
    }

    async fn update_route(&self, network_item_id: &str, patch: &RoutePatch) -> Result<()> {
        let url = self.endpoint(&["networks", network_item_id, "routes", &patch.id]);
        debug!(url = %url, "Updating route");

        let response = self.execute(self.http.put(url).json(patch)).await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn delete_route(&self, network_item_id: &str, id: &str) -> Result<()> {
        let url = self.endpoint(&["networks", network_item_id, "routes", id]);
        debug!(url = %url, "Deleting route");

        let response = self.execute(self.http.delete(url)).await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
