//! The network route resource.

use async_trait::async_trait;
use cloudroute_client::{Route, RouteApi, RoutePatch, RouteSpec, RouteTarget, RouteType};
use ipnet::{Ipv4Net, Ipv6Net};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::diag::{Diagnostic, Diagnostics};
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};

pub const DEFAULT_DESCRIPTION: &str = "Managed by Terraform";

/// Schema of the route resource.
pub fn route_schema() -> Schema {
    Schema {
        description: "Use `cloudroute_route` to create a route on a cloud VPN network.",
        attributes: vec![
            Attribute::required(
                "type",
                "The type of route. Valid values are `IP_V4`, `IP_V6`, and `DOMAIN`.",
            )
            .force_new()
            .one_of(&RouteType::ALL.map(|t| t.as_str())),
            Attribute::required("value", "The target value of the route.").force_new(),
            Attribute::required(
                "network_item_id",
                "The id of the network on which to create the route.",
            )
            .force_new(),
            Attribute::optional("description", "The description of the route.")
                .default_value(DEFAULT_DESCRIPTION),
        ],
    }
}

/// Desired configuration of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(rename = "type")]
    pub route_type: RouteType,
    pub value: String,
    pub network_item_id: String,
    #[serde(default = "default_description")]
    pub description: String,
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

impl RouteConfig {
    /// Validate a raw configuration object against the route schema.
    pub fn from_json(config: &Value) -> Result<Self, Diagnostics> {
        let resolved = route_schema().validate(config)?;
        let parsed: RouteConfig = serde_json::from_value(Value::Object(resolved))
            .map_err(|e| Diagnostics::from_err(&e))?;
        parsed.check_value()?;
        Ok(parsed)
    }

    fn check_value(&self) -> Result<(), Diagnostics> {
        let problem = match self.route_type {
            RouteType::Ipv4 => self
                .value
                .parse::<Ipv4Net>()
                .err()
                .map(|_| "expected an IPv4 subnet in CIDR notation"),
            RouteType::Ipv6 => self
                .value
                .parse::<Ipv6Net>()
                .err()
                .map(|_| "expected an IPv6 subnet in CIDR notation"),
            RouteType::Domain => (self.value.is_empty()
                || self.value.chars().any(char::is_whitespace))
            .then_some("expected a domain name"),
        };

        match problem {
            Some(summary) => Err(Diagnostic::error(format!(
                "{}, got \"{}\"",
                summary, self.value
            ))
            .with_attribute("value")
            .into()),
            None => Ok(()),
        }
    }

    pub fn target(&self) -> RouteTarget {
        RouteTarget::new(self.route_type, self.value.clone())
    }

    /// Attribute value by schema name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match name {
            "type" => Some(self.route_type.as_str()),
            "value" => Some(&self.value),
            "network_item_id" => Some(&self.network_item_id),
            "description" => Some(&self.description),
            _ => None,
        }
    }
}

/// A route that exists remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteState {
    pub id: String,
    #[serde(flatten)]
    pub config: RouteConfig,
}

impl From<Route> for RouteState {
    fn from(route: Route) -> Self {
        Self {
            id: route.id,
            config: RouteConfig {
                route_type: route.target.route_type(),
                value: route.target.into_value(),
                network_item_id: route.network_item_id,
                description: route.description,
            },
        }
    }
}

/// Route resource backed by a [`RouteApi`] client.
pub struct RouteResource<C> {
    client: C,
}

impl<C: RouteApi> RouteResource<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: RouteApi> Resource for RouteResource<C> {
    type Config = RouteConfig;
    type State = RouteState;

    fn schema(&self) -> Schema {
        route_schema()
    }

    async fn create(&self, desired: &RouteConfig) -> Result<RouteState, Diagnostics> {
        info!(
            "Creating {} route {} on network {}",
            desired.route_type, desired.value, desired.network_item_id
        );

        let spec = RouteSpec {
            target: desired.target(),
            description: desired.description.clone(),
        };
        let route = self
            .client
            .create_route(&desired.network_item_id, &spec)
            .await
            .map_err(|e| {
                error!("Failed to create route {}: {}", desired.value, e);
                Diagnostics::from_err(&e)
            })?;

        // The API may canonicalize the value; keep what it stored.
        let mut config = desired.clone();
        config.value = route.target.into_value();
        if config.value != desired.value {
            debug!("Route value normalized: {} -> {}", desired.value, config.value);
        }

        info!("Created route {} ({})", route.id, config.value);
        Ok(RouteState {
            id: route.id,
            config,
        })
    }

    async fn read(&self, id: &str) -> Result<Option<RouteState>, Diagnostics> {
        debug!("Reading route {}", id);

        let route = self.client.get_route_by_id(id).await.map_err(|e| {
            error!("Failed to read route {}: {}", id, e);
            Diagnostics::from_err(&e)
        })?;

        match route {
            Some(route) => Ok(Some(route.into())),
            None => {
                warn!("Route {} no longer exists", id);
                Ok(None)
            }
        }
    }

    async fn update(
        &self,
        prior: &RouteState,
        desired: &RouteConfig,
    ) -> Result<RouteState, Diagnostics> {
        let mut diags = Diagnostics::new();
        if prior.config.route_type != desired.route_type {
            diags.push(
                Diagnostic::error("cannot be changed in place, the route must be replaced")
                    .with_attribute("type"),
            );
        }
        if prior.config.network_item_id != desired.network_item_id {
            diags.push(
                Diagnostic::error("cannot be changed in place, the route must be replaced")
                    .with_attribute("network_item_id"),
            );
        }
        diags.into_result()?;

        if prior.config.description == desired.description && prior.config.value == desired.value
        {
            debug!("Route {} unchanged, skipping update", prior.id);
            return Ok(prior.clone());
        }

        info!("Updating route {}", prior.id);
        let patch = RoutePatch {
            id: prior.id.clone(),
            description: desired.description.clone(),
            value: desired.value.clone(),
        };
        self.client
            .update_route(&prior.config.network_item_id, &patch)
            .await
            .map_err(|e| {
                error!("Failed to update route {}: {}", prior.id, e);
                Diagnostics::from_err(&e)
            })?;

        Ok(RouteState {
            id: prior.id.clone(),
            config: desired.clone(),
        })
    }

    async fn delete(&self, state: &RouteState) -> Result<(), Diagnostics> {
        info!(
            "Deleting route {} from network {}",
            state.id, state.config.network_item_id
        );

        self.client
            .delete_route(&state.config.network_item_id, &state.id)
            .await
            .map_err(|e| {
                error!("Failed to delete route {}: {}", state.id, e);
                Diagnostics::from_err(&e)
            })
    }
}
