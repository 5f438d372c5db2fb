//! Route domain types shared by the client and its callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of traffic a route steers into a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteType {
    #[serde(rename = "IP_V4")]
    Ipv4,
    #[serde(rename = "IP_V6")]
    Ipv6,
    #[serde(rename = "DOMAIN")]
    Domain,
}

impl RouteType {
    pub const ALL: [RouteType; 3] = [RouteType::Ipv4, RouteType::Ipv6, RouteType::Domain];

    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteType::Ipv4 => "IP_V4",
            RouteType::Ipv6 => "IP_V6",
            RouteType::Domain => "DOMAIN",
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown route type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route type '{0}', expected one of IP_V4, IP_V6, DOMAIN")]
pub struct UnknownRouteType(pub String);

impl FromStr for RouteType {
    type Err = UnknownRouteType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RouteType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownRouteType(s.to_string()))
    }
}

/// What a route points at. The remote API stores subnets and domains in
/// separate fields; the variant decides which one is meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    Ipv4Subnet(String),
    Ipv6Subnet(String),
    Domain(String),
}

impl RouteTarget {
    pub fn new(route_type: RouteType, value: impl Into<String>) -> Self {
        let value = value.into();
        match route_type {
            RouteType::Ipv4 => RouteTarget::Ipv4Subnet(value),
            RouteType::Ipv6 => RouteTarget::Ipv6Subnet(value),
            RouteType::Domain => RouteTarget::Domain(value),
        }
    }

    pub fn route_type(&self) -> RouteType {
        match self {
            RouteTarget::Ipv4Subnet(_) => RouteType::Ipv4,
            RouteTarget::Ipv6Subnet(_) => RouteType::Ipv6,
            RouteTarget::Domain(_) => RouteType::Domain,
        }
    }

    /// The subnet or domain literal.
    pub fn value(&self) -> &str {
        match self {
            RouteTarget::Ipv4Subnet(v) | RouteTarget::Ipv6Subnet(v) | RouteTarget::Domain(v) => v,
        }
    }

    pub fn into_value(self) -> String {
        match self {
            RouteTarget::Ipv4Subnet(v) | RouteTarget::Ipv6Subnet(v) | RouteTarget::Domain(v) => v,
        }
    }
}

/// A route as stored by the remote system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: String,
    pub network_item_id: String,
    pub description: String,
    pub target: RouteTarget,
}

/// Request to create a route on a network item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub target: RouteTarget,
    pub description: String,
}

/// In-place change of an existing route. Type and owning network cannot be
/// patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutePatch {
    pub id: String,
    pub description: String,
    pub value: String,
}
