//! Client for the route endpoints of the cloud VPN management API.
//!
//! [`RouteApi`] is the contract the route resource depends on;
//! [`HttpRouteClient`] implements it over HTTPS.
//!
//! # Example
//! ```ignore
//! use cloudroute_client::{ClientConfig, HttpRouteClient, RouteApi};
//!
//! let client = HttpRouteClient::new(ClientConfig {
//!     base_url: "https://acme.api.example.com".into(),
//!     client_id: id,
//!     client_secret: secret,
//!     timeout: std::time::Duration::from_secs(30),
//! })?;
//! let route = client.get_route_by_id("r1").await?;
//! ```

pub mod api;
pub mod error;
pub mod http;
pub mod model;

pub use api::RouteApi;
pub use error::{ClientError, Result};
pub use http::{ClientConfig, HttpRouteClient};
pub use model::{Route, RoutePatch, RouteSpec, RouteTarget, RouteType, UnknownRouteType};
