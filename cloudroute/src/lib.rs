//! Route resource of the cloud VPN infrastructure provider.
//!
//! [`RouteResource`] implements the [`Resource`] lifecycle (create, read,
//! update, delete, import) for network routes by translating each call into
//! requests against a [`cloudroute_client::RouteApi`]. The client is injected
//! by the caller.

pub mod diag;
pub mod driver;
pub mod plan;
pub mod resource;
pub mod route;
pub mod schema;
pub mod state;

pub use diag::{Diagnostic, Diagnostics, Severity};
pub use driver::{DriverError, apply, destroy, refresh};
pub use plan::{Action, plan};
pub use resource::Resource;
pub use route::{DEFAULT_DESCRIPTION, RouteConfig, RouteResource, RouteState, route_schema};
pub use schema::{Attribute, AttributeType, Schema};
pub use state::{StateError, StateFile};
