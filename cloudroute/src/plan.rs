//! Decide which lifecycle operation converges one route.

use std::fmt;

use crate::route::{RouteConfig, RouteState};
use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    /// Destroy then create, because the listed attributes cannot change in
    /// place.
    Replace { attributes: Vec<String> },
    Noop,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => f.write_str("create"),
            Action::Update => f.write_str("update in place"),
            Action::Replace { attributes } => {
                write!(f, "replace (forced by {})", attributes.join(", "))
            }
            Action::Noop => f.write_str("no changes"),
        }
    }
}

/// Compare refreshed state with desired configuration.
pub fn plan(schema: &Schema, prior: Option<&RouteState>, desired: &RouteConfig) -> Action {
    let Some(prior) = prior else {
        return Action::Create;
    };

    let changed: Vec<_> = schema
        .attributes
        .iter()
        .filter(|a| prior.config.attribute(a.name) != desired.attribute(a.name))
        .collect();

    if changed.is_empty() {
        return Action::Noop;
    }

    let forced: Vec<String> = changed
        .iter()
        .filter(|a| a.force_new)
        .map(|a| a.name.to_string())
        .collect();

    if forced.is_empty() {
        Action::Update
    } else {
        Action::Replace { attributes: forced }
    }
}
