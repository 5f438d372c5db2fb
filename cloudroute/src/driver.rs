//! Sequencing of lifecycle calls against the state file.
//!
//! These functions play the engine's part for a single route: refresh the
//! recorded state, pick an action with [`plan`], call the resource, and
//! persist the outcome.

use thiserror::Error;
use tracing::info;

use crate::diag::Diagnostics;
use crate::plan::{Action, plan};
use crate::resource::Resource;
use crate::route::{RouteConfig, RouteState};
use crate::state::{StateError, StateFile};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Diagnostics(#[from] Diagnostics),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("cannot {0} a route without prior state")]
    MissingState(Action),
}

/// Load the last known record and read it back from the API.
///
/// The state file is left untouched; callers decide whether to persist the
/// refreshed record.
pub async fn refresh<R>(
    resource: &R,
    state_file: &StateFile,
) -> Result<Option<RouteState>, DriverError>
where
    R: Resource<Config = RouteConfig, State = RouteState>,
{
    match state_file.load().await? {
        Some(prior) => Ok(resource.read(&prior.id).await?),
        None => Ok(None),
    }
}

/// Converge the route to `desired` starting from the refreshed `prior`
/// record and save the result.
pub async fn apply<R>(
    resource: &R,
    state_file: &StateFile,
    prior: Option<RouteState>,
    desired: &RouteConfig,
) -> Result<RouteState, DriverError>
where
    R: Resource<Config = RouteConfig, State = RouteState>,
{
    let action = plan(&resource.schema(), prior.as_ref(), desired);
    info!("Plan: {}", action);

    let next = match (action, prior) {
        (Action::Noop, Some(prior)) => prior,
        (Action::Create, _) => resource.create(desired).await?,
        (Action::Update, Some(prior)) => resource.update(&prior, desired).await?,
        (Action::Replace { .. }, Some(prior)) => {
            resource.delete(&prior).await?;
            // A failed create must leave the route absent, not stale.
            state_file.save(None).await?;
            resource.create(desired).await?
        }
        (action, None) => return Err(DriverError::MissingState(action)),
    };

    state_file.save(Some(&next)).await?;
    Ok(next)
}

/// Delete the managed route and remove the state file.
///
/// The record is refreshed first; a route already gone remotely counts as
/// destroyed. Returns the id of the route that was deleted, if any.
pub async fn destroy<R>(
    resource: &R,
    state_file: &StateFile,
) -> Result<Option<String>, DriverError>
where
    R: Resource<Config = RouteConfig, State = RouteState>,
{
    let deleted = match refresh(resource, state_file).await? {
        Some(current) => {
            resource.delete(&current).await?;
            Some(current.id)
        }
        None => None,
    };

    state_file.save(None).await?;
    Ok(deleted)
}
