//! Lifecycle contract a resource implements to be driven by a reconciliation
//! engine.
//!
//! The engine owns sequencing: it decides from desired and observed state
//! which operation to call. An implementation translates one call into remote
//! API requests and returns the resulting record or diagnostics.

use async_trait::async_trait;

use crate::diag::Diagnostics;
use crate::schema::Schema;

#[async_trait]
pub trait Resource: Send + Sync {
    /// Desired configuration.
    type Config: Send + Sync;
    /// Record of a resource that exists remotely.
    type State: Send + Sync;

    fn schema(&self) -> Schema;

    /// Create the resource. On error there is no state; the resource is
    /// still absent as far as the caller knows.
    async fn create(&self, desired: &Self::Config) -> Result<Self::State, Diagnostics>;

    /// Refresh from the remote system. `Ok(None)` means the resource is gone.
    async fn read(&self, id: &str) -> Result<Option<Self::State>, Diagnostics>;

    /// Apply in-place changes. On error the caller keeps its prior state.
    async fn update(
        &self,
        prior: &Self::State,
        desired: &Self::Config,
    ) -> Result<Self::State, Diagnostics>;

    /// Destroy the resource. On error the resource must be treated as
    /// existing.
    async fn delete(&self, state: &Self::State) -> Result<(), Diagnostics>;

    /// Adopt an existing resource by id.
    async fn import(&self, id: &str) -> Result<Option<Self::State>, Diagnostics> {
        self.read(id).await
    }
}
