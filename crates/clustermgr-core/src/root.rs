// The API root: entry point for every endpoint helper.
//
// Holds the shared transport and a `Resource` at the version base
// (`/api/v<N>/`). Endpoint modules add their helpers through separate
// `impl ApiRoot` blocks.

use std::sync::Arc;

use clustermgr_api::{ConnectionConfig, Error, HttpClient, Resource};
use tracing::debug;

use crate::entity::Entity;
use crate::version;

/// Handle to a Cluster Manager API endpoint.
///
/// Cheap to clone; all clones share one transport and cookie jar.
#[derive(Debug, Clone)]
pub struct ApiRoot {
    resource: Resource,
}

impl ApiRoot {
    /// Build a transport from `config` and wrap it.
    pub fn connect(config: &ConnectionConfig) -> Result<Self, Error> {
        let client = HttpClient::new(config)?;
        debug!(base_url = %client.base_url(), "connected API root");
        Ok(Self::from_client(Arc::new(client)))
    }

    pub fn from_client(client: Arc<HttpClient>) -> Self {
        Self {
            resource: Resource::root(client),
        }
    }

    /// Recover a root from an entity loaded through one.
    pub fn of(entity: &Entity) -> Result<Self, Error> {
        entity.require_client().map(Self::from_client)
    }

    pub fn client(&self) -> &Arc<HttpClient> {
        self.resource.client()
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// A resource below the version base, e.g. `clusters/c1`.
    pub fn at(&self, path: &str) -> Resource {
        self.resource.child(path)
    }

    pub fn version(&self) -> u32 {
        self.resource.version()
    }

    /// Version gate for caller-defined operations.
    pub fn require_version(&self, min: u32, operation: &str) -> Result<(), Error> {
        version::require(self.client(), min, operation)
    }
}
