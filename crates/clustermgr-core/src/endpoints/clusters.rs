// Cluster endpoints
//
// `/clusters` and everything directly below a cluster: lifecycle
// commands, maintenance mode and host membership. Services live in
// `services.rs`.

use clustermgr_api::{Error, Resource};
use serde_json::json;
use tracing::debug;

use crate::api_object;
use crate::call::{Call, View};
use crate::command::{self, ApiCommand};
use crate::endpoints::types::ApiHostRef;
use crate::entity::{ApiObject, Entity, SerializeOptions, list_items};
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

pub static CLUSTER: Schema = Schema {
    name: "ApiCluster",
    attrs: &[
        Attr::rw("name", Kind::String),
        Attr::rw("displayName", Kind::String).since(6),
        Attr::ro("clusterUrl", Kind::String),
        Attr::rw("version", Kind::String),
        Attr::rw("fullVersion", Kind::String).since(3),
        Attr::ro("maintenanceMode", Kind::Bool),
        Attr::ro("maintenanceOwners", Kind::String).bare_list(),
        Attr::ro("hostsUrl", Kind::String).since(11),
        Attr::ro("entityStatus", Kind::String).since(11),
        Attr::ro("uuid", Kind::String).since(15),
    ],
};

api_object! {
    /// A cluster of hosts running a given CDH major version.
    pub struct ApiCluster => CLUSTER;
}

impl ApiCluster {
    pub fn new(name: &str, version: &str) -> Self {
        Self(
            Entity::new(&CLUSTER)
                .fill("name", name)
                .fill("version", version),
        )
    }

    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    pub fn display_name(&self) -> Option<&str> {
        self.str_attr("displayName")
    }

    pub fn version(&self) -> Option<&str> {
        self.str_attr("version")
    }

    pub fn full_version(&self) -> Option<&str> {
        self.str_attr("fullVersion")
    }

    pub fn maintenance_mode(&self) -> Option<bool> {
        self.bool_attr("maintenanceMode")
    }

    pub fn entity_status(&self) -> Option<&str> {
        self.str_attr("entityStatus")
    }

    /// `clusters/<name>` under the root this cluster was loaded from.
    pub fn resource(&self) -> Result<Resource, Error> {
        let root = ApiRoot::of(self)?;
        Ok(root.at(&format!("clusters/{}", self.require_str("name")?)))
    }

    async fn cmd(&self, name: &str) -> Result<ApiCommand, Error> {
        debug!(cluster = self.name(), command = name, "cluster command");
        command::command(&self.resource()?, name).one().await
    }

    /// Reload this cluster in place.
    pub async fn refresh(&mut self) -> Result<(), Error> {
        let fresh: ApiCluster = Call::get(&self.resource()?, "").one().await?;
        self.update_from(&fresh)
    }

    /// Write back the read-write attributes; the reply refreshes `self`.
    pub async fn update(&mut self) -> Result<(), Error> {
        let fresh: ApiCluster = Call::put(&self.resource()?, "")
            .object(&*self)
            .one()
            .await?;
        self.update_from(&fresh)
    }

    /// Rename the cluster. API v6 and later change the display name; the
    /// internal name is immutable there.
    pub async fn rename(&mut self, new_name: &str) -> Result<(), Error> {
        let resource = self.resource()?;
        let field = if resource.version() < 6 {
            "name"
        } else {
            "displayName"
        };
        let mut body = self.entity().clone();
        body.set(field, new_name)?;
        let fresh: ApiCluster = Call::put(&resource, "")
            .json(body.to_json_with(&SerializeOptions::for_version(resource.version())))
            .one()
            .await?;
        self.update_from(&fresh)
    }

    /// Service types supported by this cluster's CDH version.
    ///
    /// `GET /clusters/{name}/serviceTypes`
    pub async fn get_service_types(&self) -> Result<Vec<String>, Error> {
        let json = Call::get(&self.resource()?, "serviceTypes").send().await?;
        Ok(list_items(&json)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Commands currently running on this cluster.
    pub async fn get_commands(&self, view: Option<View>) -> Result<Vec<ApiCommand>, Error> {
        command::active_commands(&self.resource()?)
            .view(view)
            .list()
            .await
    }

    pub async fn start(&self) -> Result<ApiCommand, Error> {
        self.cmd("start").await
    }

    pub async fn stop(&self) -> Result<ApiCommand, Error> {
        self.cmd("stop").await
    }

    pub async fn restart(&self) -> Result<ApiCommand, Error> {
        self.cmd("restart").await
    }

    /// Restart with options (v6): only services with stale configuration,
    /// optionally redeploying client configuration first.
    pub async fn restart_with(
        &self,
        restart_only_stale: bool,
        redeploy_client_config: bool,
    ) -> Result<ApiCommand, Error> {
        command::command(&self.resource()?, "restart")
            .since(6, "restart_with")
            .json(json!({
                "restartOnlyStaleServices": restart_only_stale,
                "redeployClientConfiguration": redeploy_client_config,
            }))
            .one()
            .await
    }

    /// Deploy client configuration for every service in the cluster.
    pub async fn deploy_client_config(&self) -> Result<ApiCommand, Error> {
        self.cmd("deployClientConfig").await
    }

    /// Prepare and start all services of a freshly created cluster (v7).
    pub async fn first_run(&self) -> Result<ApiCommand, Error> {
        command::command(&self.resource()?, "firstRun")
            .since(7, "first_run")
            .one()
            .await
    }

    /// Put the cluster into maintenance mode (v2). On success the cluster
    /// is reloaded so `maintenance_mode` reflects the change.
    pub async fn enter_maintenance_mode(&mut self) -> Result<ApiCommand, Error> {
        self.maintenance_command("enterMaintenanceMode", "enter_maintenance_mode")
            .await
    }

    pub async fn exit_maintenance_mode(&mut self) -> Result<ApiCommand, Error> {
        self.maintenance_command("exitMaintenanceMode", "exit_maintenance_mode")
            .await
    }

    async fn maintenance_command(
        &mut self,
        name: &str,
        operation: &str,
    ) -> Result<ApiCommand, Error> {
        let cmd: ApiCommand = command::command(&self.resource()?, name)
            .since(2, operation)
            .one()
            .await?;
        if cmd.success() == Some(true) {
            self.refresh().await?;
        }
        Ok(cmd)
    }

    /// Hosts that belong to this cluster (v3).
    pub async fn list_hosts(&self) -> Result<Vec<ApiHostRef>, Error> {
        Call::get(&self.resource()?, "hosts")
            .since(3, "list_hosts")
            .list()
            .await
    }

    /// Add hosts by id (v3); returns the hosts added.
    pub async fn add_hosts(&self, host_ids: &[&str]) -> Result<Vec<ApiHostRef>, Error> {
        let refs: Vec<ApiHostRef> = host_ids.iter().map(|id| ApiHostRef::new(id)).collect();
        Call::post(&self.resource()?, "hosts")
            .since(3, "add_hosts")
            .objects(&refs)
            .list()
            .await
    }

    /// Remove one host from the cluster (v3).
    pub async fn remove_host(&self, host_id: &str) -> Result<ApiHostRef, Error> {
        Call::delete(&self.resource()?, format!("hosts/{host_id}"))
            .since(3, "remove_host")
            .one()
            .await
    }

    /// Remove every host from the cluster (v3).
    pub async fn remove_all_hosts(&self) -> Result<Vec<ApiHostRef>, Error> {
        Call::delete(&self.resource()?, "hosts")
            .since(3, "remove_all_hosts")
            .list()
            .await
    }

    /// Assign roles to hosts automatically (v10).
    pub async fn auto_assign_roles(&self) -> Result<(), Error> {
        Call::put(&self.resource()?, "autoAssignRoles")
            .since(10, "auto_assign_roles")
            .unit()
            .await
    }

    /// Apply recommended configuration values (v10).
    pub async fn auto_configure(&self) -> Result<(), Error> {
        Call::put(&self.resource()?, "autoConfigure")
            .since(10, "auto_configure")
            .unit()
            .await
    }
}

impl ApiRoot {
    /// `POST /clusters`
    pub async fn create_cluster(
        &self,
        name: &str,
        version: &str,
        full_version: Option<&str>,
    ) -> Result<ApiCluster, Error> {
        let mut cluster = ApiCluster::new(name, version);
        if let Some(full) = full_version {
            cluster.set("fullVersion", full)?;
        }
        debug!(name, version, "creating cluster");
        Call::post(self.resource(), "clusters")
            .objects(&[cluster])
            .first()
            .await
    }

    /// `GET /clusters/{name}`
    pub async fn get_cluster(&self, name: &str) -> Result<ApiCluster, Error> {
        Call::get(self.resource(), format!("clusters/{name}"))
            .one()
            .await
    }

    /// `GET /clusters`
    pub async fn get_all_clusters(&self, view: Option<View>) -> Result<Vec<ApiCluster>, Error> {
        Call::get(self.resource(), "clusters")
            .view(view)
            .list()
            .await
    }

    /// `DELETE /clusters/{name}`; returns the deleted cluster.
    pub async fn delete_cluster(&self, name: &str) -> Result<ApiCluster, Error> {
        debug!(name, "deleting cluster");
        Call::delete(self.resource(), format!("clusters/{name}"))
            .one()
            .await
    }

    /// `GET /clusters/{name}/hosts` (v3)
    pub async fn get_cluster_hosts(&self, name: &str) -> Result<Vec<ApiHostRef>, Error> {
        Call::get(self.resource(), format!("clusters/{name}/hosts"))
            .since(3, "get_cluster_hosts")
            .list()
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn maintenance_mode_is_read_only() {
        let mut cluster =
            ApiCluster::from_json(None, &json!({"name": "c1", "maintenanceMode": false})).unwrap();
        assert!(matches!(
            cluster.set("maintenanceMode", true),
            Err(Error::ReadOnlyAttribute { .. })
        ));
    }

    #[test]
    fn new_cluster_write_form() {
        assert_eq!(
            ApiCluster::new("c1", "CDH5").to_json(),
            json!({"name": "c1", "version": "CDH5"})
        );
    }
}
