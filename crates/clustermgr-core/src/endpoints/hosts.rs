// Host endpoints: `/hosts/{hostId}` and its config.

use clustermgr_api::{Error, Resource};
use tracing::debug;

use crate::api_object;
use crate::call::{Call, View};
use crate::command::{self, ApiCommand};
use crate::config::{self, ConfigMap, FullConfigMap};
use crate::endpoints::types::{ApiHealthCheck, ApiRoleRef, HEALTH_CHECK};
use crate::entity::{ApiObject, Entity};
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

pub static HOST: Schema = Schema {
    name: "ApiHost",
    attrs: &[
        Attr::rw("hostId", Kind::String),
        Attr::rw("ipAddress", Kind::String),
        Attr::rw("hostname", Kind::String),
        Attr::rw("rackId", Kind::String),
        Attr::ro("lastHeartbeat", Kind::DateTime),
        Attr::ro("roleRefs", Kind::Ref).bare_list(),
        Attr::ro("healthSummary", Kind::String),
        Attr::ro("healthChecks", Kind::Entity(&HEALTH_CHECK)).bare_list(),
        Attr::ro("hostUrl", Kind::String),
        Attr::ro("commissionState", Kind::String),
        Attr::ro("maintenanceMode", Kind::Bool),
        Attr::ro("maintenanceOwners", Kind::String).bare_list(),
        Attr::ro("numCores", Kind::Int),
        Attr::ro("totalPhysMemBytes", Kind::Int),
        Attr::ro("clusterRef", Kind::Ref).since(3),
        Attr::ro("entityStatus", Kind::String).since(11),
    ],
};

api_object! {
    /// A managed host.
    pub struct ApiHost => HOST;
}

impl ApiHost {
    pub fn new(host_id: &str, hostname: &str, ip_address: &str, rack_id: Option<&str>) -> Self {
        Self(
            Entity::new(&HOST)
                .fill("hostId", host_id)
                .fill("hostname", hostname)
                .fill("ipAddress", ip_address)
                .fill("rackId", rack_id),
        )
    }

    pub fn host_id(&self) -> Option<&str> {
        self.str_attr("hostId")
    }

    pub fn hostname(&self) -> Option<&str> {
        self.str_attr("hostname")
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.str_attr("ipAddress")
    }

    pub fn rack_id(&self) -> Option<&str> {
        self.str_attr("rackId")
    }

    pub fn health_summary(&self) -> Option<&str> {
        self.str_attr("healthSummary")
    }

    pub fn health_checks(&self) -> Vec<ApiHealthCheck> {
        self.objects("healthChecks")
    }

    pub fn role_refs(&self) -> Vec<ApiRoleRef> {
        self.objects("roleRefs")
    }

    pub fn maintenance_mode(&self) -> Option<bool> {
        self.bool_attr("maintenanceMode")
    }

    pub fn resource(&self) -> Result<Resource, Error> {
        let root = ApiRoot::of(self)?;
        Ok(root.at(&format!("hosts/{}", self.require_str("hostId")?)))
    }

    pub async fn refresh(&mut self) -> Result<(), Error> {
        let fresh: ApiHost = Call::get(&self.resource()?, "").one().await?;
        self.update_from(&fresh)
    }

    /// Write back the read-write attributes.
    pub async fn update(&mut self) -> Result<(), Error> {
        let fresh: ApiHost = Call::put(&self.resource()?, "")
            .object(&*self)
            .one()
            .await?;
        self.update_from(&fresh)
    }

    pub async fn set_rack_id(&mut self, rack_id: &str) -> Result<(), Error> {
        self.set("rackId", rack_id)?;
        self.update().await
    }

    /// `GET /hosts/{hostId}/config`
    pub async fn get_config(&self) -> Result<ConfigMap, Error> {
        config::get_summary(&self.resource()?, "config").await
    }

    pub async fn get_full_config(&self) -> Result<FullConfigMap, Error> {
        config::get_full(&self.resource()?, "config").await
    }

    /// `PUT /hosts/{hostId}/config`
    pub async fn update_config(&self, config: &ConfigMap) -> Result<ConfigMap, Error> {
        config::put_summary(&self.resource()?, "config", config).await
    }

    pub async fn get_commands(&self, view: Option<View>) -> Result<Vec<ApiCommand>, Error> {
        command::active_commands(&self.resource()?)
            .view(view)
            .list()
            .await
    }

    /// (v2) Reloads the host on success.
    pub async fn enter_maintenance_mode(&mut self) -> Result<ApiCommand, Error> {
        self.maintenance_command("enterMaintenanceMode", "enter_maintenance_mode")
            .await
    }

    /// (v2) Reloads the host on success.
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
}

impl ApiRoot {
    /// `POST /hosts`
    pub async fn create_host(
        &self,
        host_id: &str,
        hostname: &str,
        ip_address: &str,
        rack_id: Option<&str>,
    ) -> Result<ApiHost, Error> {
        debug!(host_id, hostname, "creating host");
        let host = ApiHost::new(host_id, hostname, ip_address, rack_id);
        Call::post(self.resource(), "hosts")
            .objects(&[host])
            .first()
            .await
    }

    /// `GET /hosts/{hostId}`
    pub async fn get_host(&self, host_id: &str) -> Result<ApiHost, Error> {
        Call::get(self.resource(), format!("hosts/{host_id}"))
            .one()
            .await
    }

    /// `GET /hosts`
    pub async fn get_all_hosts(&self, view: Option<View>) -> Result<Vec<ApiHost>, Error> {
        Call::get(self.resource(), "hosts").view(view).list().await
    }

    /// `DELETE /hosts/{hostId}`
    pub async fn delete_host(&self, host_id: &str) -> Result<ApiHost, Error> {
        debug!(host_id, "deleting host");
        Call::delete(self.resource(), format!("hosts/{host_id}"))
            .one()
            .await
    }
}
