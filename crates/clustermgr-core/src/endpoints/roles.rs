// Role endpoints: `/clusters/{cluster}/services/{service}/roles/{role}`.

use clustermgr_api::{Error, Resource};
use tracing::debug;

use crate::api_object;
use crate::call::{Call, View};
use crate::command::{self, ApiCommand};
use crate::config::{self, ConfigMap, FullConfigMap};
use crate::endpoints::services::ApiService;
use crate::endpoints::types::{ApiHealthCheck, ApiHostRef, HEALTH_CHECK};
use crate::entity::{ApiObject, Entity};
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

pub static ROLE: Schema = Schema {
    name: "ApiRole",
    attrs: &[
        Attr::rw("name", Kind::String),
        Attr::rw("type", Kind::String),
        Attr::rw("hostRef", Kind::Ref),
        Attr::ro("serviceRef", Kind::Ref),
        Attr::ro("roleState", Kind::String),
        Attr::ro("healthSummary", Kind::String),
        Attr::ro("healthChecks", Kind::Entity(&HEALTH_CHECK)).bare_list(),
        Attr::ro("configStale", Kind::Bool),
        Attr::ro("configStalenessStatus", Kind::String).since(6),
        Attr::ro("haStatus", Kind::String),
        Attr::ro("roleUrl", Kind::String),
        Attr::ro("maintenanceMode", Kind::Bool),
        Attr::ro("maintenanceOwners", Kind::String).bare_list(),
        Attr::ro("commissionState", Kind::String),
        Attr::ro("roleConfigGroupRef", Kind::Ref).since(3),
        Attr::ro("zooKeeperServerMode", Kind::String).since(6),
        Attr::ro("entityStatus", Kind::String).since(11),
    ],
};

api_object! {
    /// A role instance of a service on one host.
    pub struct ApiRole => ROLE;
}

pub(crate) fn roles_path(cluster: &str, service: &str) -> String {
    format!("clusters/{cluster}/services/{service}/roles")
}

impl ApiRole {
    pub fn new(name: &str, role_type: &str, host_id: &str) -> Self {
        Self(
            Entity::new(&ROLE)
                .fill("name", name)
                .fill("type", role_type)
                .fill("hostRef", ApiHostRef::new(host_id)),
        )
    }

    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    pub fn role_type(&self) -> Option<&str> {
        self.str_attr("type")
    }

    pub fn role_state(&self) -> Option<&str> {
        self.str_attr("roleState")
    }

    pub fn health_summary(&self) -> Option<&str> {
        self.str_attr("healthSummary")
    }

    pub fn health_checks(&self) -> Vec<ApiHealthCheck> {
        self.objects("healthChecks")
    }

    pub fn host_id(&self) -> Option<&str> {
        self.value("hostRef")
            .as_entity()
            .and_then(|r| r.str_attr("hostId"))
    }

    /// `(cluster, service)` from `serviceRef`.
    pub fn service_names(&self) -> Option<(&str, &str)> {
        let service = self.value("serviceRef").as_entity()?;
        Some((
            service.str_attr("clusterName")?,
            service.str_attr("serviceName")?,
        ))
    }

    pub fn role_config_group_name(&self) -> Option<&str> {
        self.value("roleConfigGroupRef")
            .as_entity()
            .and_then(|r| r.str_attr("roleConfigGroupName"))
    }

    pub fn resource(&self) -> Result<Resource, Error> {
        let root = ApiRoot::of(self)?;
        let (cluster, service) = self.service_names().ok_or_else(|| Error::InvalidConfig {
            message: "ApiRole has no serviceRef".into(),
        })?;
        Ok(root.at(&format!(
            "{}/{}",
            roles_path(cluster, service),
            self.require_str("name")?
        )))
    }

    pub async fn refresh(&mut self) -> Result<(), Error> {
        let fresh: ApiRole = Call::get(&self.resource()?, "").one().await?;
        self.update_from(&fresh)
    }

    /// `GET .../roles/{name}/config`
    pub async fn get_config(&self) -> Result<ConfigMap, Error> {
        config::get_summary(&self.resource()?, "config").await
    }

    pub async fn get_full_config(&self) -> Result<FullConfigMap, Error> {
        config::get_full(&self.resource()?, "config").await
    }

    /// `PUT .../roles/{name}/config`
    pub async fn update_config(&self, config: &ConfigMap) -> Result<ConfigMap, Error> {
        config::put_summary(&self.resource()?, "config", config).await
    }

    pub async fn get_commands(&self, view: Option<View>) -> Result<Vec<ApiCommand>, Error> {
        command::active_commands(&self.resource()?)
            .view(view)
            .list()
            .await
    }

    /// (v2) Reloads the role on success.
    pub async fn enter_maintenance_mode(&mut self) -> Result<ApiCommand, Error> {
        self.maintenance_command("enterMaintenanceMode", "enter_maintenance_mode")
            .await
    }

    /// (v2) Reloads the role on success.
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

    // ── Logs ─────────────────────────────────────────────────────────

    /// Full role log as plain text.
    pub async fn get_full_log(&self) -> Result<String, Error> {
        Call::get(&self.resource()?, "logs/full").text().await
    }

    pub async fn get_stdout(&self) -> Result<String, Error> {
        Call::get(&self.resource()?, "logs/stdout").text().await
    }

    pub async fn get_stderr(&self) -> Result<String, Error> {
        Call::get(&self.resource()?, "logs/stderr").text().await
    }
}

impl ApiService {
    fn roles_resource(&self) -> Result<(ApiRoot, String), Error> {
        let root = ApiRoot::of(self)?;
        let cluster = self.cluster_name().ok_or_else(|| Error::InvalidConfig {
            message: "ApiService has no clusterRef".into(),
        })?;
        let path = roles_path(cluster, self.require_str("name")?);
        Ok((root, path))
    }

    /// `POST .../services/{name}/roles`
    pub async fn create_role(
        &self,
        name: &str,
        role_type: &str,
        host_id: &str,
    ) -> Result<ApiRole, Error> {
        let (root, path) = self.roles_resource()?;
        debug!(name, role_type, host_id, "creating role");
        Call::post(root.resource(), path)
            .objects(&[ApiRole::new(name, role_type, host_id)])
            .first()
            .await
    }

    pub async fn get_role(&self, name: &str) -> Result<ApiRole, Error> {
        let (root, path) = self.roles_resource()?;
        Call::get(root.resource(), format!("{path}/{name}"))
            .one()
            .await
    }

    pub async fn get_all_roles(&self, view: Option<View>) -> Result<Vec<ApiRole>, Error> {
        let (root, path) = self.roles_resource()?;
        Call::get(root.resource(), path).view(view).list().await
    }

    /// Roles of one type, filtered client-side.
    pub async fn get_roles_by_type(
        &self,
        role_type: &str,
        view: Option<View>,
    ) -> Result<Vec<ApiRole>, Error> {
        let roles = self.get_all_roles(view).await?;
        Ok(roles
            .into_iter()
            .filter(|r| r.role_type() == Some(role_type))
            .collect())
    }

    pub async fn delete_role(&self, name: &str) -> Result<ApiRole, Error> {
        let (root, path) = self.roles_resource()?;
        debug!(name, "deleting role");
        Call::delete(root.resource(), format!("{path}/{name}"))
            .one()
            .await
    }
}
