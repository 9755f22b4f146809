// Service endpoints: `/clusters/{cluster}/services/{service}`.
//
// Service config carries a second level: per-role-type defaults under
// `roleTypeConfigs`, each its own `{"roleType", "items"}` envelope.

use std::collections::BTreeMap;

use clustermgr_api::{Error, Resource};
use serde_json::json;
use tracing::debug;

use crate::api_object;
use crate::call::{Call, View};
use crate::command::{self, ApiBulkCommandList, ApiCommand};
use crate::config::{
    ConfigMap, FullConfigMap, config_to_api_list, json_to_config, json_to_full_config,
};
use crate::endpoints::clusters::ApiCluster;
use crate::endpoints::types::{ApiHealthCheck, HEALTH_CHECK};
use crate::entity::{ApiObject, Entity, list_items};
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

pub static SERVICE: Schema = Schema {
    name: "ApiService",
    attrs: &[
        Attr::rw("name", Kind::String),
        Attr::rw("type", Kind::String),
        Attr::rw("displayName", Kind::String).since(2),
        Attr::ro("clusterRef", Kind::Ref),
        Attr::ro("serviceState", Kind::String),
        Attr::ro("healthSummary", Kind::String),
        Attr::ro("healthChecks", Kind::Entity(&HEALTH_CHECK)).bare_list(),
        Attr::ro("configStale", Kind::Bool),
        Attr::ro("configStalenessStatus", Kind::String).since(6),
        Attr::ro("clientConfigStalenessStatus", Kind::String).since(6),
        Attr::ro("serviceUrl", Kind::String),
        Attr::ro("roleInstancesUrl", Kind::String).since(11),
        Attr::ro("maintenanceMode", Kind::Bool),
        Attr::ro("maintenanceOwners", Kind::String).bare_list(),
        Attr::ro("entityStatus", Kind::String).since(11),
    ],
};

api_object! {
    /// A service (HDFS, YARN, ...) in a cluster.
    pub struct ApiService => SERVICE;
}

/// Per-role-type config maps keyed by role type.
pub type RoleTypeConfigs<T> = BTreeMap<String, T>;

fn services_path(cluster: &str) -> String {
    format!("clusters/{cluster}/services")
}

impl ApiService {
    pub fn new(name: &str, service_type: &str) -> Self {
        Self(
            Entity::new(&SERVICE)
                .fill("name", name)
                .fill("type", service_type),
        )
    }

    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    pub fn service_type(&self) -> Option<&str> {
        self.str_attr("type")
    }

    pub fn service_state(&self) -> Option<&str> {
        self.str_attr("serviceState")
    }

    pub fn health_summary(&self) -> Option<&str> {
        self.str_attr("healthSummary")
    }

    pub fn health_checks(&self) -> Vec<ApiHealthCheck> {
        self.objects("healthChecks")
    }

    pub fn config_stale(&self) -> Option<bool> {
        self.bool_attr("configStale")
    }

    /// Name of the owning cluster, from `clusterRef`.
    pub fn cluster_name(&self) -> Option<&str> {
        self.value("clusterRef")
            .as_entity()
            .and_then(|r| r.str_attr("clusterName"))
    }

    pub fn resource(&self) -> Result<Resource, Error> {
        let root = ApiRoot::of(self)?;
        let cluster = self.cluster_name().ok_or_else(|| Error::InvalidConfig {
            message: "ApiService has no clusterRef".into(),
        })?;
        Ok(root.at(&format!(
            "{}/{}",
            services_path(cluster),
            self.require_str("name")?
        )))
    }

    pub async fn refresh(&mut self) -> Result<(), Error> {
        let fresh: ApiService = Call::get(&self.resource()?, "").one().await?;
        self.update_from(&fresh)
    }

    /// Write back the read-write attributes.
    pub async fn update(&mut self) -> Result<(), Error> {
        let fresh: ApiService = Call::put(&self.resource()?, "")
            .object(&*self)
            .one()
            .await?;
        self.update_from(&fresh)
    }

    // ── Config ───────────────────────────────────────────────────────

    /// Service config and per-role-type defaults, summary view.
    ///
    /// `GET .../services/{name}/config`
    pub async fn get_config(&self) -> Result<(ConfigMap, RoleTypeConfigs<ConfigMap>), Error> {
        let json = Call::get(&self.resource()?, "config").send().await?;
        let role_types: RoleTypeConfigs<ConfigMap> = role_type_entries(&json)
            .map(|(rt, entry)| json_to_config(entry).map(|cfg| (rt, cfg)))
            .collect::<Result<_, Error>>()?;
        Ok((json_to_config(&json)?, role_types))
    }

    /// Same as [`get_config`](Self::get_config) with full metadata.
    pub async fn get_full_config(
        &self,
    ) -> Result<(FullConfigMap, RoleTypeConfigs<FullConfigMap>), Error> {
        let resource = self.resource()?;
        let client = resource.client().clone();
        let json = Call::get(&resource, "config")
            .view(Some(View::Full))
            .send()
            .await?;
        let role_types: RoleTypeConfigs<FullConfigMap> = role_type_entries(&json)
            .map(|(rt, entry)| json_to_full_config(entry, Some(&client)).map(|cfg| (rt, cfg)))
            .collect::<Result<_, Error>>()?;
        Ok((json_to_full_config(&json, Some(&client))?, role_types))
    }

    /// Update service config and, optionally, per-role-type defaults.
    ///
    /// `PUT .../services/{name}/config`
    pub async fn update_config(
        &self,
        service: &ConfigMap,
        role_types: &RoleTypeConfigs<ConfigMap>,
    ) -> Result<(ConfigMap, RoleTypeConfigs<ConfigMap>), Error> {
        let mut body = config_to_api_list(service);
        if !role_types.is_empty() {
            let rt: Vec<_> = role_types
                .iter()
                .map(|(role_type, cfg)| {
                    let mut entry = config_to_api_list(cfg);
                    entry["roleType"] = json!(role_type);
                    entry
                })
                .collect();
            body["roleTypeConfigs"] = json!(rt);
        }
        let json = Call::put(&self.resource()?, "config")
            .json(body)
            .send()
            .await?;
        let role_types: RoleTypeConfigs<ConfigMap> = role_type_entries(&json)
            .map(|(rt, entry)| json_to_config(entry).map(|cfg| (rt, cfg)))
            .collect::<Result<_, Error>>()?;
        Ok((json_to_config(&json)?, role_types))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Issue a service command by name, e.g. `"hdfsFormat"` style actions.
    pub async fn service_command_by_name(&self, name: &str) -> Result<ApiCommand, Error> {
        debug!(service = self.name(), command = name, "service command");
        command::command(&self.resource()?, name).one().await
    }

    pub async fn start(&self) -> Result<ApiCommand, Error> {
        self.service_command_by_name("start").await
    }

    pub async fn stop(&self) -> Result<ApiCommand, Error> {
        self.service_command_by_name("stop").await
    }

    pub async fn restart(&self) -> Result<ApiCommand, Error> {
        self.service_command_by_name("restart").await
    }

    /// Deploy client configuration for the given roles.
    pub async fn deploy_client_config(&self, role_names: &[&str]) -> Result<ApiCommand, Error> {
        command::command(&self.resource()?, "deployClientConfig")
            .json(json!({ "items": role_names }))
            .one()
            .await
    }

    pub async fn get_commands(&self, view: Option<View>) -> Result<Vec<ApiCommand>, Error> {
        command::active_commands(&self.resource()?)
            .view(view)
            .list()
            .await
    }

    /// Bulk role command by name.
    ///
    /// `POST .../services/{name}/roleCommands/{command}`
    pub async fn role_command_by_name(
        &self,
        name: &str,
        role_names: &[&str],
    ) -> Result<ApiBulkCommandList, Error> {
        debug!(service = self.name(), command = name, roles = role_names.len(), "role command");
        command::role_command(&self.resource()?, name, role_names)
            .one()
            .await
    }

    pub async fn start_roles(&self, role_names: &[&str]) -> Result<ApiBulkCommandList, Error> {
        self.role_command_by_name("start", role_names).await
    }

    pub async fn stop_roles(&self, role_names: &[&str]) -> Result<ApiBulkCommandList, Error> {
        self.role_command_by_name("stop", role_names).await
    }

    pub async fn restart_roles(&self, role_names: &[&str]) -> Result<ApiBulkCommandList, Error> {
        self.role_command_by_name("restart", role_names).await
    }
}

/// `(roleType, envelope)` pairs under `roleTypeConfigs`.
fn role_type_entries(
    json: &serde_json::Value,
) -> impl Iterator<Item = (String, &serde_json::Value)> {
    json.get("roleTypeConfigs")
        .and_then(list_items)
        .into_iter()
        .flatten()
        .filter_map(|entry| {
            entry
                .get("roleType")
                .and_then(serde_json::Value::as_str)
                .map(|rt| (rt.to_owned(), entry))
        })
}

impl ApiRoot {
    /// `POST /clusters/{cluster}/services`
    pub async fn create_service(
        &self,
        cluster: &str,
        name: &str,
        service_type: &str,
    ) -> Result<ApiService, Error> {
        debug!(cluster, name, service_type, "creating service");
        Call::post(self.resource(), services_path(cluster))
            .objects(&[ApiService::new(name, service_type)])
            .first()
            .await
    }

    /// `GET /clusters/{cluster}/services/{name}`
    pub async fn get_service(&self, cluster: &str, name: &str) -> Result<ApiService, Error> {
        Call::get(self.resource(), format!("{}/{name}", services_path(cluster)))
            .one()
            .await
    }

    /// `GET /clusters/{cluster}/services`
    pub async fn get_all_services(
        &self,
        cluster: &str,
        view: Option<View>,
    ) -> Result<Vec<ApiService>, Error> {
        Call::get(self.resource(), services_path(cluster))
            .view(view)
            .list()
            .await
    }

    /// `DELETE /clusters/{cluster}/services/{name}`
    pub async fn delete_service(&self, cluster: &str, name: &str) -> Result<ApiService, Error> {
        debug!(cluster, name, "deleting service");
        Call::delete(self.resource(), format!("{}/{name}", services_path(cluster)))
            .one()
            .await
    }
}

impl ApiCluster {
    pub async fn create_service(&self, name: &str, service_type: &str) -> Result<ApiService, Error> {
        ApiRoot::of(self)?
            .create_service(self.require_str("name")?, name, service_type)
            .await
    }

    pub async fn get_service(&self, name: &str) -> Result<ApiService, Error> {
        ApiRoot::of(self)?
            .get_service(self.require_str("name")?, name)
            .await
    }

    pub async fn get_all_services(&self, view: Option<View>) -> Result<Vec<ApiService>, Error> {
        ApiRoot::of(self)?
            .get_all_services(self.require_str("name")?, view)
            .await
    }

    pub async fn delete_service(&self, name: &str) -> Result<ApiService, Error> {
        ApiRoot::of(self)?
            .delete_service(self.require_str("name")?, name)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn role_type_configs_are_split_out() {
        let json = json!({
            "items": [{"name": "dfs_replication", "value": "2"}],
            "roleTypeConfigs": [
                {"roleType": "DATANODE", "items": [{"name": "dfs_data_dir_list", "value": "/data"}]}
            ]
        });
        let rt: Vec<_> = role_type_entries(&json).collect();
        assert_eq!(rt.len(), 1);
        assert_eq!(rt[0].0, "DATANODE");
        let dn = json_to_config(rt[0].1).unwrap();
        assert_eq!(dn["dfs_data_dir_list"].as_deref(), Some("/data"));
    }

    #[test]
    fn cluster_name_comes_from_reference() {
        let svc = ApiService::from_json(
            None,
            &json!({"name": "hdfs", "type": "HDFS", "clusterRef": {"clusterName": "c1"}}),
        )
        .unwrap();
        assert_eq!(svc.cluster_name(), Some("c1"));
        assert!(matches!(svc.resource(), Err(Error::Detached { .. })));
    }
}
