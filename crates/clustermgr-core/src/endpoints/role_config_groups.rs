// Role config group endpoints (API v3):
// `/clusters/{cluster}/services/{service}/roleConfigGroups/{group}`.

use clustermgr_api::{Error, Resource};
use serde_json::json;
use tracing::debug;

use crate::api_object;
use crate::call::Call;
use crate::config::{self, ApiConfig, CONFIG, ConfigMap, FullConfigMap};
use crate::endpoints::roles::ApiRole;
use crate::entity::{ApiObject, Entity};
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

const MIN_VERSION: u32 = 3;

pub static ROLE_CONFIG_GROUP: Schema = Schema {
    name: "ApiRoleConfigGroup",
    attrs: &[
        Attr::rw("name", Kind::String),
        Attr::rw("displayName", Kind::String),
        Attr::rw("roleType", Kind::String),
        Attr::ro("base", Kind::Bool),
        Attr::ro("serviceRef", Kind::Ref),
        Attr::rw("config", Kind::Entity(&CONFIG)).list(),
    ],
};

api_object! {
    /// Configuration shared by a set of roles of one type.
    pub struct ApiRoleConfigGroup => ROLE_CONFIG_GROUP;
}

fn groups_path(cluster: &str, service: &str) -> String {
    format!("clusters/{cluster}/services/{service}/roleConfigGroups")
}

impl ApiRoleConfigGroup {
    pub fn new(name: &str, display_name: &str, role_type: &str) -> Self {
        Self(
            Entity::new(&ROLE_CONFIG_GROUP)
                .fill("name", name)
                .fill("displayName", display_name)
                .fill("roleType", role_type),
        )
    }

    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    pub fn display_name(&self) -> Option<&str> {
        self.str_attr("displayName")
    }

    pub fn role_type(&self) -> Option<&str> {
        self.str_attr("roleType")
    }

    pub fn is_base(&self) -> bool {
        self.bool_attr("base").unwrap_or(false)
    }

    /// Inline config, present when the group was read in full view.
    pub fn config(&self) -> Vec<ApiConfig> {
        self.objects("config")
    }

    pub fn service_names(&self) -> Option<(&str, &str)> {
        let service = self.value("serviceRef").as_entity()?;
        Some((
            service.str_attr("clusterName")?,
            service.str_attr("serviceName")?,
        ))
    }

    pub fn resource(&self) -> Result<Resource, Error> {
        let root = ApiRoot::of(self)?;
        let (cluster, service) = self.service_names().ok_or_else(|| Error::InvalidConfig {
            message: "ApiRoleConfigGroup has no serviceRef".into(),
        })?;
        Ok(root.at(&format!(
            "{}/{}",
            groups_path(cluster, service),
            self.require_str("name")?
        )))
    }

    /// Write back the read-write attributes (v3).
    pub async fn update(&mut self) -> Result<(), Error> {
        let fresh: ApiRoleConfigGroup = Call::put(&self.resource()?, "")
            .since(MIN_VERSION, "update_role_config_group")
            .object(&*self)
            .one()
            .await?;
        self.update_from(&fresh)
    }

    pub async fn get_config(&self) -> Result<ConfigMap, Error> {
        let resource = self.resource()?;
        crate::version::require(resource.client(), MIN_VERSION, "get_config")?;
        config::get_summary(&resource, "config").await
    }

    pub async fn get_full_config(&self) -> Result<FullConfigMap, Error> {
        let resource = self.resource()?;
        crate::version::require(resource.client(), MIN_VERSION, "get_full_config")?;
        config::get_full(&resource, "config").await
    }

    pub async fn update_config(&self, config: &ConfigMap) -> Result<ConfigMap, Error> {
        let resource = self.resource()?;
        crate::version::require(resource.client(), MIN_VERSION, "update_config")?;
        config::put_summary(&resource, "config", config).await
    }

    /// Roles currently in this group.
    pub async fn get_all_roles(&self) -> Result<Vec<ApiRole>, Error> {
        Call::get(&self.resource()?, "roles")
            .since(MIN_VERSION, "get_all_roles")
            .list()
            .await
    }

    /// Move roles into this group; returns the moved roles.
    pub async fn move_roles(&self, role_names: &[&str]) -> Result<Vec<ApiRole>, Error> {
        debug!(group = self.name(), roles = role_names.len(), "moving roles");
        Call::put(&self.resource()?, "roles")
            .since(MIN_VERSION, "move_roles")
            .json(json!({ "items": role_names }))
            .list()
            .await
    }
}

impl ApiRoot {
    /// `POST .../roleConfigGroups`
    pub async fn create_role_config_groups(
        &self,
        cluster: &str,
        service: &str,
        groups: &[ApiRoleConfigGroup],
    ) -> Result<Vec<ApiRoleConfigGroup>, Error> {
        Call::post(self.resource(), groups_path(cluster, service))
            .since(MIN_VERSION, "create_role_config_groups")
            .objects(groups)
            .list()
            .await
    }

    pub async fn create_role_config_group(
        &self,
        cluster: &str,
        service: &str,
        name: &str,
        display_name: &str,
        role_type: &str,
    ) -> Result<ApiRoleConfigGroup, Error> {
        Call::post(self.resource(), groups_path(cluster, service))
            .since(MIN_VERSION, "create_role_config_group")
            .objects(&[ApiRoleConfigGroup::new(name, display_name, role_type)])
            .first()
            .await
    }

    pub async fn get_role_config_group(
        &self,
        cluster: &str,
        service: &str,
        name: &str,
    ) -> Result<ApiRoleConfigGroup, Error> {
        Call::get(self.resource(), format!("{}/{name}", groups_path(cluster, service)))
            .since(MIN_VERSION, "get_role_config_group")
            .one()
            .await
    }

    pub async fn get_all_role_config_groups(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Vec<ApiRoleConfigGroup>, Error> {
        Call::get(self.resource(), groups_path(cluster, service))
            .since(MIN_VERSION, "get_all_role_config_groups")
            .list()
            .await
    }

    /// `PUT .../roleConfigGroups/{name}`
    pub async fn update_role_config_group(
        &self,
        cluster: &str,
        service: &str,
        name: &str,
        group: &ApiRoleConfigGroup,
    ) -> Result<ApiRoleConfigGroup, Error> {
        Call::put(self.resource(), format!("{}/{name}", groups_path(cluster, service)))
            .since(MIN_VERSION, "update_role_config_group")
            .object(group)
            .one()
            .await
    }

    pub async fn delete_role_config_group(
        &self,
        cluster: &str,
        service: &str,
        name: &str,
    ) -> Result<ApiRoleConfigGroup, Error> {
        debug!(cluster, service, name, "deleting role config group");
        Call::delete(self.resource(), format!("{}/{name}", groups_path(cluster, service)))
            .since(MIN_VERSION, "delete_role_config_group")
            .one()
            .await
    }

    /// Move roles back to the base group of their role type.
    ///
    /// `PUT .../roleConfigGroups/roles`
    pub async fn move_roles_to_base_group(
        &self,
        cluster: &str,
        service: &str,
        role_names: &[&str],
    ) -> Result<Vec<ApiRole>, Error> {
        Call::put(self.resource(), format!("{}/roles", groups_path(cluster, service)))
            .since(MIN_VERSION, "move_roles_to_base_group")
            .json(json!({ "items": role_names }))
            .list()
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn inline_config_uses_list_envelope() {
        let group = ApiRoleConfigGroup::from_json(
            None,
            &json!({
                "name": "g1",
                "roleType": "DATANODE",
                "base": false,
                "config": {"items": [{"name": "heap", "value": "1024", "required": false}]}
            }),
        )
        .unwrap();
        assert_eq!(group.config()[0].value(), Some("1024"));
        assert_eq!(
            group.to_json(),
            json!({
                "name": "g1",
                "roleType": "DATANODE",
                "config": {"items": [{"name": "heap", "value": "1024"}]}
            })
        );
    }
}
