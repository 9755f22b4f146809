// Host template endpoints (API v3): `/clusters/{cluster}/hostTemplates`.

use clustermgr_api::{Error, Resource};
use tracing::debug;

use crate::api_object;
use crate::call::Call;
use crate::command::{self, ApiCommand};
use crate::endpoints::types::{ApiHostRef, ApiRoleConfigGroupRef};
use crate::entity::{ApiObject, Entity};
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

const MIN_VERSION: u32 = 3;

pub static HOST_TEMPLATE: Schema = Schema {
    name: "ApiHostTemplate",
    attrs: &[
        Attr::rw("name", Kind::String),
        Attr::ro("clusterRef", Kind::Ref),
        Attr::rw("roleConfigGroupRefs", Kind::Ref).bare_list(),
    ],
};

api_object! {
    /// A named set of role config groups to apply to hosts.
    pub struct ApiHostTemplate => HOST_TEMPLATE;
}

fn templates_path(cluster: &str) -> String {
    format!("clusters/{cluster}/hostTemplates")
}

impl ApiHostTemplate {
    pub fn new(name: &str) -> Self {
        Self(Entity::new(&HOST_TEMPLATE).fill("name", name))
    }

    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    pub fn role_config_group_refs(&self) -> Vec<ApiRoleConfigGroupRef> {
        self.objects("roleConfigGroupRefs")
    }

    pub fn cluster_name(&self) -> Option<&str> {
        self.value("clusterRef")
            .as_entity()
            .and_then(|r| r.str_attr("clusterName"))
    }

    pub fn resource(&self) -> Result<Resource, Error> {
        let root = ApiRoot::of(self)?;
        let cluster = self.cluster_name().ok_or_else(|| Error::InvalidConfig {
            message: "ApiHostTemplate has no clusterRef".into(),
        })?;
        Ok(root.at(&format!(
            "{}/{}",
            templates_path(cluster),
            self.require_str("name")?
        )))
    }

    /// Write back name and group references (v3).
    pub async fn update(&mut self) -> Result<(), Error> {
        let fresh: ApiHostTemplate = Call::put(&self.resource()?, "")
            .since(MIN_VERSION, "update_host_template")
            .object(&*self)
            .one()
            .await?;
        self.update_from(&fresh)
    }

    /// Replace the role config groups and write back.
    pub async fn set_role_config_groups(&mut self, group_names: &[&str]) -> Result<(), Error> {
        let refs: Vec<ApiRoleConfigGroupRef> = group_names
            .iter()
            .map(|name| ApiRoleConfigGroupRef::new(name))
            .collect();
        self.set("roleConfigGroupRefs", refs)?;
        self.update().await
    }

    /// Create the template's roles on the given hosts.
    ///
    /// `POST .../hostTemplates/{name}/commands/applyHostTemplate`
    pub async fn apply_host_template(
        &self,
        host_ids: &[&str],
        start_roles: bool,
    ) -> Result<ApiCommand, Error> {
        let refs: Vec<ApiHostRef> = host_ids.iter().map(|id| ApiHostRef::new(id)).collect();
        debug!(template = self.name(), hosts = host_ids.len(), "applying host template");
        command::command(&self.resource()?, "applyHostTemplate")
            .since(MIN_VERSION, "apply_host_template")
            .param("startRoles", start_roles)
            .objects(&refs)
            .one()
            .await
    }
}

impl ApiRoot {
    /// `POST /clusters/{cluster}/hostTemplates`
    pub async fn create_host_template(
        &self,
        cluster: &str,
        name: &str,
    ) -> Result<ApiHostTemplate, Error> {
        Call::post(self.resource(), templates_path(cluster))
            .since(MIN_VERSION, "create_host_template")
            .objects(&[ApiHostTemplate::new(name)])
            .first()
            .await
    }

    pub async fn get_host_template(
        &self,
        cluster: &str,
        name: &str,
    ) -> Result<ApiHostTemplate, Error> {
        Call::get(self.resource(), format!("{}/{name}", templates_path(cluster)))
            .since(MIN_VERSION, "get_host_template")
            .one()
            .await
    }

    pub async fn get_all_host_templates(&self, cluster: &str) -> Result<Vec<ApiHostTemplate>, Error> {
        Call::get(self.resource(), templates_path(cluster))
            .since(MIN_VERSION, "get_all_host_templates")
            .list()
            .await
    }

    /// `PUT /clusters/{cluster}/hostTemplates/{name}`
    pub async fn update_host_template(
        &self,
        cluster: &str,
        name: &str,
        template: &ApiHostTemplate,
    ) -> Result<ApiHostTemplate, Error> {
        Call::put(self.resource(), format!("{}/{name}", templates_path(cluster)))
            .since(MIN_VERSION, "update_host_template")
            .object(template)
            .one()
            .await
    }

    pub async fn delete_host_template(
        &self,
        cluster: &str,
        name: &str,
    ) -> Result<ApiHostTemplate, Error> {
        debug!(cluster, name, "deleting host template");
        Call::delete(self.resource(), format!("{}/{name}", templates_path(cluster)))
            .since(MIN_VERSION, "delete_host_template")
            .one()
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn group_refs_are_a_bare_array() {
        let mut template = ApiHostTemplate::new("workers");
        template
            .set(
                "roleConfigGroupRefs",
                vec![ApiRoleConfigGroupRef::new("hdfs-DATANODE-BASE")],
            )
            .unwrap();
        assert_eq!(
            template.to_json(),
            json!({
                "name": "workers",
                "roleConfigGroupRefs": [{"roleConfigGroupName": "hdfs-DATANODE-BASE"}]
            })
        );
    }
}
