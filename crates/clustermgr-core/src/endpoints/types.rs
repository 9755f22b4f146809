// Shared small types: reference entities and a few leaf records used
// across endpoints. The reference schemas feed the registry.

use crate::api_object;
use crate::entity::Entity;
use crate::schema::{Attr, Kind, Schema};

pub static HOST_REF: Schema = Schema {
    name: "ApiHostRef",
    attrs: &[Attr::rw("hostId", Kind::String)],
};

pub static CLUSTER_REF: Schema = Schema {
    name: "ApiClusterRef",
    attrs: &[Attr::rw("clusterName", Kind::String)],
};

pub static SERVICE_REF: Schema = Schema {
    name: "ApiServiceRef",
    attrs: &[
        Attr::rw("peerName", Kind::String).since(11),
        Attr::rw("clusterName", Kind::String),
        Attr::rw("serviceName", Kind::String),
    ],
};

pub static ROLE_REF: Schema = Schema {
    name: "ApiRoleRef",
    attrs: &[
        Attr::rw("clusterName", Kind::String),
        Attr::rw("serviceName", Kind::String),
        Attr::rw("roleName", Kind::String),
    ],
};

pub static ROLE_CONFIG_GROUP_REF: Schema = Schema {
    name: "ApiRoleConfigGroupRef",
    attrs: &[Attr::rw("roleConfigGroupName", Kind::String)],
};

/// Every schema reachable through a `...Ref` field name.
pub static REFERENCE_SCHEMAS: &[&Schema] = &[
    &HOST_REF,
    &CLUSTER_REF,
    &SERVICE_REF,
    &ROLE_REF,
    &ROLE_CONFIG_GROUP_REF,
];

pub static HEALTH_CHECK: Schema = Schema {
    name: "ApiHealthCheck",
    attrs: &[
        Attr::ro("name", Kind::String),
        Attr::ro("summary", Kind::String),
    ],
};

pub static ECHO: Schema = Schema {
    name: "ApiEcho",
    attrs: &[Attr::rw("message", Kind::String)],
};

api_object! {
    /// Points at a host by id.
    pub struct ApiHostRef => HOST_REF;
}

api_object! {
    pub struct ApiClusterRef => CLUSTER_REF;
}

api_object! {
    pub struct ApiServiceRef => SERVICE_REF;
}

api_object! {
    pub struct ApiRoleRef => ROLE_REF;
}

api_object! {
    pub struct ApiRoleConfigGroupRef => ROLE_CONFIG_GROUP_REF;
}

api_object! {
    pub struct ApiHealthCheck => HEALTH_CHECK;
}

api_object! {
    pub struct ApiEcho => ECHO;
}

impl ApiHostRef {
    pub fn new(host_id: &str) -> Self {
        Self(Entity::new(&HOST_REF).fill("hostId", host_id))
    }

    pub fn host_id(&self) -> Option<&str> {
        self.str_attr("hostId")
    }
}

impl ApiClusterRef {
    pub fn new(cluster_name: &str) -> Self {
        Self(Entity::new(&CLUSTER_REF).fill("clusterName", cluster_name))
    }

    pub fn cluster_name(&self) -> Option<&str> {
        self.str_attr("clusterName")
    }
}

impl ApiServiceRef {
    pub fn new(cluster_name: &str, service_name: &str) -> Self {
        Self(
            Entity::new(&SERVICE_REF)
                .fill("clusterName", cluster_name)
                .fill("serviceName", service_name),
        )
    }

    pub fn cluster_name(&self) -> Option<&str> {
        self.str_attr("clusterName")
    }

    pub fn service_name(&self) -> Option<&str> {
        self.str_attr("serviceName")
    }
}

impl ApiRoleRef {
    pub fn new(cluster_name: &str, service_name: &str, role_name: &str) -> Self {
        Self(
            Entity::new(&ROLE_REF)
                .fill("clusterName", cluster_name)
                .fill("serviceName", service_name)
                .fill("roleName", role_name),
        )
    }

    pub fn role_name(&self) -> Option<&str> {
        self.str_attr("roleName")
    }
}

impl ApiRoleConfigGroupRef {
    pub fn new(name: &str) -> Self {
        Self(Entity::new(&ROLE_CONFIG_GROUP_REF).fill("roleConfigGroupName", name))
    }

    pub fn name(&self) -> Option<&str> {
        self.str_attr("roleConfigGroupName")
    }
}

impl ApiHealthCheck {
    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    pub fn summary(&self) -> Option<&str> {
        self.str_attr("summary")
    }
}

impl ApiEcho {
    pub fn message(&self) -> Option<&str> {
        self.str_attr("message")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::ApiObject;
    use serde_json::json;

    #[test]
    fn service_ref_drops_peer_name_for_old_servers() {
        let mut r = ApiServiceRef::new("c1", "hdfs");
        r.set("peerName", "dr").unwrap();
        let old = r.to_json_with(&crate::entity::SerializeOptions::for_version(10));
        assert_eq!(old, json!({"clusterName": "c1", "serviceName": "hdfs"}));
        let new = r.to_json_with(&crate::entity::SerializeOptions::for_version(11));
        assert_eq!(new["peerName"], "dr");
    }

    #[test]
    fn constructors_fill_identifiers() {
        assert_eq!(ApiHostRef::new("h1").to_json(), json!({"hostId": "h1"}));
        assert_eq!(ApiRoleRef::new("c", "s", "r").role_name(), Some("r"));
        assert_eq!(ApiHostRef::schema().name, "ApiHostRef");
    }
}
