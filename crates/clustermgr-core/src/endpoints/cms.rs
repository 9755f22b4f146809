// Cluster Manager endpoints: everything under `/cm`.
//
// License, trial, server-wide configuration, version info, the full
// deployment document and the management service.

use clustermgr_api::{Body, Error, MultipartForm, Resource};
use tracing::{debug, info};

use crate::api_object;
use crate::call::{Call, View};
use crate::command::{self, ApiCommand};
use crate::config::{self, ConfigMap, FullConfigMap};
use crate::endpoints::services::ApiService;
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

const CM_PATH: &str = "cm";

pub static LICENSE: Schema = Schema {
    name: "ApiLicense",
    attrs: &[
        Attr::ro("owner", Kind::String),
        Attr::ro("uuid", Kind::String),
        Attr::ro("expiration", Kind::DateTime),
    ],
};

pub static VERSION_INFO: Schema = Schema {
    name: "ApiVersionInfo",
    attrs: &[
        Attr::ro("version", Kind::String),
        Attr::ro("snapshot", Kind::Bool),
        Attr::ro("buildUser", Kind::String),
        Attr::ro("buildTimestamp", Kind::String),
        Attr::ro("gitHash", Kind::String),
    ],
};

// Sections are kept as raw JSON so an exported deployment can be sent back
// without losing fields this crate does not model.
pub static DEPLOYMENT: Schema = Schema {
    name: "ApiDeployment",
    attrs: &[
        Attr::ro("timestamp", Kind::DateTime),
        Attr::rw("clusters", Kind::Json),
        Attr::rw("hosts", Kind::Json),
        Attr::rw("users", Kind::Json),
        Attr::rw("versionInfo", Kind::Entity(&VERSION_INFO)),
        Attr::rw("managementService", Kind::Json),
        Attr::rw("managerSettings", Kind::Json),
        Attr::rw("allHostsConfig", Kind::Json),
        Attr::rw("peers", Kind::Json),
        Attr::rw("hostTemplates", Kind::Json),
    ],
};

api_object! {
    /// The installed license.
    pub struct ApiLicense => LICENSE;
}

api_object! {
    /// Build information of the server.
    pub struct ApiVersionInfo => VERSION_INFO;
}

api_object! {
    /// The complete exported state of a deployment.
    pub struct ApiDeployment => DEPLOYMENT;
}

impl ApiLicense {
    pub fn owner(&self) -> Option<&str> {
        self.str_attr("owner")
    }

    pub fn uuid(&self) -> Option<&str> {
        self.str_attr("uuid")
    }

    pub fn expiration(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.time_attr("expiration")
    }
}

impl ApiVersionInfo {
    pub fn version(&self) -> Option<&str> {
        self.str_attr("version")
    }

    pub fn is_snapshot(&self) -> bool {
        self.bool_attr("snapshot").unwrap_or(false)
    }

    pub fn build_user(&self) -> Option<&str> {
        self.str_attr("buildUser")
    }

    pub fn build_timestamp(&self) -> Option<&str> {
        self.str_attr("buildTimestamp")
    }

    pub fn git_hash(&self) -> Option<&str> {
        self.str_attr("gitHash")
    }
}

impl ApiDeployment {
    pub fn timestamp(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.time_attr("timestamp")
    }

    pub fn version_info(&self) -> Option<ApiVersionInfo> {
        self.object("versionInfo")
    }

    pub fn clusters(&self) -> Option<&serde_json::Value> {
        self.json_attr("clusters")
    }
}

impl ApiRoot {
    fn cm(&self) -> Resource {
        self.at(CM_PATH)
    }

    /// `GET /cm/license`
    pub async fn get_license(&self) -> Result<ApiLicense, Error> {
        Call::get(&self.cm(), "license").one().await
    }

    /// Install a license; `license_text` is the signed license file content.
    ///
    /// `POST /cm/license` as `multipart/form-data` with one `license` field.
    pub async fn update_license(&self, license_text: &str) -> Result<ApiLicense, Error> {
        info!("uploading license");
        Call::post(&self.cm(), "license")
            .body(Body::Multipart(MultipartForm::new().text("license", license_text)))
            .one()
            .await
    }

    /// `POST /cm/trial/begin`
    pub async fn begin_trial(&self) -> Result<(), Error> {
        Call::post(&self.cm(), "trial/begin")
            .since(6, "begin_trial")
            .unit()
            .await
    }

    /// `POST /cm/trial/end`
    pub async fn end_trial(&self) -> Result<(), Error> {
        Call::post(&self.cm(), "trial/end")
            .since(6, "end_trial")
            .unit()
            .await
    }

    /// `GET /cm/config`
    pub async fn get_cm_config(&self) -> Result<ConfigMap, Error> {
        config::get_summary(&self.cm(), "config").await
    }

    /// `GET /cm/config?view=full`
    pub async fn get_cm_full_config(&self) -> Result<FullConfigMap, Error> {
        config::get_full(&self.cm(), "config").await
    }

    /// `PUT /cm/config`; a `None` value resets the key to its default.
    pub async fn update_cm_config(&self, config: &ConfigMap) -> Result<ConfigMap, Error> {
        debug!(keys = config.len(), "updating cluster manager config");
        config::put_summary(&self.cm(), "config", config).await
    }

    /// `GET /cm/version`
    pub async fn get_version_info(&self) -> Result<ApiVersionInfo, Error> {
        Call::get(&self.cm(), "version").one().await
    }

    /// `GET /cm/deployment`
    pub async fn get_deployment(&self, view: Option<View>) -> Result<ApiDeployment, Error> {
        Call::get(&self.cm(), "deployment")
            .since(2, "get_deployment")
            .view(view)
            .one()
            .await
    }

    /// Replace the deployment, optionally wiping the current one first.
    ///
    /// `PUT /cm/deployment?deleteCurrentDeployment=...`
    pub async fn update_deployment(
        &self,
        deployment: &ApiDeployment,
        delete_current: bool,
    ) -> Result<ApiDeployment, Error> {
        info!(delete_current, "replacing deployment");
        Call::put(&self.cm(), "deployment")
            .since(2, "update_deployment")
            .param("deleteCurrentDeployment", delete_current)
            .object(deployment)
            .one()
            .await
    }

    /// Commands running on the Cluster Manager itself.
    ///
    /// `GET /cm/commands`
    pub async fn get_cm_commands(&self, view: Option<View>) -> Result<Vec<ApiCommand>, Error> {
        command::active_commands(&self.cm()).view(view).list().await
    }

    /// `POST /cm/commands/generateCredentials`
    pub async fn generate_credentials(&self) -> Result<ApiCommand, Error> {
        command::command(&self.cm(), "generateCredentials").one().await
    }

    /// `POST /cm/commands/inspectHosts`
    pub async fn inspect_hosts(&self) -> Result<ApiCommand, Error> {
        command::command(&self.cm(), "inspectHosts").one().await
    }

    /// Import the KDC admin account used to create service principals.
    ///
    /// `POST /cm/commands/importAdminCredentials?username=...&password=...`
    pub async fn import_admin_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<ApiCommand, Error> {
        debug!(username, "importing admin credentials");
        command::command(&self.cm(), "importAdminCredentials")
            .param("username", username)
            .param("password", password)
            .one()
            .await
    }

    /// `GET /cm/service`
    pub async fn get_mgmt_service(&self) -> Result<ApiService, Error> {
        Call::get(&self.cm(), "service").one().await
    }

    /// Set up the management service.
    ///
    /// `PUT /cm/service`
    pub async fn create_mgmt_service(&self, service: &ApiService) -> Result<ApiService, Error> {
        info!("creating management service");
        Call::put(&self.cm(), "service").object(service).one().await
    }

    /// `DELETE /cm/service`
    pub async fn delete_mgmt_service(&self) -> Result<ApiService, Error> {
        info!("deleting management service");
        Call::delete(&self.cm(), "service").one().await
    }
}
