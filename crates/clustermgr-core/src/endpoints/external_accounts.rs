// External account endpoints (API v16): `/externalAccounts`.
//
// Accounts hold credentials for outside systems (cloud providers, peer
// deployments). Their settings travel as a config list.

use clustermgr_api::Error;
use tracing::debug;

use crate::api_object;
use crate::call::{Call, View};
use crate::command::ApiCommand;
use crate::config::{ApiConfig, CONFIG, ConfigMap, config_to_api_list, json_to_config};
use crate::entity::Entity;
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

const MIN_VERSION: u32 = 16;

pub static EXTERNAL_ACCOUNT_CATEGORY: Schema = Schema {
    name: "ApiExternalAccountCategory",
    attrs: &[
        Attr::ro("name", Kind::String),
        Attr::ro("displayName", Kind::String),
        Attr::ro("description", Kind::String),
    ],
};

pub static EXTERNAL_ACCOUNT_TYPE: Schema = Schema {
    name: "ApiExternalAccountType",
    attrs: &[
        Attr::ro("name", Kind::String),
        Attr::ro("categoryName", Kind::String),
        Attr::ro("type", Kind::String),
        Attr::ro("displayName", Kind::String),
        Attr::ro("description", Kind::String),
        Attr::ro("allowedAccountConfigs", Kind::Entity(&CONFIG)).list(),
    ],
};

pub static EXTERNAL_ACCOUNT: Schema = Schema {
    name: "ApiExternalAccount",
    attrs: &[
        Attr::rw("name", Kind::String),
        Attr::rw("displayName", Kind::String),
        Attr::rw("typeName", Kind::String),
        Attr::ro("createdTime", Kind::DateTime),
        Attr::ro("lastModifiedTime", Kind::DateTime),
        Attr::rw("accountConfigs", Kind::Json),
    ],
};

api_object! {
    pub struct ApiExternalAccountCategory => EXTERNAL_ACCOUNT_CATEGORY;
}

api_object! {
    /// A kind of external account and the settings it accepts.
    pub struct ApiExternalAccountType => EXTERNAL_ACCOUNT_TYPE;
}

api_object! {
    /// Stored credentials for an outside system.
    pub struct ApiExternalAccount => EXTERNAL_ACCOUNT;
}

impl ApiExternalAccountCategory {
    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    pub fn display_name(&self) -> Option<&str> {
        self.str_attr("displayName")
    }
}

impl ApiExternalAccountType {
    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    pub fn category_name(&self) -> Option<&str> {
        self.str_attr("categoryName")
    }

    pub fn allowed_account_configs(&self) -> Vec<ApiConfig> {
        self.objects("allowedAccountConfigs")
    }
}

impl ApiExternalAccount {
    pub fn new(name: &str, display_name: &str, type_name: &str, configs: &ConfigMap) -> Self {
        Self(
            Entity::new(&EXTERNAL_ACCOUNT)
                .fill("name", name)
                .fill("displayName", display_name)
                .fill("typeName", type_name)
                .fill("accountConfigs", config_to_api_list(configs)),
        )
    }

    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    pub fn display_name(&self) -> Option<&str> {
        self.str_attr("displayName")
    }

    /// Name of the [`ApiExternalAccountType`] this account instantiates.
    pub fn account_type(&self) -> Option<&str> {
        self.str_attr("typeName")
    }

    /// Account settings as a name/value map; empty when absent.
    pub fn account_configs(&self) -> Result<ConfigMap, Error> {
        self.json_attr("accountConfigs")
            .map_or_else(|| Ok(ConfigMap::new()), json_to_config)
    }
}

impl ApiRoot {
    /// `GET /externalAccounts/supportedCategories`
    pub async fn get_supported_account_categories(
        &self,
    ) -> Result<Vec<ApiExternalAccountCategory>, Error> {
        Call::get(self.resource(), "externalAccounts/supportedCategories")
            .since(MIN_VERSION, "get_supported_account_categories")
            .list()
            .await
    }

    /// `GET /externalAccounts/supportedTypes/{category}`
    pub async fn get_supported_account_types(
        &self,
        category: &str,
    ) -> Result<Vec<ApiExternalAccountType>, Error> {
        Call::get(
            self.resource(),
            format!("externalAccounts/supportedTypes/{category}"),
        )
        .since(MIN_VERSION, "get_supported_account_types")
        .list()
        .await
    }

    /// `POST /externalAccounts/create`
    pub async fn create_external_account(
        &self,
        name: &str,
        display_name: &str,
        type_name: &str,
        configs: &ConfigMap,
    ) -> Result<ApiExternalAccount, Error> {
        debug!(name, type_name, "creating external account");
        Call::post(self.resource(), "externalAccounts/create")
            .since(MIN_VERSION, "create_external_account")
            .object(&ApiExternalAccount::new(name, display_name, type_name, configs))
            .one()
            .await
    }

    /// `GET /externalAccounts/account/{name}`
    pub async fn get_external_account(
        &self,
        name: &str,
        view: Option<View>,
    ) -> Result<ApiExternalAccount, Error> {
        Call::get(self.resource(), format!("externalAccounts/account/{name}"))
            .since(MIN_VERSION, "get_external_account")
            .view(view)
            .one()
            .await
    }

    /// `GET /externalAccounts/accountByDisplayName/{displayName}`
    pub async fn get_external_account_by_display_name(
        &self,
        display_name: &str,
        view: Option<View>,
    ) -> Result<ApiExternalAccount, Error> {
        Call::get(
            self.resource(),
            format!("externalAccounts/accountByDisplayName/{display_name}"),
        )
        .since(MIN_VERSION, "get_external_account_by_display_name")
        .view(view)
        .one()
        .await
    }

    /// `GET /externalAccounts/type/{typeName}`
    pub async fn get_all_external_accounts(
        &self,
        type_name: &str,
        view: Option<View>,
    ) -> Result<Vec<ApiExternalAccount>, Error> {
        Call::get(self.resource(), format!("externalAccounts/type/{type_name}"))
            .since(MIN_VERSION, "get_all_external_accounts")
            .view(view)
            .list()
            .await
    }

    /// `PUT /externalAccounts/update`
    pub async fn update_external_account(
        &self,
        account: &ApiExternalAccount,
    ) -> Result<ApiExternalAccount, Error> {
        Call::put(self.resource(), "externalAccounts/update")
            .since(MIN_VERSION, "update_external_account")
            .object(account)
            .one()
            .await
    }

    /// `DELETE /externalAccounts/delete/{name}`
    pub async fn delete_external_account(&self, name: &str) -> Result<ApiExternalAccount, Error> {
        debug!(name, "deleting external account");
        Call::delete(self.resource(), format!("externalAccounts/delete/{name}"))
            .since(MIN_VERSION, "delete_external_account")
            .one()
            .await
    }

    /// Run an account-specific command.
    ///
    /// `POST /externalAccounts/account/{name}/commands/{command}`
    pub async fn external_account_command(
        &self,
        name: &str,
        command: &str,
    ) -> Result<ApiCommand, Error> {
        Call::post(
            self.resource(),
            format!("externalAccounts/account/{name}/commands/{command}"),
        )
        .since(MIN_VERSION, "external_account_command")
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
    fn account_configs_travel_as_config_list() {
        let mut configs = ConfigMap::new();
        configs.insert("aws_access_key".into(), Some("AKIA".into()));
        let account = ApiExternalAccount::new("s3", "S3 backup", "AWS_ACCESS_KEY_AUTH", &configs);
        assert_eq!(
            account.to_json()["accountConfigs"],
            json!({"items": [{"name": "aws_access_key", "value": "AKIA"}]})
        );
        assert_eq!(account.account_configs().unwrap(), configs);
    }
}
