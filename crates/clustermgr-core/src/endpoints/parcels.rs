// Parcel endpoints (API v3):
// `/clusters/{cluster}/parcels/products/{product}/versions/{version}`.
//
// Parcels move through downloaded, distributed and activated stages; each
// transition is a command on the parcel resource.

use clustermgr_api::{Error, Resource};
use tracing::debug;

use crate::api_object;
use crate::call::{Call, View};
use crate::command::{self, ApiCommand};
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

const MIN_VERSION: u32 = 3;

pub static PARCEL_STATE: Schema = Schema {
    name: "ApiParcelState",
    attrs: &[
        Attr::ro("progress", Kind::Int),
        Attr::ro("totalProgress", Kind::Int),
        Attr::ro("count", Kind::Int),
        Attr::ro("totalCount", Kind::Int),
        Attr::ro("errors", Kind::String).bare_list(),
        Attr::ro("warnings", Kind::String).bare_list(),
    ],
};

pub static PARCEL: Schema = Schema {
    name: "ApiParcel",
    attrs: &[
        Attr::ro("product", Kind::String),
        Attr::ro("version", Kind::String),
        Attr::ro("stage", Kind::String),
        Attr::ro("state", Kind::Entity(&PARCEL_STATE)),
        Attr::ro("clusterRef", Kind::Ref),
    ],
};

api_object! {
    /// Progress of the current parcel stage.
    pub struct ApiParcelState => PARCEL_STATE;
}

api_object! {
    /// A versioned product bundle known to a cluster.
    pub struct ApiParcel => PARCEL;
}

fn parcels_path(cluster: &str) -> String {
    format!("clusters/{cluster}/parcels")
}

fn parcel_path(cluster: &str, product: &str, version: &str) -> String {
    format!("{}/products/{product}/versions/{version}", parcels_path(cluster))
}

impl ApiParcelState {
    pub fn progress(&self) -> Option<i64> {
        self.i64_attr("progress")
    }

    pub fn total_progress(&self) -> Option<i64> {
        self.i64_attr("totalProgress")
    }

    pub fn count(&self) -> Option<i64> {
        self.i64_attr("count")
    }

    pub fn total_count(&self) -> Option<i64> {
        self.i64_attr("totalCount")
    }

    pub fn errors(&self) -> Vec<&str> {
        self.str_list_attr("errors")
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.str_list_attr("warnings")
    }
}

impl ApiParcel {
    pub fn product(&self) -> Option<&str> {
        self.str_attr("product")
    }

    pub fn version(&self) -> Option<&str> {
        self.str_attr("version")
    }

    /// E.g. `AVAILABLE_REMOTELY`, `DOWNLOADED`, `DISTRIBUTED`, `ACTIVATED`.
    pub fn stage(&self) -> Option<&str> {
        self.str_attr("stage")
    }

    pub fn state(&self) -> Option<ApiParcelState> {
        self.object("state")
    }

    pub fn resource(&self) -> Result<Resource, Error> {
        let root = ApiRoot::of(self)?;
        let cluster = self
            .value("clusterRef")
            .as_entity()
            .and_then(|r| r.str_attr("clusterName"))
            .ok_or_else(|| Error::InvalidConfig {
                message: "ApiParcel has no clusterRef".into(),
            })?;
        Ok(root.at(&parcel_path(
            cluster,
            self.require_str("product")?,
            self.require_str("version")?,
        )))
    }

    async fn cmd(&self, name: &str) -> Result<ApiCommand, Error> {
        debug!(
            product = self.product(),
            version = self.version(),
            command = name,
            "parcel command"
        );
        command::command(&self.resource()?, name)
            .since(MIN_VERSION, name)
            .one()
            .await
    }

    pub async fn start_download(&self) -> Result<ApiCommand, Error> {
        self.cmd("startDownload").await
    }

    pub async fn cancel_download(&self) -> Result<ApiCommand, Error> {
        self.cmd("cancelDownload").await
    }

    pub async fn remove_download(&self) -> Result<ApiCommand, Error> {
        self.cmd("removeDownload").await
    }

    pub async fn start_distribution(&self) -> Result<ApiCommand, Error> {
        self.cmd("startDistribution").await
    }

    pub async fn cancel_distribution(&self) -> Result<ApiCommand, Error> {
        self.cmd("cancelDistribution").await
    }

    pub async fn start_removal_of_distribution(&self) -> Result<ApiCommand, Error> {
        self.cmd("startRemovalOfDistribution").await
    }

    pub async fn activate(&self) -> Result<ApiCommand, Error> {
        self.cmd("activate").await
    }

    pub async fn deactivate(&self) -> Result<ApiCommand, Error> {
        self.cmd("deactivate").await
    }
}

impl ApiRoot {
    /// `GET /clusters/{cluster}/parcels/products/{product}/versions/{version}`
    pub async fn get_parcel(
        &self,
        cluster: &str,
        product: &str,
        version: &str,
    ) -> Result<ApiParcel, Error> {
        Call::get(self.resource(), parcel_path(cluster, product, version))
            .since(MIN_VERSION, "get_parcel")
            .one()
            .await
    }

    /// `GET /clusters/{cluster}/parcels`
    pub async fn get_all_parcels(
        &self,
        cluster: &str,
        view: Option<View>,
    ) -> Result<Vec<ApiParcel>, Error> {
        Call::get(self.resource(), parcels_path(cluster))
            .since(MIN_VERSION, "get_all_parcels")
            .view(view)
            .list()
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::ApiObject;
    use serde_json::json;

    #[test]
    fn nested_state_decodes() {
        let parcel = ApiParcel::from_json(
            None,
            &json!({
                "product": "CDH",
                "version": "5.16.2",
                "stage": "DOWNLOADING",
                "state": {"progress": 40, "totalProgress": 100, "errors": [], "warnings": ["slow"]},
                "clusterRef": {"clusterName": "c1"}
            }),
        )
        .unwrap();
        let state = parcel.state().unwrap();
        assert_eq!(state.progress(), Some(40));
        assert!(state.errors().is_empty());
        assert_eq!(state.warnings(), vec!["slow"]);
        assert_eq!(parcel.stage(), Some("DOWNLOADING"));
    }

    #[test]
    fn parcel_path_layout() {
        assert_eq!(
            parcel_path("c1", "CDH", "5.16.2"),
            "clusters/c1/parcels/products/CDH/versions/5.16.2"
        );
    }
}
