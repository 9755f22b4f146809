// Dashboard endpoints (API v6): `/timeseries/dashboards`.

use clustermgr_api::Error;
use tracing::debug;

use crate::api_object;
use crate::call::Call;
use crate::entity::Entity;
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

const MIN_VERSION: u32 = 6;
const DASHBOARDS_PATH: &str = "timeseries/dashboards";

pub static DASHBOARD: Schema = Schema {
    name: "ApiDashboard",
    attrs: &[
        Attr::rw("name", Kind::String),
        Attr::rw("json", Kind::String),
    ],
};

api_object! {
    /// A user-defined chart layout; `json` is the opaque dashboard document.
    pub struct ApiDashboard => DASHBOARD;
}

impl ApiDashboard {
    pub fn new(name: &str, json: &str) -> Self {
        Self(Entity::new(&DASHBOARD).fill("name", name).fill("json", json))
    }

    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    pub fn json(&self) -> Option<&str> {
        self.str_attr("json")
    }
}

impl ApiRoot {
    /// `GET /timeseries/dashboards`
    pub async fn get_dashboards(&self) -> Result<Vec<ApiDashboard>, Error> {
        Call::get(self.resource(), DASHBOARDS_PATH)
            .since(MIN_VERSION, "get_dashboards")
            .list()
            .await
    }

    /// `GET /timeseries/dashboards/{name}`
    pub async fn get_dashboard(&self, name: &str) -> Result<ApiDashboard, Error> {
        Call::get(self.resource(), format!("{DASHBOARDS_PATH}/{name}"))
            .since(MIN_VERSION, "get_dashboard")
            .one()
            .await
    }

    /// `POST /timeseries/dashboards`
    pub async fn create_dashboards(
        &self,
        dashboards: &[ApiDashboard],
    ) -> Result<Vec<ApiDashboard>, Error> {
        debug!(count = dashboards.len(), "creating dashboards");
        Call::post(self.resource(), DASHBOARDS_PATH)
            .since(MIN_VERSION, "create_dashboards")
            .objects(dashboards)
            .list()
            .await
    }

    /// `DELETE /timeseries/dashboards/{name}`
    pub async fn delete_dashboard(&self, name: &str) -> Result<ApiDashboard, Error> {
        debug!(name, "deleting dashboard");
        Call::delete(self.resource(), format!("{DASHBOARDS_PATH}/{name}"))
            .since(MIN_VERSION, "delete_dashboard")
            .one()
            .await
    }
}
