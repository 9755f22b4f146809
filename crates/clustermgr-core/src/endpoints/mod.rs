// Endpoint layer: one module per API area.
//
// Each module declares the schemas of its entities and adds its helpers
// to `ApiRoot` (and to the entities themselves) through separate impl
// blocks.

pub mod clusters;
pub mod cms;
pub mod dashboards;
pub mod events;
pub mod external_accounts;
pub mod host_templates;
pub mod hosts;
pub mod parcels;
pub mod role_config_groups;
pub mod roles;
pub mod services;
pub mod timeseries;
pub mod tools;
pub mod types;
pub mod users;

pub use clusters::ApiCluster;
pub use cms::{ApiDeployment, ApiLicense, ApiVersionInfo};
pub use dashboards::ApiDashboard;
pub use events::{ApiEvent, ApiEventAttribute, ApiEventQueryResult};
pub use external_accounts::{
    ApiExternalAccount, ApiExternalAccountCategory, ApiExternalAccountType,
};
pub use host_templates::ApiHostTemplate;
pub use hosts::ApiHost;
pub use parcels::{ApiParcel, ApiParcelState};
pub use role_config_groups::ApiRoleConfigGroup;
pub use roles::ApiRole;
pub use services::{ApiService, RoleTypeConfigs};
pub use timeseries::{
    ApiMetricSchema, ApiTimeSeries, ApiTimeSeriesData, ApiTimeSeriesMetadata,
    ApiTimeSeriesResponse, Rollup, TimeSeriesQuery,
};
pub use types::{
    ApiClusterRef, ApiEcho, ApiHealthCheck, ApiHostRef, ApiRoleConfigGroupRef, ApiRoleRef,
    ApiServiceRef,
};
pub use users::ApiUser;
