// Time-series endpoints: `/timeseries` and `/timeseries/schema`.

use chrono::{DateTime, Utc};
use clustermgr_api::Error;
use strum::{AsRefStr, Display, EnumString};

use crate::api_object;
use crate::call::Call;
use crate::datetime::format_api_time;
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

pub static TIME_SERIES_DATA: Schema = Schema {
    name: "ApiTimeSeriesData",
    attrs: &[
        Attr::ro("timestamp", Kind::DateTime),
        Attr::ro("value", Kind::Float),
        Attr::ro("type", Kind::String),
        Attr::ro("aggregateStatistics", Kind::Json).since(6),
    ],
};

pub static TIME_SERIES_METADATA: Schema = Schema {
    name: "ApiTimeSeriesMetadata",
    attrs: &[
        Attr::ro("metricName", Kind::String),
        Attr::ro("entityName", Kind::String),
        Attr::ro("startTime", Kind::DateTime),
        Attr::ro("endTime", Kind::DateTime),
        Attr::ro("attributes", Kind::String).map(),
        Attr::ro("unitNumerators", Kind::String).bare_list(),
        Attr::ro("unitDenominators", Kind::String).bare_list(),
        Attr::ro("expression", Kind::String),
        Attr::ro("alias", Kind::String),
        Attr::ro("metricCollectionFrequencyMs", Kind::Int),
        Attr::ro("rollupUsed", Kind::String).since(6),
    ],
};

pub static TIME_SERIES: Schema = Schema {
    name: "ApiTimeSeries",
    attrs: &[
        Attr::ro("metadata", Kind::Entity(&TIME_SERIES_METADATA)),
        Attr::ro("data", Kind::Entity(&TIME_SERIES_DATA)).bare_list(),
    ],
};

pub static TIME_SERIES_RESPONSE: Schema = Schema {
    name: "ApiTimeSeriesResponse",
    attrs: &[
        Attr::ro("timeSeries", Kind::Entity(&TIME_SERIES)).bare_list(),
        Attr::ro("warnings", Kind::String).bare_list(),
        Attr::ro("errors", Kind::String).bare_list(),
        Attr::ro("timeSeriesQuery", Kind::String),
    ],
};

pub static METRIC_SCHEMA: Schema = Schema {
    name: "ApiMetricSchema",
    attrs: &[
        Attr::ro("name", Kind::String),
        Attr::ro("displayName", Kind::String),
        Attr::ro("description", Kind::String),
        Attr::ro("isCounter", Kind::Bool),
        Attr::ro("unitNumerator", Kind::String),
        Attr::ro("unitDenominator", Kind::String),
        Attr::ro("aliases", Kind::String).bare_list(),
        Attr::ro("sources", Kind::Json),
    ],
};

api_object! {
    /// One point of a time series.
    pub struct ApiTimeSeriesData => TIME_SERIES_DATA;
}

api_object! {
    pub struct ApiTimeSeriesMetadata => TIME_SERIES_METADATA;
}

api_object! {
    pub struct ApiTimeSeries => TIME_SERIES;
}

api_object! {
    /// Result of one tsquery statement.
    pub struct ApiTimeSeriesResponse => TIME_SERIES_RESPONSE;
}

api_object! {
    pub struct ApiMetricSchema => METRIC_SCHEMA;
}

/// Data granularity for time-series queries (v6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Rollup {
    Raw,
    TenMinutely,
    Hourly,
    SixHourly,
    Daily,
    Weekly,
}

/// Window and granularity of a time-series query.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub desired_rollup: Option<Rollup>,
    pub must_use_desired_rollup: Option<bool>,
}

impl ApiTimeSeriesData {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.time_attr("timestamp")
    }

    pub fn value(&self) -> Option<f64> {
        self.f64_attr("value")
    }
}

impl ApiTimeSeriesMetadata {
    pub fn metric_name(&self) -> Option<&str> {
        self.str_attr("metricName")
    }

    pub fn entity_name(&self) -> Option<&str> {
        self.str_attr("entityName")
    }
}

impl ApiTimeSeries {
    pub fn metadata(&self) -> Option<ApiTimeSeriesMetadata> {
        self.object("metadata")
    }

    pub fn data(&self) -> Vec<ApiTimeSeriesData> {
        self.objects("data")
    }
}

impl ApiTimeSeriesResponse {
    pub fn time_series(&self) -> Vec<ApiTimeSeries> {
        self.objects("timeSeries")
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.str_list_attr("warnings")
    }

    pub fn errors(&self) -> Vec<&str> {
        self.str_list_attr("errors")
    }
}

impl ApiMetricSchema {
    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    pub fn is_counter(&self) -> bool {
        self.bool_attr("isCounter").unwrap_or(false)
    }
}

impl ApiRoot {
    /// Run a tsquery statement.
    ///
    /// `GET /timeseries?query=...&from=...&to=...`; rollup selection
    /// requires API v6.
    pub async fn query_timeseries(
        &self,
        query: &str,
        window: &TimeSeriesQuery,
    ) -> Result<Vec<ApiTimeSeriesResponse>, Error> {
        let mut call = Call::get(self.resource(), "timeseries")
            .param("query", query)
            .param_opt("from", window.from.as_ref().map(format_api_time))
            .param_opt("to", window.to.as_ref().map(format_api_time));
        if window.desired_rollup.is_some() || window.must_use_desired_rollup.is_some() {
            call = call
                .since(6, "query_timeseries with rollup")
                .param_opt("desiredRollup", window.desired_rollup)
                .param_opt("mustUseDesiredRollup", window.must_use_desired_rollup);
        }
        call.list().await
    }

    /// Every metric the server can report.
    ///
    /// `GET /timeseries/schema`
    pub async fn get_metric_schema(&self) -> Result<Vec<ApiMetricSchema>, Error> {
        Call::get(self.resource(), "timeseries/schema").list().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::ApiObject;
    use serde_json::json;

    #[test]
    fn rollup_wire_names() {
        assert_eq!(Rollup::TenMinutely.to_string(), "TEN_MINUTELY");
        assert_eq!(Rollup::Raw.as_ref(), "RAW");
    }

    #[test]
    fn response_nesting() {
        let resp = ApiTimeSeriesResponse::from_json(
            None,
            &json!({
                "timeSeries": [{
                    "metadata": {"metricName": "cpu_percent", "entityName": "h1",
                                 "attributes": {"hostname": "h1"}},
                    "data": [
                        {"timestamp": "2020-01-01T00:00:00.000Z", "value": 1.5, "type": "SAMPLE"},
                        {"timestamp": "2020-01-01T00:01:00.000Z", "value": 2, "type": "SAMPLE"}
                    ]
                }],
                "warnings": [],
                "errors": [],
                "timeSeriesQuery": "select cpu_percent"
            }),
        )
        .unwrap();
        let series = &resp.time_series()[0];
        assert_eq!(
            series.metadata().unwrap().metric_name(),
            Some("cpu_percent")
        );
        let values: Vec<_> = series.data().iter().filter_map(ApiTimeSeriesData::value).collect();
        assert_eq!(values, vec![1.5, 2.0]);
    }
}
