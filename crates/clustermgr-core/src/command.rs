// ── Commands ──
//
// Server-side asynchronous actions. A command is created by POSTing to
// `<resource>/commands/<name>` and then polled through `/commands/{id}`
// until it turns inactive. The poll loop is the only place the library
// sleeps.

use std::time::Duration;

use clustermgr_api::{Error, Resource};
use serde_json::json;
use tokio::time::{Instant, sleep};
use tracing::{debug, trace};

use crate::api_object;
use crate::call::Call;
use crate::root::ApiRoot;
use crate::schema::{Attr, Kind, Schema};

/// Id the server uses for commands it completed synchronously.
pub const SYNCHRONOUS_COMMAND_ID: i64 = -1;

/// Fixed cadence between polls in [`ApiCommand::wait`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub static COMMAND: Schema = Schema {
    name: "ApiCommand",
    attrs: &[
        Attr::ro("id", Kind::Int),
        Attr::ro("name", Kind::String),
        Attr::ro("startTime", Kind::DateTime),
        Attr::ro("endTime", Kind::DateTime),
        Attr::ro("active", Kind::Bool),
        Attr::ro("success", Kind::Bool),
        Attr::ro("resultMessage", Kind::String),
        Attr::ro("serviceRef", Kind::Ref),
        Attr::ro("roleRef", Kind::Ref),
        Attr::ro("hostRef", Kind::Ref),
        Attr::ro("clusterRef", Kind::Ref),
        Attr::ro("parent", Kind::Entity(&COMMAND)),
        Attr::ro("children", Kind::Entity(&COMMAND)).list(),
        Attr::ro("resultDataUrl", Kind::String),
        Attr::ro("canRetry", Kind::Bool).since(7),
    ],
};

pub static BULK_COMMAND_LIST: Schema = Schema {
    name: "ApiBulkCommandList",
    attrs: &[
        Attr::ro("items", Kind::Entity(&COMMAND)).list(),
        Attr::ro("errors", Kind::String).bare_list(),
    ],
};

api_object! {
    /// A server-side command and its current state.
    pub struct ApiCommand => COMMAND;
}

api_object! {
    /// Result of a bulk role command: one command per role plus the
    /// roles the server refused.
    pub struct ApiBulkCommandList => BULK_COMMAND_LIST;
}

/// Deadline and cadence for [`ApiCommand::wait_with`].
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    /// Wall-clock budget; `None` waits until the command finishes.
    pub timeout: Option<Duration>,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitOptions {
    pub fn timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl ApiCommand {
    pub fn id(&self) -> Option<i64> {
        self.i64_attr("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_attr("name")
    }

    /// Absent `active` is treated as finished.
    pub fn is_active(&self) -> bool {
        self.bool_attr("active").unwrap_or(false)
    }

    /// `None` while the command is still running.
    pub fn success(&self) -> Option<bool> {
        self.bool_attr("success")
    }

    pub fn result_message(&self) -> Option<&str> {
        self.str_attr("resultMessage")
    }

    pub fn start_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.time_attr("startTime")
    }

    pub fn end_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.time_attr("endTime")
    }

    pub fn result_data_url(&self) -> Option<&str> {
        self.str_attr("resultDataUrl")
    }

    pub fn can_retry(&self) -> Option<bool> {
        self.bool_attr("canRetry")
    }

    pub fn parent(&self) -> Option<ApiCommand> {
        self.object("parent")
    }

    pub fn children(&self) -> Vec<ApiCommand> {
        self.objects("children")
    }

    pub fn is_synchronous(&self) -> bool {
        self.id() == Some(SYNCHRONOUS_COMMAND_ID)
    }

    fn command_id(&self) -> Result<i64, Error> {
        self.id().ok_or_else(|| Error::InvalidConfig {
            message: "command has no id".into(),
        })
    }

    fn command_path(&self, suffix: &str) -> Result<String, Error> {
        Ok(format!("commands/{}{suffix}", self.command_id()?))
    }

    /// Reload this command from the server.
    pub async fn fetch(&self) -> Result<ApiCommand, Error> {
        if self.is_synchronous() {
            return Ok(self.clone());
        }
        let root = ApiRoot::of(self)?;
        Call::get(root.resource(), self.command_path("")?).one().await
    }

    /// Ask the server to abort; returns the command's new state.
    pub async fn abort(&self) -> Result<ApiCommand, Error> {
        if self.is_synchronous() {
            return Ok(self.clone());
        }
        let root = ApiRoot::of(self)?;
        debug!(id = self.id(), "aborting command");
        Call::post(root.resource(), self.command_path("/abort")?)
            .one()
            .await
    }

    /// Retry a failed command; returns the new command.
    pub async fn retry(&self) -> Result<ApiCommand, Error> {
        if self.is_synchronous() {
            return Ok(self.clone());
        }
        let root = ApiRoot::of(self)?;
        debug!(id = self.id(), "retrying command");
        Call::post(root.resource(), self.command_path("/retry")?)
            .since(7, "retry")
            .one()
            .await
    }

    /// Poll every 5 seconds until the command is inactive or `timeout`
    /// elapses. At the deadline the latest (possibly still active) state is
    /// returned. Any transport failure ends the wait.
    pub async fn wait(&self, timeout: Option<Duration>) -> Result<ApiCommand, Error> {
        self.wait_with(WaitOptions {
            timeout,
            ..WaitOptions::default()
        })
        .await
    }

    pub async fn wait_with(&self, opts: WaitOptions) -> Result<ApiCommand, Error> {
        if self.is_synchronous() {
            return Ok(self.clone());
        }
        let root = ApiRoot::of(self)?;
        let path = self.command_path("")?;
        let deadline = opts.timeout.and_then(|t| Instant::now().checked_add(t));

        loop {
            let cmd: ApiCommand = Call::get(root.resource(), path.as_str()).one().await?;
            if !cmd.is_active() {
                return Ok(cmd);
            }
            let pause = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        debug!(id = cmd.id(), "command still active at deadline");
                        return Ok(cmd);
                    }
                    remaining.min(opts.poll_interval)
                }
                None => opts.poll_interval,
            };
            trace!(id = cmd.id(), ?pause, "command active, sleeping");
            sleep(pause).await;
        }
    }
}

impl ApiBulkCommandList {
    pub fn commands(&self) -> Vec<ApiCommand> {
        self.objects("items")
    }

    pub fn errors(&self) -> Vec<&str> {
        self.str_list_attr("errors")
    }
}

impl ApiRoot {
    /// `GET /commands/{id}`
    pub async fn get_command(&self, id: i64) -> Result<ApiCommand, Error> {
        Call::get(self.resource(), format!("commands/{id}"))
            .one()
            .await
    }
}

// ── Helpers for endpoint modules ────────────────────────────────────

/// `POST <resource>/commands/<name>`
pub(crate) fn command(resource: &Resource, name: &str) -> Call {
    Call::post(resource, format!("commands/{name}"))
}

/// `POST <resource>/roleCommands/<name>` with the role names as an envelope.
pub(crate) fn role_command(resource: &Resource, name: &str, role_names: &[&str]) -> Call {
    Call::post(resource, format!("roleCommands/{name}")).json(json!({ "items": role_names }))
}

/// `GET <resource>/commands`: commands currently running on the resource.
pub(crate) fn active_commands(resource: &Resource) -> Call {
    Call::get(resource, "commands")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::ApiObject;

    #[test]
    fn decodes_nested_children_and_refs() {
        let cmd = ApiCommand::from_json(
            None,
            &json!({
                "id": 7,
                "name": "Restart",
                "active": false,
                "success": true,
                "startTime": "2020-01-01T00:00:00.000000Z",
                "clusterRef": {"clusterName": "c1"},
                "children": {"items": [{"id": 8, "name": "Stop", "active": false}]}
            }),
        )
        .unwrap();
        assert_eq!(cmd.id(), Some(7));
        assert_eq!(cmd.success(), Some(true));
        assert!(!cmd.is_active());
        let children = cmd.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name(), Some("Stop"));
        let cluster = cmd.value("clusterRef").as_entity().unwrap();
        assert_eq!(cluster.str_attr("clusterName"), Some("c1"));
    }

    #[test]
    fn command_fields_are_read_only() {
        let mut cmd = ApiCommand::from_json(None, &json!({"id": 1, "active": true})).unwrap();
        assert!(cmd.set("active", false).is_err());
        assert!(cmd.is_active());
    }

    #[test]
    fn bulk_list_exposes_commands_and_errors() {
        let bulk = ApiBulkCommandList::from_json(
            None,
            &json!({"items": [{"id": 1}, {"id": 2}], "errors": ["role r3 not found"]}),
        )
        .unwrap();
        assert_eq!(bulk.commands().len(), 2);
        assert_eq!(bulk.errors(), vec!["role r3 not found"]);
    }

    #[tokio::test]
    async fn synchronous_command_needs_no_transport() {
        let cmd = ApiCommand::from_json(None, &json!({"id": -1, "active": false, "success": true}))
            .unwrap();
        assert!(cmd.is_synchronous());
        assert_eq!(cmd.fetch().await.unwrap(), cmd);
        assert_eq!(cmd.wait(None).await.unwrap(), cmd);
        assert_eq!(cmd.abort().await.unwrap(), cmd);
    }

    #[tokio::test]
    async fn unbound_command_is_detached() {
        let cmd = ApiCommand::from_json(None, &json!({"id": 3})).unwrap();
        assert!(matches!(cmd.fetch().await, Err(Error::Detached { .. })));
    }
}
