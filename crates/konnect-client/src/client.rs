//! High-level client for the Connect REST API.
//!
//! Everything here is strictly sequential: each call is awaited to completion
//! before the next starts, and iteration order always matches the order the
//! server returned.

use crate::error::{Error, Result};
use crate::http::Http;
use crate::retry::{retry, RetryPolicy};
use crate::state::ConnectorState;
use crate::types::{ConnectorRollup, ConnectorStatus, TaskInfo, TaskStatus, TaskSummary};
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Outcome of a health check over all connectors and their tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Health {
    Healthy,
    /// Names the first connector or task found in a non-RUNNING state, or the
    /// connection failure that prevented the check.
    Unhealthy(String),
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Client for one Connect cluster, identified by its base URL.
///
/// Mutating operations and the single-connector getters run through the
/// configured [`RetryPolicy`]; the default policy makes exactly one attempt.
#[derive(Debug, Clone)]
pub struct ConnectClient {
    http: Http,
    retry: RetryPolicy,
}

impl ConnectClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_retry(base_url, RetryPolicy::default())
    }

    pub fn with_retry(base_url: &str, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            http: Http::new(base_url)?,
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Connector names in server-provided order.
    pub async fn connector_names(&self) -> Result<Vec<String>> {
        let value = self.fetch_json("/connectors").await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Aggregate health view for one connector: its own state max-reduced
    /// with every task's state, plus the ordinals of FAILED tasks.
    ///
    /// A connection or API failure while walking the tasks degrades the whole
    /// connector to FAILED, keeping whatever failed ordinals were already
    /// collected. Parse failures propagate instead of hiding behind the
    /// fallback.
    pub async fn rollup_connector(&self, name: &str) -> Result<ConnectorRollup> {
        let status = self.connector_status(name).await?;
        let mut state: ConnectorState = status.connector.state.parse()?;
        let mut failed_tasks = Vec::new();

        if let Err(err) = self
            .reduce_task_states(name, &mut state, &mut failed_tasks)
            .await
        {
            match err {
                Error::Connection(_) | Error::Api { .. } => {
                    debug!(connector = %name, error = %err, "task walk failed, reporting FAILED");
                    state = ConnectorState::Failed;
                }
                other => return Err(other),
            }
        }

        Ok(ConnectorRollup {
            connector: name.to_string(),
            state,
            failed_tasks,
        })
    }

    /// Rollup rows for every connector, in server order. One connector's
    /// task-fetch failure is isolated to that connector via the FAILED
    /// fallback and does not abort the batch.
    pub async fn rollup_all(&self) -> Result<Vec<ConnectorRollup>> {
        let mut rows = Vec::new();
        for name in self.connector_names().await? {
            rows.push(self.rollup_connector(&name).await?);
        }
        Ok(rows)
    }

    /// Strict check: healthy only if every connector's own state is RUNNING
    /// and every one of its tasks, fetched independently, is RUNNING. The
    /// first deviation short-circuits.
    ///
    /// Connection failures report as unhealthy rather than erroring; parse
    /// failures still propagate distinctly so a malformed deployment is not
    /// mistaken for an unhealthy one.
    pub async fn health_check(&self) -> Result<Health> {
        match self.check_all_running().await {
            Ok(health) => Ok(health),
            Err(Error::Connection(_)) => Ok(Health::Unhealthy(format!(
                "Connection to {} refused",
                self.base_url()
            ))),
            Err(err @ Error::Api { .. }) => Ok(Health::Unhealthy(err.to_string())),
            Err(other) => Err(other),
        }
    }

    /// Create a connector. The name is fetched first: an existing connector
    /// is a conflict unless `if_not_exists` was requested, a 404 proceeds to
    /// the creation POST, and any other fetch failure propagates as-is.
    pub async fn create(
        &self,
        name: &str,
        config: &Map<String, Value>,
        if_not_exists: bool,
    ) -> Result<Option<Value>> {
        retry(&self.retry, || self.try_create(name, config, if_not_exists)).await
    }

    /// `GET /connectors/{name}`.
    pub async fn get(&self, name: &str) -> Result<Value> {
        let path = format!("/connectors/{name}");
        retry(&self.retry, || self.fetch_json(&path)).await
    }

    /// `GET /connectors/{name}/config`.
    pub async fn configuration(&self, name: &str) -> Result<Value> {
        let path = format!("/connectors/{name}/config");
        retry(&self.retry, || self.fetch_json(&path)).await
    }

    /// Full replacement of the remote configuration, not a merge.
    pub async fn update(&self, name: &str, config: &Map<String, Value>) -> Result<Option<Value>> {
        let path = format!("/connectors/{name}/config");
        let body = Value::Object(config.clone());
        retry(&self.retry, || async {
            self.http.put(&path, Some(&body)).await
        })
        .await
    }

    pub async fn pause(&self, name: &str) -> Result<()> {
        let path = format!("/connectors/{name}/pause");
        retry(&self.retry, || async {
            self.http.put(&path, None).await.map(|_| ())
        })
        .await
    }

    pub async fn resume(&self, name: &str) -> Result<()> {
        let path = format!("/connectors/{name}/resume");
        retry(&self.retry, || async {
            self.http.put(&path, None).await.map(|_| ())
        })
        .await
    }

    pub async fn restart(&self, name: &str) -> Result<()> {
        let path = format!("/connectors/{name}/restart");
        retry(&self.retry, || async {
            self.http.post(&path, None).await.map(|_| ())
        })
        .await
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        let path = format!("/connectors/{name}");
        retry(&self.retry, || async {
            self.http.delete(&path).await.map(|_| ())
        })
        .await
    }

    /// Pause every connector whose name matches `pattern` (all of them when
    /// no pattern is given), in server order. Returns the affected names.
    pub async fn pause_all(&self, pattern: Option<&Regex>) -> Result<Vec<String>> {
        let names = self.matching_names(pattern).await?;
        for name in &names {
            self.pause(name).await?;
            debug!(connector = %name, "paused connector");
        }
        Ok(names)
    }

    /// Resume every matching connector, in server order.
    pub async fn resume_all(&self, pattern: Option<&Regex>) -> Result<Vec<String>> {
        let names = self.matching_names(pattern).await?;
        for name in &names {
            self.resume(name).await?;
            debug!(connector = %name, "resumed connector");
        }
        Ok(names)
    }

    /// Delete every matching connector, in server order.
    pub async fn delete_all(&self, pattern: Option<&Regex>) -> Result<Vec<String>> {
        let names = self.matching_names(pattern).await?;
        for name in &names {
            self.delete(name).await?;
            debug!(connector = %name, "deleted connector");
        }
        Ok(names)
    }

    /// Task rows for one connector, from the status payload.
    ///
    /// The connector itself is fetched first as an existence cross-check:
    /// the status endpoint keeps answering on its own even when the name is
    /// stale.
    pub async fn list_tasks(&self, connector: &str) -> Result<Vec<TaskSummary>> {
        self.fetch_json(&format!("/connectors/{connector}")).await?;
        let status = self.connector_status(connector).await?;
        Ok(status
            .tasks
            .into_iter()
            .map(|t| TaskSummary {
                task_id: t.id,
                state: t.state,
                trace: t.trace.unwrap_or_default(),
            })
            .collect())
    }

    /// `POST /connectors/{connector}/tasks/{task_id}/restart`.
    pub async fn restart_task(&self, connector: &str, task_id: u32) -> Result<()> {
        let path = format!("/connectors/{connector}/tasks/{task_id}/restart");
        retry(&self.retry, || async {
            self.http.post(&path, None).await.map(|_| ())
        })
        .await
    }

    async fn try_create(
        &self,
        name: &str,
        config: &Map<String, Value>,
        if_not_exists: bool,
    ) -> Result<Option<Value>> {
        match self.http.get(&format!("/connectors/{name}")).await {
            Ok(_) => {
                if if_not_exists {
                    Ok(None)
                } else {
                    Err(Error::Conflict(format!("Connector {name} already exists")))
                }
            }
            Err(err) if err.is_not_found() => {
                let body = json!({ "name": name, "config": config });
                self.http.post("/connectors", Some(&body)).await
            }
            Err(err) => Err(err),
        }
    }

    async fn check_all_running(&self) -> Result<Health> {
        for name in self.connector_names().await? {
            let status = self.connector_status(&name).await?;
            let state: ConnectorState = status.connector.state.parse()?;
            if state != ConnectorState::Running {
                return Ok(Health::Unhealthy(format!(
                    "Connector {name} in state {state}"
                )));
            }

            // Task ordinals are re-read from the task list and each status
            // fetched raw: the summary endpoint keeps reporting RUNNING when
            // the broker cluster is unreachable.
            for info in self.task_infos(&name).await? {
                let task = self.task_status(&name, info.id.task).await?;
                let task_state: ConnectorState = task.state.parse()?;
                if task_state != ConnectorState::Running {
                    return Ok(Health::Unhealthy(format!(
                        "Task {} of connector {} in state {}",
                        info.id.task, name, task.state
                    )));
                }
            }
        }
        Ok(Health::Healthy)
    }

    async fn reduce_task_states(
        &self,
        name: &str,
        state: &mut ConnectorState,
        failed_tasks: &mut Vec<u32>,
    ) -> Result<()> {
        for info in self.task_infos(name).await? {
            let task = self.task_status(name, info.id.task).await?;
            let task_state: ConnectorState = task.state.parse()?;
            if task_state == ConnectorState::Failed {
                failed_tasks.push(info.id.task);
            }
            *state = (*state).max(task_state);
        }
        Ok(())
    }

    async fn matching_names(&self, pattern: Option<&Regex>) -> Result<Vec<String>> {
        let names = self.connector_names().await?;
        Ok(match pattern {
            Some(re) => names.into_iter().filter(|n| re.is_match(n)).collect(),
            None => names,
        })
    }

    async fn connector_status(&self, name: &str) -> Result<ConnectorStatus> {
        let value = self
            .fetch_json(&format!("/connectors/{name}/status"))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn task_infos(&self, name: &str) -> Result<Vec<TaskInfo>> {
        let value = self.fetch_json(&format!("/connectors/{name}/tasks")).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn task_status(&self, name: &str, task_id: u32) -> Result<TaskStatus> {
        let value = self
            .fetch_json(&format!("/connectors/{name}/tasks/{task_id}/status"))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn fetch_json(&self, path: &str) -> Result<Value> {
        self.http
            .get(path)
            .await?
            .ok_or_else(|| Error::parse(format!("expected a JSON body from GET {path}")))
    }
}
