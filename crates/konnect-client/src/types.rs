//! Wire types for the Connect REST API and the derived views this client
//! produces. All of these are transient: parsed from one response, consumed,
//! and discarded at process exit.

use crate::state::ConnectorState;
use serde::{Deserialize, Serialize};

/// `GET /connectors/{name}/status` response.
#[derive(Debug, Deserialize)]
pub struct ConnectorStatus {
    pub connector: ConnectorStateInfo,
    #[serde(default)]
    pub tasks: Vec<TaskStatus>,
}

/// The connector's own reported state within the status payload.
#[derive(Debug, Deserialize)]
pub struct ConnectorStateInfo {
    pub state: String,
}

/// One task entry, as returned by the status summary and by
/// `GET /connectors/{name}/tasks/{id}/status`. The raw state string is kept
/// as-is; callers parse it when they need the ordering.
#[derive(Debug, Deserialize)]
pub struct TaskStatus {
    pub id: u32,
    pub state: String,
    #[serde(default)]
    pub trace: Option<String>,
}

/// One entry of `GET /connectors/{name}/tasks`.
#[derive(Debug, Deserialize)]
pub struct TaskInfo {
    pub id: TaskId,
}

/// Task identity: connector name plus integer ordinal.
#[derive(Debug, Deserialize)]
pub struct TaskId {
    pub connector: String,
    pub task: u32,
}

/// Aggregate health row produced by the rollup engine.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConnectorRollup {
    pub connector: String,
    pub state: ConnectorState,
    #[serde(rename = "failedTasks")]
    pub failed_tasks: Vec<u32>,
}

/// Row produced by the task-list command. `trace` defaults to the empty
/// string when the server omits it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskSummary {
    #[serde(rename = "taskId")]
    pub task_id: u32,
    pub state: String,
    pub trace: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_payload_decodes() {
        let payload = json!({
            "name": "orders-sink",
            "connector": { "state": "RUNNING", "worker_id": "10.0.0.1:8083" },
            "tasks": [
                { "id": 0, "state": "RUNNING", "worker_id": "10.0.0.1:8083" },
                { "id": 1, "state": "FAILED", "trace": "java.lang.NullPointerException" }
            ],
            "type": "sink"
        });

        let status: ConnectorStatus = serde_json::from_value(payload).unwrap();
        assert_eq!(status.connector.state, "RUNNING");
        assert_eq!(status.tasks.len(), 2);
        assert_eq!(status.tasks[1].id, 1);
        assert_eq!(
            status.tasks[1].trace.as_deref(),
            Some("java.lang.NullPointerException")
        );
        assert_eq!(status.tasks[0].trace, None);
    }

    #[test]
    fn test_task_list_payload_decodes() {
        let payload = json!([
            { "id": { "connector": "orders-sink", "task": 0 }, "config": {} }
        ]);

        let tasks: Vec<TaskInfo> = serde_json::from_value(payload).unwrap();
        assert_eq!(tasks[0].id.connector, "orders-sink");
        assert_eq!(tasks[0].id.task, 0);
    }

    #[test]
    fn test_rollup_row_serializes_with_camel_case_key() {
        let row = ConnectorRollup {
            connector: "orders-sink".to_string(),
            state: ConnectorState::Failed,
            failed_tasks: vec![0, 2],
        };

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(
            value,
            json!({ "connector": "orders-sink", "state": "FAILED", "failedTasks": [0, 2] })
        );
    }

    #[test]
    fn test_task_summary_serializes_with_camel_case_key() {
        let row = TaskSummary {
            task_id: 3,
            state: "RUNNING".to_string(),
            trace: String::new(),
        };

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(
            value,
            json!({ "taskId": 3, "state": "RUNNING", "trace": "" })
        );
    }
}
