//! Connector and task lifecycle states.
//!
//! The ordering is significant: a higher state is a "worse" state, and the
//! aggregate state of a connector is the maximum of its own reported state
//! and all of its tasks' states.

use crate::error::Error;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a connector or task.
///
/// Declaration order defines the severity ordering used for rollup:
/// `Unassigned < Running < Paused < Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConnectorState {
    Unassigned = 1,
    Running = 2,
    Paused = 3,
    Failed = 4,
}

impl ConnectorState {
    /// The exact name the REST API uses for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unassigned => "UNASSIGNED",
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ConnectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectorState {
    type Err = Error;

    /// Exact-name lookup. An unrecognized name is a distinct parse failure,
    /// not a generic error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNASSIGNED" => Ok(Self::Unassigned),
            "RUNNING" => Ok(Self::Running),
            "PAUSED" => Ok(Self::Paused),
            "FAILED" => Ok(Self::Failed),
            other => Err(Error::UnknownState(other.to_string())),
        }
    }
}

impl Serialize for ConnectorState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(ConnectorState::Unassigned < ConnectorState::Running);
        assert!(ConnectorState::Running < ConnectorState::Paused);
        assert!(ConnectorState::Paused < ConnectorState::Failed);
    }

    #[test]
    fn test_max_reduction() {
        let states = [
            ConnectorState::Running,
            ConnectorState::Unassigned,
            ConnectorState::Paused,
        ];
        let worst = states
            .iter()
            .copied()
            .fold(ConnectorState::Running, ConnectorState::max);
        assert_eq!(worst, ConnectorState::Paused);
    }

    #[test]
    fn test_parse_exact_names() {
        assert_eq!(
            "UNASSIGNED".parse::<ConnectorState>().unwrap(),
            ConnectorState::Unassigned
        );
        assert_eq!(
            "RUNNING".parse::<ConnectorState>().unwrap(),
            ConnectorState::Running
        );
        assert_eq!(
            "PAUSED".parse::<ConnectorState>().unwrap(),
            ConnectorState::Paused
        );
        assert_eq!(
            "FAILED".parse::<ConnectorState>().unwrap(),
            ConnectorState::Failed
        );
    }

    #[test]
    fn test_unknown_name_is_distinct_error() {
        let err = "running".parse::<ConnectorState>().unwrap_err();
        assert!(matches!(err, Error::UnknownState(ref s) if s == "running"));

        let err = "DESTROYED".parse::<ConnectorState>().unwrap_err();
        assert!(matches!(err, Error::UnknownState(_)));
    }

    #[test]
    fn test_serializes_as_api_name() {
        let json = serde_json::to_string(&ConnectorState::Failed).unwrap();
        assert_eq!(json, "\"FAILED\"");
    }
}
