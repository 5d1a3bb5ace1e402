//! Client library for the Kafka Connect REST API.
//!
//! Queries and mutates the lifecycle of connectors and their tasks over
//! HTTP, aggregates task states into a worst-case connector state, and wraps
//! mutating calls in a bounded retry that only retries connection-level
//! failures.
//!
//! ```rust,ignore
//! use konnect_client::ConnectClient;
//!
//! let client = ConnectClient::new("http://localhost:8083")?;
//! for row in client.rollup_all().await? {
//!     println!("{} is {}", row.connector, row.state);
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod retry;
pub mod state;
pub mod types;

pub use client::{ConnectClient, Health};
pub use error::{Error, Result};
pub use retry::{retry, RetryPolicy};
pub use state::ConnectorState;
pub use types::{ConnectorRollup, TaskSummary};
