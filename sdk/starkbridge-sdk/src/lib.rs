//! Contract dispatch over transcoded calldata.
//!
//! A [`Contract`] handle owns a fixed method table derived from an
//! Ethereum ABI and dispatches calls through an [`ExecutionBackend`].
//! State-changing calls are plain invokes; read-only calls run under
//! snapshot rollback on a [`SnapshotBackend`]. Receipts come back with
//! decoded logs, gas-equivalent cost and Ethereum-style revert errors.

pub mod backend;
pub mod client;
pub mod contract;
pub mod errors;
pub mod factory;
pub mod types;

pub use backend::{BackendReceipt, EmittedEvent, ExecutionBackend, SnapshotBackend};
pub use client::GatewayClient;
pub use contract::{CallKind, Contract, Method};
pub use errors::{translate_failure, Result, SdkError};
pub use factory::ContractFactory;
pub use types::{CallReceipt, EventLog, ExecutionResources, InvokeOptions};
