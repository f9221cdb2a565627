//! Backend abstraction the dispatcher drives.
//!
//! [`ExecutionBackend`] is the minimal surface any execution environment
//! must offer; [`SnapshotBackend`] adds the state dump/load pair the query
//! strategy rolls back through.

use async_trait::async_trait;
use starkbridge_types::Felt;

use crate::errors::Result;
use crate::types::{ExecutionResources, InvokeOptions};

/// An event exactly as the backend emitted it: tag felts in `keys`,
/// payload felts in `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedEvent {
    pub from_address: Felt,
    pub keys: Vec<Felt>,
    pub data: Vec<Felt>,
}

/// Raw receipt returned by the backend, before translation.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReceipt {
    pub transaction_hash: Felt,
    pub block_number: u64,
    pub block_hash: Felt,
    pub caller: Felt,
    pub events: Vec<EmittedEvent>,
    pub resources: ExecutionResources,
    /// Return felts of the invoked entrypoint.
    pub result: Vec<Felt>,
    /// Set when execution failed; the message is backend-native.
    pub failure_reason: Option<String>,
}

/// Execution environment the dispatcher submits calls to.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Submit an invoke transaction, returning its hash immediately.
    async fn submit_invoke(
        &self,
        to: &Felt,
        entrypoint: &str,
        calldata: &[Felt],
        options: &InvokeOptions,
    ) -> Result<Felt>;

    /// Block until the transaction is included and return its receipt.
    async fn wait_for_inclusion(&self, transaction_hash: &Felt) -> Result<BackendReceipt>;

    /// Current head block number.
    async fn block_number(&self) -> Result<u64>;

    /// Register a compiled program, returning its class hash.
    async fn declare(&self, program: &[u8]) -> Result<Felt>;

    /// Instantiate a declared class, returning the new contract address.
    async fn deploy(&self, class_hash: &Felt, constructor_calldata: &[Felt]) -> Result<Felt>;
}

/// Backend whose whole state can be saved and restored under a tag.
#[async_trait]
pub trait SnapshotBackend: ExecutionBackend {
    /// Save the current state under `tag`, overwriting any previous dump.
    async fn dump(&self, tag: &str) -> Result<()>;

    /// Restore the state saved under `tag`.
    async fn load(&self, tag: &str) -> Result<()>;
}
