//! Contract handle: method dispatch, receipt translation, query rollback.
//!
//! The method table is fixed at construction from the ABI; dispatch is by
//! source-side function name. Read-only calls run as real invokes bracketed
//! by a state snapshot and restore, serialized per backend so concurrent
//! queries cannot restore each other's snapshots.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, Weak};
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use uuid::Uuid;

use starkbridge_transcode::abi::abi_encode;
use starkbridge_transcode::{decode, encode, EventRegistry};
use starkbridge_types::{Abi, Felt, Function, Param, SolValue};

use crate::backend::{BackendReceipt, SnapshotBackend};
use crate::errors::{translate_failure, Result, SdkError};
use crate::types::{CallReceipt, EventLog, InvokeOptions};

/// Query locks keyed by backend instance. The snapshot window must be
/// serialized per backend, not per handle: two contracts sharing a backend
/// would otherwise restore each other's snapshots.
static QUERY_LOCKS: Lazy<StdMutex<HashMap<usize, Weak<Mutex<()>>>>> =
    Lazy::new(|| StdMutex::new(HashMap::new()));

fn query_lock_for<B>(backend: &Arc<B>) -> Arc<Mutex<()>> {
    let key = Arc::as_ptr(backend) as usize;
    let mut locks = QUERY_LOCKS.lock().unwrap_or_else(|e| e.into_inner());
    locks.retain(|_, weak| weak.strong_count() > 0);
    if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
        return lock;
    }
    let lock = Arc::new(Mutex::new(()));
    locks.insert(key, Arc::downgrade(&lock));
    lock
}

/// How a method executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// State-changing call, submitted as-is.
    Invoke,
    /// Read-only call, executed under snapshot rollback.
    Query,
}

/// One dispatchable method.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    /// Destination entrypoint, the source name suffixed with the selector.
    pub entrypoint: String,
    pub selector: [u8; 4],
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub kind: CallKind,
}

impl Method {
    fn from_function(function: &Function) -> Self {
        let selector = function.selector();
        Self {
            name: function.name.clone(),
            entrypoint: format!("{}_{}", function.name, hex::encode(selector)),
            selector,
            inputs: function.inputs.clone(),
            outputs: function.outputs.clone(),
            kind: if function.state_mutability.is_readonly() {
                CallKind::Query
            } else {
                CallKind::Invoke
            },
        }
    }
}

/// Handle to one deployed contract.
pub struct Contract<B> {
    backend: Arc<B>,
    address: Felt,
    methods: HashMap<String, Method>,
    events: EventRegistry,
    query_lock: Arc<Mutex<()>>,
}

impl<B> Contract<B> {
    /// Build the handle, deriving the method table and event registry from
    /// the ABI.
    pub fn new(backend: Arc<B>, address: Felt, abi: &Abi) -> Self {
        let mut methods: HashMap<String, Method> = HashMap::new();
        for function in &abi.functions {
            // on duplicate base names the first declaration wins
            methods
                .entry(function.name.clone())
                .or_insert_with(|| Method::from_function(function));
        }
        Self {
            query_lock: query_lock_for(&backend),
            backend,
            address,
            methods,
            events: EventRegistry::from_events(&abi.events),
        }
    }

    pub fn address(&self) -> &Felt {
        &self.address
    }

    /// Look up a method by source name.
    pub fn method(&self, name: &str) -> Result<&Method> {
        self.methods
            .get(name)
            .ok_or_else(|| SdkError::UnknownFunction(name.to_string()))
    }

    /// The whole method table, for callers preferring uniform dispatch.
    pub fn methods(&self) -> &HashMap<String, Method> {
        &self.methods
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }
}

impl<B: SnapshotBackend> Contract<B> {
    /// Dispatch by the method's declared mutability: queries roll back,
    /// everything else is a plain invoke. Invokes return their decoded
    /// output too, queries synthesize an empty receipt.
    pub async fn call(
        &self,
        name: &str,
        args: &[SolValue],
        options: InvokeOptions,
    ) -> Result<(SolValue, Option<CallReceipt>)> {
        match self.method(name)?.kind {
            CallKind::Query => Ok((self.query(name, args).await?, None)),
            CallKind::Invoke => {
                let receipt = self.invoke(name, args, options).await?;
                let method = self.method(name)?;
                let output = decode(&method.outputs, &receipt.return_data)?;
                Ok((output, Some(receipt)))
            }
        }
    }

    /// Submit a state-changing call and wait for its receipt.
    #[instrument(skip(self, args, options), fields(contract = %self.address))]
    pub async fn invoke(
        &self,
        name: &str,
        args: &[SolValue],
        options: InvokeOptions,
    ) -> Result<CallReceipt> {
        let method = self.method(name)?;
        let calldata = encode(&method.inputs, args)?;
        // what the same call would have looked like on the source chain
        let mut eth_calldata = method.selector.to_vec();
        eth_calldata.extend(abi_encode(&method.inputs, args)?);

        let transaction_hash = self
            .backend
            .submit_invoke(&self.address, &method.entrypoint, &calldata, &options)
            .await?;
        let receipt = self.backend.wait_for_inclusion(&transaction_hash).await?;

        if let Some(failure) = &receipt.failure_reason {
            return Err(translate_failure(failure));
        }
        self.translate_receipt(receipt, eth_calldata).await
    }

    /// Execute a read-only call under snapshot rollback and decode its
    /// return value.
    ///
    /// The state is dumped under a fresh tag, the call runs for real, and
    /// the dump is restored whether the call succeeded or not. Queries
    /// against the same backend are serialized, across handles too.
    #[instrument(skip(self, args), fields(contract = %self.address))]
    pub async fn query(&self, name: &str, args: &[SolValue]) -> Result<SolValue> {
        let method = self.method(name)?;
        let calldata = encode(&method.inputs, args)?;

        let _guard = self.query_lock.lock().await;
        let tag = format!("query-{}", Uuid::new_v4());
        self.backend.dump(&tag).await?;
        debug!(%tag, method = name, "query snapshot taken");

        let outcome = self.run_query(method, &calldata).await;
        // the restore must happen even when the call failed
        self.backend.load(&tag).await?;

        outcome
    }

    async fn run_query(&self, method: &Method, calldata: &[Felt]) -> Result<SolValue> {
        let transaction_hash = self
            .backend
            .submit_invoke(
                &self.address,
                &method.entrypoint,
                calldata,
                &InvokeOptions::default(),
            )
            .await?;
        let receipt = self.backend.wait_for_inclusion(&transaction_hash).await?;

        if let Some(failure) = &receipt.failure_reason {
            return Err(translate_failure(failure));
        }
        Ok(decode(&method.outputs, &receipt.result)?)
    }

    /// Assemble the caller-facing receipt: confirmations against the
    /// current head and decoded logs for this contract's own events.
    async fn translate_receipt(
        &self,
        receipt: BackendReceipt,
        calldata: Vec<u8>,
    ) -> Result<CallReceipt> {
        let head = self.backend.block_number().await?;
        let confirmations = head.saturating_sub(receipt.block_number) + 1;

        let mut events = Vec::new();
        for emitted in &receipt.events {
            // other contracts' events and unregistered tags are skipped
            if emitted.from_address != self.address {
                continue;
            }
            let Some(tag) = emitted.keys.first() else {
                continue;
            };
            if let Some(decoded) = self.events.decode_event(tag, &emitted.data)? {
                events.push(EventLog {
                    address: emitted.from_address.clone(),
                    block_number: receipt.block_number,
                    block_hash: receipt.block_hash.clone(),
                    log_index: events.len() as u64,
                    tag: decoded.tag,
                    name: decoded.name,
                    args: decoded.args,
                    data: decoded.data,
                    topic: decoded.topic,
                });
            }
        }

        Ok(CallReceipt {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            block_hash: receipt.block_hash,
            from: receipt.caller,
            gas_used: receipt.resources.gas_equivalent(),
            confirmations,
            events,
            return_data: receipt.result,
            calldata,
        })
    }
}
