//! Declare-and-deploy factory producing contract handles.

use std::sync::Arc;
use tracing::info;

use starkbridge_transcode::encode;
use starkbridge_types::{Abi, Felt, SolValue};

use crate::backend::SnapshotBackend;
use crate::contract::Contract;
use crate::errors::Result;

/// Factory binding one ABI to one backend.
pub struct ContractFactory<B> {
    backend: Arc<B>,
    abi: Abi,
}

impl<B> ContractFactory<B> {
    pub fn new(backend: Arc<B>, abi: Abi) -> Self {
        Self { backend, abi }
    }

    /// Wrap an already deployed contract.
    pub fn attach(&self, address: Felt) -> Contract<B> {
        Contract::new(self.backend.clone(), address, &self.abi)
    }
}

impl<B: SnapshotBackend> ContractFactory<B> {
    /// Declare the compiled program, deploy an instance with the encoded
    /// constructor arguments and return its handle.
    pub async fn deploy(&self, program: &[u8], args: &[SolValue]) -> Result<Contract<B>> {
        let constructor_calldata = encode(&self.abi.constructor_inputs, args)?;
        let class_hash = self.backend.declare(program).await?;
        let address = self
            .backend
            .deploy(&class_hash, &constructor_calldata)
            .await?;
        info!(%class_hash, %address, "contract deployed");
        Ok(self.attach(address))
    }
}
