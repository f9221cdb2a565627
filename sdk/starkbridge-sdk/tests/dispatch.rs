//! Dispatcher behavior against an in-memory backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use num_bigint::BigInt;

use starkbridge_sdk::{
    BackendReceipt, Contract, ContractFactory, EmittedEvent, ExecutionBackend, ExecutionResources,
    InvokeOptions, SdkError, SnapshotBackend,
};
use starkbridge_sdk::errors::Result;
use starkbridge_types::{starknet_keccak, Abi, Felt, SolValue};

const ERC20_ABI: &str = r#"[
    {
        "type": "constructor",
        "inputs": [{"name": "supply", "type": "uint256"}]
    },
    {
        "type": "function",
        "name": "transfer",
        "stateMutability": "nonpayable",
        "inputs": [
            {"name": "to", "type": "address"},
            {"name": "amount", "type": "uint256"}
        ],
        "outputs": [{"name": "", "type": "bool"}]
    },
    {
        "type": "function",
        "name": "balanceOf",
        "stateMutability": "view",
        "inputs": [{"name": "owner", "type": "address"}],
        "outputs": [{"name": "", "type": "uint256"}]
    },
    {
        "type": "event",
        "name": "Transfer",
        "inputs": [
            {"name": "from", "type": "address"},
            {"name": "to", "type": "address"},
            {"name": "value", "type": "uint256"}
        ]
    }
]"#;

#[derive(Default)]
struct MockState {
    /// Chronological operation log, one entry per backend call.
    ops: Vec<String>,
    /// Receipts to hand out, keyed by entrypoint name.
    scripted: HashMap<String, BackendReceipt>,
    pending: HashMap<Felt, BackendReceipt>,
    next_hash: u64,
    head: u64,
    /// Stand-in for on-chain state, mutated by every invoke.
    counter: u64,
    snapshots: HashMap<String, u64>,
    deploy_calldata: Option<Vec<Felt>>,
}

#[derive(Default)]
struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    fn new(head: u64) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().head = head;
        backend
    }

    fn script(&self, entrypoint: &str, receipt: BackendReceipt) {
        self.state
            .lock()
            .unwrap()
            .scripted
            .insert(entrypoint.to_string(), receipt);
    }

    fn ops(&self) -> Vec<String> {
        self.state.lock().unwrap().ops.clone()
    }

    fn counter(&self) -> u64 {
        self.state.lock().unwrap().counter
    }
}

fn success_receipt(result: Vec<Felt>) -> BackendReceipt {
    BackendReceipt {
        transaction_hash: Felt::zero(),
        block_number: 5,
        block_hash: Felt::from_u64(0xb10c),
        caller: Felt::from_u64(0xca11e4),
        events: vec![],
        resources: ExecutionResources {
            steps: 100,
            ..Default::default()
        },
        result,
        failure_reason: None,
    }
}

#[async_trait]
impl ExecutionBackend for MockBackend {
    async fn submit_invoke(
        &self,
        _to: &Felt,
        entrypoint: &str,
        _calldata: &[Felt],
        _options: &InvokeOptions,
    ) -> Result<Felt> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("invoke:{}", entrypoint));
        state.counter += 1;

        let mut receipt = state
            .scripted
            .get(entrypoint)
            .cloned()
            .unwrap_or_else(|| success_receipt(vec![]));
        state.next_hash += 1;
        let hash = Felt::from_u64(state.next_hash);
        receipt.transaction_hash = hash.clone();
        state.pending.insert(hash.clone(), receipt);
        Ok(hash)
    }

    async fn wait_for_inclusion(&self, transaction_hash: &Felt) -> Result<BackendReceipt> {
        self.state
            .lock()
            .unwrap()
            .pending
            .remove(transaction_hash)
            .ok_or_else(|| SdkError::Backend("unknown transaction".to_string()))
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().head)
    }

    async fn declare(&self, program: &[u8]) -> Result<Felt> {
        let mut state = self.state.lock().unwrap();
        state.ops.push("declare".to_string());
        Ok(Felt::from_u64(program.len() as u64))
    }

    async fn deploy(&self, _class_hash: &Felt, constructor_calldata: &[Felt]) -> Result<Felt> {
        let mut state = self.state.lock().unwrap();
        state.ops.push("deploy".to_string());
        state.deploy_calldata = Some(constructor_calldata.to_vec());
        Ok(Felt::from_u64(0xadd4e55))
    }
}

#[async_trait]
impl SnapshotBackend for MockBackend {
    async fn dump(&self, tag: &str) -> Result<()> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.ops.push("dump".to_string());
        let counter = state.counter;
        state.snapshots.insert(tag.to_string(), counter);
        Ok(())
    }

    async fn load(&self, tag: &str) -> Result<()> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.ops.push("load".to_string());
        let counter = state
            .snapshots
            .get(tag)
            .copied()
            .ok_or_else(|| SdkError::Backend(format!("no snapshot {}", tag)))?;
        state.counter = counter;
        Ok(())
    }
}

fn contract(backend: Arc<MockBackend>) -> Contract<MockBackend> {
    let abi = Abi::from_json(ERC20_ABI).unwrap();
    Contract::new(backend, Felt::from_u64(0xc0), &abi)
}

fn transfer_tag() -> Felt {
    let abi = Abi::from_json(ERC20_ABI).unwrap();
    let event = abi.event("Transfer").unwrap();
    starknet_keccak(format!("{}_{}", event.name, event.topic().to_hex()).as_bytes())
}

#[test_log::test(tokio::test)]
async fn invoke_builds_full_receipt() {
    let backend = Arc::new(MockBackend::new(7));
    let handle = contract(backend.clone());

    let mut receipt = success_receipt(vec![Felt::one()]);
    receipt.events = vec![
        // this contract's Transfer: from=7, to=9, value=1000 (two limbs)
        EmittedEvent {
            from_address: Felt::from_u64(0xc0),
            keys: vec![transfer_tag()],
            data: vec![
                Felt::from_u64(7),
                Felt::from_u64(9),
                Felt::from_u64(1000),
                Felt::zero(),
            ],
        },
        // another contract's event, must be skipped
        EmittedEvent {
            from_address: Felt::from_u64(0xdd),
            keys: vec![transfer_tag()],
            data: vec![Felt::zero()],
        },
        // unknown tag, must be skipped
        EmittedEvent {
            from_address: Felt::from_u64(0xc0),
            keys: vec![Felt::from_u64(12345)],
            data: vec![],
        },
    ];
    backend.script("transfer_a9059cbb", receipt);

    let receipt = handle
        .invoke(
            "transfer",
            &[SolValue::from(9u64), SolValue::from(1000u64)],
            InvokeOptions::new(),
        )
        .await
        .unwrap();

    // entrypoint is the source name suffixed with the 4-byte selector
    assert_eq!(backend.ops(), vec!["invoke:transfer_a9059cbb"]);

    // Ethereum-side echo: selector plus two static words
    assert_eq!(&receipt.calldata[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
    assert_eq!(receipt.calldata.len(), 4 + 64);

    assert_eq!(receipt.block_number, 5);
    assert_eq!(receipt.confirmations, 3); // head 7, included at 5
    assert_eq!(receipt.gas_used, 5); // 100 steps * 0.05
    assert_eq!(receipt.from, Felt::from_u64(0xca11e4));

    assert_eq!(receipt.events.len(), 1);
    let log = &receipt.events[0];
    assert_eq!(log.name, "Transfer");
    assert_eq!(log.log_index, 0);
    assert_eq!(
        log.args.field("value"),
        Some(&SolValue::Number(BigInt::from(1000)))
    );
    assert_eq!(log.data.len(), 96);
}

#[test_log::test(tokio::test)]
async fn invoke_translates_revert_reason() {
    let backend = Arc::new(MockBackend::new(7));
    let handle = contract(backend.clone());

    let mut receipt = success_receipt(vec![]);
    receipt.failure_reason = Some(
        "Error at pc=0:42:\nError message: Insufficient balance\nAn ASSERT_EQ instruction failed"
            .to_string(),
    );
    backend.script("transfer_a9059cbb", receipt);

    let err = handle
        .invoke(
            "transfer",
            &[SolValue::from(9u64), SolValue::from(1000u64)],
            InvokeOptions::new(),
        )
        .await
        .unwrap_err();

    match err {
        SdkError::Reverted { reason, payload } => {
            assert_eq!(reason, "Insufficient balance");
            assert_eq!(&payload[..4], &[0x08, 0xc3, 0x79, 0xa0]);
        }
        other => panic!("expected revert, got {:?}", other),
    }
}

#[test_log::test(tokio::test)]
async fn query_rolls_back_and_decodes() {
    let backend = Arc::new(MockBackend::new(7));
    let handle = contract(backend.clone());
    backend.script("balanceOf_70a08231", success_receipt(vec![Felt::from_u64(42), Felt::zero()]));

    let before = backend.counter();
    let value = handle
        .query("balanceOf", &[SolValue::from(9u64)])
        .await
        .unwrap();

    assert_eq!(value, SolValue::Number(BigInt::from(42)));
    assert_eq!(
        backend.ops(),
        vec!["dump", "invoke:balanceOf_70a08231", "load"]
    );
    // the invoke's state change was rolled back
    assert_eq!(backend.counter(), before);
}

#[test_log::test(tokio::test)]
async fn query_restores_on_failure() {
    let backend = Arc::new(MockBackend::new(7));
    let handle = contract(backend.clone());

    let mut receipt = success_receipt(vec![]);
    receipt.failure_reason = Some("fee exceeds balance".to_string());
    backend.script("balanceOf_70a08231", receipt);

    let err = handle
        .query("balanceOf", &[SolValue::from(9u64)])
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Rejected(_)));

    // the snapshot was restored despite the failure
    assert_eq!(
        backend.ops(),
        vec!["dump", "invoke:balanceOf_70a08231", "load"]
    );
}

#[test_log::test(tokio::test)]
async fn concurrent_queries_are_serialized() {
    let backend = Arc::new(MockBackend::new(7));
    let handle = Arc::new(contract(backend.clone()));
    backend.script("balanceOf_70a08231", success_receipt(vec![Felt::from_u64(1), Felt::zero()]));

    let first_args = [SolValue::from(1u64)];
    let second_args = [SolValue::from(2u64)];
    let first = handle.query("balanceOf", &first_args);
    let second = handle.query("balanceOf", &second_args);
    let (a, b) = tokio::join!(first, second);
    a.unwrap();
    b.unwrap();

    // each query's dump/invoke/load bracket is uninterrupted
    assert_eq!(
        backend.ops(),
        vec![
            "dump",
            "invoke:balanceOf_70a08231",
            "load",
            "dump",
            "invoke:balanceOf_70a08231",
            "load",
        ]
    );
}

#[test_log::test(tokio::test)]
async fn sibling_handles_share_the_query_lock() {
    let backend = Arc::new(MockBackend::new(7));
    // two handles on the same backend, e.g. attached twice
    let first_handle = contract(backend.clone());
    let second_handle = contract(backend.clone());
    backend.script("balanceOf_70a08231", success_receipt(vec![Felt::from_u64(1), Felt::zero()]));

    let first_args = [SolValue::from(1u64)];
    let second_args = [SolValue::from(2u64)];
    let (a, b) = tokio::join!(
        first_handle.query("balanceOf", &first_args),
        second_handle.query("balanceOf", &second_args)
    );
    a.unwrap();
    b.unwrap();

    // the snapshot windows must not interleave across handles either
    assert_eq!(
        backend.ops(),
        vec![
            "dump",
            "invoke:balanceOf_70a08231",
            "load",
            "dump",
            "invoke:balanceOf_70a08231",
            "load",
        ]
    );
}

#[test_log::test(tokio::test)]
async fn unknown_function_is_rejected() {
    let backend = Arc::new(MockBackend::new(7));
    let handle = contract(backend);

    let err = handle
        .invoke("mint", &[], InvokeOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::UnknownFunction(name) if name == "mint"));

    assert_eq!(handle.methods().len(), 2);
    assert_eq!(
        handle.methods()["balanceOf"].entrypoint,
        "balanceOf_70a08231"
    );
}

#[test_log::test(tokio::test)]
async fn deploy_encodes_constructor_args() {
    let backend = Arc::new(MockBackend::new(7));
    let abi = Abi::from_json(ERC20_ABI).unwrap();
    let factory = ContractFactory::new(backend.clone(), abi);

    let handle = factory
        .deploy(&[0u8; 16], &[SolValue::from(1000u64)])
        .await
        .unwrap();

    assert_eq!(handle.address(), &Felt::from_u64(0xadd4e55));
    assert_eq!(backend.ops(), vec!["declare", "deploy"]);
    // uint256 constructor argument goes out as two limbs, low first
    assert_eq!(
        backend.state.lock().unwrap().deploy_calldata,
        Some(vec![Felt::from_u64(1000), Felt::zero()])
    );
}
