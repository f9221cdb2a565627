//! HTTP gateway client, the default [`ExecutionBackend`] implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use starkbridge_types::Felt;

use crate::backend::{BackendReceipt, EmittedEvent, ExecutionBackend, SnapshotBackend};
use crate::errors::{Result, SdkError};
use crate::types::{ExecutionResources, InvokeOptions};

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Gateway client talking JSON over HTTP to a devnet-style node.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    url: String,
    receipt_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct TransactionHashResponse {
    transaction_hash: String,
}

#[derive(Debug, Deserialize)]
struct BlockNumberResponse {
    block_number: u64,
}

#[derive(Debug, Deserialize)]
struct ClassHashResponse {
    class_hash: String,
}

#[derive(Debug, Deserialize)]
struct DeployResponse {
    address: String,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    from_address: String,
    keys: Vec<String>,
    data: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawReceipt {
    transaction_hash: String,
    block_number: u64,
    block_hash: String,
    caller: String,
    #[serde(default)]
    events: Vec<RawEvent>,
    #[serde(default)]
    execution_resources: ExecutionResources,
    #[serde(default)]
    result: Vec<String>,
    #[serde(default)]
    failure_reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    contract_address: String,
    entry_point: &'a str,
    calldata: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_fee: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nonce: Option<u64>,
}

impl GatewayClient {
    /// Create a client against the given base URL.
    pub fn new(url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            http,
            url: url.into(),
            receipt_timeout: Duration::from_secs(60),
        }
    }

    /// Override how long to poll for a receipt before giving up.
    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .http
            .post(format!("{}/{}", self.url, path))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(SdkError::Backend(format!("{}: {}", status, message)));
        }
        Ok(response.json().await?)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let response = self
            .http
            .get(format!("{}/{}", self.url, path))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(SdkError::Backend(format!("{}: {}", status, message)));
        }
        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl ExecutionBackend for GatewayClient {
    async fn submit_invoke(
        &self,
        to: &Felt,
        entrypoint: &str,
        calldata: &[Felt],
        options: &InvokeOptions,
    ) -> Result<Felt> {
        let request = InvokeRequest {
            contract_address: to.to_hex(),
            entry_point: entrypoint,
            calldata: calldata.iter().map(Felt::to_hex).collect(),
            max_fee: options.max_fee,
            nonce: options.nonce,
        };
        debug!(%to, entrypoint, felts = calldata.len(), "submit invoke");
        let response: TransactionHashResponse =
            self.post("invoke", serde_json::to_value(&request).map_err(
                |e| SdkError::Backend(e.to_string()),
            )?)
            .await?;
        parse_felt(&response.transaction_hash)
    }

    async fn wait_for_inclusion(&self, transaction_hash: &Felt) -> Result<BackendReceipt> {
        let path = format!("receipt/{}", transaction_hash.to_hex());
        let start = std::time::Instant::now();

        loop {
            if let Some(raw) = self.get::<RawReceipt>(&path).await? {
                return parse_receipt(raw);
            }
            if start.elapsed() > self.receipt_timeout {
                return Err(SdkError::Timeout(format!(
                    "no receipt for {} after {:?}",
                    transaction_hash, self.receipt_timeout
                )));
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }

    async fn block_number(&self) -> Result<u64> {
        let response: BlockNumberResponse = self
            .get("block_number")
            .await?
            .ok_or_else(|| SdkError::Backend("no block number".to_string()))?;
        Ok(response.block_number)
    }

    async fn declare(&self, program: &[u8]) -> Result<Felt> {
        let response: ClassHashResponse = self
            .post("declare", json!({ "program": hex::encode(program) }))
            .await?;
        parse_felt(&response.class_hash)
    }

    async fn deploy(&self, class_hash: &Felt, constructor_calldata: &[Felt]) -> Result<Felt> {
        let response: DeployResponse = self
            .post(
                "deploy",
                json!({
                    "class_hash": class_hash.to_hex(),
                    "constructor_calldata": constructor_calldata
                        .iter()
                        .map(Felt::to_hex)
                        .collect::<Vec<_>>(),
                }),
            )
            .await?;
        parse_felt(&response.address)
    }
}

#[async_trait]
impl SnapshotBackend for GatewayClient {
    async fn dump(&self, tag: &str) -> Result<()> {
        let _: serde_json::Value = self.post("dump", json!({ "tag": tag })).await?;
        Ok(())
    }

    async fn load(&self, tag: &str) -> Result<()> {
        let _: serde_json::Value = self.post("load", json!({ "tag": tag })).await?;
        Ok(())
    }
}

fn parse_felt(hex: &str) -> Result<Felt> {
    Ok(hex.parse()?)
}

fn parse_felts(hex: &[String]) -> Result<Vec<Felt>> {
    hex.iter().map(|h| parse_felt(h)).collect()
}

fn parse_receipt(raw: RawReceipt) -> Result<BackendReceipt> {
    let events = raw
        .events
        .into_iter()
        .map(|event| {
            Ok(EmittedEvent {
                from_address: parse_felt(&event.from_address)?,
                keys: parse_felts(&event.keys)?,
                data: parse_felts(&event.data)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(BackendReceipt {
        transaction_hash: parse_felt(&raw.transaction_hash)?,
        block_number: raw.block_number,
        block_hash: parse_felt(&raw.block_hash)?,
        caller: parse_felt(&raw.caller)?,
        events,
        resources: raw.execution_resources,
        result: parse_felts(&raw.result)?,
        failure_reason: raw.failure_reason,
    })
}
