//! # EVM On-Ramp Adapter
//!
//! Submits `commitAggregate` as a signed legacy transaction over JSON-RPC
//! and polls for the receipt.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Bytes, B256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use shared_rpc::{parse_quantity, JsonRpcClient, RpcError};
use shared_types::onramp::{abi, to_abi_address};
use shared_types::{EthAddress, U256};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::signer::{LegacyTransaction, TxSigner};
use crate::domain::{CommitReceipt, CommitRequest, EngineError};
use crate::ports::OnRampContract;

/// ABI-encoded `commitAggregate` call data.
pub fn encode_commit(request: &CommitRequest) -> Vec<u8> {
    abi::commitAggregateCall {
        aggregate: Bytes::from(request.aggregate.to_bytes()),
        ids: request.offer_ids.clone(),
        inclusionProofs: request
            .proofs
            .iter()
            .map(|proof| abi::ProofData {
                index: proof.index,
                path: proof.path.iter().map(|node| B256::from(*node)).collect(),
            })
            .collect(),
        payoutAddr: to_abi_address(request.payout),
    }
    .abi_encode()
}

fn hex_address(address: &EthAddress) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

fn parse_u256(value: &str) -> Result<U256, RpcError> {
    let digits = value.trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16).map_err(|e| RpcError::Parse(format!("{}: {}", value, e)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionReceipt {
    transaction_hash: String,
    block_number: Option<String>,
    status: Option<String>,
}

/// On-ramp contract reached through an EVM JSON-RPC endpoint.
pub struct EvmOnRamp {
    client: Arc<JsonRpcClient>,
    contract: EthAddress,
    signer: TxSigner,
    poll_interval: Duration,
}

impl EvmOnRamp {
    /// Create an adapter committing to `contract` with `signer`.
    pub fn new(
        client: Arc<JsonRpcClient>,
        contract: EthAddress,
        signer: TxSigner,
        poll_interval: Duration,
    ) -> Self {
        Self {
            client,
            contract,
            signer,
            poll_interval,
        }
    }

    /// Address the commit transactions are sent from.
    pub fn sender(&self) -> EthAddress {
        self.signer.address()
    }

    async fn build_transaction(
        &self,
        data: Vec<u8>,
    ) -> Result<(LegacyTransaction, u64), EngineError> {
        let from = hex_address(&self.signer.address());
        let to = hex_address(&self.contract);

        let chain_id: String = self.client.call("eth_chainId", [(); 0]).await?;
        let nonce: String = self
            .client
            .call("eth_getTransactionCount", json!([from, "pending"]))
            .await?;
        let gas_price: String = self.client.call("eth_gasPrice", [(); 0]).await?;
        let gas: String = self
            .client
            .call(
                "eth_estimateGas",
                json!([{
                    "from": from,
                    "to": to,
                    "data": format!("0x{}", hex::encode(&data)),
                }]),
            )
            .await?;

        let tx = LegacyTransaction {
            nonce: parse_quantity(&nonce)?,
            gas_price: parse_u256(&gas_price)?,
            gas_limit: parse_quantity(&gas)?,
            to: self.contract,
            value: U256::zero(),
            data,
        };
        Ok((tx, parse_quantity(&chain_id)?))
    }

    async fn wait_mined(
        &self,
        tx_hash: &str,
        cancel: &CancellationToken,
    ) -> Result<CommitReceipt, EngineError> {
        loop {
            let poll = self
                .client
                .call_optional::<_, TransactionReceipt>("eth_getTransactionReceipt", json!([tx_hash]));
            let receipt = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(EngineError::Cancelled),
                receipt = poll => receipt?,
            };

            if let Some(receipt) = receipt {
                let block_number = receipt
                    .block_number
                    .as_deref()
                    .map(parse_quantity)
                    .transpose()?;
                return Ok(CommitReceipt {
                    tx_hash: receipt.transaction_hash,
                    block_number,
                    success: receipt.status.as_deref() == Some("0x1"),
                });
            }

            debug!(tx = tx_hash, "[xc-03] Commit not mined yet");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(EngineError::Cancelled),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

#[async_trait]
impl OnRampContract for EvmOnRamp {
    async fn commit_aggregate(
        &self,
        request: &CommitRequest,
        cancel: &CancellationToken,
    ) -> Result<CommitReceipt, EngineError> {
        let (tx, chain_id) = self.build_transaction(encode_commit(request)).await?;
        let signed = self.signer.sign(&tx, chain_id)?;
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let tx_hash: String = self
            .client
            .call("eth_sendRawTransaction", json!([signed.raw_hex()]))
            .await?;
        info!(
            tx = %tx_hash,
            nonce = tx.nonce,
            gas = tx.gas_limit,
            offers = request.offer_ids.len(),
            "[xc-03] Commit transaction sent"
        );

        self.wait_mined(&tx_hash, cancel).await
    }
}
