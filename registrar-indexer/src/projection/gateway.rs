//! Contract gateway - auxiliary on-chain reads
//!
//! The winning-bid branch needs the deed contract created for a bid, which
//! the `BidRevealed` log does not carry. The registrar exposes it through
//! `entries(bytes32)`, whose second return word is the deed address.

use serde::Deserialize;
use shared::codec::{Address, CodecError, H256, concat, decode_hex, encode_hex};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// `bytes4(keccak256("entries(bytes32)"))`
pub const ENTRIES_SELECTOR: [u8; 4] = [0x26, 0x7b, 0x69, 0x22];

/// Gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("No deed known for label {label} at block {block_number}")]
    UnknownLabel { label: String, block_number: u64 },

    #[error("RPC request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed call result: {0}")]
    MalformedResult(String),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Failed to read deed map: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid deed map: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Read-only contract calls needed by the projection
pub trait ContractGateway: Send + Sync {
    /// Deed address reported by `registrar.entries(label)` at `block_number`
    fn deed_address(
        &self,
        registrar: &Address,
        label: &H256,
        block_number: u64,
    ) -> GatewayResult<Address>;
}

// ========== Static gateway ==========

/// One deed recorded for a label, valid from `from_block` until the next
/// entry for the same label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeedEntry {
    pub from_block: u64,
    pub deed: Address,
}

/// Deed map value: a single deed for the whole history, or one entry per
/// winning bid
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeedMapValue {
    Single(Address),
    History(Vec<DeedEntry>),
}

/// In-memory answers to `entries(label)` as of a block
///
/// Used for offline replays where the deed addresses were captured up front,
/// and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticGateway {
    /// Per label, sorted by `from_block`
    deeds: HashMap<H256, Vec<DeedEntry>>,
}

impl StaticGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// `deed` answers for `label` at every block
    pub fn with_deed(self, label: H256, deed: Address) -> Self {
        self.with_deed_at(label, 0, deed)
    }

    /// `deed` answers for `label` from `from_block` on
    pub fn with_deed_at(mut self, label: H256, from_block: u64, deed: Address) -> Self {
        self.insert(label, from_block, deed);
        self
    }

    /// Record a deed; an entry with the same `from_block` is replaced
    pub fn insert(&mut self, label: H256, from_block: u64, deed: Address) {
        let entries = self.deeds.entry(label).or_default();
        match entries.binary_search_by_key(&from_block, |e| e.from_block) {
            Ok(i) => entries[i].deed = deed,
            Err(i) => entries.insert(i, DeedEntry { from_block, deed }),
        }
    }

    /// Load a JSON object keyed by `"0x<label>"`
    ///
    /// Each value is either `"0x<deed>"` (valid at every block) or a list of
    /// `{"from_block": n, "deed": "0x<deed>"}`, one per winning bid.
    pub fn from_json_file(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let map: HashMap<H256, DeedMapValue> = serde_json::from_str(&raw)?;

        let mut gateway = Self::new();
        for (label, value) in map {
            match value {
                DeedMapValue::Single(deed) => gateway.insert(label, 0, deed),
                DeedMapValue::History(entries) => {
                    for entry in entries {
                        gateway.insert(label, entry.from_block, entry.deed);
                    }
                }
            }
        }
        Ok(gateway)
    }

    /// Number of deed entries across all labels
    pub fn len(&self) -> usize {
        self.deeds.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.deeds.is_empty()
    }
}

impl ContractGateway for StaticGateway {
    fn deed_address(
        &self,
        _registrar: &Address,
        label: &H256,
        block_number: u64,
    ) -> GatewayResult<Address> {
        self.deeds
            .get(label)
            .and_then(|entries| {
                entries
                    .iter()
                    .rev()
                    .find(|entry| entry.from_block <= block_number)
            })
            .map(|entry| entry.deed)
            .ok_or_else(|| GatewayError::UnknownLabel {
                label: label.to_hex(),
                block_number,
            })
    }
}

// ========== JSON-RPC gateway ==========

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// `eth_call` against an Ethereum JSON-RPC endpoint
///
/// Calls are pinned to the event's block so a replay observes the same deed
/// the live indexer did.
pub struct JsonRpcGateway {
    client: reqwest::blocking::Client,
    url: String,
    next_id: AtomicU64,
}

impl std::fmt::Debug for JsonRpcGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcGateway")
            .field("url", &self.url)
            .finish()
    }
}

impl JsonRpcGateway {
    pub fn new(url: impl Into<String>) -> GatewayResult<Self> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    fn eth_call(&self, to: &Address, data: &[u8], block_number: u64) -> GatewayResult<Vec<u8>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "eth_call",
            "params": [
                { "to": to.to_hex(), "data": encode_hex(data) },
                format!("0x{:x}", block_number),
            ],
        });

        tracing::debug!(rpc_id = id, to = %to, block_number, "eth_call");

        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        if let Some(err) = response.error {
            return Err(GatewayError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        let result = response
            .result
            .ok_or_else(|| GatewayError::MalformedResult("response has no result".to_string()))?;
        Ok(decode_hex(&result)?)
    }
}

impl ContractGateway for JsonRpcGateway {
    fn deed_address(
        &self,
        registrar: &Address,
        label: &H256,
        block_number: u64,
    ) -> GatewayResult<Address> {
        let output = self.eth_call(registrar, &entries_calldata(label), block_number)?;
        deed_from_entries_output(&output)
    }
}

/// ABI calldata for `entries(label)`
pub fn entries_calldata(label: &H256) -> Vec<u8> {
    concat(&ENTRIES_SELECTOR, label.as_bytes())
}

/// Extract the deed address from `entries` return data
///
/// The return tuple is `(uint8 mode, address deed, uint registrationDate,
/// uint value, uint highestBid)`; word 1 holds the left-padded address.
pub fn deed_from_entries_output(output: &[u8]) -> GatewayResult<Address> {
    let word = output.get(32..64).ok_or_else(|| {
        GatewayError::MalformedResult(format!(
            "entries() returned {} bytes, expected at least 64",
            output.len()
        ))
    })?;

    if word[..12].iter().any(|b| *b != 0) {
        return Err(GatewayError::MalformedResult(
            "deed word is not a left-padded address".to_string(),
        ));
    }

    Ok(Address::from_slice(&word[12..])?)
}
