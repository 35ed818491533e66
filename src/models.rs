//! Response bodies.
//!
//! Every endpoint answers with the same envelope, `{"ok": true, "result": ...}`
//! or `{"ok": false, "error": "...", "code": N}`. The result types below cover the
//! endpoints with a stable shape; the rest are returned as [`serde_json::Value`].

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The response envelope shared by all endpoints.
///
/// `result` stays raw JSON until the caller decodes it into the endpoint's type;
/// an absent `result` reads as `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct TonResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
}

impl TonResponse {
    /// The result of a successful response, or the error it reports.
    pub fn into_result(self) -> Result<Value, ApiError> {
        if self.ok {
            return Ok(self.result);
        }
        Err(ApiError {
            code: self.code.unwrap_or_default(),
            message: self
                .error
                .unwrap_or_else(|| "request failed without an error message".to_string()),
        })
    }
}

/// An error reported by the API inside a response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("API error {code}: {message}")]
pub struct ApiError {
    #[serde(default)]
    pub code: i64,
    #[serde(rename = "error")]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "@type", rename = "ton.blockIdExt")]
pub struct BlockIdExt {
    pub workchain: i32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub shard: i64,
    pub seqno: i32,
    pub root_hash: String,
    pub file_hash: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "@type", rename = "blocks.masterchainInfo")]
pub struct MasterchainInfo {
    pub last: BlockIdExt,
    pub state_root_hash: String,
    pub init: BlockIdExt,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "@type", rename = "blocks.shards")]
pub struct Shards {
    pub shards: Vec<BlockIdExt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConsensusBlock {
    pub consensus_block: i64,
    pub timestamp: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "@type", rename = "internal.transactionId")]
pub struct InternalTransactionId {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub lt: i64,
    pub hash: String,
}

/// Result of `getAddressInformation`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AddressInformation {
    /// Balance in nanotons.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub balance: i64,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub data: String,
    pub last_transaction_id: InternalTransactionId,
    #[serde(default)]
    pub block_id: Option<BlockIdExt>,
    #[serde(default)]
    pub frozen_hash: String,
    #[serde(default)]
    pub sync_utime: i64,
    /// `uninitialized`, `active` or `frozen`.
    #[serde(default)]
    pub state: String,
}

/// Result of `getWalletInformation`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WalletInformation {
    pub wallet: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub balance: i64,
    pub account_state: String,
    #[serde(default)]
    pub wallet_type: Option<String>,
    #[serde(default)]
    pub seqno: Option<i64>,
    #[serde(default)]
    pub wallet_id: Option<i64>,
    pub last_transaction_id: InternalTransactionId,
}

/// TON serialises 64-bit values as strings; accept either form.
pub fn deserialize_number_from_string<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    <T as FromStr>::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt<T> {
        String(String),
        Number(T),
    }

    match StringOrInt::<T>::deserialize(deserializer)? {
        StringOrInt::String(s) => s.parse::<T>().map_err(serde::de::Error::custom),
        StringOrInt::Number(i) => Ok(i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block_json(seqno: i32) -> serde_json::Value {
        json!({
            "@type": "ton.blockIdExt",
            "workchain": -1,
            "shard": "-9223372036854775808",
            "seqno": seqno,
            "root_hash": "cm9vdA==",
            "file_hash": "ZmlsZQ=="
        })
    }

    #[test]
    fn ok_envelope_yields_result() {
        let response: TonResponse = serde_json::from_value(json!({
            "ok": true,
            "result": {
                "@type": "blocks.masterchainInfo",
                "last": block_json(40_000_000),
                "state_root_hash": "c3RhdGU=",
                "init": block_json(0),
                "@extra": "1700000000.1:0:0.5"
            }
        }))
        .unwrap();

        let info: MasterchainInfo =
            serde_json::from_value(response.into_result().unwrap()).unwrap();
        assert_eq!(info.last.seqno, 40_000_000);
        assert_eq!(info.last.shard, i64::MIN);
        assert_eq!(info.init.workchain, -1);
    }

    #[test]
    fn error_envelope_yields_api_error() {
        let response: TonResponse = serde_json::from_value(json!({
            "ok": false,
            "error": "LITE_SERVER_UNKNOWN: cannot load block",
            "code": 500
        }))
        .unwrap();

        let err = response.into_result().unwrap_err();
        assert_eq!(err.code, 500);
        assert_eq!(err.message, "LITE_SERVER_UNKNOWN: cannot load block");
        assert_eq!(
            err.to_string(),
            "API error 500: LITE_SERVER_UNKNOWN: cannot load block"
        );
    }

    #[test]
    fn ok_with_null_or_missing_result_is_null() {
        for body in [json!({ "ok": true, "result": null }), json!({ "ok": true })] {
            let response: TonResponse = serde_json::from_value(body).unwrap();
            assert_eq!(response.into_result().unwrap(), Value::Null);
        }
    }

    #[test]
    fn null_result_does_not_decode_as_a_typed_model() {
        let response: TonResponse =
            serde_json::from_value(json!({ "ok": true, "result": null })).unwrap();
        let result = response.into_result().unwrap();
        assert!(serde_json::from_value::<MasterchainInfo>(result.clone()).is_err());
        assert_eq!(serde_json::from_value::<Option<String>>(result).unwrap(), None);
    }

    #[test]
    fn error_without_message() {
        let response: TonResponse = serde_json::from_value(json!({ "ok": false })).unwrap();
        let err = response.into_result().unwrap_err();
        assert_eq!(err.code, 0);
        assert_eq!(err.message, "request failed without an error message");
    }

    #[test]
    fn address_information_accepts_string_numbers() {
        let info: AddressInformation = serde_json::from_value(json!({
            "@type": "raw.fullAccountState",
            "balance": "1234567890",
            "code": "",
            "data": "",
            "last_transaction_id": {
                "@type": "internal.transactionId",
                "lt": "44000000000001",
                "hash": "aGFzaA=="
            },
            "block_id": block_json(100),
            "frozen_hash": "",
            "sync_utime": 1700000000,
            "state": "active"
        }))
        .unwrap();

        assert_eq!(info.balance, 1_234_567_890);
        assert_eq!(info.last_transaction_id.lt, 44_000_000_000_001);
        assert_eq!(info.block_id.map(|b| b.seqno), Some(100));
        assert_eq!(info.state, "active");
    }

    #[test]
    fn wallet_information_optional_fields() {
        let wallet: WalletInformation = serde_json::from_value(json!({
            "wallet": false,
            "balance": 0,
            "account_state": "uninitialized",
            "last_transaction_id": {
                "@type": "internal.transactionId",
                "lt": "0",
                "hash": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="
            }
        }))
        .unwrap();

        assert!(!wallet.wallet);
        assert_eq!(wallet.balance, 0);
        assert_eq!(wallet.wallet_type, None);
        assert_eq!(wallet.seqno, None);
    }

    #[test]
    fn shards_and_consensus_block() {
        let shards: Shards = serde_json::from_value(json!({
            "@type": "blocks.shards",
            "shards": [{
                "@type": "ton.blockIdExt",
                "workchain": 0,
                "shard": "-9223372036854775808",
                "seqno": 45_000_000,
                "root_hash": "cm9vdA==",
                "file_hash": "ZmlsZQ=="
            }]
        }))
        .unwrap();
        assert_eq!(shards.shards.len(), 1);
        assert_eq!(shards.shards[0].workchain, 0);

        let consensus: ConsensusBlock = serde_json::from_value(json!({
            "consensus_block": 39_999_998,
            "timestamp": 1700000000.25
        }))
        .unwrap();
        assert_eq!(consensus.consensus_block, 39_999_998);
    }
}
