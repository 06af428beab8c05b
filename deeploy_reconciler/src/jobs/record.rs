//! Escrow contract job records

use ethereum_types::U256;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// A job as read from the escrow contract. Identity is `id`.
///
/// Integer fields accept JSON numbers, decimal strings and `0x` hex strings, since
/// contract readers usually hand bigints over as text. `U256` fields serialize as
/// decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainJobRecord {
    #[serde(deserialize_with = "deserialize_u64")]
    pub id: u64,
    #[serde(default)]
    pub project_hash: String,
    #[serde(default, deserialize_with = "deserialize_u64")]
    pub job_type: u64,
    #[serde(
        default,
        deserialize_with = "deserialize_u256",
        serialize_with = "serialize_u256"
    )]
    pub balance: U256,
    #[serde(default, deserialize_with = "deserialize_u64")]
    pub request_timestamp: u64,
    #[serde(default, deserialize_with = "deserialize_u64")]
    pub start_timestamp: u64,
    #[serde(default, deserialize_with = "deserialize_u64")]
    pub last_execution_epoch: u64,
    #[serde(default, deserialize_with = "deserialize_u64")]
    pub last_nodes_change_timestamp: u64,
    #[serde(default, deserialize_with = "deserialize_u64")]
    pub number_of_nodes_requested: u64,
    #[serde(
        default,
        deserialize_with = "deserialize_u256",
        serialize_with = "serialize_u256"
    )]
    pub price_per_epoch: U256,
}

impl BlockchainJobRecord {
    pub fn new(id: u64, project_hash: &str) -> Self {
        Self {
            id,
            project_hash: project_hash.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntegerRepr {
    Number(u64),
    Text(String),
}

fn split_hex(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

fn deserialize_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match IntegerRepr::deserialize(deserializer)? {
        IntegerRepr::Number(value) => Ok(value),
        IntegerRepr::Text(text) => {
            let trimmed = text.trim();
            let parsed = match split_hex(trimmed) {
                Some(hex) => u64::from_str_radix(hex, 16).ok(),
                None => trimmed.parse::<u64>().ok(),
            };
            parsed.ok_or_else(|| de::Error::custom(format!("invalid u64 value {:?}", text)))
        }
    }
}

fn deserialize_u256<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    match IntegerRepr::deserialize(deserializer)? {
        IntegerRepr::Number(value) => Ok(U256::from(value)),
        IntegerRepr::Text(text) => {
            let trimmed = text.trim();
            let parsed = match split_hex(trimmed) {
                Some(hex) => U256::from_str_radix(hex, 16).ok(),
                None => U256::from_dec_str(trimmed).ok(),
            };
            parsed.ok_or_else(|| de::Error::custom(format!("invalid u256 value {:?}", text)))
        }
    }
}

fn serialize_u256<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}
