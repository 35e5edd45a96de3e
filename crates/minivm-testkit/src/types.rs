//! Fixture file format
//!
//! A fixture file is a JSON object mapping test names to cases. Byte strings,
//! words and addresses are hex with an optional `0x` prefix; map keys use the
//! same encoding.
//!
//! ```json
//! {
//!   "counter_in_storage": {
//!     "exec": { "code": "60016000540160005500", "gas": 10 },
//!     "pre": { "0xd00000000000000000000000000000000000000d": { "0x00": "0xbb" } },
//!     "expect": {
//!       "status": "success",
//!       "gas_left": 3,
//!       "storage": { "0xd00000000000000000000000000000000000000d": { "0x00": "0xbc" } }
//!     }
//!   }
//! }
//! ```

use minivm_core::{Revision, StatusCode};
use minivm_primitives::{Address, Word};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Hex-encoded bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s)
            .map(HexBytes)
            .map_err(serde::de::Error::custom)
    }
}

/// Hex-encoded word, left-padded; odd digit counts are accepted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct HexWord(pub Word);

impl<'de> Deserialize<'de> for HexWord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        let padded = if s.len() % 2 == 1 {
            format!("0{}", s)
        } else {
            s.to_string()
        };
        Word::from_hex(&padded)
            .map(HexWord)
            .map_err(serde::de::Error::custom)
    }
}

/// Hex-encoded address (20 bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct HexAddress(pub Address);

impl<'de> Deserialize<'de> for HexAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        Address::from_hex(&s)
            .map(HexAddress)
            .map_err(serde::de::Error::custom)
    }
}

/// Storage of several accounts
pub type StorageMap = BTreeMap<HexAddress, BTreeMap<HexWord, HexWord>>;

/// Fixture file structure (test name -> case)
pub type FixtureFile = BTreeMap<String, Fixture>;

/// Single fixture case
#[derive(Debug, Deserialize)]
pub struct Fixture {
    /// Revision to execute under
    #[serde(default)]
    pub revision: Revision,
    /// Message and code
    pub exec: FixtureExec,
    /// Transaction context served by the host
    #[serde(default)]
    pub env: FixtureEnv,
    /// Result the host returns for nested calls
    #[serde(default)]
    pub call_result: Option<FixtureCallResult>,
    /// Storage before execution
    #[serde(default)]
    pub pre: StorageMap,
    /// Expected outcome
    pub expect: FixtureExpect,
}

/// Execution parameters
#[derive(Debug, Deserialize)]
pub struct FixtureExec {
    /// Executing account
    #[serde(default = "default_destination")]
    pub address: HexAddress,
    /// Caller
    #[serde(default = "default_sender")]
    pub caller: HexAddress,
    /// Code to execute
    pub code: HexBytes,
    /// Call data
    #[serde(default)]
    pub data: HexBytes,
    /// Gas provided
    pub gas: i64,
    /// Value transferred
    #[serde(default)]
    pub value: HexWord,
    /// Static call
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Call depth
    #[serde(default)]
    pub depth: i32,
}

fn default_destination() -> HexAddress {
    HexAddress(Address::from_bytes(DEFAULT_DESTINATION))
}

fn default_sender() -> HexAddress {
    HexAddress(Address::from_bytes(DEFAULT_SENDER))
}

/// Executing account used when a fixture names none
pub const DEFAULT_DESTINATION: [u8; 20] = [
    0xd0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x0d,
];

/// Caller used when a fixture names none
pub const DEFAULT_SENDER: [u8; 20] = [
    0x50, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x05,
];

/// Block and transaction fields
#[derive(Debug, Default, Deserialize)]
pub struct FixtureEnv {
    /// Block number
    #[serde(default)]
    pub number: u64,
    /// Block timestamp
    #[serde(default)]
    pub timestamp: u64,
    /// Transaction origin
    #[serde(default)]
    pub origin: HexAddress,
    /// Chain ID, 1 if absent
    #[serde(default)]
    pub chain_id: Option<HexWord>,
}

/// Canned nested-call result
#[derive(Debug, Deserialize)]
pub struct FixtureCallResult {
    /// Status
    pub status: StatusCode,
    /// Remaining gas
    #[serde(default)]
    pub gas_left: i64,
    /// Output
    #[serde(default)]
    pub output: HexBytes,
}

/// Expected outcome
#[derive(Debug, Deserialize)]
pub struct FixtureExpect {
    /// Status
    pub status: StatusCode,
    /// Remaining gas
    pub gas_left: i64,
    /// Output, empty if absent
    #[serde(default)]
    pub output: HexBytes,
    /// Storage slots to check after execution
    #[serde(default)]
    pub storage: StorageMap,
    /// Number of nested calls made
    #[serde(default)]
    pub calls: Option<usize>,
}
