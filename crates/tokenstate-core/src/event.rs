//! Transfer event types — the boundary between the host decoder and the reducer.
//!
//! The host delivers raw events with JSON args (whatever the ABI decoder
//! produced). [`TransferEvent::from_raw`] validates that shape once, at the
//! boundary, so the reducer core can assume well-typed input.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ReducerError;

/// The zero address — sentinel for "no owner"; transfers to/from it are
/// burns/mints.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

// ─── Address ─────────────────────────────────────────────────────────────────

/// Failure to parse an EVM address.
#[derive(Debug, Error)]
#[error("invalid address '{0}': expected 0x-prefixed 40 hex digits")]
pub struct AddressError(String);

/// A validated EVM address (`0x` + 40 hex digits), stored lowercase.
///
/// Two addresses that differ only in case compare equal because parsing
/// normalizes them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse and normalize an address string.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| AddressError(s.to_string()))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressError(s.to_string()));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    /// The zero address.
    pub fn zero() -> Self {
        Self(ZERO_ADDRESS.to_string())
    }

    /// Returns `true` if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == ZERO_ADDRESS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// A Transfer event as delivered by the host's log decoder.
///
/// `args` is the raw decoded field map; it is only interpreted by
/// [`TransferEvent::from_raw`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransferEvent {
    /// Contract address that emitted the event.
    pub address: String,
    /// Decoded event arguments (`from`, `to`, `id`).
    pub args: serde_json::Value,
    /// Host-assigned event identifier (unique per applied event).
    pub event_id: String,
    /// Block number the event was included at.
    pub block_number: u64,
}

impl RawTransferEvent {
    /// The attribution handle for mutations caused by this event.
    pub fn event_ref(&self) -> EventRef {
        EventRef {
            event_id: self.event_id.clone(),
            end_block: self.block_number,
        }
    }
}

/// A validated, strongly typed Transfer event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    /// The token contract the event was emitted by.
    pub token_contract: Address,
    /// Previous owner (zero address on mint).
    pub from: Address,
    /// New owner (zero address on burn).
    pub to: Address,
    /// Token identifier within the contract, as a decimal string.
    pub token_id: String,
}

impl TransferEvent {
    /// Validate a raw event into a typed one.
    ///
    /// Fails fast with [`ReducerError::MalformedEvent`] naming the offending
    /// field — the reducer never guesses around a bad upstream shape.
    pub fn from_raw(raw: &RawTransferEvent) -> Result<Self, ReducerError> {
        let token_contract = Address::parse(&raw.address)
            .map_err(|e| ReducerError::malformed("address", e.to_string()))?;
        let from = address_arg(&raw.args, "from")?;
        let to = address_arg(&raw.args, "to")?;
        let token_id = match raw.args.get("id") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(_) => return Err(ReducerError::malformed("id", "not a string or integer")),
            None => return Err(ReducerError::malformed("id", "missing")),
        };
        Ok(Self {
            token_contract,
            from,
            to,
            token_id,
        })
    }
}

/// Extract and validate an address-valued argument.
fn address_arg(args: &serde_json::Value, field: &str) -> Result<Address, ReducerError> {
    let value = args
        .get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ReducerError::malformed(field, "missing or not a string"))?;
    Address::parse(value).map_err(|e| ReducerError::malformed(field, e.to_string()))
}

/// Identifies the event that caused a mutation, for later reversal.
///
/// The revert substrate requires every applied mutation to carry the causing
/// event's ID and the block it was included at (its validity window).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRef {
    /// Host-assigned event identifier.
    pub event_id: String,
    /// Block number the causing event was included at.
    pub end_block: u64,
}
