//! Derived entities and their deterministic record keys.
//!
//! Only [`Token`] is mutated by the Transfer reducer. [`Owner`] and
//! [`TokenContract`] are schema placeholders: registered so that other
//! processors sharing the store can rely on their lookup paths existing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::Address;

// ─── RecordId ────────────────────────────────────────────────────────────────

/// Deterministic string key of a record in the shared keyspace.
///
/// The key is the single source of truth for record existence; there is no
/// surrogate key. Token keys use the `Token_<contract>_<tokenID>` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// The Token key for a `(contract, tokenID)` pair.
    pub fn token(contract: &Address, token_id: &str) -> Self {
        Self(format!("Token_{contract}_{token_id}"))
    }

    /// The Owner key for an address.
    pub fn owner(address: &Address) -> Self {
        Self(format!("Owner_{address}"))
    }

    /// The TokenContract key for an address.
    pub fn token_contract(address: &Address) -> Self {
        Self(format!("TokenContract_{address}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Entities ────────────────────────────────────────────────────────────────

/// Entity type discriminant within the shared keyspace (the `kind` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Token,
    Owner,
    TokenContract,
}

impl EntityKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "Token",
            Self::Owner => "Owner",
            Self::TokenContract => "TokenContract",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current ownership of one token. Exists iff the token has a non-burned
/// owner: minting creates the record, burning deletes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Deterministic key (`Token_<contract>_<tokenID>`).
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Current owner.
    pub owner: Address,
    /// Token identifier within the contract.
    #[serde(rename = "tokenID")]
    pub token_id: String,
    /// The token contract address.
    #[serde(rename = "tokenContract")]
    pub token_contract: Address,
}

/// An address that owns tokens. Placeholder — never mutated by this reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub address: Address,
}

/// A registered token contract. Placeholder — never mutated by this reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenContract {
    pub address: Address,
}

/// Any record the store can hold; the `kind` tag discriminates entity types
/// within the shared keyspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Record {
    Token(Token),
    Owner(Owner),
    TokenContract(TokenContract),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Token(_) => EntityKind::Token,
            Self::Owner(_) => EntityKind::Owner,
            Self::TokenContract(_) => EntityKind::TokenContract,
        }
    }

    pub fn id(&self) -> RecordId {
        match self {
            Self::Token(t) => t.id.clone(),
            Self::Owner(o) => RecordId::owner(&o.address),
            Self::TokenContract(c) => RecordId::token_contract(&c.address),
        }
    }

    /// The record as a Token, if it is one.
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Self::Token(t) => Some(t),
            _ => None,
        }
    }
}
