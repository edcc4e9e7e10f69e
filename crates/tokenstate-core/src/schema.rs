//! Index declarations for the shared entity keyspace.
//!
//! Declared once, at setup, before any event is processed. The `eventID` and
//! `endBlock` indexes are required by the revertable-indexing substrate; a
//! store that supports reversal rejects a schema without them.

use serde::{Deserialize, Serialize};

/// One lookup index over a set of record fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDeclaration {
    pub fields: Vec<String>,
}

impl IndexDeclaration {
    /// Declare an index on the given fields, in order.
    pub fn on(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

/// The full set of indexes a processor requires from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDeclaration {
    pub indexes: Vec<IndexDeclaration>,
}

impl SchemaDeclaration {
    /// The index set for the ERC-721 ownership table.
    pub fn erc721_ownership() -> Self {
        Self {
            indexes: vec![
                IndexDeclaration::on(&["eventID"]),  // required by the revert substrate
                IndexDeclaration::on(&["endBlock"]), // required by the revert substrate
                IndexDeclaration::on(&["kind"]),
                IndexDeclaration::on(&["tokenContract", "tokenID", "owner"]),
                IndexDeclaration::on(&["address"]), // Owner & TokenContract
            ],
        }
    }

    /// Returns `true` if an index on exactly these fields is declared.
    pub fn declares(&self, fields: &[&str]) -> bool {
        self.indexes
            .iter()
            .any(|ix| ix.fields.iter().map(String::as_str).eq(fields.iter().copied()))
    }

    /// Returns `true` if the revert-substrate indexes are present.
    pub fn has_revert_indexes(&self) -> bool {
        self.declares(&["eventID"]) && self.declares(&["endBlock"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_schema_declares_all_indexes() {
        let schema = SchemaDeclaration::erc721_ownership();
        assert_eq!(schema.indexes.len(), 5);
        assert!(schema.declares(&["kind"]));
        assert!(schema.declares(&["tokenContract", "tokenID", "owner"]));
        assert!(schema.declares(&["address"]));
        assert!(schema.has_revert_indexes());
    }

    #[test]
    fn declares_matches_exact_field_sets_only() {
        let schema = SchemaDeclaration::erc721_ownership();
        assert!(!schema.declares(&["tokenContract"]));
        assert!(!schema.declares(&["tokenContract", "tokenID"]));
        assert!(!schema.declares(&["owner", "tokenID", "tokenContract"])); // order matters
    }

    #[test]
    fn missing_revert_indexes_detected() {
        let schema = SchemaDeclaration {
            indexes: vec![IndexDeclaration::on(&["kind"])],
        };
        assert!(!schema.has_revert_indexes());
    }
}
