use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::row::RawTransactionRow;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Error while encoding JSON for OFX row: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Canonical encoding of a row: compact JSON, keys in `RowField` order.
///
/// `/` is written unescaped (`"2024/01/15"`), so hashes of rows that carry a
/// date differ from ones produced by encoders that emit `\/`. Hashes stored
/// by such systems are not recognised as duplicates.
pub fn canonical_json(row: &RawTransactionRow) -> Result<String, HashError> {
    Ok(serde_json::to_string(row)?)
}

/// SHA-256 of the row's canonical encoding, as lowercase hex.
pub fn row_hash(row: &RawTransactionRow) -> Result<String, HashError> {
    let json = canonical_json(row)?;
    Ok(to_hex(&sha256_bytes(json.as_bytes())))
}

/// The form an import hash is stored in as journal metadata (a JSON string).
pub fn stored_form(hash: &str) -> Result<String, HashError> {
    Ok(serde_json::to_string(hash)?)
}

pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Encode a raw 32-byte hash as a lowercase hex string (64 chars).
pub fn to_hex(hash: &[u8; 32]) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::RowField;

    fn sample_row() -> RawTransactionRow {
        RawTransactionRow::new()
            .with(RowField::Type, "DEBIT")
            .with(RowField::Amount, "-49.99")
            .with(RowField::Date, "2024/01/15")
            .with(RowField::Name, "AMAZON")
            .with(RowField::Memo, "")
    }

    #[test]
    fn sha256_bytes_known_vector() {
        assert_eq!(
            to_hex(&sha256_bytes(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn canonical_json_uses_fixed_key_order() {
        assert_eq!(
            canonical_json(&sample_row()).unwrap(),
            r#"{"type":"DEBIT","amount":"-49.99","date":"2024/01/15","name":"AMAZON","memo":""}"#
        );
    }

    #[test]
    fn canonical_json_leaves_slashes_unescaped() {
        let json = canonical_json(&sample_row()).unwrap();
        assert!(json.contains(r#""date":"2024/01/15""#));
        assert!(!json.contains(r"\/"));
    }

    #[test]
    fn row_hash_is_hash_of_canonical_json() {
        let row = sample_row();
        let expected = to_hex(&sha256_bytes(canonical_json(&row).unwrap().as_bytes()));
        assert_eq!(row_hash(&row).unwrap(), expected);
        assert_eq!(row_hash(&row).unwrap().len(), 64);
    }

    #[test]
    fn row_hash_deterministic() {
        assert_eq!(row_hash(&sample_row()).unwrap(), row_hash(&sample_row()).unwrap());
    }

    #[test]
    fn insertion_order_does_not_change_hash() {
        let reversed = RawTransactionRow::new()
            .with(RowField::Memo, "")
            .with(RowField::Name, "AMAZON")
            .with(RowField::Date, "2024/01/15")
            .with(RowField::Amount, "-49.99")
            .with(RowField::Type, "DEBIT");
        assert_eq!(row_hash(&reversed).unwrap(), row_hash(&sample_row()).unwrap());
    }

    #[test]
    fn any_value_change_changes_hash() {
        let other = sample_row().with(RowField::Amount, "-49.98");
        assert_ne!(row_hash(&other).unwrap(), row_hash(&sample_row()).unwrap());
    }

    #[test]
    fn stored_form_is_json_string() {
        assert_eq!(stored_form("abc123").unwrap(), "\"abc123\"");
    }
}
