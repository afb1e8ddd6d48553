//! Distribution document construction.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::balances::BalanceMap;
use crate::common::{hex_encode, parse_address, parse_hash, Hash};
use crate::error::{DistributorError, Result};
use crate::leaf::Record;
use crate::merkle::{verify_proof, MerkleTree};

/// One recipient's entry: enough to redeem the allocation on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub index: u64,
    /// Hex-encoded amount, e.g. `"0x64"`.
    pub amount: String,
    pub proof: Vec<String>,
}

/// The published artifact: root, total, and a claim per recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionDocument {
    pub merkle_root: String,
    pub token_total: String,
    pub claims: IndexMap<String, Claim>,
}

/// Assign indices in iteration order, build the tree and collect every proof.
pub fn build_distribution(balances: &BalanceMap) -> Result<DistributionDocument> {
    let mut records = Vec::with_capacity(balances.len());
    let mut total: u128 = 0;
    for (index, (address, amount)) in balances.iter().enumerate() {
        let record = Record::new(index as u64, parse_address(address)?, amount.0);
        total = total.checked_add(record.amount).ok_or_else(|| {
            DistributorError::Encoding("token total overflows 128 bits".to_string())
        })?;
        records.push(record);
    }

    let tree = MerkleTree::from_records(&records)?;

    let mut claims = IndexMap::with_capacity(records.len());
    for record in &records {
        let proof = tree.proof(record)?;
        let claim = Claim {
            index: record.index,
            amount: hex_amount(record.amount),
            proof: proof.iter().map(hex_encode).collect(),
        };
        if claims.insert(hex_encode(record.address), claim).is_some() {
            return Err(DistributorError::Encoding(format!(
                "duplicate entry for {}",
                hex_encode(record.address)
            )));
        }
    }

    let root = hex_encode(tree.root());
    info!("Merkle root: {} ({} claims)", root, claims.len());

    Ok(DistributionDocument {
        merkle_root: root,
        token_total: hex_amount(total),
        claims,
    })
}

/// Lowercase hex with a `0x` prefix and no leading zeros.
pub fn hex_amount(amount: u128) -> String {
    format!("{amount:#x}")
}

/// Inverse of [`hex_amount`]. The `0x` prefix is required; document amounts
/// are never decimal.
pub fn parse_hex_amount(text: &str) -> Result<u128> {
    let digits = text.trim().strip_prefix("0x").ok_or_else(|| {
        DistributorError::Encoding(format!("amount {text:?} is missing the 0x prefix"))
    })?;
    u128::from_str_radix(digits, 16)
        .map_err(|e| DistributorError::Encoding(format!("invalid hex amount {text:?}: {e}")))
}

impl Claim {
    /// Rebuild the record this claim commits to.
    pub fn record(&self, address: &str) -> Result<Record> {
        let amount = parse_hex_amount(&self.amount)?;
        Ok(Record::new(self.index, parse_address(address)?, amount))
    }

    pub fn proof_hashes(&self) -> Result<Vec<Hash>> {
        self.proof.iter().map(|p| parse_hash(p)).collect()
    }
}

/// Outcome of checking a whole document against its own root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    pub claims: usize,
    /// Addresses whose proof does not fold to the root.
    pub invalid_proofs: Vec<String>,
    pub computed_total: String,
    pub total_matches: bool,
    /// Indices are exactly `0..claims`.
    pub indices_contiguous: bool,
}

impl AuditReport {
    pub fn is_ok(&self) -> bool {
        self.invalid_proofs.is_empty() && self.total_matches && self.indices_contiguous
    }
}

impl DistributionDocument {
    /// Read a JSON document such as the distribution stage's cache entry.
    pub fn read_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| DistributorError::Serialize(format!("{}: {}", path.display(), e)))
    }

    pub fn root(&self) -> Result<Hash> {
        parse_hash(&self.merkle_root)
    }

    /// Check one claim's proof against the document root.
    pub fn verify_claim(&self, address: &str) -> Result<bool> {
        let claim = self
            .claims
            .get(address)
            .ok_or_else(|| DistributorError::NotFound(address.to_string()))?;
        let record = claim.record(address)?;
        Ok(verify_proof(
            &claim.proof_hashes()?,
            &record.leaf_hash(),
            &self.root()?,
        ))
    }

    /// Verify every claim and recompute the token total.
    pub fn audit(&self) -> Result<AuditReport> {
        let mut invalid_proofs = Vec::new();
        let mut total: u128 = 0;
        let mut indices = Vec::with_capacity(self.claims.len());

        for (address, claim) in &self.claims {
            if !self.verify_claim(address)? {
                invalid_proofs.push(address.clone());
            }
            let amount = parse_hex_amount(&claim.amount)?;
            total = total.checked_add(amount).ok_or_else(|| {
                DistributorError::Encoding("token total overflows 128 bits".to_string())
            })?;
            indices.push(claim.index);
        }
        indices.sort_unstable();
        let indices_contiguous = indices
            .iter()
            .enumerate()
            .all(|(expected, index)| *index == expected as u64);

        let declared = parse_hex_amount(&self.token_total)?;
        Ok(AuditReport {
            claims: self.claims.len(),
            invalid_proofs,
            computed_total: hex_amount(total),
            total_matches: declared == total,
            indices_contiguous,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balances::Amount;
    use crate::common::pair_hash;

    const ADDR_A: &str = "0x1111111111111111111111111111111111111111";
    const ADDR_B: &str = "0x2222222222222222222222222222222222222222";

    fn balances(entries: &[(&str, u128)]) -> BalanceMap {
        entries
            .iter()
            .map(|(addr, amount)| (addr.to_string(), Amount(*amount)))
            .collect()
    }

    #[test]
    fn test_two_recipient_scenario() {
        let doc = build_distribution(&balances(&[(ADDR_A, 100), (ADDR_B, 200)])).unwrap();

        let ha = Record::new(0, parse_address(ADDR_A).unwrap(), 100).leaf_hash();
        let hb = Record::new(1, parse_address(ADDR_B).unwrap(), 200).leaf_hash();

        assert_eq!(doc.merkle_root, hex_encode(pair_hash(&ha, &hb)));
        assert_eq!(doc.token_total, "0x12c");
        assert_eq!(doc.claims[ADDR_A].index, 0);
        assert_eq!(doc.claims[ADDR_A].amount, "0x64");
        assert_eq!(doc.claims[ADDR_A].proof, vec![hex_encode(hb)]);
        assert_eq!(doc.claims[ADDR_B].index, 1);
        assert_eq!(doc.claims[ADDR_B].amount, "0xc8");
        assert_eq!(doc.claims[ADDR_B].proof, vec![hex_encode(ha)]);

        assert!(doc.verify_claim(ADDR_A).unwrap());
        assert!(doc.verify_claim(ADDR_B).unwrap());
    }

    #[test]
    fn test_single_recipient() {
        let doc = build_distribution(&balances(&[(ADDR_A, 5)])).unwrap();
        let leaf = Record::new(0, parse_address(ADDR_A).unwrap(), 5).leaf_hash();
        assert_eq!(doc.merkle_root, hex_encode(leaf));
        assert!(doc.claims[ADDR_A].proof.is_empty());
    }

    #[test]
    fn test_empty_balances() {
        let result = build_distribution(&BalanceMap::new());
        assert!(matches!(result, Err(DistributorError::EmptySet)));
    }

    #[test]
    fn test_total_overflow() {
        let result = build_distribution(&balances(&[(ADDR_A, u128::MAX), (ADDR_B, 1)]));
        assert!(matches!(result, Err(DistributorError::Encoding(_))));
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let mut map = balances(&[(ADDR_A, 1)]);
        map.insert(ADDR_A.trim_start_matches("0x").to_string(), Amount(2));
        assert!(matches!(
            build_distribution(&map),
            Err(DistributorError::Encoding(_))
        ));
    }

    #[test]
    fn test_malformed_address_is_encoding_error() {
        let result = build_distribution(&balances(&[("0x1234", 1)]));
        assert!(matches!(result, Err(DistributorError::Encoding(_))));
    }

    #[test]
    fn test_zero_address_recipient() {
        let zero = "0x0000000000000000000000000000000000000000";
        let doc = build_distribution(&balances(&[(zero, 100), (ADDR_B, 200)])).unwrap();
        assert_eq!(doc.claims[zero].index, 0);
        assert_eq!(doc.token_total, "0x12c");
        assert!(doc.verify_claim(zero).unwrap());
        assert!(doc.verify_claim(ADDR_B).unwrap());
    }

    #[test]
    fn test_parse_hex_amount() {
        assert_eq!(parse_hex_amount("0x64").unwrap(), 100);
        assert_eq!(parse_hex_amount(&hex_amount(u128::MAX)).unwrap(), u128::MAX);
        assert!(matches!(
            parse_hex_amount("64"),
            Err(DistributorError::Encoding(_))
        ));
        assert!(parse_hex_amount("0xzz").is_err());
    }

    #[test]
    fn test_prefixless_amount_is_rejected_not_read_as_decimal() {
        let mut doc = build_distribution(&balances(&[(ADDR_A, 100), (ADDR_B, 200)])).unwrap();
        doc.claims[ADDR_A].amount = "64".to_string();
        assert!(matches!(
            doc.claims[ADDR_A].record(ADDR_A),
            Err(DistributorError::Encoding(_))
        ));
        assert!(doc.audit().is_err());
    }

    #[test]
    fn test_zero_amount_claim() {
        let doc = build_distribution(&balances(&[(ADDR_A, 0), (ADDR_B, 7)])).unwrap();
        assert_eq!(doc.claims[ADDR_A].amount, "0x0");
        assert_eq!(doc.token_total, "0x7");
        assert!(doc.verify_claim(ADDR_A).unwrap());
    }

    #[test]
    fn test_json_roundtrip_and_field_names() {
        let doc = build_distribution(&balances(&[(ADDR_A, 100), (ADDR_B, 200)])).unwrap();
        let json = serde_json::to_string_pretty(&doc).unwrap();
        assert!(json.contains("\"merkleRoot\""));
        assert!(json.contains("\"tokenTotal\""));
        let back: DistributionDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
        assert_eq!(serde_json::to_string_pretty(&back).unwrap(), json);
    }

    #[test]
    fn test_claims_follow_input_order() {
        let doc = build_distribution(&balances(&[(ADDR_B, 1), (ADDR_A, 2)])).unwrap();
        let keys: Vec<&str> = doc.claims.keys().map(String::as_str).collect();
        assert_eq!(keys, vec![ADDR_B, ADDR_A]);
        assert_eq!(doc.claims[ADDR_B].index, 0);
    }

    #[test]
    fn test_audit_accepts_built_document() {
        let doc = build_distribution(&balances(&[
            (ADDR_A, 10),
            (ADDR_B, 20),
            ("0x3333333333333333333333333333333333333333", 30),
        ]))
        .unwrap();
        let report = doc.audit().unwrap();
        assert!(report.is_ok());
        assert_eq!(report.claims, 3);
        assert_eq!(report.computed_total, "0x3c");
    }

    #[test]
    fn test_audit_flags_tampering() {
        let mut doc = build_distribution(&balances(&[(ADDR_A, 10), (ADDR_B, 20)])).unwrap();
        doc.claims[ADDR_A].amount = hex_amount(11);
        let report = doc.audit().unwrap();
        assert_eq!(report.invalid_proofs, vec![ADDR_A.to_string()]);
        assert!(!report.total_matches);
        assert!(!report.is_ok());
    }

    #[test]
    fn test_audit_flags_index_gap() {
        let mut doc = build_distribution(&balances(&[(ADDR_A, 10), (ADDR_B, 20)])).unwrap();
        doc.claims[ADDR_B].index = 5;
        let report = doc.audit().unwrap();
        assert!(!report.indices_contiguous);
        assert_eq!(report.invalid_proofs, vec![ADDR_B.to_string()]);
    }

    #[test]
    fn test_read_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("distribution.json");
        let doc = build_distribution(&balances(&[(ADDR_A, 1), (ADDR_B, 2)])).unwrap();
        std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
        assert_eq!(DistributionDocument::read_json(&path).unwrap(), doc);

        std::fs::write(&path, "{}").unwrap();
        assert!(matches!(
            DistributionDocument::read_json(&path),
            Err(DistributorError::Serialize(_))
        ));
    }

    #[test]
    fn test_verify_claim_unknown_address() {
        let doc = build_distribution(&balances(&[(ADDR_A, 1)])).unwrap();
        assert!(matches!(
            doc.verify_claim(ADDR_B),
            Err(DistributorError::NotFound(_))
        ));
    }
}
