//! Canonical leaf encoding.
//!
//! A record is packed the way Solidity's `abi.encodePacked(uint256, address, uint256)`
//! lays it out: a 32-byte big-endian index, the 20 raw address bytes, and a
//! 32-byte big-endian amount. No padding is added around the address.

use crate::common::{keccak256, Address, Hash};
use crate::error::{DistributorError, Result};

const WORD_LEN: usize = 32;
const ADDRESS_LEN: usize = 20;

/// Length of an encoded leaf in bytes.
pub const ENCODED_LEAF_LEN: usize = WORD_LEN + ADDRESS_LEN + WORD_LEN;

/// One recipient's allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Record {
    pub index: u64,
    pub address: Address,
    pub amount: u128,
}

impl Record {
    pub fn new(index: u64, address: Address, amount: u128) -> Self {
        Self {
            index,
            address,
            amount,
        }
    }

    /// Builds a record from an unchecked address byte slice.
    pub fn from_parts(index: u64, address: &[u8], amount: u128) -> Result<Self> {
        let address: Address = address.try_into().map_err(|_| {
            DistributorError::Encoding(format!(
                "address must be {} bytes, got {}",
                ADDRESS_LEN,
                address.len()
            ))
        })?;
        Ok(Self::new(index, address, amount))
    }

    pub fn encode(&self) -> [u8; ENCODED_LEAF_LEN] {
        let mut out = [0u8; ENCODED_LEAF_LEN];
        out[..WORD_LEN].copy_from_slice(&u256_be(self.index as u128));
        out[WORD_LEN..WORD_LEN + ADDRESS_LEN].copy_from_slice(&self.address);
        out[WORD_LEN + ADDRESS_LEN..].copy_from_slice(&u256_be(self.amount));
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ENCODED_LEAF_LEN {
            return Err(DistributorError::Encoding(format!(
                "encoded leaf must be {} bytes, got {}",
                ENCODED_LEAF_LEN,
                bytes.len()
            )));
        }
        let index = read_u256(&bytes[..WORD_LEN], "index")?;
        let index = u64::try_from(index)
            .map_err(|_| DistributorError::Encoding(format!("index {index} exceeds u64")))?;
        let amount = read_u256(&bytes[WORD_LEN + ADDRESS_LEN..], "amount")?;
        Self::from_parts(index, &bytes[WORD_LEN..WORD_LEN + ADDRESS_LEN], amount)
    }

    /// Keccak-256 of the packed encoding.
    pub fn leaf_hash(&self) -> Hash {
        keccak256(&self.encode())
    }
}

fn u256_be(value: u128) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn read_u256(word: &[u8], field: &str) -> Result<u128> {
    if word[..16].iter().any(|b| *b != 0) {
        return Err(DistributorError::Encoding(format!(
            "{field} does not fit in 128 bits"
        )));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(low))
}
