//! Content hashing for deterministic output verification.
//!
//! Produces a SHA-256 digest of serialized instruction data so two runs of
//! the same scene can be compared byte-for-byte.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::ChoreoResult;

/// SHA-256 digest of an instruction stream. Displays as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl From<[u8; 32]> for ContentHash {
    fn from(digest: [u8; 32]) -> Self {
        ContentHash(digest)
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

/// Hash a sequence of records, each framed by its length so that
/// `["ab", "c"]` and `["a", "bc"]` differ.
pub fn hash_records<I, B>(records: I) -> ContentHash
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    let mut count: u64 = 0;
    for record in records {
        let bytes = record.as_ref();
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
        count += 1;
    }
    hasher.update(count.to_le_bytes());
    let mut digest = [0u8; 32];
    digest.copy_from_slice(hasher.finalize().as_slice());
    ContentHash::from(digest)
}

/// Hash the canonical JSON encoding of each item.
pub fn hash_json<'a, T, I>(items: I) -> ChoreoResult<ContentHash>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let encoded = items
        .into_iter()
        .map(serde_json::to_vec)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(hash_records(encoded))
}
