//! Block domain entities
//!
//! Headers keep the legacy wire shape: the transition is signalled by
//! sentinel field values (zero difficulty, zero nonce, empty uncle hash)
//! rather than by a dedicated mode field. [`Phase`] is the explicit form of
//! that signal once a header has been classified.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use shared_types::{Address, BlockNonce, Hash, U256};

/// Keccak-256 of the empty uncle list encoding.
pub const EMPTY_UNCLE_HASH: Hash = [
    0x1d, 0xcc, 0x4d, 0xe8, 0xde, 0xc7, 0x5d, 0x7a, 0xab, 0x85, 0xb5, 0x67, 0xb6, 0xcc, 0xd4, 0x1a,
    0xd3, 0x12, 0x45, 0x1b, 0x94, 0x8a, 0x74, 0x13, 0xf0, 0xa1, 0x42, 0xfd, 0x40, 0xd4, 0x93, 0x47,
];

/// Difficulty every proof-of-stake header must carry.
pub const POS_DIFFICULTY: U256 = U256([0; 4]);

/// Nonce every proof-of-stake header must carry.
pub const POS_NONCE: BlockNonce = BlockNonce::ZERO;

/// List marker prefixed to every hashed list.
const LIST_MARKER: u8 = 0xc0;

/// Which rule set governs a header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Pre-merge: the embedded legacy engine is authoritative.
    Legacy,
    /// Post-merge: consensus is attested externally, only header invariants
    /// are checked here.
    Transitioned,
}

impl Phase {
    /// Short label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Legacy => "legacy",
            Phase::Transitioned => "transitioned",
        }
    }
}

/// Block header
///
/// Immutable once sealed. `difficulty` is `None` only while a header is under
/// construction, before `prepare` has populated it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub parent_hash: Hash,
    pub uncle_hash: Hash,
    pub beneficiary: Address,
    pub state_root: Hash,
    pub transactions_root: Hash,
    pub receipts_root: Hash,
    pub difficulty: Option<U256>,
    pub number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Vec<u8>,
    pub nonce: BlockNonce,
    /// Present from the fee-market fork onwards
    pub base_fee_per_gas: Option<u64>,
}

impl Header {
    /// Compute the hash of this block header
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(self.parent_hash);
        hasher.update(self.uncle_hash);
        hasher.update(self.beneficiary);
        hasher.update(self.state_root);
        hasher.update(self.transactions_root);
        hasher.update(self.receipts_root);
        match self.difficulty {
            Some(difficulty) => {
                let mut buf = [0u8; 32];
                difficulty.to_big_endian(&mut buf);
                hasher.update([1u8]);
                hasher.update(buf);
            }
            None => hasher.update([0u8]),
        }
        hasher.update(self.number.to_be_bytes());
        hasher.update(self.gas_limit.to_be_bytes());
        hasher.update(self.gas_used.to_be_bytes());
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update((self.extra_data.len() as u64).to_be_bytes());
        hasher.update(&self.extra_data);
        hasher.update(self.nonce.as_bytes());
        if let Some(base_fee) = self.base_fee_per_gas {
            hasher.update(base_fee.to_be_bytes());
        }
        digest(hasher)
    }

    /// Number of the parent block, `None` for genesis.
    pub fn parent_number(&self) -> Option<u64> {
        self.number.checked_sub(1)
    }
}

/// A transaction as seen by the consensus layer.
///
/// Execution happens elsewhere; only the fields needed to commit to the
/// transaction in the block body are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub nonce: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub gas_limit: u64,
    pub data: Vec<u8>,
}

impl Transaction {
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(self.nonce.to_be_bytes());
        match self.to {
            Some(to) => {
                hasher.update([1u8]);
                hasher.update(to);
            }
            None => hasher.update([0u8]),
        }
        let mut value = [0u8; 32];
        self.value.to_big_endian(&mut value);
        hasher.update(value);
        hasher.update(self.gas_limit.to_be_bytes());
        hasher.update(&self.data);
        digest(hasher)
    }
}

/// Execution receipt of a single transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: Hash,
    pub success: bool,
    pub cumulative_gas_used: u64,
}

impl Receipt {
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(self.tx_hash);
        hasher.update([self.success as u8]);
        hasher.update(self.cumulative_gas_used.to_be_bytes());
        digest(hasher)
    }
}

/// A sealed or sealable block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    header: Header,
    transactions: Vec<Transaction>,
    uncles: Vec<Header>,
}

impl Block {
    /// Assemble a block, committing the body into the header's
    /// transactions, receipts and uncle roots.
    pub fn new(
        mut header: Header,
        transactions: Vec<Transaction>,
        uncles: Vec<Header>,
        receipts: &[Receipt],
    ) -> Self {
        header.transactions_root = list_hash(transactions.iter().map(Transaction::hash));
        header.receipts_root = list_hash(receipts.iter().map(Receipt::hash));
        header.uncle_hash = calc_uncle_hash(&uncles);
        Self {
            header,
            transactions,
            uncles,
        }
    }

    /// Wrap a header with an empty body, leaving the header untouched.
    pub fn from_header(header: Header) -> Self {
        Self {
            header,
            transactions: Vec::new(),
            uncles: Vec::new(),
        }
    }

    /// Attach uncles without recomputing any header field.
    pub fn with_uncles(mut self, uncles: Vec<Header>) -> Self {
        self.uncles = uncles;
        self
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn uncles(&self) -> &[Header] {
        &self.uncles
    }

    pub fn number(&self) -> u64 {
        self.header.number
    }

    /// Get the hash of this block
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }
}

/// Hash committing to a set of uncle headers.
pub fn calc_uncle_hash(uncles: &[Header]) -> Hash {
    list_hash(uncles.iter().map(Header::hash))
}

fn digest(hasher: Keccak256) -> Hash {
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

fn list_hash(items: impl Iterator<Item = Hash>) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update([LIST_MARKER]);
    for item in items {
        hasher.update(item);
    }
    digest(hasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Header {
        Header {
            number: 7,
            difficulty: Some(U256::from(131_072u64)),
            gas_limit: 30_000_000,
            timestamp: 1_000,
            uncle_hash: EMPTY_UNCLE_HASH,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_uncle_hash_matches_list_hash() {
        assert_eq!(calc_uncle_hash(&[]), EMPTY_UNCLE_HASH);
    }

    #[test]
    fn test_uncle_hash_changes_with_uncles() {
        let uncle = sample_header();
        assert_ne!(calc_uncle_hash(&[uncle]), EMPTY_UNCLE_HASH);
    }

    #[test]
    fn test_header_hash_covers_difficulty_and_extra() {
        let header = sample_header();
        let base = header.hash();

        let unset = Header {
            difficulty: None,
            ..header.clone()
        };
        assert_ne!(unset.hash(), base);

        let extra = Header {
            extra_data: vec![1],
            ..header.clone()
        };
        assert_ne!(extra.hash(), base);
        assert_eq!(header.hash(), base);
    }

    #[test]
    fn test_parent_number() {
        assert_eq!(sample_header().parent_number(), Some(6));
        let genesis = Header::default();
        assert_eq!(genesis.parent_number(), None);
    }

    #[test]
    fn test_block_new_commits_body() {
        let header = Header {
            uncle_hash: [0xAA; 32],
            ..sample_header()
        };
        let tx = Transaction {
            nonce: 1,
            gas_limit: 21_000,
            ..Default::default()
        };
        let receipt = Receipt {
            tx_hash: tx.hash(),
            success: true,
            cumulative_gas_used: 21_000,
        };
        let block = Block::new(header, vec![tx], vec![], &[receipt]);

        assert_eq!(block.header().uncle_hash, EMPTY_UNCLE_HASH);
        assert_ne!(block.header().transactions_root, [0u8; 32]);
        assert_ne!(block.header().receipts_root, [0u8; 32]);
        assert_eq!(block.transactions().len(), 1);
        assert!(block.uncles().is_empty());
    }
}
