//! In-memory chain adapter
//!
//! Implements the ChainView port for hosts without persistent storage

use crate::domain::{ConsensusError, ConsensusResult, Header, MergeConfig};
use crate::ports::ChainView;
use parking_lot::RwLock;
use shared_types::{Hash, U256};
use std::collections::HashMap;

type BlockKey = (Hash, u64);

#[derive(Default)]
struct ChainStore {
    headers: HashMap<BlockKey, Header>,
    total_difficulty: HashMap<BlockKey, U256>,
}

/// In-memory header and total-difficulty store
pub struct InMemoryChain {
    config: MergeConfig,
    store: RwLock<ChainStore>,
}

impl InMemoryChain {
    pub fn new(config: MergeConfig) -> Self {
        Self {
            config,
            store: RwLock::new(ChainStore::default()),
        }
    }

    /// Store a genesis header; its total difficulty is its own difficulty.
    pub fn insert_genesis(&self, header: Header) -> Hash {
        let td = header.difficulty.unwrap_or_default();
        self.insert_with_total_difficulty(header, td)
    }

    /// Store a header whose parent is already known, accumulating difficulty.
    pub fn insert(&self, header: Header) -> ConsensusResult<Hash> {
        let parent_number = header
            .parent_number()
            .ok_or(ConsensusError::UnknownAncestor)?;
        let parent_td = self
            .total_difficulty(&header.parent_hash, parent_number)
            .ok_or(ConsensusError::UnknownAncestor)?;
        let td = parent_td.saturating_add(header.difficulty.unwrap_or_default());
        Ok(self.insert_with_total_difficulty(header, td))
    }

    /// Store a header with an explicit total difficulty.
    pub fn insert_with_total_difficulty(&self, header: Header, td: U256) -> Hash {
        let hash = header.hash();
        let key = (hash, header.number);
        let mut store = self.store.write();
        store.total_difficulty.insert(key, td);
        store.headers.insert(key, header);
        hash
    }

    pub fn len(&self) -> usize {
        self.store.read().headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChainView for InMemoryChain {
    fn config(&self) -> &MergeConfig {
        &self.config
    }

    fn header(&self, hash: &Hash, number: u64) -> Option<Header> {
        self.store.read().headers.get(&(*hash, number)).cloned()
    }

    fn total_difficulty(&self, hash: &Hash, number: u64) -> Option<U256> {
        self.store
            .read()
            .total_difficulty
            .get(&(*hash, number))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(number: u64, difficulty: u64, parent_hash: Hash) -> Header {
        Header {
            number,
            parent_hash,
            difficulty: Some(U256::from(difficulty)),
            ..Default::default()
        }
    }

    #[test]
    fn test_total_difficulty_accumulates() {
        let chain = InMemoryChain::new(MergeConfig::default());
        let genesis = header(0, 5, [0u8; 32]);
        let genesis_hash = chain.insert_genesis(genesis);

        let child = header(1, 7, genesis_hash);
        let child_hash = chain.insert(child.clone()).unwrap();

        assert_eq!(chain.total_difficulty(&genesis_hash, 0), Some(U256::from(5)));
        assert_eq!(chain.total_difficulty(&child_hash, 1), Some(U256::from(12)));
        assert_eq!(chain.header(&child_hash, 1), Some(child));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_insert_orphan_fails() {
        let chain = InMemoryChain::new(MergeConfig::default());
        assert!(chain.is_empty());
        let orphan = header(3, 1, [0xFF; 32]);
        assert_eq!(chain.insert(orphan), Err(ConsensusError::UnknownAncestor));
    }

    #[test]
    fn test_lookup_requires_matching_number() {
        let chain = InMemoryChain::new(MergeConfig::default());
        let hash = chain.insert_genesis(header(0, 1, [0u8; 32]));
        assert!(chain.header(&hash, 1).is_none());
        assert!(chain.total_difficulty(&hash, 1).is_none());
    }
}
