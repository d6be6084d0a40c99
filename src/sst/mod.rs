//! The sorted table (spec component C4): blocks, the ARC read cache, and
//! the reader/writer halves that turn a single on-disk file into the
//! engine's durable key-value store.

pub mod block;
pub mod cache;
pub mod reader;
pub mod writer;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::kv::KeyValueItem;

use block::Block;
use cache::BlockCache;
use reader::IndexEntry;

/// Owns the SST file path, its loaded sparse index, and an ARC cache of
/// decoded blocks. Rebuilt wholesale on every flush, which is how the
/// cache gets invalidated: there is no per-entry invalidation, only full
/// reconstruction (spec §4.3, §9).
pub struct BlockStorage {
    path: PathBuf,
    index: Vec<IndexEntry>,
    cache: BlockCache,
}

impl BlockStorage {
    /// Opens (or prepares to create) the SST at `path`, loading its
    /// sparse index. A missing or empty file yields an empty index.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let index = reader::load_index(&path)?;
        Ok(Self {
            path,
            index,
            cache: BlockCache::new(),
        })
    }

    /// The SST file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads (from cache or disk) the block that would contain `user_key`,
    /// or `None` if the index is empty (an SST that has never been
    /// flushed has no blocks, and `read_block` must never be invoked in
    /// that case — spec §4.4).
    pub fn block_for_key(&mut self, user_key: &str) -> Result<Option<Block>> {
        if self.index.is_empty() {
            return Ok(None);
        }
        let offset = reader::find_containing_block_offset(&self.index, user_key);
        self.block_at(offset).map(Some)
    }

    /// Reads every block overlapping `[k1, k2]` per the sparse index.
    pub fn blocks_overlapping(&mut self, k1: &str, k2: &str) -> Result<Vec<Block>> {
        let offsets = reader::find_overlapping_blocks(&self.index, k1, k2);
        offsets.into_iter().map(|off| self.block_at(off)).collect()
    }

    fn block_at(&mut self, offset: u64) -> Result<Block> {
        if let Some(block) = self.cache.get(offset) {
            return Ok(block.clone());
        }
        let block = reader::read_block(&self.path, offset)?;
        self.cache.put(offset, block.clone());
        Ok(block)
    }

    /// Every live record currently on disk, read block by block. Used by
    /// merge/flush to materialize the union of current SST entries and
    /// buffered commands.
    pub fn all_items(&self) -> Result<Vec<KeyValueItem>> {
        let mut items = Vec::new();
        for entry in &self.index {
            let block = reader::read_block(&self.path, entry.offset)?;
            items.extend(block.items().iter().cloned());
        }
        Ok(items)
    }

    /// Writes a brand new SST at `path` from `items_sorted_by_hash`, then
    /// returns a fresh `BlockStorage` over it with an empty cache — the
    /// reconstruction that implements flush's cache invalidation.
    pub fn rewrite(path: &Path, items_sorted_by_hash: &[KeyValueItem]) -> Result<Self> {
        writer::write_sst(path, items_sorted_by_hash)?;
        Self::open(path.to_path_buf())
    }
}
