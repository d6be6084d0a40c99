//! The store facade (spec component C6): orchestrates put/get/del/scan/
//! flush across the memtable and the sorted table.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::Result;
use crate::kv::{Command, Op};
use crate::memtable::Memtable;
use crate::merge::merge_flush;
use crate::sst::BlockStorage;

/// Number of distinct buffered keys at which `put` triggers a flush before
/// buffering the new command.
pub const FLUSH_THRESHOLD: usize = 100;

/// The engine's single public entry point: a key-value store backed by one
/// on-disk sorted table and an in-memory write buffer.
pub struct Store {
    path: PathBuf,
    memtable: Memtable,
    storage: BlockStorage,
}

impl Store {
    /// Opens (creating if absent) the store rooted at `data_file_path`.
    pub fn open(data_file_path: impl Into<PathBuf>) -> Result<Self> {
        let path = data_file_path.into();
        let storage = BlockStorage::open(path.clone())?;
        info!("opened store at {}", path.display());
        Ok(Self {
            path,
            memtable: Memtable::new(),
            storage,
        })
    }

    /// The underlying SST path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts or overwrites `key` with `value`. Flushes first if the
    /// memtable already holds `FLUSH_THRESHOLD` or more distinct keys.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        if self.memtable.len() >= FLUSH_THRESHOLD {
            debug!("memtable at threshold, flushing before put");
            self.flush()?;
        }
        self.memtable.apply(Command::put(key, value));
        Ok(())
    }

    /// Looks up `key`: the memtable first, then the containing block on
    /// disk. A buffered del shows as not-found without touching disk.
    ///
    /// A read failure on the block (missing file, decode error) is
    /// downgraded to not-found rather than propagated, per spec.md §7
    /// ("Read failures on a block cause the get/scan to return
    /// not-found"); only the memtable lookup above can still be `Err`-free
    /// by construction.
    pub fn get(&mut self, key: &str) -> Result<Option<String>> {
        if let Some(command) = self.memtable.get(key) {
            return Ok(match command.op() {
                Op::Put => Some(command.item().value().to_string()),
                Op::Del => None,
            });
        }
        match self.storage.block_for_key(key) {
            Ok(Some(block)) => Ok(block.get(key).map(str::to_string)),
            Ok(None) => Ok(None),
            Err(_) => Ok(None),
        }
    }

    /// Buffers a delete for `key`. Never flushes.
    pub fn del(&mut self, key: impl Into<String>) {
        self.memtable.apply(Command::del(key));
    }

    /// Returns the concatenation of values from every block whose key
    /// hashes overlap `[k1, k2]`, per the disjunction filter in
    /// `sst::reader::find_overlapping_blocks`.
    ///
    /// Does **not** consult the memtable: a key put since the last flush
    /// is invisible to `scan` until the next flush. This matches the
    /// reference engine (`Scan` delegates straight to the block storage)
    /// and is a deliberately preserved, documented quirk, not an
    /// oversight — see DESIGN.md open question 2.
    ///
    /// A read failure on any overlapping block is downgraded to an empty
    /// result rather than propagated, matching `get`'s treatment of block
    /// read failures (spec.md §7).
    pub fn scan(&mut self, k1: &str, k2: &str) -> Result<Vec<String>> {
        let (h1, h2) = crate::sst::reader::ordered_bounds(k1, k2);
        let blocks = match self.storage.blocks_overlapping(k1, k2) {
            Ok(blocks) => blocks,
            Err(_) => return Ok(Vec::new()),
        };
        let mut values = Vec::new();
        for block in blocks {
            for item in block.items() {
                if crate::sst::reader::entry_matches_range(item.hash(), h1, h2) {
                    values.push(item.value().to_string());
                }
            }
        }
        Ok(values)
    }

    /// Unconditionally merges buffered commands into a new SST, even if
    /// the memtable is below `FLUSH_THRESHOLD`. Called at shutdown as well
    /// as internally by `put`.
    pub fn flush(&mut self) -> Result<()> {
        let commands = self.memtable.drain();
        info!("flushing {} buffered commands", commands.len());
        self.storage = merge_flush(&self.path, &self.storage, commands)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in_temp_dir() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sst");
        let store = Store::open(path).unwrap();
        (dir, store)
    }

    #[test]
    fn s1_put_then_get() {
        let (_dir, mut store) = store_in_temp_dir();
        store.put("alpha", "1").unwrap();
        assert_eq!(store.get("alpha").unwrap(), Some("1".to_string()));
    }

    #[test]
    fn s2_put_del_get_not_found() {
        let (_dir, mut store) = store_in_temp_dir();
        store.put("alpha", "1").unwrap();
        store.del("alpha");
        assert_eq!(store.get("alpha").unwrap(), None);
    }

    #[test]
    fn s3_put_put_flush_get_both() {
        let (_dir, mut store) = store_in_temp_dir();
        store.put("a", "1").unwrap();
        store.put("b", "2").unwrap();
        store.flush().unwrap();
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));
        assert_eq!(store.get("b").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn s4_flush_mid_insert_all_150_retrievable() {
        let (_dir, mut store) = store_in_temp_dir();
        for i in 0..150 {
            store.put(format!("k{i}"), format!("v{i}")).unwrap();
        }
        for i in 0..150 {
            assert_eq!(
                store.get(&format!("k{i}")).unwrap(),
                Some(format!("v{i}")),
                "key k{i} should be retrievable"
            );
        }
    }

    #[test]
    fn s5_scan_after_flush_returns_superset() {
        let (_dir, mut store) = store_in_temp_dir();
        store.put("a", "1").unwrap();
        store.put("b", "2").unwrap();
        store.put("c", "3").unwrap();
        store.flush().unwrap();
        let values = store.scan("a", "c").unwrap();
        for expected in ["1", "2", "3"] {
            assert!(values.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn s6_overwrite_across_flushes_is_single_slot() {
        let (_dir, mut store) = store_in_temp_dir();
        store.put("x", "old").unwrap();
        store.flush().unwrap();
        store.put("x", "new").unwrap();
        store.flush().unwrap();
        assert_eq!(store.get("x").unwrap(), Some("new".to_string()));
    }

    #[test]
    fn empty_store_boundary_behaviors() {
        let (_dir, mut store) = store_in_temp_dir();
        assert_eq!(store.get("anything").unwrap(), None);
        assert_eq!(store.scan("a", "b").unwrap(), Vec::<String>::new());
        store.flush().unwrap();
    }

    #[test]
    fn scan_does_not_see_unflushed_puts() {
        let (_dir, mut store) = store_in_temp_dir();
        store.put("a", "1").unwrap();
        let values = store.scan("a", "a").unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn del_then_put_same_key_yields_put_after_flush() {
        let (_dir, mut store) = store_in_temp_dir();
        store.put("a", "1").unwrap();
        store.flush().unwrap();
        store.del("a");
        store.put("a", "2").unwrap();
        store.flush().unwrap();
        assert_eq!(store.get("a").unwrap(), Some("2".to_string()));
    }
}
