//! Merge/flush (spec component C8): unions the current SST's live entries
//! with buffered memtable commands, applies tombstones, and rewrites the
//! SST from scratch.

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::kv::{Command, KeyValueItem, Op};
use crate::sst::writer::sort_by_hash;
use crate::sst::BlockStorage;

/// Runs a full merge/flush: reads every block of `storage`, applies
/// `commands` (dels remove, puts overwrite), sorts the union by hash, and
/// writes a brand new SST at `path`, returning the freshly reconstructed
/// `BlockStorage`.
///
/// Tombstones that do not match any live hash are no-ops and are never
/// persisted. Because the memtable is keyed by user key, a del followed by
/// a put of the same key already collapsed to the put before it ever
/// reaches this function.
pub fn merge_flush(path: &Path, storage: &BlockStorage, commands: Vec<Command>) -> Result<BlockStorage> {
    let mut live: HashMap<String, KeyValueItem> = HashMap::new();

    for item in storage.all_items()? {
        live.insert(item.hash().to_string(), item);
    }

    for command in commands {
        match command.op() {
            Op::Del => {
                live.remove(command.item().hash());
            }
            Op::Put => {
                live.insert(command.item().hash().to_string(), command.into_item());
            }
        }
    }

    let mut items: Vec<KeyValueItem> = live.into_values().collect();
    sort_by_hash(&mut items);

    BlockStorage::rewrite(path, &items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::KeyValueItem as Item;

    #[test]
    fn put_overwrites_matching_disk_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sst");

        let mut initial = vec![Item::new("a", "old")];
        sort_by_hash(&mut initial);
        let storage = BlockStorage::rewrite(&path, &initial).unwrap();

        let commands = vec![Command::put("a", "new")];
        let mut storage = merge_flush(&path, &storage, commands).unwrap();

        let block = storage.block_for_key("a").unwrap().expect("index is non-empty");
        assert_eq!(block.get("a"), Some("new"));
    }

    #[test]
    fn del_removes_matching_disk_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sst");

        let mut initial = vec![Item::new("a", "old")];
        sort_by_hash(&mut initial);
        let storage = BlockStorage::rewrite(&path, &initial).unwrap();

        let commands = vec![Command::del("a")];
        let mut storage = merge_flush(&path, &storage, commands).unwrap();

        let found = storage
            .block_for_key("a")
            .unwrap()
            .and_then(|block| block.get("a").map(str::to_string));
        assert_eq!(found, None);
    }

    #[test]
    fn del_of_absent_key_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sst");
        let storage = BlockStorage::rewrite(&path, &[]).unwrap();

        let commands = vec![Command::del("ghost")];
        let storage = merge_flush(&path, &storage, commands).unwrap();
        assert!(storage.all_items().unwrap().is_empty());
    }

    #[test]
    fn result_is_sorted_by_hash_ascending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sst");
        let storage = BlockStorage::rewrite(&path, &[]).unwrap();

        let commands: Vec<_> = (0..50)
            .map(|i| Command::put(format!("key{i}"), "v"))
            .collect();
        let storage = merge_flush(&path, &storage, commands).unwrap();

        let items = storage.all_items().unwrap();
        let hashes: Vec<_> = items.iter().map(|it| it.hash().to_string()).collect();
        let mut sorted = hashes.clone();
        sorted.sort();
        assert_eq!(hashes, sorted);
    }
}
