//! Sorted table writes: the greedy packer's output written to a temp file,
//! the sparse index line, and the atomic rename that commits a flush
//! (spec component C4, writer half).

use std::fs::{self, File};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::hash;
use crate::kv::KeyValueItem;

use super::block::pack_blocks;

/// Path of the temp file flush writes through before the atomic rename.
/// Fixed at `./temp_data.txt`, independent of the SST's own directory —
/// matching the reference's hardcoded `tmpFilePath`, not derived from
/// `path`.
pub const TEMP_FILE_PATH: &str = "./temp_data.txt";

/// Writes a full SST: packs `items_sorted_by_hash` into blocks, writes
/// them to the temp file, appends the sparse index line, then atomically
/// renames the temp file over `path`.
///
/// Any pre-existing temp file is removed first, matching the reference's
/// stale-temp-file cleanup at the start of flush.
pub fn write_sst(path: &Path, items_sorted_by_hash: &[KeyValueItem]) -> Result<()> {
    let temp_path = PathBuf::from(TEMP_FILE_PATH);
    if temp_path.exists() {
        fs::remove_file(&temp_path).map_err(|source| Error::Write {
            path: temp_path.clone(),
            source,
        })?;
    }

    let mut file = File::create(&temp_path).map_err(|source| Error::Open {
        path: temp_path.clone(),
        source,
    })?;

    let blocks = pack_blocks(items_sorted_by_hash);
    let mut index_pairs: Vec<(String, u64)> = Vec::with_capacity(blocks.len());

    for block in &blocks {
        let offset = file.stream_position().map_err(|source| Error::Seek {
            path: temp_path.clone(),
            source,
        })?;
        let encoded = block.encode();
        file.write_all(encoded.as_bytes())
            .map_err(|source| Error::Write {
                path: temp_path.clone(),
                source,
            })?;
        index_pairs.push((block.block_key().to_string(), offset));
    }

    let index_line = index_pairs
        .iter()
        .map(|(h, off)| format!("{},{}", h, off))
        .collect::<Vec<_>>()
        .join(",");
    file.write_all(index_line.as_bytes())
        .map_err(|source| Error::Write {
            path: temp_path.clone(),
            source,
        })?;
    file.flush().map_err(|source| Error::Write {
        path: temp_path.clone(),
        source,
    })?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|source| Error::Rename {
        from: temp_path,
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Sorts items by hash ascending — the order the writer requires before
/// packing.
pub fn sort_by_hash(items: &mut [KeyValueItem]) {
    items.sort_by(|a, b| a.hash().cmp(b.hash()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sst::reader::{load_index, read_block};
    use std::io::Read as _;

    fn item(key: &str, value: &str) -> KeyValueItem {
        KeyValueItem::new(key, value)
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sst");

        let mut items = vec![item("a", "1"), item("b", "2"), item("c", "3")];
        sort_by_hash(&mut items);
        write_sst(&path, &items).unwrap();

        let index = load_index(&path).unwrap();
        assert_eq!(index.len(), 1.max(index.len()));

        for it in &items {
            let offset = super::super::reader::find_containing_block_offset(&index, it.key().unwrap());
            let block = read_block(&path, offset).unwrap();
            assert_eq!(block.get(it.key().unwrap()), Some(it.value()));
        }
    }

    #[test]
    fn empty_input_writes_empty_sst_with_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sst");
        write_sst(&path, &[]).unwrap();
        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "");
        let index = load_index(&path).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn stale_temp_file_is_removed_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sst");
        let temp_path = PathBuf::from(TEMP_FILE_PATH);
        fs::write(&temp_path, "garbage").unwrap();

        write_sst(&path, &[item("a", "1")]).unwrap();
        assert!(path.exists());
        assert!(!temp_path.exists());
    }

    #[test]
    fn hash_ascending_order_is_preserved_across_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sst");
        let mut items: Vec<_> = (0..300).map(|i| item(&format!("key{i}"), "v")).collect();
        sort_by_hash(&mut items);
        write_sst(&path, &items).unwrap();

        let index = load_index(&path).unwrap();
        let ords: Vec<u32> = index.iter().map(|e| e.first_hash_ord).collect();
        let mut sorted = ords.clone();
        sorted.sort();
        assert_eq!(ords, sorted);
    }
}
