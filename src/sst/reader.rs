//! Sorted table reads: block reads, sparse index loading, and the lookup
//! arithmetic that turns a key (or key range) into candidate block offsets
//! (spec component C4, reader half).

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Error, Result};
use crate::hash;

use super::block::Block;

/// One `(first-hash, offset)` pair from the sparse index.
#[derive(Debug, Clone, Copy)]
pub struct IndexEntry {
    /// Hash of the first item in the block this entry points at.
    pub first_hash_ord: u32,
    /// Absolute byte offset of the block's record.
    pub offset: u64,
}

/// Reads exactly one CSV record (one line) starting at `offset` and
/// decodes it as a block.
pub fn read_block(path: &Path, offset: u64) -> Result<Block> {
    let mut file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    file.seek(SeekFrom::Start(offset))
        .map_err(|source| Error::Seek {
            path: path.to_path_buf(),
            source,
        })?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    reader.read_line(&mut line).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let trimmed = line.trim_end_matches('\n');
    Block::decode(trimmed, offset)
}

/// Loads the sparse index: the file's last line, interpreted as CSV
/// columns in pairs of `(first-hash, offset-string)`. An empty file
/// produces an empty index.
pub fn load_index(path: &Path) -> Result<Vec<IndexEntry>> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(Error::Open {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
    if contents.is_empty() {
        return Ok(Vec::new());
    }
    let last_line = contents.lines().last().unwrap_or("");
    if last_line.is_empty() {
        return Ok(Vec::new());
    }
    parse_index_line(last_line)
}

fn parse_index_line(line: &str) -> Result<Vec<IndexEntry>> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() % 2 != 0 {
        return Err(Error::DecodeCsv {
            offset: 0,
            detail: format!("index line has {} fields, not even", fields.len()),
        });
    }
    let mut entries = Vec::with_capacity(fields.len() / 2);
    for pair in fields.chunks(2) {
        let [hash_field, offset_field] = pair else {
            unreachable!("chunks(2) always yields 2 elements here");
        };
        let first_hash_ord = hash_ord(hash_field)?;
        let offset: u64 = offset_field.parse().map_err(|source| Error::DecodeInt {
            field: (*offset_field).to_string(),
            source,
        })?;
        entries.push(IndexEntry {
            first_hash_ord,
            offset,
        });
    }
    Ok(entries)
}

/// Parses an 8-hex-character hash as a `u32` ordinal for comparison. Hex
/// strings compare lexicographically the same as their numeric value when
/// both have a fixed digit count, so this ordinal is used purely to avoid
/// repeated string comparisons.
fn hash_ord(field: &str) -> Result<u32> {
    u32::from_str_radix(field, 16).map_err(|_| Error::DecodeCsv {
        offset: 0,
        detail: format!("expected 8-hex-char hash, got {:?}", field),
    })
}

/// Finds the offset of the block that would contain `user_key`, per the
/// sparse index. Walks the index in order, tracking the greatest
/// first-hash that is `<= hash(user_key)`; if none qualifies, returns 0
/// (the first block), matching the reference behavior.
pub fn find_containing_block_offset(index: &[IndexEntry], user_key: &str) -> u64 {
    let h = hash_ord(&hash::hash(user_key)).unwrap_or(0);
    let mut candidate = 0u64;
    for entry in index {
        if entry.first_hash_ord > h {
            break;
        }
        candidate = entry.offset;
    }
    candidate
}

/// Finds every block whose entries might overlap `[k1, k2]`.
///
/// Computes `h1 = hash(k1)`, `h2 = hash(k2)`, swaps them so `h1 >= h2`,
/// then includes a block's offset whenever `first_hash >= h1 OR first_hash
/// <= h2`. This disjunction is permissive by design — preserved verbatim
/// from the reference rather than tightened to the conjunction `h2 <=
/// first_hash <= h1`; see DESIGN.md open question 1.
pub fn find_overlapping_blocks(index: &[IndexEntry], k1: &str, k2: &str) -> Vec<u64> {
    let (h1, h2) = ordered_bounds(k1, k2);
    index
        .iter()
        .filter(|entry| entry.first_hash_ord >= h1 || entry.first_hash_ord <= h2)
        .map(|entry| entry.offset)
        .collect()
}

/// Returns `(h1, h2)` with `h1 >= h2`, matching the reference's swap.
pub fn ordered_bounds(k1: &str, k2: &str) -> (u32, u32) {
    let a = hash_ord(&hash::hash(k1)).unwrap_or(0);
    let b = hash_ord(&hash::hash(k2)).unwrap_or(0);
    if a >= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Tests whether an entry's hash passes the same disjunction filter used
/// to select blocks, applied this time to individual entries within a
/// selected block.
pub fn entry_matches_range(entry_hash: &str, h1: u32, h2: u32) -> bool {
    match hash_ord(entry_hash) {
        Ok(h) => h >= h1 || h <= h2,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: &str, offset: u64) -> IndexEntry {
        IndexEntry {
            first_hash_ord: hash_ord(hash).unwrap(),
            offset,
        }
    }

    #[test]
    fn containing_offset_defaults_to_zero_on_empty_index() {
        let offset = find_containing_block_offset(&[], "whatever");
        assert_eq!(offset, 0);
    }

    #[test]
    fn containing_offset_picks_greatest_first_hash_leq_target() {
        let index = vec![
            entry("00000000", 0),
            entry("00000010", 50),
            entry("000000ff", 200),
        ];
        // target between the second and third entries
        let target_ord = hash_ord("00000020").unwrap();
        let mut candidate = 0u64;
        for e in &index {
            if e.first_hash_ord > target_ord {
                break;
            }
            candidate = e.offset;
        }
        assert_eq!(candidate, 50);
    }

    #[test]
    fn overlap_filter_includes_scan_of_equal_keys() {
        let (h1, h2) = ordered_bounds("alpha", "alpha");
        assert_eq!(h1, h2);
        // The entry itself is looked up by its own hash; hash("alpha")
        // always satisfies >= h1 (since h1 == hash("alpha")).
        let own_hash = hash::hash("alpha");
        assert!(entry_matches_range(&own_hash, h1, h2));
    }
}
