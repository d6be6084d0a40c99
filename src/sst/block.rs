//! Blocks: size-bounded, hash-ordered groups of entries (spec component C2).
//!
//! A block is both an in-memory container and the unit of on-disk I/O and
//! caching. On disk it is a single CSV record: triples of
//! `(size, hash, value)`, the first triple unprefixed and every following
//! triple prefixed with a comma, the whole record terminated by `\n`.

use crate::error::{Error, Result};
use crate::hash::{self, HASH_LEN};
use crate::kv::KeyValueItem;

/// Byte budget a block's encoded record must not exceed (minus one, per the
/// packer below).
pub const BYTE_BUDGET: i64 = 4000;

/// An ordered, hash-sorted group of key-value entries.
#[derive(Debug, Clone)]
pub struct Block {
    block_key: String,
    items: Vec<KeyValueItem>,
}

impl Block {
    fn new(items: Vec<KeyValueItem>) -> Self {
        let block_key = items
            .first()
            .map(|item| item.hash().to_string())
            .unwrap_or_default();
        Self { block_key, items }
    }

    /// The hash of this block's first item; blocks are looked up by this
    /// key via the sparse index.
    pub fn block_key(&self) -> &str {
        &self.block_key
    }

    /// Looks up a value by user key, hashing it first.
    pub fn get(&self, user_key: &str) -> Option<&str> {
        self.get_by_hash(&hash::hash(user_key))
    }

    /// Looks up a value directly by hash — the only lookup available for
    /// entries originating on disk, which carry no user key.
    pub fn get_by_hash(&self, h: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.hash() == h)
            .map(KeyValueItem::value)
    }

    /// The hashes of every item in this block, in stored (non-decreasing)
    /// order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(KeyValueItem::hash)
    }

    /// All items in this block, in stored order.
    pub fn items(&self) -> &[KeyValueItem] {
        &self.items
    }

    /// Encodes this block as a single CSV record, terminated by `\n`.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&item.size().to_string());
            out.push(',');
            out.push_str(item.hash());
            out.push(',');
            out.push_str(item.value());
        }
        out.push('\n');
        out
    }

    /// Decodes a block from one CSV record (without its trailing `\n`).
    /// Triples are read starting at column 0, 3, 6, …
    pub fn decode(record: &str, offset: u64) -> Result<Self> {
        if record.is_empty() {
            return Ok(Self::new(Vec::new()));
        }
        let fields: Vec<&str> = record.split(',').collect();
        if fields.len() % 3 != 0 {
            return Err(Error::DecodeCsv {
                offset,
                detail: format!(
                    "block record has {} fields, not a multiple of 3",
                    fields.len()
                ),
            });
        }
        let mut items = Vec::with_capacity(fields.len() / 3);
        for triple in fields.chunks(3) {
            let [size_field, hash_field, value_field] = triple else {
                unreachable!("chunks(3) always yields 3 elements here");
            };
            let _size: i64 = size_field.parse().map_err(|source| Error::DecodeInt {
                field: (*size_field).to_string(),
                source,
            })?;
            if hash_field.len() != HASH_LEN {
                return Err(Error::DecodeCsv {
                    offset,
                    detail: format!("expected {}-char hash, got {:?}", HASH_LEN, hash_field),
                });
            }
            items.push(KeyValueItem::from_disk(
                (*hash_field).to_string(),
                (*value_field).to_string(),
            ));
        }
        Ok(Self::new(items))
    }
}

/// Per-item framing overhead added to the running byte total: 2 for the
/// first item in a block, 3 for every following item.
fn framing_overhead(is_first: bool) -> i64 {
    if is_first {
        2
    } else {
        3
    }
}

/// Greedily packs a hash-sorted slice of items into consecutive blocks,
/// each bounded by `BYTE_BUDGET`.
///
/// Preserves a deliberate asymmetry from the reference implementation: the
/// admission check that decides whether another item fits compares
/// `current_bytes + item.size()` against the budget — it does **not**
/// include that item's own framing overhead in the comparison, even though
/// the running total that actually gets carried forward (`current_bytes`)
/// does add the framing. This means a block can end up slightly under- or
/// right-at-budget in a way a "fixed" symmetric check would not produce.
/// This is intentional: see DESIGN.md open question 3.
pub fn pack_blocks(items: &[KeyValueItem]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut start = 0usize;
    while start < items.len() {
        let mut end = start;
        let mut current_bytes: i64 = 0;
        while end < items.len() {
            let is_first = end == start;
            if current_bytes + items[end].size() > BYTE_BUDGET - 1 {
                break;
            }
            current_bytes += items[end].size() + framing_overhead(is_first);
            end += 1;
        }
        if end == start {
            // A single item whose size alone exceeds the budget would
            // otherwise never advance `end`, hanging the writer forever.
            // The packing algorithm is defined over collections of items;
            // this guard only fires on a degenerate single-oversized item,
            // which the source leaves undefined.
            end = start + 1;
        }
        blocks.push(Block::new(items[start..end].to_vec()));
        start = end;
    }
    blocks
}
