//! `KeyValueItem` and `Command` (spec components C3's payload and C7).

use crate::hash::{self, HASH_LEN};

/// A single key-value record, either user-sourced (both `key` and `hash`
/// populated) or disk-sourced (decoded from a block, `key` is `None` and
/// only `hash` is known).
///
/// Modeling this as an `Option` rather than an empty-string sentinel
/// follows the engine's own invariant: a KV read off disk never recovers
/// its original key text, only the hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueItem {
    key: Option<String>,
    hash: String,
    value: String,
}

impl KeyValueItem {
    /// Builds an item from a user-supplied key and value, computing the
    /// hash.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let hash = hash::hash(&key);
        Self {
            key: Some(key),
            hash,
            value: value.into(),
        }
    }

    /// Builds an item recovered from disk: only the hash is known.
    pub fn from_disk(hash: String, value: String) -> Self {
        debug_assert_eq!(hash.len(), HASH_LEN);
        Self {
            key: None,
            hash,
            value,
        }
    }

    /// The user key, if this item still carries one.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The key hash: the sole on-disk identity.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// The stored value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Encoded on-disk size: `8 + byteLength(value)`.
    pub fn size(&self) -> i64 {
        HASH_LEN as i64 + self.value.len() as i64
    }
}

/// The operation a buffered `Command` performs when applied during flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Insert or overwrite the item.
    Put,
    /// Remove the item (tombstone). Never persisted; applied only during
    /// flush against the live set being merged.
    Del,
}

/// A buffered mutation, tagged with the operation it performs. Commands
/// live only in memory: in the memtable, and transiently during flush.
#[derive(Debug, Clone)]
pub struct Command {
    op: Op,
    item: KeyValueItem,
}

impl Command {
    /// Builds a put command for `key`/`value`.
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            op: Op::Put,
            item: KeyValueItem::new(key, value),
        }
    }

    /// Builds a del (tombstone) command for `key`. The carried value is
    /// empty.
    pub fn del(key: impl Into<String>) -> Self {
        Self {
            op: Op::Del,
            item: KeyValueItem::new(key, ""),
        }
    }

    /// The operation this command performs.
    pub fn op(&self) -> Op {
        self.op
    }

    /// The item this command carries.
    pub fn item(&self) -> &KeyValueItem {
        &self.item
    }

    /// Consumes the command, returning its item.
    pub fn into_item(self) -> KeyValueItem {
        self.item
    }
}
