//! # `sstkv`
//!
//! A single-node, append-structured key-value store.
//!
//! Writes accumulate in an in-memory [`Memtable`](memtable::Memtable);
//! once it fills, a merge/flush rewrites the on-disk sorted table (SST)
//! by unioning its live entries with the buffered commands, applying
//! tombstones, and packing the result into hash-ordered, size-bounded
//! blocks. Reads check the memtable first and fall back to the SST via a
//! sparse index and an ARC-style block cache; range scans walk the blocks
//! whose key-hash bounds overlap the requested interval.
//!
//! ## Layout
//!
//! - [`hash`] — the 8-hex-character key hash that is the sole on-disk key
//!   identity.
//! - [`kv`] — `KeyValueItem` and `Command`, the record and mutation types
//!   that flow between the memtable and the SST.
//! - [`memtable`] — the in-memory write buffer.
//! - [`sst`] — blocks, the ARC read cache, and the SST reader/writer.
//! - [`merge`] — the merge/flush procedure that rewrites the SST.
//! - [`store`] — [`Store`], the facade tying the above together.
//!
//! ## Non-goals
//!
//! This engine does not provide multi-node replication, crash-consistent
//! durability (no `fsync` is ever called — a power loss between the
//! commit-time rename and disk flush can roll the SST back), secondary
//! indexes, schema, transactions, snapshot-isolated iterators, or
//! concurrent writers. It is a single-threaded, single-process engine.
#![allow(dead_code)]

pub mod error;
pub mod hash;
pub mod kv;
pub mod memtable;
pub mod merge;
pub mod sst;
pub mod store;

pub use error::{Error, Result};
pub use store::Store;
