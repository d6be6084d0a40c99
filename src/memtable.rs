//! In-memory write buffer (spec component C5).
//!
//! Maps user key to its latest buffered `Command`. Insertion order is
//! irrelevant; the map is keyed by exact user key, not by hash, so a later
//! put or del against the same key simply overwrites the earlier one — a
//! del followed by a put of the same key ends up storing the put.

use std::collections::HashMap;

use crate::kv::Command;

/// The memtable: a buffer of pending commands keyed by user key.
///
/// Created empty on store open and replaced wholesale with a fresh, empty
/// instance after every flush — the old buffer is never reused or merged
/// back into the new one.
#[derive(Debug, Default)]
pub struct Memtable {
    commands: HashMap<String, Command>,
}

impl Memtable {
    /// Creates an empty memtable.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Buffers a command under its item's user key, overwriting whatever
    /// was previously buffered for that key.
    pub fn apply(&mut self, command: Command) {
        let key = command
            .item()
            .key()
            .expect("commands buffered in the memtable always carry a user key")
            .to_string();
        self.commands.insert(key, command);
    }

    /// Looks up the latest buffered command for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Command> {
        self.commands.get(key)
    }

    /// Number of distinct buffered keys.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True when no commands are buffered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drains all buffered commands, leaving the memtable empty. Iteration
    /// order is arbitrary (hash map order); merge/flush does not depend on
    /// buffer iteration order beyond "later commands in the drain order
    /// for the same key never occur" (the map already collapsed those).
    pub fn drain(&mut self) -> Vec<Command> {
        self.commands.drain().map(|(_, cmd)| cmd).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_memtable_has_no_entries() {
        let table = Memtable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert!(table.get("anything").is_none());
    }

    #[test]
    fn put_then_get_returns_value() {
        let mut table = Memtable::new();
        table.apply(Command::put("alpha", "1"));
        let cmd = table.get("alpha").expect("present");
        assert_eq!(cmd.item().value(), "1");
    }

    #[test]
    fn put_then_del_shows_del_on_lookup() {
        let mut table = Memtable::new();
        table.apply(Command::put("alpha", "1"));
        table.apply(Command::del("alpha"));
        let cmd = table.get("alpha").expect("present");
        assert_eq!(cmd.op(), crate::kv::Op::Del);
    }

    #[test]
    fn del_then_put_leaves_put_in_effect() {
        let mut table = Memtable::new();
        table.apply(Command::del("alpha"));
        table.apply(Command::put("alpha", "2"));
        let cmd = table.get("alpha").expect("present");
        assert_eq!(cmd.op(), crate::kv::Op::Put);
        assert_eq!(cmd.item().value(), "2");
    }

    #[test]
    fn drain_empties_the_table_and_returns_all_commands() {
        let mut table = Memtable::new();
        table.apply(Command::put("a", "1"));
        table.apply(Command::put("b", "2"));
        let drained = table.drain();
        assert_eq!(drained.len(), 2);
        assert!(table.is_empty());
    }
}
