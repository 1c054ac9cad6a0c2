//! Known consumers.
//!
//! The producer remembers the last [`AUTH_TABLE_CAPACITY`] consumers whose
//! public keys it has read from the ledger. Slot 0 is the most recently
//! authenticated; at most one slot is active, and that slot's key is the
//! next encryption target.

use sedge_types::{AccountAddress, ConsumerEntry, AUTH_TABLE_CAPACITY};
use tracing::debug;

/// Fixed-capacity table of consumer entries, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthTable {
    slots: [Option<ConsumerEntry>; AUTH_TABLE_CAPACITY],
}

impl AuthTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the slot holding `address`.
    ///
    /// Addresses are stored lowercased, so this is an exact comparison.
    pub fn lookup(&self, address: &AccountAddress) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|entry| &entry.address == address))
    }

    /// Make the slot at `index` the only active one.
    ///
    /// Returns `false`, leaving the table untouched, if the slot is empty.
    pub fn record_authenticated(&mut self, index: usize) -> bool {
        if !matches!(self.slots.get(index), Some(Some(_))) {
            return false;
        }
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if let Some(entry) = slot {
                entry.active = i == index;
            }
        }
        true
    }

    /// Install `entry` at slot 0, shifting the others down.
    ///
    /// Returns the entry evicted from the last slot, if any.
    pub fn push_front(&mut self, entry: ConsumerEntry) -> Option<ConsumerEntry> {
        let evicted = self.slots[AUTH_TABLE_CAPACITY - 1].take();
        self.slots.rotate_right(1);
        debug!(consumer = %entry.address, evicted = ?evicted.as_ref().map(|e| e.address.as_str()), "Consumer added to auth table");
        self.slots[0] = Some(entry);
        evicted
    }

    /// The active entry, if any.
    pub fn active_entry(&self) -> Option<&ConsumerEntry> {
        self.slots.iter().flatten().find(|entry| entry.active)
    }

    /// Snapshot the active entry and deactivate it.
    ///
    /// The returned copy stays valid even if the table is modified while the
    /// caller encrypts with it.
    pub fn take_active(&mut self) -> Option<ConsumerEntry> {
        let entry = self.slots.iter_mut().flatten().find(|entry| entry.active)?;
        let snapshot = entry.clone();
        entry.active = false;
        Some(snapshot)
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&ConsumerEntry> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// All slots in order.
    pub fn slots(&self) -> &[Option<ConsumerEntry>] {
        &self.slots
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Whether no consumer is known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEM: &str = "-----BEGIN PUBLIC KEY-----\nMFww\n-----END PUBLIC KEY-----\n";

    fn entry(n: u8) -> ConsumerEntry {
        let address = AccountAddress::from_hex_digits(&format!("{:040x}", n)).unwrap();
        ConsumerEntry::new(address, PEM).unwrap()
    }

    #[test]
    fn test_push_front_order_and_eviction() {
        let mut table = AuthTable::new();
        let (e1, e2, e3, e4) = (entry(1), entry(2), entry(3), entry(4));

        assert!(table.push_front(e1.clone()).is_none());
        assert!(table.push_front(e2.clone()).is_none());
        assert!(table.push_front(e3.clone()).is_none());
        let evicted = table.push_front(e4.clone());

        assert_eq!(evicted, Some(e1.clone()));
        assert_eq!(table.get(0), Some(&e4));
        assert_eq!(table.get(1), Some(&e3));
        assert_eq!(table.get(2), Some(&e2));
        assert_eq!(table.lookup(&e1.address), None);
        assert_eq!(table.lookup(&e2.address), Some(2));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_lookup_uses_lowercased_address() {
        let mut table = AuthTable::new();
        let address = AccountAddress::parse("0xABCDEFabcdefABCDEFabcdefABCDEFabcdefABCD").unwrap();
        table.push_front(ConsumerEntry::new(address, PEM).unwrap());

        let query = AccountAddress::parse("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd").unwrap();
        assert_eq!(table.lookup(&query), Some(0));
    }

    #[test]
    fn test_record_authenticated_single_active() {
        let mut table = AuthTable::new();
        table.push_front(entry(1));
        table.push_front(entry(2));

        assert!(table.record_authenticated(1));
        assert_eq!(table.active_entry().map(|e| e.address.clone()), Some(entry(1).address));

        assert!(table.record_authenticated(0));
        let active: Vec<_> = table.slots().iter().flatten().filter(|e| e.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].address, entry(2).address);
    }

    #[test]
    fn test_record_authenticated_empty_slot() {
        let mut table = AuthTable::new();
        table.push_front(entry(1));
        assert!(!table.record_authenticated(2));
        assert!(!table.record_authenticated(7));
        assert!(table.active_entry().is_none());
    }

    #[test]
    fn test_take_active_snapshots_and_deactivates() {
        let mut table = AuthTable::new();
        table.push_front(entry(1));
        table.record_authenticated(0);

        let snapshot = table.take_active().unwrap();
        assert!(snapshot.active);
        assert_eq!(snapshot.address, entry(1).address);
        assert!(table.active_entry().is_none());
        assert!(table.take_active().is_none());

        // Evicting the entry afterwards does not affect the snapshot
        for n in 2..=4 {
            table.push_front(entry(n));
        }
        assert_eq!(table.lookup(&snapshot.address), None);
        assert_eq!(snapshot.public_key_pem, PEM);
    }

    #[test]
    fn test_empty_table() {
        let table = AuthTable::new();
        assert!(table.is_empty());
        assert!(table.active_entry().is_none());
        assert_eq!(table.slots().len(), AUTH_TABLE_CAPACITY);
    }
}
