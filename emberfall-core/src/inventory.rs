//! Inventories and per-hero equipment.
//!
//! An inventory is a bag of (item, quantity) pairs with at most one entry
//! per item. Equipment maps each named slot to at most one item id; an
//! empty slot is simply absent from the map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hero::HeroId;
use crate::item::{EquipmentSlot, ItemId};

pub type InventoryId = u64;

/// One stack of a single item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// A bag of item stacks owned by one hero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub id: InventoryId,
    entries: Vec<InventoryEntry>,
}

impl Inventory {
    pub fn new(id: InventoryId) -> Self {
        Self {
            id,
            entries: Vec::new(),
        }
    }

    /// Add a quantity of an item, merging into an existing stack.
    pub fn add(&mut self, item_id: ItemId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.entries.iter_mut().find(|e| e.item_id == item_id) {
            Some(entry) => entry.quantity += quantity,
            None => self.entries.push(InventoryEntry { item_id, quantity }),
        }
    }

    /// Remove up to `quantity` of an item, dropping the stack when empty.
    ///
    /// Returns how many were actually removed.
    pub fn remove(&mut self, item_id: ItemId, quantity: u32) -> u32 {
        let Some(pos) = self.entries.iter().position(|e| e.item_id == item_id) else {
            return 0;
        };
        let entry = &mut self.entries[pos];
        let removed = entry.quantity.min(quantity);
        entry.quantity -= removed;
        if entry.quantity == 0 {
            self.entries.remove(pos);
        }
        removed
    }

    /// Drop every stack of an item, regardless of quantity.
    pub fn remove_all(&mut self, item_id: ItemId) {
        self.entries.retain(|e| e.item_id != item_id);
    }

    pub fn quantity_of(&self, item_id: ItemId) -> u32 {
        self.entries
            .iter()
            .find(|e| e.item_id == item_id)
            .map(|e| e.quantity)
            .unwrap_or(0)
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.quantity_of(item_id) > 0
    }

    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    /// Total number of items across all stacks.
    pub fn item_count(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A hero's equipped items, one per slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub hero_id: HeroId,
    slots: BTreeMap<EquipmentSlot, ItemId>,
}

impl Equipment {
    pub fn new(hero_id: HeroId) -> Self {
        Self {
            hero_id,
            slots: BTreeMap::new(),
        }
    }

    /// Place an item in a slot, returning whatever it replaced.
    pub fn equip(&mut self, slot: EquipmentSlot, item_id: ItemId) -> Option<ItemId> {
        self.slots.insert(slot, item_id)
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<ItemId> {
        self.slots.remove(&slot)
    }

    pub fn item_in(&self, slot: EquipmentSlot) -> Option<ItemId> {
        self.slots.get(&slot).copied()
    }

    /// Null out any slot holding the given item. Used on item deletion.
    pub fn clear_item(&mut self, item_id: ItemId) {
        self.slots.retain(|_, held| *held != item_id);
    }

    pub fn iter(&self) -> impl Iterator<Item = (EquipmentSlot, ItemId)> + '_ {
        self.slots.iter().map(|(slot, id)| (*slot, *id))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
