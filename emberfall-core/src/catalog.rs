//! Sample catalog used to seed a fresh game: items and starter classes.

use std::fmt;

use crate::hero::HeroClass;
use crate::item::{Armor, Consumable, EquipmentSlot, Item, ItemKind, OffHand, Weapon};
use crate::store::{GameStore, StoreError};

/// The full sample catalog: four weapons, four armors, two off-hands, and
/// four consumables.
pub fn sample_items() -> Vec<Item> {
    vec![
        // Weapons
        Item::from(Weapon::new("Iron Sword", 25, "sword"))
            .with_description("A sturdy iron blade perfect for beginners")
            .with_value(100),
        Item::from(Weapon::new("Steel Axe", 35, "axe"))
            .with_description("A heavy steel axe that cleaves through enemies")
            .with_value(200),
        Item::from(Weapon::new("Dragon Slayer", 75, "sword"))
            .with_description("A legendary sword forged from dragon scales")
            .with_value(1000),
        Item::from(Weapon::new("Elven Bow", 40, "bow"))
            .with_description("An elegant bow crafted by elven artisans")
            .with_value(300),
        // Armor
        Item::from(Armor::new("Leather Vest", 15, "leather", EquipmentSlot::Chest))
            .with_description("Basic leather protection for adventurers")
            .with_value(50),
        Item::from(Armor::new("Iron Helmet", 10, "iron", EquipmentSlot::Head))
            .with_description("Sturdy iron protection for your head")
            .with_value(75),
        Item::from(Armor::new("Chainmail Armor", 30, "chainmail", EquipmentSlot::Chest))
            .with_description("Flexible metal links provide good protection")
            .with_value(250),
        Item::from(Armor::new("Plate Boots", 12, "plate", EquipmentSlot::Feet))
            .with_description("Heavy metal boots for maximum protection")
            .with_value(150),
        // Off-hands
        Item::from(OffHand::new("Wooden Shield", 5, "wooden"))
            .with_description("A basic wooden shield for defense")
            .with_value(40),
        Item::from(OffHand::new("Iron Shield", 15, "iron"))
            .with_description("A sturdy iron shield that blocks attacks")
            .with_value(120),
        // Consumables
        Item::from(Consumable::new("Health Potion", 50, 0))
            .with_description("Restores health when consumed")
            .with_value(25),
        Item::from(Consumable::new("Mana Potion", 0, 75))
            .with_description("Restores magical energy")
            .with_value(30),
        Item::from(Consumable::new("Super Healing Potion", 200, 50))
            .with_description("Powerful healing elixir")
            .with_value(100),
        Item::from(Consumable::new("Strength Buff", 0, 0).with_duration(300))
            .with_description("Temporarily increases your strength")
            .with_value(60),
    ]
}

/// The starter classes offered on the character-creation screen.
pub fn sample_classes() -> Vec<HeroClass> {
    vec![
        HeroClass::new("Warrior", "A brave warrior who relies on strength and steel.")
            .with_base_stats(120, 14, 12, 10, 8),
        HeroClass::new("Mage", "A wise mage who bends raw magic to their will.")
            .with_base_stats(80, 8, 8, 10, 16),
        HeroClass::new("Ranger", "A hunter of the deep woods, deadly at range.")
            .with_base_stats(100, 10, 10, 15, 10),
        HeroClass::new("Rogue", "A shadow-walker who strikes first and vanishes.")
            .with_base_stats(90, 11, 9, 16, 10),
    ]
}

/// Seed the starter classes into an empty store.
///
/// Does nothing when any class already exists, so existing games keep the
/// classes their heroes were built on.
pub fn ensure_classes(store: &mut GameStore) -> usize {
    if store.classes().next().is_some() {
        return 0;
    }
    let classes = sample_classes();
    let count = classes.len();
    for class in classes {
        store.add_class(class);
    }
    count
}

/// Breakdown of a populate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulateSummary {
    pub weapons: usize,
    pub armor: usize,
    pub off_hands: usize,
    pub consumables: usize,
    pub total_value: i32,
}

impl PopulateSummary {
    pub fn total_items(&self) -> usize {
        self.weapons + self.armor + self.off_hands + self.consumables
    }
}

impl fmt::Display for PopulateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} items worth {} gold (weapons: {}, armor: {}, off-hand: {}, consumables: {})",
            self.total_items(),
            self.total_value,
            self.weapons,
            self.armor,
            self.off_hands,
            self.consumables
        )
    }
}

/// Clear existing items and seed the sample catalog.
pub fn populate(store: &mut GameStore) -> Result<PopulateSummary, StoreError> {
    store.clear_items();
    for item in sample_items() {
        store.add_item(item)?;
    }

    let mut summary = PopulateSummary {
        weapons: 0,
        armor: 0,
        off_hands: 0,
        consumables: 0,
        total_value: 0,
    };
    for item in store.items() {
        match item.kind() {
            ItemKind::Weapon => summary.weapons += 1,
            ItemKind::Armor => summary.armor += 1,
            ItemKind::OffHand => summary.off_hands += 1,
            ItemKind::Consumable => summary.consumables += 1,
        }
        summary.total_value += item.base().value;
    }
    Ok(summary)
}
