//! The item model: a closed set of variants over a shared base.
//!
//! Weapons, armor, off-hands, and consumables share an [`ItemBase`]
//! (name, value, description) and add their own numeric fields. Dispatch is
//! by [`ItemKind`] on the [`Item`] enum rather than by runtime type
//! inspection, so every use-site match is exhaustive.

use serde::{Deserialize, Serialize};

use crate::hero::{ClassId, Hero};

pub type ItemId = u64;

/// Named attachment points for equippable items, one of each per hero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Head,
    Chest,
    Legs,
    Feet,
    Hands,
    Weapon,
    Shield,
}

impl EquipmentSlot {
    pub const ALL: [EquipmentSlot; 7] = [
        EquipmentSlot::Head,
        EquipmentSlot::Chest,
        EquipmentSlot::Legs,
        EquipmentSlot::Feet,
        EquipmentSlot::Hands,
        EquipmentSlot::Weapon,
        EquipmentSlot::Shield,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EquipmentSlot::Head => "head",
            EquipmentSlot::Chest => "chest",
            EquipmentSlot::Legs => "legs",
            EquipmentSlot::Feet => "feet",
            EquipmentSlot::Hands => "hands",
            EquipmentSlot::Weapon => "weapon",
            EquipmentSlot::Shield => "shield",
        }
    }
}

/// Fields shared by every item variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemBase {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    /// Worth in gold.
    pub value: i32,
    /// When set, only heroes of this class may equip the item.
    pub class_restriction: Option<ClassId>,
}

impl ItemBase {
    fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: String::new(),
            value: 0,
            class_restriction: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub base: ItemBase,
    pub damage: i32,
    pub weapon_type: String,
    pub slot: EquipmentSlot,
}

impl Weapon {
    pub fn new(name: impl Into<String>, damage: i32, weapon_type: impl Into<String>) -> Self {
        Self {
            base: ItemBase::new(name),
            damage,
            weapon_type: weapon_type.into(),
            slot: EquipmentSlot::Weapon,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Armor {
    pub base: ItemBase,
    pub defense: i32,
    pub armor_type: String,
    pub slot: EquipmentSlot,
}

impl Armor {
    pub fn new(
        name: impl Into<String>,
        defense: i32,
        armor_type: impl Into<String>,
        slot: EquipmentSlot,
    ) -> Self {
        Self {
            base: ItemBase::new(name),
            defense,
            armor_type: armor_type.into(),
            slot,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffHand {
    pub base: ItemBase,
    pub block: i32,
    pub shield_type: String,
    pub slot: EquipmentSlot,
}

impl OffHand {
    pub fn new(name: impl Into<String>, block: i32, shield_type: impl Into<String>) -> Self {
        Self {
            base: ItemBase::new(name),
            block,
            shield_type: shield_type.into(),
            slot: EquipmentSlot::Shield,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consumable {
    pub base: ItemBase,
    pub heal_amount: i32,
    pub mana_restore: i32,
    /// Buff/debuff duration in seconds; zero for instant effects.
    pub duration: i32,
}

impl Consumable {
    pub fn new(name: impl Into<String>, heal_amount: i32, mana_restore: i32) -> Self {
        Self {
            base: ItemBase::new(name),
            heal_amount,
            mana_restore,
            duration: 0,
        }
    }

    pub fn with_duration(mut self, seconds: i32) -> Self {
        self.duration = seconds;
        self
    }

    /// Apply the consumable's effect to a hero.
    ///
    /// Health and mana are hard-capped at their maxima. The item is not
    /// removed from any inventory; quantity bookkeeping is the caller's.
    pub fn apply(&self, hero: &mut Hero) -> String {
        if self.heal_amount > 0 {
            hero.heal(self.heal_amount);
        }
        if self.mana_restore > 0 {
            hero.restore_mana(self.mana_restore);
        }
        format!(
            "Used {}: restores {} HP and {} MP",
            self.base.name, self.heal_amount, self.mana_restore
        )
    }
}

/// Discriminant for the item variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Armor,
    OffHand,
    Consumable,
}

impl ItemKind {
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Weapon => "Weapon",
            ItemKind::Armor => "Armor",
            ItemKind::OffHand => "OffHand",
            ItemKind::Consumable => "Consumable",
        }
    }
}

/// Rarity tier derived from an item's gold value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn from_value(value: i32) -> Self {
        if value >= 1000 {
            Rarity::Legendary
        } else if value >= 500 {
            Rarity::Epic
        } else if value >= 100 {
            Rarity::Rare
        } else {
            Rarity::Common
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

/// Format a gold value with thousands separators.
pub fn format_gold(value: i32) -> String {
    let raw = value.abs().to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, c) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if value < 0 {
        format!("-{out} gold")
    } else {
        format!("{out} gold")
    }
}

/// Any item in the game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    Weapon(Weapon),
    Armor(Armor),
    OffHand(OffHand),
    Consumable(Consumable),
}

impl Item {
    pub fn base(&self) -> &ItemBase {
        match self {
            Item::Weapon(w) => &w.base,
            Item::Armor(a) => &a.base,
            Item::OffHand(o) => &o.base,
            Item::Consumable(c) => &c.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut ItemBase {
        match self {
            Item::Weapon(w) => &mut w.base,
            Item::Armor(a) => &mut a.base,
            Item::OffHand(o) => &mut o.base,
            Item::Consumable(c) => &mut c.base,
        }
    }

    pub fn id(&self) -> ItemId {
        self.base().id
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Weapon(_) => ItemKind::Weapon,
            Item::Armor(_) => ItemKind::Armor,
            Item::OffHand(_) => ItemKind::OffHand,
            Item::Consumable(_) => ItemKind::Consumable,
        }
    }

    pub fn rarity(&self) -> Rarity {
        Rarity::from_value(self.base().value)
    }

    /// The slot this item occupies when equipped; None for consumables.
    pub fn equipment_slot(&self) -> Option<EquipmentSlot> {
        match self {
            Item::Weapon(w) => Some(w.slot),
            Item::Armor(a) => Some(a.slot),
            Item::OffHand(o) => Some(o.slot),
            Item::Consumable(_) => None,
        }
    }

    /// One-line summary of the variant's primary stat.
    pub fn stats_summary(&self) -> String {
        match self {
            Item::Weapon(w) => format!("Deals {} damage", w.damage),
            Item::Armor(a) => format!("Provides {} defense", a.defense),
            Item::OffHand(o) => format!("Blocks {} damage", o.block),
            Item::Consumable(c) => {
                format!("Restores {} HP and {} MP", c.heal_amount, c.mana_restore)
            }
        }
    }

    /// Whether a hero of the given class is barred from equipping this item.
    pub fn restricted_for(&self, class_id: ClassId) -> bool {
        match self.base().class_restriction {
            Some(required) => required != class_id,
            None => false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.base_mut().description = description.into();
        self
    }

    pub fn with_value(mut self, value: i32) -> Self {
        self.base_mut().value = value;
        self
    }

    pub fn with_class_restriction(mut self, class_id: ClassId) -> Self {
        self.base_mut().class_restriction = Some(class_id);
        self
    }
}

impl From<Weapon> for Item {
    fn from(w: Weapon) -> Self {
        Item::Weapon(w)
    }
}

impl From<Armor> for Item {
    fn from(a: Armor) -> Self {
        Item::Armor(a)
    }
}

impl From<OffHand> for Item {
    fn from(o: OffHand) -> Self {
        Item::OffHand(o)
    }
}

impl From<Consumable> for Item {
    fn from(c: Consumable) -> Self {
        Item::Consumable(c)
    }
}
