//! The game store: every persisted record behind one versioned JSON file.
//!
//! Replaces the original database with a save-file model: the whole world
//! (heroes, classes, items, inventories, equipment) lives in memory and is
//! written out as pretty-printed JSON after mutations. Saves are atomic
//! (temp file + rename) so a concurrent reader never observes a torn file.
//!
//! The file is shared between the web and daemon processes. Each process
//! must treat it as the database: call [`GameStore::reload`] before a
//! read-modify-write so the mutation applies to fresh state rather than a
//! stale in-memory world. Concurrent saves are last-write-wins.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::builder::HeroDraft;
use crate::hero::{ClassId, Hero, HeroClass, HeroId};
use crate::inventory::{Equipment, Inventory, InventoryId};
use crate::item::{Item, ItemId};

/// Current save file version.
pub const SAVE_VERSION: u32 = 1;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("hero {0} not found")]
    HeroNotFound(HeroId),

    #[error("hero class {0} not found")]
    ClassNotFound(ClassId),

    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    #[error("inventory {0} not found")]
    InventoryNotFound(InventoryId),

    #[error("the name {0:?} is already taken")]
    NameTaken(String),

    #[error("class {0} is referenced by existing heroes and cannot change")]
    ClassInUse(ClassId),
}

/// All game records, as serialized into the save file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameWorld {
    next_id: u64,
    pub heroes: BTreeMap<HeroId, Hero>,
    pub classes: BTreeMap<ClassId, HeroClass>,
    pub items: BTreeMap<ItemId, Item>,
    pub inventories: BTreeMap<InventoryId, Inventory>,
    pub equipment: BTreeMap<HeroId, Equipment>,
}

impl GameWorld {
    fn alloc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedGame {
    version: u32,
    saved_at: String,
    world: GameWorld,
}

/// Write a file atomically: write a sibling temp file, then rename over.
pub(crate) async fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).await?;
    fs::rename(&tmp, path).await
}

/// The persisted game world plus its on-disk location.
#[derive(Debug)]
pub struct GameStore {
    path: PathBuf,
    world: GameWorld,
}

impl GameStore {
    /// Create an empty store that will save to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            world: GameWorld::default(),
        }
    }

    /// Load a store from disk, verifying the save version.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let content = fs::read_to_string(&path).await?;
        let saved: SavedGame = serde_json::from_str(&content)?;
        if saved.version != SAVE_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }
        Ok(Self {
            path,
            world: saved.world,
        })
    }

    /// Load if the file exists, otherwise start empty.
    ///
    /// Read or parse failures are logged and treated as non-fatal; the
    /// store starts empty in that case.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if fs::try_exists(&path).await.unwrap_or(false) {
            match Self::load(&path).await {
                Ok(store) => return store,
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "could not load game store, starting empty");
                }
            }
        }
        Self::new(path)
    }

    /// Re-read the save file, replacing the in-memory world.
    ///
    /// Picks up writes made by the other process. A missing file is not an
    /// error: nothing has been saved yet and the current world stands.
    pub async fn reload(&mut self) -> Result<(), StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        let saved: SavedGame = serde_json::from_str(&content)?;
        if saved.version != SAVE_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }
        self.world = saved.world;
        Ok(())
    }

    /// Persist the world to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let saved = SavedGame {
            version: SAVE_VERSION,
            saved_at: Utc::now().to_rfc3339(),
            world: self.world.clone(),
        };
        let content = serde_json::to_string_pretty(&saved)?;
        write_atomic(&self.path, &content).await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    /// Insert a class, assigning its id.
    pub fn add_class(&mut self, mut class: HeroClass) -> ClassId {
        let id = self.world.alloc_id();
        class.id = id;
        self.world.classes.insert(id, class);
        id
    }

    pub fn class(&self, id: ClassId) -> Result<&HeroClass, StoreError> {
        self.world.classes.get(&id).ok_or(StoreError::ClassNotFound(id))
    }

    pub fn classes(&self) -> impl Iterator<Item = &HeroClass> {
        self.world.classes.values()
    }

    /// Replace a class definition. Rejected once any hero references it.
    pub fn update_class(&mut self, class: HeroClass) -> Result<(), StoreError> {
        let id = class.id;
        if !self.world.classes.contains_key(&id) {
            return Err(StoreError::ClassNotFound(id));
        }
        if self.world.heroes.values().any(|h| h.class_id == id) {
            return Err(StoreError::ClassInUse(id));
        }
        self.world.classes.insert(id, class);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Heroes
    // ------------------------------------------------------------------

    /// Create a hero from a validated draft.
    ///
    /// Allocates an empty inventory and equipment set, initializes health
    /// from the class base, and enforces name uniqueness.
    pub fn create_hero(&mut self, draft: HeroDraft) -> Result<HeroId, StoreError> {
        if self
            .world
            .heroes
            .values()
            .any(|h| h.name.eq_ignore_ascii_case(&draft.name))
        {
            return Err(StoreError::NameTaken(draft.name));
        }
        let base_health = self.class(draft.class_id)?.base_health;

        let inventory_id = self.world.alloc_id();
        let hero_id = self.world.alloc_id();

        let mut hero = Hero {
            id: hero_id,
            name: draft.name,
            level: 1,
            experience: 0,
            class_id: draft.class_id,
            strength: draft.strength,
            constitution: draft.constitution,
            agility: draft.agility,
            intelligence: draft.intelligence,
            max_health: 0,
            current_health: 0,
            max_mana: 50,
            current_mana: 50,
            in_combat: false,
            inventory_id,
        };
        hero.update_health(base_health);

        self.world
            .inventories
            .insert(inventory_id, Inventory::new(inventory_id));
        self.world.equipment.insert(hero_id, Equipment::new(hero_id));
        self.world.heroes.insert(hero_id, hero);
        Ok(hero_id)
    }

    pub fn hero(&self, id: HeroId) -> Result<&Hero, StoreError> {
        self.world.heroes.get(&id).ok_or(StoreError::HeroNotFound(id))
    }

    pub fn heroes(&self) -> impl Iterator<Item = &Hero> {
        self.world.heroes.values()
    }

    /// Write back a mutated hero record.
    pub fn put_hero(&mut self, hero: Hero) -> Result<(), StoreError> {
        if !self.world.heroes.contains_key(&hero.id) {
            return Err(StoreError::HeroNotFound(hero.id));
        }
        self.world.heroes.insert(hero.id, hero);
        Ok(())
    }

    /// Delete a hero along with its inventory and equipment.
    pub fn delete_hero(&mut self, id: HeroId) -> Result<(), StoreError> {
        let hero = self.world.heroes.remove(&id).ok_or(StoreError::HeroNotFound(id))?;
        self.world.inventories.remove(&hero.inventory_id);
        self.world.equipment.remove(&id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// Insert an item, assigning its id. Item names are unique.
    pub fn add_item(&mut self, mut item: Item) -> Result<ItemId, StoreError> {
        if self
            .world
            .items
            .values()
            .any(|i| i.name().eq_ignore_ascii_case(item.name()))
        {
            return Err(StoreError::NameTaken(item.name().to_string()));
        }
        let id = self.world.alloc_id();
        item.base_mut().id = id;
        self.world.items.insert(id, item);
        Ok(id)
    }

    pub fn item(&self, id: ItemId) -> Result<&Item, StoreError> {
        self.world.items.get(&id).ok_or(StoreError::ItemNotFound(id))
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.world.items.values()
    }

    /// Delete an item, nulling equipment slots and dropping inventory
    /// stacks that reference it.
    pub fn delete_item(&mut self, id: ItemId) -> Result<(), StoreError> {
        self.world.items.remove(&id).ok_or(StoreError::ItemNotFound(id))?;
        for equipment in self.world.equipment.values_mut() {
            equipment.clear_item(id);
        }
        for inventory in self.world.inventories.values_mut() {
            inventory.remove_all(id);
        }
        Ok(())
    }

    /// Remove every item, cascading to equipment and inventories.
    pub fn clear_items(&mut self) {
        let ids: Vec<ItemId> = self.world.items.keys().copied().collect();
        for id in ids {
            let _ = self.delete_item(id);
        }
    }

    // ------------------------------------------------------------------
    // Inventories and equipment
    // ------------------------------------------------------------------

    pub fn inventory(&self, id: InventoryId) -> Result<&Inventory, StoreError> {
        self.world
            .inventories
            .get(&id)
            .ok_or(StoreError::InventoryNotFound(id))
    }

    pub fn inventory_mut(&mut self, id: InventoryId) -> Result<&mut Inventory, StoreError> {
        self.world
            .inventories
            .get_mut(&id)
            .ok_or(StoreError::InventoryNotFound(id))
    }

    pub fn equipment(&self, hero_id: HeroId) -> Result<&Equipment, StoreError> {
        self.world
            .equipment
            .get(&hero_id)
            .ok_or(StoreError::HeroNotFound(hero_id))
    }

    pub fn equipment_mut(&mut self, hero_id: HeroId) -> Result<&mut Equipment, StoreError> {
        self.world
            .equipment
            .get_mut(&hero_id)
            .ok_or(StoreError::HeroNotFound(hero_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{CharacterForm, Stat, ALLOCATION_POINTS};
    use crate::item::{Consumable, EquipmentSlot, Weapon};

    fn store_with_class() -> (GameStore, ClassId) {
        let mut store = GameStore::new("unused.json");
        let class_id = store.add_class(HeroClass::new("Warrior", "A brave warrior."));
        (store, class_id)
    }

    fn draft(store: &GameStore, class_id: ClassId, name: &str) -> HeroDraft {
        let mut form = CharacterForm::for_class(store.class(class_id).unwrap());
        form.set_name(name);
        form.allocate(Stat::Constitution, ALLOCATION_POINTS);
        form.build().unwrap()
    }

    #[test]
    fn create_hero_initializes_health_and_bags() {
        let (mut store, class_id) = store_with_class();
        let hero_id = store.create_hero(draft(&store, class_id, "Aldric")).unwrap();
        let hero = store.hero(hero_id).unwrap();
        // CON 20 from the +10 allocation: 100 + (20-10)*2.
        assert_eq!(hero.max_health, 120);
        assert_eq!(hero.current_health, 120);
        assert!(store.inventory(hero.inventory_id).unwrap().is_empty());
        assert!(store.equipment(hero_id).unwrap().is_empty());
    }

    #[test]
    fn hero_names_are_unique() {
        let (mut store, class_id) = store_with_class();
        store.create_hero(draft(&store, class_id, "Aldric")).unwrap();
        let err = store.create_hero(draft(&store, class_id, "aldric")).unwrap_err();
        assert!(matches!(err, StoreError::NameTaken(_)));
    }

    #[test]
    fn class_is_immutable_once_referenced() {
        let (mut store, class_id) = store_with_class();
        let mut tweaked = store.class(class_id).unwrap().clone();
        tweaked.base_health = 150;
        store.update_class(tweaked.clone()).unwrap();

        store.create_hero(draft(&store, class_id, "Aldric")).unwrap();
        let err = store.update_class(tweaked).unwrap_err();
        assert!(matches!(err, StoreError::ClassInUse(_)));
    }

    #[test]
    fn delete_hero_drops_bags() {
        let (mut store, class_id) = store_with_class();
        let hero_id = store.create_hero(draft(&store, class_id, "Aldric")).unwrap();
        let inventory_id = store.hero(hero_id).unwrap().inventory_id;
        store.delete_hero(hero_id).unwrap();
        assert!(matches!(store.hero(hero_id), Err(StoreError::HeroNotFound(_))));
        assert!(matches!(
            store.inventory(inventory_id),
            Err(StoreError::InventoryNotFound(_))
        ));
    }

    #[test]
    fn delete_item_cascades_to_slots_and_inventories() {
        let (mut store, class_id) = store_with_class();
        let hero_id = store.create_hero(draft(&store, class_id, "Aldric")).unwrap();
        let inventory_id = store.hero(hero_id).unwrap().inventory_id;

        let sword = store
            .add_item(Weapon::new("Iron Sword", 25, "sword").into())
            .unwrap();
        store.inventory_mut(inventory_id).unwrap().add(sword, 2);
        store
            .equipment_mut(hero_id)
            .unwrap()
            .equip(EquipmentSlot::Weapon, sword);

        store.delete_item(sword).unwrap();
        assert_eq!(store.equipment(hero_id).unwrap().item_in(EquipmentSlot::Weapon), None);
        assert!(!store.inventory(inventory_id).unwrap().contains(sword));
    }

    #[test]
    fn item_names_are_unique() {
        let mut store = GameStore::new("unused.json");
        store
            .add_item(Consumable::new("Health Potion", 50, 0).into())
            .unwrap();
        let err = store
            .add_item(Consumable::new("Health Potion", 20, 0).into())
            .unwrap_err();
        assert!(matches!(err, StoreError::NameTaken(_)));
    }
}
