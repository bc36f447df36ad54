//! QA tests for game-store save/load.
//!
//! Run with: `cargo test -p emberfall-core --test qa_persistence`

use emberfall_core::builder::{CharacterForm, Stat, ALLOCATION_POINTS};
use emberfall_core::catalog;
use emberfall_core::hero::HeroClass;
use emberfall_core::item::EquipmentSlot;
use emberfall_core::store::{GameStore, StoreError};
use tempfile::TempDir;

async fn populated_store(path: &std::path::Path) -> (GameStore, u64) {
    let mut store = GameStore::new(path);
    let class_id = store.add_class(
        HeroClass::new("Ranger", "A hunter of the deep woods.").with_base_stats(90, 10, 10, 14, 10),
    );
    catalog::populate(&mut store).unwrap();

    let mut form = CharacterForm::for_class(store.class(class_id).unwrap());
    form.set_name("Sylva");
    form.allocate(Stat::Agility, ALLOCATION_POINTS);
    let hero_id = store.create_hero(form.build().unwrap()).unwrap();
    (store, hero_id)
}

#[tokio::test]
async fn save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("game.json");
    let (mut store, hero_id) = populated_store(&path).await;

    // Put some gameplay state in: an inventory stack and an equipped item.
    let bow_id = store
        .items()
        .find(|i| i.name() == "Elven Bow")
        .map(|i| i.id())
        .unwrap();
    let inventory_id = store.hero(hero_id).unwrap().inventory_id;
    store.inventory_mut(inventory_id).unwrap().add(bow_id, 1);
    store
        .equipment_mut(hero_id)
        .unwrap()
        .equip(EquipmentSlot::Weapon, bow_id);

    let mut hero = store.hero(hero_id).unwrap().clone();
    hero.take_damage(25);
    let expected_health = hero.current_health;
    store.put_hero(hero).unwrap();

    store.save().await.unwrap();
    assert!(path.exists(), "save file should exist after saving");

    let loaded = GameStore::load(&path).await.unwrap();
    let hero = loaded.hero(hero_id).unwrap();
    assert_eq!(hero.name, "Sylva");
    assert_eq!(hero.current_health, expected_health);
    assert_eq!(hero.agility, 24);
    assert_eq!(loaded.items().count(), 14);
    assert!(loaded.inventory(inventory_id).unwrap().contains(bow_id));
    assert_eq!(
        loaded.equipment(hero_id).unwrap().item_in(EquipmentSlot::Weapon),
        Some(bow_id)
    );
    assert_eq!(loaded.classes().count(), 1);
}

#[tokio::test]
async fn ids_stay_monotonic_after_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("game.json");
    let (store, hero_id) = populated_store(&path).await;
    store.save().await.unwrap();

    let mut loaded = GameStore::load(&path).await.unwrap();
    let class = loaded.classes().next().unwrap().clone();
    let mut form = CharacterForm::for_class(&class);
    form.set_name("Bran");
    form.allocate(Stat::Strength, ALLOCATION_POINTS);
    let new_id = loaded.create_hero(form.build().unwrap()).unwrap();
    assert!(new_id > hero_id, "ids must never be reused across reloads");
}

#[tokio::test]
async fn version_mismatch_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("game.json");
    tokio::fs::write(
        &path,
        r#"{"version": 99, "saved_at": "2026-01-01T00:00:00Z", "world": {"next_id": 0, "heroes": {}, "classes": {}, "items": {}, "inventories": {}, "equipment": {}}}"#,
    )
    .await
    .unwrap();

    let err = GameStore::load(&path).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::VersionMismatch { expected: _, found: 99 }
    ));
}

#[tokio::test]
async fn open_missing_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let store = GameStore::open(dir.path().join("game.json")).await;
    assert_eq!(store.heroes().count(), 0);
    assert_eq!(store.items().count(), 0);
}

#[tokio::test]
async fn open_corrupt_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("game.json");
    tokio::fs::write(&path, "{not json at all").await.unwrap();

    let store = GameStore::open(&path).await;
    assert_eq!(store.heroes().count(), 0);
}

#[tokio::test]
async fn reload_picks_up_another_handles_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("game.json");
    let (mut store, hero_id) = populated_store(&path).await;
    store.save().await.unwrap();

    let mut other = GameStore::load(&path).await.unwrap();
    let mut hero = other.hero(hero_id).unwrap().clone();
    hero.take_damage(40);
    let expected = hero.current_health;
    other.put_hero(hero).unwrap();
    other.save().await.unwrap();

    store.reload().await.unwrap();
    assert_eq!(store.hero(hero_id).unwrap().current_health, expected);
}

#[tokio::test]
async fn reload_without_a_file_keeps_the_world() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("game.json");
    let (mut store, hero_id) = populated_store(&path).await;

    // Nothing saved yet; the in-memory world must survive.
    store.reload().await.unwrap();
    assert_eq!(store.hero(hero_id).unwrap().name, "Sylva");
    assert_eq!(store.items().count(), 14);
}

#[tokio::test]
async fn save_leaves_no_temp_file_behind() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("game.json");
    let (store, _) = populated_store(&path).await;
    store.save().await.unwrap();
    store.save().await.unwrap();

    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    assert_eq!(names, vec!["game.json".to_string()]);
}
