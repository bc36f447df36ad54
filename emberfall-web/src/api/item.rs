//! Item endpoints: detail view, the inventory screen, and use-item.
//!
//! Use-item dispatches on the item variant: equippables go into their
//! slot (after the class-restriction check), consumables apply their
//! effect to the selected hero.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use emberfall_core::hero::HeroId;
use emberfall_core::item::{format_gold, Item, ItemId};
use emberfall_core::StoreError;

use super::{ApiError, ApiState};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/api/items/{id}", get(item_detail))
        .route("/api/items/{id}/use", post(use_item))
        .route("/api/inventory", get(inventory_view))
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Serialize)]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub item_type: &'static str,
    pub stats_summary: String,
    pub rarity: &'static str,
    pub value: i32,
    pub value_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defense: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heal_amount: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mana_restore: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        let base = item.base();
        let mut view = Self {
            id: base.id,
            name: base.name.clone(),
            description: base.description.clone(),
            item_type: item.kind().name(),
            stats_summary: item.stats_summary(),
            rarity: item.rarity().name(),
            value: base.value,
            value_display: format_gold(base.value),
            slot: item.equipment_slot().map(|s| s.name()),
            damage: None,
            defense: None,
            block: None,
            heal_amount: None,
            mana_restore: None,
            duration: None,
        };
        match item {
            Item::Weapon(w) => view.damage = Some(w.damage),
            Item::Armor(a) => view.defense = Some(a.defense),
            Item::OffHand(o) => view.block = Some(o.block),
            Item::Consumable(c) => {
                view.heal_amount = Some(c.heal_amount);
                view.mana_restore = Some(c.mana_restore);
                view.duration = Some(c.duration);
            }
        }
        view
    }
}

#[derive(Serialize)]
pub struct InventoryItemView {
    #[serde(flatten)]
    pub item: ItemView,
    pub quantity: u32,
}

#[derive(Serialize)]
pub struct EquippedView {
    pub slot: &'static str,
    pub item_id: ItemId,
    pub name: String,
}

/// The inventory screen: stacks grouped by kind, plus equipped slots.
#[derive(Serialize)]
pub struct InventoryResponse {
    pub hero_id: HeroId,
    pub weapons: Vec<InventoryItemView>,
    pub armor: Vec<InventoryItemView>,
    pub off_hands: Vec<InventoryItemView>,
    pub consumables: Vec<InventoryItemView>,
    pub equipped: Vec<EquippedView>,
    pub total_items: u32,
    pub total_value: i32,
    pub total_value_display: String,
}

#[derive(Serialize)]
pub struct UseItemResponse {
    pub success: bool,
    pub message: String,
    pub action_type: &'static str,
    pub item_type: &'static str,
    pub hero_health: i32,
    pub hero_max_health: i32,
}

// ============================================================================
// Handlers
// ============================================================================

async fn item_detail(
    State(state): State<ApiState>,
    Path(item_id): Path<ItemId>,
) -> Result<Json<ItemView>, ApiError> {
    let mut store = state.store.write().await;
    store.reload().await?;
    Ok(Json(ItemView::from(store.item(item_id)?)))
}

async fn selected_hero_id(state: &ApiState) -> Result<HeroId, ApiError> {
    state
        .selected_hero
        .read()
        .await
        .ok_or(ApiError::NoHeroSelected)
}

async fn inventory_view(
    State(state): State<ApiState>,
) -> Result<Json<InventoryResponse>, ApiError> {
    let hero_id = selected_hero_id(&state).await?;
    let mut store = state.store.write().await;
    store.reload().await?;
    let hero = match store.hero(hero_id) {
        Ok(hero) => hero,
        Err(StoreError::HeroNotFound(_)) => return Err(ApiError::NoHeroSelected),
        Err(err) => return Err(err.into()),
    };

    let inventory = store.inventory(hero.inventory_id)?;
    let mut weapons = Vec::new();
    let mut armor = Vec::new();
    let mut off_hands = Vec::new();
    let mut consumables = Vec::new();
    let mut total_value = 0;

    for entry in inventory.entries() {
        let item = store.item(entry.item_id)?;
        total_value += item.base().value * entry.quantity as i32;
        let view = InventoryItemView {
            item: ItemView::from(item),
            quantity: entry.quantity,
        };
        match item {
            Item::Weapon(_) => weapons.push(view),
            Item::Armor(_) => armor.push(view),
            Item::OffHand(_) => off_hands.push(view),
            Item::Consumable(_) => consumables.push(view),
        }
    }

    let mut equipped = Vec::new();
    for (slot, item_id) in store.equipment(hero_id)?.iter() {
        // Tolerate a stale slot rather than failing the whole screen.
        if let Ok(item) = store.item(item_id) {
            equipped.push(EquippedView {
                slot: slot.name(),
                item_id,
                name: item.name().to_string(),
            });
        }
    }

    Ok(Json(InventoryResponse {
        hero_id,
        weapons,
        armor,
        off_hands,
        consumables,
        equipped,
        total_items: inventory.item_count(),
        total_value,
        total_value_display: format_gold(total_value),
    }))
}

async fn use_item(
    State(state): State<ApiState>,
    Path(item_id): Path<ItemId>,
) -> Result<Json<UseItemResponse>, ApiError> {
    let mut store = state.store.write().await;
    store.reload().await?;

    // Unknown item is a 404 before the no-hero check.
    let item = store.item(item_id)?.clone();
    let hero_id = selected_hero_id(&state).await?;
    let hero = match store.hero(hero_id) {
        Ok(hero) => hero.clone(),
        Err(StoreError::HeroNotFound(_)) => return Err(ApiError::NoHeroSelected),
        Err(err) => return Err(err.into()),
    };
    let item_type = item.kind().name();

    let response = match &item {
        Item::Weapon(_) | Item::Armor(_) | Item::OffHand(_) => {
            if item.restricted_for(hero.class_id) {
                UseItemResponse {
                    success: false,
                    message: format!("{} cannot be equipped by your class", item.name()),
                    action_type: "rejected",
                    item_type,
                    hero_health: hero.current_health,
                    hero_max_health: hero.max_health,
                }
            } else {
                // equipment_slot is Some for every equippable variant.
                let slot = item.equipment_slot().ok_or(ApiError::Internal)?;
                store.equipment_mut(hero_id)?.equip(slot, item_id);
                store.save().await?;
                UseItemResponse {
                    success: true,
                    message: format!("Equipped {}! {}", item.name(), item.stats_summary()),
                    action_type: "equipped",
                    item_type,
                    hero_health: hero.current_health,
                    hero_max_health: hero.max_health,
                }
            }
        }
        Item::Consumable(consumable) => {
            let mut hero = hero;
            let message = consumable.apply(&mut hero);
            let (health, max_health) = (hero.current_health, hero.max_health);
            store.put_hero(hero)?;
            store.save().await?;
            UseItemResponse {
                success: true,
                message,
                action_type: "consumed",
                item_type,
                hero_health: health,
                hero_max_health: max_health,
            }
        }
    };

    Ok(Json(response))
}
