//! Hero endpoints: creation, selection, the home screen, damage and rest.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use emberfall_core::builder::{CharacterForm, Stat};
use emberfall_core::hero::{Hero, HeroClass, HeroId};
use emberfall_core::{DaemonCommand, StoreError};

use super::{ApiError, ApiState};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/api/classes", get(list_classes))
        .route("/api/heroes", get(list_heroes).post(create_hero))
        .route("/api/heroes/{id}", delete(delete_hero))
        .route("/api/heroes/{id}/select", post(select_hero))
        .route("/api/heroes/{id}/rest", post(rest_hero))
        .route("/api/heroes/{id}/damage", post(damage_hero))
        .route("/api/home", get(home))
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Serialize)]
pub struct ClassView {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub base_health: i32,
    pub base_strength: i32,
    pub base_constitution: i32,
    pub base_agility: i32,
    pub base_intelligence: i32,
}

impl From<&HeroClass> for ClassView {
    fn from(class: &HeroClass) -> Self {
        Self {
            id: class.id,
            name: class.name.clone(),
            description: class.description.clone(),
            base_health: class.base_health,
            base_strength: class.base_strength,
            base_constitution: class.base_constitution,
            base_agility: class.base_agility,
            base_intelligence: class.base_intelligence,
        }
    }
}

/// Stat points to spend on top of the class base line.
#[derive(Debug, Default, Deserialize)]
pub struct StatAllocation {
    #[serde(default)]
    pub strength: i32,
    #[serde(default)]
    pub constitution: i32,
    #[serde(default)]
    pub agility: i32,
    #[serde(default)]
    pub intelligence: i32,
}

#[derive(Deserialize)]
pub struct CreateHeroRequest {
    pub name: String,
    pub class_id: u64,
    #[serde(default)]
    pub allocation: StatAllocation,
}

#[derive(Serialize)]
pub struct HeroView {
    pub id: HeroId,
    pub name: String,
    pub level: i32,
    pub experience: i32,
    pub experience_percentage: f64,
    pub class_id: u64,
    pub strength: i32,
    pub constitution: i32,
    pub agility: i32,
    pub intelligence: i32,
    pub current_health: i32,
    pub max_health: i32,
    pub health_percentage: f64,
    pub current_mana: i32,
    pub max_mana: i32,
    pub mana_percentage: f64,
    pub health_regeneration_rate: i32,
    pub mana_regeneration_rate: i32,
    pub in_combat: bool,
}

impl From<&Hero> for HeroView {
    fn from(hero: &Hero) -> Self {
        Self {
            id: hero.id,
            name: hero.name.clone(),
            level: hero.level,
            experience: hero.experience,
            experience_percentage: hero.experience_percentage(),
            class_id: hero.class_id,
            strength: hero.strength,
            constitution: hero.constitution,
            agility: hero.agility,
            intelligence: hero.intelligence,
            current_health: hero.current_health,
            max_health: hero.max_health,
            health_percentage: hero.health_percentage(),
            current_mana: hero.current_mana,
            max_mana: hero.max_mana,
            mana_percentage: hero.mana_percentage(),
            health_regeneration_rate: hero.health_regeneration_rate(),
            mana_regeneration_rate: hero.mana_regeneration_rate(),
            in_combat: hero.in_combat,
        }
    }
}

#[derive(Deserialize)]
pub struct DamageRequest {
    pub amount: i32,
}

#[derive(Serialize)]
pub struct SelectedResponse {
    pub selected: HeroId,
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_classes(State(state): State<ApiState>) -> Result<Json<Vec<ClassView>>, ApiError> {
    let mut store = state.store.write().await;
    store.reload().await?;
    Ok(Json(store.classes().map(ClassView::from).collect()))
}

async fn list_heroes(State(state): State<ApiState>) -> Result<Json<Vec<HeroView>>, ApiError> {
    let mut store = state.store.write().await;
    store.reload().await?;
    Ok(Json(store.heroes().map(HeroView::from).collect()))
}

async fn create_hero(
    State(state): State<ApiState>,
    payload: Result<Json<CreateHeroRequest>, JsonRejection>,
) -> Result<Json<HeroView>, ApiError> {
    let Json(req) = payload?;
    let mut store = state.store.write().await;
    store.reload().await?;

    let class = store.class(req.class_id)?.clone();
    let mut form = CharacterForm::for_class(&class);
    form.set_name(&req.name);
    form.allocate(Stat::Strength, req.allocation.strength);
    form.allocate(Stat::Constitution, req.allocation.constitution);
    form.allocate(Stat::Agility, req.allocation.agility);
    form.allocate(Stat::Intelligence, req.allocation.intelligence);

    let draft = form
        .build()
        .map_err(|errors| ApiError::Validation(errors.iter().map(|e| e.to_string()).collect()))?;
    let hero_id = store.create_hero(draft)?;
    store.save().await?;

    let view = HeroView::from(store.hero(hero_id)?);
    Ok(Json(view))
}

async fn select_hero(
    State(state): State<ApiState>,
    Path(hero_id): Path<HeroId>,
) -> Result<Json<SelectedResponse>, ApiError> {
    {
        let mut store = state.store.write().await;
        store.reload().await?;
        store.hero(hero_id)?;
    }
    *state.selected_hero.write().await = Some(hero_id);
    Ok(Json(SelectedResponse { selected: hero_id }))
}

async fn delete_hero(
    State(state): State<ApiState>,
    Path(hero_id): Path<HeroId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    {
        let mut store = state.store.write().await;
        store.reload().await?;
        store.delete_hero(hero_id)?;
        store.save().await?;
    }
    // Clear the selection if the deleted hero was the one being played.
    let mut selected = state.selected_hero.write().await;
    if *selected == Some(hero_id) {
        *selected = None;
    }
    Ok(Json(serde_json::json!({ "deleted": hero_id })))
}

async fn home(State(state): State<ApiState>) -> Result<Json<HeroView>, ApiError> {
    let hero_id = state
        .selected_hero
        .read()
        .await
        .ok_or(ApiError::NoHeroSelected)?;
    let mut store = state.store.write().await;
    store.reload().await?;
    match store.hero(hero_id) {
        Ok(hero) => Ok(Json(HeroView::from(hero))),
        // Selection went stale (hero deleted out from under us).
        Err(StoreError::HeroNotFound(_)) => Err(ApiError::NoHeroSelected),
        Err(err) => Err(err.into()),
    }
}

async fn rest_hero(
    State(state): State<ApiState>,
    Path(hero_id): Path<HeroId>,
) -> Result<Json<HeroView>, ApiError> {
    let view = {
        let mut store = state.store.write().await;
        store.reload().await?;
        let mut hero = store.hero(hero_id)?.clone();
        if !hero.is_full_health() {
            hero.current_health = hero.max_health;
            store.put_hero(hero.clone())?;
            store.save().await?;
        }
        HeroView::from(&hero)
    };

    // The hero is full; tell the daemon to drop any running loop.
    if let Err(err) = state
        .channel
        .send(DaemonCommand::StopHealing { hero_id })
        .await
    {
        tracing::warn!(%err, "could not notify daemon");
    }
    Ok(Json(view))
}

async fn damage_hero(
    State(state): State<ApiState>,
    Path(hero_id): Path<HeroId>,
    payload: Result<Json<DamageRequest>, JsonRejection>,
) -> Result<Json<HeroView>, ApiError> {
    let Json(req) = payload?;
    let (view, needs_healing) = {
        let mut store = state.store.write().await;
        store.reload().await?;
        let mut hero = store.hero(hero_id)?.clone();
        let needs_healing = hero.take_damage(req.amount);
        store.put_hero(hero.clone())?;
        store.save().await?;
        (HeroView::from(&hero), needs_healing)
    };

    if needs_healing {
        if let Err(err) = state
            .channel
            .send(DaemonCommand::StartHealing { hero_id })
            .await
        {
            tracing::warn!(%err, "could not notify daemon");
        }
    }
    Ok(Json(view))
}
